//! Main content area rendering (home, search, detail views, lists)

use std::collections::HashSet;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph, Wrap},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{
    ActiveSection, Album, Comment, ContentState, ContentView, DetailFocus, DownloadRecord,
    LoadState, PlaybackInfo, Playlist, PlaylistDetailView, SearchResults, SearchRow, SearchTab,
    SongDetailView, Track, UiState,
};
use super::utils::{
    border_style, calculate_num_width, format_duration, header_style, render_scrollable_list,
    row_style, track_items, truncate_string, TrackListContext,
};

/// Inner width of a bordered, horizontally padded block
fn inner_width(area: Rect) -> usize {
    area.width.saturating_sub(4) as usize
}

fn content_block(title: &str, is_focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .padding(Padding::horizontal(1))
        .border_style(border_style(is_focused))
}

fn screen_title(view: &ContentView) -> &'static str {
    match view {
        ContentView::Auth { .. } => "Account",
        ContentView::Home { .. } => "Home",
        ContentView::AlbumDetail { .. } => "Album",
        ContentView::Search { .. } => "Search",
        ContentView::Playlists { .. } => "Your Playlists",
        ContentView::PlaylistDetail { .. } => "Playlist",
        ContentView::SongDetail { .. } => "Song",
        ContentView::LikedSongs { .. } => "Liked Songs",
        ContentView::Downloads { .. } => "Downloads",
        ContentView::Queue { .. } => "Queue",
    }
}

fn render_status(frame: &mut Frame, area: Rect, block: Block, load_state: &LoadState) -> bool {
    let (text, color) = match load_state {
        LoadState::Ready => return false,
        LoadState::Loading => ("Loading...".to_string(), Color::Yellow),
        LoadState::Failed(message) => (message.clone(), Color::Red),
    };
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, area);
    true
}

fn render_empty(frame: &mut Frame, area: Rect, block: Block, message: &str) {
    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
    frame.render_widget(paragraph, area);
}

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    playback: &PlaybackInfo,
    liked: &HashSet<String>,
) {
    let is_focused = ui_state.active_section == ActiveSection::MainContent;
    let current_track_id = playback.track.as_ref().map(|t| t.id.as_str());

    // Search keeps its input box visible while results load
    if let ContentView::Search { query, tab, results, selected_index } = &content_state.view {
        render_search(
            frame,
            area,
            query,
            *tab,
            results,
            *selected_index,
            &content_state.load_state,
            is_focused,
            current_track_id,
            liked,
        );
        return;
    }

    let block = content_block(screen_title(&content_state.view), is_focused);
    if render_status(frame, area, block, &content_state.load_state) {
        return;
    }

    let ctx = |selected_index: usize| TrackListContext {
        selected_index,
        is_focused,
        current_track_id,
        liked,
        content_width: inner_width(area),
    };

    match &content_state.view {
        ContentView::Auth { .. } | ContentView::Search { .. } => {}
        ContentView::Home { songs, albums, public_playlists, selected_index } => {
            render_home(frame, area, songs, albums, public_playlists, *selected_index, is_focused, current_track_id);
        }
        ContentView::AlbumDetail { album, tracks, selected_index } => {
            render_album_detail(frame, area, album.as_ref(), tracks, &ctx(*selected_index));
        }
        ContentView::Playlists { playlists, selected_index } => {
            render_playlists(frame, area, playlists, *selected_index, is_focused);
        }
        ContentView::PlaylistDetail { detail, focus, selected_index, comment_index } => {
            render_playlist_detail(
                frame,
                area,
                detail,
                *focus,
                *comment_index,
                &ctx(*selected_index),
            );
        }
        ContentView::SongDetail { detail, focus, comment_index } => {
            render_song_detail(frame, area, detail, *focus, *comment_index, is_focused, liked);
        }
        ContentView::LikedSongs { tracks, selected_index } => {
            render_track_list(frame, area, "Liked Songs", tracks, &ctx(*selected_index), "You haven't liked any songs yet");
        }
        ContentView::Downloads { records, selected_index } => {
            render_downloads(frame, area, records, *selected_index, is_focused);
        }
        ContentView::Queue { selected_index } => {
            render_queue(frame, area, playback, *selected_index, is_focused);
        }
    }
}

fn render_track_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    tracks: &[Track],
    ctx: &TrackListContext,
    empty_message: &str,
) {
    let block = content_block(&format!("{} ({})", title, tracks.len()), ctx.is_focused);
    if tracks.is_empty() {
        render_empty(frame, area, block, empty_message);
        return;
    }
    let items = track_items(tracks, ctx);
    // +1 for the header row
    render_scrollable_list(frame, area, items, ctx.selected_index + 1, block);
}

fn section_header(label: &str, count: usize) -> ListItem<'static> {
    ListItem::new(format!("── {} ({}) ──", label, count)).style(header_style())
}

fn render_home(
    frame: &mut Frame,
    area: Rect,
    songs: &[Track],
    albums: &[Album],
    playlists: &[Playlist],
    selected_index: usize,
    is_focused: bool,
    current_track_id: Option<&str>,
) {
    let block = content_block("Home", is_focused);
    if songs.is_empty() && albums.is_empty() && playlists.is_empty() {
        render_empty(frame, area, block, "Nothing here yet. Press / to search.");
        return;
    }

    let width = inner_width(area);
    let name_width = (width * 55) / 100;
    let detail_width = width.saturating_sub(name_width + 3);

    let mut items = Vec::new();
    let mut selected_row = 0;
    let mut row = 0;

    let mut push = |items: &mut Vec<ListItem<'static>>, name: &str, detail: &str, playing: bool| {
        if row == selected_index {
            selected_row = items.len();
        }
        let style = row_style(row == selected_index, is_focused, playing);
        let marker = if playing { "▶ " } else { "  " };
        items.push(
            ListItem::new(format!(
                "{}{}   {}",
                marker,
                truncate_string(name, name_width.saturating_sub(2)),
                truncate_string(detail, detail_width)
            ))
            .style(style),
        );
        row += 1;
    };

    if !songs.is_empty() {
        items.push(section_header("Songs", songs.len()));
        for song in songs {
            let playing = current_track_id == Some(song.id.as_str());
            let detail = format!("{} · {}", song.artist(), song.duration_label());
            push(&mut items, song.name(), &detail, playing);
        }
    }
    if !albums.is_empty() {
        items.push(section_header("Albums", albums.len()));
        for album in albums {
            push(&mut items, album.name(), album.artist(), false);
        }
    }
    if !playlists.is_empty() {
        items.push(section_header("Public playlists", playlists.len()));
        for playlist in playlists {
            let detail = format!("by {} · {} songs", playlist.owner_name(), playlist.songs.len());
            push(&mut items, playlist.name(), &detail, false);
        }
    }

    render_scrollable_list(frame, area, items, selected_row, block);
}

fn render_search(
    frame: &mut Frame,
    area: Rect,
    query: &str,
    tab: SearchTab,
    results: &SearchResults,
    selected_index: usize,
    load_state: &LoadState,
    is_focused: bool,
    current_track_id: Option<&str>,
    liked: &HashSet<String>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query input
            Constraint::Length(1), // Filter tabs
            Constraint::Min(0),    // Results
        ])
        .split(area);

    let input = Paragraph::new(Line::from(vec![
        Span::raw(query.to_string()),
        Span::styled(if is_focused { "▏" } else { "" }, Style::default().fg(Color::Green)),
    ]))
    .block(content_block("Search", is_focused));
    frame.render_widget(input, chunks[0]);

    let mut tab_spans = vec![Span::raw(" ")];
    for candidate in [SearchTab::All, SearchTab::Songs, SearchTab::Albums, SearchTab::Playlists] {
        let style = if candidate == tab {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        tab_spans.push(Span::styled(format!(" {} ", candidate.label()), style));
        tab_spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(tab_spans)), chunks[1]);

    let block = content_block(&format!("Results ({})", results.len()), is_focused);
    if render_status(frame, chunks[2], block.clone(), load_state) {
        return;
    }
    if results.is_empty() {
        let message = if query.trim().is_empty() {
            "Type to search songs, albums and playlists"
        } else {
            "No results"
        };
        render_empty(frame, chunks[2], block, message);
        return;
    }

    let width = inner_width(chunks[2]);
    let name_width = (width * 50) / 100;
    let detail_width = width.saturating_sub(name_width + 14);

    let items: Vec<ListItem> = (0..results.len())
        .filter_map(|i| results.row(i).map(|row| (i, row)))
        .map(|(i, row)| {
            let (kind, name, detail, playing, is_liked) = match row {
                SearchRow::Song(track) => (
                    "song",
                    track.name().to_string(),
                    track.artist().to_string(),
                    current_track_id == Some(track.id.as_str()),
                    liked.contains(&track.id),
                ),
                SearchRow::Album(album) => {
                    ("album", album.name().to_string(), album.artist().to_string(), false, false)
                }
                SearchRow::Playlist(playlist) => (
                    "playlist",
                    playlist.name().to_string(),
                    format!("by {}", playlist.owner_name()),
                    false,
                    false,
                ),
            };
            let liked_indicator = if is_liked { "♥" } else { " " };
            ListItem::new(format!(
                "{:<9} {} {}   {}",
                kind,
                liked_indicator,
                truncate_string(&name, name_width),
                truncate_string(&detail, detail_width)
            ))
            .style(row_style(i == selected_index, is_focused, playing))
        })
        .collect();

    render_scrollable_list(frame, chunks[2], items, selected_index, block);
}

fn render_album_detail(
    frame: &mut Frame,
    area: Rect,
    album: Option<&Album>,
    tracks: &[Track],
    ctx: &TrackListContext,
) {
    let Some(album) = album else {
        render_empty(frame, area, content_block("Album", ctx.is_focused), "Album not found");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let mut lines = vec![Line::from(Span::styled(
        format!("{} · {}", album.name(), album.artist()),
        header_style(),
    ))];
    if let Some(desc) = album.desc.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(Line::from(Span::styled(desc.to_string(), Style::default().fg(Color::Gray))));
    }
    let header = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(content_block("Album", false));
    frame.render_widget(header, chunks[0]);

    render_track_list(frame, chunks[1], "Tracks", tracks, ctx, "No songs on this album");
}

fn render_playlists(
    frame: &mut Frame,
    area: Rect,
    playlists: &[Playlist],
    selected_index: usize,
    is_focused: bool,
) {
    let block = content_block(&format!("Your Playlists ({})", playlists.len()), is_focused);
    if playlists.is_empty() {
        render_empty(frame, area, block, "No playlists yet. Press c to create one.");
        return;
    }

    let num_width = calculate_num_width(playlists.len());
    let name_width = inner_width(area).saturating_sub(num_width + 34);

    let mut items = vec![
        ListItem::new(format!(
            " {:<num_width$}   {:<name_width$}   {:<8}   {:>6}   {:>6}",
            "#", "Name", "Access", "Songs", "Likes",
            num_width = num_width,
            name_width = name_width
        ))
        .style(header_style()),
    ];
    items.extend(playlists.iter().enumerate().map(|(i, playlist)| {
        let access = if playlist.is_public { "public" } else { "private" };
        ListItem::new(format!(
            " {:<num_width$}   {}   {:<8}   {:>6}   {:>6}",
            i + 1,
            truncate_string(playlist.name(), name_width),
            access,
            playlist.songs.len(),
            playlist.likes_count,
            num_width = num_width
        ))
        .style(row_style(i == selected_index, is_focused, false))
    }));

    // +1 for the header row
    render_scrollable_list(frame, area, items, selected_index + 1, block);
}

fn render_comments(
    frame: &mut Frame,
    area: Rect,
    comments: &[Comment],
    comments_state: &LoadState,
    selected_index: usize,
    is_focused: bool,
) {
    let block = content_block(&format!("Comments ({})", comments.len()), is_focused);
    if render_status(frame, area, block.clone(), comments_state) {
        return;
    }
    if comments.is_empty() {
        render_empty(frame, area, block, "No comments yet. Press c to add one.");
        return;
    }

    let items: Vec<ListItem> = comments
        .iter()
        .enumerate()
        .map(|(i, comment)| {
            let style = row_style(i == selected_index, is_focused, false);
            let lines = vec![
                Line::from(vec![
                    Span::styled(comment.author().to_string(), style.add_modifier(Modifier::BOLD)),
                    Span::styled(
                        format!("  {}", comment.posted_label()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
                Line::from(Span::styled(format!("  {}", comment.content), style)),
            ];
            ListItem::new(lines)
        })
        .collect();

    render_scrollable_list(frame, area, items, selected_index, block);
}

fn render_playlist_detail(
    frame: &mut Frame,
    area: Rect,
    detail: &PlaylistDetailView,
    focus: DetailFocus,
    comment_index: usize,
    ctx: &TrackListContext,
) {
    let Some(playlist) = detail.playlist.as_ref() else {
        render_empty(frame, area, content_block("Playlist", ctx.is_focused), "Playlist not found");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let liked_mark = if detail.liked { "♥ " } else { "" };
    let access = if playlist.is_public { "public" } else { "private" };
    let mut lines = vec![
        Line::from(Span::styled(format!("{}{}", liked_mark, playlist.name()), header_style())),
        Line::from(Span::styled(
            format!(
                "by {} · {} · {} songs · {} likes",
                playlist.owner_name(),
                access,
                playlist.songs.len(),
                playlist.likes_count
            ),
            Style::default().fg(Color::Gray),
        )),
    ];
    if !playlist.description().is_empty() {
        lines.push(Line::from(playlist.description().to_string()));
    }
    let header = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(content_block("Playlist", false));
    frame.render_widget(header, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let tracks_focused = ctx.is_focused && focus == DetailFocus::Tracks;
    let tracks_ctx = TrackListContext {
        selected_index: ctx.selected_index,
        is_focused: tracks_focused,
        current_track_id: ctx.current_track_id,
        liked: ctx.liked,
        content_width: inner_width(panes[0]),
    };
    render_track_list(
        frame,
        panes[0],
        "Tracks",
        &playlist.tracks(),
        &tracks_ctx,
        "No songs yet. Add some with A or upload one with Ctrl+U.",
    );

    render_comments(
        frame,
        panes[1],
        &detail.comments,
        &detail.comments_state,
        comment_index,
        ctx.is_focused && focus == DetailFocus::Comments,
    );
}

fn render_song_detail(
    frame: &mut Frame,
    area: Rect,
    detail: &SongDetailView,
    focus: DetailFocus,
    comment_index: usize,
    is_focused: bool,
    liked: &HashSet<String>,
) {
    let Some(song) = detail.song.as_ref() else {
        render_empty(frame, area, content_block("Song", is_focused), "Song not found");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let is_liked = detail.liked || liked.contains(&song.id);
    let label = Style::default().fg(Color::Gray);
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{}{}", if is_liked { "♥ " } else { "" }, song.name()),
            header_style(),
        )),
        Line::from(""),
        Line::from(vec![Span::styled("Artist:    ", label), Span::raw(song.artist().to_string())]),
        Line::from(vec![Span::styled("Album:     ", label), Span::raw(song.album().to_string())]),
    ];
    if !song.genre().is_empty() {
        lines.push(Line::from(vec![Span::styled("Genre:     ", label), Span::raw(song.genre().to_string())]));
    }
    if let Some(year) = song.release_year() {
        lines.push(Line::from(vec![Span::styled("Released:  ", label), Span::raw(year)]));
    }
    lines.push(Line::from(vec![
        Span::styled("Duration:  ", label),
        Span::raw(song.duration_label().to_string()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "{} likes · {} comments · {} downloads",
            song.likes_count, song.comments_count, song.downloads_count
        ),
        label,
    )));
    if let Some(desc) = song.desc.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(desc.to_string()));
    }

    let info = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(content_block("Song", is_focused && focus == DetailFocus::Tracks));
    frame.render_widget(info, chunks[0]);

    render_comments(
        frame,
        chunks[1],
        &detail.comments,
        &detail.comments_state,
        comment_index,
        is_focused && focus == DetailFocus::Comments,
    );
}

fn render_downloads(
    frame: &mut Frame,
    area: Rect,
    records: &[DownloadRecord],
    selected_index: usize,
    is_focused: bool,
) {
    let block = content_block(&format!("Downloads ({})", records.len()), is_focused);
    if records.is_empty() {
        render_empty(frame, area, block, "No downloads yet. Press W on a song to download it.");
        return;
    }

    let width = inner_width(area);
    let title_width = (width.saturating_sub(22) * 55) / 100;
    let artist_width = width.saturating_sub(22 + title_width);

    let items: Vec<ListItem> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let (title, artist) = match &record.song {
                Some(song) => (song.name().to_string(), song.artist().to_string()),
                None => ("(song removed)".to_string(), String::new()),
            };
            let when = record
                .downloaded_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            ListItem::new(format!(
                "{}   {}   {}",
                truncate_string(&title, title_width),
                truncate_string(&artist, artist_width),
                when
            ))
            .style(row_style(i == selected_index, is_focused, false))
        })
        .collect();

    render_scrollable_list(frame, area, items, selected_index, block);
}

fn render_queue(
    frame: &mut Frame,
    area: Rect,
    playback: &PlaybackInfo,
    selected_index: usize,
    is_focused: bool,
) {
    let block = content_block(&format!("Queue ({})", playback.queue.len()), is_focused);
    if playback.queue.is_empty() {
        render_empty(frame, area, block, "The queue is empty. Press K on a song to add it.");
        return;
    }

    let num_width = calculate_num_width(playback.queue.len());
    let width = inner_width(area).saturating_sub(num_width + 14);
    let title_width = (width * 55) / 100;
    let artist_width = width.saturating_sub(title_width);
    let has_current = playback.track.is_some();

    let items: Vec<ListItem> = playback
        .queue
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let is_current = has_current && i == playback.position;
            let marker = if is_current { "▶" } else { " " };
            let duration = track
                .duration_secs()
                .map(|secs| format_duration(std::time::Duration::from_secs(secs)))
                .unwrap_or_default();
            ListItem::new(format!(
                "{}{:<num_width$}   {}   {}   {:>5}",
                marker,
                i + 1,
                truncate_string(track.name(), title_width),
                truncate_string(track.artist(), artist_width),
                duration,
                num_width = num_width
            ))
            .style(row_style(i == selected_index, is_focused, is_current))
        })
        .collect();

    render_scrollable_list(frame, area, items, selected_index, block);
}
