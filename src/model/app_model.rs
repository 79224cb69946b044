//! Main application model with state management

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::content::{
    Comment, ContentState, ContentView, DetailFocus, LoadState, SearchRow, Track,
};
use super::forms::Form;
use super::playback::PlayContext;
use super::route::Route;
use super::types::{
    ActiveSection, PendingConfirm, PlaylistItem, PlaylistPicker, SelectedItem, UiState,
};

const MAX_HISTORY: usize = 32;

/// Main application model containing all UI state.
/// Playback state is owned by the player and read through its snapshots.
pub struct AppModel {
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    // ========================================================================
    // Sidebar & UI state
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        let mut state = self.ui_state.lock().await;
        state.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Navigation => {
                state.nav_selected = state.nav_selected.saturating_sub(1);
            }
            ActiveSection::Playlists => {
                state.playlist_selected = state.playlist_selected.saturating_sub(1);
            }
            ActiveSection::MainContent => {}
        }
    }

    pub async fn move_selection_down(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Navigation => {
                if state.nav_selected < state.nav_items.len().saturating_sub(1) {
                    state.nav_selected += 1;
                }
            }
            ActiveSection::Playlists => {
                if state.playlist_selected < state.playlists.len().saturating_sub(1) {
                    state.playlist_selected += 1;
                }
            }
            ActiveSection::MainContent => {}
        }
    }

    pub async fn get_selected_nav_route(&self) -> Option<Route> {
        let state = self.ui_state.lock().await;
        state.nav_items.get(state.nav_selected).map(|item| item.route.clone())
    }

    pub async fn set_playlists(&self, playlists: Vec<PlaylistItem>) {
        let mut state = self.ui_state.lock().await;
        state.playlist_selected = state.playlist_selected.min(playlists.len().saturating_sub(1));
        state.playlists = playlists;
    }

    pub async fn get_selected_playlist(&self) -> Option<PlaylistItem> {
        let state = self.ui_state.lock().await;
        state.playlists.get(state.playlist_selected).cloned()
    }

    pub async fn set_user_name(&self, name: Option<String>) {
        self.ui_state.lock().await.user_name = name;
    }

    pub async fn current_route(&self) -> Route {
        self.ui_state.lock().await.route.clone()
    }

    /// Remembers `route` for Esc; auth screens are never returned to
    pub async fn push_history(&self, route: Route) {
        if route.is_auth_screen() {
            return;
        }
        let mut state = self.ui_state.lock().await;
        if state.history.last() != Some(&route) {
            state.history.push(route);
        }
        if state.history.len() > MAX_HISTORY {
            state.history.remove(0);
        }
    }

    pub async fn pop_history(&self) -> Option<Route> {
        self.ui_state.lock().await.history.pop()
    }

    pub async fn clear_history(&self) {
        self.ui_state.lock().await.history.clear();
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn set_info(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.info_message = Some(message);
        state.info_timestamp = Some(Instant::now());
    }

    /// Drops error and info messages older than `max_age`
    pub async fn auto_clear_old_messages(&self, max_age: Duration) {
        let mut state = self.ui_state.lock().await;
        if state.error_timestamp.is_some_and(|t| t.elapsed() > max_age) {
            state.error_message = None;
            state.error_timestamp = None;
        }
        if state.info_timestamp.is_some_and(|t| t.elapsed() > max_age) {
            state.info_message = None;
            state.info_timestamp = None;
        }
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    // ---- overlays ----

    pub async fn open_overlay_form(&self, form: Form) {
        self.ui_state.lock().await.overlay_form = Some(form);
    }

    pub async fn close_overlay_form(&self) {
        self.ui_state.lock().await.overlay_form = None;
    }

    pub async fn has_overlay_form(&self) -> bool {
        self.ui_state.lock().await.overlay_form.is_some()
    }

    pub async fn set_confirm(&self, confirm: Option<PendingConfirm>) {
        self.ui_state.lock().await.confirm = confirm;
    }

    pub async fn take_confirm(&self) -> Option<PendingConfirm> {
        self.ui_state.lock().await.confirm.take()
    }

    pub async fn has_confirm(&self) -> bool {
        self.ui_state.lock().await.confirm.is_some()
    }

    pub async fn open_playlist_picker(&self, song_id: String) {
        self.ui_state.lock().await.playlist_picker = Some(PlaylistPicker { song_id, selected: 0 });
    }

    pub async fn close_playlist_picker(&self) {
        self.ui_state.lock().await.playlist_picker = None;
    }

    pub async fn is_playlist_picker_open(&self) -> bool {
        self.ui_state.lock().await.playlist_picker.is_some()
    }

    pub async fn playlist_picker_move(&self, down: bool) {
        let mut state = self.ui_state.lock().await;
        let len = state.playlists.len();
        if let Some(picker) = state.playlist_picker.as_mut() {
            if down {
                if picker.selected < len.saturating_sub(1) {
                    picker.selected += 1;
                }
            } else {
                picker.selected = picker.selected.saturating_sub(1);
            }
        }
    }

    /// `(playlist_id, song_id)` for the highlighted picker row
    pub async fn playlist_picker_choice(&self) -> Option<(String, String)> {
        let state = self.ui_state.lock().await;
        let picker = state.playlist_picker.as_ref()?;
        let playlist = state.playlists.get(picker.selected)?;
        Some((playlist.id.clone(), picker.song_id.clone()))
    }

    // ---- search debounce ----

    pub async fn schedule_search(&self, after: Duration) {
        self.ui_state.lock().await.search_deadline = Some(Instant::now() + after);
    }

    /// True once per scheduled search, after its quiet period has passed
    pub async fn take_due_search(&self) -> bool {
        let mut state = self.ui_state.lock().await;
        match state.search_deadline {
            Some(deadline) if Instant::now() >= deadline => {
                state.search_deadline = None;
                true
            }
            _ => false,
        }
    }

    // ========================================================================
    // Content
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    /// Switches the main area to `view` for `route` and returns the generation
    /// that responses for this screen must present.
    pub async fn begin_screen(&self, route: Route, view: ContentView, load_state: LoadState) -> u64 {
        {
            let mut ui = self.ui_state.lock().await;
            ui.route = route;
            ui.search_deadline = None;
        }
        let mut state = self.content_state.lock().await;
        state.generation += 1;
        state.view = view;
        state.load_state = load_state;
        state.generation
    }

    /// Applies `update` and marks the screen ready if it is still the one
    /// that asked. Returns false when the response was stale and dropped.
    pub async fn finish_screen<F>(&self, generation: u64, update: F) -> bool
    where
        F: FnOnce(&mut ContentView),
    {
        let mut state = self.content_state.lock().await;
        if state.generation != generation {
            tracing::debug!(generation, current = state.generation, "Dropping stale screen response");
            return false;
        }
        update(&mut state.view);
        state.load_state = LoadState::Ready;
        true
    }

    pub async fn fail_screen(&self, generation: u64, message: String) {
        let mut state = self.content_state.lock().await;
        if state.generation == generation {
            state.load_state = LoadState::Failed(message);
        }
    }

    /// Bumps the generation without changing the view, so a new search
    /// supersedes any in flight
    pub async fn next_generation(&self) -> u64 {
        let mut state = self.content_state.lock().await;
        state.generation += 1;
        state.generation
    }

    pub async fn with_view<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut ContentView) -> T,
    {
        let mut state = self.content_state.lock().await;
        f(&mut state.view)
    }

    pub async fn toggle_detail_focus(&self) {
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::PlaylistDetail { focus, .. } | ContentView::SongDetail { focus, .. } => {
                *focus = focus.toggle();
            }
            _ => {}
        }
    }

    pub async fn content_move_up(&self) {
        let mut state = self.content_state.lock().await;
        if let Some(index) = selection_index(&mut state.view) {
            *index = index.saturating_sub(1);
        }
    }

    /// `queue_len` bounds the queue screen, whose rows live in the player
    pub async fn content_move_down(&self, queue_len: usize) {
        let mut state = self.content_state.lock().await;
        let len = row_count(&state.view, queue_len);
        if let Some(index) = selection_index(&mut state.view)
            && *index < len.saturating_sub(1)
        {
            *index += 1;
        }
    }

    pub async fn clamp_queue_selection(&self, queue_len: usize) {
        let mut state = self.content_state.lock().await;
        if let ContentView::Queue { selected_index } = &mut state.view {
            *selected_index = (*selected_index).min(queue_len.saturating_sub(1));
        }
    }

    pub async fn get_selected_content_item(&self) -> Option<SelectedItem> {
        let state = self.content_state.lock().await;
        selected_item(&state.view)
    }

    /// Optimistic like counter update on every visible copy of the song
    pub async fn update_song_liked(&self, song_id: &str, liked: bool) {
        let mut state = self.content_state.lock().await;
        let bump = |track: &mut Track| {
            if track.id == song_id {
                track.likes_count = if liked {
                    track.likes_count.saturating_add(1)
                } else {
                    track.likes_count.saturating_sub(1)
                };
            }
        };
        match &mut state.view {
            ContentView::Home { songs, .. } => songs.iter_mut().for_each(bump),
            ContentView::SongDetail { detail, .. } => {
                if detail.song_id == song_id {
                    detail.liked = liked;
                }
                detail.song.iter_mut().for_each(bump);
            }
            ContentView::LikedSongs { tracks, selected_index } => {
                if !liked {
                    tracks.retain(|t| t.id != song_id);
                    *selected_index = (*selected_index).min(tracks.len().saturating_sub(1));
                }
            }
            ContentView::Search { results, .. } => results.songs.iter_mut().for_each(bump),
            _ => {}
        }
    }

    pub async fn update_playlist_liked(&self, playlist_id: &str, liked: bool) {
        let mut state = self.content_state.lock().await;
        if let ContentView::PlaylistDetail { detail, .. } = &mut state.view
            && detail.playlist_id == playlist_id
        {
            detail.liked = liked;
            if let Some(playlist) = detail.playlist.as_mut() {
                playlist.likes_count = if liked {
                    playlist.likes_count.saturating_add(1)
                } else {
                    playlist.likes_count.saturating_sub(1)
                };
            }
        }
    }

    /// Comment added/edited/removed on the open detail screen
    pub async fn apply_comment_change(&self, change: CommentChange) {
        let mut state = self.content_state.lock().await;
        let comments = match &mut state.view {
            ContentView::PlaylistDetail { detail, .. } => &mut detail.comments,
            ContentView::SongDetail { detail, .. } => &mut detail.comments,
            _ => return,
        };
        match change {
            CommentChange::Added(comment) => comments.insert(0, comment),
            CommentChange::Edited(comment) => {
                if let Some(existing) = comments.iter_mut().find(|c| c.id == comment.id) {
                    *existing = comment;
                }
            }
            CommentChange::Deleted(comment_id) => comments.retain(|c| c.id != comment_id),
        }
        let len = comments.len();
        match &mut state.view {
            ContentView::PlaylistDetail { comment_index, .. }
            | ContentView::SongDetail { comment_index, .. } => {
                *comment_index = (*comment_index).min(len.saturating_sub(1));
            }
            _ => {}
        }
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub enum CommentChange {
    Added(Comment),
    Edited(Comment),
    Deleted(String),
}

fn selection_index(view: &mut ContentView) -> Option<&mut usize> {
    match view {
        ContentView::Auth { .. } => None,
        ContentView::PlaylistDetail { focus: DetailFocus::Comments, comment_index, .. }
        | ContentView::SongDetail { focus: DetailFocus::Comments, comment_index, .. } => {
            Some(comment_index)
        }
        ContentView::SongDetail { .. } => None,
        ContentView::Home { selected_index, .. }
        | ContentView::AlbumDetail { selected_index, .. }
        | ContentView::Search { selected_index, .. }
        | ContentView::Playlists { selected_index, .. }
        | ContentView::PlaylistDetail { selected_index, .. }
        | ContentView::LikedSongs { selected_index, .. }
        | ContentView::Downloads { selected_index, .. }
        | ContentView::Queue { selected_index } => Some(selected_index),
    }
}

fn row_count(view: &ContentView, queue_len: usize) -> usize {
    match view {
        ContentView::Auth { .. } => 0,
        ContentView::Home { songs, albums, public_playlists, .. } => {
            songs.len() + albums.len() + public_playlists.len()
        }
        ContentView::AlbumDetail { tracks, .. } => tracks.len(),
        ContentView::Search { results, .. } => results.len(),
        ContentView::Playlists { playlists, .. } => playlists.len(),
        ContentView::PlaylistDetail { detail, focus, .. } => match focus {
            DetailFocus::Tracks => detail.playlist.as_ref().map_or(0, |p| p.tracks().len()),
            DetailFocus::Comments => detail.comments.len(),
        },
        ContentView::SongDetail { detail, focus, .. } => match focus {
            DetailFocus::Tracks => 1,
            DetailFocus::Comments => detail.comments.len(),
        },
        ContentView::LikedSongs { tracks, .. } => tracks.len(),
        ContentView::Downloads { records, .. } => records.len(),
        ContentView::Queue { .. } => queue_len,
    }
}

fn single(track: &Track) -> SelectedItem {
    SelectedItem::Track {
        track: track.clone(),
        context: None,
    }
}

fn selected_item(view: &ContentView) -> Option<SelectedItem> {
    match view {
        ContentView::Auth { .. } => None,
        ContentView::Home { songs, albums, public_playlists, selected_index } => {
            let mut index = *selected_index;
            if let Some(song) = songs.get(index) {
                return Some(single(song));
            }
            index -= songs.len();
            if let Some(album) = albums.get(index) {
                return Some(SelectedItem::Album { id: album.id.clone() });
            }
            index -= albums.len();
            public_playlists
                .get(index)
                .map(|p| SelectedItem::Playlist { id: p.id.clone() })
        }
        ContentView::AlbumDetail { tracks, selected_index, .. } => tracks.get(*selected_index).map(single),
        ContentView::Search { results, selected_index, .. } => {
            results.row(*selected_index).map(|row| match row {
                SearchRow::Song(track) => single(track),
                SearchRow::Album(album) => SelectedItem::Album { id: album.id.clone() },
                SearchRow::Playlist(playlist) => SelectedItem::Playlist { id: playlist.id.clone() },
            })
        }
        ContentView::Playlists { playlists, selected_index } => playlists
            .get(*selected_index)
            .map(|p| SelectedItem::Playlist { id: p.id.clone() }),
        ContentView::PlaylistDetail { detail, focus, selected_index, comment_index } => match focus {
            DetailFocus::Tracks => {
                let playlist = detail.playlist.as_ref()?;
                let tracks = playlist.tracks();
                let track = tracks.get(*selected_index)?.clone();
                Some(SelectedItem::Track {
                    track,
                    context: Some(PlayContext {
                        playlist_id: Some(playlist.id.clone()),
                        tracks,
                    }),
                })
            }
            DetailFocus::Comments => detail
                .comments
                .get(*comment_index)
                .map(|c| SelectedItem::Comment { comment: c.clone() }),
        },
        ContentView::SongDetail { detail, focus, comment_index } => match focus {
            DetailFocus::Tracks => detail.song.as_ref().map(single),
            DetailFocus::Comments => detail
                .comments
                .get(*comment_index)
                .map(|c| SelectedItem::Comment { comment: c.clone() }),
        },
        ContentView::LikedSongs { tracks, selected_index } => tracks.get(*selected_index).map(single),
        ContentView::Downloads { records, selected_index } => records
            .get(*selected_index)
            .and_then(|r| r.song.as_ref())
            .map(single),
        ContentView::Queue { selected_index } => Some(SelectedItem::QueueEntry { index: *selected_index }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::content::{Album, Playlist, PlaylistDetailView, SongRef};

    fn track(id: &str) -> Track {
        Track { id: id.into(), ..Default::default() }
    }

    #[tokio::test]
    async fn stale_responses_are_dropped() {
        let model = AppModel::new();
        let first = model
            .begin_screen(Route::LikedSongs, ContentView::LikedSongs { tracks: vec![], selected_index: 0 }, LoadState::Loading)
            .await;
        let second = model
            .begin_screen(Route::Downloads, ContentView::Downloads { records: vec![], selected_index: 0 }, LoadState::Loading)
            .await;

        let applied = model
            .finish_screen(first, |view| {
                *view = ContentView::LikedSongs { tracks: vec![track("x")], selected_index: 0 };
            })
            .await;
        assert!(!applied);
        assert!(matches!(model.get_content_state().await.view, ContentView::Downloads { .. }));

        model.fail_screen(first, "late".into()).await;
        assert_eq!(model.get_content_state().await.load_state, LoadState::Loading);

        assert!(model.finish_screen(second, |_| {}).await);
        assert_eq!(model.get_content_state().await.load_state, LoadState::Ready);
        assert_eq!(model.current_route().await, Route::Downloads);
    }

    #[tokio::test]
    async fn home_selection_walks_songs_then_albums_then_playlists() {
        let model = AppModel::new();
        let view = ContentView::Home {
            songs: vec![track("s1")],
            albums: vec![Album { id: "a1".into(), ..Default::default() }],
            public_playlists: vec![Playlist { id: "p1".into(), ..Default::default() }],
            selected_index: 0,
        };
        model.begin_screen(Route::Home, view, LoadState::Ready).await;

        assert!(matches!(model.get_selected_content_item().await, Some(SelectedItem::Track { context: None, .. })));
        model.content_move_down(0).await;
        assert!(matches!(model.get_selected_content_item().await, Some(SelectedItem::Album { id }) if id == "a1"));
        model.content_move_down(0).await;
        model.content_move_down(0).await;
        assert!(matches!(model.get_selected_content_item().await, Some(SelectedItem::Playlist { id }) if id == "p1"));
        model.content_move_up().await;
        model.content_move_up().await;
        model.content_move_up().await;
        assert!(matches!(model.get_selected_content_item().await, Some(SelectedItem::Track { .. })));
    }

    #[tokio::test]
    async fn playlist_tracks_carry_their_playlist_as_context() {
        let model = AppModel::new();
        let playlist = Playlist {
            id: "p1".into(),
            songs: vec![SongRef::Full(track("a")), SongRef::Full(track("b"))],
            ..Default::default()
        };
        let detail = PlaylistDetailView {
            playlist_id: "p1".into(),
            playlist: Some(playlist),
            ..Default::default()
        };
        model
            .begin_screen(
                Route::Playlist("p1".into()),
                ContentView::PlaylistDetail { detail, focus: DetailFocus::Tracks, selected_index: 1, comment_index: 0 },
                LoadState::Ready,
            )
            .await;

        match model.get_selected_content_item().await {
            Some(SelectedItem::Track { track, context: Some(ctx) }) => {
                assert_eq!(track.id, "b");
                assert_eq!(ctx.playlist_id.as_deref(), Some("p1"));
                assert_eq!(ctx.tracks.len(), 2);
            }
            other => panic!("unexpected selection {:?}", other),
        }
    }

    #[tokio::test]
    async fn unliking_removes_from_liked_songs() {
        let model = AppModel::new();
        model
            .begin_screen(
                Route::LikedSongs,
                ContentView::LikedSongs { tracks: vec![track("a"), track("b")], selected_index: 1 },
                LoadState::Ready,
            )
            .await;
        model.update_song_liked("b", false).await;
        match model.get_content_state().await.view {
            ContentView::LikedSongs { tracks, selected_index } => {
                assert_eq!(tracks.len(), 1);
                assert_eq!(selected_index, 0);
            }
            _ => panic!("view changed"),
        }
    }

    #[tokio::test]
    async fn search_debounce_fires_once_after_deadline() {
        let model = AppModel::new();
        model.schedule_search(Duration::ZERO).await;
        assert!(model.take_due_search().await);
        assert!(!model.take_due_search().await);

        model.schedule_search(Duration::from_secs(60)).await;
        assert!(!model.take_due_search().await);
    }

    #[tokio::test]
    async fn history_skips_auth_screens_and_repeats() {
        let model = AppModel::new();
        model.push_history(Route::Login).await;
        model.push_history(Route::Home).await;
        model.push_history(Route::Home).await;
        model.push_history(Route::Playlist("p1".into())).await;

        assert_eq!(model.pop_history().await, Some(Route::Playlist("p1".into())));
        assert_eq!(model.pop_history().await, Some(Route::Home));
        assert_eq!(model.pop_history().await, None);
    }
}
