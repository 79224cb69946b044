//! Routing and per-screen data loading
//!
//! Every screen switch bumps the content generation. Loaders run as spawned
//! tasks and hand their results back through `finish_screen`, which drops
//! anything that arrives after the user moved on.

use crate::error::ApiError;
use crate::model::{
    ActiveSection, ContentView, DetailFocus, Form, FormKind, ItemKind, LoadState, PlayContext,
    PlaylistDetailView, PlaylistItem, Route, SearchResults, SearchTab, SelectedItem,
    SongDetailView,
};
use super::AppController;

impl AppController {
    /// Opens `route`, remembering the current screen for Esc
    pub async fn navigate(&self, route: Route) {
        let model = self.model.lock().await;
        let current = model.current_route().await;
        if current != route {
            model.push_history(current).await;
        }
        drop(model);
        self.show_route(route).await;
    }

    pub async fn navigate_back(&self) {
        let previous = self.model.lock().await.pop_history().await;
        if let Some(route) = previous {
            self.show_route(route).await;
        }
    }

    /// Switches the main area to `route` (after the session guard) and starts its loader
    pub(crate) async fn show_route(&self, route: Route) {
        let authenticated = self.session.is_authenticated().await;
        let requested = route.clone();
        let route = route.guard(authenticated);
        if route != requested {
            tracing::info!(requested = %requested, resolved = %route, "Route redirected");
        } else {
            tracing::debug!(route = %route, "Navigating");
        }

        let model = self.model.lock().await;
        let (view, load_state) = match &route {
            Route::Login => (auth_view(FormKind::Login), LoadState::Ready),
            Route::Register => (auth_view(FormKind::Register), LoadState::Ready),
            Route::ForgotPassword => (auth_view(FormKind::ForgotPassword), LoadState::Ready),
            Route::ResetPassword(token) => (
                auth_view(FormKind::ResetPassword { token: token.clone() }),
                LoadState::Ready,
            ),
            Route::Home | Route::Unknown(_) => (ContentView::default(), LoadState::Loading),
            Route::Search => (
                ContentView::Search {
                    query: String::new(),
                    tab: SearchTab::All,
                    results: SearchResults::default(),
                    selected_index: 0,
                },
                LoadState::Ready,
            ),
            Route::Playlists => (
                ContentView::Playlists { playlists: Vec::new(), selected_index: 0 },
                LoadState::Loading,
            ),
            Route::Playlist(id) => (
                ContentView::PlaylistDetail {
                    detail: PlaylistDetailView {
                        playlist_id: id.clone(),
                        ..Default::default()
                    },
                    focus: DetailFocus::Tracks,
                    selected_index: 0,
                    comment_index: 0,
                },
                LoadState::Loading,
            ),
            Route::Song(id) => (
                ContentView::SongDetail {
                    detail: SongDetailView {
                        song_id: id.clone(),
                        ..Default::default()
                    },
                    focus: DetailFocus::Tracks,
                    comment_index: 0,
                },
                LoadState::Loading,
            ),
            Route::Album(_) => (
                ContentView::AlbumDetail { album: None, tracks: Vec::new(), selected_index: 0 },
                LoadState::Loading,
            ),
            Route::LikedSongs => (
                ContentView::LikedSongs { tracks: Vec::new(), selected_index: 0 },
                LoadState::Loading,
            ),
            Route::Downloads => (
                ContentView::Downloads { records: Vec::new(), selected_index: 0 },
                LoadState::Loading,
            ),
            Route::Queue => (ContentView::Queue { selected_index: 0 }, LoadState::Ready),
        };
        let generation = model.begin_screen(route.clone(), view, load_state).await;
        model.set_active_section(ActiveSection::MainContent).await;
        if route.is_auth_screen() {
            model.clear_history().await;
        }
        drop(model);

        let controller = self.clone();
        tokio::spawn(async move {
            controller.load_screen(route, generation).await;
        });
    }

    // Declared `Send` so `show_route` can spawn it despite the recursive
    // show_route -> load_screen -> expire_session -> show_route call chain
    fn load_screen(
        &self,
        route: Route,
        generation: u64,
    ) -> impl std::future::Future<Output = ()> + Send + '_ {
        async move {
            match route {
                Route::Home | Route::Unknown(_) => self.load_home(generation).await,
                Route::Playlists => self.load_playlists_screen(generation).await,
                Route::Playlist(id) => self.load_playlist_detail(generation, &id).await,
                Route::Song(id) => self.load_song_detail(generation, &id).await,
                Route::Album(id) => self.load_album(generation, &id).await,
                Route::LikedSongs => self.load_liked_songs(generation).await,
                Route::Downloads => self.load_downloads(generation).await,
                Route::Queue => {
                    let queue_len = self.player.queue_len().await;
                    self.model.lock().await.clamp_queue_selection(queue_len).await;
                }
                _ => {}
            }
        }
    }

    async fn screen_failed(&self, generation: u64, screen: &str, error: ApiError) {
        tracing::error!(screen, error = %error, "Failed to load screen");
        if Self::needs_login(&error) {
            self.expire_session().await;
            return;
        }
        self.model
            .lock()
            .await
            .fail_screen(generation, Self::format_error(&error))
            .await;
    }

    /// Fetches songs and albums into the catalog. The queue is seeded with
    /// the song list when nothing has been played yet.
    pub async fn refresh_catalog(&self) -> Result<(), ApiError> {
        let (songs, albums) = futures::join!(self.api.list_songs(), self.api.list_albums());
        let songs = songs?;
        let albums = albums.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load albums");
            Vec::new()
        });
        tracing::info!(songs = songs.len(), albums = albums.len(), "Catalog loaded");
        if self.player.current_track().await.is_none() {
            self.player.set_queue(songs.clone()).await;
        }
        self.catalog.set(songs, albums).await;
        Ok(())
    }

    async fn load_home(&self, generation: u64) {
        if self.catalog.songs().await.is_empty()
            && let Err(e) = self.refresh_catalog().await
        {
            self.screen_failed(generation, "home", e).await;
            return;
        }
        let songs = self.catalog.songs().await;
        let albums = self.catalog.albums().await;
        let public_playlists = match self.api.public_playlists().await {
            Ok(playlists) => playlists,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load public playlists");
                Vec::new()
            }
        };

        self.model
            .lock()
            .await
            .finish_screen(generation, |view| {
                *view = ContentView::Home {
                    songs,
                    albums,
                    public_playlists,
                    selected_index: 0,
                };
            })
            .await;
    }

    /// Refreshes the sidebar playlist list
    pub async fn load_user_playlists(&self) {
        if !self.session.is_authenticated().await {
            self.model.lock().await.set_playlists(Vec::new()).await;
            return;
        }
        match self.api.user_playlists().await {
            Ok(playlists) => {
                let items = playlists
                    .iter()
                    .map(|p| PlaylistItem { id: p.id.clone(), name: p.name().to_string() })
                    .collect();
                self.model.lock().await.set_playlists(items).await;
            }
            Err(e) => self.report_api_error("load playlists", e).await,
        }
    }

    async fn load_playlists_screen(&self, generation: u64) {
        match self.api.user_playlists().await {
            Ok(playlists) => {
                let items: Vec<PlaylistItem> = playlists
                    .iter()
                    .map(|p| PlaylistItem { id: p.id.clone(), name: p.name().to_string() })
                    .collect();
                let model = self.model.lock().await;
                model.set_playlists(items).await;
                model
                    .finish_screen(generation, |view| {
                        if let ContentView::Playlists { playlists: rows, selected_index } = view {
                            *selected_index = (*selected_index).min(playlists.len().saturating_sub(1));
                            *rows = playlists;
                        }
                    })
                    .await;
            }
            Err(e) => self.screen_failed(generation, "playlists", e).await,
        }
    }

    async fn load_playlist_detail(&self, generation: u64, playlist_id: &str) {
        let authenticated = self.session.is_authenticated().await;
        let (playlist, liked, comments) = futures::join!(
            self.api.playlist_playback(playlist_id),
            async {
                if authenticated {
                    self.api.is_liked(ItemKind::Playlist, playlist_id).await
                } else {
                    Ok(false)
                }
            },
            self.api.comments(ItemKind::Playlist, playlist_id),
        );

        let playlist = match playlist {
            Ok(playlist) => playlist,
            Err(e) => {
                self.screen_failed(generation, "playlist", e).await;
                return;
            }
        };
        let liked = liked.unwrap_or_else(|e| {
            tracing::warn!(playlist_id, error = %e, "Failed to check playlist like");
            false
        });

        self.model
            .lock()
            .await
            .finish_screen(generation, |view| {
                if let ContentView::PlaylistDetail { detail, .. } = view {
                    detail.playlist = Some(playlist);
                    detail.liked = liked;
                    match comments {
                        Ok(comments) => {
                            detail.comments = comments;
                            detail.comments_state = LoadState::Ready;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to load playlist comments");
                            detail.comments_state = LoadState::Failed(Self::format_error(&e));
                        }
                    }
                }
            })
            .await;
    }

    async fn load_song_detail(&self, generation: u64, song_id: &str) {
        let authenticated = self.session.is_authenticated().await;
        let (song, comments) = futures::join!(
            self.api.get_song(song_id),
            self.api.comments(ItemKind::Song, song_id),
        );
        let song = match song {
            Ok(song) => song,
            Err(e) => {
                self.screen_failed(generation, "song", e).await;
                return;
            }
        };
        let liked = if authenticated {
            match self.api.is_liked(ItemKind::Song, song_id).await {
                Ok(liked) => {
                    if liked {
                        self.liked.add(song_id.to_string()).await;
                    } else {
                        self.liked.remove(song_id).await;
                    }
                    liked
                }
                Err(e) => {
                    tracing::warn!(song_id, error = %e, "Failed to check song like");
                    self.liked.is_liked(song_id).await
                }
            }
        } else {
            false
        };

        self.model
            .lock()
            .await
            .finish_screen(generation, |view| {
                if let ContentView::SongDetail { detail, .. } = view {
                    detail.song = Some(song);
                    detail.liked = liked;
                    match comments {
                        Ok(comments) => {
                            detail.comments = comments;
                            detail.comments_state = LoadState::Ready;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to load song comments");
                            detail.comments_state = LoadState::Failed(Self::format_error(&e));
                        }
                    }
                }
            })
            .await;
    }

    async fn load_album(&self, generation: u64, album_id: &str) {
        let model = self.model.lock().await;
        match self.catalog.album(album_id).await {
            Some(album) => {
                let tracks = self.catalog.album_tracks(&album).await;
                model
                    .finish_screen(generation, |view| {
                        *view = ContentView::AlbumDetail {
                            album: Some(album),
                            tracks,
                            selected_index: 0,
                        };
                    })
                    .await;
            }
            None => {
                tracing::warn!(album_id, "Album not in catalog");
                model.fail_screen(generation, "Album not found".to_string()).await;
            }
        }
    }

    async fn load_liked_songs(&self, generation: u64) {
        match self.api.liked_songs().await {
            Ok(tracks) => {
                self.liked.update(tracks.iter().map(|t| t.id.clone()).collect()).await;
                if let Err(e) = self.liked.save_to_disk().await {
                    tracing::warn!(error = %e, "Failed to save liked songs cache");
                }
                self.model
                    .lock()
                    .await
                    .finish_screen(generation, |view| {
                        *view = ContentView::LikedSongs { tracks, selected_index: 0 };
                    })
                    .await;
            }
            Err(e) => self.screen_failed(generation, "liked songs", e).await,
        }
    }

    async fn load_downloads(&self, generation: u64) {
        match self.api.user_downloads().await {
            Ok(records) => {
                self.model
                    .lock()
                    .await
                    .finish_screen(generation, |view| {
                        *view = ContentView::Downloads { records, selected_index: 0 };
                    })
                    .await;
            }
            Err(e) => self.screen_failed(generation, "downloads", e).await,
        }
    }

    /// Sends the query in the search box. Results for an older query are dropped.
    pub async fn perform_search(&self) {
        let model = self.model.lock().await;
        let request = model
            .with_view(|view| match view {
                ContentView::Search { query, tab, results, selected_index } => {
                    if query.trim().is_empty() {
                        *results = SearchResults::default();
                        *selected_index = 0;
                        None
                    } else {
                        Some((query.trim().to_string(), *tab))
                    }
                }
                _ => None,
            })
            .await;
        let Some((query, tab)) = request else {
            return;
        };
        let generation = model.next_generation().await;
        model.content_state.lock().await.load_state = LoadState::Loading;
        drop(model);

        tracing::debug!(query, tab = tab.label(), "Performing search");
        let controller = self.clone();
        tokio::spawn(async move {
            match controller.api.search(&query, tab).await {
                Ok(results) => {
                    tracing::info!(query, results = results.len(), "Search completed successfully");
                    controller
                        .model
                        .lock()
                        .await
                        .finish_screen(generation, |view| {
                            if let ContentView::Search { results: rows, selected_index, .. } = view {
                                *rows = results;
                                *selected_index = 0;
                            }
                        })
                        .await;
                }
                Err(e) => controller.screen_failed(generation, "search", e).await,
            }
        });
    }

    pub async fn handle_selected_item(&self, item: SelectedItem) {
        match item {
            SelectedItem::Track { track, context } => {
                let is_current = self
                    .player
                    .current_track()
                    .await
                    .is_some_and(|current| current.id == track.id);
                if is_current {
                    self.toggle_playback().await;
                } else {
                    self.player.play_track(track, context).await;
                }
            }
            SelectedItem::Album { id } => self.navigate(Route::Album(id)).await,
            SelectedItem::Playlist { id } => self.navigate(Route::Playlist(id)).await,
            SelectedItem::Comment { comment } => self.edit_comment(comment).await,
            SelectedItem::QueueEntry { index } => {
                let info = self.player.snapshot().await;
                if let Some(track) = info.queue.get(index).cloned() {
                    if index == info.position && info.track.is_some() {
                        self.toggle_playback().await;
                        return;
                    }
                    let context = PlayContext {
                        playlist_id: info.current_playlist,
                        tracks: info.queue,
                    };
                    self.player.play_track(track, Some(context)).await;
                }
            }
        }
    }

    /// Opens the song detail screen for the track under the cursor
    pub async fn open_selected_song(&self) {
        let selected = self.model.lock().await.get_selected_content_item().await;
        match selected {
            Some(SelectedItem::Track { track, .. }) => self.navigate(Route::Song(track.id)).await,
            Some(SelectedItem::QueueEntry { index }) => {
                let info = self.player.snapshot().await;
                if let Some(track) = info.queue.get(index) {
                    self.navigate(Route::Song(track.id.clone())).await;
                }
            }
            _ => {}
        }
    }
}

fn auth_view(kind: FormKind) -> ContentView {
    ContentView::Auth { form: Form::new(kind) }
}
