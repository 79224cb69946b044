//! Likes, comments, playlist edits, downloads and logout

use std::path::PathBuf;

use crate::model::{
    CommentChange, Comment, ContentView, DetailFocus, Form, FormKind, ItemKind, PendingConfirm,
    Route, SelectedItem, Track,
};
use super::AppController;

impl AppController {
    async fn current_user_id(&self) -> Option<String> {
        self.session.current().await.map(|s| s.id)
    }

    async fn selected_track(&self) -> Option<Track> {
        let model = self.model.lock().await;
        match model.get_selected_content_item().await? {
            SelectedItem::Track { track, .. } => Some(track),
            SelectedItem::QueueEntry { index } => {
                drop(model);
                self.player.snapshot().await.queue.get(index).cloned()
            }
            _ => None,
        }
    }

    /// Like or unlike the song under the cursor. The UI flips first and
    /// flips back if the backend refuses.
    pub async fn toggle_like_selected(&self) {
        let Some(track) = self.selected_track().await else {
            return;
        };
        let song_id = track.id.clone();
        let was_liked = self.liked.is_liked(&song_id).await
            || self
                .model
                .lock()
                .await
                .with_view(|view| match view {
                    ContentView::SongDetail { detail, .. } => detail.song_id == song_id && detail.liked,
                    ContentView::LikedSongs { .. } => true,
                    _ => false,
                })
                .await;
        let liked = !was_liked;

        self.set_song_liked(&song_id, liked).await;
        let result = if liked {
            self.api.like(ItemKind::Song, &song_id).await
        } else {
            self.api.unlike(ItemKind::Song, &song_id).await
        };
        match result {
            Ok(()) => {
                tracing::info!(song = %track.name(), liked, "Song like toggled");
                if let Err(e) = self.liked.save_to_disk().await {
                    tracing::warn!(error = %e, "Failed to save liked songs cache");
                }
            }
            Err(e) => {
                self.set_song_liked(&song_id, was_liked).await;
                self.report_api_error("like song", e).await;
            }
        }
    }

    async fn set_song_liked(&self, song_id: &str, liked: bool) {
        if liked {
            self.liked.add(song_id.to_string()).await;
        } else {
            self.liked.remove(song_id).await;
        }
        self.model.lock().await.update_song_liked(song_id, liked).await;
    }

    /// Like or unlike the open playlist
    pub async fn toggle_like_playlist(&self) {
        let target = self
            .model
            .lock()
            .await
            .with_view(|view| match view {
                ContentView::PlaylistDetail { detail, .. } if detail.playlist.is_some() => {
                    Some((detail.playlist_id.clone(), detail.liked))
                }
                _ => None,
            })
            .await;
        let Some((playlist_id, was_liked)) = target else {
            return;
        };
        let liked = !was_liked;

        self.model.lock().await.update_playlist_liked(&playlist_id, liked).await;
        let result = if liked {
            self.api.like(ItemKind::Playlist, &playlist_id).await
        } else {
            self.api.unlike(ItemKind::Playlist, &playlist_id).await
        };
        if let Err(e) = result {
            self.model.lock().await.update_playlist_liked(&playlist_id, was_liked).await;
            self.report_api_error("like playlist", e).await;
        }
    }

    pub async fn open_playlist_picker(&self) {
        let Some(track) = self.selected_track().await else {
            return;
        };
        let model = self.model.lock().await;
        if model.get_ui_state().await.playlists.is_empty() {
            model.set_info("Create a playlist first".to_string()).await;
            return;
        }
        model.open_playlist_picker(track.id).await;
    }

    pub async fn add_to_chosen_playlist(&self) {
        let model = self.model.lock().await;
        let choice = model.playlist_picker_choice().await;
        model.close_playlist_picker().await;
        drop(model);
        let Some((playlist_id, song_id)) = choice else {
            return;
        };

        match self.api.playlist_playback(&playlist_id).await {
            Ok(playlist) if playlist.contains_song(&song_id) => {
                self.model
                    .lock()
                    .await
                    .set_info("Song is already in this playlist".to_string())
                    .await;
                return;
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(playlist_id, error = %e, "Could not check playlist contents"),
        }

        match self.api.add_song_to_playlist(&playlist_id, &song_id).await {
            Ok(()) => {
                tracing::info!(playlist_id, song_id, "Song added to playlist");
                self.model
                    .lock()
                    .await
                    .set_info("Song added to playlist".to_string())
                    .await;
            }
            Err(e) => self.report_api_error("add song to playlist", e).await,
        }
    }

    /// Asks before deleting whatever is under the cursor
    pub async fn request_delete(&self) {
        let user_id = self.current_user_id().await;
        let model = self.model.lock().await;
        let selected = model.get_selected_content_item().await;
        let confirm = model
            .with_view(|view| match (view, selected) {
                (ContentView::Playlists { playlists, selected_index }, _) => {
                    playlists.get(*selected_index).map(|p| PendingConfirm::DeletePlaylist {
                        playlist_id: p.id.clone(),
                        name: p.name().to_string(),
                    })
                }
                (
                    ContentView::PlaylistDetail { detail, focus: DetailFocus::Tracks, .. },
                    Some(SelectedItem::Track { track, .. }),
                ) => {
                    let playlist = detail.playlist.as_ref()?;
                    let owner = user_id.as_deref()?;
                    playlist.is_owned_by(owner).then(|| PendingConfirm::RemoveFromPlaylist {
                        playlist_id: playlist.id.clone(),
                        song_id: track.id.clone(),
                        name: track.name().to_string(),
                    })
                }
                (_, Some(SelectedItem::Comment { comment })) => {
                    let author = user_id.as_deref()?;
                    comment
                        .is_by(author)
                        .then(|| PendingConfirm::DeleteComment { comment_id: comment.id.clone() })
                }
                _ => None,
            })
            .await;
        if confirm.is_some() {
            model.set_confirm(confirm).await;
        }
    }

    pub async fn confirm_pending(&self) {
        let Some(confirm) = self.model.lock().await.take_confirm().await else {
            return;
        };
        match confirm {
            PendingConfirm::DeletePlaylist { playlist_id, name } => {
                match self.api.delete_playlist(&playlist_id).await {
                    Ok(()) => {
                        tracing::info!(playlist_id, "Playlist deleted");
                        self.model.lock().await.set_info(format!("Deleted \"{}\"", name)).await;
                        self.load_user_playlists().await;
                        if self.model.lock().await.current_route().await == Route::Playlists {
                            self.show_route(Route::Playlists).await;
                        }
                    }
                    Err(e) => self.report_api_error("delete playlist", e).await,
                }
            }
            PendingConfirm::RemoveFromPlaylist { playlist_id, song_id, name } => {
                match self.api.remove_song_from_playlist(&playlist_id, &song_id).await {
                    Ok(()) => {
                        tracing::info!(playlist_id, song_id, "Song removed from playlist");
                        self.model.lock().await.set_info(format!("Removed \"{}\"", name)).await;
                        self.show_route(Route::Playlist(playlist_id)).await;
                    }
                    Err(e) => self.report_api_error("remove song from playlist", e).await,
                }
            }
            PendingConfirm::DeleteComment { comment_id } => {
                match self.api.delete_comment(&comment_id).await {
                    Ok(()) => {
                        self.model
                            .lock()
                            .await
                            .apply_comment_change(CommentChange::Deleted(comment_id))
                            .await;
                    }
                    Err(e) => self.report_api_error("delete comment", e).await,
                }
            }
        }
    }

    /// Kind and id of the item whose comments are on screen
    async fn comment_target(&self) -> Option<(ItemKind, String)> {
        self.model
            .lock()
            .await
            .with_view(|view| match view {
                ContentView::PlaylistDetail { detail, .. } => {
                    Some((ItemKind::Playlist, detail.playlist_id.clone()))
                }
                ContentView::SongDetail { detail, .. } => Some((ItemKind::Song, detail.song_id.clone())),
                _ => None,
            })
            .await
    }

    pub async fn open_comment_form(&self) {
        let Some((kind, item_id)) = self.comment_target().await else {
            return;
        };
        let form = Form::new(FormKind::Comment { kind, item_id, editing: None });
        self.model.lock().await.open_overlay_form(form).await;
    }

    /// Opens the edit dialog for one of the user's own comments
    pub async fn edit_comment(&self, comment: Comment) {
        let Some(user_id) = self.current_user_id().await else {
            return;
        };
        if !comment.is_by(&user_id) {
            return;
        }
        let Some((kind, item_id)) = self.comment_target().await else {
            return;
        };
        let form = Form::edit_comment(kind, item_id, comment.id.clone(), &comment.content);
        self.model.lock().await.open_overlay_form(form).await;
    }

    pub async fn open_create_playlist_form(&self) {
        self.model
            .lock()
            .await
            .open_overlay_form(Form::new(FormKind::CreatePlaylist))
            .await;
    }

    /// Edit form for the open playlist, when the user owns it
    pub async fn open_edit_playlist_form(&self) {
        let Some(user_id) = self.current_user_id().await else {
            return;
        };
        let model = self.model.lock().await;
        let form = model
            .with_view(|view| match view {
                ContentView::PlaylistDetail { detail, .. } => {
                    let playlist = detail.playlist.as_ref()?;
                    playlist.is_owned_by(&user_id).then(|| {
                        Form::edit_playlist(
                            playlist.id.clone(),
                            playlist.name(),
                            playlist.description(),
                            playlist.is_public,
                        )
                    })
                }
                _ => None,
            })
            .await;
        if let Some(form) = form {
            model.open_overlay_form(form).await;
        }
    }

    /// Upload dialog targeting the open playlist, when the user owns it
    pub async fn open_upload_form(&self) {
        let Some(user_id) = self.current_user_id().await else {
            return;
        };
        let model = self.model.lock().await;
        let playlist_id = model
            .with_view(|view| match view {
                ContentView::PlaylistDetail { detail, .. } => detail
                    .playlist
                    .as_ref()
                    .filter(|p| p.is_owned_by(&user_id))
                    .map(|p| p.id.clone()),
                _ => None,
            })
            .await;
        match playlist_id {
            Some(playlist_id) => {
                model
                    .open_overlay_form(Form::new(FormKind::UploadSong { playlist_id }))
                    .await;
            }
            None => {
                model
                    .set_info("Open one of your playlists to upload into it".to_string())
                    .await;
            }
        }
    }

    /// Saves the song under the cursor as `<downloads_dir>/<name>.mp3`
    pub async fn download_selected(&self) {
        let Some(track) = self.selected_track().await else {
            return;
        };
        let controller = self.clone();
        tokio::spawn(async move {
            controller
                .model
                .lock()
                .await
                .set_info(format!("Downloading \"{}\"...", track.name()))
                .await;
            match controller.download(&track).await {
                Ok(path) => {
                    tracing::info!(song_id = %track.id, path = %path.display(), "Song downloaded");
                    controller
                        .model
                        .lock()
                        .await
                        .set_info(format!("Saved {}", path.display()))
                        .await;
                }
                Err(message) => {
                    tracing::error!(song_id = %track.id, error = %message, "Download failed");
                    controller.model.lock().await.set_error(message).await;
                }
            }
        });
    }

    async fn download(&self, track: &Track) -> Result<PathBuf, String> {
        let url = match self.api.download_url(&track.id).await {
            Ok(url) => url,
            Err(e) => {
                if Self::needs_login(&e) {
                    self.expire_session().await;
                }
                return Err(Self::format_error(&e));
            }
        };
        let bytes = self
            .api
            .fetch_bytes(&url)
            .await
            .map_err(|e| Self::format_error(&e))?;

        let dir = &self.settings.storage.downloads_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| format!("Cannot create {}: {}", dir.display(), e))?;
        let path = dir.join(format!("{}.mp3", file_stem(track)));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| format!("Cannot write {}: {}", path.display(), e))?;
        Ok(path)
    }

    pub async fn logout(&self) {
        self.session.logout().await;
        self.liked.clear().await;
        let model = self.model.lock().await;
        model.set_user_name(None).await;
        model.set_playlists(Vec::new()).await;
        drop(model);
        self.show_route(Route::Login).await;
    }
}

/// Song name usable as a file name
fn file_stem(track: &Track) -> String {
    let cleaned: String = track
        .name()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('.');
    if cleaned.is_empty() {
        track.id.clone()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_strips_path_separators() {
        let track = Track {
            id: "s1".into(),
            name: Some("AC/DC: Live?".into()),
            ..Default::default()
        };
        assert_eq!(file_stem(&track), "AC_DC_ Live_");
    }

    #[test]
    fn nameless_track_uses_its_id() {
        let track = Track { id: "s9".into(), name: Some(" .. ".into()), ..Default::default() };
        assert_eq!(file_stem(&track), "s9");
    }
}
