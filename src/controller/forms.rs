//! Form editing and submission
//!
//! Auth screens keep their form in the content view; editing dialogs keep it
//! in the overlay. Whichever is active receives keystrokes and submits.

use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::file::AudioFile;

use crate::auth::{Session, validation};
use crate::error::ApiError;
use crate::model::{
    CommentChange, ContentView, Form, FormKind, ItemKind, NewUser, PlaylistDraft, Route, SongUpload,
    format_duration_label,
};
use super::AppController;

impl AppController {
    /// Runs `edit` on the overlay form, or the auth screen form when there is no overlay
    pub(crate) async fn with_active_form<T>(&self, edit: impl FnOnce(&mut Form) -> T) -> Option<T> {
        let model = self.model.lock().await;
        {
            let mut ui = model.ui_state.lock().await;
            if let Some(form) = ui.overlay_form.as_mut() {
                return Some(edit(form));
            }
        }
        model
            .with_view(|view| match view {
                ContentView::Auth { form } => Some(edit(form)),
                _ => None,
            })
            .await
    }

    async fn fail_form(&self, message: String) {
        tracing::debug!(error = %message, "Form rejected");
        self.with_active_form(|form| form.set_error(message)).await;
    }

    /// Inline message for a backend failure; a dead session also sends the user to log in
    async fn form_api_error(&self, action: &str, error: ApiError) -> String {
        tracing::error!(action, error = %error, "Form submission failed");
        let message = Self::format_error(&error);
        if Self::needs_login(&error) {
            self.model.lock().await.close_overlay_form().await;
            self.expire_session().await;
        }
        message
    }

    pub async fn submit_form(&self) {
        let form = self
            .with_active_form(|form| {
                if form.submitting {
                    return None;
                }
                form.submitting = true;
                form.error = None;
                Some(form.clone())
            })
            .await
            .flatten();
        let Some(form) = form else {
            return;
        };
        tracing::debug!(form = form.kind.title(), "Submitting form");

        let result = match &form.kind {
            FormKind::Login => self.submit_login(&form).await,
            FormKind::Register => self.submit_register(&form).await,
            FormKind::ForgotPassword => self.submit_forgot_password(&form).await,
            FormKind::ResetPassword { token } => self.submit_reset_password(&form, token).await,
            FormKind::CreatePlaylist => self.submit_playlist(&form, None).await,
            FormKind::EditPlaylist { playlist_id } => {
                self.submit_playlist(&form, Some(playlist_id)).await
            }
            FormKind::Comment { kind, item_id, editing } => {
                self.submit_comment(&form, *kind, item_id, editing.as_deref()).await
            }
            FormKind::UploadSong { playlist_id } => self.submit_upload(&form, playlist_id).await,
        };

        if let Err(message) = result {
            self.fail_form(message).await;
        }
    }

    async fn submit_login(&self, form: &Form) -> Result<(), String> {
        let email = form.value("Email");
        let password = form.value("Password");
        validation::login(email, password).map_err(|e| e.to_string())?;
        let session = self.session.login(email, password).await.map_err(|e| e.message)?;
        self.logged_in(session).await;
        Ok(())
    }

    async fn submit_register(&self, form: &Form) -> Result<(), String> {
        let name = form.value("Name");
        let email = form.value("Email");
        let password = form.value("Password");
        validation::register(name, email, password, form.value("Confirm password"))
            .map_err(|e| e.to_string())?;
        let profile = NewUser {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let session = self.session.register(profile).await.map_err(|e| e.message)?;
        self.logged_in(session).await;
        Ok(())
    }

    async fn submit_forgot_password(&self, form: &Form) -> Result<(), String> {
        let email = form.value("Email");
        validation::forgot_password(email).map_err(|e| e.to_string())?;
        let message = self.session.forgot_password(email).await.map_err(|e| e.message)?;
        self.with_active_form(|form| form.set_message(message)).await;
        Ok(())
    }

    async fn submit_reset_password(&self, form: &Form, token: &str) -> Result<(), String> {
        let password = form.value("New password");
        validation::reset_password(password, form.value("Confirm password"))
            .map_err(|e| e.to_string())?;
        let message = self
            .session
            .reset_password(token, password)
            .await
            .map_err(|e| e.message)?;
        self.show_route(Route::Login).await;
        self.with_active_form(|form| form.set_message(message)).await;
        Ok(())
    }

    async fn logged_in(&self, session: Session) {
        tracing::info!(user = %session.name, "Signed in");
        let model = self.model.lock().await;
        model.set_user_name(Some(session.name.clone())).await;
        model.clear_history().await;
        drop(model);
        self.load_user_playlists().await;
        self.show_route(Route::Home).await;
    }

    async fn submit_playlist(&self, form: &Form, playlist_id: Option<&String>) -> Result<(), String> {
        let name = form.value("Name");
        validation::playlist_name(name).map_err(|e| e.to_string())?;
        let draft = PlaylistDraft {
            name: name.trim().to_string(),
            description: form.value("Description").trim().to_string(),
            is_public: form.is_checked("Public"),
        };

        let (result, info) = match playlist_id {
            Some(id) => (self.api.update_playlist(id, &draft).await, "Playlist updated"),
            None => (self.api.create_playlist(&draft).await, "Playlist created"),
        };
        let playlist = match result {
            Ok(playlist) => playlist,
            Err(e) => return Err(self.form_api_error("save playlist", e).await),
        };
        tracing::info!(playlist_id = %playlist.id, name = %draft.name, "{}", info);

        let model = self.model.lock().await;
        model.close_overlay_form().await;
        model.set_info(info.to_string()).await;
        let route = model.current_route().await;
        drop(model);

        self.load_user_playlists().await;
        if matches!(route, Route::Playlists | Route::Playlist(_)) {
            self.show_route(route).await;
        }
        Ok(())
    }

    async fn submit_comment(
        &self,
        form: &Form,
        kind: ItemKind,
        item_id: &str,
        editing: Option<&str>,
    ) -> Result<(), String> {
        let content = form.value("Comment");
        validation::comment(content).map_err(|e| e.to_string())?;
        let content = content.trim();

        let change = match editing {
            Some(comment_id) => self
                .api
                .edit_comment(comment_id, content)
                .await
                .map(CommentChange::Edited),
            None => self
                .api
                .add_comment(kind, item_id, content)
                .await
                .map(CommentChange::Added),
        };
        let change = match change {
            Ok(change) => change,
            Err(e) => return Err(self.form_api_error("save comment", e).await),
        };

        let model = self.model.lock().await;
        model.close_overlay_form().await;
        model.apply_comment_change(change).await;
        Ok(())
    }

    async fn submit_upload(&self, form: &Form, playlist_id: &str) -> Result<(), String> {
        let name = form.value("Name");
        let audio = form.value("Audio file");
        let image = form.value("Image file");
        validation::upload(name, audio, image).map_err(|e| e.to_string())?;

        let audio = expand_path(audio);
        let image = expand_path(image);
        let duration = read_duration(audio.clone()).await;
        let meta = SongUpload {
            name: name.trim().to_string(),
            desc: form.value("Description").trim().to_string(),
            artist: form.value("Artist").trim().to_string(),
            genre: form.value("Genre").trim().to_string(),
            duration: format_duration_label(duration.as_secs()),
        };

        let song = match self.api.upload_song(&meta, &audio, &image).await {
            Ok(song) => song,
            Err(e) => return Err(self.form_api_error("upload song", e).await),
        };
        tracing::info!(song_id = %song.id, playlist_id, "Song uploaded");
        if let Err(e) = self.api.add_song_to_playlist(playlist_id, &song.id).await {
            return Err(self.form_api_error("add uploaded song", e).await);
        }

        let model = self.model.lock().await;
        model.close_overlay_form().await;
        model.set_info(format!("Uploaded \"{}\"", meta.name)).await;
        drop(model);

        if let Err(e) = self.refresh_catalog().await {
            tracing::warn!(error = %e, "Failed to refresh catalog after upload");
        }
        self.show_route(Route::Playlist(playlist_id.to_string())).await;
        Ok(())
    }
}

/// `~/x` relative to the home directory, anything else as typed
fn expand_path(input: &str) -> PathBuf {
    let input = input.trim();
    if let Some(rest) = input.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return Path::new(&home).join(rest);
    }
    PathBuf::from(input)
}

/// Length of a local audio file; zero when the file cannot be probed
async fn read_duration(path: PathBuf) -> Duration {
    let probed = tokio::task::spawn_blocking(move || {
        lofty::read_from_path(&path).map(|tagged| tagged.properties().duration())
    })
    .await;
    match probed {
        Ok(Ok(duration)) => duration,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Could not read audio duration");
            Duration::ZERO
        }
        Err(e) => {
            tracing::warn!(error = %e, "Duration probe task failed");
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = std::env::var_os("HOME") else {
            return;
        };
        assert_eq!(expand_path("~/music/a.mp3"), Path::new(&home).join("music/a.mp3"));
        assert_eq!(expand_path(" /tmp/b.mp3 "), PathBuf::from("/tmp/b.mp3"));
    }

    #[tokio::test]
    async fn unreadable_audio_has_zero_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-audio.mp3");
        std::fs::write(&path, b"plain text").unwrap();
        assert_eq!(read_duration(path).await, Duration::ZERO);
    }
}
