//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model, the backend and the player.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Transport commands forwarded to the player
//! - `navigation`: Routing and per-screen data loading
//! - `forms`: Submitting auth and editing forms
//! - `actions`: Likes, playlist edits, comments, downloads
//! - `player_events`: Audio output event listener

mod actions;
mod forms;
mod input;
mod navigation;
mod playback;
mod player_events;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::audio::Player;
use crate::auth::SessionStore;
use crate::config::Settings;
use crate::error::ApiError;
use crate::model::{ApiClient, AppModel, CatalogCache, LikedSongsCache, Route};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) player: Player,
    pub(crate) api: ApiClient,
    pub(crate) session: SessionStore,
    pub(crate) catalog: CatalogCache,
    pub(crate) liked: LikedSongsCache,
    pub(crate) settings: Arc<Settings>,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        player: Player,
        api: ApiClient,
        session: SessionStore,
        catalog: CatalogCache,
        liked: LikedSongsCache,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            model,
            player,
            api,
            session,
            catalog,
            liked,
            settings,
        }
    }

    pub(crate) fn format_error(error: &ApiError) -> String {
        if let Some(message) = error.backend_message() {
            return message.to_string();
        }
        match error {
            ApiError::AuthRequired => "Please log in to continue.".to_string(),
            ApiError::Transport(_) => "Cannot reach the server. Check your connection.".to_string(),
            ApiError::Status { status: 401, .. } => {
                "Session expired. Please log in again.".to_string()
            }
            ApiError::Status { status: 403, .. } => "You are not allowed to do that.".to_string(),
            ApiError::Status { status: 404, .. } => "Not found.".to_string(),
            ApiError::Status { status: 429, .. } => "Rate limited. Please wait a moment.".to_string(),
            other => format!("Error: {}", other),
        }
    }

    /// Missing or rejected session: forget it and go to the login screen
    pub(crate) fn needs_login(error: &ApiError) -> bool {
        matches!(error, ApiError::AuthRequired) || error.status() == Some(401)
    }

    /// Logs a failed action and shows it in the error overlay
    pub(crate) async fn report_api_error(&self, action: &str, error: ApiError) {
        tracing::error!(action, error = %error, "Backend call failed");
        self.model.lock().await.set_error(Self::format_error(&error)).await;
        if Self::needs_login(&error) {
            self.expire_session().await;
        }
    }

    pub(crate) async fn expire_session(&self) {
        if self.session.is_authenticated().await {
            tracing::warn!("Session rejected by the backend");
            self.session.logout().await;
            self.model.lock().await.set_user_name(None).await;
        }
        self.show_route(Route::Login).await;
    }
}
