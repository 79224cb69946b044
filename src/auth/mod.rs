//! Session store: who is logged in, persisted across restarts

mod storage;
pub mod validation;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{AuthError, StorageError};
use crate::model::{ApiClient, NewUser};

pub use storage::SessionStorage;

/// Authenticated identity plus bearer token, as returned by login/register
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub token: String,
}

#[derive(Clone)]
pub struct SessionStore {
    api: ApiClient,
    storage: SessionStorage,
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn new(api: ApiClient, storage: SessionStorage) -> Self {
        Self {
            api,
            storage,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Loads the persisted record, no network involved. A corrupt record is discarded.
    pub async fn restore(&self) -> Option<Session> {
        let session = match self.storage.load() {
            Ok(session) => session,
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable session record");
                if let Err(e) = self.storage.clear() {
                    tracing::warn!(error = %e, "Failed to remove session record");
                }
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session record");
                None
            }
        };
        if let Some(session) = &session {
            tracing::info!(user_id = %session.id, "Restored session");
        }
        self.install(session.clone()).await;
        session
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    pub async fn register(&self, profile: NewUser) -> Result<Session, AuthError> {
        let session = self
            .api
            .register(&profile)
            .await
            .map_err(|e| AuthError::from_api(&e, "Registration failed"))?;
        self.persist(&session).await;
        Ok(session)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self
            .api
            .login(email.trim(), password)
            .await
            .map_err(|e| AuthError::from_api(&e, "Login failed"))?;
        self.persist(&session).await;
        Ok(session)
    }

    pub async fn logout(&self) {
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "Failed to remove session record");
        }
        self.install(None).await;
        tracing::info!("Logged out");
    }

    /// Returns the message to show on success
    pub async fn forgot_password(&self, email: &str) -> Result<String, AuthError> {
        self.api
            .forgot_password(email.trim())
            .await
            .map(|msg| msg.unwrap_or_else(|| "Password reset email sent".to_string()))
            .map_err(|e| AuthError::from_api(&e, "Failed to send reset email"))
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<String, AuthError> {
        self.api
            .reset_password(token, new_password)
            .await
            .map(|msg| msg.unwrap_or_else(|| "Password has been reset".to_string()))
            .map_err(|e| AuthError::from_api(&e, "Failed to reset password"))
    }

    async fn persist(&self, session: &Session) {
        // The session still works for this run if the disk write fails
        if let Err(e) = self.storage.save(session) {
            tracing::error!(error = %e, "Failed to persist session");
        }
        tracing::info!(user_id = %session.id, "Logged in");
        self.install(Some(session.clone())).await;
    }

    async fn install(&self, session: Option<Session>) {
        self.api.set_token(session.as_ref().map(|s| s.token.clone())).await;
        *self.current.write().await = session;
    }
}

#[cfg(test)]
mod tests;
