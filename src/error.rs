//! Error types shared across the client

use thiserror::Error;

/// Errors raised by `ApiClient` when talking to the backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout, body read)
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("Server error ({status}): {message}")]
    Status { status: u16, message: String },

    /// The backend answered 2xx but the body did not have the expected shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The operation needs a session and there is none
    #[error("Authentication required")]
    AuthRequired,

    /// Reading a local file for an upload failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message as the backend phrased it, when there is one
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Authentication failure carrying the backend's message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Build from an API failure, falling back to `fallback` when the backend gave no message
    pub fn from_api(error: &ApiError, fallback: &str) -> Self {
        match error.backend_message() {
            Some(message) => Self::new(message),
            None => match error {
                ApiError::Status { .. } | ApiError::Parse(_) => Self::new(fallback),
                other => Self::new(format!("{}: {}", fallback, other)),
            },
        }
    }
}

/// Form-level validation, checked before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// Rejected transport commands
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("No track selected")]
    NoTrack,

    #[error("Cannot seek to {requested:.1}s (track length {duration:.1}s)")]
    SeekOutOfRange { requested: f64, duration: f64 },

    #[error("Volume must be a finite number")]
    InvalidVolume,

    #[error("Queue index {index} out of range (queue length {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Failures of the on-disk session record
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session record: {0}")]
    Corrupt(#[from] serde_json::Error),
}
