//! Model module - Application state and data types
//!
//! - `types`: Core type definitions (enums, UI state, etc.)
//! - `route`: Client routes and the session guard
//! - `forms`: Text-entry forms for auth and editing overlays
//! - `content`: Catalog entities and per-screen view state
//! - `playback`: Queue and transport state machine
//! - `cache`: Catalog and liked-songs caches
//! - `api_client`: Backend HTTP client
//! - `app_model`: Main application model with state management methods

mod types;
mod route;
mod forms;
mod content;
mod playback;
mod cache;
mod api_client;
mod app_model;

pub use types::{
    ActiveSection, NavItem, PendingConfirm, PlaylistItem, PlaylistPicker, RepeatMode, SearchTab,
    SelectedItem, UiState,
};

pub use route::Route;

pub use forms::{Form, FormField, FormKind};

pub use content::{
    Album, Comment, ContentState, ContentView, DetailFocus, DownloadRecord, ItemKind, LoadState,
    Playlist, PlaylistDetailView, SearchResults, SearchRow, SongDetailView, SongRef, Track,
    UserRef, format_duration_label,
};

pub use playback::{ErrorOutcome, OutputOp, PlayContext, PlaybackInfo, PlayerState};

pub use cache::{CatalogCache, LikedSongsCache};

pub use api_client::{ApiClient, NewUser, PlaylistDraft, SongUpload};

pub use app_model::{AppModel, CommentChange};
