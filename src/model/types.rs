//! Core type definitions for the application

use std::time::Instant;

use super::content::{Comment, Track};
use super::forms::Form;
use super::playback::PlayContext;
use super::route::Route;

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Navigation,
    Playlists,
    MainContent,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Navigation => ActiveSection::Playlists,
            ActiveSection::Playlists => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Navigation,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Navigation => ActiveSection::MainContent,
            ActiveSection::Playlists => ActiveSection::Navigation,
            ActiveSection::MainContent => ActiveSection::Playlists,
        }
    }
}

/// An entry of the sidebar's navigation list
#[derive(Clone, Debug)]
pub struct NavItem {
    pub name: &'static str,
    pub route: Route,
}

/// A user's playlist (for sidebar display)
#[derive(Clone, Debug)]
pub struct PlaylistItem {
    pub id: String,
    pub name: String,
}

/// Repeat mode: what happens when a track ends
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    /// off → all → one → off
    pub fn next(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::Off => "Off",
            RepeatMode::All => "All",
            RepeatMode::One => "One",
        }
    }
}

/// Search filter tabs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchTab {
    #[default]
    All,
    Songs,
    Albums,
    Playlists,
}

impl SearchTab {
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Songs,
            Self::Songs => Self::Albums,
            Self::Albums => Self::Playlists,
            Self::Playlists => Self::All,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::All => Self::Playlists,
            Self::Songs => Self::All,
            Self::Albums => Self::Songs,
            Self::Playlists => Self::Albums,
        }
    }

    /// Value of the `type` query parameter, `None` for the unfiltered tab
    pub fn query_type(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Songs => Some("song"),
            Self::Albums => Some("album"),
            Self::Playlists => Some("playlist"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Songs => "Songs",
            Self::Albums => "Albums",
            Self::Playlists => "Playlists",
        }
    }
}

/// Item under the cursor in the main content area
#[derive(Clone, Debug)]
pub enum SelectedItem {
    Track {
        track: Track,
        context: Option<PlayContext>,
    },
    Album { id: String },
    Playlist { id: String },
    Comment { comment: Comment },
    QueueEntry { index: usize },
}

/// Confirmation prompts for destructive actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingConfirm {
    DeletePlaylist { playlist_id: String, name: String },
    DeleteComment { comment_id: String },
    RemoveFromPlaylist { playlist_id: String, song_id: String, name: String },
}

impl PendingConfirm {
    pub fn prompt(&self) -> String {
        match self {
            PendingConfirm::DeletePlaylist { name, .. } => {
                format!("Delete playlist \"{}\"?", name)
            }
            PendingConfirm::DeleteComment { .. } => "Delete this comment?".to_string(),
            PendingConfirm::RemoveFromPlaylist { name, .. } => {
                format!("Remove \"{}\" from this playlist?", name)
            }
        }
    }
}

/// The user's playlists, offered when adding a song to one
#[derive(Clone, Debug)]
pub struct PlaylistPicker {
    pub song_id: String,
    pub selected: usize,
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub route: Route,
    pub nav_items: Vec<NavItem>,
    pub nav_selected: usize,
    pub playlists: Vec<PlaylistItem>,
    pub playlist_selected: usize,
    pub user_name: Option<String>,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub info_message: Option<String>,
    pub info_timestamp: Option<Instant>,
    pub overlay_form: Option<Form>,
    pub confirm: Option<PendingConfirm>,
    pub playlist_picker: Option<PlaylistPicker>,
    pub show_help_popup: bool,
    /// Search text typed but not yet sent
    pub search_deadline: Option<Instant>,
    /// Routes to return to with Esc, most recent last
    pub history: Vec<Route>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::MainContent,
            route: Route::Home,
            nav_items: vec![
                NavItem { name: "Home", route: Route::Home },
                NavItem { name: "Search", route: Route::Search },
                NavItem { name: "Your playlists", route: Route::Playlists },
                NavItem { name: "Liked songs", route: Route::LikedSongs },
                NavItem { name: "Downloads", route: Route::Downloads },
                NavItem { name: "Queue", route: Route::Queue },
            ],
            nav_selected: 0,
            playlists: vec![],
            playlist_selected: 0,
            user_name: None,
            error_message: None,
            error_timestamp: None,
            info_message: None,
            info_timestamp: None,
            overlay_form: None,
            confirm: None,
            playlist_picker: None,
            show_help_popup: false,
            search_deadline: None,
            history: Vec::new(),
        }
    }
}
