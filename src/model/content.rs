//! Catalog entities as the backend returns them, plus the per-screen view state.
//!
//! Backend documents use `_id` and camelCase keys and leave many fields out.
//! Missing fields stay `None` here; the accessor methods apply the display
//! defaults (`Unknown Artist`, `Unknown Album`, empty strings).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::forms::Form;
use super::types::SearchTab;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
pub const UNKNOWN_OWNER: &str = "Unknown";

/// A single playable song
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    /// Display string such as `3:45`
    #[serde(default)]
    pub duration: Option<String>,
    /// Audio source URL
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Number or string depending on who uploaded the song
    #[serde(default)]
    pub release_year: Option<serde_json::Value>,
    #[serde(default)]
    pub likes_count: u32,
    #[serde(default)]
    pub comments_count: u32,
    #[serde(default)]
    pub downloads_count: u32,
}

impl Track {
    pub fn name(&self) -> &str {
        non_empty(&self.name).unwrap_or("")
    }

    pub fn artist(&self) -> &str {
        non_empty(&self.artist).unwrap_or(UNKNOWN_ARTIST)
    }

    pub fn album(&self) -> &str {
        non_empty(&self.album).unwrap_or(UNKNOWN_ALBUM)
    }

    pub fn genre(&self) -> &str {
        non_empty(&self.genre).unwrap_or("")
    }

    pub fn duration_label(&self) -> &str {
        non_empty(&self.duration).unwrap_or("")
    }

    pub fn source(&self) -> &str {
        non_empty(&self.file).unwrap_or("")
    }

    pub fn release_year(&self) -> Option<String> {
        match self.release_year.as_ref()? {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// Parses `m:ss` / `h:mm:ss` into seconds
    pub fn duration_secs(&self) -> Option<u64> {
        parse_duration_label(self.duration.as_deref()?)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

pub fn parse_duration_label(label: &str) -> Option<u64> {
    let parts: Vec<&str> = label.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut total = 0u64;
    for part in parts {
        let value: u64 = part.trim().parse().ok()?;
        total = total * 60 + value;
    }
    Some(total)
}

/// Seconds rendered the way the backend stores durations (`m:ss`)
pub fn format_duration_label(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Album {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
}

impl Album {
    pub fn name(&self) -> &str {
        non_empty(&self.name).unwrap_or("")
    }

    pub fn artist(&self) -> &str {
        non_empty(&self.artist).unwrap_or(UNKNOWN_ARTIST)
    }
}

/// `{_id, name}` as populated by the backend
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Owner/author references come back either populated or as a bare id
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Populated(UserSummary),
    Id(String),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Populated(user) => &user.id,
            UserRef::Id(id) => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            UserRef::Populated(user) => non_empty(&user.name).unwrap_or(UNKNOWN_OWNER),
            UserRef::Id(_) => UNKNOWN_OWNER,
        }
    }
}

/// Playlist songs are full documents on the playback endpoint and bare ids elsewhere
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SongRef {
    Full(Track),
    Id(String),
}

impl SongRef {
    pub fn id(&self) -> &str {
        match self {
            SongRef::Full(track) => &track.id,
            SongRef::Id(id) => id,
        }
    }

    pub fn track(&self) -> Option<&Track> {
        match self {
            SongRef::Full(track) => Some(track),
            SongRef::Id(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub songs: Vec<SongRef>,
    #[serde(default)]
    pub likes_count: u32,
}

fn default_public() -> bool {
    true
}

impl Playlist {
    pub fn name(&self) -> &str {
        non_empty(&self.name).unwrap_or("")
    }

    pub fn description(&self) -> &str {
        non_empty(&self.description).unwrap_or("")
    }

    pub fn owner_name(&self) -> &str {
        self.user.as_ref().map(UserRef::name).unwrap_or(UNKNOWN_OWNER)
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.id() == user_id)
    }

    /// Songs that came back as full documents, in playlist order
    pub fn tracks(&self) -> Vec<Track> {
        self.songs.iter().filter_map(SongRef::track).cloned().collect()
    }

    pub fn contains_song(&self, song_id: &str) -> bool {
        self.songs.iter().any(|s| s.id() == song_id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn author(&self) -> &str {
        self.user.as_ref().map(UserRef::name).unwrap_or(UNKNOWN_OWNER)
    }

    pub fn is_by(&self, user_id: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.id() == user_id)
    }

    /// `2024-01-31 at 14:05`
    pub fn posted_label(&self) -> String {
        self.created_at
            .map(|at| at.format("%Y-%m-%d at %H:%M").to_string())
            .unwrap_or_default()
    }
}

/// One entry of the user's download history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub song: Option<Track>,
    #[serde(default)]
    pub downloaded_at: Option<DateTime<Utc>>,
}

/// What comments, likes and downloads are attached to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Song,
    Playlist,
}

impl ItemKind {
    pub fn as_path(self) -> &'static str {
        match self {
            ItemKind::Song => "song",
            ItemKind::Playlist => "playlist",
        }
    }
}

/// Combined search results
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub songs: Vec<Track>,
    #[serde(default)]
    pub albums: Vec<Album>,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty() && self.albums.is_empty() && self.playlists.is_empty()
    }

    pub fn len(&self) -> usize {
        self.songs.len() + self.albums.len() + self.playlists.len()
    }

    /// Flattened rows in display order: songs, then albums, then playlists
    pub fn row(&self, index: usize) -> Option<SearchRow<'_>> {
        if index < self.songs.len() {
            return Some(SearchRow::Song(&self.songs[index]));
        }
        let index = index - self.songs.len();
        if index < self.albums.len() {
            return Some(SearchRow::Album(&self.albums[index]));
        }
        let index = index - self.albums.len();
        self.playlists.get(index).map(SearchRow::Playlist)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum SearchRow<'a> {
    Song(&'a Track),
    Album(&'a Album),
    Playlist(&'a Playlist),
}

/// Data a screen is still waiting on, or the inline error it ended with
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// Detail screen for a single song
#[derive(Clone, Debug, Default)]
pub struct SongDetailView {
    pub song_id: String,
    pub song: Option<Track>,
    pub liked: bool,
    pub comments: Vec<Comment>,
    pub comments_state: LoadState,
}

/// Detail screen for a playlist
#[derive(Clone, Debug, Default)]
pub struct PlaylistDetailView {
    pub playlist_id: String,
    pub playlist: Option<Playlist>,
    pub liked: bool,
    pub comments: Vec<Comment>,
    pub comments_state: LoadState,
}

/// Which pane of a detail screen has the cursor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetailFocus {
    #[default]
    Tracks,
    Comments,
}

impl DetailFocus {
    pub fn toggle(self) -> Self {
        match self {
            DetailFocus::Tracks => DetailFocus::Comments,
            DetailFocus::Comments => DetailFocus::Tracks,
        }
    }
}

/// Represents the current screen in the main content area
#[derive(Clone, Debug)]
pub enum ContentView {
    Auth {
        form: Form,
    },
    Home {
        songs: Vec<Track>,
        albums: Vec<Album>,
        public_playlists: Vec<Playlist>,
        selected_index: usize,
    },
    AlbumDetail {
        album: Option<Album>,
        tracks: Vec<Track>,
        selected_index: usize,
    },
    Search {
        query: String,
        tab: SearchTab,
        results: SearchResults,
        selected_index: usize,
    },
    Playlists {
        playlists: Vec<Playlist>,
        selected_index: usize,
    },
    PlaylistDetail {
        detail: PlaylistDetailView,
        focus: DetailFocus,
        selected_index: usize,
        comment_index: usize,
    },
    SongDetail {
        detail: SongDetailView,
        focus: DetailFocus,
        comment_index: usize,
    },
    LikedSongs {
        tracks: Vec<Track>,
        selected_index: usize,
    },
    Downloads {
        records: Vec<DownloadRecord>,
        selected_index: usize,
    },
    Queue {
        selected_index: usize,
    },
}

impl Default for ContentView {
    fn default() -> Self {
        ContentView::Home {
            songs: Vec::new(),
            albums: Vec::new(),
            public_playlists: Vec::new(),
            selected_index: 0,
        }
    }
}

/// State for the main content area
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub view: ContentView,
    pub load_state: LoadState,
    /// Bumped on every navigation; responses carrying an older value are dropped
    pub generation: u64,
}
