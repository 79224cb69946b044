use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tunestream/config.toml` or `~/.config/tunestream/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TUNESTREAM__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub playback: PlaybackSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Root of the backend, without the `/api` suffix.
    pub base_url: String,
    /// Whole-request timeout (seconds).
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://music-streaming-be-iuzg.onrender.com".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Where the session record (`user.json`) lives.
    pub data_dir: PathBuf,
    /// Where downloaded songs are written.
    pub downloads_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".cache"),
            downloads_dir: PathBuf::from("downloads"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Output volume at startup, 0.0 to 1.0.
    pub default_volume: f32,
    /// "Previous" restarts the current track once it has played longer than this.
    pub restart_threshold_secs: u64,
    /// Delay before skipping past a track that failed to play (milliseconds).
    pub error_retry_delay_ms: u64,
    /// Volume change per key press.
    pub volume_step: f32,
    /// Seek distance per key press (seconds).
    pub seek_step_secs: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            default_volume: 0.5,
            restart_threshold_secs: 3,
            error_retry_delay_ms: 1000,
            volume_step: 0.05,
            seek_step_secs: 5,
        }
    }
}

impl PlaybackSettings {
    pub fn restart_threshold(&self) -> Duration {
        Duration::from_secs(self.restart_threshold_secs)
    }

    pub fn error_retry_delay(&self) -> Duration {
        Duration::from_millis(self.error_retry_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Input poll interval; also the redraw cadence (milliseconds).
    pub tick_ms: u64,
    /// Quiet period after the last keystroke before a search is sent.
    pub search_debounce_ms: u64,
    /// Error overlays disappear on their own after this many seconds.
    pub error_display_secs: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            search_debounce_ms: 500,
            error_display_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: PathBuf,
    /// Used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".logs"),
            filter: "tunestream_rs=debug,reqwest=info,warn".to_string(),
        }
    }
}
