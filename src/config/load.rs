use std::{env, path::PathBuf};

use super::schema::Settings;

/// `Settings::load` tries environment variables first (prefix `TUNESTREAM__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TUNESTREAM")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Reject values the rest of the client cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        let base = self.api.base_url.trim();
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err("api.base_url must start with http:// or https://".to_string());
        }
        if !(0.0..=1.0).contains(&self.playback.default_volume) {
            return Err("playback.default_volume must be between 0.0 and 1.0".to_string());
        }
        if self.playback.volume_step <= 0.0 || self.playback.volume_step > 1.0 {
            return Err("playback.volume_step must be in (0.0, 1.0]".to_string());
        }
        if self.ui.tick_ms == 0 {
            return Err("ui.tick_ms must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `TUNESTREAM_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TUNESTREAM_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// `$XDG_CONFIG_HOME/tunestream/config.toml`, or `~/.config/tunestream/config.toml`
/// when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("tunestream").join("config.toml"))
}
