use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_explicit_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("TUNESTREAM_CONFIG_PATH", "/tmp/tunestream-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/tunestream-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("tunestream")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("tunestream")
            .join("config.toml")
    );
}

#[test]
fn defaults_match_the_documented_values() {
    let s = Settings::default();
    assert_eq!(s.playback.default_volume, 0.5);
    assert_eq!(s.playback.restart_threshold_secs, 3);
    assert_eq!(s.playback.error_retry_delay_ms, 1000);
    assert_eq!(s.ui.search_debounce_ms, 500);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[api]
base_url = "http://localhost:4000"
timeout_secs = 5

[storage]
data_dir = "/tmp/tunestream-data"
downloads_dir = "/tmp/tunestream-downloads"

[playback]
default_volume = 0.8
restart_threshold_secs = 4
error_retry_delay_ms = 250

[ui]
search_debounce_ms = 300

[logging]
dir = "/tmp/tunestream-logs"
filter = "tunestream_rs=trace"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TUNESTREAM_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("TUNESTREAM__API__BASE_URL");

    let s = Settings::load().unwrap();
    assert_eq!(s.api.base_url, "http://localhost:4000");
    assert_eq!(s.api.timeout_secs, 5);
    assert_eq!(s.api.connect_timeout_secs, 10);
    assert_eq!(s.storage.data_dir, std::path::PathBuf::from("/tmp/tunestream-data"));
    assert_eq!(s.playback.default_volume, 0.8);
    assert_eq!(s.playback.restart_threshold_secs, 4);
    assert_eq!(s.playback.error_retry_delay_ms, 250);
    assert_eq!(s.ui.search_debounce_ms, 300);
    assert_eq!(s.ui.tick_ms, 50);
    assert_eq!(s.logging.filter, "tunestream_rs=trace");
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[ui]
tick_ms = 100
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TUNESTREAM_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("TUNESTREAM__UI__TICK_MS", "20");

    let s = Settings::load().unwrap();
    assert_eq!(s.ui.tick_ms, 20);
}

#[test]
fn validate_rejects_bad_values() {
    let mut s = Settings::default();
    s.api.base_url = "ftp://example.com".to_string();
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.playback.default_volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.ui.tick_ms = 0;
    assert!(s.validate().is_err());
}
