use super::load::{CONFIG_PATH_VAR, default_config_path, resolve_config_path};
use super::schema::*;
use crate::player::PlayMode;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Scoped environment overrides. Holds the process-wide env lock and
/// restores every touched variable on drop.
struct ScopedEnv {
    saved: Vec<(&'static str, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    fn new() -> Self {
        Self {
            saved: Vec::new(),
            _lock: ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner()),
        }
    }

    fn set(mut self, key: &'static str, val: impl AsRef<std::ffi::OsStr>) -> Self {
        self.saved.push((key, std::env::var_os(key)));
        // SAFETY: every test touching the environment holds ENV_LOCK.
        unsafe { std::env::set_var(key, val) };
        self
    }

    fn unset(mut self, key: &'static str) -> Self {
        self.saved.push((key, std::env::var_os(key)));
        // SAFETY: every test touching the environment holds ENV_LOCK.
        unsafe { std::env::remove_var(key) };
        self
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, old) in self.saved.drain(..).rev() {
            // SAFETY: ENV_LOCK is still held until `_lock` drops.
            unsafe {
                match old {
                    Some(v) => std::env::set_var(key, v),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}

fn write_config(body: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    (dir, path)
}

#[test]
fn explicit_config_path_wins() {
    let _env = ScopedEnv::new()
        .set(CONFIG_PATH_VAR, "/tmp/playbot-test-config.toml")
        .set("XDG_CONFIG_HOME", "/tmp/xdg");
    assert_eq!(
        resolve_config_path(),
        Some(PathBuf::from("/tmp/playbot-test-config.toml"))
    );
}

#[test]
fn default_path_uses_xdg_then_home() {
    let env = ScopedEnv::new()
        .unset(CONFIG_PATH_VAR)
        .set("XDG_CONFIG_HOME", "/tmp/xdg-config-home")
        .set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_config_path(),
        Some(PathBuf::from("/tmp/xdg-config-home/playbot/config.toml"))
    );

    let _env = env.unset("XDG_CONFIG_HOME");
    assert_eq!(
        resolve_config_path(),
        Some(PathBuf::from("/tmp/home-dir/.config/playbot/config.toml"))
    );
}

#[test]
fn missing_file_yields_defaults() {
    let _env = ScopedEnv::new().unset("PLAYBOT__PLAYER__MAX_VOLUME");
    let s = Settings::load_from(Some(Path::new("/nonexistent/playbot.toml"))).unwrap();
    assert_eq!(s.player.default_volume, 50);
    assert_eq!(s.player.mode, PlayMode::Single);
    assert_eq!(s.logging.level, "info");
    assert!(s.validate().is_ok());
}

#[test]
fn file_values_are_applied() {
    let _env = ScopedEnv::new().unset("PLAYBOT__PLAYER__MAX_VOLUME");
    let (_dir, path) = write_config(
        r#"
[player]
default_volume = 40
max_volume = 80
faded_volume = false
seek_step = 10
output_device = 2
input_device = 1
mode = "track-list"
ready_timeout_ms = 3000

[library]
extensions = ["mp3"]
recursive = false

[logging]
level = "playbot=debug"
file = "/tmp/playbot.log"
"#,
    );

    let s = Settings::load_from(Some(&path)).unwrap();
    let p = &s.player;
    assert_eq!((p.default_volume, p.max_volume), (40, 80));
    assert_eq!(p.fade_step(), Ok(None));
    assert_eq!(p.seek_step, 10.0);
    assert_eq!((p.output_device, p.input_device), (2, 1));
    assert_eq!(p.mode, PlayMode::TrackList);
    assert_eq!(p.monitor_interval(), Duration::from_millis(10));
    assert_eq!(p.ready_timeout(), Some(Duration::from_secs(3)));
    assert_eq!(s.library.extensions, ["mp3"]);
    assert!(!s.library.recursive);
    assert_eq!(s.logging.level, "playbot=debug");
    assert_eq!(s.logging.file.as_deref(), Some(Path::new("/tmp/playbot.log")));
    assert!(s.validate().is_ok());
}

#[test]
fn mode_accepts_aliases() {
    let _env = ScopedEnv::new();
    let (_dir, path) = write_config("[player]\nmode = \"shuffle\"\n");
    let s = Settings::load_from(Some(&path)).unwrap();
    assert_eq!(s.player.mode, PlayMode::Random);
}

#[test]
fn environment_overrides_file() {
    let (_dir, path) = write_config("[player]\nmax_volume = 100\n");
    let _env = ScopedEnv::new()
        .set(CONFIG_PATH_VAR, &path)
        .set("PLAYBOT__PLAYER__MAX_VOLUME", "60");

    let s = Settings::load().unwrap();
    assert_eq!(s.player.max_volume, 60);
}

#[test]
fn validate_rejects_inconsistent_settings() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.player.default_volume = 120;
    assert!(s.validate().unwrap_err().contains("default_volume"));

    s.player.default_volume = 50;
    s.player.seek_step = 0.0;
    assert!(s.validate().is_err());

    s.player.seek_step = 5.0;
    s.player.faded_volume_timestamp = f64::NAN;
    assert!(s.validate().is_err());

    for timestamp in [f64::INFINITY, 1e30, -0.5] {
        s.player.faded_volume_timestamp = timestamp;
        assert!(s.validate().is_err(), "{timestamp} accepted");
    }

    s.player.faded_volume_timestamp = 0.0;
    s.library.extensions.clear();
    assert!(s.validate().is_err());
}

#[test]
fn derived_durations() {
    let mut p = PlayerSettings::default();
    let step = p.fade_step().unwrap().unwrap();
    assert!((step.as_secs_f64() - 0.015).abs() < 1e-6);
    assert_eq!(p.ready_timeout(), None);

    p.monitor_interval_ms = 0;
    assert_eq!(p.monitor_interval(), Duration::from_millis(1));

    p.faded_volume_timestamp = f64::INFINITY;
    assert!(p.fade_step().is_err());
    p.faded_volume = false;
    assert_eq!(p.fade_step(), Ok(None));
}

#[test]
fn logging_section_selects_sinks_and_rotation() {
    let _env = ScopedEnv::new();
    let (_dir, path) = write_config(
        r#"
[logging]
mode = "both"
format = "compact"
file = "/tmp/playbot.log"
max_file_size = 64
backup_count = 5
"#,
    );

    let log = Settings::load_from(Some(&path)).unwrap().logging;
    assert_eq!(log.mode, LogMode::Both);
    assert!(log.mode.to_console() && log.mode.to_file());
    assert_eq!(log.format, LogFormat::Compact);
    assert_eq!(log.file_path(), PathBuf::from("/tmp/playbot.log"));
    assert_eq!((log.max_file_size, log.backup_count), (64, 5));

    let defaults = LoggingSettings::default();
    assert_eq!(defaults.mode, LogMode::Console);
    assert!(!defaults.mode.to_file());
    assert_eq!(defaults.file_path(), PathBuf::from("playbot.log"));
}
