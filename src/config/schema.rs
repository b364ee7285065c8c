use std::path::PathBuf;
use std::time::{Duration, TryFromFloatSecsError};

use serde::Deserialize;

use crate::player::PlayMode;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/playbot/config.toml` or `~/.config/playbot/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `PLAYBOT__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerSettings,
    pub library: LibrarySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Engine volume applied once at startup.
    pub default_volume: u32,
    /// Ceiling for `set_volume`; larger requests are clamped.
    pub max_volume: u32,
    /// Step the volume one unit at a time instead of jumping.
    pub faded_volume: bool,
    /// Seconds to wait between fade steps.
    pub faded_volume_timestamp: f64,
    /// Default seek step, in percent of the track.
    pub seek_step: f64,
    /// Index into the engine's output device enumeration.
    pub output_device: usize,
    /// Index into the chat client's input device enumeration.
    pub input_device: usize,
    /// Play mode the player starts in.
    pub mode: PlayMode,
    /// How often the monitor reconciles engine state (milliseconds).
    pub monitor_interval_ms: u64,
    /// Upper bound for waiting on the engine after a load or resume
    /// (milliseconds). 0 waits until the engine answers or the player closes.
    pub ready_timeout_ms: u64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            default_volume: 50,
            max_volume: 100,
            faded_volume: true,
            faded_volume_timestamp: 0.015,
            seek_step: 5.0,
            output_device: 0,
            input_device: 0,
            mode: PlayMode::Single,
            monitor_interval_ms: 10,
            ready_timeout_ms: 0,
        }
    }
}

impl PlayerSettings {
    /// Delay between volume steps, `None` when fading is off.
    ///
    /// Fails when the timestamp is not representable as a `Duration`
    /// (infinite, or beyond `u64::MAX` seconds). Negative and NaN values mean
    /// no delay.
    pub fn fade_step(&self) -> Result<Option<Duration>, TryFromFloatSecsError> {
        if !self.faded_volume {
            return Ok(None);
        }
        Duration::try_from_secs_f64(self.faded_volume_timestamp.max(0.0)).map(Some)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms.max(1))
    }

    pub fn ready_timeout(&self) -> Option<Duration> {
        (self.ready_timeout_ms > 0).then(|| Duration::from_millis(self.ready_timeout_ms))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}

/// Where log output goes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogMode {
    /// No subscriber is installed.
    Off,
    /// Standard output only.
    #[default]
    #[serde(alias = "stdout")]
    Console,
    /// The log file only.
    File,
    /// Standard output and the log file.
    Both,
}

impl LogMode {
    pub fn to_console(self) -> bool {
        matches!(self, Self::Console | Self::Both)
    }

    pub fn to_file(self) -> bool {
        matches!(self, Self::File | Self::Both)
    }
}

/// Line layout of the `fmt` output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter used when `RUST_LOG` is not set, e.g. `"info"` or `"playbot=debug"`.
    pub level: String,
    pub mode: LogMode,
    pub format: LogFormat,
    /// Log file for the `file` and `both` modes. Defaults to `playbot.log`
    /// in the working directory.
    pub file: Option<PathBuf>,
    /// Rotate the file once it would grow past this many KiB.
    pub max_file_size: u64,
    /// Rotated files to keep (`playbot.log.1` is the newest).
    pub backup_count: u32,
}

impl LoggingSettings {
    pub fn file_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| PathBuf::from("playbot.log"))
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            mode: LogMode::Console,
            format: LogFormat::Full,
            file: None,
            max_file_size: 1024,
            backup_count: 3,
        }
    }
}
