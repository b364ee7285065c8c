use std::env;
use std::path::{Path, PathBuf};

use ::config::{Config, ConfigError, Environment, File};

use super::schema::Settings;

/// Prefix of overriding environment variables, e.g. `PLAYBOT__PLAYER__MAX_VOLUME`.
const ENV_PREFIX: &str = "PLAYBOT";
/// Explicit config file location; wins over the XDG default.
pub const CONFIG_PATH_VAR: &str = "PLAYBOT_CONFIG_PATH";
/// Longest accepted pause between two volume fade steps.
const MAX_FADE_STEP_SECS: f64 = 10.0;

impl Settings {
    /// Load settings from the resolved config file (if any) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(resolve_config_path().as_deref())
    }

    /// Layer struct defaults, then `path` when it exists, then `PLAYBOT__*`
    /// environment variables.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(p) = path {
            builder = builder.add_source(File::from(p).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject combinations the player cannot honour.
    pub fn validate(&self) -> Result<(), String> {
        let p = &self.player;
        if p.max_volume == 0 {
            return Err("player.max_volume must be >= 1".to_string());
        }
        if p.default_volume > p.max_volume {
            return Err(format!(
                "player.default_volume ({}) exceeds player.max_volume ({})",
                p.default_volume, p.max_volume
            ));
        }
        if !(p.seek_step > 0.0 && p.seek_step <= 100.0) {
            return Err("player.seek_step must be in (0, 100]".to_string());
        }
        if !(0.0..=MAX_FADE_STEP_SECS).contains(&p.faded_volume_timestamp) {
            return Err(format!(
                "player.faded_volume_timestamp must be in [0, {MAX_FADE_STEP_SECS}] seconds"
            ));
        }
        if p.monitor_interval_ms == 0 {
            return Err("player.monitor_interval_ms must be >= 1".to_string());
        }
        if self.library.extensions.is_empty() {
            return Err("library.extensions must name at least one extension".to_string());
        }
        Ok(())
    }
}

/// `PLAYBOT_CONFIG_PATH` when set, else [`default_config_path`].
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// `$XDG_CONFIG_HOME/playbot/config.toml`, falling back to
/// `~/.config/playbot/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("playbot").join("config.toml"))
}
