//! Playback controller for a background audio bot.
//!
//! The crate keeps a queue of [`Track`]s, drives a [`MediaEngine`] through
//! play/pause/stop/seek/volume operations and runs a monitor that follows
//! the engine: advancing or stopping when a track ends and naming remote
//! tracks from the metadata the engine reports.
//!
//! ```no_run
//! use playbot::{LocalEngine, PlayMode, Player, PlayerSettings, Track};
//!
//! # fn main() -> Result<(), playbot::PlayerError> {
//! let settings = PlayerSettings { mode: PlayMode::TrackList, ..PlayerSettings::default() };
//! let player = Player::new(Some(&settings), LocalEngine::open_default, None)?;
//!
//! player.play(Some(vec![
//!     Track::local("/music/one.flac".as_ref()),
//!     Track::local("/music/two.flac".as_ref()),
//! ]))?;
//! player.set_volume(40)?;
//! player.next()?;
//! player.close();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod library;
pub mod player;
pub mod runtime;

pub use config::{PlayerSettings, Settings};
pub use engine::{DeviceInfo, EngineStatus, InputDeviceHost, LocalEngine, MediaEngine, Metadata};
pub use error::{EngineError, PlayerError};
pub use library::Track;
pub use player::{PlayMode, PlaybackState, Player, PlayerSnapshot};
