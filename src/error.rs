//! Error types shared by the player and the media engine adapters.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Failures reported by a [`MediaEngine`](crate::engine::MediaEngine) implementation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The source could not be opened.
    #[error("cannot open {locator}: {cause}")]
    Open {
        locator: String,
        #[source]
        cause: std::io::Error,
    },

    /// The engine does not know how to play this kind of source.
    #[error("unsupported source: {0}")]
    Unsupported(String),

    /// The source was opened but could not be decoded or probed.
    #[error("cannot decode source: {0}")]
    Decode(String),

    /// Output device enumeration, binding or stream setup failed.
    #[error("audio device error: {0}")]
    Device(String),

    /// Seeking within the loaded source failed.
    #[error("seek failed: {0}")]
    Seek(String),

    /// The engine did not report a ready status within the configured timeout.
    #[error("engine not ready after {0:?}")]
    NotReady(Duration),

    /// A readiness wait was cut short because the player is shutting down.
    #[error("interrupted by shutdown")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which side of device bootstrap an error refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeviceKind {
    Output,
    Input,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output => f.write_str("output"),
            Self::Input => f.write_str("input"),
        }
    }
}

/// Errors surfaced by [`Player`](crate::player::Player) operations.
///
/// Everything here is recoverable: the dispatch boundary is expected to turn
/// these into a user-facing message via `Display`.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("nothing is playing")]
    NothingPlaying,

    /// Raised by `play_by_index`; `next`/`previous` translate it.
    #[error("track index {index} is out of range (queue has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no next track")]
    NoNextTrack,

    #[error("no previous track")]
    NoPreviousTrack,

    #[error("position {0} is outside 0..=100")]
    InvalidPosition(f64),

    #[error("nothing has been queued yet")]
    EmptyQueue,

    #[error("{kind} device #{index} not found ({available} available)")]
    DeviceNotFound {
        kind: DeviceKind,
        index: usize,
        available: usize,
    },

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// A setting that passed deserialization cannot be applied.
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    /// The worker dropped the request without answering, after the engine
    /// panicked while serving it. The player stays usable.
    #[error("request aborted by the player")]
    Aborted,

    /// The worker thread is gone, either after `close()` or because it failed to start.
    #[error("player is closed")]
    Closed,
}

impl PlayerError {
    /// `true` for the queue boundary signals that mean "stop playback".
    pub fn is_end_of_queue(&self) -> bool {
        matches!(self, Self::NoNextTrack | Self::NoPreviousTrack)
    }
}

pub type Result<T, E = PlayerError> = std::result::Result<T, E>;
