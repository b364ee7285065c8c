//! Player-facing enums, the published snapshot and the worker command set.

use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use serde::Deserialize;

use crate::error::PlayerError;
use crate::library::Track;

/// Logical playback state, as seen by the bot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// What happens when a track ends, and how `next`/`previous` choose.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayMode {
    /// Stop after the current track.
    #[default]
    Single,
    /// Advance through the queue, stop after the last track.
    #[serde(alias = "tracklist", alias = "track_list")]
    TrackList,
    /// Jump to a uniformly chosen track of the queue.
    #[serde(alias = "shuffle")]
    Random,
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("single"),
            Self::TrackList => f.write_str("track-list"),
            Self::Random => f.write_str("random"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePlayModeError(String);

impl fmt::Display for ParsePlayModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown play mode {:?} (expected single/0, track-list/1 or random/2)",
            self.0
        )
    }
}

impl std::error::Error for ParsePlayModeError {}

/// Accepts the mode names as well as the bot's numeric codes `0`, `1` and `2`.
impl FromStr for PlayMode {
    type Err = ParsePlayModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "single" => Ok(Self::Single),
            "1" | "tracklist" | "track-list" | "track_list" => Ok(Self::TrackList),
            "2" | "random" | "shuffle" => Ok(Self::Random),
            _ => Err(ParsePlayModeError(s.to_string())),
        }
    }
}

/// Consistent copy of the player's session, published after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerSnapshot {
    pub state: PlaybackState,
    pub mode: PlayMode,
    /// `None` when no track is current; always `None` while stopped.
    pub index: Option<usize>,
    pub tracks: Vec<Track>,
}

impl PlayerSnapshot {
    pub fn current_track(&self) -> Option<&Track> {
        self.index.and_then(|i| self.tracks.get(i))
    }
}

pub type SnapshotHandle = Arc<Mutex<PlayerSnapshot>>;

pub(crate) type Reply<T> = Sender<Result<T, PlayerError>>;

/// Requests served by the worker thread, each with a reply channel.
#[derive(Debug)]
pub(crate) enum PlayerCmd {
    Play(Option<Vec<Track>>, Reply<()>),
    Pause(Reply<()>),
    Stop(Reply<()>),
    Next(Reply<()>),
    Previous(Reply<()>),
    PlayByIndex(usize, Reply<()>),
    SetMode(PlayMode, Reply<()>),
    Volume(Reply<u32>),
    /// Set the engine volume directly; fading is driven by the caller.
    SetVolume(u32, Reply<()>),
    Rate(Reply<f32>),
    SetRate(f32, Reply<()>),
    /// Move the normalized position by this delta, clamped to `0.0..=1.0`.
    SeekBy(f64, Reply<()>),
    Position(Reply<f64>),
    /// Normalized target position.
    SetPosition(f64, Reply<()>),
    Shutdown,
}
