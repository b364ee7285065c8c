//! Media engine capability consumed by the player.
//!
//! The player never decodes audio itself. It drives an engine through the
//! [`MediaEngine`] trait: load a source, start/pause it, poll its status and
//! adjust position, volume and rate. Input devices belong to the chat client
//! and are reached through [`InputDeviceHost`].

mod local;
#[cfg(test)]
pub(crate) mod mock;

pub use local::LocalEngine;

use crate::error::EngineError;
use crate::library::now_playing_name;

/// Status reported by the engine for the currently loaded source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum EngineStatus {
    /// Nothing loaded, or loaded but not started yet.
    #[default]
    Idle,
    Playing,
    Paused,
    /// The loaded source played to the end.
    Ended,
}

impl EngineStatus {
    /// A load/resume is complete once the engine is playing, or already finished.
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Playing | Self::Ended)
    }
}

/// One entry of a device enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub id: String,
}

impl DeviceInfo {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Metadata the engine reports for a loaded source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Combined "now playing" field, as sent by radio streams.
    pub now_playing: Option<String>,
}

impl Metadata {
    /// Name to show for the source, or `None` when nothing usable was reported.
    pub fn display_name(&self) -> Option<String> {
        now_playing_name(
            self.now_playing.as_deref(),
            self.title.as_deref(),
            self.artist.as_deref(),
        )
    }
}

/// Playback backend driven by the player's worker thread.
///
/// Implementations are created on, and only ever used from, the worker
/// thread, so they need not be `Send`. Positions are normalized to `0.0..=1.0`.
pub trait MediaEngine {
    /// Replace the loaded source. Playback does not start until [`start`](Self::start).
    fn load(&mut self, source: &str) -> Result<(), EngineError>;
    /// Start or resume the loaded source.
    fn start(&mut self) -> Result<(), EngineError>;
    fn pause(&mut self);
    fn status(&self) -> EngineStatus;

    fn position(&self) -> f64;
    fn set_position(&mut self, position: f64) -> Result<(), EngineError>;

    fn volume(&self) -> u32;
    fn set_volume(&mut self, volume: u32);

    fn rate(&self) -> f32;
    fn set_rate(&mut self, rate: f32);

    /// Output devices in the engine's enumeration order.
    fn output_devices(&self) -> Result<Vec<DeviceInfo>, EngineError>;
    fn bind_output_device(&mut self, device: &DeviceInfo) -> Result<(), EngineError>;

    fn resolve_metadata(&mut self, source: &str) -> Result<Metadata, EngineError>;
}

/// Input side of device bootstrap, provided by the chat client.
pub trait InputDeviceHost {
    /// Input devices in the client's enumeration order.
    fn input_devices(&self) -> Result<Vec<DeviceInfo>, EngineError>;
    fn bind_input_device(&mut self, device: &DeviceInfo) -> Result<(), EngineError>;
}
