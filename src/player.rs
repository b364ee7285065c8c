//! The playback controller.
//!
//! [`Player`] is a handle to a dedicated worker thread that exclusively owns
//! the media engine and the queue. Every control operation is a synchronous
//! request to that thread, and the same thread runs the monitor between
//! requests. Read accessors are served from a snapshot the worker republishes
//! after each change, so callers never observe a half-applied update.

mod devices;
mod session;
mod types;
mod worker;

pub use types::{ParsePlayModeError, PlayMode, PlaybackState, PlayerSnapshot, SnapshotHandle};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::config::PlayerSettings;
use crate::engine::{DeviceInfo, InputDeviceHost, MediaEngine};
use crate::error::{EngineError, PlayerError, Result};
use crate::library::Track;

use types::{PlayerCmd, Reply};
use worker::{WorkerConfig, spawn_worker};

pub struct Player {
    tx: Sender<PlayerCmd>,
    snapshot: SnapshotHandle,
    shutdown: Arc<AtomicBool>,
    join: Mutex<Option<JoinHandle<()>>>,
    max_volume: u32,
    fade_step: Option<Duration>,
    seek_step: f64,
    output_devices: Vec<DeviceInfo>,
    input_devices: Vec<DeviceInfo>,
}

impl Player {
    /// Build a player and bind its devices.
    ///
    /// `engine` is called on the worker thread, since audio output streams
    /// generally cannot move between threads. Input devices are bound first
    /// through `input` (when the chat client provides one), then the engine's
    /// output device; the monitor starts only after both succeeded.
    ///
    /// With `settings == None` the player runs degraded: device index 0, no
    /// volume preset, no fading and no monitor.
    pub fn new<E, F>(
        settings: Option<&PlayerSettings>,
        engine: F,
        input: Option<&mut dyn InputDeviceHost>,
    ) -> Result<Self>
    where
        F: FnOnce() -> Result<E, EngineError> + Send + 'static,
        E: MediaEngine + 'static,
    {
        let fade_step = match settings {
            Some(s) => s.fade_step().map_err(|e| {
                PlayerError::InvalidSetting(format!("player.faded_volume_timestamp: {e}"))
            })?,
            None => None,
        };
        let input_index = settings.map_or(0, |s| s.input_device);
        let input_devices = match input {
            Some(host) => devices::bind_input(host, input_index)?,
            None => Vec::new(),
        };

        let config = match settings {
            Some(s) => WorkerConfig {
                output_device: s.output_device,
                default_volume: Some(s.default_volume.min(s.max_volume)),
                mode: s.mode,
                monitor_interval: Some(s.monitor_interval()),
                ready_timeout: s.ready_timeout(),
            },
            None => WorkerConfig {
                output_device: 0,
                default_volume: None,
                mode: PlayMode::default(),
                monitor_interval: None,
                ready_timeout: None,
            },
        };
        let defaults = PlayerSettings::default();
        let max_volume = settings.map_or(defaults.max_volume, |s| s.max_volume);
        let seek_step = settings.map_or(defaults.seek_step, |s| s.seek_step);

        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let (boot_tx, boot_rx) = mpsc::channel();
        let snapshot: SnapshotHandle = Arc::new(Mutex::new(PlayerSnapshot::default()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = spawn_worker(
            engine,
            config,
            rx,
            snapshot.clone(),
            shutdown.clone(),
            boot_tx,
        )
        .map_err(EngineError::from)?;

        let output_devices = match boot_rx.recv() {
            Ok(Ok(devices)) => devices,
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e);
            }
            Err(_) => {
                let _ = handle.join();
                return Err(PlayerError::Closed);
            }
        };
        debug!(monitored = settings.is_some(), "player ready");

        Ok(Self {
            tx,
            snapshot,
            shutdown,
            join: Mutex::new(Some(handle)),
            max_volume,
            fade_step,
            seek_step,
            output_devices,
            input_devices,
        })
    }

    fn request<T>(&self, make: impl FnOnce(Reply<T>) -> PlayerCmd) -> Result<T> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(make(reply_tx))
            .map_err(|_| PlayerError::Closed)?;
        reply_rx.recv().map_err(|_| {
            if self.shutdown.load(Ordering::SeqCst) {
                PlayerError::Closed
            } else {
                PlayerError::Aborted
            }
        })?
    }

    fn seek_delta(&self, step: Option<f64>) -> Result<f64> {
        let step = step.unwrap_or(self.seek_step);
        if !step.is_finite() {
            return Err(PlayerError::InvalidPosition(step));
        }
        Ok(step / 100.0)
    }

    /// Queue `tracks` and start playing, or resume the current track when `None`.
    ///
    /// Blocks until the engine reports it is playing (or already finished).
    pub fn play(&self, tracks: Option<Vec<Track>>) -> Result<()> {
        self.request(|reply| PlayerCmd::Play(tracks, reply))
    }

    pub fn pause(&self) -> Result<()> {
        self.request(PlayerCmd::Pause)
    }

    /// Halt playback and clear the queue.
    pub fn stop(&self) -> Result<()> {
        self.request(PlayerCmd::Stop)
    }

    pub fn next(&self) -> Result<()> {
        self.request(PlayerCmd::Next)
    }

    pub fn previous(&self) -> Result<()> {
        self.request(PlayerCmd::Previous)
    }

    pub fn play_by_index(&self, index: usize) -> Result<()> {
        self.request(|reply| PlayerCmd::PlayByIndex(index, reply))
    }

    pub fn set_mode(&self, mode: PlayMode) -> Result<()> {
        self.request(|reply| PlayerCmd::SetMode(mode, reply))
    }

    pub fn volume(&self) -> Result<u32> {
        self.request(PlayerCmd::Volume)
    }

    /// Set the engine volume, clamped to the configured maximum.
    ///
    /// With fading enabled this walks one unit at a time and sleeps between
    /// steps on the calling thread, so the monitor keeps running meanwhile.
    pub fn set_volume(&self, level: u32) -> Result<()> {
        let target = level.min(self.max_volume);
        let Some(step) = self.fade_step else {
            return self.request(|reply| PlayerCmd::SetVolume(target, reply));
        };

        let mut current = self.volume()?;
        while current != target {
            current = if current < target {
                current + 1
            } else {
                current - 1
            };
            self.request(|reply| PlayerCmd::SetVolume(current, reply))?;
            thread::sleep(step);
        }
        Ok(())
    }

    pub fn rate(&self) -> Result<f32> {
        self.request(PlayerCmd::Rate)
    }

    pub fn set_rate(&self, rate: f32) -> Result<()> {
        self.request(|reply| PlayerCmd::SetRate(rate, reply))
    }

    /// Seek forward by `step` percent of the track (defaults to `seek_step`).
    pub fn seek_forward(&self, step: Option<f64>) -> Result<()> {
        let delta = self.seek_delta(step)?;
        self.request(|reply| PlayerCmd::SeekBy(delta, reply))
    }

    /// Seek back by `step` percent of the track (defaults to `seek_step`).
    pub fn seek_back(&self, step: Option<f64>) -> Result<()> {
        let delta = self.seek_delta(step)?;
        self.request(|reply| PlayerCmd::SeekBy(-delta, reply))
    }

    /// Current position in percent (`0.0..=100.0`).
    pub fn position(&self) -> Result<f64> {
        self.request(PlayerCmd::Position)
    }

    /// Jump to `value` percent of the track.
    pub fn set_position(&self, value: f64) -> Result<()> {
        if !(0.0..=100.0).contains(&value) {
            return Err(PlayerError::InvalidPosition(value));
        }
        self.request(|reply| PlayerCmd::SetPosition(value / 100.0, reply))
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshot
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    /// Shared handle to the published snapshot, for observers that poll it.
    pub fn snapshot_handle(&self) -> SnapshotHandle {
        self.snapshot.clone()
    }

    pub fn state(&self) -> PlaybackState {
        self.snapshot().state
    }

    pub fn mode(&self) -> PlayMode {
        self.snapshot().mode
    }

    pub fn current_index(&self) -> Option<usize> {
        self.snapshot().index
    }

    pub fn current_track(&self) -> Option<Track> {
        self.snapshot().current_track().cloned()
    }

    pub fn track_list(&self) -> Vec<Track> {
        self.snapshot().tracks
    }

    /// Output devices as enumerated at construction.
    pub fn output_devices(&self) -> &[DeviceInfo] {
        &self.output_devices
    }

    /// Input devices as enumerated at construction.
    pub fn input_devices(&self) -> &[DeviceInfo] {
        &self.input_devices
    }

    /// Stop the worker and release the engine.
    ///
    /// A caller blocked in a readiness wait gets `EngineError::Interrupted`.
    /// Later requests fail with [`PlayerError::Closed`]. Safe to call twice.
    pub fn close(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = self.tx.send(PlayerCmd::Shutdown);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
                debug!("player closed");
            }
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.close();
    }
}
