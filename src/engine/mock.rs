//! Scriptable in-memory engine for player tests.
//!
//! The engine itself moves into the worker thread; tests keep a clone and
//! drive it through the shared state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{DeviceInfo, EngineStatus, InputDeviceHost, MediaEngine, Metadata};
use crate::error::EngineError;

#[derive(Debug)]
pub(crate) struct MockState {
    pub loaded: Option<String>,
    pub status: EngineStatus,
    pub position: f64,
    pub volume: u32,
    pub volume_log: Vec<u32>,
    pub rate: f32,
    pub loads: Vec<String>,
    pub outputs: Vec<DeviceInfo>,
    pub bound_output: Option<DeviceInfo>,
    pub metadata: HashMap<String, Metadata>,
    /// When set, `start` leaves the engine buffering (`Idle`) forever.
    pub stall: bool,
    /// Sources whose `load` fails.
    pub broken: Vec<String>,
    /// `resolve_metadata` fails.
    pub fail_metadata: bool,
    /// `resolve_metadata` panics.
    pub panic_metadata: bool,
    /// `set_position` panics.
    pub panic_seek: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            loaded: None,
            status: EngineStatus::Idle,
            position: 0.0,
            volume: 100,
            volume_log: Vec::new(),
            rate: 1.0,
            loads: Vec::new(),
            outputs: vec![
                DeviceInfo::new("Speakers", "hw:0"),
                DeviceInfo::new("Headphones", "hw:1"),
            ],
            bound_output: None,
            metadata: HashMap::new(),
            stall: false,
            broken: Vec::new(),
            fail_metadata: false,
            panic_metadata: false,
            panic_seek: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MockEngine {
    state: Arc<Mutex<MockState>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        // Injected panics never hold the lock, but stay usable if one does.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Pretend the loaded source played to the end.
    pub fn finish_track(&self) {
        self.state().status = EngineStatus::Ended;
    }

    pub fn set_metadata(&self, source: &str, meta: Metadata) {
        self.state().metadata.insert(source.to_string(), meta);
    }

    /// Factory suitable for `Player::new`.
    pub fn factory(&self) -> impl FnOnce() -> Result<MockEngine, EngineError> + Send + 'static {
        let engine = self.clone();
        move || Ok(engine)
    }
}

impl MediaEngine for MockEngine {
    fn load(&mut self, source: &str) -> Result<(), EngineError> {
        let mut s = self.state();
        if s.broken.iter().any(|b| b == source) {
            return Err(EngineError::Decode(format!("broken source {source}")));
        }
        s.loaded = Some(source.to_string());
        s.loads.push(source.to_string());
        s.status = EngineStatus::Idle;
        s.position = 0.0;
        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        let mut s = self.state();
        if s.loaded.is_some() {
            s.status = if s.stall {
                EngineStatus::Idle
            } else {
                EngineStatus::Playing
            };
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut s = self.state();
        if s.loaded.is_some() && s.status != EngineStatus::Ended {
            s.status = EngineStatus::Paused;
        }
    }

    fn status(&self) -> EngineStatus {
        self.state().status
    }

    fn position(&self) -> f64 {
        self.state().position
    }

    fn set_position(&mut self, position: f64) -> Result<(), EngineError> {
        let panics = self.state().panic_seek;
        if panics {
            panic!("seek backend crashed");
        }
        self.state().position = position;
        Ok(())
    }

    fn volume(&self) -> u32 {
        self.state().volume
    }

    fn set_volume(&mut self, volume: u32) {
        let mut s = self.state();
        s.volume = volume;
        s.volume_log.push(volume);
    }

    fn rate(&self) -> f32 {
        self.state().rate
    }

    fn set_rate(&mut self, rate: f32) {
        self.state().rate = rate;
    }

    fn output_devices(&self) -> Result<Vec<DeviceInfo>, EngineError> {
        Ok(self.state().outputs.clone())
    }

    fn bind_output_device(&mut self, device: &DeviceInfo) -> Result<(), EngineError> {
        self.state().bound_output = Some(device.clone());
        Ok(())
    }

    fn resolve_metadata(&mut self, source: &str) -> Result<Metadata, EngineError> {
        let (fails, panics) = {
            let s = self.state();
            (s.fail_metadata, s.panic_metadata)
        };
        if panics {
            panic!("metadata backend crashed");
        }
        if fails {
            return Err(EngineError::Decode(format!("no metadata for {source}")));
        }
        Ok(self
            .state()
            .metadata
            .get(source)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockInputHost {
    pub devices: Vec<DeviceInfo>,
    pub bound: Option<DeviceInfo>,
}

impl MockInputHost {
    pub fn with_devices(names: &[&str]) -> Self {
        Self {
            devices: names
                .iter()
                .enumerate()
                .map(|(i, n)| DeviceInfo::new(*n, i.to_string()))
                .collect(),
            bound: None,
        }
    }
}

impl InputDeviceHost for MockInputHost {
    fn input_devices(&self) -> Result<Vec<DeviceInfo>, EngineError> {
        Ok(self.devices.clone())
    }

    fn bind_input_device(&mut self, device: &DeviceInfo) -> Result<(), EngineError> {
        self.bound = Some(device.clone());
        Ok(())
    }
}
