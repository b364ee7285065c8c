//! `rodio`-backed engine for local files.
//!
//! Each load opens and decodes the file into a fresh, paused `Sink` on the
//! current output stream. Remote locators are rejected; streaming is left to
//! other engines.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use rodio::cpal::traits::{DeviceTrait, HostTrait};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::debug;

use super::{DeviceInfo, EngineStatus, MediaEngine, Metadata};
use crate::error::EngineError;

pub struct LocalEngine {
    stream: OutputStream,
    sink: Option<Sink>,
    duration: Option<Duration>,
    volume: u32,
    rate: f32,
    metadata: Option<(String, Metadata)>,
}

impl LocalEngine {
    /// Open the host's default output stream.
    pub fn open_default() -> Result<Self, EngineError> {
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| EngineError::Device(e.to_string()))?;
        Ok(Self::with_stream(stream))
    }

    fn with_stream(mut stream: OutputStream) -> Self {
        // rodio logs to stderr when the stream is dropped.
        stream.log_on_drop(false);
        Self {
            stream,
            sink: None,
            duration: None,
            volume: 100,
            rate: 1.0,
            metadata: None,
        }
    }

    fn gain(&self) -> f32 {
        self.volume as f32 / 100.0
    }

    fn find_output_device(id: &str) -> Result<rodio::cpal::Device, EngineError> {
        let host = rodio::cpal::default_host();
        host.output_devices()
            .map_err(|e| EngineError::Device(e.to_string()))?
            .find(|d| d.name().map(|name| name == id).unwrap_or(false))
            .ok_or_else(|| EngineError::Device(format!("output device {id:?} disappeared")))
    }
}

fn is_remote(source: &str) -> bool {
    source.contains("://")
}

impl MediaEngine for LocalEngine {
    fn load(&mut self, source: &str) -> Result<(), EngineError> {
        if is_remote(source) {
            return Err(EngineError::Unsupported(source.to_string()));
        }

        let file = File::open(source).map_err(|cause| EngineError::Open {
            locator: source.to_string(),
            cause,
        })?;
        let decoder =
            Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode(e.to_string()))?;
        let duration = decoder.total_duration();

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.gain());
        sink.set_speed(self.rate);
        sink.append(decoder);
        sink.pause();

        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        self.duration = duration;
        debug!(source, ?duration, "loaded source");
        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        if let Some(sink) = self.sink.as_ref() {
            sink.play();
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
    }

    fn status(&self) -> EngineStatus {
        match self.sink.as_ref() {
            None => EngineStatus::Idle,
            Some(sink) if sink.empty() => EngineStatus::Ended,
            Some(sink) if sink.is_paused() => EngineStatus::Paused,
            Some(_) => EngineStatus::Playing,
        }
    }

    fn position(&self) -> f64 {
        match (self.sink.as_ref(), self.duration) {
            (Some(sink), Some(total)) if !total.is_zero() => {
                (sink.get_pos().as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    fn set_position(&mut self, position: f64) -> Result<(), EngineError> {
        if !position.is_finite() {
            return Err(EngineError::Seek(format!("position {position} is not finite")));
        }
        let Some(sink) = self.sink.as_ref() else {
            return Ok(());
        };
        let total = self
            .duration
            .ok_or_else(|| EngineError::Seek("source has no known duration".to_string()))?;
        sink.try_seek(total.mul_f64(position.clamp(0.0, 1.0)))
            .map_err(|e| EngineError::Seek(e.to_string()))
    }

    fn volume(&self) -> u32 {
        self.volume
    }

    fn set_volume(&mut self, volume: u32) {
        self.volume = volume;
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(self.gain());
        }
    }

    fn rate(&self) -> f32 {
        self.rate
    }

    fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
        if let Some(sink) = self.sink.as_ref() {
            sink.set_speed(rate);
        }
    }

    fn output_devices(&self) -> Result<Vec<DeviceInfo>, EngineError> {
        let host = rodio::cpal::default_host();
        let devices = host
            .output_devices()
            .map_err(|e| EngineError::Device(e.to_string()))?
            .filter_map(|d| d.name().ok())
            .map(|name| DeviceInfo::new(name.clone(), name))
            .collect();
        Ok(devices)
    }

    fn bind_output_device(&mut self, device: &DeviceInfo) -> Result<(), EngineError> {
        let found = Self::find_output_device(&device.id)?;
        let mut stream = OutputStreamBuilder::from_device(found)
            .and_then(|builder| builder.open_stream())
            .map_err(|e| EngineError::Device(e.to_string()))?;
        stream.log_on_drop(false);

        // Sinks are tied to the old mixer; anything loaded has to be reloaded.
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.duration = None;
        self.stream = stream;
        debug!(device = %device.name, "bound output device");
        Ok(())
    }

    fn resolve_metadata(&mut self, source: &str) -> Result<Metadata, EngineError> {
        if let Some((cached_for, meta)) = self.metadata.as_ref() {
            if cached_for == source {
                return Ok(meta.clone());
            }
        }

        let tagged =
            lofty::read_from_path(Path::new(source)).map_err(|e| EngineError::Decode(e.to_string()))?;
        let mut meta = Metadata::default();
        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            meta.title = tag
                .title()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            meta.artist = tag
                .artist()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
        }

        self.metadata = Some((source.to_string(), meta.clone()));
        Ok(meta)
    }
}
