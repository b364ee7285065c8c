//! The worker thread: sole owner of the engine and the session.
//!
//! Control commands and monitor ticks run on this one thread, so the session
//! is only ever mutated by one writer and readers see it through the
//! published snapshot. Between commands the thread wakes every
//! `monitor_interval` to reconcile engine state: advance or stop when a track
//! ends, and refresh names of remote tracks from engine metadata.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use super::devices;
use super::session::Session;
use super::types::{PlayMode, PlaybackState, PlayerCmd, SnapshotHandle};
use crate::engine::{DeviceInfo, EngineStatus, MediaEngine};
use crate::error::{EngineError, PlayerError};
use crate::library::Track;

/// How often a readiness wait re-checks the engine.
const READY_POLL: Duration = Duration::from_millis(5);

pub(crate) struct WorkerConfig {
    pub output_device: usize,
    pub default_volume: Option<u32>,
    pub mode: PlayMode,
    /// `None` disables monitoring; the worker then only serves commands.
    pub monitor_interval: Option<Duration>,
    pub ready_timeout: Option<Duration>,
}

pub(crate) type BootReply = Sender<Result<Vec<DeviceInfo>, PlayerError>>;

/// Spawn the worker. The engine is built on the new thread, its output
/// device bound, and only then is `boot` answered and the loop entered.
pub(crate) fn spawn_worker<E, F>(
    factory: F,
    config: WorkerConfig,
    rx: Receiver<PlayerCmd>,
    snapshot: SnapshotHandle,
    shutdown: Arc<AtomicBool>,
    boot: BootReply,
) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce() -> Result<E, EngineError> + Send + 'static,
    E: MediaEngine + 'static,
{
    thread::Builder::new()
        .name("playbot-worker".to_string())
        .spawn(move || {
            let mut engine = match factory() {
                Ok(engine) => engine,
                Err(e) => {
                    let _ = boot.send(Err(e.into()));
                    return;
                }
            };

            let outputs = match devices::bind_output(&mut engine, config.output_device) {
                Ok(outputs) => outputs,
                Err(e) => {
                    let _ = boot.send(Err(e));
                    return;
                }
            };

            if let Some(volume) = config.default_volume {
                engine.set_volume(volume);
            }

            let mut worker = Worker {
                engine,
                session: Session::new(config.mode),
                snapshot,
                shutdown,
                ready_timeout: config.ready_timeout,
                metadata_error: None,
            };
            worker.publish();
            let _ = boot.send(Ok(outputs));

            worker.run(&rx, config.monitor_interval);
            debug!("worker stopped, releasing engine");
        })
}

pub(crate) struct Worker<E: MediaEngine> {
    engine: E,
    session: Session,
    snapshot: SnapshotHandle,
    shutdown: Arc<AtomicBool>,
    ready_timeout: Option<Duration>,
    /// Last reported metadata failure as `(source, message)`.
    metadata_error: Option<(String, String)>,
}

impl<E: MediaEngine> Worker<E> {
    fn run(&mut self, rx: &Receiver<PlayerCmd>, monitor_interval: Option<Duration>) {
        loop {
            let cmd = match monitor_interval {
                Some(interval) => match rx.recv_timeout(interval) {
                    Ok(cmd) => Some(cmd),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match rx.recv() {
                    Ok(cmd) => Some(cmd),
                    Err(_) => break,
                },
            };

            if let Some(cmd) = cmd {
                match panic::catch_unwind(AssertUnwindSafe(|| self.handle(cmd))) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(_) => {
                        error!("engine panicked while serving a request, stopping playback");
                        self.recover();
                    }
                }
            }

            if monitor_interval.is_some()
                && panic::catch_unwind(AssertUnwindSafe(|| self.tick())).is_err()
            {
                error!("monitor tick panicked, stopping playback");
                self.recover();
            }
        }
    }

    /// Return to `Stopped` after a panic. The engine may be unusable, so a
    /// second panic from it is swallowed and the session is reset regardless.
    fn recover(&mut self) {
        if panic::catch_unwind(AssertUnwindSafe(|| self.engine.pause())).is_err() {
            error!("engine panicked again while pausing");
        }
        self.session.reset();
        self.metadata_error = None;
        self.publish();
    }

    /// Serve one command. Returns `false` when the worker should exit.
    fn handle(&mut self, cmd: PlayerCmd) -> bool {
        match cmd {
            PlayerCmd::Play(tracks, reply) => {
                let _ = reply.send(self.play(tracks));
            }
            PlayerCmd::Pause(reply) => {
                self.pause();
                let _ = reply.send(Ok(()));
            }
            PlayerCmd::Stop(reply) => {
                self.stop();
                let _ = reply.send(Ok(()));
            }
            PlayerCmd::Next(reply) => {
                let _ = reply.send(self.next());
            }
            PlayerCmd::Previous(reply) => {
                let _ = reply.send(self.previous());
            }
            PlayerCmd::PlayByIndex(index, reply) => {
                let _ = reply.send(self.play_by_index(index));
            }
            PlayerCmd::SetMode(mode, reply) => {
                self.session.mode = mode;
                self.publish();
                debug!(%mode, "play mode changed");
                let _ = reply.send(Ok(()));
            }
            PlayerCmd::Volume(reply) => {
                let _ = reply.send(Ok(self.engine.volume()));
            }
            PlayerCmd::SetVolume(volume, reply) => {
                self.engine.set_volume(volume);
                let _ = reply.send(Ok(()));
            }
            PlayerCmd::Rate(reply) => {
                let _ = reply.send(Ok(self.engine.rate()));
            }
            PlayerCmd::SetRate(rate, reply) => {
                self.engine.set_rate(rate);
                let _ = reply.send(Ok(()));
            }
            PlayerCmd::SeekBy(delta, reply) => {
                let _ = reply.send(self.seek_by(delta));
            }
            PlayerCmd::Position(reply) => {
                let _ = reply.send(self.position());
            }
            PlayerCmd::SetPosition(position, reply) => {
                let result = if (0.0..=1.0).contains(&position) {
                    self.engine.set_position(position).map_err(Into::into)
                } else {
                    Err(PlayerError::InvalidPosition(position * 100.0))
                };
                let _ = reply.send(result);
            }
            PlayerCmd::Shutdown => return false,
        }
        true
    }

    fn publish(&self) {
        if let Ok(mut snapshot) = self.snapshot.lock() {
            *snapshot = self.session.snapshot();
        }
    }

    /// Block until the engine reports `Playing` or `Ended`.
    ///
    /// Gives up when the player is shutting down, or after `ready_timeout`.
    fn wait_ready(&self) -> Result<(), EngineError> {
        let started = Instant::now();
        loop {
            if self.engine.status().is_ready() {
                return Ok(());
            }
            if self.shutdown.load(Ordering::SeqCst) {
                return Err(EngineError::Interrupted);
            }
            if let Some(limit) = self.ready_timeout {
                if started.elapsed() >= limit {
                    return Err(EngineError::NotReady(limit));
                }
            }
            thread::sleep(READY_POLL);
        }
    }

    /// Load and start `source`, optionally waiting for the engine.
    ///
    /// A failed load leaves everything as it was. Once the load succeeded the
    /// previous source is gone, so a later failure stops the session.
    fn switch_to(&mut self, source: &str, wait: bool) -> Result<(), PlayerError> {
        self.engine.load(source)?;

        let started = self
            .engine
            .start()
            .and_then(|()| if wait { self.wait_ready() } else { Ok(()) });

        if let Err(e) = started {
            warn!(source, error = %e, "engine did not start source, stopping");
            self.stop();
            return Err(e.into());
        }
        Ok(())
    }

    fn play(&mut self, tracks: Option<Vec<Track>>) -> Result<(), PlayerError> {
        match tracks.filter(|t| !t.is_empty()) {
            Some(tracks) => {
                let index =
                    Session::initial_index(self.session.mode, tracks.len(), &mut rand::thread_rng());
                let source = tracks[index].source.clone();
                self.switch_to(&source, true)?;

                self.session.tracks = tracks;
                self.session.index = Some(index);
                self.session.state = PlaybackState::Playing;
                info!(
                    queued = self.session.tracks.len(),
                    index,
                    track = %self.session.tracks[index],
                    "started new queue"
                );
            }
            None => {
                if self.session.is_stopped() {
                    return Err(PlayerError::EmptyQueue);
                }
                self.engine.start()?;
                if let Err(e) = self.wait_ready() {
                    // Keep engine and session in agreement: still paused.
                    self.engine.pause();
                    warn!(error = %e, "engine did not resume, staying paused");
                    return Err(e.into());
                }
                self.session.state = PlaybackState::Playing;
                debug!("resumed");
            }
        }

        self.publish();
        Ok(())
    }

    fn pause(&mut self) {
        self.engine.pause();
        if !self.session.is_stopped() {
            self.session.state = PlaybackState::Paused;
            self.publish();
            debug!("paused");
        }
    }

    fn stop(&mut self) {
        self.engine.pause();
        self.session.reset();
        self.publish();
        debug!("stopped");
    }

    fn play_by_index(&mut self, index: usize) -> Result<(), PlayerError> {
        self.session.check_index(index)?;

        let source = self.session.tracks[index].source.clone();
        let wait = self.session.state == PlaybackState::Paused;
        self.switch_to(&source, wait)?;

        self.session.index = Some(index);
        self.session.state = PlaybackState::Playing;
        self.publish();
        info!(index, track = %self.session.tracks[index], "now playing");
        Ok(())
    }

    fn next(&mut self) -> Result<(), PlayerError> {
        if self.session.is_stopped() {
            return Err(PlayerError::NothingPlaying);
        }
        let candidate = self
            .session
            .next_candidate(&mut rand::thread_rng())
            .ok_or(PlayerError::NoNextTrack)?;
        self.play_by_index(candidate).map_err(|e| match e {
            PlayerError::IndexOutOfRange { .. } => PlayerError::NoNextTrack,
            other => other,
        })
    }

    fn previous(&mut self) -> Result<(), PlayerError> {
        if self.session.is_stopped() {
            return Err(PlayerError::NothingPlaying);
        }
        let candidate = self
            .session
            .previous_candidate(&mut rand::thread_rng())
            .ok_or(PlayerError::NoPreviousTrack)?;
        self.play_by_index(candidate).map_err(|e| match e {
            PlayerError::IndexOutOfRange { .. } => PlayerError::NoPreviousTrack,
            other => other,
        })
    }

    fn seek_by(&mut self, delta: f64) -> Result<(), PlayerError> {
        let target = self.engine.position() + delta;
        if !target.is_finite() {
            return Err(PlayerError::InvalidPosition(delta * 100.0));
        }
        self.engine
            .set_position(target.clamp(0.0, 1.0))
            .map_err(Into::into)
    }

    fn position(&self) -> Result<f64, PlayerError> {
        if self.session.is_stopped() {
            return Err(PlayerError::NothingPlaying);
        }
        Ok(self.engine.position() * 100.0)
    }

    /// One monitor pass. Failures are logged and never end the loop.
    fn tick(&mut self) {
        if let Err(e) = self.reconcile_end_of_track() {
            warn!(error = %e, "auto-advance failed, stopping playback");
            self.stop();
        }
        match self.refresh_metadata() {
            Ok(()) => self.metadata_error = None,
            Err(e) => self.note_metadata_error(&e),
        }
    }

    fn reconcile_end_of_track(&mut self) -> Result<(), PlayerError> {
        if self.session.state != PlaybackState::Playing
            || self.engine.status() != EngineStatus::Ended
        {
            return Ok(());
        }

        match self.session.mode {
            PlayMode::Single => {
                debug!("track ended in single mode");
                self.stop();
                Ok(())
            }
            PlayMode::TrackList | PlayMode::Random => match self.next() {
                Err(PlayerError::NoNextTrack) => {
                    info!("reached end of queue");
                    self.stop();
                    Ok(())
                }
                other => other,
            },
        }
    }

    /// Warn once per distinct failure; a source that keeps failing the same
    /// way would otherwise log on every tick.
    fn note_metadata_error(&mut self, e: &PlayerError) {
        let source = self
            .session
            .current_track()
            .map(|t| t.source.clone())
            .unwrap_or_default();
        let key = (source, e.to_string());
        if self.metadata_error.as_ref() != Some(&key) {
            warn!(source = %key.0, error = %key.1, "metadata refresh failed");
            self.metadata_error = Some(key);
        }
    }

    fn refresh_metadata(&mut self) -> Result<(), PlayerError> {
        if self.session.state != PlaybackState::Playing {
            return Ok(());
        }
        let Some(source) = self
            .session
            .current_track()
            .filter(|t| t.is_remote)
            .map(|t| t.source.clone())
        else {
            return Ok(());
        };

        let meta = self.engine.resolve_metadata(&source)?;
        if let Some(name) = meta.display_name() {
            if self.session.rename_current(&name) {
                info!(source, track = %name, "resolved remote track name");
                self.publish();
            }
        }
        Ok(())
    }
}
