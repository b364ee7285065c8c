//! Queue, current index and index-selection policy.
//!
//! The session is owned by the worker thread. It never talks to the engine;
//! the worker decides when a candidate index is actually played.

use rand::Rng;

use super::types::{PlayMode, PlaybackState, PlayerSnapshot};
use crate::error::PlayerError;
use crate::library::Track;

#[derive(Debug, Default)]
pub(crate) struct Session {
    pub tracks: Vec<Track>,
    pub index: Option<usize>,
    pub state: PlaybackState,
    pub mode: PlayMode,
}

impl Session {
    pub fn new(mode: PlayMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.index.and_then(|i| self.tracks.get(i))
    }

    pub fn is_stopped(&self) -> bool {
        self.state == PlaybackState::Stopped
    }

    /// Index to start a freshly queued list of `len` tracks at.
    pub fn initial_index<R: Rng + ?Sized>(mode: PlayMode, len: usize, rng: &mut R) -> usize {
        match mode {
            PlayMode::Random if len > 0 => rng.gen_range(0..len),
            _ => 0,
        }
    }

    /// Candidate for `next`. `None` means there is no index to try.
    pub fn next_candidate<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        match self.mode {
            PlayMode::Random => self.random_index(rng),
            PlayMode::Single | PlayMode::TrackList => self.index.map(|i| i + 1),
        }
    }

    /// Candidate for `previous`. Stepping back from the first track yields `None`.
    pub fn previous_candidate<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        match self.mode {
            PlayMode::Random => self.random_index(rng),
            PlayMode::Single | PlayMode::TrackList => self.index.and_then(|i| i.checked_sub(1)),
        }
    }

    fn random_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        // Half-open range: the draw must never produce `len`.
        (!self.tracks.is_empty()).then(|| rng.gen_range(0..self.tracks.len()))
    }

    /// Check that `index` can be played right now, without mutating anything.
    pub fn check_index(&self, index: usize) -> Result<(), PlayerError> {
        if self.is_stopped() {
            return Err(PlayerError::NothingPlaying);
        }
        if index >= self.tracks.len() {
            return Err(PlayerError::IndexOutOfRange {
                index,
                len: self.tracks.len(),
            });
        }
        Ok(())
    }

    /// Back to the initial stopped state; the mode is kept.
    pub fn reset(&mut self) {
        self.state = PlaybackState::Stopped;
        self.index = None;
        self.tracks.clear();
    }

    /// Update the current track's name. Returns `true` when it changed.
    pub fn rename_current(&mut self, name: &str) -> bool {
        match self.index.and_then(|i| self.tracks.get_mut(i)) {
            Some(track) if track.display_name != name => {
                track.display_name = name.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state,
            mode: self.mode,
            index: self.index,
            tracks: self.tracks.clone(),
        }
    }
}
