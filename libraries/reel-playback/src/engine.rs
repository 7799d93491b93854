//! Platform-agnostic playback engine trait
//!
//! Abstracts the audio-output facility so the manager works with any backend
//! (cpal on desktop, a recording fake in tests).

use crate::error::PlaybackError;
use crate::types::TrackRef;

/// Audio output facility driven by the playlist manager
///
/// Implementors own whatever device and decoder state they need. The manager treats
/// [`is_active`](PlaybackEngine::is_active) as ground truth for "is a sound emitting"
/// and polls it to detect the natural end of a track.
pub trait PlaybackEngine: Send {
    /// Start output of `track` from its beginning
    ///
    /// Replaces anything currently sounding.
    ///
    /// # Returns
    /// * `Ok(())` - Output started
    /// * `Err(_)` - File could not be opened or decoded
    fn load_and_play(&mut self, track: &TrackRef) -> Result<(), PlaybackError>;

    /// Halt output
    ///
    /// Calling when already stopped is a no-op.
    fn stop(&mut self);

    /// Check if a started track is still audibly playing
    ///
    /// Becomes false when the track reaches its natural end.
    fn is_active(&self) -> bool;

    /// Set output volume (0.0-1.0)
    ///
    /// Takes effect immediately whether or not a track is playing.
    fn set_volume(&mut self, level: f32);
}

/// Engine that records calls and lets tests end tracks on demand
///
/// Clones share state, so a test keeps one handle while the manager owns the other.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct DummyEngine {
    state: std::sync::Arc<std::sync::Mutex<DummyState>>,
}

#[cfg(test)]
#[derive(Debug, Default)]
struct DummyState {
    played: Vec<TrackRef>,
    stops: usize,
    volume: Option<f32>,
    active: bool,
    fail_next: bool,
}

#[cfg(test)]
impl DummyEngine {
    fn state(&self) -> std::sync::MutexGuard<'_, DummyState> {
        self.state.lock().unwrap()
    }

    pub fn played(&self) -> Vec<TrackRef> {
        self.state().played.clone()
    }

    pub fn stops(&self) -> usize {
        self.state().stops
    }

    pub fn volume(&self) -> Option<f32> {
        self.state().volume
    }

    /// Simulate the current track reaching its end
    pub fn finish_track(&self) {
        self.state().active = false;
    }

    /// Make the next `load_and_play` fail
    pub fn fail_next(&self) {
        self.state().fail_next = true;
    }
}

#[cfg(test)]
impl PlaybackEngine for DummyEngine {
    fn load_and_play(&mut self, track: &TrackRef) -> Result<(), PlaybackError> {
        let mut state = self.state();
        if state.fail_next {
            state.fail_next = false;
            state.active = false;
            return Err(PlaybackError::Open {
                path: track.to_string(),
                reason: "test failure".to_string(),
            });
        }
        state.played.push(track.clone());
        state.active = true;
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state();
        state.stops += 1;
        state.active = false;
    }

    fn is_active(&self) -> bool {
        self.state().active
    }

    fn set_volume(&mut self, level: f32) {
        self.state().volume = Some(level);
    }
}
