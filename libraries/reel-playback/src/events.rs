//! Playlist events
//!
//! Event-based communication for presentation synchronization. The manager buffers
//! events as it applies intents; the presentation drains them after each intent or
//! tick to decide what to redraw. Events are plain data, never callbacks.

use crate::types::PlayerState;
use serde::{Deserialize, Serialize};

/// Events emitted by the playlist manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaylistEvent {
    /// Tracks added, removed, reordered or replaced
    PlaylistChanged {
        /// New playlist length
        length: usize,
    },

    /// Current-track pointer moved
    CurrentChanged {
        /// New pointer
        index: Option<usize>,
    },

    /// Derived player state changed
    StateChanged {
        /// The new state
        state: PlayerState,
    },

    /// Repeat toggled
    RepeatChanged {
        /// Whether repeat is now on
        enabled: bool,
    },

    /// Volume changed
    VolumeChanged {
        /// New level (0.0-1.0)
        level: f32,
    },

    /// Track reached its natural end
    TrackFinished {
        /// Index of the finished track
        index: usize,
    },

    /// A track could not be played
    Error {
        /// Error message
        message: String,
    },
}
