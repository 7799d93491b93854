//! Reel - Playlist Management
//!
//! Platform-agnostic playlist and playback state management for Reel.
//!
//! This crate provides:
//! - Ordered playlist with a positional current-track pointer
//! - Play/stop state machine with repeat and auto-advance
//! - Volume control (0.0-1.0, perceptual gain mapping)
//! - Uniform random shuffle
//! - JSON persistence of the playlist
//! - Flat folder scanning with an audio extension allow-list
//!
//! # Architecture
//!
//! `reel-playback` is completely platform-agnostic:
//! - No dependency on CPAL (desktop audio)
//! - No dependency on any UI toolkit
//!
//! Audio output is provided via the [`PlaybackEngine`] trait and durable storage via
//! the [`PlaylistStore`] trait. Both are owned by the manager.
//!
//! # Example: Editing and Playback
//!
//! ```rust
//! use reel_playback::{ManagerConfig, MemoryStore, PlaybackEngine, PlaybackError, PlaylistManager, TrackRef};
//!
//! // Implement PlaybackEngine for your platform
//! struct SilentEngine {
//!     active: bool,
//! }
//!
//! impl PlaybackEngine for SilentEngine {
//!     fn load_and_play(&mut self, _track: &TrackRef) -> Result<(), PlaybackError> {
//!         self.active = true;
//!         Ok(())
//!     }
//!
//!     fn stop(&mut self) {
//!         self.active = false;
//!     }
//!
//!     fn is_active(&self) -> bool {
//!         self.active
//!     }
//!
//!     fn set_volume(&mut self, _level: f32) {}
//! }
//!
//! let mut manager = PlaylistManager::new(
//!     SilentEngine { active: false },
//!     MemoryStore::new(),
//!     ManagerConfig::default(),
//! );
//!
//! manager.add_tracks(["/music/a.mp3", "/music/b.mp3"]);
//! manager.toggle_play(Some(0)).unwrap();
//! assert!(manager.is_playing());
//!
//! // Poll periodically (~100 ms) to handle track ends
//! manager.tick().unwrap();
//! ```

mod error;
mod events;
mod manager;

pub mod engine;
pub mod playlist;
pub mod scanner;
pub mod shuffle;
pub mod store;
pub mod types;
pub mod volume;

// Public exports
pub use engine::PlaybackEngine;
pub use error::{PersistenceError, PlaybackError, PlaylistError, Result};
pub use events::PlaylistEvent;
pub use manager::PlaylistManager;
pub use store::{JsonFileStore, MemoryStore, PersistedPlaylist, PlaylistStore};
pub use types::{ManagerConfig, PlayerState, TrackRef};
