//! Desktop playback engine using CPAL
//!
//! This crate provides `CpalEngine`, the `PlaybackEngine` implementation for
//! cross-platform desktop audio output.
//!
//! # Features
//!
//! - Cross-platform audio output using CPAL
//! - Streaming decode of MP3, FLAC, OGG, WAV, AAC/M4A and Opus via Symphonia
//! - Automatic sample rate conversion (rubato)
//! - Channel mapping to the device layout
//! - Perceptual volume control
//!
//! # Example
//!
//! ```no_run
//! use reel_audio_desktop::CpalEngine;
//! use reel_playback::{PlaybackEngine, TrackRef};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = CpalEngine::new()?;
//!
//! engine.set_volume(0.5);
//! engine.load_and_play(&TrackRef::new("/music/song.flac"))?;
//!
//! while engine.is_active() {
//!     std::thread::sleep(std::time::Duration::from_millis(100));
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod output;
pub mod decoder;

pub use decoder::TrackDecoder;
pub use error::{AudioError, Result};
pub use output::CpalEngine;
