//! Core types for playlist management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Reference to a playable audio file
///
/// An absolute or relative path, kept as the exact string the user supplied so the
/// persisted record round-trips unchanged. Duplicates are allowed in a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackRef(String);

impl TrackRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// File name for display, falling back to the full reference
    pub fn display_name(&self) -> &str {
        self.path()
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackRef {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for TrackRef {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl From<&Path> for TrackRef {
    fn from(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

/// Derived player state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// No current track
    Idle,

    /// Current track selected, nothing sounding
    Stopped,

    /// Current track is playing
    Playing,
}

/// Configuration for the playlist manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Initial volume (0.0-1.0, default: 0.5)
    pub volume: f32,

    /// Initial repeat flag (default: off)
    pub repeat: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            volume: 0.5,
            repeat: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ManagerConfig::default();
        assert_eq!(config.volume, 0.5);
        assert!(!config.repeat);
    }

    #[test]
    fn display_name_uses_file_name() {
        assert_eq!(TrackRef::new("/music/a/song.mp3").display_name(), "song.mp3");
        assert_eq!(TrackRef::new("song.mp3").display_name(), "song.mp3");
        assert_eq!(TrackRef::new("").display_name(), "");
    }

    #[test]
    fn track_ref_serializes_as_plain_string() {
        let json = serde_json::to_string(&TrackRef::new("/music/a.mp3")).unwrap();
        assert_eq!(json, "\"/music/a.mp3\"");
    }
}
