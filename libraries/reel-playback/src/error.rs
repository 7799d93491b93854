//! Error types for playlist and playback management

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the playlist manager boundary
///
/// Every variant is recoverable: the operation that produced it left state untouched
/// (or, for playback failures, with playback stopped).
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// Index out of bounds
    #[error("Index out of bounds: {index} (playlist has {len} tracks)")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Nothing selected to play
    #[error("No track selected")]
    NoSelection,

    /// Folder does not exist
    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Folder enumeration failed part way
    #[error("Failed to scan {}: {reason}", path.display())]
    Scan { path: PathBuf, reason: String },

    /// Track could not be played
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

/// Errors raised by a playback engine
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// File could not be opened
    #[error("Failed to open {path}: {reason}")]
    Open { path: String, reason: String },

    /// Container format not recognized
    #[error("Unsupported format: {0}")]
    Probe(String),

    /// File has no decodable audio track
    #[error("No audio track found in {0}")]
    NoAudioTrack(String),

    /// Codec could not be initialized
    #[error("Decoder error: {0}")]
    Decoder(String),

    /// Engine failure unrelated to the file itself
    #[error("Engine error: {0}")]
    Engine(String),
}

/// Errors reading or writing the persisted playlist
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record is not valid JSON
    #[error("Invalid playlist record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for playlist operations
pub type Result<T> = std::result::Result<T, PlaylistError>;
