//! Playlist persistence
//!
//! The durable record is a small JSON object:
//!
//! ```json
//! {
//!     "music_files": ["/music/a.mp3", "/music/b.mp3"],
//!     "last_folder": "/music"
//! }
//! ```
//!
//! Stores never fail towards the manager. A missing or corrupt record loads as an
//! empty playlist and a failed write is logged, leaving in-memory state authoritative.

use crate::error::PersistenceError;
use crate::types::TrackRef;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Persisted playlist record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedPlaylist {
    /// Track paths in playlist order
    #[serde(default)]
    pub music_files: Vec<TrackRef>,

    /// Folder most recently loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_folder: Option<String>,
}

/// Durable storage for the playlist
pub trait PlaylistStore: Send {
    /// Read the record, degrading to an empty one on any failure
    fn load(&self) -> PersistedPlaylist;

    /// Overwrite the record (best effort)
    fn save(&self, record: &PersistedPlaylist);
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record, reporting why it could not be read
    ///
    /// A missing file is not an error: it loads as an empty record.
    pub fn try_load(&self) -> Result<PersistedPlaylist, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No playlist record at {}", self.path.display());
                return Ok(PersistedPlaylist::default());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the record via a sibling temporary file, then rename over the target
    pub fn try_save(&self, record: &PersistedPlaylist) -> Result<(), PersistenceError> {
        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)?;
        }

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        record.serialize(&mut serializer)?;
        buffer.push(b'\n');

        let temp_path = self.temp_path();
        fs::write(&temp_path, &buffer)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            // Leave no stray temp file behind
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "playlist.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PlaylistStore for JsonFileStore {
    fn load(&self) -> PersistedPlaylist {
        match self.try_load() {
            Ok(record) => {
                tracing::debug!(
                    "Loaded {} tracks from {}",
                    record.music_files.len(),
                    self.path.display()
                );
                record
            }
            Err(e) => {
                tracing::warn!(
                    "Error loading playlist from {}: {}",
                    self.path.display(),
                    e
                );
                PersistedPlaylist::default()
            }
        }
    }

    fn save(&self, record: &PersistedPlaylist) {
        if let Err(e) = self.try_save(record) {
            tracing::warn!("Error saving playlist to {}: {}", self.path.display(), e);
        }
    }
}

/// In-process store
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Arc<Mutex<PersistedPlaylist>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record
    pub fn with_record(record: PersistedPlaylist) -> Self {
        Self {
            record: Arc::new(Mutex::new(record)),
        }
    }

    /// Last saved record
    pub fn snapshot(&self) -> PersistedPlaylist {
        self.record
            .lock()
            .map(|record| record.clone())
            .unwrap_or_default()
    }
}

impl PlaylistStore for MemoryStore {
    fn load(&self) -> PersistedPlaylist {
        self.snapshot()
    }

    fn save(&self, record: &PersistedPlaylist) {
        match self.record.lock() {
            Ok(mut stored) => *stored = record.clone(),
            Err(e) => tracing::warn!("Error saving playlist to memory: {}", e),
        }
    }
}
