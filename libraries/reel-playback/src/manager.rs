//! Playlist manager - core orchestration
//!
//! Owns the playlist, the current-track pointer, the playing and repeat flags and the
//! volume. Every intent is applied fully (including the persistence write) before the
//! call returns, so callers never observe a half-applied mutation.

use crate::{
    engine::PlaybackEngine,
    error::{PlaylistError, Result},
    events::PlaylistEvent,
    playlist::Playlist,
    scanner,
    shuffle::shuffle_tracks,
    store::{PersistedPlaylist, PlaylistStore},
    types::{ManagerConfig, PlayerState, TrackRef},
    volume::Volume,
};
use std::path::Path;

/// Playlist and playback state manager
///
/// State machine:
/// ```text
///            add_tracks / load_folder            toggle_play(i)
///   Idle ───────────────────────────▶ Stopped ─────────────────▶ Playing
///    ▲                                  ▲  ▲                      │
///    │ shuffle / last track ends        │  └── toggle_play / stop ┘
///    └──────────────────────────────────┴──── (repeat off, end of list)
/// ```
pub struct PlaylistManager {
    playlist: Playlist,
    is_playing: bool,
    repeat: bool,
    volume: Volume,
    last_folder: Option<String>,

    engine: Box<dyn PlaybackEngine>,
    store: Box<dyn PlaylistStore>,

    // Event queue for presentation synchronization
    pending_events: Vec<PlaylistEvent>,
}

/// Pointer and state before an intent, for change events
#[derive(Clone, Copy)]
struct Snapshot {
    index: Option<usize>,
    state: PlayerState,
}

impl PlaylistManager {
    /// Create a manager, loading the persisted playlist from `store`
    ///
    /// The configured volume is forwarded to the engine immediately.
    pub fn new(
        engine: impl PlaybackEngine + 'static,
        store: impl PlaylistStore + 'static,
        config: ManagerConfig,
    ) -> Self {
        let record = store.load();
        let mut manager = Self {
            playlist: Playlist::from_tracks(record.music_files),
            is_playing: false,
            repeat: config.repeat,
            volume: Volume::new(config.volume),
            last_folder: record.last_folder,
            engine: Box::new(engine),
            store: Box::new(store),
            pending_events: Vec::new(),
        };

        manager.engine.set_volume(manager.volume.level());
        tracing::debug!(
            "Playlist manager ready with {} tracks",
            manager.playlist.len()
        );
        manager
    }

    // ===== Playlist Editing =====

    /// Append tracks to the end of the playlist
    ///
    /// Files without a supported audio extension are skipped. Duplicates are kept.
    /// Returns the number of tracks appended.
    pub fn add_tracks<I, T>(&mut self, tracks: I) -> usize
    where
        I: IntoIterator<Item = T>,
        T: Into<TrackRef>,
    {
        let accepted: Vec<TrackRef> = tracks
            .into_iter()
            .map(Into::into)
            .filter(|track| {
                let supported = scanner::is_audio_file(track.path());
                if !supported {
                    tracing::warn!("Skipping unsupported file: {}", track);
                }
                supported
            })
            .collect();

        if accepted.is_empty() {
            return 0;
        }

        let before = self.snapshot();
        let added = accepted.len();
        self.playlist.append(accepted);
        self.persist();
        self.emit_playlist_changed();
        self.emit_changes(before);

        tracing::debug!("Added {} tracks", added);
        added
    }

    /// Replace the playlist with the playable files inside `path`
    ///
    /// Not recursive. Stops playback if a track was playing. On error the playlist is
    /// left untouched. Returns the number of tracks loaded.
    pub fn load_folder(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let tracks = scanner::scan_folder(path)?;

        let before = self.snapshot();
        if self.is_playing {
            self.halt();
        }

        let loaded = tracks.len();
        self.playlist.replace(tracks);
        self.last_folder = Some(path.to_string_lossy().into_owned());
        self.persist();
        self.emit_playlist_changed();
        self.emit_changes(before);

        tracing::info!("Loaded {} tracks from {}", loaded, path.display());
        Ok(loaded)
    }

    /// Remove track by index
    ///
    /// Stops playback first if the removed track is the one playing. The pointer is
    /// positional: removing an earlier track leaves it on the same index, now naming
    /// the next track, while the old one keeps sounding.
    pub fn remove_track(&mut self, index: usize) -> Result<TrackRef> {
        let len = self.playlist.len();
        if index >= len {
            return Err(PlaylistError::IndexOutOfBounds { index, len });
        }

        let before = self.snapshot();
        if self.is_playing && self.playlist.current_index() == Some(index) {
            self.halt();
        }

        let removed = self
            .playlist
            .remove(index)
            .ok_or(PlaylistError::IndexOutOfBounds { index, len })?;
        self.persist();
        self.emit_playlist_changed();
        self.emit_changes(before);

        tracing::debug!("Removed {} at {}", removed, index);
        Ok(removed)
    }

    /// Move track from `from` to `to`
    ///
    /// The pointer stays on its position, not on the moved track.
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.playlist.len();
        self.playlist
            .reorder(from, to)
            .map_err(|index| PlaylistError::IndexOutOfBounds { index, len })?;

        self.persist();
        self.emit_playlist_changed();
        Ok(())
    }

    /// Randomly permute the playlist
    ///
    /// Clears the pointer, since "current" has no meaning in the new order, and
    /// therefore stops playback.
    pub fn shuffle(&mut self) {
        let before = self.snapshot();
        if self.is_playing {
            self.halt();
        }

        shuffle_tracks(self.playlist.tracks_mut());
        self.playlist.deselect();
        self.persist();
        self.emit_playlist_changed();
        self.emit_changes(before);
    }

    // ===== Playback Control =====

    /// Stop if playing, otherwise start playing `selection`
    ///
    /// # Returns
    /// * `Err(NoSelection)` - Not playing and `selection` is missing or out of range
    /// * `Err(Playback(_))` - Track could not be played; the pointer stays on it
    pub fn toggle_play(&mut self, selection: Option<usize>) -> Result<()> {
        if self.is_playing {
            self.stop();
            return Ok(());
        }

        let index = selection
            .filter(|&index| index < self.playlist.len())
            .ok_or(PlaylistError::NoSelection)?;

        let before = self.snapshot();
        self.playlist.select(index);
        let result = self.play_current();
        self.emit_changes(before);
        result
    }

    /// Stop playback, keeping the pointer
    pub fn stop(&mut self) {
        let before = self.snapshot();
        self.halt();
        self.emit_changes(before);
    }

    /// Flip the repeat flag, returning the new value
    pub fn toggle_repeat(&mut self) -> bool {
        self.repeat = !self.repeat;
        self.pending_events.push(PlaylistEvent::RepeatChanged {
            enabled: self.repeat,
        });
        self.repeat
    }

    /// Set volume (0.0-1.0), clamping out-of-range levels
    pub fn set_volume(&mut self, level: f32) {
        self.volume.set_level(level);
        self.engine.set_volume(self.volume.level());
        self.pending_events.push(PlaylistEvent::VolumeChanged {
            level: self.volume.level(),
        });
    }

    /// Poll the engine, handling a finished track
    ///
    /// Call at a short fixed interval (~100 ms).
    pub fn tick(&mut self) -> Result<()> {
        if self.is_playing && !self.engine.is_active() {
            self.on_track_end()
        } else {
            Ok(())
        }
    }

    /// Handle the current track reaching its natural end
    ///
    /// Repeat on: restart the same track. Repeat off: advance to the next track, or
    /// stop and clear the pointer after the last one.
    pub fn on_track_end(&mut self) -> Result<()> {
        let before = self.snapshot();
        let Some(index) = self.playlist.current_index() else {
            self.halt();
            self.emit_changes(before);
            return Ok(());
        };

        self.pending_events
            .push(PlaylistEvent::TrackFinished { index });

        let result = if self.repeat {
            tracing::debug!("Repeating track {}", index);
            self.play_current()
        } else if self.playlist.advance().is_some() {
            self.play_current()
        } else {
            self.halt();
            tracing::info!("Reached end of playlist");
            Ok(())
        };

        self.emit_changes(before);
        result
    }

    // ===== State Queries =====

    pub fn tracks(&self) -> &[TrackRef] {
        self.playlist.tracks()
    }

    pub fn len(&self) -> usize {
        self.playlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.playlist.current_index()
    }

    pub fn current_track(&self) -> Option<&TrackRef> {
        self.playlist.current_track()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn volume(&self) -> f32 {
        self.volume.level()
    }

    pub fn last_folder(&self) -> Option<&str> {
        self.last_folder.as_deref()
    }

    /// Derived player state
    pub fn state(&self) -> PlayerState {
        match (self.playlist.current_index(), self.is_playing) {
            (None, _) => PlayerState::Idle,
            (Some(_), true) => PlayerState::Playing,
            (Some(_), false) => PlayerState::Stopped,
        }
    }

    /// One-line status for display
    pub fn status_line(&self) -> String {
        match self.current_track() {
            Some(track) if self.is_playing => format!("Playing: {}", track.display_name()),
            _ => "No track playing".to_string(),
        }
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaylistEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    /// Start the track under the pointer
    fn play_current(&mut self) -> Result<()> {
        let Some(track) = self.playlist.current_track().cloned() else {
            self.is_playing = false;
            return Err(PlaylistError::NoSelection);
        };

        match self.engine.load_and_play(&track) {
            Ok(()) => {
                self.is_playing = true;
                tracing::info!("Playing {}", track);
                Ok(())
            }
            Err(e) => {
                self.is_playing = false;
                tracing::warn!("Error playing {}: {}", track, e);
                self.pending_events.push(PlaylistEvent::Error {
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Stop the engine and clear the playing flag
    fn halt(&mut self) {
        self.engine.stop();
        if self.is_playing {
            self.is_playing = false;
            tracing::info!("Playback stopped");
        }
    }

    fn persist(&self) {
        self.store.save(&PersistedPlaylist {
            music_files: self.playlist.tracks().to_vec(),
            last_folder: self.last_folder.clone(),
        });
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            index: self.playlist.current_index(),
            state: self.state(),
        }
    }

    fn emit_changes(&mut self, before: Snapshot) {
        debug_assert!(!self.is_playing || self.playlist.current_index().is_some());

        let index = self.playlist.current_index();
        if index != before.index {
            self.pending_events
                .push(PlaylistEvent::CurrentChanged { index });
        }

        let state = self.state();
        if state != before.state {
            self.pending_events.push(PlaylistEvent::StateChanged { state });
        }
    }

    fn emit_playlist_changed(&mut self) {
        self.pending_events.push(PlaylistEvent::PlaylistChanged {
            length: self.playlist.len(),
        });
    }
}
