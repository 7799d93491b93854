//! Ordered track list with a positional current-track pointer
//!
//! The pointer is an index, not a track identity: reordering never retargets it,
//! and shrinking the list only clamps it back into range.

use crate::types::TrackRef;

/// Ordered playlist
///
/// ```text
/// tracks:  [ a.mp3 | b.mp3 | c.mp3 ]
/// current:            ^ Some(1)
/// ```
///
/// Invariant: `current` is `None` or `< tracks.len()`.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<TrackRef>,
    current: Option<usize>,
}

impl Playlist {
    /// Create new empty playlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted tracks, pointing at the first one
    pub fn from_tracks(tracks: Vec<TrackRef>) -> Self {
        let current = if tracks.is_empty() { None } else { Some(0) };
        Self { tracks, current }
    }

    /// Append tracks to the end
    ///
    /// Selects the first track if nothing was selected and the list is now non-empty.
    pub fn append(&mut self, tracks: impl IntoIterator<Item = TrackRef>) {
        self.tracks.extend(tracks);
        if self.current.is_none() && !self.tracks.is_empty() {
            self.current = Some(0);
        }
    }

    /// Replace every track, pointing at the first one
    pub fn replace(&mut self, tracks: Vec<TrackRef>) {
        *self = Self::from_tracks(tracks);
    }

    /// Remove track by index
    ///
    /// Returns the removed track if the index was valid.
    pub fn remove(&mut self, index: usize) -> Option<TrackRef> {
        if index >= self.tracks.len() {
            return None;
        }

        let track = self.tracks.remove(index);
        self.clamp_current();
        Some(track)
    }

    /// Move track from `from` to `to`, shifting the tracks in between
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), usize> {
        let len = self.tracks.len();
        if from >= len {
            return Err(from);
        }
        if to >= len {
            return Err(to);
        }

        if from != to {
            let track = self.tracks.remove(from);
            self.tracks.insert(to, track);
        }
        Ok(())
    }

    /// Point at `index` if it is valid
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    /// Clear the pointer
    pub fn deselect(&mut self) {
        self.current = None;
    }

    /// Advance the pointer
    ///
    /// Returns the new index, or `None` (pointer cleared) when already at the end.
    pub fn advance(&mut self) -> Option<usize> {
        self.current = self
            .current
            .map(|index| index + 1)
            .filter(|&next| next < self.tracks.len());
        self.current
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&TrackRef> {
        self.current.and_then(|index| self.tracks.get(index))
    }

    pub fn get(&self, index: usize) -> Option<&TrackRef> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[TrackRef] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Mutable access for in-place permutation
    ///
    /// Only reorders: the caller is responsible for the pointer.
    pub(crate) fn tracks_mut(&mut self) -> &mut [TrackRef] {
        &mut self.tracks
    }

    fn clamp_current(&mut self) {
        self.current = match (self.current, self.tracks.len()) {
            (_, 0) | (None, _) => None,
            (Some(index), len) => Some(index.min(len - 1)),
        };
    }
}
