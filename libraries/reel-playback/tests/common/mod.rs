//! Shared test helpers

#![allow(dead_code)]

use reel_playback::{
    ManagerConfig, MemoryStore, PersistedPlaylist, PlaybackEngine, PlaybackError,
    PlaylistManager, TrackRef,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Mock engine recording every call
///
/// Clones share state: the manager owns one handle, the test inspects the other.
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    played: Vec<TrackRef>,
    stops: usize,
    volume: Option<f32>,
    active: bool,
    unplayable: HashSet<String>,
}

impl MockEngine {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn played(&self) -> Vec<String> {
        self.state()
            .played
            .iter()
            .map(|t| t.as_str().to_string())
            .collect()
    }

    pub fn stops(&self) -> usize {
        self.state().stops
    }

    pub fn volume(&self) -> Option<f32> {
        self.state().volume
    }

    pub fn active(&self) -> bool {
        self.state().active
    }

    /// Simulate the sounding track reaching its natural end
    pub fn finish_track(&self) {
        self.state().active = false;
    }

    /// Make every future `load_and_play` of `path` fail
    pub fn mark_unplayable(&self, path: &str) {
        self.state().unplayable.insert(path.to_string());
    }
}

impl PlaybackEngine for MockEngine {
    fn load_and_play(&mut self, track: &TrackRef) -> Result<(), PlaybackError> {
        let mut state = self.state();
        if state.unplayable.contains(track.as_str()) {
            state.active = false;
            return Err(PlaybackError::Probe(format!("{}: unsupported format", track)));
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

pub fn record_of(names: &[&str]) -> PersistedPlaylist {
    PersistedPlaylist {
        music_files: names.iter().map(|n| TrackRef::new(*n)).collect(),
        last_folder: None,
    }
}

/// Manager over a memory store pre-filled with `names`
pub fn manager_with(names: &[&str]) -> (PlaylistManager, MockEngine, MemoryStore) {
    manager_with_config(names, ManagerConfig::default())
}

pub fn manager_with_config(
    names: &[&str],
    config: ManagerConfig,
) -> (PlaylistManager, MockEngine, MemoryStore) {
    let engine = MockEngine::default();
    let store = MemoryStore::with_record(record_of(names));
    let manager = PlaylistManager::new(engine.clone(), store.clone(), config);
    (manager, engine, store)
}

pub fn names(manager: &PlaylistManager) -> Vec<&str> {
    manager.tracks().iter().map(TrackRef::as_str).collect()
}
