//! Playlist randomization
//!
//! Pure random (Fisher-Yates) permutation: every ordering is equally likely.

use crate::types::TrackRef;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};

/// Shuffle tracks in place using the thread-local RNG
pub fn shuffle_tracks(tracks: &mut [TrackRef]) {
    let mut rng = thread_rng();
    shuffle_tracks_with(tracks, &mut rng);
}

/// Shuffle tracks in place using the given RNG
pub fn shuffle_tracks_with<R: Rng + ?Sized>(tracks: &mut [TrackRef], rng: &mut R) {
    tracks.shuffle(rng);
}
