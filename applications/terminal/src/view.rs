//! Text rendering of the playlist

use reel_playback::PlaylistManager;
use std::fmt::Write;

pub const HELP: &str = "\
Commands:
  list, ls                 show the playlist
  add <path>...            add audio files (quote paths with spaces)
  folder <dir>             replace the playlist with a folder's audio files
  remove <n>, rm <n>       remove track n
  up <n>, down <n>         move track n one place
  move <from> <to>, mv     move a track
  shuffle                  shuffle the playlist
  play [n], p [n]          play track n (or the current one); stop if playing
  stop                     stop playback
  repeat                   toggle repeat
  volume <0-100>, vol      set volume
  help                     show this help
  quit, exit, q            leave";

/// Numbered playlist (1-based) with the current track marked, then the status line
pub fn render_playlist(manager: &PlaylistManager) -> String {
    let mut out = String::new();

    if manager.is_empty() {
        out.push_str("Playlist is empty\n");
    }

    for (index, track) in manager.tracks().iter().enumerate() {
        let marker = if manager.current_index() == Some(index) {
            "> "
        } else {
            "  "
        };
        let _ = writeln!(out, "{}{:>3}. {}", marker, index + 1, track.display_name());
    }

    out.push_str(&render_status(manager));
    out
}

/// Status line with repeat and volume
pub fn render_status(manager: &PlaylistManager) -> String {
    format!(
        "{}  [repeat: {}, volume: {}%]",
        manager.status_line(),
        if manager.repeat() { "on" } else { "off" },
        (manager.volume() * 100.0).round() as u32
    )
}
