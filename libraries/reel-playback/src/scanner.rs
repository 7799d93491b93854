//! Folder scanning for playable files

use crate::error::{PlaylistError, Result};
use crate::types::TrackRef;
use std::path::Path;
use walkdir::WalkDir;

/// Supported audio file extensions
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "aac", "m4a", "opus"];

/// List playable files directly inside `path`
///
/// Not recursive. Files come back in directory-listing order, which is
/// filesystem-defined and not necessarily alphabetical.
pub fn scan_folder(path: &Path) -> Result<Vec<TrackRef>> {
    if !path.exists() {
        return Err(PlaylistError::FolderNotFound(path.to_path_buf()));
    }

    if !path.is_dir() {
        return Err(PlaylistError::NotADirectory(path.to_path_buf()));
    }

    let mut tracks = Vec::new();
    for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| PlaylistError::Scan {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Resolves symlinks; dangling links read as not-a-file
        if entry.path().is_file() && is_audio_file(entry.path()) {
            tracks.push(TrackRef::from(entry.path()));
        }
    }

    Ok(tracks)
}

/// Check if a file has a supported audio extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("test.mp3")));
        assert!(is_audio_file(Path::new("test.MP3")));
        assert!(is_audio_file(Path::new("/a/b/test.flac")));
        assert!(is_audio_file(Path::new("test.opus")));
        assert!(!is_audio_file(Path::new("test.txt")));
        assert!(!is_audio_file(Path::new("mp3")));
        assert!(!is_audio_file(Path::new("test")));
    }

    #[test]
    fn test_scan_folder_is_flat_and_filtered() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();

        fs::write(base.join("song1.mp3"), b"fake mp3").unwrap();
        fs::write(base.join("song2.FLAC"), b"fake flac").unwrap();
        fs::write(base.join("readme.txt"), b"not audio").unwrap();

        let subdir = base.join("disc2.mp3");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("song3.ogg"), b"fake ogg").unwrap();

        let tracks = scan_folder(base).unwrap();

        assert_eq!(tracks.len(), 2);
        assert!(tracks.iter().any(|t| t.as_str().ends_with("song1.mp3")));
        assert!(tracks.iter().any(|t| t.as_str().ends_with("song2.FLAC")));
        assert!(!tracks.iter().any(|t| t.as_str().ends_with("song3.ogg")));
    }

    #[test]
    fn test_scan_folder_entries_include_folder_path() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.wav"), b"fake").unwrap();

        let tracks = scan_folder(temp.path()).unwrap();

        assert_eq!(tracks[0].path(), temp.path().join("a.wav"));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_folder_keeps_symlinked_tracks() {
        let temp = TempDir::new().unwrap();
        let library = TempDir::new().unwrap();
        let base = temp.path();

        fs::write(base.join("plain.mp3"), b"fake").unwrap();
        let target = library.path().join("elsewhere.mp3");
        fs::write(&target, b"fake").unwrap();
        std::os::unix::fs::symlink(&target, base.join("linked.mp3")).unwrap();
        std::os::unix::fs::symlink(base.join("gone.mp3"), base.join("dangling.mp3")).unwrap();

        let tracks = scan_folder(base).unwrap();

        assert_eq!(tracks.len(), 2);
        assert!(tracks.iter().any(|t| t.as_str().ends_with("plain.mp3")));
        assert!(tracks.iter().any(|t| t.as_str().ends_with("linked.mp3")));
        assert!(!tracks.iter().any(|t| t.as_str().ends_with("dangling.mp3")));
    }

    #[test]
    fn test_scan_empty_folder() {
        let temp = TempDir::new().unwrap();
        assert!(scan_folder(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_scan_missing_folder() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");

        assert!(matches!(
            scan_folder(&missing),
            Err(PlaylistError::FolderNotFound(_))
        ));
    }

    #[test]
    fn test_scan_file_is_not_a_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.mp3");
        fs::write(&file, b"fake").unwrap();

        assert!(matches!(
            scan_folder(&file),
            Err(PlaylistError::NotADirectory(_))
        ));
    }
}
