/// Player configuration
use crate::error::{AppError, Result};
use reel_playback::ManagerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "reel.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Persisted playlist record
    #[serde(default = "default_playlist_path")]
    pub playlist_path: PathBuf,

    /// Initial volume (0.0-1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Initial repeat mode
    #[serde(default)]
    pub repeat: bool,

    /// How often the player checks for the end of a track
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default `reel.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with REEL_)
        settings = settings.add_source(
            config::Environment::with_prefix("REEL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Apply command-line overrides
    ///
    /// `volume` is a percentage (0-100).
    pub fn with_overrides(mut self, playlist_path: Option<PathBuf>, volume: Option<u8>) -> Self {
        if let Some(path) = playlist_path {
            self.playlist_path = path;
        }
        if let Some(percent) = volume {
            self.volume = f32::from(percent) / 100.0;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if !self.volume.is_finite() {
            return Err(AppError::Config(format!(
                "volume must be a number between 0.0 and 1.0, got {}",
                self.volume
            )));
        }

        if self.playlist_path.as_os_str().is_empty() {
            return Err(AppError::Config("playlist_path must not be empty".to_string()));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            volume: self.volume,
            repeat: self.repeat,
        }
    }
}

// Default values
fn default_playlist_path() -> PathBuf {
    PathBuf::from("playlist.json")
}

fn default_volume() -> f32 {
    0.5
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            playlist_path: default_playlist_path(),
            volume: default_volume(),
            repeat: false,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn from_toml(contents: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = from_toml("");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.playlist_path, PathBuf::from("playlist.json"));
        assert_eq!(config.volume, 0.5);
        assert!(!config.repeat);
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn file_values_are_read() {
        let config = from_toml(
            r#"
            playlist_path = "/tmp/mine.json"
            volume = 0.8
            repeat = true
            poll_interval_ms = 250
            "#,
        );

        assert_eq!(config.playlist_path, PathBuf::from("/tmp/mine.json"));
        assert_eq!(config.volume, 0.8);
        assert!(config.repeat);
        assert_eq!(config.poll_interval_ms, 250);
    }

    #[test]
    fn load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        fs::write(&path, "repeat = true\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();

        assert!(config.repeat);
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load(Some(&temp.path().join("absent.toml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn cli_overrides_win() {
        let config = AppConfig::default()
            .with_overrides(Some(PathBuf::from("other.json")), Some(30));

        assert_eq!(config.playlist_path, PathBuf::from("other.json"));
        assert!((config.volume - 0.3).abs() < 1e-6);

        let untouched = AppConfig::default().with_overrides(None, None);
        assert_eq!(untouched, AppConfig::default());
    }

    #[test]
    fn validate_rejects_zero_poll_interval() {
        let config = AppConfig {
            poll_interval_ms: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_nan_volume() {
        let config = AppConfig {
            volume: f32::NAN,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn manager_config_carries_volume_and_repeat() {
        let config = AppConfig {
            volume: 0.9,
            repeat: true,
            ..AppConfig::default()
        };
        let manager = config.manager_config();
        assert_eq!(manager.volume, 0.9);
        assert!(manager.repeat);
    }
}
