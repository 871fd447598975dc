use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio_system::Volume;
use crate::effect::fade::DEFAULT_FADE_BUDGET_MS;
use crate::error::ConfigError;

const APP_DIR: &str = "Soundscape";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Volume of newly added sounds (0-100)
    pub default_volume: u8,

    /// Fade-out budget: each step waits `fade_budget_ms / volume` ms
    pub fade_budget_ms: u64,

    /// How often the host loop polls units for timers and end of playback
    pub poll_interval_ms: u64,

    /// Project opened at startup when none is given on the command line
    pub last_project: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_volume: Volume::DEFAULT,
            fade_budget_ms: DEFAULT_FADE_BUDGET_MS,
            poll_interval_ms: 10,
            last_project: None,
        }
    }
}

impl Config {
    /// Load configuration from the platform-specific config directory.
    /// Creates default config if file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            tracing::info!("Created default config at: {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|err| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(err),
        })?;
        let config: Config =
            serde_json::from_str(&content).map_err(|err| ConfigError::LoadFailed {
                path: path.display().to_string(),
                source: Box::new(err),
            })?;

        tracing::info!("Loaded config from: {}", path.display());
        Ok(config.validated())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source: err,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|err| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source: Box::new(err),
        })?;
        fs::write(path, json).map_err(|err| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source: Box::new(err),
        })?;

        tracing::debug!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Clamp values a hand-edited file may have pushed out of range
    pub fn validated(mut self) -> Self {
        self.default_volume = Volume::new(self.default_volume).level();
        if self.fade_budget_ms == 0 {
            tracing::warn!("fade_budget_ms must be positive, using default");
            self.fade_budget_ms = DEFAULT_FADE_BUDGET_MS;
        }
        self.poll_interval_ms = self.poll_interval_ms.clamp(1, 1000);
        self
    }

    pub fn app_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::app_dir()?.join("config.json"))
    }

    /// Directory for rolling log files
    pub fn log_dir() -> Result<PathBuf, ConfigError> {
        Ok(Self::app_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_volume, 50);
        assert_eq!(config.fade_budget_ms, 2000);
        assert_eq!(config.poll_interval_ms, 10);
        assert!(config.last_project.is_none());
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_round_trip_and_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            default_volume: 70,
            last_project: Some(PathBuf::from("/tmp/forest.json")),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);

        fs::write(&path, r#"{ "fade_budget_ms": 500 }"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.fade_budget_ms, 500);
        assert_eq!(config.default_volume, 50);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "default_volume": 250, "fade_budget_ms": 0, "poll_interval_ms": 0 }"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_volume, 100);
        assert_eq!(config.fade_budget_ms, 2000);
        assert_eq!(config.poll_interval_ms, 1);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
