//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CamRigError, RigResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default simulation settings.
    #[serde(default)]
    pub simulation: SimulationDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default parameters for offline rig simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationDefaults {
    /// Frames per second used when a scenario does not pick its own rate.
    pub fps: u32,

    /// Emit one trace frame every N simulated frames.
    pub trace_stride: u32,

    /// Upper bound on simulated seconds, guards against runaway scripts.
    pub max_duration_secs: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "camrig_rig_core=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            fps: 60,
            trace_stride: 1,
            max_duration_secs: 600.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> RigResult<Self> {
        if !path.exists() {
            return Err(CamRigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        if config.simulation.fps == 0 {
            return Err(CamRigError::config("simulation.fps must be greater than zero"));
        }
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("camrig").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("camrig-config-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.simulation.fps, 60);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_path("roundtrip.json");
        let mut config = AppConfig::default();
        config.simulation.fps = 30;
        config.logging.level = "debug".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.simulation.fps, 30);
        assert_eq!(loaded.logging.level, "debug");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let path = temp_path("partial.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "logging": { "level": "warn", "json": true, "file": null } }"#)
            .unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.simulation.fps, 60);
        assert!(loaded.logging.json);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_zero_fps_rejected() {
        let path = temp_path("zero-fps.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{ "simulation": { "fps": 0, "trace_stride": 1, "max_duration_secs": 10.0 } }"#,
        )
        .unwrap();

        assert!(matches!(
            AppConfig::load_from(&path),
            Err(CamRigError::Config { .. })
        ));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file() {
        let path = temp_path("does-not-exist.json");
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(CamRigError::FileNotFound { .. })
        ));
    }
}
