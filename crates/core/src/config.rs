use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_laser_pin() -> u8 {
    5
}

fn default_led_pin() -> u8 {
    9
}

fn default_tracks_dir() -> PathBuf {
    PathBuf::from("tracks")
}

fn default_warmup_pulses() -> u32 {
    3
}

fn default_audio_enabled() -> bool {
    true
}

/// Runtime settings for the show. Pin numbers follow the reference wiring
/// (laser on pin 5, LED strip on pin 9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowSettings {
    #[serde(default = "default_laser_pin")]
    pub laser_pin: u8,
    #[serde(default = "default_led_pin")]
    pub led_pin: u8,
    #[serde(default = "default_tracks_dir")]
    pub tracks_dir: PathBuf,
    #[serde(default = "default_warmup_pulses")]
    pub warmup_pulses: u32,
    #[serde(default = "default_audio_enabled")]
    pub audio_enabled: bool,
}

impl Default for ShowSettings {
    fn default() -> Self {
        Self {
            laser_pin: default_laser_pin(),
            led_pin: default_led_pin(),
            tracks_dir: default_tracks_dir(),
            warmup_pulses: default_warmup_pulses(),
            audio_enabled: default_audio_enabled(),
        }
    }
}

/// Persisted configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub settings: ShowSettings,
    pub created_at: String,
    pub modified_at: String,
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(msg) => write!(f, "Failed to read config file: {}", msg),
            ConfigError::WriteError(msg) => write!(f, "Failed to write config file: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config file: {}", msg),
            ConfigError::SerializeError(msg) => write!(f, "Failed to serialize config: {}", msg),
            ConfigError::ValidationError(errors) => {
                write!(f, "Config validation errors: {}", errors.join(", "))
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration manager for show settings
/// Settings are stored in config.json in the working directory by default
pub struct ConfigManager {
    config_path: PathBuf,
    settings: ShowSettings,
}

impl ConfigManager {
    /// Create a new configuration manager
    /// If no path is provided, defaults to 'config.json' in the current working directory
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(|| PathBuf::from("config.json"));

        Self {
            config_path,
            settings: ShowSettings::default(),
        }
    }

    /// Load settings from the configuration file
    /// Creates a default config file if none exists yet
    pub fn load(&mut self) -> Result<ShowSettings, ConfigError> {
        if !self.config_path.exists() {
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config_file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config_file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Config file version {} doesn't match application version {}. Using defaults for new settings.",
                config_file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Self::validate_settings(&config_file.settings)?;
        self.settings = config_file.settings;
        Ok(self.settings.clone())
    }

    /// Save current settings to the configuration file
    pub fn save(&self) -> Result<(), ConfigError> {
        let now = chrono::Local::now().to_rfc3339();
        let created_at = fs::read_to_string(&self.config_path)
            .ok()
            .and_then(|content| serde_json::from_str::<ConfigFile>(&content).ok())
            .map(|file| file.created_at)
            .unwrap_or_else(|| now.clone());

        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at,
            modified_at: now,
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(&self.config_path, content).map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    /// Validate and persist new settings
    pub fn update_settings(&mut self, settings: ShowSettings) -> Result<(), ConfigError> {
        Self::validate_settings(&settings)?;
        self.settings = settings;
        self.save()
    }

    pub fn settings(&self) -> &ShowSettings {
        &self.settings
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn validate_settings(settings: &ShowSettings) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if settings.laser_pin == settings.led_pin {
            errors.push(format!(
                "laser_pin and led_pin must differ (both are {})",
                settings.laser_pin
            ));
        }
        if settings.warmup_pulses == 0 {
            errors.push("warmup_pulses must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_defaults_match_reference_wiring() {
        let settings = ShowSettings::default();
        assert_eq!(settings.laser_pin, 5);
        assert_eq!(settings.led_pin, 9);
        assert_eq!(settings.tracks_dir, PathBuf::from("tracks"));
        assert_eq!(settings.warmup_pulses, 3);
        assert!(settings.audio_enabled);
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let mut manager = ConfigManager::new(Some(config_path.clone()));
        let settings = manager.load().unwrap();

        assert!(config_path.exists());
        assert_eq!(settings, ShowSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let mut manager = ConfigManager::new(Some(config_path.clone()));
        manager
            .update_settings(ShowSettings {
                laser_pin: 7,
                led_pin: 11,
                tracks_dir: PathBuf::from("music"),
                warmup_pulses: 5,
                audio_enabled: false,
            })
            .unwrap();

        let mut manager2 = ConfigManager::new(Some(config_path));
        let loaded = manager2.load().unwrap();

        assert_eq!(loaded.laser_pin, 7);
        assert_eq!(loaded.led_pin, 11);
        assert_eq!(loaded.tracks_dir, PathBuf::from("music"));
        assert_eq!(loaded.warmup_pulses, 5);
        assert!(!loaded.audio_enabled);
    }

    #[test]
    fn test_validation() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = ConfigManager::new(Some(temp_dir.path().join("config.json")));

        let mut settings = ShowSettings::default();
        settings.led_pin = settings.laser_pin;
        assert!(matches!(
            manager.update_settings(settings),
            Err(ConfigError::ValidationError(_))
        ));

        let mut settings = ShowSettings::default();
        settings.warmup_pulses = 0;
        assert!(matches!(
            manager.update_settings(settings),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
