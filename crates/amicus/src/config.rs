//! Configuration management for amicus.
//!
//! Configuration loads through figment from defaults, a TOML file, and
//! `AMICUS_`-prefixed environment variables, then validates.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::CsvStyle;
use crate::ingest::{COOLDOWN_MS, DEBOUNCE_MS};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "amicus";

/// Application configuration.
///
/// Sources in order of precedence, highest first:
/// 1. Environment variables (prefixed with `AMICUS_`)
/// 2. TOML config file at `~/.config/amicus/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Scanner configuration.
    pub scanner: ScannerSettings,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the persisted state slots.
    /// Defaults to `~/.local/share/amicus`.
    pub state_dir: Option<PathBuf>,
}

/// Scanner-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    /// Frame sampling rate hint.
    pub fps: u32,
    /// Side of the square detection region, in pixels.
    pub box_px: u32,
    /// Prefer the rear-facing camera.
    pub rear_facing: bool,
    /// Repeat-scan suppression window in milliseconds.
    pub debounce_ms: u64,
    /// Cosmetic pause after a successful scan, in milliseconds.
    pub cooldown_ms: u64,
}

/// Export-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// CSV field sanitization style.
    pub style: CsvStyle,
    /// Directory exports are written to. Defaults to the working directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            fps: 10,
            box_px: 250,
            rear_facing: true,
            debounce_ms: DEBOUNCE_MS,
            cooldown_ms: COOLDOWN_MS,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("AMICUS_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.scanner.fps == 0 {
            return Err(Error::ConfigValidation {
                message: "scanner.fps must be greater than 0".to_string(),
            });
        }
        if self.scanner.box_px == 0 {
            return Err(Error::ConfigValidation {
                message: "scanner.box_px must be greater than 0".to_string(),
            });
        }
        if self.scanner.debounce_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "scanner.debounce_ms must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Get the state directory, resolving defaults if not set.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.storage
            .state_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the export output directory, resolving defaults if not set.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Scanner hints for the frame producer.
    #[must_use]
    pub fn scanner_config(&self) -> crate::scanner::ScannerConfig {
        crate::scanner::ScannerConfig {
            fps: self.scanner.fps,
            box_px: self.scanner.box_px,
            rear_facing: self.scanner.rear_facing,
        }
    }

    /// Post-scan cooldown as a `Duration`.
    #[must_use]
    pub fn cooldown(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.scanner.cooldown_ms)
    }
}
