//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from an optional TOML file. A missing or
//! unreadable file is never fatal: a warning is logged and built-in defaults
//! are used.
//!
//! Root folder priority:
//! 1. Command-line argument (highest priority)
//! 2. `COASTAL_ROOT_FOLDER` environment variable
//! 3. TOML config file (`root_folder`)
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable consulted for the root folder
pub const ROOT_FOLDER_ENV: &str = "COASTAL_ROOT_FOLDER";

/// Database file created inside the root folder
pub const DATABASE_FILE_NAME: &str = "community_observations.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the observation database
    pub root_folder: Option<PathBuf>,

    /// HTTP bind address
    pub host: String,

    /// HTTP server port
    pub port: u16,

    pub logging: LoggingConfig,

    /// Geographic bounds accepted at the input boundary
    pub region: RegionBounds,

    /// Score thresholds used to classify fused risk
    pub risk_thresholds: RiskThresholds,

    /// Where live tide/rainfall readings come from
    pub conditions: ConditionsConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            host: "0.0.0.0".to_string(),
            port: 5000,
            logging: LoggingConfig::default(),
            region: RegionBounds::default(),
            risk_thresholds: RiskThresholds::default(),
            conditions: ConditionsConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Live conditions source settings
///
/// Without a readings file the fallback values are served as fixed readings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConditionsConfig {
    /// JSON file refreshed by an external tide/rainfall feed
    pub readings_file: Option<PathBuf>,
    pub fallback_water_level_m: f64,
    pub fallback_rainfall_mm: f64,
}

impl Default for ConditionsConfig {
    fn default() -> Self {
        Self {
            readings_file: None,
            fallback_water_level_m: 1.5,
            fallback_rainfall_mm: 100.0,
        }
    }
}

/// Accepted coordinate range for submitted locations
///
/// Defaults cover the Kerala coast and the adjoining Arabian Sea.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegionBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Default for RegionBounds {
    fn default() -> Self {
        Self {
            lat_min: 8.0,
            lat_max: 12.5,
            lon_min: 74.0,
            lon_max: 78.0,
        }
    }
}

/// Lower bounds (inclusive) of each risk level
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub moderate: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            moderate: 0.2,
            high: 0.4,
            critical: 0.7,
        }
    }
}

impl RiskThresholds {
    /// Thresholds must be ascending and inside [0, 1]
    pub fn validate(&self) -> Result<()> {
        let ordered = 0.0 <= self.moderate
            && self.moderate <= self.high
            && self.high <= self.critical
            && self.critical <= 1.0;
        if ordered {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "Risk thresholds must satisfy 0 <= moderate <= high <= critical <= 1 (got {} / {} / {})",
                self.moderate, self.high, self.critical
            )))
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.risk_thresholds.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults
    ///
    /// A missing file yields defaults with a warning. A present but malformed
    /// file is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Resolves the root folder following the documented priority order
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, toml_root: Option<PathBuf>) -> Self {
        Self { cli_arg, toml_root }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            return path.clone();
        }

        default_root_folder()
    }
}

/// Path of the observation database inside `root_folder`
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE_NAME)
}

/// Default configuration file path (`<config dir>/coastal-risk/config.toml`)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("coastal-risk").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("coastal-risk.toml"))
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("coastal-risk"))
        .unwrap_or_else(|| PathBuf::from("./coastal_data"))
}
