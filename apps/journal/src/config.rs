//! # App Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SKYPASS_DB_PATH=/tmp/journal.db                                    │
//! │     SKYPASS_LOG=debug                                                  │
//! │     SKYPASS_LATITUDE=45.92  SKYPASS_LONGITUDE=6.87                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     explicit path, else $SKYPASS_CONFIG, else                          │
//! │     ~/.config/skypass/config.toml (Linux)                              │
//! │     ~/Library/Application Support/com.skypass.journal/config.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     <data dir>/skypass.db, 4 connections, no fixed location            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/home/me/skypass.db"   # ":memory:" for a throwaway store
//! max_connections = 4
//!
//! [logging]
//! filter = "info,skypass=debug"
//!
//! [location]
//! latitude = 45.92
//! longitude = 6.87
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use skypass_db::pool::IN_MEMORY_PATH;
use skypass_db::DbConfig;

use crate::error::{AppError, AppResult};

/// Default tracing filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,skypass=debug,sqlx=warn";

const DB_FILE_NAME: &str = "skypass.db";
const CONFIG_FILE_NAME: &str = "config.toml";

fn coordinate(var: &str, value: String) -> Option<f64> {
    match value.parse::<f64>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(var, %value, "Ignoring unparsable coordinate");
            None
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "skypass", "journal")
}

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file. `None` means the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    4
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives. `RUST_LOG` still wins when set.
    #[serde(default)]
    pub filter: Option<String>,
}

/// `[location]` section.
///
/// A fixed last-known position for hosts without a positioning service.
/// Both coordinates must be given together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSettings {
    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,
}

// =============================================================================
// App Config
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub location: LocationSettings,
}

impl AppConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Load from `config_path`, `$SKYPASS_CONFIG` or the platform config dir
    /// 3. Apply environment variable overrides
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var_os("SKYPASS_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML file without applying overrides.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.database.max_connections == 0 {
            return Err(AppError::InvalidConfig(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if let Some(path) = &self.database.path {
            if path.as_os_str().is_empty() {
                return Err(AppError::InvalidConfig("database.path must not be empty".into()));
            }
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(AppError::InvalidConfig(format!(
                        "location.latitude out of range: {}",
                        lat
                    )));
                }
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(AppError::InvalidConfig(format!(
                        "location.longitude out of range: {}",
                        lon
                    )));
                }
            }
            (None, None) => {}
            _ => {
                return Err(AppError::InvalidConfig(
                    "location.latitude and location.longitude must be set together".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable numbers are ignored.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("SKYPASS_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(filter) = var("SKYPASS_LOG") {
            self.logging.filter = Some(filter);
        }

        if let Some(lat) = var("SKYPASS_LATITUDE").and_then(|v| coordinate("SKYPASS_LATITUDE", v)) {
            self.location.latitude = Some(lat);
        }

        if let Some(lon) = var("SKYPASS_LONGITUDE").and_then(|v| coordinate("SKYPASS_LONGITUDE", v))
        {
            self.location.longitude = Some(lon);
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Resolves the database file, creating the data directory if needed.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.skypass.journal/skypass.db`
    /// - **Windows**: `%APPDATA%\skypass\journal\data\skypass.db`
    /// - **Linux**: `~/.local/share/journal/skypass.db`
    pub fn database_path(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(AppError::NoProjectDir("data"))?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join(DB_FILE_NAME))
    }

    /// Builds the store configuration.
    pub fn db_config(&self) -> AppResult<DbConfig> {
        let path = self.database_path()?;
        if path == Path::new(IN_MEMORY_PATH) {
            return Ok(DbConfig::in_memory());
        }
        Ok(DbConfig::new(path).max_connections(self.database.max_connections))
    }

    /// The configured tracing filter, or the default.
    pub fn log_filter(&self) -> &str {
        self.logging.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// The fixed position, if both coordinates are configured.
    pub fn fixed_location(&self) -> Option<(f64, f64)> {
        self.location.latitude.zip(self.location.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert!(config.fixed_location().is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [location]
            latitude = 45.92
            longitude = 6.87
            "#,
        )
        .unwrap();

        assert_eq!(config.database, DatabaseSettings::default());
        assert_eq!(config.fixed_location(), Some((45.92, 6.87)));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"/tmp/j.db\"\nmax_connections = 2\n\n[logging]\nfilter = \"warn\"\n",
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/j.db")));
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let err = AppConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, AppError::ConfigRead { .. }));
    }

    #[test]
    fn test_bad_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database\n").unwrap();

        assert!(matches!(
            AppConfig::from_file(&path).unwrap_err(),
            AppError::ConfigParse(_)
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SKYPASS_DB_PATH", ":memory:"),
            ("SKYPASS_LOG", "trace"),
            ("SKYPASS_LATITUDE", "-33.92"),
            ("SKYPASS_LONGITUDE", "not a number"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, Some(PathBuf::from(":memory:")));
        assert_eq!(config.log_filter(), "trace");
        assert_eq!(config.location.latitude, Some(-33.92));
        assert_eq!(config.location.longitude, None);
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.database.max_connections = 0;
        assert!(config.validate().is_err());
        config.database.max_connections = 1;

        // Half a location is rejected
        config.location.latitude = Some(10.0);
        assert!(config.validate().is_err());

        config.location.longitude = Some(200.0);
        assert!(config.validate().is_err());

        config.location.longitude = Some(20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_path_builds_in_memory_store() {
        let mut config = AppConfig::default();
        config.database.path = Some(PathBuf::from(IN_MEMORY_PATH));

        assert!(config.db_config().unwrap().is_in_memory());
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("max_connections = 4"));
    }
}
