//! # Database Configuration
//!
//! Pool settings for the SQLite store.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment variables (highest)                                    │
//! │     SMARTPOS_DB_PATH, SMARTPOS_DB_MAX_CONNECTIONS, ...                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  2. TOML file, [database] table                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  3. Built-in defaults (lowest)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # smartpos.toml
//! [database]
//! database_path = "./data/smartpos.db"
//! max_connections = 5
//! min_connections = 1
//! connect_timeout_secs = 30
//! idle_timeout_secs = 600
//! run_migrations = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};

/// Default database file when nothing else is configured.
pub const DEFAULT_DATABASE_PATH: &str = "./smartpos.db";

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/smartpos.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection acquire timeout.
    /// Default: 30 seconds
    #[serde(rename = "connect_timeout_secs", with = "duration_secs")]
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    #[serde(rename = "idle_timeout_secs", with = "duration_secs")]
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig::new(DEFAULT_DATABASE_PATH)
    }
}

/// Shape of the configuration file. Only `[database]` is read.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    database: DbConfig,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file is created on first connect if it does not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Fresh, isolated schema for every test
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// Returns true for the `:memory:` database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }

    /// Loads configuration from a TOML file, then applies environment
    /// overrides and validates the result.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            info!(path = %path.display(), "Loading database config");
            let contents = std::fs::read_to_string(path)
                .map_err(|e| DbError::ConfigFailed(format!("{}: {}", path.display(), e)))?;
            Self::from_toml_str(&contents)?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            DbConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parses the `[database]` table of a TOML document.
    pub fn from_toml_str(contents: &str) -> DbResult<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.database)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DbResult<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(DbError::ConfigFailed("database_path must not be empty".into()));
        }

        if self.max_connections == 0 {
            return Err(DbError::ConfigFailed(
                "max_connections must be greater than 0".into(),
            ));
        }

        // Each :memory: connection opens its own empty database.
        if self.is_in_memory() && self.max_connections > 1 {
            return Err(DbError::ConfigFailed(format!(
                "in-memory database requires max_connections = 1, got {}",
                self.max_connections
            )));
        }

        if self.min_connections > self.max_connections {
            return Err(DbError::ConfigFailed(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("SMARTPOS_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = PathBuf::from(path);
        }

        if let Ok(max) = std::env::var("SMARTPOS_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid SMARTPOS_DB_MAX_CONNECTIONS"),
            }
        }

        if let Ok(min) = std::env::var("SMARTPOS_DB_MIN_CONNECTIONS") {
            match min.parse::<u32>() {
                Ok(n) => self.min_connections = n,
                Err(_) => warn!(value = %min, "Ignoring invalid SMARTPOS_DB_MIN_CONNECTIONS"),
            }
        }

        if let Ok(run) = std::env::var("SMARTPOS_DB_RUN_MIGRATIONS") {
            match run.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.run_migrations = true,
                "0" | "false" | "no" => self.run_migrations = false,
                _ => warn!(value = %run, "Ignoring invalid SMARTPOS_DB_RUN_MIGRATIONS"),
            }
        }
    }
}

/// Serde adapter storing a `Duration` as whole seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
