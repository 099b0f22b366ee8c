//! Backoffice configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults.
//!
//! | Variable                      | Default                               |
//! |-------------------------------|---------------------------------------|
//! | `COMISSIO_DB_PATH`            | platform data dir + `comissio.db`     |
//! | `COMISSIO_DB_MAX_CONNECTIONS` | `5`                                   |
//! | `COMISSIO_COMPANY_ID`         | `DEFAULT_COMPANY_ID`                  |
//! | `COMISSIO_RUN_MIGRATIONS`     | `true`                                |

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use directories::ProjectDirs;

use comissio_core::DEFAULT_COMPANY_ID;
use comissio_db::DbConfig;

/// Backoffice configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackofficeConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Tenant the CLI operates on
    pub company_id: String,

    /// Apply pending migrations on startup
    pub run_migrations: bool,
}

impl BackofficeConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let var = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

        let database_path = match var("COMISSIO_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_database_path()?,
        };

        let max_connections = match var("COMISSIO_DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("COMISSIO_DB_MAX_CONNECTIONS".to_string()))?,
            None => 5,
        };

        let company_id = var("COMISSIO_COMPANY_ID")
            .unwrap_or(DEFAULT_COMPANY_ID)
            .to_string();

        let run_migrations = match var("COMISSIO_RUN_MIGRATIONS") {
            Some(raw) => raw
                .parse::<bool>()
                .map_err(|_| ConfigError::InvalidValue("COMISSIO_RUN_MIGRATIONS".to_string()))?,
            None => true,
        };

        Ok(BackofficeConfig {
            database_path,
            max_connections,
            company_id,
            run_migrations,
        })
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .run_migrations(self.run_migrations)
    }
}

/// Platform data directory, e.g. `~/.local/share/comissioflow/comissio.db`
/// on Linux. The directory is created if missing.
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "comissioflow", "comissioflow")
        .ok_or(ConfigError::NoDataDirectory)?;

    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .map_err(|e| ConfigError::DataDirectory(e.to_string()))?;

    Ok(data_dir.join("comissio.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine a data directory; set COMISSIO_DB_PATH")]
    NoDataDirectory,

    #[error("Could not create data directory: {0}")]
    DataDirectory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_explicit_values() {
        let config = BackofficeConfig::from_vars(&vars(&[
            ("COMISSIO_DB_PATH", "/tmp/comissio-test.db"),
            ("COMISSIO_DB_MAX_CONNECTIONS", "3"),
            ("COMISSIO_COMPANY_ID", "acme"),
            ("COMISSIO_RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/comissio-test.db"));
        assert_eq!(config.max_connections, 3);
        assert_eq!(config.company_id, "acme");
        assert!(!config.run_migrations);
        assert_eq!(config.db_config().max_connections, 3);
    }

    #[test]
    fn test_defaults() {
        let config =
            BackofficeConfig::from_vars(&vars(&[("COMISSIO_DB_PATH", "/tmp/x.db")])).unwrap();

        assert_eq!(config.max_connections, 5);
        assert_eq!(config.company_id, DEFAULT_COMPANY_ID);
        assert!(config.run_migrations);
    }

    #[test]
    fn test_invalid_values() {
        let err = BackofficeConfig::from_vars(&vars(&[
            ("COMISSIO_DB_PATH", "/tmp/x.db"),
            ("COMISSIO_DB_MAX_CONNECTIONS", "zero"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name) if name == "COMISSIO_DB_MAX_CONNECTIONS"));

        let err = BackofficeConfig::from_vars(&vars(&[
            ("COMISSIO_DB_PATH", "/tmp/x.db"),
            ("COMISSIO_RUN_MIGRATIONS", "sometimes"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }
}
