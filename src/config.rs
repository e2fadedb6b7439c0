//! Database configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DbError, DbResult};

/// Settings a [crate::Database] is built from.
///
/// # Example
///
/// ```rust
/// use kiv::DatabaseConfig;
///
/// let config = DatabaseConfig::from_json_str(r#"{ "name": "inventory" }"#).unwrap();
/// assert_eq!(config.name, "inventory");
/// assert_eq!(config.log_filter, "info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Name of the database.
    pub name: String,

    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "kiv".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> DbResult<Self> {
        serde_json::from_str(json).map_err(|e| DbError::Config(e.to_string()))
    }

    /// Reads a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }
}
