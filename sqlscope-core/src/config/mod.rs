//! Engine configuration.
//!
//! - `EngineConfig`: the set of datasources to register
//! - `DatasourceConfig`: connection URL, pool limits and dialect binding
//!
//! Configuration is read once at startup; dialects and pools built from it
//! are immutable afterwards.

mod datasource;

pub use datasource::DatasourceConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::SqlScopeError;
use crate::Result;

/// Top-level configuration file.
///
/// ```json
/// {
///   "datasources": [
///     { "name": "ds1", "url": "postgres://app@db.internal/orders" },
///     { "name": "local", "url": "sqlite://./local.db", "case_sensitive": true }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub datasources: Vec<DatasourceConfig>,
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|source| {
            SqlScopeError::Serialization {
                context: "engine configuration".to_string(),
                source,
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SqlScopeError::Io {
            context: format!("reading configuration {}", path.display()),
            source,
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Validates every datasource and rejects duplicate names.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for datasource in &self.datasources {
            datasource.validate()?;
            if !names.insert(datasource.name.as_str()) {
                return Err(SqlScopeError::configuration(format!(
                    "duplicate datasource name '{}'",
                    datasource.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = EngineConfig::from_json_str(
            r#"{"datasources": [
                {"name": "ds1", "url": "sqlite::memory:"},
                {"name": "pg", "url": "postgres://app@localhost/orders", "max_connections": 10}
            ]}"#,
        )
        .unwrap();
        assert_eq!(config.datasources.len(), 2);
        assert_eq!(config.datasources[1].max_connections, 10);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let error = EngineConfig::from_json_str(
            r#"{"datasources": [
                {"name": "ds1", "url": "sqlite::memory:"},
                {"name": "ds1", "url": "sqlite::memory:"}
            ]}"#,
        )
        .unwrap_err();
        assert!(error.to_string().contains("duplicate"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            EngineConfig::from_json_str("{datasources"),
            Err(SqlScopeError::Serialization { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            EngineConfig::from_file("/nonexistent/sqlscope.json"),
            Err(SqlScopeError::Io { .. })
        ));
    }
}
