//! Datasource to dialect bindings.

use std::collections::HashMap;

use super::Dialect;
use crate::error::SqlScopeError;
use crate::Result;

/// Maps datasource identifiers to their bound dialect.
///
/// Bindings are made once while the registry is assembled; afterwards the
/// registry is only read, so it can be shared behind an `Arc` without locks.
#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    bindings: HashMap<String, Dialect>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `dialect` to `datasource`.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the datasource already has a dialect.
    pub fn bind(&mut self, datasource: impl Into<String>, dialect: Dialect) -> Result<()> {
        let datasource = datasource.into();
        if self.bindings.contains_key(&datasource) {
            return Err(SqlScopeError::configuration(format!(
                "datasource '{}' already has a dialect bound",
                datasource
            )));
        }
        tracing::debug!(
            "Bound {} dialect to datasource '{}'",
            dialect.kind(),
            datasource
        );
        self.bindings.insert(datasource, dialect);
        Ok(())
    }

    /// Returns the dialect bound to `datasource`.
    pub fn resolve(&self, datasource: &str) -> Result<Dialect> {
        self.bindings
            .get(datasource)
            .cloned()
            .ok_or_else(|| SqlScopeError::unknown_datasource(datasource))
    }

    pub fn contains(&self, datasource: &str) -> bool {
        self.bindings.contains_key(datasource)
    }

    /// Bound datasource identifiers, sorted.
    pub fn datasources(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.keys().cloned().collect();
        names.sort();
        names
    }
}
