//! Live connection abstraction the resolver and the extractor run against.
//!
//! A [`DataSource`] is a pool handle owned by the embedding process; each
//! existence check or extraction pass acquires one [`CatalogConnection`]
//! from it and drops it on every exit path, which returns it to the pool.
//!
//! # Module Structure
//! - `context`: caller cancellation and deadline ([`CallContext`])
//! - `sqlite`: sqlx-backed SQLite implementation (feature `sqlite`)
//! - `postgres`: sqlx-backed PostgreSQL implementation (feature `postgresql`)

pub mod context;
#[cfg(feature = "postgresql")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use context::CallContext;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{BoxError, SqlScopeError};
use crate::models::{ColumnMetadata, DatabaseType, ParameterMetadata, StructureKind};
use crate::Result;

/// Failure of a single statement execution or catalog read.
///
/// Connectivity failures are kept apart from statement failures so the
/// resolver can turn the latter into "absent" while always surfacing the
/// former.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// Network, authentication or pool failure
    #[error("connectivity failure: {0}")]
    Connectivity(#[source] BoxError),

    /// The engine rejected or failed the statement
    #[error("statement failed: {0}")]
    Statement(#[source] BoxError),

    /// The caller cancelled the call
    #[error("cancelled by caller")]
    Cancelled,

    /// The caller's deadline elapsed
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl ExecError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ExecError::Connectivity(_))
    }

    /// Maps failures that are never absorbed onto the engine error type.
    ///
    /// Returns `None` for statement failures, whose meaning depends on the
    /// caller (absence for the resolver, `MetadataUnavailable` for the
    /// extractor).
    pub fn escalate(self, operation: &str) -> std::result::Result<SqlScopeError, BoxError> {
        match self {
            ExecError::Connectivity(source) => Ok(SqlScopeError::Connection {
                context: operation.to_string(),
                source,
            }),
            ExecError::Cancelled => Ok(SqlScopeError::cancelled(operation)),
            ExecError::DeadlineExceeded => Ok(SqlScopeError::cancelled(format!(
                "{operation} (deadline exceeded)"
            ))),
            ExecError::Statement(source) => Err(source),
        }
    }
}

/// Classifies a sqlx error as connectivity or statement failure.
#[cfg(any(feature = "postgresql", feature = "sqlite"))]
pub fn classify_sqlx_error(error: sqlx::Error) -> ExecError {
    let connectivity = match &error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(database_error) => database_error
            .code()
            .is_some_and(|code| is_connectivity_sqlstate(&code)),
        _ => false,
    };

    if connectivity {
        ExecError::Connectivity(Box::new(error))
    } else {
        ExecError::Statement(Box::new(error))
    }
}

/// SQLSTATE classes 08 (connection exception), 28 (invalid authorization)
/// and 57P (operator intervention). Only five-character codes are SQLSTATEs;
/// SQLite reports its numeric result codes through the same accessor.
pub fn is_connectivity_sqlstate(code: &str) -> bool {
    code.len() == 5 && (code.starts_with("08") || code.starts_with("28") || code.starts_with("57P"))
}

/// Result of an arbitrary query, every cell rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl TabularResult {
    /// Case-insensitive column lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    /// Non-null values of the named column, or of the first column when
    /// the name is absent.
    pub fn column_values_or_first(&self, name: &str) -> Vec<String> {
        let index = self.column_index(name).unwrap_or(0);
        self.rows
            .iter()
            .filter_map(|row| row.get(index).cloned().flatten())
            .collect()
    }
}

/// One scoped connection.
///
/// Catalog methods take raw (unquoted) names and match them exactly.
#[async_trait]
pub trait CatalogConnection: Send {
    /// Executes a statement, returning the affected row count.
    async fn execute(&mut self, sql: &str) -> std::result::Result<u64, ExecError>;

    /// Executes a statement inside a transaction that is always rolled back.
    async fn execute_rolled_back(&mut self, sql: &str) -> std::result::Result<u64, ExecError>;

    async fn query(&mut self, sql: &str) -> std::result::Result<TabularResult, ExecError>;

    /// All schemas the generic catalog reports, system schemas included.
    async fn schemas(&mut self) -> std::result::Result<Vec<String>, ExecError>;

    /// Names of structures of `kind` in `schema` (the session default when
    /// `None`), optionally restricted to exactly `name`.
    async fn structures(
        &mut self,
        schema: Option<&str>,
        kind: StructureKind,
        name: Option<&str>,
    ) -> std::result::Result<Vec<String>, ExecError>;

    /// Columns in ordinal order.
    async fn columns(
        &mut self,
        schema: &str,
        structure: &str,
    ) -> std::result::Result<Vec<ColumnMetadata>, ExecError>;

    /// Parameters in declared order.
    async fn parameters(
        &mut self,
        schema: &str,
        routine: &str,
        kind: StructureKind,
    ) -> std::result::Result<Vec<ParameterMetadata>, ExecError>;
}

/// Pool handle shared by concurrent callers.
#[async_trait]
pub trait DataSource: Send + Sync + fmt::Debug {
    fn database_type(&self) -> DatabaseType;

    /// Acquires a connection; it is released when the box is dropped.
    async fn acquire(&self) -> std::result::Result<Box<dyn CatalogConnection>, ExecError>;

    /// Closes the pool.
    async fn close(&self) {}
}

/// Pool settings shared by every driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Detects the database type from a connection string.
pub fn detect_database_type(connection_string: &str) -> Result<DatabaseType> {
    if connection_string.starts_with("postgres://") || connection_string.starts_with("postgresql://") {
        Ok(DatabaseType::PostgreSQL)
    } else if connection_string.starts_with("sqlite:")
        || connection_string == ":memory:"
        || connection_string.ends_with(".db")
        || connection_string.ends_with(".sqlite")
        || connection_string.ends_with(".sqlite3")
    {
        Ok(DatabaseType::SQLite)
    } else {
        Err(SqlScopeError::configuration(format!(
            "Unsupported connection string: {}",
            crate::error::redact_database_url(connection_string)
        )))
    }
}

/// Opens a data source for `connection_string`.
///
/// PostgreSQL pools connect lazily, so an unreachable server surfaces on the
/// first acquire rather than here.
pub async fn create_datasource(
    connection_string: &str,
    settings: PoolSettings,
) -> Result<Arc<dyn DataSource>> {
    match detect_database_type(connection_string)? {
        #[cfg(feature = "postgresql")]
        DatabaseType::PostgreSQL => Ok(Arc::new(postgres::PostgresDataSource::connect_lazy(
            connection_string,
            settings,
        )?)),
        #[cfg(not(feature = "postgresql"))]
        DatabaseType::PostgreSQL => Err(SqlScopeError::configuration(
            "PostgreSQL support not compiled in (enable the postgresql feature)",
        )),
        #[cfg(feature = "sqlite")]
        DatabaseType::SQLite => Ok(Arc::new(
            sqlite::SqliteDataSource::connect(connection_string, settings).await?,
        )),
        #[cfg(not(feature = "sqlite"))]
        DatabaseType::SQLite => Err(SqlScopeError::configuration(
            "SQLite support not compiled in (enable the sqlite feature)",
        )),
    }
}
