//! Cross-dialect SQL generation and catalog introspection.
//!
//! This crate builds DDL/DML statement text for several incompatible SQL
//! engines from one description, and reads a live connection's catalog into
//! a canonical metadata document (schemas, structures, columns and
//! parameters).
//!
//! # Architecture
//! Data flows one way, from the façade down to the connection:
//! - [`service`]: argument validation and document shaping
//! - [`resolver`] / [`extractor`]: existence checks and catalog walks
//! - [`builders`]: statement text, driven by the bound dialect
//! - [`dialect`]: per-engine syntax and catalog rules
//! - [`connection`]: pooled connections (sqlx), cancellation and deadlines
//!
//! # Security
//! - Identifiers are validated and quoted before they reach statement text
//! - Expressions only call whitelisted functions and may not contain
//!   statement separators or comments
//! - Connection URLs are redacted in errors, logs and `Display` output

pub mod builders;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod models;
pub mod resolver;
pub mod service;

// Re-export commonly used types
pub use config::{DatasourceConfig, EngineConfig};
pub use connection::{CallContext, CatalogConnection, DataSource, ExecError};
pub use dialect::{Dialect, DialectKind, DialectRegistry, SqlDialect};
pub use error::{Result, SqlScopeError};
pub use models::{
    ArtifactKind, ColumnMetadata, DataType, DatabaseType, MetadataNode, NodeKind,
    ParameterDirection, ParameterMetadata, StructureKind,
};
pub use service::{DatabaseMetadataService, DatasourceRegistry};
