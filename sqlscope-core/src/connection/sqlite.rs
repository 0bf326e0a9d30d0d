//! SQLite connection handling.
//!
//! Schemas are the attached databases (`main` plus anything `ATTACH`ed),
//! structures come from each database's `sqlite_master`, columns from the
//! `pragma_table_info` table-valued function. SQLite has no procedures,
//! functions or sequences, so those catalog reads are always empty.

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Connection, Row, Sqlite};
use std::str::FromStr;

use super::{
    CatalogConnection, DataSource, ExecError, PoolSettings, TabularResult, classify_sqlx_error,
};
use crate::dialect::quoting;
use crate::error::SqlScopeError;
use crate::models::{ColumnMetadata, DatabaseType, ParameterMetadata, StructureKind};
use crate::Result;

/// Pool over one SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteDataSource {
    pool: SqlitePool,
}

impl SqliteDataSource {
    /// Opens a pool for `connection_string`.
    ///
    /// In-memory databases live inside a single connection, so their pool is
    /// capped at one connection that is never recycled.
    pub async fn connect(connection_string: &str, settings: PoolSettings) -> Result<Self> {
        let normalized = normalize_connection_string(connection_string);
        let options = SqliteConnectOptions::from_str(&normalized).map_err(|e| {
            SqlScopeError::configuration(format!("Invalid SQLite connection string: {}", e))
        })?;

        let mut pool_options = SqlitePoolOptions::new().acquire_timeout(settings.acquire_timeout);
        pool_options = if is_in_memory(connection_string) {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(settings.max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| SqlScopeError::connection_failed("Failed to open SQLite database", e))?;

        tracing::debug!("Opened SQLite data source");
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DataSource for SqliteDataSource {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLite
    }

    async fn acquire(&self) -> std::result::Result<Box<dyn CatalogConnection>, ExecError> {
        let connection = self.pool.acquire().await.map_err(classify_sqlx_error)?;
        Ok(Box::new(SqliteCatalogConnection { connection }))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// One pooled SQLite connection; returned to the pool on drop.
pub struct SqliteCatalogConnection {
    connection: PoolConnection<Sqlite>,
}

fn cell(row: &SqliteRow, index: usize) -> Option<String> {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value;
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    None
}

fn structure_type(kind: StructureKind) -> Option<&'static str> {
    match kind {
        StructureKind::Table => Some("table"),
        StructureKind::View => Some("view"),
        StructureKind::Procedure | StructureKind::Function | StructureKind::Sequence => None,
    }
}

#[async_trait]
impl CatalogConnection for SqliteCatalogConnection {
    async fn execute(&mut self, sql: &str) -> std::result::Result<u64, ExecError> {
        tracing::debug!("Executing: {}", sql);
        sqlx::query(sql)
            .execute(&mut *self.connection)
            .await
            .map(|result| result.rows_affected())
            .map_err(classify_sqlx_error)
    }

    async fn execute_rolled_back(&mut self, sql: &str) -> std::result::Result<u64, ExecError> {
        tracing::debug!("Executing in rolled back transaction: {}", sql);
        let mut transaction = self.connection.begin().await.map_err(classify_sqlx_error)?;
        let result = sqlx::query(sql).execute(&mut *transaction).await;
        transaction.rollback().await.map_err(classify_sqlx_error)?;
        result
            .map(|result| result.rows_affected())
            .map_err(classify_sqlx_error)
    }

    async fn query(&mut self, sql: &str) -> std::result::Result<TabularResult, ExecError> {
        tracing::debug!("Querying: {}", sql);
        let rows = sqlx::query(sql)
            .fetch_all(&mut *self.connection)
            .await
            .map_err(classify_sqlx_error)?;

        let columns = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let rows = rows
            .iter()
            .map(|row| (0..row.len()).map(|index| cell(row, index)).collect())
            .collect();
        Ok(TabularResult { columns, rows })
    }

    async fn schemas(&mut self) -> std::result::Result<Vec<String>, ExecError> {
        let rows = sqlx::query("SELECT name FROM pragma_database_list ORDER BY seq")
            .fetch_all(&mut *self.connection)
            .await
            .map_err(classify_sqlx_error)?;

        let mut schemas = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row
                .try_get("name")
                .map_err(|e| ExecError::Statement(Box::new(e)))?;
            if name != "temp" {
                schemas.push(name);
            }
        }
        Ok(schemas)
    }

    async fn structures(
        &mut self,
        schema: Option<&str>,
        kind: StructureKind,
        name: Option<&str>,
    ) -> std::result::Result<Vec<String>, ExecError> {
        let Some(object_type) = structure_type(kind) else {
            return Ok(Vec::new());
        };

        let master = format!(
            "{}.sqlite_master",
            quoting::quote_identifier(schema.unwrap_or("main"), '"', true)
        );
        let sql = format!(
            "SELECT name FROM {master} \
             WHERE type = ? AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
             AND (? IS NULL OR name = ? COLLATE NOCASE) \
             ORDER BY name"
        );
        sqlx::query_scalar::<_, String>(&sql)
            .bind(object_type)
            .bind(name)
            .bind(name)
            .fetch_all(&mut *self.connection)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn columns(
        &mut self,
        schema: &str,
        structure: &str,
    ) -> std::result::Result<Vec<ColumnMetadata>, ExecError> {
        let rows = sqlx::query(
            "SELECT name, type, \"notnull\", dflt_value, pk \
             FROM pragma_table_info(?, ?) ORDER BY cid",
        )
        .bind(structure)
        .bind(schema)
        .fetch_all(&mut *self.connection)
        .await
        .map_err(classify_sqlx_error)?;

        rows.iter()
            .map(|row| {
                let decode = |e: sqlx::Error| ExecError::Statement(Box::new(e));
                let not_null: i64 = row.try_get("notnull").map_err(decode)?;
                let primary_key: i64 = row.try_get("pk").map_err(decode)?;
                Ok(ColumnMetadata {
                    name: row.try_get("name").map_err(decode)?,
                    data_type: row.try_get("type").map_err(decode)?,
                    nullable: not_null == 0 && primary_key == 0,
                    key: primary_key > 0,
                    default: cell(row, 3),
                })
            })
            .collect()
    }

    async fn parameters(
        &mut self,
        _schema: &str,
        _routine: &str,
        _kind: StructureKind,
    ) -> std::result::Result<Vec<ParameterMetadata>, ExecError> {
        Ok(Vec::new())
    }
}

/// Checks if the connection string names an in-memory database.
pub fn is_in_memory(connection_string: &str) -> bool {
    connection_string.contains(":memory:") || connection_string.contains("mode=memory")
}

/// Normalizes connection string to SQLite URL format.
fn normalize_connection_string(connection_string: &str) -> String {
    if connection_string == ":memory:" {
        return "sqlite::memory:".to_string();
    }

    if connection_string.starts_with("sqlite:") {
        return connection_string.to_string();
    }

    format!("sqlite://{}", connection_string)
}
