//! Definition/metadata façade.
//!
//! [`DatabaseMetadataService`] is the only entry point transport layers
//! use. It validates arguments, resolves the datasource, acquires one
//! connection for the duration of the call and delegates to the resolver or
//! the extractor. Documents are returned in their canonical JSON shape.

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::connection::{CallContext, CatalogConnection, DataSource, create_datasource};
use crate::dialect::{Dialect, DialectRegistry};
use crate::error::SqlScopeError;
use crate::models::{ArtifactKind, StructureKind};
use crate::{extractor, resolver, Result};

/// Datasource pools and their bound dialects.
///
/// Assembled once at startup and read-only afterwards.
#[derive(Debug, Default)]
pub struct DatasourceRegistry {
    dialects: DialectRegistry,
    sources: HashMap<String, Arc<dyn DataSource>>,
}

impl DatasourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pool under `name` and binds `dialect` to it.
    ///
    /// # Errors
    /// Returns a configuration error if `name` is already registered.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        source: Arc<dyn DataSource>,
        dialect: Dialect,
    ) -> Result<()> {
        let name = name.into();
        self.dialects.bind(name.clone(), dialect)?;
        self.sources.insert(name, source);
        Ok(())
    }

    /// Opens one pool per configured datasource.
    pub async fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let mut registry = Self::new();
        for datasource in &config.datasources {
            let dialect = datasource.dialect()?;
            let source = create_datasource(&datasource.url, datasource.pool_settings()).await?;
            tracing::info!(
                "Registered datasource '{}' ({} dialect, {})",
                datasource.name,
                dialect.kind(),
                source.database_type()
            );
            registry.register(datasource.name.clone(), source, dialect)?;
        }
        Ok(registry)
    }

    /// Returns the pool and dialect bound to `name`.
    ///
    /// # Errors
    /// Returns `UnknownDatasource` when nothing is registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<(Arc<dyn DataSource>, Dialect)> {
        let dialect = self.dialects.resolve(name)?;
        let source = self
            .sources
            .get(name)
            .cloned()
            .ok_or_else(|| SqlScopeError::unknown_datasource(name))?;
        Ok((source, dialect))
    }

    /// Registered datasource names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.dialects.datasources()
    }

    /// Closes every pool.
    pub async fn close(&self) {
        for source in self.sources.values() {
            source.close().await;
        }
    }
}

/// Metadata and existence queries over the registered datasources.
#[derive(Debug, Clone)]
pub struct DatabaseMetadataService {
    registry: Arc<DatasourceRegistry>,
}

fn require<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SqlScopeError::invalid_argument(format!(
            "{what} name cannot be empty"
        )));
    }
    Ok(trimmed)
}

impl DatabaseMetadataService {
    pub fn new(registry: DatasourceRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &DatasourceRegistry {
        &self.registry
    }

    /// Dialect bound to `datasource`, for callers that generate statements.
    pub fn dialect(&self, datasource: &str) -> Result<Dialect> {
        let datasource = require(datasource, "datasource")?;
        self.lookup(datasource).map(|(_, dialect)| dialect)
    }

    pub fn list_datasource_names(&self) -> BTreeSet<String> {
        self.registry.names().into_iter().collect()
    }

    /// Schema names of `datasource`, system schemas filtered where the
    /// dialect knows how.
    pub async fn list_schema_names(
        &self,
        context: &CallContext,
        datasource: &str,
    ) -> Result<BTreeSet<String>> {
        let datasource = require(datasource, "datasource")?;
        let (mut connection, dialect) = self.connect(context, datasource).await?;
        let schemas = extractor::list_schemas(connection.as_mut(), &dialect, context).await?;
        Ok(schemas.into_iter().collect())
    }

    pub async fn get_schema_metadata_document(
        &self,
        context: &CallContext,
        datasource: &str,
        schema: &str,
    ) -> Result<Value> {
        let datasource = require(datasource, "datasource")?;
        let schema = require(schema, "schema")?;
        let (mut connection, dialect) = self.connect(context, datasource).await?;
        extractor::extract_schema(connection.as_mut(), &dialect, context, schema)
            .await?
            .to_document()
    }

    /// Document of one structure; `kind` is one of table, view, procedure,
    /// function or sequence.
    pub async fn get_structure_metadata_document(
        &self,
        context: &CallContext,
        datasource: &str,
        schema: &str,
        structure: &str,
        kind: &str,
    ) -> Result<Value> {
        let datasource = require(datasource, "datasource")?;
        let schema = require(schema, "schema")?;
        let structure = require(structure, "structure")?;
        let kind: StructureKind = kind.parse()?;
        let (mut connection, dialect) = self.connect(context, datasource).await?;
        extractor::extract_structure(connection.as_mut(), &dialect, context, schema, structure, kind)
            .await?
            .to_document()
    }

    /// Document of the whole datasource: every visible schema in full.
    pub async fn get_datasource_metadata_document(
        &self,
        context: &CallContext,
        datasource: &str,
    ) -> Result<Value> {
        let datasource = require(datasource, "datasource")?;
        let (mut connection, dialect) = self.connect(context, datasource).await?;
        extractor::extract_datasource(connection.as_mut(), &dialect, context, datasource)
            .await?
            .to_document()
    }

    /// Finds a structure without knowing its kind.
    ///
    /// Kinds are tried in walk order (table, view, procedure, function,
    /// sequence); the first match wins.
    pub async fn find_structure_metadata_document(
        &self,
        context: &CallContext,
        datasource: &str,
        schema: &str,
        structure: &str,
    ) -> Result<Value> {
        let datasource = require(datasource, "datasource")?;
        let schema = require(schema, "schema")?;
        let structure = require(structure, "structure")?;
        let (mut connection, dialect) = self.connect(context, datasource).await?;

        for kind in StructureKind::WALK_ORDER {
            match extractor::extract_structure(connection.as_mut(), &dialect, context, schema, structure, kind)
                .await
            {
                Ok(node) => return node.to_document(),
                Err(SqlScopeError::NotFound { .. }) => continue,
                Err(error) => return Err(error),
            }
        }
        Err(SqlScopeError::not_found(
            "structure",
            format!("{schema}.{structure}"),
        ))
    }

    /// Whether `name` exists as an artifact of `kind` in `datasource`.
    pub async fn artifact_exists(
        &self,
        context: &CallContext,
        datasource: &str,
        name: &str,
        kind: ArtifactKind,
    ) -> Result<bool> {
        let datasource = require(datasource, "datasource")?;
        let name = require(name, "artifact")?;
        let (mut connection, dialect) = self.connect(context, datasource).await?;
        resolver::exists(connection.as_mut(), &dialect, context, name, kind).await
    }

    fn lookup(&self, datasource: &str) -> Result<(Arc<dyn DataSource>, Dialect)> {
        self.registry.resolve(datasource).map_err(|error| match error {
            SqlScopeError::UnknownDatasource { name } => SqlScopeError::not_found("datasource", name),
            other => other,
        })
    }

    /// Acquires a connection; it goes back to the pool when dropped.
    async fn connect(
        &self,
        context: &CallContext,
        datasource: &str,
    ) -> Result<(Box<dyn CatalogConnection>, Dialect)> {
        let (source, dialect) = self.lookup(datasource)?;
        let connection = context.run(source.acquire()).await.map_err(|error| {
            let operation = format!("acquiring a connection for '{datasource}'");
            match error.escalate(&operation) {
                Ok(escalated) => escalated,
                Err(cause) => SqlScopeError::connection_failed(operation, cause),
            }
        })?;
        Ok((connection, dialect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ExecError;
    use crate::dialect::DialectKind;
    use crate::models::DatabaseType;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct UnreachableSource;

    #[async_trait]
    impl DataSource for UnreachableSource {
        fn database_type(&self) -> DatabaseType {
            DatabaseType::PostgreSQL
        }

        async fn acquire(&self) -> std::result::Result<Box<dyn CatalogConnection>, ExecError> {
            Err(ExecError::Connectivity("connection refused".into()))
        }
    }

    fn service() -> DatabaseMetadataService {
        let mut registry = DatasourceRegistry::new();
        registry
            .register(
                "ds1",
                Arc::new(UnreachableSource),
                Dialect::for_kind(DialectKind::Hana, true),
            )
            .unwrap();
        DatabaseMetadataService::new(registry)
    }

    #[tokio::test]
    async fn test_empty_names_rejected_before_connecting() {
        let service = service();
        let context = CallContext::new();

        let error = service.list_schema_names(&context, "  ").await.unwrap_err();
        assert!(matches!(error, SqlScopeError::InvalidArgument { .. }));

        let error = service
            .get_structure_metadata_document(&context, "ds1", "APP", "", "table")
            .await
            .unwrap_err();
        assert!(matches!(error, SqlScopeError::InvalidArgument { .. }));

        let error = service
            .get_structure_metadata_document(&context, "ds1", "APP", "ORDERS", "synonym")
            .await
            .unwrap_err();
        assert!(matches!(error, SqlScopeError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_unknown_datasource_is_not_found() {
        let error = service()
            .list_schema_names(&CallContext::new(), "nope")
            .await
            .unwrap_err();
        assert!(matches!(error, SqlScopeError::NotFound { ref kind, .. } if kind == "datasource"));
        assert_eq!(error.http_status(), 404);
    }

    #[tokio::test]
    async fn test_connectivity_surfaces() {
        let error = service()
            .artifact_exists(&CallContext::new(), "ds1", "ORDERS", ArtifactKind::Table)
            .await
            .unwrap_err();
        assert!(matches!(error, SqlScopeError::Connection { .. }));
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = DatasourceRegistry::new();
        let dialect = Dialect::default_dialect();
        registry
            .register("ds1", Arc::new(UnreachableSource), dialect.clone())
            .unwrap();
        assert!(registry
            .register("ds1", Arc::new(UnreachableSource), dialect)
            .is_err());
        assert!(matches!(
            registry.resolve("ds2"),
            Err(SqlScopeError::UnknownDatasource { .. })
        ));
    }

    #[test]
    fn test_dialect_lookup() {
        let service = service();
        assert_eq!(service.dialect("ds1").unwrap().kind(), DialectKind::Hana);
        assert_eq!(
            service.list_datasource_names().into_iter().collect::<Vec<_>>(),
            vec!["ds1".to_string()]
        );
    }
}
