//! Metadata extractor.
//!
//! Walks a connection's catalog and builds [`MetadataNode`] snapshots. Every
//! catalog read runs once under the caller's [`CallContext`]; a failed read
//! aborts the whole extraction with `MetadataUnavailable` naming the
//! structure that was being read. Nothing is retried.
//!
//! # Ordering
//! Structures are emitted tables first, then views, procedures, functions
//! and sequences, each group sorted by name. Columns keep catalog ordinal
//! order and parameters keep declared order.

use std::collections::HashSet;

use crate::connection::{CallContext, CatalogConnection, ExecError};
use crate::dialect::Dialect;
use crate::error::SqlScopeError;
use crate::models::{MetadataNode, NodeKind, StructureKind};
use crate::Result;

/// Maps a failed catalog read onto the engine error type.
fn read_failure(error: ExecError, structure: &str) -> SqlScopeError {
    match error.escalate(&format!("metadata extraction of '{structure}'")) {
        Ok(escalated) => escalated,
        Err(source) => SqlScopeError::metadata_unavailable(structure, source),
    }
}

/// Lists the schemas visible through `dialect`, sorted and deduplicated.
///
/// Dialects with a schema filter script run it instead of the generic
/// catalog call, which would also report system schemas. The script's
/// `SCHEMA_NAME` column is used when present, otherwise its first column.
pub async fn list_schemas(
    connection: &mut dyn CatalogConnection,
    dialect: &Dialect,
    context: &CallContext,
) -> Result<Vec<String>> {
    let mut schemas = match dialect.schema_filter_script() {
        Some(script) => context
            .run(connection.query(script))
            .await
            .map(|result| result.column_values_or_first("SCHEMA_NAME"))
            .map_err(|e| read_failure(e, "schemas"))?,
        None => context
            .run(connection.schemas())
            .await
            .map_err(|e| read_failure(e, "schemas"))?,
    };
    schemas.sort();
    schemas.dedup();
    Ok(schemas)
}

/// Extracts a schema node with every structure it contains.
///
/// # Errors
/// `NotFound` when the schema is not among [`list_schemas`];
/// `MetadataUnavailable` when any catalog read fails.
pub async fn extract_schema(
    connection: &mut dyn CatalogConnection,
    dialect: &Dialect,
    context: &CallContext,
    schema: &str,
) -> Result<MetadataNode> {
    let schemas = list_schemas(connection, dialect, context).await?;
    let stored = schemas
        .iter()
        .find(|candidate| candidate.as_str() == schema)
        .or_else(|| {
            schemas
                .iter()
                .find(|candidate| dialect.catalog_matches(candidate, schema))
        })
        .ok_or_else(|| SqlScopeError::not_found("schema", schema))?;
    walk_schema(connection, context, stored).await
}

async fn walk_schema(
    connection: &mut dyn CatalogConnection,
    context: &CallContext,
    schema: &str,
) -> Result<MetadataNode> {
    let mut node = MetadataNode::new(schema, NodeKind::Schema);
    let mut seen = HashSet::new();

    for kind in StructureKind::WALK_ORDER {
        let mut names = context
            .run(connection.structures(Some(schema), kind, None))
            .await
            .map_err(|e| read_failure(e, schema))?;
        names.sort();

        for name in names {
            if !seen.insert(name.clone()) {
                tracing::warn!(
                    "Skipping duplicate {} '{}' in schema '{}'",
                    kind,
                    name,
                    schema
                );
                continue;
            }
            let structure = structure_node(connection, context, schema, &name, kind).await?;
            node.structures.push(structure);
        }
    }

    tracing::info!(
        "Extracted schema '{}' with {} structures",
        schema,
        node.structures.len()
    );
    Ok(node)
}

/// Extracts one structure without walking its siblings.
///
/// `schema` and `name` are looked up as given first, then in the spelling
/// the engine stores for them when written unquoted through `dialect`. The
/// node carries the catalog spelling.
///
/// # Errors
/// `NotFound` when no structure of `kind` named `name` exists in `schema`.
pub async fn extract_structure(
    connection: &mut dyn CatalogConnection,
    dialect: &Dialect,
    context: &CallContext,
    schema: &str,
    name: &str,
    kind: StructureKind,
) -> Result<MetadataNode> {
    let qualified = format!("{schema}.{name}");
    let mut candidates = vec![(schema.to_string(), name.to_string())];
    let folded = (dialect.catalog_identifier(schema), dialect.catalog_identifier(name));
    if folded != candidates[0] {
        candidates.push(folded);
    }

    for (schema, name) in &candidates {
        let found = context
            .run(connection.structures(Some(schema), kind, Some(name)))
            .await
            .map_err(|e| read_failure(e, &qualified))?;
        if let Some(stored) = found.into_iter().next() {
            return structure_node(connection, context, schema, &stored, kind).await;
        }
    }
    Err(SqlScopeError::not_found(kind.as_str(), qualified))
}

/// Extracts a datasource node holding every visible schema.
pub async fn extract_datasource(
    connection: &mut dyn CatalogConnection,
    dialect: &Dialect,
    context: &CallContext,
    datasource: &str,
) -> Result<MetadataNode> {
    let mut node = MetadataNode::new(datasource, NodeKind::Datasource);
    for schema in list_schemas(connection, dialect, context).await? {
        node.structures
            .push(walk_schema(connection, context, &schema).await?);
    }
    Ok(node)
}

async fn structure_node(
    connection: &mut dyn CatalogConnection,
    context: &CallContext,
    schema: &str,
    name: &str,
    kind: StructureKind,
) -> Result<MetadataNode> {
    let qualified = format!("{schema}.{name}");
    let mut node = MetadataNode::new(name, kind.into());

    if kind.has_columns() {
        node.columns = context
            .run(connection.columns(schema, name))
            .await
            .map_err(|e| read_failure(e, &qualified))?;
    }

    if kind.has_parameters() {
        let mut parameters = context
            .run(connection.parameters(schema, name, kind))
            .await
            .map_err(|e| read_failure(e, &qualified))?;
        // Unnamed (positional) parameters
        for (position, parameter) in parameters.iter_mut().enumerate() {
            if parameter.name.is_empty() {
                parameter.name = format!("${}", position + 1);
            }
        }
        node.parameters = parameters;
    }

    tracing::debug!(
        "Extracted {} '{}' ({} columns, {} parameters)",
        kind,
        qualified,
        node.columns.len(),
        node.parameters.len()
    );
    Ok(node)
}
