//! Existence & artifact resolver.
//!
//! Decides whether a named artifact exists using the technique the bound
//! dialect selects for its kind (see [`ExistenceStrategy`]). A failed check
//! counts as absence; connectivity failures and caller cancellation always
//! propagate.

use crate::connection::{CallContext, CatalogConnection, ExecError};
use crate::dialect::{Dialect, ExistenceStrategy, quoting};
use crate::models::{ArtifactKind, StructureKind};
use crate::Result;

/// Checks whether `name` exists as an artifact of `kind`.
///
/// `kind` is authoritative: a synonym and a table sharing a name are never
/// confused, because each kind is checked with its own technique.
///
/// # Errors
/// Returns `SqlScopeError::Connection` when the engine cannot be reached and
/// `SqlScopeError::Cancelled` when `context` fires. Every other check failure
/// yields `Ok(false)`.
pub async fn exists(
    connection: &mut dyn CatalogConnection,
    dialect: &Dialect,
    context: &CallContext,
    name: &str,
    kind: ArtifactKind,
) -> Result<bool> {
    let strategy = dialect.existence_strategy(kind);
    tracing::debug!("Resolving {} '{}' via {:?}", kind, name, strategy);

    let outcome = match strategy {
        ExistenceStrategy::RowSelect => {
            let Ok(sql) = dialect
                .select()
                .column("1")
                .from(name)
                .where_clause("1 = 0")
                .generate()
            else {
                return Ok(false);
            };
            context.run(connection.query(&sql)).await.map(|_| true)
        }
        ExistenceStrategy::AlterSequenceCheck => {
            let Ok(sql) = dialect.alter().sequence(name).generate() else {
                return Ok(false);
            };
            context
                .run(connection.execute_rolled_back(&sql))
                .await
                .map(|_| true)
        }
        ExistenceStrategy::Catalog(structure_kind) => {
            let Some((schema, object)) = catalog_name(dialect, name) else {
                return Ok(false);
            };
            catalog_lookup(connection, context, schema.as_deref(), &object, structure_kind).await
        }
        ExistenceStrategy::Unsupported => return Ok(false),
    };

    match outcome {
        Ok(found) => Ok(found),
        Err(error) => match error.escalate("existence check") {
            Ok(escalated) => Err(escalated),
            Err(source) => {
                tracing::debug!("{} '{}' treated as absent: {}", kind, name, source);
                Ok(false)
            }
        },
    }
}

async fn catalog_lookup(
    connection: &mut dyn CatalogConnection,
    context: &CallContext,
    schema: Option<&str>,
    object: &str,
    kind: StructureKind,
) -> std::result::Result<bool, ExecError> {
    let names = context
        .run(connection.structures(schema, kind, Some(object)))
        .await?;
    Ok(!names.is_empty())
}

/// Splits a possibly schema-qualified name into the parts the catalog
/// stores, folded the way the engine folds unquoted identifiers.
///
/// Returns `None` for names the catalog could never hold (empty parts or
/// more than two parts).
fn catalog_name(dialect: &Dialect, name: &str) -> Option<(Option<String>, String)> {
    let parts: Vec<String> = quoting::split_qualified(name.trim(), dialect.quote_char())
        .into_iter()
        .map(|part| dialect.catalog_identifier(part.trim()))
        .collect();
    if parts.iter().any(String::is_empty) {
        return None;
    }
    match parts.as_slice() {
        [object] => Some((None, object.clone())),
        [schema, object] => Some((Some(schema.clone()), object.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::TabularResult;
    use crate::dialect::{CaseFolding, DialectKind};
    use crate::models::{ColumnMetadata, ParameterMetadata};
    use async_trait::async_trait;
    use std::collections::BTreeSet;

    /// Scripted connection: knows one table, one sequence, one procedure.
    #[derive(Default)]
    struct ScriptedConnection {
        statements: Vec<String>,
        fail_connectivity: bool,
    }

    impl ScriptedConnection {
        fn run(&mut self, sql: &str) -> std::result::Result<(), ExecError> {
            self.statements.push(sql.to_string());
            if self.fail_connectivity {
                return Err(ExecError::Connectivity("connection reset".into()));
            }
            if sql.contains("ORDERS") || sql.contains("ORDER_SEQ") {
                Ok(())
            } else {
                Err(ExecError::Statement("object does not exist".into()))
            }
        }
    }

    #[async_trait]
    impl CatalogConnection for ScriptedConnection {
        async fn execute(&mut self, sql: &str) -> std::result::Result<u64, ExecError> {
            self.run(sql).map(|_| 0)
        }

        async fn execute_rolled_back(&mut self, sql: &str) -> std::result::Result<u64, ExecError> {
            self.run(sql).map(|_| 0)
        }

        async fn query(&mut self, sql: &str) -> std::result::Result<TabularResult, ExecError> {
            self.run(sql).map(|_| TabularResult::default())
        }

        async fn schemas(&mut self) -> std::result::Result<Vec<String>, ExecError> {
            Ok(vec!["APP".to_string()])
        }

        async fn structures(
            &mut self,
            schema: Option<&str>,
            kind: StructureKind,
            name: Option<&str>,
        ) -> std::result::Result<Vec<String>, ExecError> {
            if self.fail_connectivity {
                return Err(ExecError::Connectivity("connection reset".into()));
            }
            let known = kind == StructureKind::Procedure
                && schema.is_none_or(|schema| schema == "APP")
                && name == Some("SHIP_ORDER");
            Ok(if known {
                vec!["SHIP_ORDER".to_string()]
            } else {
                Vec::new()
            })
        }

        async fn columns(
            &mut self,
            _schema: &str,
            _structure: &str,
        ) -> std::result::Result<Vec<ColumnMetadata>, ExecError> {
            Ok(Vec::new())
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

    /// Catalog of sequences that stores names the way an engine does:
    /// quoted names verbatim, unquoted names folded.
    struct FoldingCatalog {
        folding: CaseFolding,
        sequences: BTreeSet<String>,
        lookups: Vec<(Option<String>, String)>,
    }

    impl FoldingCatalog {
        fn new(folding: CaseFolding) -> Self {
            Self {
                folding,
                sequences: BTreeSet::new(),
                lookups: Vec::new(),
            }
        }

        fn stored_name(&self, sql: &str) -> String {
            let qualified = sql
                .split_once("SEQUENCE ")
                .and_then(|(_, rest)| rest.split_whitespace().next())
                .unwrap_or_default();
            let name = quoting::split_qualified(qualified, '"')
                .pop()
                .unwrap_or_default();
            if quoting::is_quoted(name, '"') {
                quoting::unquote(name, '"')
            } else {
                self.folding.fold(name)
            }
        }
    }

    #[async_trait]
    impl CatalogConnection for FoldingCatalog {
        async fn execute(&mut self, sql: &str) -> std::result::Result<u64, ExecError> {
            let name = self.stored_name(sql);
            let changed = if sql.starts_with("CREATE SEQUENCE") {
                self.sequences.insert(name)
            } else if sql.starts_with("DROP SEQUENCE") {
                self.sequences.remove(&name)
            } else {
                false
            };
            Ok(u64::from(changed))
        }

        async fn execute_rolled_back(&mut self, _sql: &str) -> std::result::Result<u64, ExecError> {
            Ok(0)
        }

        async fn query(&mut self, _sql: &str) -> std::result::Result<TabularResult, ExecError> {
            Err(ExecError::Statement("no tables".into()))
        }

        async fn schemas(&mut self) -> std::result::Result<Vec<String>, ExecError> {
            Ok(Vec::new())
        }

        async fn structures(
            &mut self,
            schema: Option<&str>,
            kind: StructureKind,
            name: Option<&str>,
        ) -> std::result::Result<Vec<String>, ExecError> {
            let name = name.unwrap_or_default();
            self.lookups.push((schema.map(str::to_string), name.to_string()));
            Ok(if kind == StructureKind::Sequence && self.sequences.contains(name) {
                vec![name.to_string()]
            } else {
                Vec::new()
            })
        }

        async fn columns(
            &mut self,
            _schema: &str,
            _structure: &str,
        ) -> std::result::Result<Vec<ColumnMetadata>, ExecError> {
            Ok(Vec::new())
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

    #[tokio::test]
    async fn test_sequence_round_trip_follows_engine_case_folding() {
        let context = CallContext::new();
        let cases = [
            (DialectKind::PostgreSQL, false, CaseFolding::Lower, "ORDER_SEQ", "order_seq"),
            (DialectKind::PostgreSQL, true, CaseFolding::Lower, "ORDER_SEQ", "ORDER_SEQ"),
            (DialectKind::Derby, false, CaseFolding::Upper, "order_seq", "ORDER_SEQ"),
            (DialectKind::Default, false, CaseFolding::Upper, "app.order_seq", "ORDER_SEQ"),
        ];

        for (kind, case_sensitive, folding, name, stored) in cases {
            let dialect = Dialect::for_kind(kind, case_sensitive);
            let mut connection = FoldingCatalog::new(folding);

            let create = dialect.create().sequence(name).generate().unwrap();
            connection.execute(&create).await.unwrap();
            assert!(connection.sequences.contains(stored), "{create}");
            assert!(
                exists(&mut connection, &dialect, &context, name, ArtifactKind::Sequence)
                    .await
                    .unwrap(),
                "{kind} {name}"
            );
            assert_eq!(connection.lookups.last().unwrap().1, stored);

            let drop = dialect.drop().sequence(name).generate().unwrap();
            connection.execute(&drop).await.unwrap();
            assert!(
                !exists(&mut connection, &dialect, &context, name, ArtifactKind::Sequence)
                    .await
                    .unwrap(),
                "{kind} {name} after drop"
            );
        }
    }

    #[tokio::test]
    async fn test_folded_schema_reaches_catalog() {
        let dialect = Dialect::for_kind(DialectKind::PostgreSQL, false);
        let mut connection = FoldingCatalog::new(CaseFolding::Lower);
        exists(&mut connection, &dialect, &CallContext::new(), "APP.\"Order_Seq\"", ArtifactKind::Sequence)
            .await
            .unwrap();
        assert_eq!(
            connection.lookups,
            vec![(Some("app".to_string()), "Order_Seq".to_string())]
        );
    }

    #[tokio::test]
    async fn test_row_check() {
        let dialect = Dialect::default_dialect();
        let context = CallContext::new();
        let mut connection = ScriptedConnection::default();

        assert!(exists(&mut connection, &dialect, &context, "ORDERS", ArtifactKind::Table)
            .await
            .unwrap());
        assert!(!exists(&mut connection, &dialect, &context, "nonexistent_xyz", ArtifactKind::View)
            .await
            .unwrap());
        assert_eq!(connection.statements[0], "SELECT 1 FROM ORDERS WHERE 1 = 0");
    }

    #[tokio::test]
    async fn test_hana_sequence_check_uses_alter_sequence() {
        let dialect = Dialect::for_kind(DialectKind::Hana, true);
        let context = CallContext::new();
        let mut connection = ScriptedConnection::default();

        assert!(exists(&mut connection, &dialect, &context, "ORDER_SEQ", ArtifactKind::Sequence)
            .await
            .unwrap());
        assert_eq!(connection.statements, vec!["ALTER SEQUENCE \"ORDER_SEQ\"".to_string()]);
        assert!(!exists(&mut connection, &dialect, &context, "MISSING", ArtifactKind::Sequence)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_catalog_lookup_for_routines() {
        let dialect = Dialect::default_dialect();
        let context = CallContext::new();
        let mut connection = ScriptedConnection::default();

        for name in ["SHIP_ORDER", "APP.SHIP_ORDER"] {
            assert!(exists(&mut connection, &dialect, &context, name, ArtifactKind::Procedure)
                .await
                .unwrap());
        }
        assert!(!exists(&mut connection, &dialect, &context, "SHIP_ORDER", ArtifactKind::Function)
            .await
            .unwrap());
        assert!(!exists(&mut connection, &dialect, &context, "A.B.C", ArtifactKind::Procedure)
            .await
            .unwrap());
        assert!(connection.statements.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_names_are_absent() {
        let dialect = Dialect::default_dialect();
        let context = CallContext::new();
        let mut connection = ScriptedConnection::default();

        for name in ["", "ORDERS; DROP TABLE X", "bad name"] {
            assert!(!exists(&mut connection, &dialect, &context, name, ArtifactKind::Table)
                .await
                .unwrap());
        }
        assert!(connection.statements.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_kind_is_absent() {
        let dialect = Dialect::for_kind(DialectKind::SQLite, false);
        let context = CallContext::new();
        let mut connection = ScriptedConnection::default();
        assert!(!exists(&mut connection, &dialect, &context, "ORDER_SEQ", ArtifactKind::Sequence)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_connectivity_failure_propagates() {
        let dialect = Dialect::default_dialect();
        let context = CallContext::new();
        let mut connection = ScriptedConnection {
            fail_connectivity: true,
            ..Default::default()
        };

        for kind in [ArtifactKind::Table, ArtifactKind::Procedure] {
            let error = exists(&mut connection, &dialect, &context, "ORDERS", kind)
                .await
                .unwrap_err();
            assert!(matches!(error, crate::SqlScopeError::Connection { .. }), "{kind}");
        }
    }

    #[tokio::test]
    async fn test_cancelled_context_propagates() {
        let dialect = Dialect::default_dialect();
        let context = CallContext::new();
        context.cancel();
        let mut connection = ScriptedConnection::default();

        let error = exists(&mut connection, &dialect, &context, "ORDERS", ArtifactKind::Table)
            .await
            .unwrap_err();
        assert!(matches!(error, crate::SqlScopeError::Cancelled { .. }));
    }
}
