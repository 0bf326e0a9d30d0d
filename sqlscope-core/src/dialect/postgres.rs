//! PostgreSQL dialect.

use super::{CaseFolding, DialectKind, ExistenceStrategy, FunctionSet, SqlDialect, functions, quoting};
use crate::error::SqlScopeError;
use crate::models::{ArtifactKind, DataType, StructureKind};
use crate::Result;

const SCHEMA_FILTER: &str = "SELECT schema_name::text AS schema_name \
     FROM information_schema.schemata \
     WHERE schema_name NOT LIKE 'pg\\_%' AND schema_name <> 'information_schema'";

#[derive(Debug, Clone)]
pub struct PostgresDialect {
    case_sensitive: bool,
    functions: FunctionSet,
}

impl PostgresDialect {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            functions: FunctionSet::with_common(functions::POSTGRES),
        }
    }
}

impl SqlDialect for PostgresDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::PostgreSQL
    }

    fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn functions(&self) -> &FunctionSet {
        &self.functions
    }

    fn case_folding(&self) -> CaseFolding {
        CaseFolding::Lower
    }

    fn identity_clause(&self) -> &'static str {
        "GENERATED BY DEFAULT AS IDENTITY"
    }

    fn type_name(&self, data_type: DataType) -> &'static str {
        match data_type {
            DataType::Double => "DOUBLE PRECISION",
            DataType::Blob => "BYTEA",
            DataType::Clob => "TEXT",
            DataType::Nvarchar => "VARCHAR",
            DataType::Tinyint => "SMALLINT",
            DataType::Bit => "BOOLEAN",
            other => other.standard_name(),
        }
    }

    fn existence_strategy(&self, kind: ArtifactKind) -> ExistenceStrategy {
        match kind {
            ArtifactKind::Synonym => ExistenceStrategy::Unsupported,
            ArtifactKind::Table | ArtifactKind::View => ExistenceStrategy::RowSelect,
            ArtifactKind::Sequence => ExistenceStrategy::Catalog(StructureKind::Sequence),
            ArtifactKind::Procedure => ExistenceStrategy::Catalog(StructureKind::Procedure),
            ArtifactKind::Function => ExistenceStrategy::Catalog(StructureKind::Function),
        }
    }

    fn schema_filter_script(&self) -> Option<&'static str> {
        Some(SCHEMA_FILTER)
    }

    fn supports_synonyms(&self) -> bool {
        false
    }

    // nextval takes the sequence as a regclass literal
    fn nextval_statement(&self, sequence: &str) -> Option<String> {
        Some(format!("SELECT nextval({})", quoting::string_literal(sequence)))
    }

    fn lastval_statement(&self, args: &[String]) -> Result<String> {
        match args {
            [] => Ok("SELECT lastval()".to_string()),
            [table, column] => {
                let table = self.identifier(table)?;
                Ok(format!(
                    "SELECT currval(pg_get_serial_sequence({}, {}))",
                    quoting::string_literal(&table),
                    quoting::string_literal(column)
                ))
            }
            other => Err(SqlScopeError::invalid_state(
                "LASTVAL",
                format!("expected 0 or 2 arguments, got {}", other.len()),
            )),
        }
    }

    fn alter_column_clause(&self, column: &str, type_text: &str, _definition: &str) -> Option<String> {
        Some(format!("ALTER COLUMN {column} TYPE {type_text}"))
    }

    fn supports_multi_action_alter(&self) -> bool {
        true
    }
}
