//! SQLite dialect.

use super::{CaseFolding, DialectKind, ExistenceStrategy, FunctionSet, SqlDialect, expect_args, functions};
use crate::models::{ArtifactKind, DataType};
use crate::Result;

#[derive(Debug, Clone)]
pub struct SqliteDialect {
    case_sensitive: bool,
    functions: FunctionSet,
}

impl SqliteDialect {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            functions: FunctionSet::with_common(functions::SQLITE),
        }
    }
}

impl SqlDialect for SqliteDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::SQLite
    }

    fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn functions(&self) -> &FunctionSet {
        &self.functions
    }

    fn case_folding(&self) -> CaseFolding {
        CaseFolding::Insensitive
    }

    fn identity_clause(&self) -> &'static str {
        "AUTOINCREMENT"
    }

    fn identity_after_primary_key(&self) -> bool {
        true
    }

    fn type_name(&self, data_type: DataType) -> &'static str {
        match data_type {
            DataType::Double => "REAL",
            DataType::Tinyint | DataType::Smallint | DataType::Bigint | DataType::Bit => "INTEGER",
            DataType::Nvarchar | DataType::Clob => "TEXT",
            other => other.standard_name(),
        }
    }

    fn existence_strategy(&self, kind: ArtifactKind) -> ExistenceStrategy {
        match kind {
            ArtifactKind::Table | ArtifactKind::View => ExistenceStrategy::RowSelect,
            ArtifactKind::Synonym
            | ArtifactKind::Sequence
            | ArtifactKind::Procedure
            | ArtifactKind::Function => ExistenceStrategy::Unsupported,
        }
    }

    fn supports_drop_cascade(&self) -> bool {
        false
    }

    fn supports_for_update(&self) -> bool {
        false
    }

    fn supports_sequences(&self) -> bool {
        false
    }

    fn supports_synonyms(&self) -> bool {
        false
    }

    fn supports_schemas(&self) -> bool {
        false
    }

    fn nextval_statement(&self, _sequence: &str) -> Option<String> {
        None
    }

    fn lastval_statement(&self, args: &[String]) -> Result<String> {
        expect_args(args, 0)?;
        Ok("SELECT last_insert_rowid()".to_string())
    }

    fn alter_column_clause(&self, _column: &str, _type_text: &str, _definition: &str) -> Option<String> {
        None
    }
}
