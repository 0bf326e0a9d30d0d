//! SAP HANA dialect.

use super::{DialectKind, ExistenceStrategy, FunctionSet, SqlDialect, expect_args, functions};
use crate::models::{ArtifactKind, StructureKind};
use crate::Result;

const IDENTITY_CLAUSE: &str = "GENERATED BY DEFAULT AS IDENTITY (START WITH 1 INCREMENT BY 1)";

#[derive(Debug, Clone)]
pub struct HanaDialect {
    case_sensitive: bool,
    functions: FunctionSet,
}

impl HanaDialect {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            functions: FunctionSet::with_common(functions::HANA),
        }
    }
}

impl SqlDialect for HanaDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Hana
    }

    fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn functions(&self) -> &FunctionSet {
        &self.functions
    }

    fn identity_clause(&self) -> &'static str {
        IDENTITY_CLAUSE
    }

    // HANA has no readable sequence catalog for every user, so existence is
    // decided by whether the sequence can be altered.
    fn existence_strategy(&self, kind: ArtifactKind) -> ExistenceStrategy {
        match kind {
            ArtifactKind::Sequence => ExistenceStrategy::AlterSequenceCheck,
            ArtifactKind::Table | ArtifactKind::View | ArtifactKind::Synonym => {
                ExistenceStrategy::RowSelect
            }
            ArtifactKind::Procedure => ExistenceStrategy::Catalog(StructureKind::Procedure),
            ArtifactKind::Function => ExistenceStrategy::Catalog(StructureKind::Function),
        }
    }

    fn schema_filter_script(&self) -> Option<&'static str> {
        Some(r#"SELECT * FROM "SYS"."SCHEMAS""#)
    }

    fn supports_drop_if_exists(&self) -> bool {
        false
    }

    fn nextval_statement(&self, sequence: &str) -> Option<String> {
        Some(format!("SELECT {sequence}.NEXTVAL FROM DUMMY"))
    }

    fn lastval_statement(&self, args: &[String]) -> Result<String> {
        expect_args(args, 1)?;
        let table = self.identifier(&args[0])?;
        Ok(format!("SELECT CURRENT_IDENTITY_VALUE() FROM {table}"))
    }

    fn add_column_clause(&self, definition: &str) -> String {
        format!("ADD ({definition})")
    }

    fn drop_column_clause(&self, column: &str) -> String {
        format!("DROP ({column})")
    }

    fn alter_column_clause(&self, _column: &str, _type_text: &str, definition: &str) -> Option<String> {
        Some(format!("ALTER ({definition})"))
    }

    fn rename_table_statement(&self, table: &str, new_name: &str) -> String {
        format!("RENAME TABLE {table} TO {new_name}")
    }
}
