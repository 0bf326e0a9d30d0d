//! Apache Derby dialect.

use super::{DialectKind, FunctionSet, LimitStyle, SchemaObject, SqlDialect, expect_args, functions};
use crate::Result;

const IDENTITY_CLAUSE: &str = "GENERATED BY DEFAULT AS IDENTITY (START WITH 1, INCREMENT BY 1)";

const SCHEMA_FILTER: &str = "SELECT SCHEMANAME AS SCHEMA_NAME FROM SYS.SYSSCHEMAS \
     WHERE SCHEMANAME NOT LIKE 'SYS%' AND SCHEMANAME NOT IN ('NULLID', 'SQLJ')";

#[derive(Debug, Clone)]
pub struct DerbyDialect {
    case_sensitive: bool,
    functions: FunctionSet,
}

impl DerbyDialect {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            functions: FunctionSet::with_common(functions::DERBY),
        }
    }
}

impl SqlDialect for DerbyDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Derby
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

    fn schema_filter_script(&self) -> Option<&'static str> {
        Some(SCHEMA_FILTER)
    }

    fn limit_style(&self) -> LimitStyle {
        LimitStyle::OffsetFetch
    }

    fn supports_drop_if_exists(&self) -> bool {
        false
    }

    fn supports_drop_cascade(&self) -> bool {
        false
    }

    fn drop_suffix(&self, object: SchemaObject) -> Option<&'static str> {
        match object {
            SchemaObject::Sequence | SchemaObject::Schema => Some("RESTRICT"),
            _ => None,
        }
    }

    fn nextval_statement(&self, sequence: &str) -> Option<String> {
        Some(format!("VALUES (NEXT VALUE FOR {sequence})"))
    }

    fn lastval_statement(&self, args: &[String]) -> Result<String> {
        expect_args(args, 0)?;
        Ok("VALUES IDENTITY_VAL_LOCAL()".to_string())
    }

    fn alter_column_clause(&self, column: &str, type_text: &str, _definition: &str) -> Option<String> {
        Some(format!("ALTER COLUMN {column} SET DATA TYPE {type_text}"))
    }

    fn rename_table_statement(&self, table: &str, new_name: &str) -> String {
        format!("RENAME TABLE {table} TO {new_name}")
    }
}
