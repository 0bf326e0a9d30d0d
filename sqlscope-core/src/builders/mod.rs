//! Statement builder framework.
//!
//! Every builder is an owned descriptor configured through by-value
//! chaining and finished by a pure `generate()`. Construction never fails;
//! incomplete or unsupported descriptors are reported by `generate()` as
//! [`SqlScopeError::InvalidStatementState`], malformed identifiers as
//! [`SqlScopeError::InvalidArgument`].
//!
//! # Example
//!
//! ```rust
//! use sqlscope_core::dialect::{Dialect, DialectKind};
//! use sqlscope_core::builders::ColumnDefinition;
//! use sqlscope_core::models::DataType;
//!
//! let dialect = Dialect::for_kind(DialectKind::Hana, true);
//! let sql = dialect
//!     .create()
//!     .table("ORDERS")
//!     .column(ColumnDefinition::new("ID", DataType::Integer).primary_key().identity())
//!     .column(ColumnDefinition::new("TOTAL", DataType::Decimal).precision(10, 2))
//!     .generate()
//!     .unwrap();
//! assert_eq!(
//!     sql,
//!     "CREATE TABLE \"ORDERS\" (\"ID\" INTEGER GENERATED BY DEFAULT AS IDENTITY \
//!      (START WITH 1 INCREMENT BY 1) NOT NULL PRIMARY KEY, \"TOTAL\" DECIMAL(10, 2))"
//! );
//! ```

pub mod alter;
pub mod create;
pub mod delete;
pub mod drop;
pub mod expression;
pub mod insert;
pub mod select;
pub mod sequence;
pub mod update;

pub use alter::{AlterBuilder, AlterSequenceBuilder, AlterTableBuilder};
pub use create::{
    CreateBuilder, CreateIndexBuilder, CreateSchemaBuilder, CreateSequenceBuilder,
    CreateSynonymBuilder, CreateTableBuilder, CreateViewBuilder, ForeignKey,
};
pub use delete::DeleteBuilder;
pub use drop::{DropBuilder, DropStatementBuilder};
pub use insert::InsertBuilder;
pub use select::SelectBuilder;
pub use sequence::{LastValueIdentityBuilder, NextValueSequenceBuilder};
pub use update::UpdateBuilder;

use crate::dialect::Dialect;
use crate::error::SqlScopeError;
use crate::models::DataType;
use crate::Result;

/// Returns the validated, quoted target name or the builder misuse error.
pub(crate) fn target(dialect: &Dialect, statement: &'static str, name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(SqlScopeError::invalid_state(statement, "no target name"));
    }
    dialect.identifier(name)
}

/// Validates and quotes every name in `names`, joined with `", "`.
pub(crate) fn identifier_list(dialect: &Dialect, names: &[String]) -> Result<String> {
    Ok(names
        .iter()
        .map(|name| dialect.identifier(name))
        .collect::<Result<Vec<_>>>()?
        .join(", "))
}

/// Encapsulates `conditions` and AND-s them together.
///
/// With more than one condition each is parenthesized, so an `OR` inside a
/// condition stays inside it.
pub(crate) fn conjunction(
    dialect: &Dialect,
    statement: &'static str,
    conditions: &[String],
) -> Result<String> {
    let conditions = conditions
        .iter()
        .map(|condition| expression::encapsulate(dialect, statement, condition))
        .collect::<Result<Vec<_>>>()?;
    Ok(match conditions.as_slice() {
        [single] => single.clone(),
        many => many
            .iter()
            .map(|condition| format!("({condition})"))
            .collect::<Vec<_>>()
            .join(" AND "),
    })
}

/// Column of a CREATE TABLE or ALTER TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    name: String,
    data_type: DataType,
    length: Option<u32>,
    precision: Option<(u32, u32)>,
    not_null: bool,
    primary_key: bool,
    unique: bool,
    identity: bool,
    default: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            length: None,
            precision: None,
            not_null: false,
            primary_key: false,
            unique: false,
            identity: false,
            default: None,
        }
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some((precision, scale));
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Marks the column as primary key; implies NOT NULL.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    /// Default value expression, encapsulated like any other expression.
    pub fn default_value(mut self, expression: impl Into<String>) -> Self {
        self.default = Some(expression.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Dialect type name with length or precision.
    pub(crate) fn type_text(&self, dialect: &Dialect) -> String {
        let base = dialect.type_name(self.data_type);
        match (self.precision, self.length) {
            (Some((precision, scale)), _) => format!("{base}({precision}, {scale})"),
            (None, Some(length)) => format!("{base}({length})"),
            (None, None) => base.to_string(),
        }
    }

    pub(crate) fn render(&self, dialect: &Dialect, statement: &'static str) -> Result<String> {
        let mut sql = format!("{} {}", dialect.identifier(&self.name)?, self.type_text(dialect));

        if self.identity && dialect.identity_after_primary_key() {
            if !self.primary_key {
                return Err(SqlScopeError::invalid_state(
                    statement,
                    format!(
                        "identity column '{}' must be the primary key on {}",
                        self.name,
                        dialect.kind()
                    ),
                ));
            }
            sql.push_str(" PRIMARY KEY ");
            sql.push_str(dialect.identity_clause());
            if self.not_null {
                sql.push_str(" NOT NULL");
            }
        } else {
            if self.identity {
                sql.push(' ');
                sql.push_str(dialect.identity_clause());
            }
            if self.not_null {
                sql.push_str(" NOT NULL");
            }
            if self.primary_key {
                sql.push_str(" PRIMARY KEY");
            }
        }

        if self.unique && !self.primary_key {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&expression::encapsulate(dialect, statement, default)?);
        }
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;

    #[test]
    fn test_column_rendering_per_dialect() {
        let column = ColumnDefinition::new("ID", DataType::Integer)
            .primary_key()
            .identity();

        let cases = [
            (DialectKind::Default, "ID INTEGER AUTO_INCREMENT NOT NULL PRIMARY KEY"),
            (
                DialectKind::Derby,
                "ID INTEGER GENERATED BY DEFAULT AS IDENTITY (START WITH 1, INCREMENT BY 1) NOT NULL PRIMARY KEY",
            ),
            (
                DialectKind::PostgreSQL,
                "ID INTEGER GENERATED BY DEFAULT AS IDENTITY NOT NULL PRIMARY KEY",
            ),
            (DialectKind::SQLite, "ID INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL"),
        ];
        for (kind, expected) in cases {
            let dialect = Dialect::for_kind(kind, false);
            assert_eq!(column.render(&dialect, "CREATE").unwrap(), expected, "{kind}");
        }
    }

    #[test]
    fn test_sqlite_identity_requires_primary_key() {
        let dialect = Dialect::for_kind(DialectKind::SQLite, false);
        let column = ColumnDefinition::new("ID", DataType::Integer).identity();
        assert!(matches!(
            column.render(&dialect, "CREATE"),
            Err(SqlScopeError::InvalidStatementState { .. })
        ));
    }

    #[test]
    fn test_type_text() {
        let dialect = Dialect::for_kind(DialectKind::PostgreSQL, false);
        assert_eq!(
            ColumnDefinition::new("N", DataType::Varchar).length(40).type_text(&dialect),
            "VARCHAR(40)"
        );
        assert_eq!(
            ColumnDefinition::new("D", DataType::Double).type_text(&dialect),
            "DOUBLE PRECISION"
        );
    }

    #[test]
    fn test_default_value_is_encapsulated() {
        let dialect = Dialect::default_dialect();
        let column = ColumnDefinition::new("STATUS", DataType::Varchar)
            .length(10)
            .default_value("'open'");
        assert_eq!(
            column.render(&dialect, "CREATE").unwrap(),
            "STATUS VARCHAR(10) DEFAULT 'open'"
        );

        let hostile = ColumnDefinition::new("X", DataType::Integer).default_value("1; DROP TABLE Y");
        assert!(hostile.render(&dialect, "CREATE").is_err());
    }

    #[test]
    fn test_target_rejects_empty_name() {
        let dialect = Dialect::default_dialect();
        assert!(matches!(
            target(&dialect, "DROP", "  "),
            Err(SqlScopeError::InvalidStatementState { statement: "DROP", .. })
        ));
        assert!(matches!(
            target(&dialect, "DROP", "bad name"),
            Err(SqlScopeError::InvalidArgument { .. })
        ));
    }
}
