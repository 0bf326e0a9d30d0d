//! INSERT builder.

use super::{expression, identifier_list, target};
use crate::dialect::Dialect;
use crate::error::SqlScopeError;
use crate::Result;

const STATEMENT: &str = "INSERT";

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    dialect: Dialect,
    table: Option<String>,
    columns: Vec<String>,
    values: Vec<String>,
    select: Option<String>,
}

impl InsertBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            table: None,
            columns: Vec::new(),
            values: Vec::new(),
            select: None,
        }
    }

    pub fn into(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Value expression for the column at the same position.
    ///
    /// Without any values every column gets a `?` placeholder.
    pub fn value(mut self, expression: impl Into<String>) -> Self {
        self.values.push(expression.into());
        self
    }

    /// Source query for `INSERT ... SELECT`.
    pub fn select(mut self, query: impl Into<String>) -> Self {
        self.select = Some(query.into());
        self
    }

    pub fn generate(&self) -> Result<String> {
        let dialect = &self.dialect;
        let table = target(dialect, STATEMENT, self.table.as_deref().unwrap_or_default())?;
        let columns = if self.columns.is_empty() {
            String::new()
        } else {
            format!(" ({})", identifier_list(dialect, &self.columns)?)
        };

        if let Some(query) = &self.select {
            if !self.values.is_empty() {
                return Err(SqlScopeError::invalid_state(
                    STATEMENT,
                    "values and a source query are mutually exclusive",
                ));
            }
            let query = query.trim();
            if query.is_empty() || query.contains(';') {
                return Err(SqlScopeError::invalid_state(
                    STATEMENT,
                    "source query must be a single non-empty statement",
                ));
            }
            return Ok(format!("INSERT INTO {table}{columns} {query}"));
        }

        let values = match (self.columns.len(), self.values.len()) {
            (0, 0) => {
                return Err(SqlScopeError::invalid_state(STATEMENT, "no columns or values"));
            }
            (count, 0) => vec!["?"; count].join(", "),
            (columns, values) if columns != 0 && columns != values => {
                return Err(SqlScopeError::invalid_state(
                    STATEMENT,
                    format!("{columns} columns but {values} values"),
                ));
            }
            _ => self
                .values
                .iter()
                .map(|value| expression::encapsulate(dialect, STATEMENT, value))
                .collect::<Result<Vec<_>>>()?
                .join(", "),
        };
        Ok(format!("INSERT INTO {table}{columns} VALUES ({values})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;

    #[test]
    fn test_insert_placeholders() {
        let dialect = Dialect::for_kind(DialectKind::Hana, true);
        let sql = dialect
            .insert()
            .into("ORDERS")
            .column("ID")
            .column("TOTAL")
            .generate()
            .unwrap();
        assert_eq!(sql, "INSERT INTO \"ORDERS\" (\"ID\", \"TOTAL\") VALUES (?, ?)");
    }

    #[test]
    fn test_insert_values() {
        let dialect = Dialect::default_dialect();
        let sql = dialect
            .insert()
            .into("ORDERS")
            .column("ID")
            .column("STATUS")
            .value("1")
            .value("'open'")
            .generate()
            .unwrap();
        assert_eq!(sql, "INSERT INTO ORDERS (ID, STATUS) VALUES (1, 'open')");
    }

    #[test]
    fn test_insert_select() {
        let dialect = Dialect::default_dialect();
        let query = dialect.select().column("ID").from("OLD_ORDERS").generate().unwrap();
        let sql = dialect
            .insert()
            .into("ORDERS")
            .column("ID")
            .select(query)
            .generate()
            .unwrap();
        assert_eq!(sql, "INSERT INTO ORDERS (ID) SELECT ID FROM OLD_ORDERS");
    }

    #[test]
    fn test_insert_errors() {
        let dialect = Dialect::default_dialect();
        assert!(dialect.insert().column("ID").generate().is_err());
        assert!(dialect.insert().into("T").generate().is_err());
        assert!(dialect
            .insert()
            .into("T")
            .column("A")
            .column("B")
            .value("1")
            .generate()
            .is_err());
    }
}
