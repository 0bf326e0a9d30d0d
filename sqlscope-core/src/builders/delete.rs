//! DELETE builder.

use super::{conjunction, target};
use crate::dialect::Dialect;
use crate::Result;

const STATEMENT: &str = "DELETE";

#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    dialect: Dialect,
    table: Option<String>,
    conditions: Vec<String>,
}

impl DeleteBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            table: None,
            conditions: Vec::new(),
        }
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn where_clause(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn generate(&self) -> Result<String> {
        let dialect = &self.dialect;
        let table = target(dialect, STATEMENT, self.table.as_deref().unwrap_or_default())?;
        let mut sql = format!("DELETE FROM {table}");
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conjunction(dialect, STATEMENT, &self.conditions)?);
        }
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;
    use crate::error::SqlScopeError;

    #[test]
    fn test_delete() {
        let dialect = Dialect::for_kind(DialectKind::Hana, true);
        assert_eq!(
            dialect
                .delete()
                .from("ORDERS")
                .where_clause("ID = ?")
                .where_clause("STATUS <> 'open'")
                .generate()
                .unwrap(),
            "DELETE FROM \"ORDERS\" WHERE (\"ID\" = ?) AND (\"STATUS\" <> 'open')"
        );
        assert_eq!(
            Dialect::default_dialect().delete().from("ORDERS").generate().unwrap(),
            "DELETE FROM ORDERS"
        );
    }

    #[test]
    fn test_or_condition_stays_grouped() {
        let sql = Dialect::default_dialect()
            .delete()
            .from("ORDERS")
            .where_clause("STATUS = 'open' OR STATUS = 'new'")
            .where_clause("ID = 1")
            .generate()
            .unwrap();
        assert_eq!(
            sql,
            "DELETE FROM ORDERS WHERE (STATUS = 'open' OR STATUS = 'new') AND (ID = 1)"
        );
    }

    #[test]
    fn test_delete_without_table() {
        assert!(matches!(
            Dialect::default_dialect().delete().generate(),
            Err(SqlScopeError::InvalidStatementState { statement: "DELETE", .. })
        ));
    }
}
