//! UPDATE builder.

use super::{conjunction, expression, target};
use crate::dialect::Dialect;
use crate::error::SqlScopeError;
use crate::Result;

const STATEMENT: &str = "UPDATE";

#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    dialect: Dialect,
    table: Option<String>,
    assignments: Vec<(String, String)>,
    conditions: Vec<String>,
}

impl UpdateBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            table: None,
            assignments: Vec::new(),
            conditions: Vec::new(),
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn set(mut self, column: impl Into<String>, expression: impl Into<String>) -> Self {
        self.assignments.push((column.into(), expression.into()));
        self
    }

    pub fn where_clause(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn generate(&self) -> Result<String> {
        let dialect = &self.dialect;
        let table = target(dialect, STATEMENT, self.table.as_deref().unwrap_or_default())?;
        if self.assignments.is_empty() {
            return Err(SqlScopeError::invalid_state(STATEMENT, "no SET assignments"));
        }

        let assignments = self
            .assignments
            .iter()
            .map(|(column, value)| {
                Ok(format!(
                    "{} = {}",
                    dialect.identifier(column)?,
                    expression::encapsulate(dialect, STATEMENT, value)?
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut sql = format!("UPDATE {} SET {}", table, assignments.join(", "));
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

    #[test]
    fn test_update() {
        let dialect = Dialect::for_kind(DialectKind::PostgreSQL, true);
        let sql = dialect
            .update()
            .table("orders")
            .set("status", "'closed'")
            .set("total", "total * 2")
            .where_clause("id = ?")
            .generate()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE \"orders\" SET \"status\" = 'closed', \"total\" = \"total\" * 2 WHERE \"id\" = ?"
        );
    }

    #[test]
    fn test_or_condition_stays_grouped() {
        let sql = Dialect::default_dialect()
            .update()
            .table("ORDERS")
            .set("STATUS", "'closed'")
            .where_clause("STATUS = 'open' OR STATUS = 'new'")
            .where_clause("ID = 1")
            .generate()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE ORDERS SET STATUS = 'closed' WHERE (STATUS = 'open' OR STATUS = 'new') AND (ID = 1)"
        );
    }

    #[test]
    fn test_update_requires_assignments() {
        let dialect = Dialect::default_dialect();
        assert!(matches!(
            dialect.update().table("ORDERS").generate(),
            Err(SqlScopeError::InvalidStatementState { statement: "UPDATE", .. })
        ));
        assert!(dialect.update().set("A", "1").generate().is_err());
    }
}
