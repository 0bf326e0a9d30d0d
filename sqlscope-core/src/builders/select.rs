//! SELECT builder.

use super::{conjunction, expression, target};
use crate::dialect::{Dialect, LimitStyle};
use crate::error::SqlScopeError;
use crate::Result;

const STATEMENT: &str = "SELECT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone)]
struct Join {
    kind: JoinKind,
    table: String,
    alias: Option<String>,
    on: String,
}

#[derive(Debug, Clone)]
pub struct SelectBuilder {
    dialect: Dialect,
    distinct: bool,
    columns: Vec<String>,
    from: Option<(String, Option<String>)>,
    joins: Vec<Join>,
    conditions: Vec<String>,
    group_by: Vec<String>,
    having: Vec<String>,
    order_by: Vec<(String, bool)>,
    limit: Option<u64>,
    offset: Option<u64>,
    for_update: bool,
}

impl SelectBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            distinct: false,
            columns: Vec::new(),
            from: None,
            joins: Vec::new(),
            conditions: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            for_update: false,
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a column expression; no columns selects `*`.
    pub fn column(mut self, expression: impl Into<String>) -> Self {
        self.columns.push(expression.into());
        self
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from = Some((table.into(), None));
        self
    }

    pub fn from_alias(mut self, table: impl Into<String>, alias: impl Into<String>) -> Self {
        self.from = Some((table.into(), Some(alias.into())));
        self
    }

    pub fn join(mut self, table: impl Into<String>, alias: Option<&str>, on: impl Into<String>) -> Self {
        self.joins.push(Join {
            kind: JoinKind::Inner,
            table: table.into(),
            alias: alias.map(str::to_string),
            on: on.into(),
        });
        self
    }

    pub fn left_join(mut self, table: impl Into<String>, alias: Option<&str>, on: impl Into<String>) -> Self {
        self.joins.push(Join {
            kind: JoinKind::Left,
            table: table.into(),
            alias: alias.map(str::to_string),
            on: on.into(),
        });
        self
    }

    /// Adds a condition; several conditions are AND-ed.
    pub fn where_clause(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn group_by(mut self, expression: impl Into<String>) -> Self {
        self.group_by.push(expression.into());
        self
    }

    pub fn having(mut self, condition: impl Into<String>) -> Self {
        self.having.push(condition.into());
        self
    }

    pub fn order_by(mut self, expression: impl Into<String>) -> Self {
        self.order_by.push((expression.into(), true));
        self
    }

    pub fn order_by_desc(mut self, expression: impl Into<String>) -> Self {
        self.order_by.push((expression.into(), false));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }

    fn expressions(&self, items: &[String], separator: &str) -> Result<String> {
        Ok(items
            .iter()
            .map(|item| self.encapsulate(item))
            .collect::<Result<Vec<_>>>()?
            .join(separator))
    }

    fn encapsulate(&self, item: &str) -> Result<String> {
        if item.trim() == "*" {
            return Ok("*".to_string());
        }
        expression::encapsulate(&self.dialect, STATEMENT, item)
    }

    fn aliased(&self, table: &str, alias: Option<&String>) -> Result<String> {
        let table = target(&self.dialect, STATEMENT, table)?;
        match alias {
            Some(alias) => Ok(format!("{} {}", table, self.dialect.identifier(alias)?)),
            None => Ok(table),
        }
    }

    pub fn generate(&self) -> Result<String> {
        let dialect = &self.dialect;
        let (table, alias) = self
            .from
            .as_ref()
            .ok_or_else(|| SqlScopeError::invalid_state(STATEMENT, "no FROM table"))?;
        if !self.having.is_empty() && self.group_by.is_empty() {
            return Err(SqlScopeError::invalid_state(STATEMENT, "HAVING without GROUP BY"));
        }
        if self.for_update && !dialect.supports_for_update() {
            return Err(SqlScopeError::invalid_state(
                STATEMENT,
                format!("FOR UPDATE is not supported by {}", dialect.kind()),
            ));
        }

        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.expressions(&self.columns, ", ")?);
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.aliased(table, alias.as_ref())?);

        for join in &self.joins {
            sql.push_str(match join.kind {
                JoinKind::Inner => " INNER JOIN ",
                JoinKind::Left => " LEFT JOIN ",
            });
            sql.push_str(&self.aliased(&join.table, join.alias.as_ref())?);
            sql.push_str(" ON ");
            sql.push_str(&self.encapsulate(&join.on)?);
        }
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conjunction(dialect, STATEMENT, &self.conditions)?);
        }
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.expressions(&self.group_by, ", ")?);
        }
        if !self.having.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&conjunction(dialect, STATEMENT, &self.having)?);
        }
        if !self.order_by.is_empty() {
            let order = self
                .order_by
                .iter()
                .map(|(item, ascending)| {
                    Ok(format!(
                        "{} {}",
                        self.encapsulate(item)?,
                        if *ascending { "ASC" } else { "DESC" }
                    ))
                })
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }
        match dialect.limit_style() {
            LimitStyle::LimitOffset => {
                if let Some(limit) = self.limit {
                    sql.push_str(&format!(" LIMIT {limit}"));
                }
                if let Some(offset) = self.offset {
                    sql.push_str(&format!(" OFFSET {offset}"));
                }
            }
            LimitStyle::OffsetFetch => {
                if let Some(offset) = self.offset {
                    sql.push_str(&format!(" OFFSET {offset} ROWS"));
                }
                if let Some(limit) = self.limit {
                    sql.push_str(&format!(" FETCH FIRST {limit} ROWS ONLY"));
                }
            }
        }
        if self.for_update {
            sql.push_str(" FOR UPDATE");
        }
        Ok(sql)
    }
}
