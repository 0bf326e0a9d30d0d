//! ALTER branching builder.

use super::{ColumnDefinition, target};
use crate::dialect::Dialect;
use crate::error::SqlScopeError;
use crate::Result;

const STATEMENT: &str = "ALTER";

#[derive(Debug, Clone)]
pub struct AlterBuilder {
    dialect: Dialect,
}

impl AlterBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn table(self, name: impl Into<String>) -> AlterTableBuilder {
        AlterTableBuilder {
            dialect: self.dialect,
            name: name.into(),
            actions: Vec::new(),
        }
    }

    pub fn sequence(self, name: impl Into<String>) -> AlterSequenceBuilder {
        AlterSequenceBuilder {
            dialect: self.dialect,
            name: name.into(),
            restart: None,
            increment: None,
            min_value: None,
            max_value: None,
            cycle: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AlterAction {
    AddColumn(ColumnDefinition),
    DropColumn(String),
    AlterColumn(ColumnDefinition),
    Rename(String),
}

#[derive(Debug, Clone)]
pub struct AlterTableBuilder {
    dialect: Dialect,
    name: String,
    actions: Vec<AlterAction>,
}

impl AlterTableBuilder {
    pub fn add_column(mut self, column: ColumnDefinition) -> Self {
        self.actions.push(AlterAction::AddColumn(column));
        self
    }

    pub fn drop_column(mut self, column: impl Into<String>) -> Self {
        self.actions.push(AlterAction::DropColumn(column.into()));
        self
    }

    /// Changes the type (and, where the engine allows, constraints) of a column.
    pub fn alter_column(mut self, column: ColumnDefinition) -> Self {
        self.actions.push(AlterAction::AlterColumn(column));
        self
    }

    pub fn rename_to(mut self, new_name: impl Into<String>) -> Self {
        self.actions.push(AlterAction::Rename(new_name.into()));
        self
    }

    fn clause(&self, action: &AlterAction) -> Result<String> {
        let dialect = &self.dialect;
        match action {
            AlterAction::AddColumn(column) => {
                Ok(dialect.add_column_clause(&column.render(dialect, STATEMENT)?))
            }
            AlterAction::DropColumn(column) => {
                if column.trim().is_empty() {
                    return Err(SqlScopeError::invalid_state(STATEMENT, "drop column has no name"));
                }
                Ok(dialect.drop_column_clause(&dialect.identifier(column)?))
            }
            AlterAction::AlterColumn(column) => {
                let definition = column.render(dialect, STATEMENT)?;
                dialect
                    .alter_column_clause(
                        &dialect.identifier(column.name())?,
                        &column.type_text(dialect),
                        &definition,
                    )
                    .ok_or_else(|| {
                        SqlScopeError::invalid_state(
                            STATEMENT,
                            format!("{} cannot alter column types", dialect.kind()),
                        )
                    })
            }
            AlterAction::Rename(_) => Err(SqlScopeError::invalid_state(
                STATEMENT,
                "rename cannot be combined with other actions",
            )),
        }
    }

    fn statement(&self, table: &str, action: &AlterAction) -> Result<String> {
        match action {
            AlterAction::Rename(new_name) => {
                if new_name.trim().is_empty() {
                    return Err(SqlScopeError::invalid_state(STATEMENT, "rename has no new name"));
                }
                Ok(self
                    .dialect
                    .rename_table_statement(table, &self.dialect.identifier(new_name)?))
            }
            other => Ok(format!("ALTER TABLE {} {}", table, self.clause(other)?)),
        }
    }

    /// One statement per accumulated action, in order.
    pub fn generate_statements(&self) -> Result<Vec<String>> {
        let table = target(&self.dialect, STATEMENT, &self.name)?;
        if self.actions.is_empty() {
            return Err(SqlScopeError::invalid_state(STATEMENT, "no alterations requested"));
        }
        self.actions
            .iter()
            .map(|action| self.statement(&table, action))
            .collect()
    }

    /// A single statement carrying every action.
    ///
    /// Several actions share one statement only on engines that accept
    /// comma-separated alterations; elsewhere use [`Self::generate_statements`].
    pub fn generate(&self) -> Result<String> {
        let table = target(&self.dialect, STATEMENT, &self.name)?;
        match self.actions.as_slice() {
            [] => Err(SqlScopeError::invalid_state(STATEMENT, "no alterations requested")),
            [action] => self.statement(&table, action),
            actions => {
                if !self.dialect.supports_multi_action_alter() {
                    return Err(SqlScopeError::invalid_state(
                        STATEMENT,
                        format!(
                            "{} needs one statement per alteration; use generate_statements()",
                            self.dialect.kind()
                        ),
                    ));
                }
                let clauses = actions
                    .iter()
                    .map(|action| self.clause(action))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("ALTER TABLE {} {}", table, clauses.join(", ")))
            }
        }
    }
}

/// ALTER SEQUENCE; without options it renders the bare statement used as
/// an existence check.
#[derive(Debug, Clone)]
pub struct AlterSequenceBuilder {
    dialect: Dialect,
    name: String,
    restart: Option<i64>,
    increment: Option<i64>,
    min_value: Option<i64>,
    max_value: Option<i64>,
    cycle: Option<bool>,
}

impl AlterSequenceBuilder {
    pub fn restart_with(mut self, value: i64) -> Self {
        self.restart = Some(value);
        self
    }

    pub fn increment(mut self, increment: i64) -> Self {
        self.increment = Some(increment);
        self
    }

    pub fn min_value(mut self, value: i64) -> Self {
        self.min_value = Some(value);
        self
    }

    pub fn max_value(mut self, value: i64) -> Self {
        self.max_value = Some(value);
        self
    }

    pub fn cycle(mut self, cycle: bool) -> Self {
        self.cycle = Some(cycle);
        self
    }

    pub fn generate(&self) -> Result<String> {
        if !self.dialect.supports_sequences() {
            return Err(SqlScopeError::invalid_state(
                STATEMENT,
                format!("sequences are not supported by {}", self.dialect.kind()),
            ));
        }
        if self.increment == Some(0) {
            return Err(SqlScopeError::invalid_state(STATEMENT, "sequence increment must not be zero"));
        }

        let mut sql = format!("ALTER SEQUENCE {}", target(&self.dialect, STATEMENT, &self.name)?);
        if let Some(value) = self.restart {
            sql.push_str(&format!(" RESTART WITH {value}"));
        }
        if let Some(increment) = self.increment {
            sql.push_str(&format!(" INCREMENT BY {increment}"));
        }
        if let Some(min) = self.min_value {
            sql.push_str(&format!(" MINVALUE {min}"));
        }
        if let Some(max) = self.max_value {
            sql.push_str(&format!(" MAXVALUE {max}"));
        }
        match self.cycle {
            Some(true) => sql.push_str(" CYCLE"),
            Some(false) => sql.push_str(" NO CYCLE"),
            None => {}
        }
        Ok(sql)
    }
}
