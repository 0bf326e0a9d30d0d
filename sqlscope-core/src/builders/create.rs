//! CREATE branching builder.

use super::{ColumnDefinition, expression, identifier_list, target};
use crate::dialect::Dialect;
use crate::error::SqlScopeError;
use crate::Result;

const STATEMENT: &str = "CREATE";

/// Entry point branching on the kind of object to create.
#[derive(Debug, Clone)]
pub struct CreateBuilder {
    dialect: Dialect,
}

impl CreateBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn table(self, name: impl Into<String>) -> CreateTableBuilder {
        CreateTableBuilder {
            dialect: self.dialect,
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            uniques: Vec::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
        }
    }

    pub fn view(self, name: impl Into<String>) -> CreateViewBuilder {
        CreateViewBuilder {
            dialect: self.dialect,
            name: name.into(),
            columns: Vec::new(),
            query: None,
        }
    }

    pub fn sequence(self, name: impl Into<String>) -> CreateSequenceBuilder {
        CreateSequenceBuilder {
            dialect: self.dialect,
            name: name.into(),
            start: None,
            increment: None,
            min_value: None,
            max_value: None,
            cycle: false,
        }
    }

    pub fn synonym(self, name: impl Into<String>) -> CreateSynonymBuilder {
        CreateSynonymBuilder {
            dialect: self.dialect,
            name: name.into(),
            source: None,
        }
    }

    pub fn index(self, name: impl Into<String>) -> CreateIndexBuilder {
        CreateIndexBuilder {
            dialect: self.dialect,
            name: name.into(),
            table: None,
            columns: Vec::new(),
            unique: false,
        }
    }

    pub fn schema(self, name: impl Into<String>) -> CreateSchemaBuilder {
        CreateSchemaBuilder {
            dialect: self.dialect,
            name: name.into(),
        }
    }
}

/// Table-level foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

impl ForeignKey {
    pub fn new<I, S>(columns: I, referenced_table: impl Into<String>, referenced_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            referenced_table: referenced_table.into(),
            referenced_columns: referenced_columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

fn constraint_prefix(dialect: &Dialect, name: Option<&String>) -> Result<String> {
    match name {
        Some(name) => Ok(format!("CONSTRAINT {} ", dialect.identifier(name)?)),
        None => Ok(String::new()),
    }
}

#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
    dialect: Dialect,
    name: String,
    columns: Vec<ColumnDefinition>,
    primary_key: Vec<String>,
    uniques: Vec<(Option<String>, Vec<String>)>,
    foreign_keys: Vec<ForeignKey>,
    checks: Vec<(Option<String>, String)>,
}

impl CreateTableBuilder {
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Table-level primary key over several columns.
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn unique<I, S>(mut self, name: Option<&str>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uniques.push((
            name.map(str::to_string),
            columns.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn check(mut self, name: Option<&str>, condition: impl Into<String>) -> Self {
        self.checks.push((name.map(str::to_string), condition.into()));
        self
    }

    pub fn generate(&self) -> Result<String> {
        let dialect = &self.dialect;
        let name = target(dialect, STATEMENT, &self.name)?;
        if self.columns.is_empty() {
            return Err(SqlScopeError::invalid_state(
                STATEMENT,
                format!("table '{}' has no columns", self.name),
            ));
        }
        if !self.primary_key.is_empty() && self.columns.iter().any(ColumnDefinition::is_primary_key) {
            return Err(SqlScopeError::invalid_state(
                STATEMENT,
                "primary key declared on both a column and the table",
            ));
        }

        let mut parts = self
            .columns
            .iter()
            .map(|column| column.render(dialect, STATEMENT))
            .collect::<Result<Vec<_>>>()?;

        if !self.primary_key.is_empty() {
            parts.push(format!(
                "PRIMARY KEY ({})",
                identifier_list(dialect, &self.primary_key)?
            ));
        }
        for (constraint, columns) in &self.uniques {
            parts.push(format!(
                "{}UNIQUE ({})",
                constraint_prefix(dialect, constraint.as_ref())?,
                identifier_list(dialect, columns)?
            ));
        }
        for foreign_key in &self.foreign_keys {
            if foreign_key.columns.len() != foreign_key.referenced_columns.len()
                || foreign_key.columns.is_empty()
            {
                return Err(SqlScopeError::invalid_state(
                    STATEMENT,
                    "foreign key column lists must be non-empty and of equal length",
                ));
            }
            parts.push(format!(
                "{}FOREIGN KEY ({}) REFERENCES {} ({})",
                constraint_prefix(dialect, foreign_key.name.as_ref())?,
                identifier_list(dialect, &foreign_key.columns)?,
                dialect.identifier(&foreign_key.referenced_table)?,
                identifier_list(dialect, &foreign_key.referenced_columns)?
            ));
        }
        for (constraint, condition) in &self.checks {
            parts.push(format!(
                "{}CHECK ({})",
                constraint_prefix(dialect, constraint.as_ref())?,
                expression::encapsulate(dialect, STATEMENT, condition)?
            ));
        }

        Ok(format!("CREATE TABLE {} ({})", name, parts.join(", ")))
    }
}

#[derive(Debug, Clone)]
pub struct CreateViewBuilder {
    dialect: Dialect,
    name: String,
    columns: Vec<String>,
    query: Option<String>,
}

impl CreateViewBuilder {
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Defining query, typically the output of a [`super::SelectBuilder`].
    pub fn as_select(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn generate(&self) -> Result<String> {
        let dialect = &self.dialect;
        let name = target(dialect, STATEMENT, &self.name)?;
        let query = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .ok_or_else(|| SqlScopeError::invalid_state(STATEMENT, "view has no defining query"))?;
        if query.contains(';') {
            return Err(SqlScopeError::invalid_state(
                STATEMENT,
                "view query must be a single statement",
            ));
        }

        let columns = if self.columns.is_empty() {
            String::new()
        } else {
            format!(" ({})", identifier_list(dialect, &self.columns)?)
        };
        Ok(format!("CREATE VIEW {name}{columns} AS {query}"))
    }
}

#[derive(Debug, Clone)]
pub struct CreateSequenceBuilder {
    dialect: Dialect,
    name: String,
    start: Option<i64>,
    increment: Option<i64>,
    min_value: Option<i64>,
    max_value: Option<i64>,
    cycle: bool,
}

impl CreateSequenceBuilder {
    pub fn start(mut self, start: i64) -> Self {
        self.start = Some(start);
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

    pub fn cycle(mut self) -> Self {
        self.cycle = true;
        self
    }

    pub fn generate(&self) -> Result<String> {
        let dialect = &self.dialect;
        if !dialect.supports_sequences() {
            return Err(SqlScopeError::invalid_state(
                STATEMENT,
                format!("sequences are not supported by {}", dialect.kind()),
            ));
        }
        let mut sql = format!("CREATE SEQUENCE {}", target(dialect, STATEMENT, &self.name)?);
        if self.increment == Some(0) {
            return Err(SqlScopeError::invalid_state(STATEMENT, "sequence increment must not be zero"));
        }
        if let (Some(min), Some(max)) = (self.min_value, self.max_value)
            && min > max
        {
            return Err(SqlScopeError::invalid_state(
                STATEMENT,
                format!("sequence MINVALUE {min} exceeds MAXVALUE {max}"),
            ));
        }
        if let Some(start) = self.start {
            sql.push_str(&format!(" START WITH {start}"));
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
        if self.cycle {
            sql.push_str(" CYCLE");
        }
        Ok(sql)
    }
}

#[derive(Debug, Clone)]
pub struct CreateSynonymBuilder {
    dialect: Dialect,
    name: String,
    source: Option<String>,
}

impl CreateSynonymBuilder {
    /// Object the synonym stands for.
    pub fn for_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn generate(&self) -> Result<String> {
        let dialect = &self.dialect;
        if !dialect.supports_synonyms() {
            return Err(SqlScopeError::invalid_state(
                STATEMENT,
                format!("synonyms are not supported by {}", dialect.kind()),
            ));
        }
        let name = target(dialect, STATEMENT, &self.name)?;
        let source = self
            .source
            .as_deref()
            .filter(|source| !source.trim().is_empty())
            .ok_or_else(|| SqlScopeError::invalid_state(STATEMENT, "synonym has no source object"))?;
        Ok(format!("CREATE SYNONYM {} FOR {}", name, dialect.identifier(source)?))
    }
}

#[derive(Debug, Clone)]
pub struct CreateIndexBuilder {
    dialect: Dialect,
    name: String,
    table: Option<String>,
    columns: Vec<String>,
    unique: bool,
}

impl CreateIndexBuilder {
    pub fn on(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn generate(&self) -> Result<String> {
        let dialect = &self.dialect;
        let name = target(dialect, STATEMENT, &self.name)?;
        let table = self
            .table
            .as_deref()
            .filter(|table| !table.trim().is_empty())
            .ok_or_else(|| SqlScopeError::invalid_state(STATEMENT, "index has no table"))?;
        if self.columns.is_empty() {
            return Err(SqlScopeError::invalid_state(STATEMENT, "index has no columns"));
        }
        Ok(format!(
            "CREATE {}INDEX {} ON {} ({})",
            if self.unique { "UNIQUE " } else { "" },
            name,
            dialect.identifier(table)?,
            identifier_list(dialect, &self.columns)?
        ))
    }
}

#[derive(Debug, Clone)]
pub struct CreateSchemaBuilder {
    dialect: Dialect,
    name: String,
}

impl CreateSchemaBuilder {
    pub fn generate(&self) -> Result<String> {
        let dialect = &self.dialect;
        if !dialect.supports_schemas() {
            return Err(SqlScopeError::invalid_state(
                STATEMENT,
                format!("schemas are not supported by {}", dialect.kind()),
            ));
        }
        Ok(format!("CREATE SCHEMA {}", target(dialect, STATEMENT, &self.name)?))
    }
}
