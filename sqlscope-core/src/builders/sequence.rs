//! NEXT-VALUE and LAST-VALUE-IDENTITY builders.

use super::target;
use crate::dialect::Dialect;
use crate::error::SqlScopeError;
use crate::Result;

/// Fetches the next value of a sequence.
#[derive(Debug, Clone)]
pub struct NextValueSequenceBuilder {
    dialect: Dialect,
    sequence: String,
}

impl NextValueSequenceBuilder {
    pub fn new(dialect: Dialect, sequence: impl Into<String>) -> Self {
        Self {
            dialect,
            sequence: sequence.into(),
        }
    }

    pub fn generate(&self) -> Result<String> {
        let sequence = target(&self.dialect, "NEXTVAL", &self.sequence)?;
        self.dialect.nextval_statement(&sequence).ok_or_else(|| {
            SqlScopeError::invalid_state(
                "NEXTVAL",
                format!("sequences are not supported by {}", self.dialect.kind()),
            )
        })
    }
}

/// Fetches the last identity value generated in the session.
#[derive(Debug, Clone)]
pub struct LastValueIdentityBuilder {
    dialect: Dialect,
    args: Vec<String>,
}

impl LastValueIdentityBuilder {
    pub fn new<I, S>(dialect: Dialect, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dialect,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn generate(&self) -> Result<String> {
        if self.args.iter().any(|arg| arg.trim().is_empty()) {
            return Err(SqlScopeError::invalid_state("LASTVAL", "empty argument"));
        }
        self.dialect.lastval_statement(&self.args)
    }
}
