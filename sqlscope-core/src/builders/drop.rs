//! DROP branching builder.

use super::target;
use crate::dialect::{Dialect, SchemaObject};
use crate::error::SqlScopeError;
use crate::Result;

const STATEMENT: &str = "DROP";

#[derive(Debug, Clone)]
pub struct DropBuilder {
    dialect: Dialect,
}

impl DropBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    fn object(self, object: SchemaObject, name: impl Into<String>) -> DropStatementBuilder {
        DropStatementBuilder {
            dialect: self.dialect,
            object,
            name: name.into(),
            if_exists: false,
            cascade: false,
        }
    }

    pub fn table(self, name: impl Into<String>) -> DropStatementBuilder {
        self.object(SchemaObject::Table, name)
    }

    pub fn view(self, name: impl Into<String>) -> DropStatementBuilder {
        self.object(SchemaObject::View, name)
    }

    pub fn sequence(self, name: impl Into<String>) -> DropStatementBuilder {
        self.object(SchemaObject::Sequence, name)
    }

    pub fn synonym(self, name: impl Into<String>) -> DropStatementBuilder {
        self.object(SchemaObject::Synonym, name)
    }

    pub fn index(self, name: impl Into<String>) -> DropStatementBuilder {
        self.object(SchemaObject::Index, name)
    }

    pub fn schema(self, name: impl Into<String>) -> DropStatementBuilder {
        self.object(SchemaObject::Schema, name)
    }
}

#[derive(Debug, Clone)]
pub struct DropStatementBuilder {
    dialect: Dialect,
    object: SchemaObject,
    name: String,
    if_exists: bool,
    cascade: bool,
}

impl DropStatementBuilder {
    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    pub fn cascade(mut self) -> Self {
        self.cascade = true;
        self
    }

    fn unsupported(&self, what: &str) -> SqlScopeError {
        SqlScopeError::invalid_state(
            STATEMENT,
            format!("{} is not supported by {}", what, self.dialect.kind()),
        )
    }

    pub fn generate(&self) -> Result<String> {
        let dialect = &self.dialect;
        let name = target(dialect, STATEMENT, &self.name)?;

        let object_supported = match self.object {
            SchemaObject::Sequence => dialect.supports_sequences(),
            SchemaObject::Synonym => dialect.supports_synonyms(),
            SchemaObject::Schema => dialect.supports_schemas(),
            SchemaObject::Table | SchemaObject::View | SchemaObject::Index => true,
        };
        if !object_supported {
            return Err(self.unsupported(&format!("DROP {}", self.object.keyword())));
        }
        if self.if_exists && !dialect.supports_drop_if_exists() {
            return Err(self.unsupported("DROP ... IF EXISTS"));
        }
        if self.cascade && !dialect.supports_drop_cascade() {
            return Err(self.unsupported("DROP ... CASCADE"));
        }

        let mut sql = format!("DROP {} ", self.object.keyword());
        if self.if_exists {
            sql.push_str("IF EXISTS ");
        }
        sql.push_str(&name);
        if self.cascade {
            sql.push_str(" CASCADE");
        } else if let Some(suffix) = dialect.drop_suffix(self.object) {
            sql.push(' ');
            sql.push_str(suffix);
        }
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;

    #[test]
    fn test_drop_without_name_fails_at_generate() {
        let dialect = Dialect::default_dialect();
        let builder = dialect.drop().table("");
        assert!(matches!(
            builder.generate(),
            Err(SqlScopeError::InvalidStatementState { statement: "DROP", .. })
        ));
    }

    #[test]
    fn test_drop_variants() {
        let postgres = Dialect::for_kind(DialectKind::PostgreSQL, true);
        assert_eq!(
            postgres.drop().table("orders").if_exists().cascade().generate().unwrap(),
            "DROP TABLE IF EXISTS \"orders\" CASCADE"
        );
        let derby = Dialect::for_kind(DialectKind::Derby, false);
        assert_eq!(
            derby.drop().sequence("ORDER_SEQ").generate().unwrap(),
            "DROP SEQUENCE ORDER_SEQ RESTRICT"
        );
        assert_eq!(derby.drop().schema("APP").generate().unwrap(), "DROP SCHEMA APP RESTRICT");
        assert_eq!(derby.drop().view("V").generate().unwrap(), "DROP VIEW V");
    }

    #[test]
    fn test_unsupported_drops() {
        let hana = Dialect::for_kind(DialectKind::Hana, false);
        assert!(hana.drop().table("T").if_exists().generate().is_err());
        assert_eq!(hana.drop().synonym("S").generate().unwrap(), "DROP SYNONYM S");

        let sqlite = Dialect::for_kind(DialectKind::SQLite, false);
        assert!(sqlite.drop().sequence("S").generate().is_err());
        assert!(sqlite.drop().table("T").cascade().generate().is_err());
        assert_eq!(
            sqlite.drop().index("IX").if_exists().generate().unwrap(),
            "DROP INDEX IF EXISTS IX"
        );
    }
}
