//! Dialect capability registry.
//!
//! A dialect is the set of syntax and catalog-access rules of one engine
//! family. Each family is one struct implementing [`SqlDialect`]; defaults
//! on the trait describe the standard-SQL behavior and variants override
//! only the fragments that differ. [`Dialect`] is the cheap, cloneable
//! handle collaborators hold and the factory for every statement builder.

pub mod default;
pub mod derby;
pub mod functions;
pub mod hana;
pub mod postgres;
pub mod quoting;
pub mod registry;
pub mod sqlite;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use crate::builders::{
    AlterBuilder, CreateBuilder, DeleteBuilder, DropBuilder, InsertBuilder, LastValueIdentityBuilder,
    NextValueSequenceBuilder, SelectBuilder, UpdateBuilder,
};
use crate::error::SqlScopeError;
use crate::models::{ArtifactKind, DataType, StructureKind};
use crate::Result;

pub use default::DefaultDialect;
pub use derby::DerbyDialect;
pub use functions::FunctionSet;
pub use hana::HanaDialect;
pub use postgres::PostgresDialect;
pub use registry::DialectRegistry;
pub use sqlite::SqliteDialect;

/// Engine families with a dialect implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    Default,
    Hana,
    Derby,
    #[serde(alias = "postgres")]
    PostgreSQL,
    SQLite,
}

impl DialectKind {
    pub const ALL: [DialectKind; 5] = [
        DialectKind::Default,
        DialectKind::Hana,
        DialectKind::Derby,
        DialectKind::PostgreSQL,
        DialectKind::SQLite,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DialectKind::Default => "default",
            DialectKind::Hana => "hana",
            DialectKind::Derby => "derby",
            DialectKind::PostgreSQL => "postgresql",
            DialectKind::SQLite => "sqlite",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = SqlScopeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "postgres" | "pg" => Ok(DialectKind::PostgreSQL),
            other => DialectKind::ALL
                .into_iter()
                .find(|kind| kind.as_str() == other)
                .ok_or_else(|| SqlScopeError::invalid_argument(format!("unknown dialect '{s}'"))),
        }
    }
}

/// How the resolver decides whether an artifact exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistenceStrategy {
    /// `SELECT 1 FROM <name> WHERE 1 = 0` succeeds
    RowSelect,
    /// Catalog lookup of a structure of the given kind by its stored name
    Catalog(StructureKind),
    /// `ALTER SEQUENCE <name>` without options succeeds (rolled back)
    AlterSequenceCheck,
    /// The engine has no such artifact kind; always absent
    Unsupported,
}

/// How an engine stores identifiers written without quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFolding {
    /// Folded to upper case, as standard SQL requires
    Upper,
    /// Folded to lower case
    Lower,
    /// Stored as written, matched without regard to case
    Insensitive,
}

impl CaseFolding {
    pub fn fold(self, part: &str) -> String {
        match self {
            CaseFolding::Upper => part.to_uppercase(),
            CaseFolding::Lower => part.to_lowercase(),
            CaseFolding::Insensitive => part.to_string(),
        }
    }
}

/// Row limiting syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStyle {
    /// `LIMIT m OFFSET n`
    LimitOffset,
    /// `OFFSET n ROWS FETCH FIRST m ROWS ONLY`
    OffsetFetch,
}

/// Objects the CREATE and DROP builders operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaObject {
    Table,
    View,
    Sequence,
    Synonym,
    Index,
    Schema,
}

impl SchemaObject {
    pub fn keyword(self) -> &'static str {
        match self {
            SchemaObject::Table => "TABLE",
            SchemaObject::View => "VIEW",
            SchemaObject::Sequence => "SEQUENCE",
            SchemaObject::Synonym => "SYNONYM",
            SchemaObject::Index => "INDEX",
            SchemaObject::Schema => "SCHEMA",
        }
    }
}

/// Capability set of one engine family.
///
/// Implementations are immutable after construction and shared read-only
/// between concurrent callers.
pub trait SqlDialect: fmt::Debug + Send + Sync {
    fn kind(&self) -> DialectKind;

    /// Whether identifiers are emitted quoted (and therefore case-preserved).
    fn is_case_sensitive(&self) -> bool;

    fn quote_char(&self) -> char {
        '"'
    }

    /// Applies the quoting policy to a possibly qualified identifier.
    fn quote(&self, identifier: &str) -> String {
        quoting::quote_identifier(identifier, self.quote_char(), self.is_case_sensitive())
    }

    /// Validates and quotes an identifier for emission.
    fn identifier(&self, identifier: &str) -> Result<String> {
        quoting::validate_identifier(identifier, self.quote_char(), self.is_case_sensitive())?;
        Ok(self.quote(identifier))
    }

    /// Built-in functions callable from builder expressions.
    fn functions(&self) -> &FunctionSet;

    /// Case folding the engine applies to unquoted identifiers.
    fn case_folding(&self) -> CaseFolding {
        CaseFolding::Upper
    }

    /// Catalog spelling of one identifier part after the builders emitted it.
    ///
    /// Quoted parts, and every part of a case-sensitive dialect, reach the
    /// engine quoted and are stored verbatim. Other parts are stored folded.
    fn catalog_identifier(&self, part: &str) -> String {
        let quote = self.quote_char();
        if self.is_case_sensitive() || quoting::is_quoted(part, quote) {
            quoting::unquote(part, quote)
        } else {
            self.case_folding().fold(part)
        }
    }

    /// Whether the catalog entry `stored` is what `requested` refers to.
    fn catalog_matches(&self, stored: &str, requested: &str) -> bool {
        let folded = self.catalog_identifier(requested);
        stored == requested
            || stored == folded
            || (self.case_folding() == CaseFolding::Insensitive && stored.eq_ignore_ascii_case(&folded))
    }

    fn is_known_function(&self, name: &str) -> bool {
        self.functions().contains(name)
    }

    /// Column clause that makes a column an identity column.
    fn identity_clause(&self) -> &'static str {
        "AUTO_INCREMENT"
    }

    /// Whether the identity clause must follow `PRIMARY KEY`.
    fn identity_after_primary_key(&self) -> bool {
        false
    }

    fn type_name(&self, data_type: DataType) -> &'static str {
        data_type.standard_name()
    }

    fn existence_strategy(&self, kind: ArtifactKind) -> ExistenceStrategy {
        match kind {
            ArtifactKind::Table | ArtifactKind::View | ArtifactKind::Synonym => {
                ExistenceStrategy::RowSelect
            }
            ArtifactKind::Sequence => ExistenceStrategy::Catalog(StructureKind::Sequence),
            ArtifactKind::Procedure => ExistenceStrategy::Catalog(StructureKind::Procedure),
            ArtifactKind::Function => ExistenceStrategy::Catalog(StructureKind::Function),
        }
    }

    /// Query returning the user-visible schemas, when the generic catalog
    /// call would also list system schemas.
    fn schema_filter_script(&self) -> Option<&'static str> {
        None
    }

    fn is_schema_filter_supported(&self) -> bool {
        self.schema_filter_script().is_some()
    }

    fn limit_style(&self) -> LimitStyle {
        LimitStyle::LimitOffset
    }

    fn supports_drop_if_exists(&self) -> bool {
        true
    }

    /// Mandatory trailing keyword of a DROP for `object`.
    fn drop_suffix(&self, _object: SchemaObject) -> Option<&'static str> {
        None
    }

    fn supports_drop_cascade(&self) -> bool {
        true
    }

    fn supports_for_update(&self) -> bool {
        true
    }

    fn supports_sequences(&self) -> bool {
        true
    }

    fn supports_synonyms(&self) -> bool {
        true
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    /// Statement fetching the next value of an already quoted sequence name.
    fn nextval_statement(&self, sequence: &str) -> Option<String> {
        Some(format!("SELECT NEXT VALUE FOR {sequence}"))
    }

    /// Statement fetching the last generated identity value.
    ///
    /// `args` are the raw (unquoted) names the engine needs to scope the
    /// lookup; their expected count differs per family.
    fn lastval_statement(&self, args: &[String]) -> Result<String> {
        expect_args(args, 0)?;
        Ok("SELECT IDENTITY()".to_string())
    }

    fn add_column_clause(&self, definition: &str) -> String {
        format!("ADD COLUMN {definition}")
    }

    fn drop_column_clause(&self, column: &str) -> String {
        format!("DROP COLUMN {column}")
    }

    /// Clause changing a column's type; `None` when the engine cannot.
    fn alter_column_clause(&self, column: &str, type_text: &str, _definition: &str) -> Option<String> {
        Some(format!("ALTER COLUMN {column} {type_text}"))
    }

    /// Whether several ALTER TABLE actions may share one statement.
    fn supports_multi_action_alter(&self) -> bool {
        false
    }

    fn rename_table_statement(&self, table: &str, new_name: &str) -> String {
        format!("ALTER TABLE {table} RENAME TO {new_name}")
    }
}

/// Checks the argument count of a LAST-VALUE-IDENTITY request.
pub(crate) fn expect_args(args: &[String], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(SqlScopeError::invalid_state(
            "LASTVAL",
            format!("expected {} argument(s), got {}", expected, args.len()),
        ))
    }
}

/// Shared handle to a bound dialect.
#[derive(Clone)]
pub struct Dialect(Arc<dyn SqlDialect>);

impl Dialect {
    pub fn new(dialect: impl SqlDialect + 'static) -> Self {
        Self(Arc::new(dialect))
    }

    /// Builds the dialect of `kind` with the given quoting policy.
    pub fn for_kind(kind: DialectKind, case_sensitive: bool) -> Self {
        match kind {
            DialectKind::Default => Self::new(DefaultDialect::new(case_sensitive)),
            DialectKind::Hana => Self::new(HanaDialect::new(case_sensitive)),
            DialectKind::Derby => Self::new(DerbyDialect::new(case_sensitive)),
            DialectKind::PostgreSQL => Self::new(PostgresDialect::new(case_sensitive)),
            DialectKind::SQLite => Self::new(SqliteDialect::new(case_sensitive)),
        }
    }

    pub fn default_dialect() -> Self {
        Self::for_kind(DialectKind::Default, false)
    }

    pub fn create(&self) -> CreateBuilder {
        CreateBuilder::new(self.clone())
    }

    pub fn alter(&self) -> AlterBuilder {
        AlterBuilder::new(self.clone())
    }

    pub fn drop(&self) -> DropBuilder {
        DropBuilder::new(self.clone())
    }

    pub fn select(&self) -> SelectBuilder {
        SelectBuilder::new(self.clone())
    }

    pub fn insert(&self) -> InsertBuilder {
        InsertBuilder::new(self.clone())
    }

    pub fn update(&self) -> UpdateBuilder {
        UpdateBuilder::new(self.clone())
    }

    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(self.clone())
    }

    pub fn nextval(&self, sequence: impl Into<String>) -> NextValueSequenceBuilder {
        NextValueSequenceBuilder::new(self.clone(), sequence)
    }

    pub fn lastval<I, S>(&self, args: I) -> LastValueIdentityBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LastValueIdentityBuilder::new(self.clone(), args)
    }
}

impl Deref for Dialect {
    type Target = dyn SqlDialect;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("kind", &self.kind())
            .field("case_sensitive", &self.is_case_sensitive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_kind_parsing() {
        assert_eq!("HANA".parse::<DialectKind>().unwrap(), DialectKind::Hana);
        assert_eq!("postgres".parse::<DialectKind>().unwrap(), DialectKind::PostgreSQL);
        assert_eq!("sqlite".parse::<DialectKind>().unwrap(), DialectKind::SQLite);
        assert!("oracle".parse::<DialectKind>().is_err());
    }

    #[test]
    fn test_dialect_kind_serde() {
        let kind: DialectKind = serde_json::from_str("\"postgres\"").unwrap();
        assert_eq!(kind, DialectKind::PostgreSQL);
        assert_eq!(serde_json::to_string(&DialectKind::Hana).unwrap(), "\"hana\"");
    }

    #[test]
    fn test_for_kind_round_trip() {
        for kind in DialectKind::ALL {
            let dialect = Dialect::for_kind(kind, true);
            assert_eq!(dialect.kind(), kind);
            assert!(dialect.is_case_sensitive());
        }
    }

    #[test]
    fn test_quote_policy() {
        let insensitive = Dialect::for_kind(DialectKind::Default, false);
        assert_eq!(insensitive.quote("orders"), "orders");

        let sensitive = Dialect::for_kind(DialectKind::Hana, true);
        assert_eq!(sensitive.quote("orders"), "\"orders\"");
        assert_eq!(sensitive.quote(&sensitive.quote("orders")), "\"orders\"");
    }

    #[test]
    fn test_identifier_validates() {
        let dialect = Dialect::default_dialect();
        assert!(dialect.identifier("x; DROP TABLE y").is_err());
        assert_eq!(dialect.identifier("APP.ORDERS").unwrap(), "APP.ORDERS");
    }

    #[test]
    fn test_every_family_has_a_whitelist() {
        for kind in DialectKind::ALL {
            let dialect = Dialect::for_kind(kind, false);
            assert!(dialect.is_known_function("count"), "{kind}");
            assert!(!dialect.is_known_function("orders"), "{kind}");
        }
    }

    #[test]
    fn test_catalog_identifier_folding() {
        let postgres = Dialect::for_kind(DialectKind::PostgreSQL, false);
        assert_eq!(postgres.catalog_identifier("ORDER_SEQ"), "order_seq");
        assert_eq!(postgres.catalog_identifier("\"ORDER_SEQ\""), "ORDER_SEQ");

        for kind in [DialectKind::Default, DialectKind::Hana, DialectKind::Derby] {
            let dialect = Dialect::for_kind(kind, false);
            assert_eq!(dialect.case_folding(), CaseFolding::Upper);
            assert_eq!(dialect.catalog_identifier("order_seq"), "ORDER_SEQ");
        }

        // Quoted on emission, so stored as written
        let sensitive = Dialect::for_kind(DialectKind::PostgreSQL, true);
        assert_eq!(sensitive.catalog_identifier("ORDER_SEQ"), "ORDER_SEQ");

        let sqlite = Dialect::for_kind(DialectKind::SQLite, false);
        assert_eq!(sqlite.catalog_identifier("Orders"), "Orders");
        assert!(sqlite.catalog_matches("ORDERS", "orders"));
        assert!(!postgres.catalog_matches("ORDERS", "orders"));
        assert!(postgres.catalog_matches("orders", "ORDERS"));
    }

    #[test]
    fn test_default_lastval_arity() {
        let dialect = Dialect::default_dialect();
        assert_eq!(dialect.lastval_statement(&[]).unwrap(), "SELECT IDENTITY()");
        assert!(matches!(
            dialect.lastval_statement(&["T".to_string()]),
            Err(SqlScopeError::InvalidStatementState { .. })
        ));
    }
}
