//! Core data models shared by the builders, the resolver and the extractor.
//!
//! [`MetadataNode`] serializes directly into the canonical metadata document:
//! every node carries `name`, `kind`, `columns`, `parameters` and
//! `structures`, and absent collections serialize as empty arrays.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SqlScopeError;

/// Database engines with a bundled connection driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseType::PostgreSQL => write!(f, "PostgreSQL"),
            DatabaseType::SQLite => write!(f, "SQLite"),
        }
    }
}

/// Named database objects the resolver can look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Table,
    View,
    Synonym,
    Sequence,
    Procedure,
    Function,
}

impl ArtifactKind {
    /// All artifact kinds, in declaration order.
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::Table,
        ArtifactKind::View,
        ArtifactKind::Synonym,
        ArtifactKind::Sequence,
        ArtifactKind::Procedure,
        ArtifactKind::Function,
    ];

    /// Lowercase name used in documents and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Table => "table",
            ArtifactKind::View => "view",
            ArtifactKind::Synonym => "synonym",
            ArtifactKind::Sequence => "sequence",
            ArtifactKind::Procedure => "procedure",
            ArtifactKind::Function => "function",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = SqlScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtifactKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SqlScopeError::invalid_argument(format!("unknown artifact kind '{s}'")))
    }
}

/// Structures that live inside a schema and appear in metadata documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Table,
    View,
    Procedure,
    Function,
    Sequence,
}

impl StructureKind {
    /// Enumeration order used when walking a schema.
    pub const WALK_ORDER: [StructureKind; 5] = [
        StructureKind::Table,
        StructureKind::View,
        StructureKind::Procedure,
        StructureKind::Function,
        StructureKind::Sequence,
    ];

    /// Lowercase name used in documents.
    pub fn as_str(self) -> &'static str {
        match self {
            StructureKind::Table => "table",
            StructureKind::View => "view",
            StructureKind::Procedure => "procedure",
            StructureKind::Function => "function",
            StructureKind::Sequence => "sequence",
        }
    }

    /// Whether nodes of this kind carry columns.
    pub fn has_columns(self) -> bool {
        matches!(self, StructureKind::Table | StructureKind::View)
    }

    /// Whether nodes of this kind carry parameters.
    pub fn has_parameters(self) -> bool {
        matches!(self, StructureKind::Procedure | StructureKind::Function)
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructureKind {
    type Err = SqlScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StructureKind::WALK_ORDER
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                SqlScopeError::invalid_argument(format!(
                    "unknown structure kind '{s}' (expected table, view, procedure, function or sequence)"
                ))
            })
    }
}

impl From<StructureKind> for ArtifactKind {
    fn from(kind: StructureKind) -> Self {
        match kind {
            StructureKind::Table => ArtifactKind::Table,
            StructureKind::View => ArtifactKind::View,
            StructureKind::Procedure => ArtifactKind::Procedure,
            StructureKind::Function => ArtifactKind::Function,
            StructureKind::Sequence => ArtifactKind::Sequence,
        }
    }
}

/// Kind tag of a metadata document node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Datasource,
    Schema,
    Table,
    View,
    Procedure,
    Function,
    Sequence,
}

impl From<StructureKind> for NodeKind {
    fn from(kind: StructureKind) -> Self {
        match kind {
            StructureKind::Table => NodeKind::Table,
            StructureKind::View => NodeKind::View,
            StructureKind::Procedure => NodeKind::Procedure,
            StructureKind::Function => NodeKind::Function,
            StructureKind::Sequence => NodeKind::Sequence,
        }
    }
}

/// Column of a table or view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    pub key: bool,
    /// Catalog default expression; not part of the document
    #[serde(skip)]
    pub default: Option<String>,
}

/// Parameter direction of a procedure or function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterDirection {
    In,
    Out,
    InOut,
}

impl ParameterDirection {
    /// Parses catalog mode strings (`IN`, `OUT`, `INOUT`, `IN OUT`, `VARIADIC`).
    pub fn from_catalog(mode: Option<&str>) -> Self {
        let normalized: String = mode
            .unwrap_or("IN")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "OUT" => ParameterDirection::Out,
            "INOUT" => ParameterDirection::InOut,
            _ => ParameterDirection::In,
        }
    }
}

/// Parameter of a procedure or function, in declared order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub direction: ParameterDirection,
}

/// One node of the metadata tree.
///
/// Nodes are snapshots: they are built fresh for every request and never
/// mutated once handed to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataNode {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
    #[serde(default)]
    pub parameters: Vec<ParameterMetadata>,
    #[serde(default)]
    pub structures: Vec<MetadataNode>,
}

impl MetadataNode {
    /// Creates a node without children.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            columns: Vec::new(),
            parameters: Vec::new(),
            structures: Vec::new(),
        }
    }

    /// Converts the node into its canonical JSON document.
    pub fn to_document(&self) -> crate::Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|source| SqlScopeError::Serialization {
            context: format!("metadata document for '{}'", self.name),
            source,
        })
    }

    /// Finds a direct child structure by name.
    pub fn structure(&self, name: &str) -> Option<&MetadataNode> {
        self.structures.iter().find(|node| node.name == name)
    }
}

/// Column types understood by the CREATE and ALTER builders.
///
/// Each dialect maps these onto its own type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Varchar,
    Nvarchar,
    Char,
    Date,
    Time,
    Timestamp,
    Integer,
    Tinyint,
    Smallint,
    Bigint,
    Real,
    Double,
    Decimal,
    Boolean,
    Bit,
    Blob,
    Clob,
}

impl DataType {
    /// ANSI-ish type name used by the default dialect.
    pub fn standard_name(self) -> &'static str {
        match self {
            DataType::Varchar => "VARCHAR",
            DataType::Nvarchar => "NVARCHAR",
            DataType::Char => "CHAR",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Integer => "INTEGER",
            DataType::Tinyint => "TINYINT",
            DataType::Smallint => "SMALLINT",
            DataType::Bigint => "BIGINT",
            DataType::Real => "REAL",
            DataType::Double => "DOUBLE",
            DataType::Decimal => "DECIMAL",
            DataType::Boolean => "BOOLEAN",
            DataType::Bit => "BIT",
            DataType::Blob => "BLOB",
            DataType::Clob => "CLOB",
        }
    }
}
