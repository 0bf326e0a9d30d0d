//! Standard-SQL dialect used when no engine family is configured.

use super::{DialectKind, FunctionSet, SqlDialect, functions};

#[derive(Debug, Clone)]
pub struct DefaultDialect {
    case_sensitive: bool,
    functions: FunctionSet,
}

impl DefaultDialect {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            functions: FunctionSet::with_common(functions::DEFAULT),
        }
    }
}

impl SqlDialect for DefaultDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Default
    }

    fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn functions(&self) -> &FunctionSet {
        &self.functions
    }
}
