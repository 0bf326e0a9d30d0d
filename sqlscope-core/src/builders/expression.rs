//! Expression encapsulation.
//!
//! Column lists, conditions and default values are supplied as free text.
//! Before they are spliced into a statement they are tokenized: bare words
//! become identifiers quoted by the dialect, literals and numbers are kept
//! verbatim, and any word used as a call must be a recognized function.
//!
//! This is a lightweight guard against statement injection, not a SQL
//! parser. `SELECT`, `FROM` and `WHERE` are accepted as keywords so that
//! `IN (SELECT ..)` and `EXISTS (SELECT ..)` conditions work, which means an
//! accepted expression can still read any table the connection can see.
//! Expressions must come from trusted code, never from end users.

use crate::dialect::Dialect;
use crate::error::SqlScopeError;
use crate::Result;

/// Words kept verbatim wherever they appear.
const SQL_KEYWORDS: &[&str] = &[
    "all", "and", "any", "as", "asc", "between", "by", "case", "current_date", "current_schema",
    "current_time", "current_timestamp", "current_user", "desc", "distinct", "else", "end",
    "escape", "exists", "false", "first", "from", "in", "is", "last", "like", "localtime",
    "localtimestamp", "not", "null", "nulls", "on", "or", "over", "partition", "select",
    "session_user", "some", "then", "true", "unknown", "when", "where",
    // type names appearing inside CAST
    "bigint", "boolean", "char", "date", "decimal", "double", "float", "int", "integer",
    "numeric", "precision", "real", "smallint", "text", "time", "timestamp", "varchar",
];

fn is_keyword(word: &str) -> bool {
    let lowered = word.to_ascii_lowercase();
    SQL_KEYWORDS.contains(&lowered.as_str())
}

fn is_word_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$' | '#')
}

/// Rewrites `expression` for `dialect`.
///
/// # Errors
///
/// `InvalidStatementState` (attributed to `statement`) for statement
/// separators, comments, unterminated literals and calls to functions the
/// dialect does not recognize.
pub fn encapsulate(dialect: &Dialect, statement: &'static str, expression: &str) -> Result<String> {
    let quote = dialect.quote_char();
    let chars: Vec<char> = expression.chars().collect();
    let mut out = String::with_capacity(expression.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            ';' => {
                return Err(SqlScopeError::invalid_state(
                    statement,
                    "statement separators are not allowed in expressions",
                ));
            }
            '-' if chars.get(i + 1) == Some(&'-') => {
                return Err(SqlScopeError::invalid_state(
                    statement,
                    "comments are not allowed in expressions",
                ));
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                return Err(SqlScopeError::invalid_state(
                    statement,
                    "comments are not allowed in expressions",
                ));
            }
            '\'' => {
                let end = closing(&chars, i, '\'').ok_or_else(|| {
                    SqlScopeError::invalid_state(statement, "unterminated string literal")
                })?;
                out.extend(&chars[i..=end]);
                i = end + 1;
            }
            c if c == quote => {
                let end = closing(&chars, i, quote).ok_or_else(|| {
                    SqlScopeError::invalid_state(statement, "unterminated quoted identifier")
                })?;
                out.extend(&chars[i..=end]);
                i = end + 1;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_digit()
                        || chars[i] == '.'
                        || matches!(chars[i], 'e' | 'E'))
                {
                    i += 1;
                }
                out.extend(&chars[start..i]);
            }
            c if is_word_start(c) => {
                let start = i;
                while i < chars.len() && is_word_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let mut next = i;
                while next < chars.len() && chars[next].is_whitespace() {
                    next += 1;
                }
                let is_call = chars.get(next) == Some(&'(');

                if is_call {
                    if !dialect.is_known_function(&word) && !is_keyword(&word) {
                        return Err(SqlScopeError::invalid_state(
                            statement,
                            format!("'{}' is not a recognized {} function", word, dialect.kind()),
                        ));
                    }
                    out.push_str(&word);
                } else if is_keyword(&word) || is_operator_word(&word) {
                    out.push_str(&word);
                } else {
                    out.push_str(&dialect.quote(&word));
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    Ok(out)
}

// Operator words shared by every function list.
fn is_operator_word(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "and" | "or" | "between" | "binary" | "div" | "in" | "is" | "not" | "null" | "like" | "rlike" | "xor"
    )
}

/// Index of the quote closing the literal opened at `start`, honoring
/// doubled quotes as escapes.
fn closing(chars: &[char], start: usize, quote: char) -> Option<usize> {
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;

    fn hana() -> Dialect {
        Dialect::for_kind(DialectKind::Hana, true)
    }

    #[test]
    fn test_identifiers_are_quoted() {
        assert_eq!(
            encapsulate(&hana(), "SELECT", "ID = 1 AND STATUS = 'open'").unwrap(),
            "\"ID\" = 1 AND \"STATUS\" = 'open'"
        );
    }

    #[test]
    fn test_case_insensitive_passthrough() {
        let dialect = Dialect::default_dialect();
        assert_eq!(
            encapsulate(&dialect, "SELECT", "TOTAL > 10.5").unwrap(),
            "TOTAL > 10.5"
        );
    }

    #[test]
    fn test_functions_and_qualified_names() {
        assert_eq!(
            encapsulate(&hana(), "SELECT", "COUNT(o.ID)").unwrap(),
            "COUNT(\"o\".\"ID\")"
        );
        assert_eq!(
            encapsulate(&hana(), "SELECT", "CAST(TOTAL AS DECIMAL)").unwrap(),
            "CAST(\"TOTAL\" AS DECIMAL)"
        );
    }

    #[test]
    fn test_unknown_function_rejected() {
        assert!(matches!(
            encapsulate(&hana(), "SELECT", "pg_sleep(10)"),
            Err(SqlScopeError::InvalidStatementState { statement: "SELECT", .. })
        ));
    }

    #[test]
    fn test_literals_preserved() {
        assert_eq!(
            encapsulate(&hana(), "UPDATE", "'it''s; -- fine'").unwrap(),
            "'it''s; -- fine'"
        );
        assert_eq!(
            encapsulate(&hana(), "UPDATE", "\"Already Quoted\"").unwrap(),
            "\"Already Quoted\""
        );
        assert_eq!(encapsulate(&hana(), "INSERT", "?").unwrap(), "?");
    }

    #[test]
    fn test_injection_rejected() {
        let dialect = hana();
        assert!(encapsulate(&dialect, "DELETE", "1 = 1; DROP TABLE X").is_err());
        assert!(encapsulate(&dialect, "DELETE", "1 = 1 -- tail").is_err());
        assert!(encapsulate(&dialect, "DELETE", "1 = 1 /* x */").is_err());
        assert!(encapsulate(&dialect, "DELETE", "'open").is_err());
    }

    #[test]
    fn test_subquery_keywords() {
        assert_eq!(
            encapsulate(&hana(), "SELECT", "ID IN (SELECT ORDER_ID FROM ITEMS)").unwrap(),
            "\"ID\" IN (SELECT \"ORDER_ID\" FROM \"ITEMS\")"
        );
    }
}
