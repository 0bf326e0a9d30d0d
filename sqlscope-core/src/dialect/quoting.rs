//! Identifier validation and quoting.
//!
//! SQL identifiers cannot be bound as statement parameters, so every name
//! that ends up in generated text goes through [`validate_identifier`] and
//! [`quote_identifier`]. Qualified names (`SCHEMA.TABLE`) are handled part by
//! part; dots inside quoted parts are not separators.

use crate::{Result, error::SqlScopeError};
use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of a single identifier part, in bytes.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Pattern for identifiers that may be emitted without quotes.
fn plain_identifier() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_$#]*$").expect("Invalid plain identifier pattern")
    })
}

/// Whether `part` is a plain (unquoted-safe) identifier.
pub fn is_plain_identifier(part: &str) -> bool {
    plain_identifier().is_match(part)
}

/// Splits a possibly qualified name on dots that are outside quotes.
pub fn split_qualified(name: &str, quote: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (index, ch) in name.char_indices() {
        if ch == quote {
            in_quotes = !in_quotes;
        } else if ch == '.' && !in_quotes {
            parts.push(&name[start..index]);
            start = index + ch.len_utf8();
        }
    }
    parts.push(&name[start..]);
    parts
}

/// Whether `part` is already wrapped in `quote` with every inner quote doubled.
pub fn is_quoted(part: &str, quote: char) -> bool {
    let quote_len = quote.len_utf8();
    if part.len() < quote_len * 2 || !part.starts_with(quote) || !part.ends_with(quote) {
        return false;
    }

    let inner = &part[quote_len..part.len() - quote_len];
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == quote && chars.next_if_eq(&quote).is_none() {
            return false;
        }
    }
    true
}

/// Strips one level of quoting from `part`, undoubling inner quotes.
pub fn unquote(part: &str, quote: char) -> String {
    if is_quoted(part, quote) {
        let quote_len = quote.len_utf8();
        let doubled: String = [quote, quote].iter().collect();
        part[quote_len..part.len() - quote_len].replace(&doubled, &quote.to_string())
    } else {
        part.to_string()
    }
}

fn quote_part(part: &str, quote: char) -> String {
    if is_quoted(part, quote) {
        return part.to_string();
    }
    let doubled: String = [quote, quote].iter().collect();
    format!("{quote}{}{quote}", part.replace(quote, &doubled))
}

/// Applies a dialect's quoting policy to a possibly qualified identifier.
///
/// Case-insensitive dialects get the identifier back untouched. Case
/// sensitive ones get every part wrapped in `quote`, except parts that are
/// already quoted, so quoting twice yields the same text as quoting once.
pub fn quote_identifier(identifier: &str, quote: char, case_sensitive: bool) -> String {
    if !case_sensitive {
        return identifier.to_string();
    }
    split_qualified(identifier, quote)
        .into_iter()
        .map(|part| quote_part(part, quote))
        .collect::<Vec<_>>()
        .join(".")
}

/// Validates an identifier before it is emitted into statement text.
///
/// Rejects empty parts, NUL bytes and parts longer than
/// [`MAX_IDENTIFIER_LENGTH`]. When the dialect emits identifiers unquoted,
/// every part must also be a plain identifier or already quoted.
pub fn validate_identifier(identifier: &str, quote: char, case_sensitive: bool) -> Result<()> {
    if identifier.contains('\0') {
        return Err(SqlScopeError::invalid_argument(format!(
            "identifier contains a NUL byte: {:?}",
            identifier
        )));
    }

    for part in split_qualified(identifier, quote) {
        let bare = unquote(part, quote);
        if bare.is_empty() {
            return Err(SqlScopeError::invalid_argument(format!(
                "identifier '{}' has an empty part",
                identifier
            )));
        }
        if bare.len() > MAX_IDENTIFIER_LENGTH {
            return Err(SqlScopeError::invalid_argument(format!(
                "identifier part exceeds {} bytes (got {})",
                MAX_IDENTIFIER_LENGTH,
                bare.len()
            )));
        }
        if !case_sensitive && !is_quoted(part, quote) && !is_plain_identifier(part) {
            return Err(SqlScopeError::invalid_argument(format!(
                "identifier '{}' must be quoted to be used with a case-insensitive dialect",
                identifier
            )));
        }
    }
    Ok(())
}

/// Renders `value` as a single-quoted SQL string literal.
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_passthrough() {
        assert_eq!(quote_identifier("orders", '"', false), "orders");
        assert_eq!(quote_identifier("APP.ORDERS", '"', false), "APP.ORDERS");
    }

    #[test]
    fn test_case_sensitive_quotes_each_part() {
        assert_eq!(quote_identifier("ORDERS", '"', true), "\"ORDERS\"");
        assert_eq!(quote_identifier("APP.ORDERS", '"', true), "\"APP\".\"ORDERS\"");
        assert_eq!(quote_identifier("my`table", '`', true), "`my``table`");
    }

    #[test]
    fn test_quoting_is_idempotent() {
        let once = quote_identifier("APP.ORDERS", '"', true);
        assert_eq!(quote_identifier(&once, '"', true), once);

        let hostile = quote_identifier("a\"b", '"', true);
        assert_eq!(hostile, "\"a\"\"b\"");
        assert_eq!(quote_identifier(&hostile, '"', true), hostile);
    }

    #[test]
    fn test_split_respects_quotes() {
        assert_eq!(split_qualified("\"a.b\".c", '"'), vec!["\"a.b\"", "c"]);
        assert_eq!(split_qualified("a", '"'), vec!["a"]);
    }

    #[test]
    fn test_is_quoted() {
        assert!(is_quoted("\"X\"", '"'));
        assert!(is_quoted("\"a\"\"b\"", '"'));
        assert!(!is_quoted("\"a\"b\"", '"'));
        assert!(!is_quoted("\"", '"'));
        assert!(!is_quoted("X", '"'));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"a\"\"b\"", '"'), "a\"b");
        assert_eq!(unquote("plain", '"'), "plain");
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("ORDERS", '"', false).is_ok());
        assert!(validate_identifier("APP.ORDERS", '"', false).is_ok());
        assert!(validate_identifier("\"Mixed Case\"", '"', false).is_ok());
        assert!(validate_identifier("Robert'); DROP TABLE x", '"', true).is_ok());

        assert!(validate_identifier("", '"', true).is_err());
        assert!(validate_identifier("APP.", '"', true).is_err());
        assert!(validate_identifier("a\0b", '"', true).is_err());
        assert!(validate_identifier("x; DROP TABLE y", '"', false).is_err());
        assert!(validate_identifier(&"x".repeat(129), '"', true).is_err());
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("O'Brien"), "'O''Brien'");
    }
}
