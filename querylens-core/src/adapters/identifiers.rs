//! Identifier handling for statements that cannot bind a table name.
//!
//! Table names come from the backend's own catalog, but a database opened
//! from an untrusted source may carry names crafted to break out of a quoted
//! identifier. [`prepare_identifier`] applies the configured
//! [`IdentifierPolicy`] before any such name reaches query text.

use crate::config::IdentifierPolicy;
use crate::{Result, error::QueryLensError};

/// Quotes an identifier with `quote`, doubling embedded quote characters.
pub fn quote_with(identifier: &str, quote: char) -> String {
    let doubled: String = [quote, quote].iter().collect();
    format!(
        "{quote}{}{quote}",
        identifier.replace(quote, &doubled),
        quote = quote
    )
}

/// ANSI double-quoted identifier (SQLite, PostgreSQL).
pub fn quote_ansi(identifier: &str) -> String {
    quote_with(identifier, '"')
}

/// Backtick-quoted identifier (MySQL).
pub fn quote_backtick(identifier: &str) -> String {
    quote_with(identifier, '`')
}

/// Single-quoted string literal, used for SQLite PRAGMA arguments.
pub fn quote_literal(value: &str) -> String {
    quote_with(value, '\'')
}

/// Returns true when the identifier holds characters that could escape quoting.
pub fn is_suspicious(identifier: &str) -> bool {
    identifier
        .chars()
        .any(|c| matches!(c, '"' | '\'' | '`' | ';' | '\\') || c.is_control())
}

/// Applies the identifier policy to a table name.
///
/// # Errors
/// Returns `UnsafeIdentifier` when the policy is `Reject` and the name is
/// suspicious, or when the name is empty.
pub fn prepare_identifier(identifier: &str, policy: IdentifierPolicy) -> Result<&str> {
    if identifier.is_empty() {
        return Err(QueryLensError::UnsafeIdentifier {
            identifier: String::new(),
        });
    }

    if policy == IdentifierPolicy::Reject && is_suspicious(identifier) {
        tracing::warn!("Rejected suspicious identifier {:?}", identifier);
        return Err(QueryLensError::UnsafeIdentifier {
            identifier: identifier.escape_debug().to_string(),
        });
    }

    Ok(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting() {
        assert_eq!(quote_ansi("orders"), "\"orders\"");
        assert_eq!(quote_ansi("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_backtick("or`ders"), "`or``ders`");
        assert_eq!(quote_literal("it's"), "'it''s'");
    }

    #[test]
    fn test_quote_policy_accepts_everything_non_empty() {
        assert_eq!(
            prepare_identifier("x\"; DROP TABLE y; --", IdentifierPolicy::Quote).unwrap(),
            "x\"; DROP TABLE y; --"
        );
        assert!(prepare_identifier("", IdentifierPolicy::Quote).is_err());
    }

    #[test]
    fn test_reject_policy() {
        assert!(prepare_identifier("order_items", IdentifierPolicy::Reject).is_ok());
        assert!(prepare_identifier("Order Items", IdentifierPolicy::Reject).is_ok());

        for name in ["a\"b", "a'b", "a`b", "a;b", "a\nb", "a\0b", "a\\b"] {
            let err = prepare_identifier(name, IdentifierPolicy::Reject).unwrap_err();
            assert!(
                matches!(err, QueryLensError::UnsafeIdentifier { .. }),
                "{:?} should be rejected",
                name
            );
        }
    }
}
