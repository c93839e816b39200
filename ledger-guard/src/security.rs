//! Security utilities for ledger-guard.
//!
//! Column names come straight from the header of an uploaded file, so every
//! identifier that reaches a SQL statement goes through [`SqlSecurity`]. The
//! advisory credential is held in a [`SecureString`] that is wiped on drop and
//! never printed.

use crate::error::{GuardError, Result};
use regex::Regex;
use zeroize::ZeroizeOnDrop;

/// Longest identifier accepted from an uploaded header.
const MAX_IDENTIFIER_LENGTH: usize = 1024;

/// A secure string that automatically clears its contents when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecureString(String);

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(***)")
    }
}

impl SecureString {
    /// Create a new secure string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the string value. Use carefully and avoid storing the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true when the secret is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// SQL quoting utilities for identifiers and literals built from user input.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Quotes an identifier (table or column name) for use in a SQL statement.
    ///
    /// Unlike hand-written schemas, uploaded headers routinely contain spaces,
    /// dashes or mixed case, so any printable name is accepted and wrapped in
    /// double quotes with internal quotes doubled. Quoting also keeps the
    /// engine from lowercasing the name.
    ///
    /// # Examples
    /// ```rust
    /// use ledger_guard::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::quote_identifier("Amount (USD)").unwrap(), "\"Amount (USD)\"");
    /// assert_eq!(SqlSecurity::quote_identifier("a\"b").unwrap(), "\"a\"\"b\"");
    /// assert!(SqlSecurity::quote_identifier("").is_err());
    /// ```
    pub fn quote_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;

        let escaped = identifier.replace('"', "\"\"");
        Ok(format!("\"{escaped}\""))
    }

    /// Validates an identifier without quoting it.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.is_empty() {
            return Err(GuardError::SecurityError(
                "SQL identifier cannot be empty".to_string(),
            ));
        }

        if identifier.len() > MAX_IDENTIFIER_LENGTH {
            return Err(GuardError::SecurityError(format!(
                "SQL identifier too long (max {MAX_IDENTIFIER_LENGTH} characters)"
            )));
        }

        if identifier.contains('\0') {
            return Err(GuardError::SecurityError(
                "SQL identifier cannot contain null bytes".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates a regex pattern and escapes it as the body of a SQL string
    /// literal.
    pub fn regex_literal(pattern: &str) -> Result<String> {
        if pattern.contains('\0') {
            return Err(GuardError::SecurityError(
                "Regex pattern cannot contain null bytes".to_string(),
            ));
        }

        if let Err(e) = Regex::new(pattern) {
            return Err(GuardError::SecurityError(format!(
                "Invalid regex pattern: {e}"
            )));
        }

        Ok(pattern.replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_string_redacts_debug() {
        let secret = SecureString::new("AIza-secret");
        assert_eq!(format!("{secret:?}"), "SecureString(***)");
        assert_eq!(secret.expose(), "AIza-secret");
        assert!(!secret.is_blank());
        assert!(SecureString::from("   ").is_blank());
    }

    #[test]
    fn test_quote_plain_identifier() {
        assert_eq!(
            SqlSecurity::quote_identifier("transaction_id").unwrap(),
            "\"transaction_id\""
        );
    }

    #[test]
    fn test_quote_preserves_case_and_spaces() {
        assert_eq!(
            SqlSecurity::quote_identifier("Customer Email").unwrap(),
            "\"Customer Email\""
        );
    }

    #[test]
    fn test_quote_escapes_embedded_quotes() {
        assert_eq!(
            SqlSecurity::quote_identifier("x\" FROM t; --").unwrap(),
            "\"x\"\" FROM t; --\""
        );
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(SqlSecurity::quote_identifier("").is_err());
        assert!(SqlSecurity::quote_identifier("nul\0byte").is_err());
        assert!(SqlSecurity::quote_identifier(&"a".repeat(MAX_IDENTIFIER_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_regex_literal() {
        assert_eq!(
            SqlSecurity::regex_literal(r"^[A-Z]{3}$").unwrap(),
            r"^[A-Z]{3}$"
        );
        assert_eq!(SqlSecurity::regex_literal("it's").unwrap(), "it''s");
        assert!(SqlSecurity::regex_literal(r"[unclosed").is_err());
    }
}
