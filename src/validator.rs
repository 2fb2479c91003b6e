// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Subscription payload validation.
//!
//! Email validation is deliberately permissive (RFC-lite): one local part,
//! one `@`, and a domain containing an interior dot, with no whitespace
//! anywhere. The provider performs the authoritative validation; this check
//! only rejects input that cannot possibly be an address. No length bound
//! is enforced.

use thiserror::Error;
use tracing::debug;

/// Validation error types.
///
/// Display strings double as the client-facing error messages, so they must
/// not echo the submitted value back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Email address is required.")]
    MissingEmail,

    #[error("Invalid email address format.")]
    InvalidEmailFormat,
}

/// Result of validation.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Request is valid
    Valid,
    /// Request is invalid
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }
}

/// Subscription request validator.
#[derive(Debug, Default)]
pub struct SubscriptionValidator;

impl SubscriptionValidator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Validate the submitted email address.
    ///
    /// An absent or empty value is a missing email; anything else is checked
    /// against the address pattern.
    pub fn validate_email(&self, email: Option<&str>) -> ValidationResult {
        let email = match email {
            Some(e) if !e.is_empty() => e,
            _ => {
                debug!("Missing email address");
                return ValidationResult::Invalid(ValidationError::MissingEmail);
            }
        };

        if matches_email_pattern(email) {
            ValidationResult::Valid
        } else {
            debug!("Email address failed format check");
            ValidationResult::Invalid(ValidationError::InvalidEmailFormat)
        }
    }
}

/// Permissive address check, equivalent to `^[^\s@]+@[^\s@]+\.[^\s@]+$`:
/// non-empty local part, a single `@`, and a dot strictly inside the domain.
fn matches_email_pattern(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    // The dot must have at least one character on each side.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> SubscriptionValidator {
        SubscriptionValidator::new()
    }

    #[test]
    fn test_valid_addresses() {
        for email in [
            "reader@example.com",
            "first.last@mail.example.co.uk",
            "odd+tag@sub.domain.io",
            "a@b.c",
        ] {
            assert!(
                validator().validate_email(Some(email)).is_valid(),
                "{email} should be accepted"
            );
        }
    }

    #[test]
    fn test_invalid_addresses() {
        for email in [
            "no-at-sign",
            "a@b",
            "@example.com",
            "user@",
            "user@@example.com",
            "user@.com",
            "user@example.",
            "user name@example.com",
            "user@exam ple.com",
        ] {
            let result = validator().validate_email(Some(email));
            assert!(
                matches!(
                    result.error(),
                    Some(ValidationError::InvalidEmailFormat)
                ),
                "{email} should be rejected as malformed"
            );
        }
    }

    #[test]
    fn test_missing_email() {
        assert!(matches!(
            validator().validate_email(None).error(),
            Some(ValidationError::MissingEmail)
        ));

        // Empty string is caught by the required check, not the pattern
        assert!(matches!(
            validator().validate_email(Some("")).error(),
            Some(ValidationError::MissingEmail)
        ));
    }

    #[test]
    fn test_error_messages_are_client_safe() {
        assert_eq!(
            ValidationError::MissingEmail.to_string(),
            "Email address is required."
        );
        assert_eq!(
            ValidationError::InvalidEmailFormat.to_string(),
            "Invalid email address format."
        );
    }
}
