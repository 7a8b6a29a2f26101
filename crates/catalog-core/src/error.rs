//! # Error Types
//!
//! Domain-specific error types for catalog-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  catalog-core errors (this file)                                       │
//! │  ├── CoreError         - General domain errors                         │
//! │  ├── ValidationError   - One field failed validation                   │
//! │  └── ValidationErrors  - Every field error of one form                 │
//! │                                                                         │
//! │  catalog-db errors (separate crate)                                    │
//! │  └── DbError           - Record store failures                         │
//! │                                                                         │
//! │  catalog-app errors                                                    │
//! │  └── ApiError          - What the front end sees                       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → CLI output             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found in the loaded catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A single validation failure.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A form failed validation on one or more fields.
    #[error("Invalid form: {0}")]
    InvalidForm(#[from] ValidationErrors),

    /// Password hashing failed (salted scheme only).
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Every variant names the field it belongs to so the front end can show the
/// message next to the right input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must be a non-negative {kind}")]
    Negative { field: String, kind: String },

    /// Invalid format (e.g. "abc" for a price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g. a product name already in the catalog).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Two inputs that must agree do not.
    #[error("{field} does not match")]
    Mismatch { field: String },
}

impl ValidationError {
    /// Returns the name of the field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::Negative { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Duplicate { field, .. }
            | ValidationError::Mismatch { field } => field,
        }
    }
}

/// All field errors collected while validating one form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Returns the first error reported for `field`, if any.
    pub fn for_field(&self, field: &str) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.field() == field)
    }

    /// `Ok(value)` when no errors were collected.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::Negative {
            field: "stock".to_string(),
            kind: "integer".to_string(),
        };
        assert_eq!(err.to_string(), "stock must be a non-negative integer");
    }

    #[test]
    fn test_errors_are_field_tagged() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::Required {
            field: "price".to_string(),
        });
        errors.push(ValidationError::Duplicate {
            field: "name".to_string(),
            value: "Widget".to_string(),
        });

        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors.for_field("name"),
            Some(ValidationError::Duplicate { .. })
        ));
        assert!(errors.for_field("stock").is_none());
        assert_eq!(
            errors.to_string(),
            "price is required; name 'Widget' already exists"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
