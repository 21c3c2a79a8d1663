//! # Error Types
//!
//! Domain-specific error types for smartpos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  smartpos-core errors (this file)                                      │
//! │  └── ValidationError  - Contract violations found before any I/O       │
//! │                                                                         │
//! │  smartpos-db errors (separate crate)                                   │
//! │  └── DbError          - NotFound, store failures, wraps Validation     │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → API layer (404 / 400 / 500)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, limits)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised when a value breaks a construction-time contract, e.g. a paged
/// result with a page size of zero or a category without a name. These are
/// not recoverable by the data-access layer and surface to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Invalid format (e.g., SKU with spaces, barcode with letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a `Required` error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates a `MustBePositive` error for the given field.
    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("category_name");
        assert_eq!(err.to_string(), "category_name is required");

        let err = ValidationError::must_be_positive("page_size");
        assert_eq!(err.to_string(), "page_size must be greater than 0");

        let err = ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        };
        assert_eq!(err.to_string(), "sku must be at most 50 characters");
    }
}
