//! # Validation Module
//!
//! Input validation for entities before they reach the store.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Model rules (THIS MODULE)                                     │
//! │  └── Validate impls on Category / Product                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Repository                                                   │
//! │  ├── insert / insert_range validate every entity                       │
//! │  └── update / update_range validate the merged row before writing      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK / live-row UNIQUE constraints                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each model implements [`Validate`] explicitly; there is no discovery by
//! naming convention.

pub use crate::error::ValidationResult;

use crate::error::ValidationError;

/// Maximum length of names (category names, product names).
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of free-text descriptions.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Maximum length of a SKU.
pub const MAX_SKU_LEN: usize = 50;

/// A model that can check its own fields.
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display name.
///
/// ## Example
/// ```rust
/// use smartpos_core::validation::validate_name;
///
/// assert!(validate_name("category_name", "Beverages").is_ok());
/// assert!(validate_name("category_name", "  ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional free-text description. Empty is fine.
pub fn validate_description(field: &str, description: &str) -> ValidationResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Not empty, at most 50 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use smartpos_core::validation::validate_sku;
///
/// assert!(validate_sku("COKE-330").is_ok());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::required("sku"));
    }

    if sku.len() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a barcode: 8 to 14 digits (EAN-8 through GTIN-14).
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let digits = barcode.trim();

    if !(8..=14).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must be 8 to 14 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an amount in cents. Zero is allowed (free items).
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate_bps".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
