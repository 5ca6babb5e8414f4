//! # Error Types
//!
//! Domain-specific error types for souk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  souk-core errors (this file)                                           │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  souk-store: StoreError   - Local mirror I/O failures                   │
//! │  souk-sync:  SyncError    - Remote transport failures                   │
//! │  souk-engine: SessionError - Login/identity failures                    │
//! │                                                                         │
//! │  Validation failures surface BEFORE any remote call; transport          │
//! │  failures convert to boolean results and never propagate as panics.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations. Caught and translated to user-facing
/// notifications; never fatal to the process.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found (deleted locally, or never synced).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Expense cannot be found (deleted locally, or never synced).
    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),

    /// Requested quantity exceeds the stock snapshot frozen at
    /// add-to-cart time. Stock is not re-checked against concurrent carts;
    /// there is exactly one active operator by assumption.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Cart line id does not exist in the active cart.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// Checkout attempted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded the maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised synchronously before any remote call is
/// attempted so no partial state is ever written.
#[derive(Debug, Error)]
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
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Duplicate value (e.g., duplicate barcode).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
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
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Mint Tea".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Mint Tea: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "phone".to_string(),
        };
        assert_eq!(err.to_string(), "phone is required");

        let err = ValidationError::Duplicate {
            field: "barcode".to_string(),
            value: "6111222333".to_string(),
        };
        assert_eq!(err.to_string(), "barcode '6111222333' already exists");
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
