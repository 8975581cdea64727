//! # Error Types
//!
//! Domain-specific error types for mercadinho-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mercadinho-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  mercadinho-db errors (separate crate)                                 │
//! │  └── DbError          - Key/value store failures                       │
//! │                                                                         │
//! │  mercadinho-pos errors (separate crate)                                │
//! │  └── PosError         - What the caller of the service sees            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → PosError → caller                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product code, order number, ...)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use chrono::NaiveDate;
use thiserror::Error;

use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::OrderNumber;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - Product code doesn't exist in the catalog
    /// - Cart line references a code with no catalog entry
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Order cannot be found in the ledger.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderNumber),

    /// Requested quantity is not usable.
    ///
    /// ## When This Occurs
    /// - Zero or negative quantity
    /// - Quantity text that does not parse
    /// - Whole-unit request that truncates to zero (e.g. "0,4" units)
    #[error("Invalid quantity: {value}")]
    InvalidQuantity { value: String },

    /// Product has no stock at all.
    #[error("Product {code} is out of stock")]
    OutOfStock { code: String },

    /// Not enough stock to cover the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { code: "ALI0001", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 in stock"
    /// ```
    #[error("Insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        available: Quantity,
        requested: Quantity,
    },

    /// Checkout attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Checkout attempted without a payment method.
    #[error("No payment method selected")]
    MissingPaymentMethod,

    /// Cash tendered does not cover the total.
    #[error("Insufficient cash: total {total}, tendered {tendered}")]
    InsufficientCash { total: Money, tendered: Money },

    /// Order is outside the same-day edit window.
    ///
    /// Orders may only be edited or deleted on the calendar day they were
    /// placed.
    #[error("Order {number} was placed on {} and can no longer be changed", .placed_on.format("%d/%m/%Y"))]
    EditWindowClosed {
        number: OrderNumber,
        placed_on: NaiveDate,
    },

    /// An order with this number already exists in the ledger.
    #[error("Order number {0} already exists")]
    DuplicateOrderNumber(OrderNumber),

    /// A report was requested over data that does not exist yet.
    ///
    /// ## When This Occurs
    /// - Top customer requested with an empty sales ledger
    #[error("No sales data available")]
    NoData,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., bad number text, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate product code).
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
            code: "ALI0001".to_string(),
            available: Quantity::from_units(3),
            requested: Quantity::from_units(5),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for ALI0001: available 3, requested 5"
        );
    }

    #[test]
    fn test_edit_window_message_uses_br_date() {
        let err = CoreError::EditWindowClosed {
            number: OrderNumber::new(7),
            placed_on: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Order PED000007 was placed on 09/03/2025 and can no longer be changed"
        );
    }

    #[test]
    fn test_insufficient_cash_message() {
        let err = CoreError::InsufficientCash {
            total: Money::from_centavos(3000),
            tendered: Money::from_centavos(2000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient cash: total R$ 30,00, tendered R$ 20,00"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::Duplicate {
            field: "code".to_string(),
            value: "ALI0001".to_string(),
        };
        assert_eq!(err.to_string(), "code 'ALI0001' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "category".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
