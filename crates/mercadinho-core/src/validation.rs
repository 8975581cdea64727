//! # Validation Module
//!
//! Input validation utilities for Mercadinho POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Parsing (Money / Quantity / DiscountRate FromStr)            │
//! │  ├── pt-BR number formats, decimal place limits                        │
//! │  └── Rejects text that cannot become a value at all                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - Field rules                                    │
//! │  ├── Required fields, length limits, sign checks                       │
//! │  └── Runs before any state mutation                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Operations (catalog / cart / checkout)                       │
//! │  ├── Cross-field rules: stock coverage, cash coverage                  │
//! │  └── Owns the validate-then-mutate ordering                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use mercadinho_core::validation::{validate_product_name, validate_category};
//!
//! validate_product_name("Arroz 5kg").unwrap();
//! validate_category("Alimentos").unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 80 characters
///
/// ## Example
/// ```rust
/// use mercadinho_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Feijão Carioca 1kg").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 80 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 80,
        });
    }

    Ok(())
}

/// Validates a category name.
///
/// The category doubles as the source of the product code prefix, so it
/// must contain at least one letter or digit.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Must contain at least one alphanumeric character
pub fn validate_category(category: &str) -> ValidationResult<()> {
    let category = category.trim();

    if category.is_empty() {
        return Err(ValidationError::Required {
            field: "category".to_string(),
        });
    }

    if category.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: 50,
        });
    }

    if !category.chars().any(|c| c.is_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "category".to_string(),
            reason: "must contain at least one letter or digit".to_string(),
        });
    }

    Ok(())
}

/// Validates a product code used for lookups.
///
/// ## Rules
/// - Must not be empty
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    Ok(())
}

/// Validates a client name on a sale.
///
/// ## Rules
/// - May be empty (checkout substitutes the walk-in default)
/// - Must be at most 80 characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_client_name(client: &str) -> ValidationResult<String> {
    let client = client.trim();

    if client.chars().count() > 80 {
        return Err(ValidationError::TooLong {
            field: "client".to_string(),
            max: 80,
        });
    }

    Ok(client.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a product price.
///
/// ## Rules
/// - Must be non-negative (zero is allowed for giveaway lines)
///
/// ## Example
/// ```rust
/// use mercadinho_core::validation::validate_price;
/// use mercadinho_core::Money;
///
/// assert!(validate_price(Money::from_centavos(2490)).is_ok());
/// assert!(validate_price(Money::from_centavos(-1)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock level.
///
/// ## Rules
/// - Must be non-negative (zero means out of stock, which is valid)
pub fn validate_stock(stock: Quantity) -> ValidationResult<()> {
    if stock.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Arroz Branco 5kg").is_ok());
        assert!(validate_product_name("Pão Francês").is_ok());

        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(81)).is_err());
    }

    #[test]
    fn test_validate_category() {
        assert!(validate_category("Alimentos").is_ok());
        assert!(validate_category("Hortifrúti").is_ok());

        assert!(validate_category("").is_err());
        assert!(validate_category("---").is_err());
        assert!(validate_category(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_product_code() {
        assert!(validate_product_code("ALI0001").is_ok());
        assert!(validate_product_code("").is_err());
        assert!(validate_product_code("  ").is_err());
    }

    #[test]
    fn test_validate_client_name_trims() {
        assert_eq!(validate_client_name("  Maria  ").unwrap(), "Maria");
        assert_eq!(validate_client_name("").unwrap(), "");
        assert!(validate_client_name(&"A".repeat(81)).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::from_centavos(0)).is_ok());
        assert!(validate_price(Money::from_centavos(2490)).is_ok());
        assert!(validate_price(Money::from_centavos(-100)).is_err());
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock(Quantity::from_units(0)).is_ok());
        assert!(validate_stock(Quantity::from_thousandths(500)).is_ok());
        assert!(validate_stock(Quantity::from_thousandths(-1)).is_err());
    }
}
