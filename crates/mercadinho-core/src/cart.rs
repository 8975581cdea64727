//! # Cart Engine
//!
//! The open cart: adding lines reserves stock, removing them gives it
//! back, and checkout turns the reservation into the sale.
//!
//! ## Reservation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Stock Reservation                                  │
//! │                                                                         │
//! │  Product stock: 5          Cart                                         │
//! │       │                                                                 │
//! │       │  add_item(3)       ┌──────────────────┐                        │
//! │       ├───────────────────►│ line: 3 reserved │   stock now 2          │
//! │       │                    └──────────────────┘                        │
//! │       │  add_item(3)                                                    │
//! │       ├──────────X  InsufficientStock (only 2 on hand)                 │
//! │       │                                                                 │
//! │       │  remove_item       ┌──────────────────┐                        │
//! │       ◄────────────────────│ line removed     │   stock back to 5      │
//! │       │                    └──────────────────┘                        │
//! │                                                                         │
//! │  Invariant: product stock + cart reservation is constant until         │
//! │  checkout commits the deduction.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::find_product_mut;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{Cart, CartItem, DiscountRate, Product, Unit};

// =============================================================================
// Totals
// =============================================================================

/// Cart totals, computed in one place and used everywhere: checkout,
/// receipts, views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of line totals (each line rounded at the centavo).
    pub subtotal: Money,
    /// Discount amount derived from the cart-wide rate.
    pub discount_amount: Money,
    /// `subtotal - discount_amount`. Negative when the rate tops 100%.
    pub total: Money,
}

/// Computes the cart totals.
pub fn totals(cart: &Cart) -> CartTotals {
    let subtotal: Money = cart.items.iter().map(CartItem::line_total).sum();
    let discount_amount = subtotal.discount_amount(cart.discount);
    CartTotals {
        subtotal,
        discount_amount,
        total: subtotal - discount_amount,
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Adds a quantity of a product to the cart, reserving it from stock.
///
/// ## Check Order
/// 1. the product must exist;
/// 2. it must have stock on hand at all (`OutOfStock`);
/// 3. the requested quantity must be positive (`InvalidQuantity`);
/// 4. whole-unit products truncate the request toward zero, and a request
///    below one whole unit is `InvalidQuantity`;
/// 5. the request must fit in the remaining stock (`InsufficientStock`);
/// 6. stock is deducted and the quantity merges into an existing line for
///    the code, or starts a new snapshot line.
///
/// Returns the quantity actually added (after truncation).
pub fn add_item(
    products: &mut [Product],
    cart: &mut Cart,
    code: &str,
    requested: Quantity,
) -> CoreResult<Quantity> {
    let product = find_product_mut(products, code)
        .ok_or_else(|| CoreError::ProductNotFound(code.to_string()))?;

    if !product.quantity.is_positive() {
        return Err(CoreError::OutOfStock {
            code: product.code.clone(),
        });
    }

    if !requested.is_positive() {
        return Err(CoreError::InvalidQuantity {
            value: requested.to_string(),
        });
    }

    let quantity = match product.unit {
        Unit::Kg => requested,
        Unit::Unit => {
            let whole = requested.truncate_to_whole();
            if whole.is_zero() {
                return Err(CoreError::InvalidQuantity {
                    value: requested.to_string(),
                });
            }
            whole
        }
    };

    if quantity > product.quantity {
        return Err(CoreError::InsufficientStock {
            code: product.code.clone(),
            available: product.quantity,
            requested: quantity,
        });
    }

    product.quantity -= quantity;

    match cart.items.iter_mut().find(|item| item.code == code) {
        Some(line) => line.quantity += quantity,
        None => cart.items.push(CartItem::from_product(product, quantity)),
    }

    Ok(quantity)
}

/// Removes a cart line and returns its reserved quantity to stock.
///
/// A product that was deleted from the catalog after the line was added
/// has nowhere to receive the stock; the line still comes out.
pub fn remove_item(products: &mut [Product], cart: &mut Cart, code: &str) -> CoreResult<Quantity> {
    let position = cart
        .items
        .iter()
        .position(|item| item.code == code)
        .ok_or_else(|| CoreError::ProductNotFound(code.to_string()))?;

    let line = cart.items.remove(position);
    if let Some(product) = find_product_mut(products, code) {
        product.quantity += line.quantity;
    }

    Ok(line.quantity)
}

/// Sets the cart-wide discount rate.
pub fn apply_discount(cart: &mut Cart, rate: DiscountRate) {
    cart.discount = rate;
}

/// Empties the cart: every reservation goes back to stock and the
/// discount resets to zero.
pub fn clear(products: &mut [Product], cart: &mut Cart) {
    for line in cart.items.drain(..) {
        if let Some(product) = find_product_mut(products, &line.code) {
            product.quantity += line.quantity;
        }
    }
    cart.discount = DiscountRate::zero();
}

// =============================================================================
// Unit Tests
// =============================================================================
