//! # Sales Ledger
//!
//! The append-only record of committed orders, plus the same-day
//! correction window.
//!
//! ## Edit Window
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order placed 09/03 14:35                                               │
//! │                                                                         │
//! │  09/03 (same day)      edit client / discount / payment ── allowed     │
//! │                        delete, stock restored           ── allowed     │
//! │                                                                         │
//! │  10/03 onwards         any change ──────────► EditWindowClosed         │
//! │                                                                         │
//! │  Items and subtotal never change after commit. An edited discount      │
//! │  recomputes the total from the stored subtotal; the recorded change    │
//! │  is history and stays as handed over.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Order numbers come from a persistent counter and are never reused;
//! deleting `PED000042` leaves a permanent gap.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::find_product_mut;
use crate::error::{CoreError, CoreResult};
use crate::types::{DiscountRate, Order, OrderNumber, PaymentMethod, ShopState};
use crate::validation::validate_client_name;
use crate::DEFAULT_CLIENT_NAME;

/// The fields a same-day correction may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOrderRequest {
    /// New customer name; blank falls back to the walk-in default.
    pub client: String,
    pub discount: DiscountRate,
    pub payment_method: PaymentMethod,
}

// =============================================================================
// Queries
// =============================================================================

/// Looks up an order by number.
pub fn find_by_number(sales: &[Order], number: OrderNumber) -> Option<&Order> {
    sales.iter().find(|order| order.number == number)
}

// =============================================================================
// Mutations
// =============================================================================

/// Appends an order, rejecting a number already on file.
pub fn append(sales: &mut Vec<Order>, order: Order) -> CoreResult<()> {
    if find_by_number(sales, order.number).is_some() {
        return Err(CoreError::DuplicateOrderNumber(order.number));
    }
    sales.push(order);
    Ok(())
}

/// Applies a same-day correction to an order.
///
/// The total is recomputed from the **stored** subtotal with the new
/// discount. Items, subtotal and the recorded change are immutable.
pub fn edit_same_day(
    state: &mut ShopState,
    number: OrderNumber,
    changes: EditOrderRequest,
    today: NaiveDate,
) -> CoreResult<Order> {
    let client = {
        let trimmed = validate_client_name(&changes.client)?;
        if trimmed.is_empty() {
            DEFAULT_CLIENT_NAME.to_string()
        } else {
            trimmed
        }
    };

    let order = state
        .sales
        .iter_mut()
        .find(|order| order.number == number)
        .ok_or(CoreError::OrderNotFound(number))?;

    if order.placed_on() != today {
        return Err(CoreError::EditWindowClosed {
            number,
            placed_on: order.placed_on(),
        });
    }

    order.client = client;
    order.discount = changes.discount;
    order.payment_method = changes.payment_method;
    order.total = order.subtotal.apply_discount(changes.discount);

    Ok(order.clone())
}

/// Deletes a same-day order, returning each line's quantity to stock.
///
/// Lines whose product has since left the catalog are skipped. The
/// order's number is never handed out again.
pub fn delete_same_day(
    state: &mut ShopState,
    number: OrderNumber,
    today: NaiveDate,
) -> CoreResult<Order> {
    let position = state
        .sales
        .iter()
        .position(|order| order.number == number)
        .ok_or(CoreError::OrderNotFound(number))?;

    let placed_on = state.sales[position].placed_on();
    if placed_on != today {
        return Err(CoreError::EditWindowClosed { number, placed_on });
    }

    let order = state.sales.remove(position);
    for item in &order.items {
        if let Some(product) = find_product_mut(&mut state.products, &item.code) {
            product.quantity += item.quantity;
        }
    }

    Ok(order)
}

// =============================================================================
// Unit Tests
// =============================================================================
