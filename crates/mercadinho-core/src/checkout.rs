//! # Checkout
//!
//! Turns the open cart into a ledger entry.
//!
//! ## Commit Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  commit(state, request, now)                                            │
//! │                                                                         │
//! │  1. payment method present?      ── no ──► MissingPaymentMethod        │
//! │  2. cart has lines?              ── no ──► EmptyCart                   │
//! │  3. totals (canonical cart math)                                        │
//! │  4. cash covers total?           ── no ──► InsufficientCash            │
//! │  5. client name valid?           ── no ──► Validation                  │
//! │  6. order number free?           ── no ──► DuplicateOrderNumber        │
//! │  ──────────── every check passed; only now does state change ────────── │
//! │  7. append order, bump counter, reset cart (stock stays deducted)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed commit leaves the state byte-for-byte as it found it. There
//! are no partial commits.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::cart::totals;
use crate::error::{CoreError, CoreResult};
use crate::ledger;
use crate::money::Money;
use crate::types::{truncate_to_minute, DiscountRate, Order, OrderNumber, PaymentMethod, ShopState};
use crate::validation::validate_client_name;
use crate::DEFAULT_CLIENT_NAME;

/// Everything the till hands over to finalize a sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Selected payment method; `None` means the operator skipped the
    /// selector.
    pub payment: Option<PaymentMethod>,

    /// Amount handed over for cash sales. Ignored for other methods;
    /// absent counts as zero.
    pub cash_tendered: Option<Money>,

    /// Customer name; blank or absent falls back to the walk-in default.
    pub client: Option<String>,
}

/// Commits the open cart as a new order.
///
/// On success the order is appended to the ledger, the counter advances,
/// and the cart resets (lines and discount). The stock deducted when the
/// lines were added stays deducted: the reservation becomes the sale.
pub fn commit(
    state: &mut ShopState,
    request: CheckoutRequest,
    now: NaiveDateTime,
) -> CoreResult<Order> {
    let payment_method = request.payment.ok_or(CoreError::MissingPaymentMethod)?;

    if state.cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let totals = totals(&state.cart);

    let change = if payment_method == PaymentMethod::Cash {
        let tendered = request.cash_tendered.unwrap_or_else(Money::zero);
        if tendered < totals.total {
            return Err(CoreError::InsufficientCash {
                total: totals.total,
                tendered,
            });
        }
        tendered - totals.total
    } else {
        Money::zero()
    };

    let client = match request.client.as_deref() {
        Some(text) => {
            let trimmed = validate_client_name(text)?;
            if trimmed.is_empty() {
                DEFAULT_CLIENT_NAME.to_string()
            } else {
                trimmed
            }
        }
        None => DEFAULT_CLIENT_NAME.to_string(),
    };

    let number = OrderNumber::new(state.last_order_number + 1);
    let order = Order {
        number,
        items: state.cart.items.clone(),
        subtotal: totals.subtotal,
        discount: state.cart.discount,
        total: totals.total,
        payment_method,
        change,
        placed_at: truncate_to_minute(now),
        client,
    };

    // Last fallible step; the ledger rejects a taken number before
    // anything else has moved.
    ledger::append(&mut state.sales, order.clone())?;

    state.last_order_number = number.seq();
    state.cart.items.clear();
    state.cart.discount = DiscountRate::zero();

    Ok(order)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{add_item, apply_discount};
    use crate::quantity::Quantity;
    use crate::types::{Product, Unit};
    use chrono::NaiveDate;

    fn state_with_stock() -> ShopState {
        ShopState {
            products: vec![Product {
                code: "ALI0001".to_string(),
                name: "Arroz 5kg".to_string(),
                price: Money::from_centavos(1000),
                quantity: Quantity::from_units(5),
                unit: Unit::Unit,
                category: "Alimentos".to_string(),
                image: None,
            }],
            ..ShopState::default()
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(12, 30, 45)
            .unwrap()
    }

    fn cash(amount_centavos: i64) -> CheckoutRequest {
        CheckoutRequest {
            payment: Some(PaymentMethod::Cash),
            cash_tendered: Some(Money::from_centavos(amount_centavos)),
            client: None,
        }
    }

    #[test]
    fn test_cash_sale_end_to_end() {
        let mut state = state_with_stock();
        add_item(
            &mut state.products,
            &mut state.cart,
            "ALI0001",
            Quantity::from_units(3),
        )
        .unwrap();

        let order = commit(&mut state, cash(5000), noon()).unwrap();

        assert_eq!(order.number.to_string(), "PED000001");
        assert_eq!(order.subtotal, Money::from_centavos(3000));
        assert_eq!(order.total, Money::from_centavos(3000));
        assert_eq!(order.change, Money::from_centavos(2000));
        assert_eq!(order.client, "Consumidor Final");
        assert_eq!(order.placed_at.format("%H:%M:%S").to_string(), "12:30:00");

        assert_eq!(state.products[0].quantity, Quantity::from_units(2));
        assert!(state.cart.is_empty());
        assert!(state.cart.discount.is_zero());
        assert_eq!(state.last_order_number, 1);
        assert_eq!(state.sales.len(), 1);
    }

    #[test]
    fn test_discount_applies_at_commit() {
        let mut state = state_with_stock();
        add_item(
            &mut state.products,
            &mut state.cart,
            "ALI0001",
            Quantity::from_units(3),
        )
        .unwrap();
        apply_discount(&mut state.cart, DiscountRate::from_bps(1000));

        let order = commit(
            &mut state,
            CheckoutRequest {
                payment: Some(PaymentMethod::Pix),
                ..CheckoutRequest::default()
            },
            noon(),
        )
        .unwrap();

        assert_eq!(order.subtotal, Money::from_centavos(3000));
        assert_eq!(order.total, Money::from_centavos(2700));
        assert_eq!(order.discount, DiscountRate::from_bps(1000));
        assert!(order.change.is_zero());
    }

    #[test]
    fn test_missing_method_checked_before_empty_cart() {
        let mut state = state_with_stock();

        let result = commit(&mut state, CheckoutRequest::default(), noon());
        assert!(matches!(result, Err(CoreError::MissingPaymentMethod)));

        let result = commit(
            &mut state,
            CheckoutRequest {
                payment: Some(PaymentMethod::Debit),
                ..CheckoutRequest::default()
            },
            noon(),
        );
        assert!(matches!(result, Err(CoreError::EmptyCart)));
    }

    #[test]
    fn test_insufficient_cash_leaves_state_untouched() {
        let mut state = state_with_stock();
        add_item(
            &mut state.products,
            &mut state.cart,
            "ALI0001",
            Quantity::from_units(3),
        )
        .unwrap();
        let before_products = state.products.clone();
        let before_cart = state.cart.clone();

        let result = commit(&mut state, cash(2999), noon());
        assert!(matches!(
            result,
            Err(CoreError::InsufficientCash { total, tendered })
                if total == Money::from_centavos(3000) && tendered == Money::from_centavos(2999)
        ));

        // No cash amount at all behaves like zero.
        let result = commit(
            &mut state,
            CheckoutRequest {
                payment: Some(PaymentMethod::Cash),
                ..CheckoutRequest::default()
            },
            noon(),
        );
        assert!(matches!(result, Err(CoreError::InsufficientCash { .. })));

        assert_eq!(state.products, before_products);
        assert_eq!(state.cart, before_cart);
        assert_eq!(state.last_order_number, 0);
        assert!(state.sales.is_empty());
    }

    #[test]
    fn test_consecutive_commits_number_sequentially() {
        let mut state = state_with_stock();

        for expected in ["PED000001", "PED000002"] {
            add_item(
                &mut state.products,
                &mut state.cart,
                "ALI0001",
                Quantity::from_units(1),
            )
            .unwrap();
            let order = commit(&mut state, cash(1000), noon()).unwrap();
            assert_eq!(order.number.to_string(), expected);
        }
        assert_eq!(state.last_order_number, 2);
    }

    #[test]
    fn test_client_name_defaults_and_trims() {
        let mut state = state_with_stock();
        add_item(
            &mut state.products,
            &mut state.cart,
            "ALI0001",
            Quantity::from_units(1),
        )
        .unwrap();

        let order = commit(
            &mut state,
            CheckoutRequest {
                payment: Some(PaymentMethod::Pix),
                client: Some("  Maria Silva  ".to_string()),
                ..CheckoutRequest::default()
            },
            noon(),
        )
        .unwrap();
        assert_eq!(order.client, "Maria Silva");

        add_item(
            &mut state.products,
            &mut state.cart,
            "ALI0001",
            Quantity::from_units(1),
        )
        .unwrap();
        let order = commit(
            &mut state,
            CheckoutRequest {
                payment: Some(PaymentMethod::Pix),
                client: Some("   ".to_string()),
                ..CheckoutRequest::default()
            },
            noon(),
        )
        .unwrap();
        assert_eq!(order.client, "Consumidor Final");
    }

    #[test]
    fn test_non_cash_ignores_tendered_amount() {
        let mut state = state_with_stock();
        add_item(
            &mut state.products,
            &mut state.cart,
            "ALI0001",
            Quantity::from_units(1),
        )
        .unwrap();

        let order = commit(
            &mut state,
            CheckoutRequest {
                payment: Some(PaymentMethod::Credit),
                cash_tendered: Some(Money::from_centavos(10000)),
                client: None,
            },
            noon(),
        )
        .unwrap();

        assert!(order.change.is_zero());
    }
}
