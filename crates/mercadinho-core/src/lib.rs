//! # mercadinho-core: Pure Business Logic for Mercadinho POS
//!
//! This crate is the **heart** of the mini-market POS. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Mercadinho POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                mercadinho-pos (Service Layer)                   │   │
//! │  │     PosService ──► Receipts ──► Dashboard Refresher            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ mercadinho-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────┐     │   │
//! │  │   │ catalog  │ │   cart   │ │ checkout │ │    ledger    │     │   │
//! │  │   │ products │ │ reserve  │ │  commit  │ │ same-day fix │     │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────┘     │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────┐     │   │
//! │  │   │  money   │ │ quantity │ │analytics │ │  validation  │     │   │
//! │  │   │ centavos │ │  1/1000  │ │dashboard │ │ field rules  │     │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────┘     │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 mercadinho-db (Persistence)                     │   │
//! │  │        SQLite key/value store, migrations, state dump           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Cart, Order, PaymentMethod, ...)
//! - [`money`] - Money in integer centavos (no floating point!)
//! - [`quantity`] - Quantities in thousandths (whole units and kg weights)
//! - [`catalog`] - Product registration, codes, edits and lookups
//! - [`cart`] - Stock-reserving cart operations and the canonical totals
//! - [`checkout`] - Validate-then-mutate sale commit
//! - [`ledger`] - Order history and the same-day correction window
//! - [`analytics`] - Dashboard queries over ledger and catalog
//! - [`validation`] - Field-level rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: state and dates come in as parameters, results
//!    go out as values - same input, same output
//! 2. **No I/O**: database, network and clock access is FORBIDDEN here
//! 3. **Integer Arithmetic**: centavos for money, thousandths for
//!    quantities; rounding happens half-up at the centavo, once
//! 4. **Explicit Errors**: all failures are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use mercadinho_core::{cart, checkout, CheckoutRequest, Money, PaymentMethod, Quantity, ShopState};
//! use mercadinho_core::types::{Product, Unit};
//! use chrono::NaiveDate;
//!
//! let mut state = ShopState::default();
//! state.products.push(Product {
//!     code: "ALI0001".into(),
//!     name: "Arroz 5kg".into(),
//!     price: Money::from_centavos(1000),
//!     quantity: Quantity::from_units(5),
//!     unit: Unit::Unit,
//!     category: "Alimentos".into(),
//!     image: None,
//! });
//!
//! // Adding to the cart reserves stock immediately.
//! cart::add_item(&mut state.products, &mut state.cart, "ALI0001", Quantity::from_units(3)).unwrap();
//!
//! let now = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap().and_hms_opt(12, 30, 0).unwrap();
//! let order = checkout::commit(
//!     &mut state,
//!     CheckoutRequest {
//!         payment: Some(PaymentMethod::Cash),
//!         cash_tendered: Some(Money::from_centavos(5000)),
//!         client: None,
//!     },
//!     now,
//! )
//! .unwrap();
//!
//! assert_eq!(order.total, Money::from_centavos(3000));
//! assert_eq!(order.change, Money::from_centavos(2000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod ledger;
pub mod money;
pub mod quantity;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use mercadinho_core::Money` instead of
// `use mercadinho_core::money::Money`

pub use cart::CartTotals;
pub use checkout::CheckoutRequest;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Name recorded on a sale when no customer is given.
///
/// Every walk-in shares this name, so the "customers served" count
/// treats all anonymous sales as one customer.
pub const DEFAULT_CLIENT_NAME: &str = "Consumidor Final";

/// Stock level at or below which a product counts as running low.
pub const LOW_STOCK_THRESHOLD: Quantity = Quantity::from_units(10);

/// Extra buffer a restock suggestion adds on top of the threshold.
pub const RESTOCK_TOP_UP: Quantity = Quantity::from_units(10);

/// How many rows the dashboard rankings show (top products, low stock).
pub const DASHBOARD_TOP_N: usize = 5;

/// Monthly sales goal used until the owner sets one: R$ 100.000,00.
pub const DEFAULT_SALES_GOAL: Money = Money::from_centavos(10_000_000);
