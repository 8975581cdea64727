//! # Domain Types
//!
//! Core domain types used throughout Mercadinho POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code (ALI0001) │──►│  snapshot of    │──►│  number (PED…)  │       │
//! │  │  price, stock   │   │  code/name/     │   │  items, totals  │       │
//! │  │  unit, category │   │  price/unit     │   │  payment, date  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountRate   │   │      Unit       │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Unit           │   │  Credit, Debit  │       │
//! │  │  1000 = 10%     │   │  Kg             │   │  Pix, Cash,     │       │
//! │  └─────────────────┘   └─────────────────┘   │  FoodVoucher    │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Cart lines copy the product's code, name, price and unit at add time.
//! Later catalog edits never rewrite open carts or the sales ledger.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Discount Rate
// =============================================================================

/// A percentage discount in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so `2,5%` is exactly 250 with no
/// float in sight. The type has no upper bound: rates above 100% are
/// accepted and drive totals negative, which checkout deliberately
/// allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a discount rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

/// Renders `10%` or `2,5%` (trailing zeros trimmed).
impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else {
            let digits = format!("{:02}", frac);
            write!(f, "{},{}%", whole, digits.trim_end_matches('0'))
        }
    }
}

/// Parses pt-BR percent text: `10`, `2,5`, `12.75`. At most two fraction
/// digits; negatives are rejected (the type cannot hold them).
impl FromStr for DiscountRate {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "discount".to_string(),
            reason: reason.to_string(),
        };

        let text = input.trim().trim_end_matches('%').trim();
        if text.starts_with('-') {
            return Err(ValidationError::MustNotBeNegative {
                field: "discount".to_string(),
            });
        }
        if text.is_empty() {
            return Err(invalid("empty discount"));
        }

        let normalized = text.replace(',', ".");
        if normalized.matches('.').count() > 1 {
            return Err(invalid("more than one decimal separator"));
        }
        let (int_part, frac_part) = match normalized.split_once('.') {
            Some((i, f)) => (i, f),
            None => (normalized.as_str(), ""),
        };
        if frac_part.len() > 2 {
            return Err(invalid("more than two decimal places"));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("not a number"));
        }

        let whole: u32 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid("number too large"))?
        };
        let frac: u32 = if frac_part.is_empty() {
            0
        } else {
            format!("{:0<2}", frac_part)
                .parse()
                .map_err(|_| invalid("not a number"))?
        };

        whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(frac))
            .map(DiscountRate)
            .ok_or_else(|| invalid("number too large"))
    }
}

// =============================================================================
// Unit of Sale
// =============================================================================

/// How a product is measured at the till.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Sold by the piece; quantities are whole numbers.
    Unit,
    /// Sold by weight; quantities carry three decimal places.
    Kg,
}

impl Unit {
    /// True for goods sold by weight.
    #[inline]
    pub const fn is_weight(&self) -> bool {
        matches!(self, Unit::Kg)
    }
}

/// Shelf-label abbreviation: `un` / `kg`.
impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Unit => write!(f, "un"),
            Unit::Kg => write!(f, "kg"),
        }
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::Unit
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// Accepted payment methods.
///
/// Serialized (and displayed) under the customer-facing names the ledger
/// has always stored; `FromStr` takes the short wire ids used by selects
/// and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Cartão de Crédito")]
    Credit,
    #[serde(rename = "Cartão de Débito")]
    Debit,
    #[serde(rename = "PIX")]
    Pix,
    #[serde(rename = "Dinheiro")]
    Cash,
    #[serde(rename = "Vale-alimentação")]
    FoodVoucher,
}

impl PaymentMethod {
    /// All methods, in display order.
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Credit,
        PaymentMethod::Debit,
        PaymentMethod::Pix,
        PaymentMethod::Cash,
        PaymentMethod::FoodVoucher,
    ];

    /// Short machine id: `credit`, `debit`, `pix`, `cash`, `food-voucher`.
    pub const fn id(&self) -> &'static str {
        match self {
            PaymentMethod::Credit => "credit",
            PaymentMethod::Debit => "debit",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Cash => "cash",
            PaymentMethod::FoodVoucher => "food-voucher",
        }
    }

    /// Customer-facing name, as printed on receipts.
    pub const fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Credit => "Cartão de Crédito",
            PaymentMethod::Debit => "Cartão de Débito",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::FoodVoucher => "Vale-alimentação",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "credit" => Ok(PaymentMethod::Credit),
            "debit" => Ok(PaymentMethod::Debit),
            "pix" => Ok(PaymentMethod::Pix),
            "cash" => Ok(PaymentMethod::Cash),
            "food-voucher" => Ok(PaymentMethod::FoodVoucher),
            other => Err(ValidationError::InvalidFormat {
                field: "payment method".to_string(),
                reason: format!("unknown method '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Order Number
// =============================================================================

/// Sequential order identifier, rendered `PED000042`.
///
/// Numbers come from a persistent counter and are never reused, even when
/// a same-day order is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct OrderNumber(u64);

impl OrderNumber {
    /// Wraps a raw sequence number.
    #[inline]
    pub const fn new(seq: u64) -> Self {
        OrderNumber(seq)
    }

    /// Returns the raw sequence number.
    #[inline]
    pub const fn seq(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PED{:06}", self.0)
    }
}

impl FromStr for OrderNumber {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let text = input.trim();
        let digits = text.strip_prefix("PED").unwrap_or(text);
        digits
            .parse::<u64>()
            .map(OrderNumber)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "order number".to_string(),
                reason: format!("'{}' is not an order number", input),
            })
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.to_string()
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Business identifier: category prefix + sequence (`ALI0001`).
    pub code: String,

    /// Display name shown at the till and on receipts.
    pub name: String,

    /// Price per unit (or per kg for weighed goods).
    pub price: Money,

    /// Stock on hand. Cart reservations deduct from this immediately.
    pub quantity: Quantity,

    /// How the product is measured.
    pub unit: Unit,

    /// Category name, also the source of the code prefix.
    pub category: String,

    /// Optional image reference for the till grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Product {
    /// Checks if any stock remains to sell.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.quantity.is_positive()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A line in the open cart.
///
/// Uses the snapshot pattern: price and name are frozen at add time, and
/// `quantity` is the stock reserved from the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub code: String,
    pub name: String,
    pub price: Money,
    pub unit: Unit,
    pub quantity: Quantity,
}

impl CartItem {
    /// Creates a cart line by snapshotting a product.
    pub fn from_product(product: &Product, quantity: Quantity) -> Self {
        CartItem {
            code: product.code.clone(),
            name: product.name.clone(),
            price: product.price,
            unit: product.unit,
            quantity,
        }
    }

    /// Line total: price × quantity, rounded at the centavo.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// The open cart: reserved lines plus the cart-wide discount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub discount: DiscountRate,
}

impl Cart {
    /// Checks whether the cart has no lines.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks up the line for a product code.
    pub fn find_item(&self, code: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.code == code)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A committed sale in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Sequential number (`PED000042`).
    pub number: OrderNumber,

    /// Cart lines frozen at commit time.
    pub items: Vec<CartItem>,

    /// Sum of line totals before discount.
    pub subtotal: Money,

    /// Cart-wide discount applied at commit (or set by a same-day edit).
    pub discount: DiscountRate,

    /// Subtotal minus the discount amount. May be negative for rates
    /// above 100%.
    pub total: Money,

    /// How the customer paid.
    pub payment_method: PaymentMethod,

    /// Change handed back (cash only; zero otherwise).
    pub change: Money,

    /// When the order was placed, minute precision.
    #[serde(with = "br_date_time")]
    pub placed_at: NaiveDateTime,

    /// Customer name; defaults to `Consumidor Final`.
    pub client: String,
}

impl Order {
    /// Calendar day the order was placed.
    #[inline]
    pub fn placed_on(&self) -> NaiveDate {
        self.placed_at.date()
    }

    /// Hour-of-day bucket (0-23) for the hourly sales chart.
    #[inline]
    pub fn hour(&self) -> usize {
        self.placed_at.hour() as usize
    }
}

// =============================================================================
// Shop State
// =============================================================================

/// The whole mutable POS state.
///
/// Operations take this in, mutate it, and hand it back; persistence and
/// the clock stay outside the core. A failed operation must leave the
/// state exactly as it found it.
#[derive(Debug, Clone, Default)]
pub struct ShopState {
    pub products: Vec<Product>,
    pub cart: Cart,
    pub sales: Vec<Order>,
    pub last_order_number: u64,
}

// =============================================================================
// Ledger Date Format
// =============================================================================

/// Canonical ledger timestamp format: `DD/MM/YYYY HH:mm`.
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Formats a timestamp in the ledger's canonical form.
pub fn format_br_date_time(value: NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

/// Parses a timestamp in the ledger's canonical form.
pub fn parse_br_date_time(text: &str) -> Result<NaiveDateTime, ValidationError> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_TIME_FORMAT).map_err(|e| {
        ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: e.to_string(),
        }
    })
}

/// Drops seconds and below, the precision orders are recorded at.
pub fn truncate_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_second(0)
        .and_then(|v| v.with_nanosecond(0))
        .unwrap_or(value)
}

/// Serde glue persisting timestamps as `DD/MM/YYYY HH:mm` strings.
pub mod br_date_time {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::DATE_TIME_FORMAT;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(DATE_TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&text, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
