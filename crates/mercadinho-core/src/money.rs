//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many retail systems:                                                │
//! │    R$ 10,00 / 3 = R$ 3,33 (×3 = R$ 9,99)  → Lost R$ 0,01!              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    1000 centavos / 3 = 333 centavos (×3 = 999 centavos)                │
//! │    We KNOW we lost 1 centavo, and handle it explicitly                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mercadinho_core::money::Money;
//!
//! // Create from centavos (preferred)
//! let price = Money::from_centavos(1099); // R$ 10,99
//!
//! // Arithmetic operations
//! let doubled = price * 2;                       // R$ 21,98
//! let total = price + Money::from_centavos(500); // R$ 15,99
//!
//! // Parse from pt-BR user input
//! let cash: Money = "50,00".parse().unwrap();
//! assert_eq!(cash.centavos(), 5000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::quantity::Quantity;
use crate::types::DiscountRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in centavos (hundredths of a real).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values (oversized discounts, refunds)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support; persists as the bare centavo count
///
/// ## Where Money Flows
/// ```text
/// Product.price ──► CartItem.price ──► line total (price × quantity)
///                                            │
///            Cart subtotal ◄────────────── Σ lines
///                 │
///                 ▼
///            discount applied ──► Order.total ──► change calculation
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use mercadinho_core::money::Money;
    ///
    /// let price = Money::from_centavos(1099); // Represents R$ 10,99
    /// assert_eq!(price.centavos(), 1099);
    /// ```
    #[inline]
    pub const fn from_centavos(centavos: i64) -> Self {
        Money(centavos)
    }

    /// Creates a Money value from whole reais.
    ///
    /// ## Example
    /// ```rust
    /// use mercadinho_core::money::Money;
    ///
    /// let bill = Money::from_reais(50); // R$ 50,00
    /// assert_eq!(bill.centavos(), 5000);
    /// ```
    #[inline]
    pub const fn from_reais(reais: i64) -> Self {
        Money(reais * 100)
    }

    /// Returns the value in centavos (smallest currency unit).
    #[inline]
    pub const fn centavos(&self) -> i64 {
        self.0
    }

    /// Returns the whole-real portion.
    ///
    /// ## Example
    /// ```rust
    /// use mercadinho_core::money::Money;
    ///
    /// assert_eq!(Money::from_centavos(1099).reais(), 10);
    /// assert_eq!(Money::from_centavos(-550).reais(), -5);
    /// ```
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn centavos_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies a per-unit (or per-kg) price by a quantity.
    ///
    /// Quantity is fixed-point thousandths, so the product is scaled back
    /// down by 1000 with half-up rounding at the centavo.
    ///
    /// ## Example
    /// ```rust
    /// use mercadinho_core::money::Money;
    /// use mercadinho_core::quantity::Quantity;
    ///
    /// let per_kg = Money::from_centavos(999); // R$ 9,99 / kg
    /// let weight = Quantity::from_thousandths(355); // 0,355 kg
    /// assert_eq!(per_kg.multiply_quantity(weight).centavos(), 355);
    /// ```
    pub fn multiply_quantity(&self, qty: Quantity) -> Money {
        // i128 to prevent overflow on large amounts
        let raw = self.0 as i128 * qty.thousandths() as i128;
        Money(((raw + 500) / 1000) as i64)
    }

    /// Returns the discount amount for this value at the given rate.
    ///
    /// ## Implementation
    /// Integer math with half-up rounding: `(amount × bps + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use mercadinho_core::money::Money;
    /// use mercadinho_core::types::DiscountRate;
    ///
    /// let subtotal = Money::from_centavos(3000); // R$ 30,00
    /// let rate = DiscountRate::from_bps(1000);   // 10%
    /// assert_eq!(subtotal.discount_amount(rate).centavos(), 300);
    /// ```
    pub fn discount_amount(&self, rate: DiscountRate) -> Money {
        let amount = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(amount as i64)
    }

    /// Applies a percentage discount and returns the remaining amount.
    ///
    /// Rates above 100% are legal and produce negative results; the
    /// checkout rules deliberately leave the discount unbounded.
    ///
    /// ## Example
    /// ```rust
    /// use mercadinho_core::money::Money;
    /// use mercadinho_core::types::DiscountRate;
    ///
    /// let subtotal = Money::from_centavos(3000);
    /// let total = subtotal.apply_discount(DiscountRate::from_bps(1000));
    /// assert_eq!(total.centavos(), 2700); // R$ 27,00
    /// ```
    pub fn apply_discount(&self, rate: DiscountRate) -> Money {
        *self - self.discount_amount(rate)
    }
}

// =============================================================================
// Formatting and Parsing
// =============================================================================

/// Groups digits of a non-negative number with `.` every three places.
fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

/// Display implementation renders Brazilian currency: `R$ 1.234,56`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}R$ {},{:02}",
            sign,
            group_thousands(self.reais().abs()),
            self.centavos_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Parses pt-BR money text: `10`, `10,50`, `1.234,56`, `R$ 5,00`.
///
/// A lone `.` is accepted as the decimal separator as well (`10.50`),
/// since numeric inputs produce that form. At most two fraction digits.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let mut text = input.trim();
        if let Some(rest) = text.strip_prefix("R$") {
            text = rest.trim_start();
        }
        let negative = if let Some(rest) = text.strip_prefix('-') {
            text = rest;
            true
        } else {
            false
        };
        if text.is_empty() {
            return Err(invalid("empty amount"));
        }

        // Normalize separators: with both present, '.' groups and ',' is the
        // decimal point. With only one present, it is the decimal point.
        let normalized = if text.contains(',') {
            if text.matches(',').count() > 1 {
                return Err(invalid("more than one decimal separator"));
            }
            text.replace('.', "").replace(',', ".")
        } else {
            if text.matches('.').count() > 1 {
                return Err(invalid("more than one decimal separator"));
            }
            text.to_string()
        };

        let (int_part, frac_part) = match normalized.split_once('.') {
            Some((i, f)) => (i, f),
            None => (normalized.as_str(), ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("empty amount"));
        }
        if frac_part.len() > 2 {
            return Err(invalid("more than two decimal places"));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("not a number"));
        }

        let reais: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid("number too large"))?
        };
        let centavos: i64 = if frac_part.is_empty() {
            0
        } else {
            // Pad "5" to "50" so ,5 means 50 centavos
            format!("{:0<2}", frac_part)
                .parse()
                .map_err(|_| invalid("not a number"))?
        };

        let total = reais
            .checked_mul(100)
            .and_then(|r| r.checked_add(centavos))
            .ok_or_else(|| invalid("number too large"))?;
        Ok(Money(if negative { -total } else { total }))
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (whole-unit quantities, goal math).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
