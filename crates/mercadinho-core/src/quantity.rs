//! # Quantity Module
//!
//! Fixed-point quantities for goods sold by unit or by weight.
//!
//! ## Why Thousandths?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A mini-market sells two kinds of goods:                                │
//! │                                                                         │
//! │    by unit:   3 bottles, 12 eggs          → whole numbers               │
//! │    by weight: 0,355 kg of tomatoes        → three decimal places        │
//! │                                                                         │
//! │  One i64 in thousandths covers both exactly:                            │
//! │    3 units   = 3000                                                     │
//! │    0,355 kg  =  355                                                     │
//! │                                                                         │
//! │  Same rationale as Money: no floats anywhere near stock math.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scale prices by these with [`Money::multiply_quantity`], which divides
//! the product back down by 1000.
//!
//! [`Money::multiply_quantity`]: crate::money::Money::multiply_quantity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::types::Unit;

// =============================================================================
// Quantity Type
// =============================================================================

/// A stock or sale quantity in thousandths of the sale unit.
///
/// Signed so that stock arithmetic can detect underflow instead of
/// wrapping; business rules keep persisted values non-negative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from whole units.
    ///
    /// ## Example
    /// ```rust
    /// use mercadinho_core::quantity::Quantity;
    ///
    /// let three = Quantity::from_units(3);
    /// assert_eq!(three.thousandths(), 3000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * 1000)
    }

    /// Creates a quantity from thousandths (grams for kg goods).
    #[inline]
    pub const fn from_thousandths(thousandths: i64) -> Self {
        Quantity(thousandths)
    }

    /// Returns the raw thousandths count.
    #[inline]
    pub const fn thousandths(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit part, truncated toward zero.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 1000
    }

    /// Returns zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    /// Checks if the quantity is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the quantity is greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the quantity is less than zero.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// True when the quantity is an exact number of whole units.
    #[inline]
    pub const fn is_whole(&self) -> bool {
        self.0 % 1000 == 0
    }

    /// Truncates toward zero to a whole number of units.
    ///
    /// Goods sold by unit cannot be sold fractionally; a request for
    /// `2,9` units becomes `2`.
    ///
    /// ## Example
    /// ```rust
    /// use mercadinho_core::quantity::Quantity;
    ///
    /// let requested = Quantity::from_thousandths(2900);
    /// assert_eq!(requested.truncate_to_whole(), Quantity::from_units(2));
    /// ```
    #[inline]
    pub const fn truncate_to_whole(&self) -> Self {
        Quantity((self.0 / 1000) * 1000)
    }

    /// Clamps negative values up to zero.
    ///
    /// Stock edits never persist below zero.
    #[inline]
    pub fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Quantity(0)
        } else {
            *self
        }
    }

    /// Renders the quantity the way the shelf labels do: three decimal
    /// places for weight (`0,355`), none for unit goods (`3`).
    pub fn format_br(&self, unit: Unit) -> String {
        match unit {
            Unit::Kg => format!(
                "{}{},{:03}",
                if self.0 < 0 { "-" } else { "" },
                (self.0 / 1000).abs(),
                (self.0 % 1000).abs()
            ),
            Unit::Unit => self.units().to_string(),
        }
    }
}

// =============================================================================
// Formatting and Parsing
// =============================================================================

/// Compact display for messages and logs: `3`, `0,5`, `2,955`.
///
/// Trailing zeros in the fraction are trimmed; use [`Quantity::format_br`]
/// for unit-aware rendering.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let whole = (self.0 / 1000).abs();
        let frac = (self.0 % 1000).abs();
        if frac == 0 {
            write!(f, "{}{}", sign, whole)
        } else {
            let digits = format!("{:03}", frac);
            write!(f, "{}{},{}", sign, whole, digits.trim_end_matches('0'))
        }
    }
}

/// Parses pt-BR quantity text: `3`, `0,5`, `1,250`. A `.` decimal
/// separator is accepted too. At most three fraction digits.
impl FromStr for Quantity {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: reason.to_string(),
        };

        let mut text = input.trim();
        let negative = if let Some(rest) = text.strip_prefix('-') {
            text = rest;
            true
        } else {
            false
        };
        if text.is_empty() {
            return Err(invalid("empty quantity"));
        }

        let normalized = text.replace(',', ".");
        if normalized.matches('.').count() > 1 {
            return Err(invalid("more than one decimal separator"));
        }
        let (int_part, frac_part) = match normalized.split_once('.') {
            Some((i, f)) => (i, f),
            None => (normalized.as_str(), ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid("empty quantity"));
        }
        if frac_part.len() > 3 {
            return Err(invalid("more than three decimal places"));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("not a number"));
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid("number too large"))?
        };
        let frac: i64 = if frac_part.is_empty() {
            0
        } else {
            // Pad "5" to "500" so ,5 means half a unit
            format!("{:0<3}", frac_part)
                .parse()
                .map_err(|_| invalid("not a number"))?
        };

        let total = whole
            .checked_mul(1000)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(|| invalid("number too large"))?;
        Ok(Quantity(if negative { -total } else { total }))
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl std::iter::Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Quantity::from_units(3).thousandths(), 3000);
        assert_eq!(Quantity::from_thousandths(355).units(), 0);
        assert_eq!(Quantity::from_thousandths(2900).units(), 2);
    }

    #[test]
    fn test_parse_br_forms() {
        assert_eq!("3".parse::<Quantity>().unwrap(), Quantity::from_units(3));
        assert_eq!(
            "0,5".parse::<Quantity>().unwrap(),
            Quantity::from_thousandths(500)
        );
        assert_eq!(
            "0.5".parse::<Quantity>().unwrap(),
            Quantity::from_thousandths(500)
        );
        assert_eq!(
            "1,250".parse::<Quantity>().unwrap(),
            Quantity::from_thousandths(1250)
        );
        assert_eq!(
            ",1".parse::<Quantity>().unwrap(),
            Quantity::from_thousandths(100)
        );
        assert_eq!(
            "-2".parse::<Quantity>().unwrap(),
            Quantity::from_units(-2)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Quantity>().is_err());
        assert!("abc".parse::<Quantity>().is_err());
        assert!("1,2,3".parse::<Quantity>().is_err());
        assert!("0,2500".parse::<Quantity>().is_err());
    }

    #[test]
    fn test_truncate_to_whole() {
        assert_eq!(
            Quantity::from_thousandths(2900).truncate_to_whole(),
            Quantity::from_units(2)
        );
        assert_eq!(
            Quantity::from_thousandths(999).truncate_to_whole(),
            Quantity::zero()
        );
        assert_eq!(
            Quantity::from_units(5).truncate_to_whole(),
            Quantity::from_units(5)
        );
    }

    #[test]
    fn test_format_br() {
        assert_eq!(Quantity::from_units(3).format_br(Unit::Unit), "3");
        assert_eq!(Quantity::from_thousandths(355).format_br(Unit::Kg), "0,355");
        assert_eq!(Quantity::from_units(2).format_br(Unit::Kg), "2,000");
    }

    #[test]
    fn test_display_trims_zeros() {
        assert_eq!(Quantity::from_units(3).to_string(), "3");
        assert_eq!(Quantity::from_thousandths(500).to_string(), "0,5");
        assert_eq!(Quantity::from_thousandths(2955).to_string(), "2,955");
        assert_eq!(Quantity::from_thousandths(-500).to_string(), "-0,5");
    }

    #[test]
    fn test_arithmetic_and_clamp() {
        let five = Quantity::from_units(5);
        let three = Quantity::from_units(3);
        assert_eq!(five - three, Quantity::from_units(2));
        assert_eq!((three - five).clamp_non_negative(), Quantity::zero());

        let total: Quantity = [five, three].into_iter().sum();
        assert_eq!(total, Quantity::from_units(8));
    }
}
