//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A batch sums many fractional quantities × prices:                     │
//! │    0.8 kg × 29000 + 3 kg × 12500 + ...                                 │
//! │    drift accumulates per line, then gets divided by sellable units     │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                   │
//! │    base-10 mantissa, exact for every decimal literal we accept         │
//! │    Σ(price × qty) is exact; only division introduces rounding         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Integer cents (the usual POS trick) don't work here: unit costs are
//! fractions of a currency unit (65000 / 90 = 722.22...) and the target-margin
//! strategy divides by `1 - margin`.
//!
//! ## Usage
//! ```rust
//! use batchcost_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let price = Money::from_major(12500);
//! let cost = price * Decimal::new(15, 1); // × 1.5 kg
//! assert_eq!(cost, Money::from_major(18750));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the (single, implicit) business currency.
///
/// ## Design Decisions
/// - **Decimal (signed)**: allows negative values (the competitive strategy can
///   go below zero for tiny prices)
/// - **Single field tuple struct**: zero-cost wrapper, keeps money and plain
///   quantities from being mixed up by accident
/// - **Serde as string**: `"1538.46"` survives JSON round-trips exactly
///
/// ## Where Money is Used
/// ```text
/// LineItem.price_per_unit ──► ingredient_cost ─┐
/// oil / energy / labor / overhead ─────────────┼─► total_batch_cost
/// packaging_per_unit × sellable_units ─────────┘          │
///                                                         ▼
///                                       unit_cost ──► suggested_price ──► price_including_vat
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Zero money value.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a whole-unit amount.
    ///
    /// ## Example
    /// ```rust
    /// use batchcost_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(Money::from_major(18000).amount(), Decimal::from(18000));
    /// ```
    #[inline]
    pub fn from_major(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money::ZERO
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Rounds to `dp` decimal places, half away from zero.
    pub fn round_dp(&self, dp: u32) -> Self {
        Money(self.0.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
    }

    // =========================================================================
    // Checked Arithmetic
    // =========================================================================
    // The calculator must never panic once validation has passed. These return
    // `None` on overflow so the caller can record a ComputationError instead.

    /// Checked addition.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Checked subtraction.
    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Checked multiplication by a quantity or factor.
    #[inline]
    pub fn checked_mul(self, factor: Decimal) -> Option<Money> {
        self.0.checked_mul(factor).map(Money)
    }

    /// Checked division by a quantity or count. `None` on zero divisor.
    #[inline]
    pub fn checked_div(self, divisor: Decimal) -> Option<Money> {
        self.0.checked_div(divisor).map(Money)
    }

    /// Ratio of two amounts, e.g. `(price - cost) / price` for margins.
    /// `None` if `other` is zero or the quotient overflows.
    #[inline]
    pub fn checked_ratio(self, other: Money) -> Option<Decimal> {
        self.0.checked_div(other.0)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Two decimal places, half away from zero. Debug/CLI display only.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shown = self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        shown.rescale(2);
        write!(f, "{}", shown)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Multiplication by a quantity, rate, or `(1 + fraction)` factor.
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Decimal) -> Self {
        Money(self.0 * factor)
    }
}

/// Division by a count or `(1 - fraction)` denominator.
impl Div<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn div(self, divisor: Decimal) -> Self {
        Money(self.0 / divisor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display() {
        assert_eq!(Money::new(dec!(1538.461538)).to_string(), "1538.46");
        assert_eq!(Money::from_major(500).to_string(), "500.00");
        assert_eq!(Money::new(dec!(-5.5)).to_string(), "-5.50");
        assert_eq!(Money::new(dec!(0.005)).to_string(), "0.01");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_major(1000);
        let b = Money::from_major(500);

        assert_eq!(a + b, Money::from_major(1500));
        assert_eq!(a - b, Money::from_major(500));
        assert_eq!(a * dec!(1.15), Money::from_major(1150));
        assert_eq!(a / dec!(4), Money::from_major(250));
    }

    #[test]
    fn test_decimal_sum_is_exact() {
        // 0.1 + 0.2 in f64 is 0.30000000000000004
        let total: Money = [Money::new(dec!(0.1)), Money::new(dec!(0.2))].into_iter().sum();
        assert_eq!(total, Money::new(dec!(0.3)));
    }

    #[test]
    fn test_checked_overflow() {
        let huge = Money::new(Decimal::MAX);
        assert!(huge.checked_add(Money::from_major(1)).is_none());
        assert!(huge.checked_mul(dec!(2)).is_none());
        assert!(Money::from_major(1).checked_div(Decimal::ZERO).is_none());
        assert_eq!(
            Money::from_major(1000).checked_ratio(Money::from_major(2000)),
            Some(dec!(0.5))
        );
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_major(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs(), Money::from_major(100));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Money::new(dec!(1150.00))).unwrap();
        assert_eq!(json, "\"1150.00\"");
        let back: Money = serde_json::from_str("\"722.5\"").unwrap();
        assert_eq!(back, Money::new(dec!(722.5)));
    }
}
