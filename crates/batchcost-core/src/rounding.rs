//! # Rounding Rules
//!
//! Turns a raw computed price into a market-ready number.
//!
//! ## Catalog
//! ```text
//! ┌──────────┬───────────────────┬───────────┬──────────┐
//! │ id       │ name              │ increment │ minus 1  │
//! ├──────────┼───────────────────┼───────────┼──────────┤
//! │ round100 │ Round to 100      │       100 │    no    │
//! │ round250 │ Round to 250      │       250 │    no    │
//! │ round500 │ Round to 500      │       500 │    no    │
//! │ round1k  │ Round to 1,000    │      1000 │    no    │
//! │ price99  │ Price Ending in 99│       100 │   yes    │
//! │ noround  │ No Rounding       │         1 │    no    │
//! └──────────┴───────────────────┴───────────┴──────────┘
//! ```
//!
//! Bucketed rules compute `round(price / increment) × increment`, then
//! subtract 1 when flagged. `noround` rounds to the nearest whole unit.
//! "Nearest" is half away from zero throughout: 1250 / 500 = 2.5 → 3.
//!
//! ## Unknown ids
//! [`apply_rule`] returns the price unchanged for an id that is not in the
//! catalog. The calculator's fixed-markup path falls back to `round100`
//! instead (see [`crate::calculator::BatchCostCalculator::apply_rounding_rule`]).
//! Both behaviors are relied upon by callers.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::debug;

use crate::money::Money;

/// Rule used when a draft does not name one.
pub const DEFAULT_RULE_ID: &str = "round100";

// =============================================================================
// Rounding Rule
// =============================================================================

/// A named rounding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundingRule {
    pub id: &'static str,
    pub name: &'static str,
    /// Bucket size. 1 means "nearest whole unit".
    pub increment: u32,
    /// Psychological pricing: 1300 becomes 1299.
    pub subtract_one: bool,
    pub description: &'static str,
}

impl RoundingRule {
    /// Bucket size as a decimal.
    #[inline]
    pub fn increment(&self) -> Decimal {
        Decimal::from(self.increment)
    }

    /// Applies this rule. `None` only when the price sits at the edge of the
    /// decimal range.
    pub fn checked_apply(&self, price: Money) -> Option<Money> {
        let amount = price.amount();
        let rounded = if self.increment == 1 {
            round_half_away(amount)
        } else {
            let increment = self.increment();
            round_half_away(amount.checked_div(increment)?).checked_mul(increment)?
        };

        let rounded = if self.subtract_one {
            rounded.checked_sub(Decimal::ONE)?
        } else {
            rounded
        };
        Some(Money::new(rounded))
    }

    /// Applies this rule; a price at the edge of the decimal range comes back
    /// unchanged.
    pub fn apply(&self, price: Money) -> Money {
        self.checked_apply(price).unwrap_or(price)
    }
}

// =============================================================================
// Registry
// =============================================================================

static RULES: [RoundingRule; 6] = [
    RoundingRule {
        id: "round100",
        name: "Round to 100",
        increment: 100,
        subtract_one: false,
        description: "Standard rounding to nearest 100",
    },
    RoundingRule {
        id: "round250",
        name: "Round to 250",
        increment: 250,
        subtract_one: false,
        description: "Round to nearest 250",
    },
    RoundingRule {
        id: "round500",
        name: "Round to 500",
        increment: 500,
        subtract_one: false,
        description: "Round to nearest 500",
    },
    RoundingRule {
        id: "round1k",
        name: "Round to 1,000",
        increment: 1000,
        subtract_one: false,
        description: "Round to nearest 1,000",
    },
    RoundingRule {
        id: "price99",
        name: "Price Ending in 99",
        increment: 100,
        subtract_one: true,
        description: "Psychological pricing: X00 - 1",
    },
    RoundingRule {
        id: "noround",
        name: "No Rounding",
        increment: 1,
        subtract_one: false,
        description: "Keep the calculated price, rounded to a whole unit",
    },
];

/// All rules, in catalog order. Used to populate rule pickers.
pub fn rules() -> &'static [RoundingRule] {
    &RULES
}

/// Looks up a rule by exact id.
pub fn rule(id: &str) -> Option<&'static RoundingRule> {
    RULES.iter().find(|r| r.id == id)
}

/// Applies the rule named `id`. Unknown ids leave the price unchanged.
///
/// ## Example
/// ```rust
/// use batchcost_core::money::Money;
/// use batchcost_core::rounding::apply_rule;
///
/// assert_eq!(apply_rule(Money::from_major(1234), "round100"), Money::from_major(1200));
/// assert_eq!(apply_rule(Money::from_major(1234), "bogus"), Money::from_major(1234));
/// ```
pub fn apply_rule(price: Money, id: &str) -> Money {
    match rule(id) {
        Some(r) => r.apply(price),
        None => {
            debug!(rule = id, "Unknown rounding rule, price left unchanged");
            price
        }
    }
}

// =============================================================================
// Ad-hoc Helpers
// =============================================================================

/// Rounds to the nearest multiple of `increment`. A non-positive increment
/// rounds to the nearest whole unit. `None` when the quotient or the
/// result leaves the decimal range (a tiny increment on a large price).
pub fn round_to(price: Money, increment: Decimal) -> Option<Money> {
    if increment <= Decimal::ZERO {
        return Some(Money::new(round_half_away(price.amount())));
    }

    round_half_away(price.amount().checked_div(increment)?)
        .checked_mul(increment)
        .map(Money::new)
}

/// A price ending in 99 at or just above the input.
///
/// If rounding to the nearest hundred goes up, that hundred minus one is
/// used (1260 → 1299). Otherwise the next hundred up is taken
/// (1234 → 1299, 1300 → 1399). `None` at the top of the decimal range.
pub fn psychological_price(price: Money) -> Option<Money> {
    let amount = price.amount();
    let hundred = Decimal::ONE_HUNDRED;
    let hundreds = amount.checked_div(hundred)?;
    let rounded = round_half_away(hundreds).checked_mul(hundred)?;

    let target = if rounded > amount {
        rounded
    } else {
        round_half_away(hundreds.checked_add(Decimal::ONE)?).checked_mul(hundred)?
    };
    target.checked_sub(Decimal::ONE).map(Money::new)
}

/// Nearest integer, ties away from zero (2.5 → 3, −2.5 → −3).
pub(crate) fn round_half_away(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Unit Tests
// =============================================================================
