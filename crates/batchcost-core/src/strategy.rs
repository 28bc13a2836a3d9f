//! # Pricing Strategies
//!
//! Three interchangeable ways to turn a unit cost into a suggested price.
//!
//! ## Strategy Set
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Registered Strategies                              │
//! │                                                                         │
//! │  MarkupBased          price = cost × (1 + markup)           markup 0.5 │
//! │                                                                         │
//! │  TargetMargin         price = cost / (1 − margin)    target_margin 0.35│
//! │                       margin ≥ 1 → clamped to 0.9                       │
//! │                       cost ≤ 0  → cost × 1.5                            │
//! │                                                                         │
//! │  CompetitiveRounding  base  = cost × (1 + markup)           markup 0.5 │
//! │                       r = round(base)                                   │
//! │                       r ≥ 10000 → round(r/1000)×1000 − 100              │
//! │                       r ≥  1000 → round(r/500)×500   − 100              │
//! │                       r >     0 → round(r/100)×100   − 1                │
//! │                       r ≤     0 → base unchanged                        │
//! │                                                                         │
//! │  All three: margin = (price − cost) / price, 0 when price ≤ 0          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The set is closed, so it is an enum rather than a trait object. Each
//! variant carries its own parameter struct; an absent field means "use the
//! default" and there is no way to pass a parameter a strategy does not read.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{ComputationError, CoreError};
use crate::money::Money;
use crate::rounding::round_half_away;

/// Default markup for the markup-based and competitive strategies (+50%).
pub const DEFAULT_MARKUP: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Default target margin (35% of price is profit).
pub const DEFAULT_TARGET_MARGIN: Decimal = Decimal::from_parts(35, 0, 0, false, 2);

/// Margin cap applied when a target margin of 100% or more is requested.
pub const MAX_TARGET_MARGIN: Decimal = Decimal::from_parts(9, 0, 0, false, 1);

/// Multiplier used by the target-margin strategy when it cannot back-solve.
const FALLBACK_FACTOR: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

// =============================================================================
// Strategy Parameters
// =============================================================================

/// Parameters for [`PricingStrategy::MarkupBased`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupParams {
    /// Fractional markup over unit cost. Default 0.5.
    pub markup: Option<Decimal>,
}

impl MarkupParams {
    pub fn markup(&self) -> Decimal {
        self.markup.unwrap_or(DEFAULT_MARKUP)
    }
}

/// Parameters for [`PricingStrategy::TargetMargin`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMarginParams {
    /// Desired profit as a fraction of price. Default 0.35.
    pub target_margin: Option<Decimal>,
}

impl TargetMarginParams {
    /// The requested margin, clamped to 0.9 when it is 1 or more.
    pub fn effective_margin(&self) -> Decimal {
        let margin = self.target_margin.unwrap_or(DEFAULT_TARGET_MARGIN);
        if margin >= Decimal::ONE {
            MAX_TARGET_MARGIN
        } else {
            margin
        }
    }
}

/// Parameters for [`PricingStrategy::CompetitiveRounding`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitiveParams {
    /// Markup applied before rounding. Default 0.5.
    pub markup: Option<Decimal>,
}

impl CompetitiveParams {
    pub fn markup(&self) -> Decimal {
        self.markup.unwrap_or(DEFAULT_MARKUP)
    }
}

// =============================================================================
// Strategy Kind
// =============================================================================

/// Identifies a registered strategy without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    MarkupBased,
    TargetMargin,
    CompetitiveRounding,
}

impl StrategyKind {
    /// Registration order. Comparisons and listings follow it.
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::MarkupBased,
        StrategyKind::TargetMargin,
        StrategyKind::CompetitiveRounding,
    ];

    /// Stable key used on the command line and in JSON.
    pub const fn id(&self) -> &'static str {
        match self {
            StrategyKind::MarkupBased => "markup-based",
            StrategyKind::TargetMargin => "target-margin",
            StrategyKind::CompetitiveRounding => "competitive-rounding",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            StrategyKind::MarkupBased => "Markup Based",
            StrategyKind::TargetMargin => "Target Margin",
            StrategyKind::CompetitiveRounding => "Competitive Rounding",
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            StrategyKind::MarkupBased => "Applies a fixed markup percentage to unit cost",
            StrategyKind::TargetMargin => "Calculates price to achieve a target profit margin",
            StrategyKind::CompetitiveRounding => {
                "Applies psychologically appealing prices with rounding"
            }
        }
    }

    /// This strategy with every parameter at its default.
    pub fn with_defaults(&self) -> PricingStrategy {
        match self {
            StrategyKind::MarkupBased => PricingStrategy::MarkupBased(MarkupParams::default()),
            StrategyKind::TargetMargin => {
                PricingStrategy::TargetMargin(TargetMarginParams::default())
            }
            StrategyKind::CompetitiveRounding => {
                PricingStrategy::CompetitiveRounding(CompetitiveParams::default())
            }
        }
    }

    pub fn descriptor(&self) -> StrategyDescriptor {
        StrategyDescriptor {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StrategyKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markup-based" | "markup" => Ok(StrategyKind::MarkupBased),
            "target-margin" | "margin" => Ok(StrategyKind::TargetMargin),
            "competitive-rounding" | "competitive" => Ok(StrategyKind::CompetitiveRounding),
            _ => Err(CoreError::UnknownStrategy(s.to_string())),
        }
    }
}

/// What a UI needs to list a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StrategyDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Descriptors for every registered strategy, in registration order.
pub fn available_strategies() -> Vec<StrategyDescriptor> {
    StrategyKind::ALL.iter().map(StrategyKind::descriptor).collect()
}

// =============================================================================
// Pricing Strategy
// =============================================================================

/// A strategy together with its parameters.
///
/// ## Example
/// ```rust
/// use batchcost_core::money::Money;
/// use batchcost_core::strategy::{PricingStrategy, TargetMarginParams};
///
/// let strategy = PricingStrategy::TargetMargin(TargetMarginParams::default());
/// let price = strategy.calculate_price(Money::from_major(650)).unwrap();
/// assert_eq!(price, Money::from_major(1000)); // 650 / 0.65
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum PricingStrategy {
    MarkupBased(MarkupParams),
    TargetMargin(TargetMarginParams),
    CompetitiveRounding(CompetitiveParams),
}

impl PricingStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            PricingStrategy::MarkupBased(_) => StrategyKind::MarkupBased,
            PricingStrategy::TargetMargin(_) => StrategyKind::TargetMargin,
            PricingStrategy::CompetitiveRounding(_) => StrategyKind::CompetitiveRounding,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn description(&self) -> &'static str {
        self.kind().description()
    }

    /// Suggested price for one unit costing `unit_cost`.
    ///
    /// ## Errors
    /// [`ComputationError::Overflow`] naming the strategy when the price
    /// leaves the decimal range (a huge markup, or a unit cost near
    /// `Decimal::MAX`).
    pub fn calculate_price(&self, unit_cost: Money) -> Result<Money, ComputationError> {
        let price = match self {
            PricingStrategy::MarkupBased(params) => marked_up(unit_cost, params.markup()),
            PricingStrategy::TargetMargin(params) => {
                let margin = params.effective_margin();
                if unit_cost.is_positive() && margin < Decimal::ONE {
                    Decimal::ONE
                        .checked_sub(margin)
                        .and_then(|share| unit_cost.checked_div(share))
                } else {
                    unit_cost.checked_mul(FALLBACK_FACTOR)
                }
            }
            PricingStrategy::CompetitiveRounding(params) => {
                marked_up(unit_cost, params.markup()).and_then(competitive_price)
            }
        };

        price.ok_or(ComputationError::Overflow {
            step: self.kind().id(),
        })
    }

    /// Margin implied by selling at `price`. Identical for every strategy.
    pub fn calculate_margin(&self, unit_cost: Money, price: Money) -> Decimal {
        calculate_margin(unit_cost, price)
    }
}

/// `(price − unit_cost) / price`, or 0 when `price <= 0`.
pub fn calculate_margin(unit_cost: Money, price: Money) -> Decimal {
    if !price.is_positive() {
        return Decimal::ZERO;
    }

    price
        .checked_sub(unit_cost)
        .and_then(|profit| profit.checked_ratio(price))
        .unwrap_or(Decimal::ZERO)
}

/// `unit_cost × (1 + markup)`, `None` on overflow.
fn marked_up(unit_cost: Money, markup: Decimal) -> Option<Money> {
    Decimal::ONE
        .checked_add(markup)
        .and_then(|factor| unit_cost.checked_mul(factor))
}

/// Snaps `base` to an attractive price point for its magnitude.
fn competitive_price(base: Money) -> Option<Money> {
    let rounded = round_half_away(base.amount());
    if rounded <= Decimal::ZERO {
        return Some(base);
    }

    let (bucket, offset) = if rounded >= Decimal::from(10_000) {
        (Decimal::ONE_THOUSAND, Decimal::ONE_HUNDRED)
    } else if rounded >= Decimal::ONE_THOUSAND {
        (Decimal::from(500), Decimal::ONE_HUNDRED)
    } else {
        (Decimal::ONE_HUNDRED, Decimal::ONE)
    };

    let snapped = round_half_away(rounded.checked_div(bucket)?).checked_mul(bucket)?;
    snapped.checked_sub(offset).map(Money::new)
}

// =============================================================================
// Unit Tests
// =============================================================================
