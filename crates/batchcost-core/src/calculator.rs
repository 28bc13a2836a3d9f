//! # Batch Cost Calculator
//!
//! Turns a validated [`BatchSpecification`] into a [`BatchResult`].
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    calculate_batch_cost(spec)                           │
//! │                                                                         │
//! │  ingredients   Σ price × qty × multiplier        (per-id map recorded)  │
//! │  oil           liters × price + change_cost / batches_per_change        │
//! │  energy        kwh × rate                                               │
//! │  labor         Σ hours × rate                                           │
//! │  overhead      pass-through                                             │
//! │  sellable      floor(output × (1 − waste))                              │
//! │  packaging     per_unit × sellable                                      │
//! │  total         sum of the six categories                                │
//! │      │                                                                  │
//! │      ├── sellable ≤ 0 ? → errors += "sellable units must be > 0", stop │
//! │      ▼                                                                  │
//! │  unit_cost     total / sellable                                         │
//! │  suggested     rounding_rule(unit_cost × (1 + markup))                  │
//! │  margin        (suggested − unit_cost) / suggested                      │
//! │  with VAT      suggested × (1 + vat)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every step uses checked decimal arithmetic. An overflow is recorded in
//! `errors` and the partially filled result is returned; nothing in this
//! module panics on user input.
//!
//! The fixed-markup path above is the calculator's own pricing policy. The
//! strategy set in [`crate::strategy`] is reached only through
//! [`BatchCostCalculator::calculate_suggested_price`] and
//! [`BatchCostCalculator::compare_strategies`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use ts_rs::TS;

use crate::error::{ComputationError, CoreError, CoreResult};
use crate::money::Money;
use crate::rounding::{self, RoundingRule, DEFAULT_RULE_ID};
use crate::strategy::{
    CompetitiveParams, MarkupParams, PricingStrategy, StrategyDescriptor, StrategyKind,
    TargetMarginParams, DEFAULT_TARGET_MARGIN,
};
use crate::types::{floor_sellable_units, BatchResult, BatchSpecification, CostCategory};

/// `pricing_strategy` label written by the fixed-markup path.
pub const FIXED_MARKUP_LABEL: &str = "Fixed Markup";

// =============================================================================
// Strategy Quote
// =============================================================================

/// One row of [`BatchCostCalculator::compare_strategies`].
///
/// A strategy that cannot price the batch leaves `price` and
/// `margin_percent` at zero and says why in `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StrategyQuote {
    pub strategy: String,
    pub price: Money,
    #[ts(type = "string")]
    pub margin_percent: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

impl StrategyQuote {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

// =============================================================================
// Cost Totals
// =============================================================================

/// Category totals shared by the full and the unit-cost-only paths, so the
/// two can never disagree.
#[derive(Debug, Default)]
struct CostTotals {
    ingredient: Money,
    oil_amortized: Money,
    energy: Money,
    labor: Money,
    overhead: Money,
    sellable_units: i64,
    packaging: Money,
    total: Money,
}

impl CostTotals {
    fn copy_into(&self, result: &mut BatchResult) {
        result.ingredient_cost = self.ingredient;
        result.oil_amortized_cost = self.oil_amortized;
        result.energy_cost = self.energy;
        result.labor_cost = self.labor;
        result.overhead_cost = self.overhead;
        result.sellable_units = u64::try_from(self.sellable_units).unwrap_or(0);
        result.packaging_cost = self.packaging;
        result.total_batch_cost = self.total;
    }

    /// `total / sellable_units`; the zero-units guard lives here.
    fn unit_cost(&self) -> Result<Money, ComputationError> {
        if self.sellable_units <= 0 {
            return Err(ComputationError::NoSellableUnits);
        }

        self.total
            .checked_div(Decimal::from(self.sellable_units))
            .ok_or(overflow("unit cost"))
    }
}

#[inline]
fn overflow(step: &'static str) -> ComputationError {
    ComputationError::Overflow { step }
}

#[inline]
fn sum(a: Money, b: Money, step: &'static str) -> Result<Money, ComputationError> {
    a.checked_add(b).ok_or(overflow(step))
}

/// Fills `totals` category by category. On error, every category computed
/// before the failing one is already in `totals`.
fn accumulate_costs(
    spec: &BatchSpecification,
    totals: &mut CostTotals,
    mut item_costs: Option<&mut BTreeMap<String, Money>>,
) -> Result<(), ComputationError> {
    // Ingredients
    let mut ingredient = Money::ZERO;
    for item in &spec.items {
        let cost = item
            .checked_cost(spec.batch_multiplier)
            .ok_or(overflow("ingredients"))?;
        ingredient = sum(ingredient, cost, "ingredients")?;
        if let Some(map) = item_costs.as_deref_mut() {
            map.insert(item.ingredient_id.clone(), cost);
        }
    }
    totals.ingredient = ingredient;

    // Oil consumed + oil change amortized over its lifetime in batches
    let oil_base = spec
        .oil_price_per_liter
        .checked_mul(spec.oil_used_liters)
        .ok_or(overflow("oil"))?;
    let oil_amortization = if spec.batches_per_oil_change > 0 {
        spec.oil_change_cost
            .checked_div(Decimal::from(spec.batches_per_oil_change))
            .ok_or(overflow("oil amortization"))?
    } else {
        Money::ZERO
    };
    totals.oil_amortized = sum(oil_base, oil_amortization, "oil amortization")?;

    totals.energy = spec
        .energy_rate_per_kwh
        .checked_mul(spec.energy_kwh)
        .ok_or(overflow("energy"))?;

    let mut labor = Money::ZERO;
    for entry in &spec.labor {
        let cost = entry
            .hourly_rate
            .checked_mul(entry.hours)
            .ok_or(overflow("labor"))?;
        labor = sum(labor, cost, "labor")?;
    }
    totals.labor = labor;

    totals.overhead = spec.overhead_allocated;

    totals.sellable_units = floor_sellable_units(spec.theoretical_output, spec.waste_percent)
        .ok_or(overflow("sellable units"))?;

    totals.packaging = spec
        .packaging_per_unit
        .checked_mul(Decimal::from(totals.sellable_units.max(0)))
        .ok_or(overflow("packaging"))?;

    let mut total = totals.ingredient;
    for part in [
        totals.oil_amortized,
        totals.energy,
        totals.labor,
        totals.overhead,
        totals.packaging,
    ] {
        total = sum(total, part, "total batch cost")?;
    }
    totals.total = total;

    Ok(())
}

// =============================================================================
// Calculator
// =============================================================================

/// The costing engine.
///
/// Stateless apart from the registered strategy list, so one instance can be
/// shared freely (`&self` everywhere, `Send + Sync`).
#[derive(Debug, Clone)]
pub struct BatchCostCalculator {
    strategies: Vec<StrategyKind>,
}

impl Default for BatchCostCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchCostCalculator {
    /// Creates a calculator with every built-in strategy registered.
    pub fn new() -> Self {
        BatchCostCalculator {
            strategies: StrategyKind::ALL.to_vec(),
        }
    }

    /// Creates a calculator exposing only `strategies`, in the given order.
    pub fn with_strategies(strategies: impl IntoIterator<Item = StrategyKind>) -> Self {
        BatchCostCalculator {
            strategies: strategies.into_iter().collect(),
        }
    }

    // =========================================================================
    // Batch Costing
    // =========================================================================

    /// Full cost breakdown and fixed-markup price for one batch.
    ///
    /// Never fails: problems found while computing are in
    /// [`BatchResult::errors`]. Input validation already happened when the
    /// [`BatchSpecification`] was built.
    ///
    /// ## Example
    /// ```rust
    /// use batchcost_core::{BatchCostCalculator, BatchDraft, LineItem, Money};
    /// use rust_decimal::Decimal;
    ///
    /// let spec = BatchDraft {
    ///     items: vec![LineItem::new("flour", Decimal::from(10), "kg", Money::from_major(10000))],
    ///     waste_percent: Decimal::ZERO,
    ///     markup: Decimal::ONE,
    ///     vat_percent: Decimal::ZERO,
    ///     ..BatchDraft::default()
    /// }
    /// .validate()
    /// .unwrap();
    ///
    /// let result = BatchCostCalculator::new().calculate_batch_cost(&spec);
    /// assert!(result.is_valid());
    /// assert_eq!(result.unit_cost, Money::from_major(1000));
    /// assert_eq!(result.suggested_price, Money::from_major(2000));
    /// ```
    pub fn calculate_batch_cost(&self, spec: &BatchSpecification) -> BatchResult {
        let mut result = BatchResult::default();

        if let Err(err) = self.price_batch(spec, &mut result) {
            warn!(
                error = %err,
                recipe_id = spec.recipe_id.as_deref().unwrap_or("-"),
                "Batch calculation recorded an error"
            );
            result.errors.push(err.to_string());
        }

        debug!(
            items = spec.items.len(),
            sellable_units = result.sellable_units,
            total = %result.total_batch_cost,
            unit_cost = %result.unit_cost,
            suggested_price = %result.suggested_price,
            valid = result.is_valid(),
            "Batch cost calculated"
        );
        result
    }

    fn price_batch(
        &self,
        spec: &BatchSpecification,
        result: &mut BatchResult,
    ) -> Result<(), ComputationError> {
        let mut totals = CostTotals::default();
        let accumulated = accumulate_costs(spec, &mut totals, Some(&mut result.ingredient_costs));
        totals.copy_into(result);
        accumulated?;

        let unit_cost = totals.unit_cost()?;
        result.unit_cost = unit_cost;

        result.cost_breakdown = BTreeMap::from([
            (CostCategory::Ingredients, totals.ingredient),
            (CostCategory::OilAndAmortization, totals.oil_amortized),
            (CostCategory::Energy, totals.energy),
            (CostCategory::Labor, totals.labor),
            (CostCategory::Overhead, totals.overhead),
            (CostCategory::Packaging, totals.packaging),
        ]);

        let markup_factor = Decimal::ONE
            .checked_add(spec.markup)
            .ok_or(overflow("markup"))?;
        let base_price = unit_cost
            .checked_mul(markup_factor)
            .ok_or(overflow("markup"))?;
        result.suggested_price = self
            .resolve_rule(&spec.rounding_rule)
            .checked_apply(base_price)
            .ok_or(overflow("rounding"))?;

        if result.suggested_price.is_positive() {
            result.margin_percent = result
                .suggested_price
                .checked_sub(unit_cost)
                .and_then(|profit| profit.checked_ratio(result.suggested_price))
                .ok_or(overflow("margin"))?;
        }

        let vat_factor = Decimal::ONE
            .checked_add(spec.vat_percent)
            .ok_or(overflow("VAT"))?;
        result.price_including_vat = result
            .suggested_price
            .checked_mul(vat_factor)
            .ok_or(overflow("VAT"))?;

        result.pricing_strategy = FIXED_MARKUP_LABEL.to_string();
        Ok(())
    }

    /// `total_batch_cost / sellable_units` without building the breakdown.
    ///
    /// Returns zero where [`Self::calculate_batch_cost`] would leave
    /// `unit_cost` at zero (no sellable units, overflow).
    pub fn calculate_unit_cost(&self, spec: &BatchSpecification) -> Money {
        let mut totals = CostTotals::default();
        match accumulate_costs(spec, &mut totals, None).and_then(|()| totals.unit_cost()) {
            Ok(unit_cost) => unit_cost,
            Err(err) => {
                debug!(error = %err, "Unit cost unavailable, returning zero");
                Money::ZERO
            }
        }
    }

    // =========================================================================
    // Rounding
    // =========================================================================

    /// Applies a rounding rule on the fixed-markup path.
    ///
    /// Unlike [`rounding::apply_rule`], an unknown id rounds to the nearest
    /// 100 instead of leaving the price alone. Catalog ids, `price99` and
    /// `noround` included, behave exactly as in the registry.
    pub fn apply_rounding_rule(&self, price: Money, rule_id: &str) -> Money {
        self.resolve_rule(rule_id).apply(price)
    }

    fn resolve_rule(&self, rule_id: &str) -> &'static RoundingRule {
        if let Some(rule) = rounding::rule(rule_id) {
            return rule;
        }

        warn!(rule = rule_id, fallback = DEFAULT_RULE_ID, "Unknown rounding rule");
        rounding::rule(DEFAULT_RULE_ID).unwrap_or(&rounding::rules()[0])
    }

    // =========================================================================
    // Strategies
    // =========================================================================

    /// Price for `unit_cost` under `strategy`.
    pub fn calculate_suggested_price(
        &self,
        unit_cost: Money,
        strategy: &PricingStrategy,
    ) -> Result<Money, ComputationError> {
        strategy.calculate_price(unit_cost)
    }

    /// Descriptors of the registered strategies.
    pub fn available_strategies(&self) -> Vec<StrategyDescriptor> {
        self.strategies.iter().map(StrategyKind::descriptor).collect()
    }

    /// Resolves a strategy id or alias among the registered strategies.
    pub fn strategy(&self, id: &str) -> CoreResult<StrategyKind> {
        let kind: StrategyKind = id.parse()?;
        if self.strategies.contains(&kind) {
            Ok(kind)
        } else {
            Err(CoreError::UnknownStrategy(id.to_string()))
        }
    }

    /// Prices one unit of `spec` under every registered strategy.
    ///
    /// Markup-based and competitive strategies use the batch markup; the
    /// target-margin strategy uses its default 35%. A strategy that
    /// overflows yields a quote carrying the error; the others are still
    /// priced.
    pub fn compare_strategies(&self, spec: &BatchSpecification) -> Vec<StrategyQuote> {
        let unit_cost = self.calculate_unit_cost(spec);

        self.strategies
            .iter()
            .map(|kind| {
                let strategy = match kind {
                    StrategyKind::MarkupBased => PricingStrategy::MarkupBased(MarkupParams {
                        markup: Some(spec.markup),
                    }),
                    StrategyKind::TargetMargin => PricingStrategy::TargetMargin(TargetMarginParams {
                        target_margin: Some(DEFAULT_TARGET_MARGIN),
                    }),
                    StrategyKind::CompetitiveRounding => {
                        PricingStrategy::CompetitiveRounding(CompetitiveParams {
                            markup: Some(spec.markup),
                        })
                    }
                };
                match self.calculate_suggested_price(unit_cost, &strategy) {
                    Ok(price) => StrategyQuote {
                        strategy: strategy.name().to_string(),
                        price,
                        margin_percent: strategy.calculate_margin(unit_cost, price),
                        error: None,
                    },
                    Err(err) => {
                        warn!(strategy = %kind, error = %err, "Strategy could not price batch");
                        StrategyQuote {
                            strategy: strategy.name().to_string(),
                            price: Money::ZERO,
                            margin_percent: Decimal::ZERO,
                            error: Some(err.to_string()),
                        }
                    }
                }
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BatchDraft, LaborEntry, LineItem};
    use rust_decimal_macros::dec;

    fn item(id: &str, qty: Decimal, price: i64) -> LineItem {
        LineItem::new(id, qty, "kg", Money::from_major(price))
    }

    /// 10 kg at 10000 over 100 units with no waste: unit cost 1000.
    fn simple_draft() -> BatchDraft {
        BatchDraft {
            items: vec![item("ingredient", dec!(10), 10000)],
            theoretical_output: 100,
            waste_percent: dec!(0),
            markup: dec!(0),
            vat_percent: dec!(0),
            ..BatchDraft::default()
        }
    }

    fn calc(draft: BatchDraft) -> BatchResult {
        BatchCostCalculator::new().calculate_batch_cost(&draft.validate().unwrap())
    }

    #[test]
    fn test_basic_ingredients() {
        let result = calc(BatchDraft {
            items: vec![item("flour", dec!(3), 12500), item("sugar", dec!(1.5), 14000)],
            ..BatchDraft::default()
        });

        assert!(result.is_valid(), "{:?}", result.errors);
        assert_eq!(result.ingredient_cost, Money::from_major(58500));
        assert_eq!(result.ingredient_costs["flour"], Money::from_major(37500));
        assert_eq!(result.ingredient_costs["sugar"], Money::from_major(21000));
        assert_eq!(result.pricing_strategy, FIXED_MARKUP_LABEL);
    }

    #[test]
    fn test_all_cost_components() {
        let result = calc(BatchDraft {
            items: vec![item("flour", dec!(3), 12500), item("eggs", dec!(0.8), 29000)],
            batch_multiplier: dec!(2),
            theoretical_output: 100,
            waste_percent: dec!(0.05),
            oil_used_liters: dec!(4),
            oil_price_per_liter: Money::from_major(18000),
            oil_change_cost: Money::from_major(100000),
            batches_per_oil_change: 50,
            energy_kwh: dec!(10),
            energy_rate_per_kwh: Money::from_major(3000),
            labor: vec![LaborEntry::new("Baker", dec!(8), Money::from_major(25000))],
            overhead_allocated: Money::from_major(50000),
            packaging_per_unit: Money::from_major(500),
            markup: dec!(0.5),
            vat_percent: dec!(0.1),
            ..BatchDraft::default()
        });

        assert!(result.is_valid());
        assert_eq!(result.ingredient_cost, Money::from_major(75000 + 46400));
        assert_eq!(result.oil_amortized_cost, Money::from_major(72000 + 2000));
        assert_eq!(result.energy_cost, Money::from_major(30000));
        assert_eq!(result.labor_cost, Money::from_major(200000));
        assert_eq!(result.overhead_cost, Money::from_major(50000));
        assert_eq!(result.sellable_units, 95);
        assert_eq!(result.packaging_cost, Money::from_major(47500));
        assert_eq!(result.total_batch_cost, Money::from_major(522900));

        // 522900 / 95 = 5504.21..., × 1.5 = 8256.31... → 8300
        assert_eq!(result.unit_cost.round_dp(2), Money::new(dec!(5504.21)));
        assert_eq!(result.suggested_price, Money::from_major(8300));
        assert_eq!(result.price_including_vat, Money::from_major(9130));

        assert_eq!(result.cost_breakdown.len(), 6);
        assert_eq!(
            result.cost_breakdown[&CostCategory::OilAndAmortization],
            Money::from_major(74000)
        );
        let breakdown_total: Money = result.cost_breakdown.values().copied().sum();
        assert_eq!(breakdown_total, result.total_batch_cost);
    }

    #[test]
    fn test_unit_cost_only_path() {
        let spec = BatchDraft {
            items: vec![item("flour", dec!(5), 10000)],
            waste_percent: dec!(0.10),
            oil_used_liters: dec!(1),
            oil_price_per_liter: Money::from_major(15000),
            ..BatchDraft::default()
        }
        .validate()
        .unwrap();

        let calculator = BatchCostCalculator::new();
        let unit_cost = calculator.calculate_unit_cost(&spec);
        // (50000 + 15000) / 90
        assert_eq!(unit_cost.round_dp(2), Money::new(dec!(722.22)));
        assert_eq!(unit_cost, calculator.calculate_batch_cost(&spec).unit_cost);
    }

    #[test]
    fn test_markup_and_margin() {
        let result = calc(BatchDraft {
            markup: dec!(1),
            ..simple_draft()
        });

        assert_eq!(result.unit_cost, Money::from_major(1000));
        assert_eq!(result.suggested_price, Money::from_major(2000));
        assert_eq!(result.margin_percent, dec!(0.5));
    }

    #[test]
    fn test_vat() {
        let result = calc(BatchDraft {
            vat_percent: dec!(0.15),
            ..simple_draft()
        });

        assert_eq!(result.suggested_price, Money::from_major(1000));
        assert_eq!(result.price_including_vat, Money::from_major(1150));
    }

    #[test]
    fn test_batch_multiplier_scales_ingredients() {
        let base = calc(simple_draft());
        let doubled = calc(BatchDraft {
            batch_multiplier: dec!(2),
            ..simple_draft()
        });

        assert_eq!(base.ingredient_cost, Money::from_major(100000));
        assert_eq!(doubled.ingredient_cost, Money::from_major(200000));
    }

    #[test]
    fn test_sellable_units_from_waste() {
        for (output, waste, expected) in [
            (100, dec!(0.05), 95),
            (100, dec!(0.10), 90),
            (100, dec!(0), 100),
            (1000, dec!(0.075), 925),
        ] {
            let result = calc(BatchDraft {
                theoretical_output: output,
                waste_percent: waste,
                ..simple_draft()
            });
            assert_eq!(result.sellable_units, expected, "{output} @ {waste}");
        }
    }

    #[test]
    fn test_zero_sellable_units_is_reported_not_raised() {
        let result = calc(BatchDraft {
            theoretical_output: 1,
            waste_percent: dec!(0.5),
            packaging_per_unit: Money::from_major(500),
            ..simple_draft()
        });

        assert!(!result.is_valid());
        assert_eq!(result.errors, vec!["sellable units must be greater than 0"]);
        assert_eq!(result.sellable_units, 0);
        assert_eq!(result.unit_cost, Money::ZERO);
        assert_eq!(result.suggested_price, Money::ZERO);
        assert_eq!(result.price_including_vat, Money::ZERO);
        assert!(result.cost_breakdown.is_empty());
        assert!(result.pricing_strategy.is_empty());
        // totals computed before the guard are kept
        assert_eq!(result.ingredient_cost, Money::from_major(100000));
        assert_eq!(result.packaging_cost, Money::ZERO);
        assert_eq!(result.total_batch_cost, Money::from_major(100000));

        let spec = BatchDraft {
            theoretical_output: 1,
            waste_percent: dec!(0.5),
            ..simple_draft()
        }
        .validate()
        .unwrap();
        assert_eq!(BatchCostCalculator::new().calculate_unit_cost(&spec), Money::ZERO);
    }

    #[test]
    fn test_invalid_input_is_rejected_before_calculation() {
        let err = BatchDraft {
            theoretical_output: 0,
            ..BatchDraft::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), "theoretical_output");
    }

    #[test]
    fn test_overflow_is_captured() {
        let result = calc(BatchDraft {
            items: vec![LineItem::new("gold", dec!(2), "kg", Money::new(Decimal::MAX))],
            ..simple_draft()
        });

        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("overflow"), "{}", result.errors[0]);
        assert_eq!(result.unit_cost, Money::ZERO);
    }

    #[test]
    fn test_overflow_keeps_earlier_categories() {
        let spec = BatchDraft {
            energy_kwh: dec!(2),
            energy_rate_per_kwh: Money::from_major(3000),
            labor: vec![LaborEntry::new("Baker", dec!(2), Money::new(Decimal::MAX))],
            ..simple_draft()
        }
        .validate()
        .unwrap();
        let calculator = BatchCostCalculator::new();
        let result = calculator.calculate_batch_cost(&spec);

        assert!(result.errors[0].contains("labor"));
        assert_eq!(result.ingredient_cost, Money::from_major(100000));
        assert_eq!(result.energy_cost, Money::from_major(6000));
        assert_eq!(result.labor_cost, Money::ZERO);
        assert_eq!(calculator.calculate_unit_cost(&spec), Money::ZERO);
    }

    #[test]
    fn test_repeated_ingredient_last_write_wins() {
        let result = calc(BatchDraft {
            items: vec![item("flour", dec!(1), 1000), item("flour", dec!(2), 1000)],
            ..simple_draft()
        });

        assert_eq!(result.ingredient_cost, Money::from_major(3000));
        assert_eq!(result.ingredient_costs.len(), 1);
        assert_eq!(result.ingredient_costs["flour"], Money::from_major(2000));
    }

    #[test]
    fn test_oil_amortization_disabled_at_zero_batches() {
        let result = calc(BatchDraft {
            oil_used_liters: dec!(2),
            oil_price_per_liter: Money::from_major(18000),
            oil_change_cost: Money::from_major(100000),
            batches_per_oil_change: 0,
            ..simple_draft()
        });
        assert_eq!(result.oil_amortized_cost, Money::from_major(36000));
    }

    #[test]
    fn test_same_spec_gives_identical_results() {
        let spec = BatchDraft {
            items: vec![item("flour", dec!(3), 12500), item("eggs", dec!(0.8), 29000)],
            waste_percent: dec!(0.07),
            markup: dec!(0.42),
            rounding_rule: "price99".to_string(),
            ..BatchDraft::default()
        }
        .validate()
        .unwrap();
        let calculator = BatchCostCalculator::new();

        let first = serde_json::to_string(&calculator.calculate_batch_cost(&spec)).unwrap();
        let second = serde_json::to_string(&calculator.calculate_batch_cost(&spec.clone())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rounding_rule_on_fixed_markup_path() {
        let calculator = BatchCostCalculator::new();
        let price = Money::from_major(1234);

        assert_eq!(calculator.apply_rounding_rule(price, "round100"), Money::from_major(1200));
        assert_eq!(calculator.apply_rounding_rule(price, "round1k"), Money::from_major(1000));
        assert_eq!(calculator.apply_rounding_rule(price, "price99"), Money::from_major(1199));
        assert_eq!(
            calculator.apply_rounding_rule(Money::new(dec!(1234.56)), "noround"),
            Money::from_major(1235)
        );
        // unknown id: calculator rounds to 100, registry leaves the price alone
        assert_eq!(calculator.apply_rounding_rule(price, "mystery"), Money::from_major(1200));
        assert_eq!(rounding::apply_rule(price, "mystery"), price);

        let result = calc(BatchDraft {
            items: vec![item("ingredient", dec!(10), 12340)],
            rounding_rule: "mystery".to_string(),
            ..simple_draft()
        });
        assert_eq!(result.suggested_price, Money::from_major(1200));
        assert!(result.is_valid());
    }

    #[test]
    fn test_compare_strategies() {
        let spec = BatchDraft {
            markup: dec!(0.5),
            ..simple_draft()
        }
        .validate()
        .unwrap();
        let quotes = BatchCostCalculator::new().compare_strategies(&spec);

        let names: Vec<&str> = quotes.iter().map(|q| q.strategy.as_str()).collect();
        assert_eq!(names, ["Markup Based", "Target Margin", "Competitive Rounding"]);
        assert_eq!(quotes[0].price, Money::from_major(1500));
        assert_eq!(quotes[1].price.round_dp(2), Money::new(dec!(1538.46)));
        assert_eq!(quotes[1].margin_percent.round_dp(10), dec!(0.35));
        assert_eq!(quotes[2].price, Money::from_major(1400));
        assert!(quotes.iter().all(StrategyQuote::is_valid));
    }

    #[test]
    fn test_compare_strategies_with_huge_markup() {
        let spec = BatchDraft {
            markup: Decimal::MAX / dec!(100),
            ..simple_draft()
        }
        .validate()
        .unwrap();
        let calculator = BatchCostCalculator::new();

        // The fixed-markup path records the overflow...
        let result = calculator.calculate_batch_cost(&spec);
        assert_eq!(
            result.errors,
            ["error calculating batch cost: arithmetic overflow in markup"]
        );

        // ...and so does each markup-driven quote, without aborting the rest.
        let quotes = calculator.compare_strategies(&spec);
        assert_eq!(quotes.len(), 3);
        assert!(quotes[0].error.as_deref().unwrap().contains("markup-based"));
        assert_eq!(quotes[0].price, Money::ZERO);
        assert!(quotes[1].is_valid());
        assert_eq!(quotes[1].price.round_dp(2), Money::new(dec!(1538.46)));
        assert!(quotes[2].error.as_deref().unwrap().contains("competitive-rounding"));
    }

    #[test]
    fn test_strategy_lookup_respects_registration() {
        let only_markup = BatchCostCalculator::with_strategies([StrategyKind::MarkupBased]);
        assert_eq!(only_markup.available_strategies().len(), 1);
        assert!(only_markup.strategy("markup").is_ok());
        assert!(matches!(
            only_markup.strategy("target-margin"),
            Err(CoreError::UnknownStrategy(_))
        ));

        let full = BatchCostCalculator::new();
        assert_eq!(full.available_strategies().len(), 3);
        let price = full
            .calculate_suggested_price(
                Money::from_major(1000),
                &StrategyKind::TargetMargin.with_defaults(),
            )
            .unwrap();
        assert_eq!(price.round_dp(2), Money::new(dec!(1538.46)));
    }
}
