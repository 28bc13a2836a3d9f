//! # Pricing Scenarios
//!
//! What-if bookkeeping on top of the calculator: keep a few named results
//! around and diff their prices.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  ScenarioStore (owned by the caller, in memory)                │
//! │                                                                │
//! │   save(scenario) ──► id          empty id → fresh UUID v4      │
//! │   get(id)                        same id  → overwrite          │
//! │   scenarios_for(recipe_id)       newest first                  │
//! │   compare(id1, id2) ──► ScenarioComparison                     │
//! │                          diff = |p2 − p1|                      │
//! │                          pct  = diff / p1 × 100  (0 if p1 ≤ 0) │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is global. Two stores never see each other's scenarios.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::calculator::BatchCostCalculator;
use crate::error::{ComputationError, CoreError, CoreResult};
use crate::money::Money;
use crate::types::{BatchResult, BatchSpecification};

// =============================================================================
// Pricing Scenario
// =============================================================================

/// A named, saved costing result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingScenario {
    /// Empty until the scenario is saved.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub recipe_id: String,
    #[serde(default)]
    pub description: String,
    /// Parameters the caller changed for this scenario, for display.
    #[serde(default)]
    pub adjusted_parameters: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub result: Option<BatchResult>,
    pub created_at: DateTime<Utc>,
}

impl PricingScenario {
    /// An unsaved scenario timestamped now.
    pub fn new(name: impl Into<String>, recipe_id: impl Into<String>) -> Self {
        PricingScenario {
            id: String::new(),
            name: name.into(),
            recipe_id: recipe_id.into(),
            description: String::new(),
            adjusted_parameters: BTreeMap::new(),
            result: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_result(mut self, result: BatchResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: Decimal) -> Self {
        self.adjusted_parameters.insert(key.into(), value);
        self
    }

    /// Suggested price of the attached result, if any.
    pub fn suggested_price(&self) -> Option<Money> {
        self.result.as_ref().map(|r| r.suggested_price)
    }
}

/// Price difference between two saved scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScenarioComparison {
    pub scenario1_name: String,
    pub scenario2_name: String,
    pub price1: Money,
    pub price2: Money,
    /// Always non-negative.
    pub price_difference: Money,
    /// Relative to `price1`, in percent (12.5 = 12.5%).
    #[ts(type = "string")]
    pub percent_difference: Decimal,
}

// =============================================================================
// Scenario Store
// =============================================================================

#[derive(Debug, Default)]
pub struct ScenarioStore {
    scenarios: HashMap<String, PricingScenario>,
}

impl ScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `scenario` and returns its id.
    pub fn save(&mut self, mut scenario: PricingScenario) -> String {
        if scenario.id.is_empty() {
            scenario.id = Uuid::new_v4().to_string();
        }

        let id = scenario.id.clone();
        if self.scenarios.insert(id.clone(), scenario).is_some() {
            debug!(scenario_id = %id, "Scenario overwritten");
        }
        id
    }

    pub fn get(&self, id: &str) -> Option<&PricingScenario> {
        self.scenarios.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<PricingScenario> {
        self.scenarios.remove(id)
    }

    /// Scenarios saved for `recipe_id`, newest first.
    pub fn scenarios_for(&self, recipe_id: &str) -> Vec<&PricingScenario> {
        let mut found: Vec<&PricingScenario> = self
            .scenarios
            .values()
            .filter(|s| s.recipe_id == recipe_id)
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        found
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Compares the suggested prices of two saved scenarios.
    ///
    /// ## Errors
    /// - [`CoreError::ScenarioNotFound`] if either id is unknown.
    /// - [`CoreError::ScenarioWithoutResult`] if either has no result.
    /// - [`CoreError::Computation`] if the difference or the percentage
    ///   leaves the decimal range.
    pub fn compare(&self, first_id: &str, second_id: &str) -> CoreResult<ScenarioComparison> {
        let first = self.priced(first_id)?;
        let second = self.priced(second_id)?;
        let (s1, price1) = first;
        let (s2, price2) = second;

        let price_difference = price2
            .checked_sub(price1)
            .ok_or(ComputationError::Overflow {
                step: "price difference",
            })?
            .abs();
        let percent_difference = if price1.is_positive() {
            price_difference
                .checked_ratio(price1)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .ok_or(ComputationError::Overflow {
                    step: "percent difference",
                })?
        } else {
            Decimal::ZERO
        };

        Ok(ScenarioComparison {
            scenario1_name: s1.name.clone(),
            scenario2_name: s2.name.clone(),
            price1,
            price2,
            price_difference,
            percent_difference,
        })
    }

    fn priced(&self, id: &str) -> CoreResult<(&PricingScenario, Money)> {
        let scenario = self
            .get(id)
            .ok_or_else(|| CoreError::ScenarioNotFound(id.to_string()))?;
        let price = scenario
            .suggested_price()
            .ok_or_else(|| CoreError::ScenarioWithoutResult(id.to_string()))?;
        Ok((scenario, price))
    }
}

// =============================================================================
// Price Change Simulation
// =============================================================================

/// Recomputes `spec` with every ingredient price and the oil price moved by
/// `change` (0.1 = +10%, -0.2 = −20%).
///
/// Energy, labor, overhead and packaging are left alone.
pub fn simulate_price_change(
    calculator: &BatchCostCalculator,
    spec: &BatchSpecification,
    change: Decimal,
) -> BatchResult {
    let scaled = Decimal::ONE
        .checked_add(change)
        .and_then(|factor| spec.scale_prices(factor));

    match scaled {
        Some(adjusted) => calculator.calculate_batch_cost(&adjusted),
        None => {
            let err = ComputationError::Overflow {
                step: "price change",
            };
            warn!(error = %err, %change, "Price change simulation failed");
            BatchResult {
                errors: vec![err.to_string()],
                ..BatchResult::default()
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BatchDraft, LineItem};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn result_priced(price: i64) -> BatchResult {
        BatchResult {
            suggested_price: Money::from_major(price),
            ..BatchResult::default()
        }
    }

    #[test]
    fn test_save_assigns_id() {
        let mut store = ScenarioStore::new();
        let id = store.save(PricingScenario::new("Base", "donut"));

        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(store.get(&id).unwrap().name, "Base");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_save_same_id_overwrites() {
        let mut store = ScenarioStore::new();
        let mut scenario = PricingScenario::new("Base", "donut");
        scenario.id = "fixed".to_string();
        store.save(scenario.clone());

        scenario.name = "Renamed".to_string();
        let id = store.save(scenario);

        assert_eq!(id, "fixed");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("fixed").unwrap().name, "Renamed");
    }

    #[test]
    fn test_scenarios_for_newest_first() {
        let mut store = ScenarioStore::new();
        let now = Utc::now();
        for (name, age) in [("old", 3), ("newest", 0), ("middle", 1)] {
            let mut s = PricingScenario::new(name, "donut");
            s.created_at = now - Duration::hours(age);
            store.save(s);
        }
        store.save(PricingScenario::new("other", "croissant"));

        let names: Vec<&str> = store
            .scenarios_for("donut")
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, ["newest", "middle", "old"]);
        assert!(store.scenarios_for("bagel").is_empty());
    }

    #[test]
    fn test_compare() {
        let mut store = ScenarioStore::new();
        let a = store.save(PricingScenario::new("Base", "donut").with_result(result_priced(2000)));
        let b = store.save(PricingScenario::new("Pricier", "donut").with_result(result_priced(2500)));

        let cmp = store.compare(&a, &b).unwrap();
        assert_eq!(cmp.scenario1_name, "Base");
        assert_eq!(cmp.price_difference, Money::from_major(500));
        assert_eq!(cmp.percent_difference, dec!(25));

        // difference is absolute, percentage is relative to the first
        let reversed = store.compare(&b, &a).unwrap();
        assert_eq!(reversed.price_difference, Money::from_major(500));
        assert_eq!(reversed.percent_difference, dec!(20));
    }

    #[test]
    fn test_compare_zero_first_price() {
        let mut store = ScenarioStore::new();
        let a = store.save(PricingScenario::new("Free", "donut").with_result(result_priced(0)));
        let b = store.save(PricingScenario::new("Paid", "donut").with_result(result_priced(100)));

        let cmp = store.compare(&a, &b).unwrap();
        assert_eq!(cmp.price_difference, Money::from_major(100));
        assert_eq!(cmp.percent_difference, Decimal::ZERO);
    }

    #[test]
    fn test_compare_errors() {
        let mut store = ScenarioStore::new();
        let priced = store.save(PricingScenario::new("Base", "donut").with_result(result_priced(1)));
        let empty = store.save(PricingScenario::new("Draft", "donut"));

        assert!(matches!(
            store.compare(&priced, "missing"),
            Err(CoreError::ScenarioNotFound(id)) if id == "missing"
        ));
        assert!(matches!(
            store.compare(&empty, &priced),
            Err(CoreError::ScenarioWithoutResult(id)) if id == empty
        ));
    }

    #[test]
    fn test_compare_out_of_range_is_an_error() {
        let priced = |price: Decimal| BatchResult {
            suggested_price: Money::new(price),
            ..BatchResult::default()
        };
        let mut store = ScenarioStore::new();
        let low = store.save(PricingScenario::new("Low", "donut").with_result(priced(Decimal::MIN)));
        let high = store.save(PricingScenario::new("High", "donut").with_result(priced(Decimal::MAX)));
        let tiny = store.save(PricingScenario::new("Tiny", "donut").with_result(priced(dec!(0.0001))));

        assert!(matches!(
            store.compare(&low, &high),
            Err(CoreError::Computation(ComputationError::Overflow {
                step: "price difference"
            }))
        ));
        // difference ≈ MAX, divided by 0.0001
        assert!(matches!(
            store.compare(&tiny, &high),
            Err(CoreError::Computation(ComputationError::Overflow {
                step: "percent difference"
            }))
        ));
    }

    #[test]
    fn test_simulate_price_change() {
        let spec = BatchDraft {
            items: vec![LineItem::new("flour", dec!(10), "kg", Money::from_major(10000))],
            oil_used_liters: dec!(2),
            oil_price_per_liter: Money::from_major(18000),
            energy_kwh: dec!(5),
            energy_rate_per_kwh: Money::from_major(3000),
            waste_percent: dec!(0),
            ..BatchDraft::default()
        }
        .validate()
        .unwrap();
        let calculator = BatchCostCalculator::new();

        let base = calculator.calculate_batch_cost(&spec);
        let up = simulate_price_change(&calculator, &spec, dec!(0.1));

        assert_eq!(up.ingredient_cost, Money::from_major(110000));
        assert_eq!(up.oil_amortized_cost, Money::from_major(39600));
        assert_eq!(up.energy_cost, base.energy_cost);
        assert!(up.total_batch_cost > base.total_batch_cost);

        let unchanged = simulate_price_change(&calculator, &spec, Decimal::ZERO);
        assert_eq!(unchanged, base);
    }

    #[test]
    fn test_simulate_overflow_is_reported() {
        let spec = BatchDraft {
            oil_price_per_liter: Money::new(Decimal::MAX),
            ..BatchDraft::default()
        }
        .validate()
        .unwrap();

        let result = simulate_price_change(&BatchCostCalculator::new(), &spec, dec!(1));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("price change"));
    }
}
