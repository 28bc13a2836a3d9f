//! # Domain Types
//!
//! Core domain types for a single costing run.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   validate()   ┌──────────────────────┐           │
//! │  │   BatchDraft    │ ─────────────► │  BatchSpecification  │           │
//! │  │  ─────────────  │                │  ──────────────────  │           │
//! │  │  pub fields     │                │  read-only, checked  │           │
//! │  │  serde defaults │                │  Deref → BatchDraft  │           │
//! │  └────────┬────────┘                └──────────┬───────────┘           │
//! │           │ items / labor                      │                        │
//! │  ┌────────▼────────┐  ┌─────────────────┐      ▼                        │
//! │  │    LineItem     │  │   LaborEntry    │  calculate_batch_cost         │
//! │  │  id, qty, unit  │  │  role, hours,   │      │                        │
//! │  │  price_per_unit │  │  hourly_rate    │      ▼                        │
//! │  └─────────────────┘  └─────────────────┘  ┌──────────────────┐        │
//! │                                            │   BatchResult    │        │
//! │  ┌─────────────────┐                       │  costs, price,   │        │
//! │  │     Recipe      │ ─► BatchDraft::       │  breakdowns,     │        │
//! │  │ (stored recipe) │    from_recipe        │  errors          │        │
//! │  └─────────────────┘                       └──────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Deref;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::rounding::DEFAULT_RULE_ID;
use crate::validation;

// =============================================================================
// Line Item
// =============================================================================

/// One ingredient's contribution to a batch.
///
/// `quantity` is expressed in whatever unit `price_per_unit` is quoted in.
/// The calculator does not convert units (see [`crate::units`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub ingredient_id: String,
    pub quantity: Decimal,
    pub unit: String,
    pub price_per_unit: Money,
}

impl LineItem {
    pub fn new(
        ingredient_id: impl Into<String>,
        quantity: Decimal,
        unit: impl Into<String>,
        price_per_unit: Money,
    ) -> Self {
        LineItem {
            ingredient_id: ingredient_id.into(),
            quantity,
            unit: unit.into(),
            price_per_unit,
        }
    }

    /// `price_per_unit × quantity × batch_multiplier`, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use batchcost_core::{LineItem, Money};
    /// use rust_decimal::Decimal;
    ///
    /// let flour = LineItem::new("flour", Decimal::from(5), "kg", Money::from_major(10000));
    /// assert_eq!(flour.checked_cost(Decimal::from(2)), Some(Money::from_major(100000)));
    /// ```
    pub fn checked_cost(&self, batch_multiplier: Decimal) -> Option<Money> {
        self.price_per_unit
            .checked_mul(self.quantity)?
            .checked_mul(batch_multiplier)
    }
}

// =============================================================================
// Labor
// =============================================================================

/// Hours worked by one role on this batch. Only `hours × hourly_rate` matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborEntry {
    pub role: String,
    pub hours: Decimal,
    pub hourly_rate: Money,
}

impl LaborEntry {
    pub fn new(role: impl Into<String>, hours: Decimal, hourly_rate: Money) -> Self {
        LaborEntry {
            role: role.into(),
            hours,
            hourly_rate,
        }
    }
}

// =============================================================================
// Batch Draft
// =============================================================================

/// Unvalidated input to a costing run.
///
/// Every field has a default, so a JSON document only needs the fields that
/// differ:
///
/// | Field                    | Default      |
/// |--------------------------|--------------|
/// | `batch_multiplier`       | 1            |
/// | `batches_per_oil_change` | 100          |
/// | `theoretical_output`     | 100          |
/// | `waste_percent`          | 0.05         |
/// | `markup`                 | 0.5          |
/// | `vat_percent`            | 0.1          |
/// | `rounding_rule`          | `"round100"` |
/// | everything else          | 0 / empty    |
///
/// Call [`BatchDraft::validate`] to get a [`BatchSpecification`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchDraft {
    /// Ingredient lines. Order is kept for display only.
    pub items: Vec<LineItem>,
    /// Scales every ingredient cost (2 = double batch). Must be > 0.
    pub batch_multiplier: Decimal,

    pub oil_used_liters: Decimal,
    pub oil_price_per_liter: Money,
    /// Cost of replacing the fryer oil (material + labor).
    pub oil_change_cost: Money,
    /// Batches fried before the oil is replaced. 0 disables amortization.
    pub batches_per_oil_change: u32,

    pub energy_kwh: Decimal,
    pub energy_rate_per_kwh: Money,

    pub labor: Vec<LaborEntry>,

    /// Flat overhead already allocated to this batch upstream.
    pub overhead_allocated: Money,

    /// Units producible before waste. Must be > 0.
    pub theoretical_output: i64,
    /// Fraction of output lost, `0 <= w < 1`.
    pub waste_percent: Decimal,
    pub packaging_per_unit: Money,

    /// Fractional markup for the fixed-markup pricing path (0.5 = +50%).
    pub markup: Decimal,
    /// Flat VAT fraction (0.1 = 10%). Must be >= 0.
    pub vat_percent: Decimal,
    /// Key into the rounding registry.
    pub rounding_rule: String,

    /// Recipe this batch was built from, if any.
    pub recipe_id: Option<String>,
}

impl Default for BatchDraft {
    fn default() -> Self {
        BatchDraft {
            items: Vec::new(),
            batch_multiplier: Decimal::ONE,
            oil_used_liters: Decimal::ZERO,
            oil_price_per_liter: Money::ZERO,
            oil_change_cost: Money::ZERO,
            batches_per_oil_change: 100,
            energy_kwh: Decimal::ZERO,
            energy_rate_per_kwh: Money::ZERO,
            labor: Vec::new(),
            overhead_allocated: Money::ZERO,
            theoretical_output: 100,
            waste_percent: Decimal::new(5, 2),
            packaging_per_unit: Money::ZERO,
            markup: Decimal::new(5, 1),
            vat_percent: Decimal::new(1, 1),
            rounding_rule: DEFAULT_RULE_ID.to_string(),
            recipe_id: None,
        }
    }
}

impl BatchDraft {
    /// Checks the entry invariants and freezes the draft.
    pub fn validate(self) -> Result<BatchSpecification, ValidationError> {
        BatchSpecification::try_from(self)
    }
}

// =============================================================================
// Batch Specification
// =============================================================================

/// A batch draft that passed validation.
///
/// ## Invariants (checked once, at construction)
/// - `theoretical_output > 0`
/// - `0 <= waste_percent < 1`
/// - `batch_multiplier > 0`
/// - `vat_percent >= 0`
///
/// Fields are read through `Deref<Target = BatchDraft>`. To change a value,
/// take the draft back with [`BatchSpecification::into_draft`], edit it and
/// validate again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BatchDraft", into = "BatchDraft")]
pub struct BatchSpecification {
    draft: BatchDraft,
}

impl BatchSpecification {
    /// Returns the underlying draft for editing.
    pub fn into_draft(self) -> BatchDraft {
        self.draft
    }

    /// Copy with every ingredient price and the oil price multiplied by
    /// `factor`. Prices carry no entry invariant, so the copy stays valid.
    /// `None` on overflow.
    pub fn scale_prices(&self, factor: Decimal) -> Option<BatchSpecification> {
        let mut draft = self.draft.clone();
        for item in &mut draft.items {
            item.price_per_unit = item.price_per_unit.checked_mul(factor)?;
        }
        draft.oil_price_per_liter = draft.oil_price_per_liter.checked_mul(factor)?;
        Some(BatchSpecification { draft })
    }
}

impl TryFrom<BatchDraft> for BatchSpecification {
    type Error = ValidationError;

    fn try_from(draft: BatchDraft) -> Result<Self, Self::Error> {
        validation::validate_batch_draft(&draft)?;
        Ok(BatchSpecification { draft })
    }
}

impl From<BatchSpecification> for BatchDraft {
    fn from(spec: BatchSpecification) -> Self {
        spec.draft
    }
}

impl Deref for BatchSpecification {
    type Target = BatchDraft;

    fn deref(&self) -> &BatchDraft {
        &self.draft
    }
}

/// `floor(theoretical_output × (1 − waste_percent))`.
///
/// Floor, never round: a batch only sells whole, fully produced units.
/// `None` if the product overflows or does not fit in `i64`.
pub fn floor_sellable_units(theoretical_output: i64, waste_percent: Decimal) -> Option<i64> {
    let yield_fraction = Decimal::ONE.checked_sub(waste_percent)?;
    Decimal::from(theoretical_output)
        .checked_mul(yield_fraction)?
        .floor()
        .to_i64()
}

// =============================================================================
// Recipe
// =============================================================================

/// A stored recipe: ingredient lines plus the yield parameters.
///
/// Recipes come from an external store; the engine only reads them when
/// building a [`BatchDraft`] (see [`crate::overrides`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub theoretical_output: i64,
    #[serde(default = "default_recipe_waste")]
    pub waste_percent: Decimal,
    #[serde(default = "default_recipe_version")]
    pub version: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_recipe_waste() -> Decimal {
    Decimal::new(5, 2)
}

fn default_recipe_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Recipe {
    /// Expected sellable units for one batch of this recipe. 0 when the
    /// yield parameters leave nothing to sell.
    pub fn sellable_units(&self) -> i64 {
        floor_sellable_units(self.theoretical_output, self.waste_percent)
            .unwrap_or(0)
            .max(0)
    }
}

// =============================================================================
// Cost Category
// =============================================================================

/// Keys of [`BatchResult::cost_breakdown`], in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CostCategory {
    #[serde(rename = "Ingredients")]
    Ingredients,
    #[serde(rename = "Oil & Amortization")]
    OilAndAmortization,
    #[serde(rename = "Energy")]
    Energy,
    #[serde(rename = "Labor")]
    Labor,
    #[serde(rename = "Overhead")]
    Overhead,
    #[serde(rename = "Packaging")]
    Packaging,
}

impl CostCategory {
    pub const ALL: [CostCategory; 6] = [
        CostCategory::Ingredients,
        CostCategory::OilAndAmortization,
        CostCategory::Energy,
        CostCategory::Labor,
        CostCategory::Overhead,
        CostCategory::Packaging,
    ];

    /// Display label, identical to the serialized key.
    pub const fn label(&self) -> &'static str {
        match self {
            CostCategory::Ingredients => "Ingredients",
            CostCategory::OilAndAmortization => "Oil & Amortization",
            CostCategory::Energy => "Energy",
            CostCategory::Labor => "Labor",
            CostCategory::Overhead => "Overhead",
            CostCategory::Packaging => "Packaging",
        }
    }
}

impl std::fmt::Display for CostCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Batch Result
// =============================================================================

/// Output of one costing run.
///
/// ## Trusting the numbers
/// Check [`BatchResult::is_valid`] first. When `errors` is non-empty only the
/// category totals computed before the failure are meaningful; `unit_cost`,
/// `suggested_price`, `margin_percent` and `price_including_vat` stay zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BatchResult {
    pub ingredient_cost: Money,
    /// Oil consumed this batch plus the per-batch share of an oil change.
    pub oil_amortized_cost: Money,
    pub energy_cost: Money,
    pub labor_cost: Money,
    pub overhead_cost: Money,
    pub packaging_cost: Money,

    #[ts(type = "number")]
    pub sellable_units: u64,
    pub total_batch_cost: Money,
    pub unit_cost: Money,

    /// Price before VAT.
    pub suggested_price: Money,
    /// `(suggested_price − unit_cost) / suggested_price`, as a fraction.
    #[ts(type = "string")]
    pub margin_percent: Decimal,
    pub price_including_vat: Money,

    pub cost_breakdown: BTreeMap<CostCategory, Money>,
    /// Per ingredient id. A repeated id keeps the last line's cost.
    pub ingredient_costs: BTreeMap<String, Money>,

    /// Label of the pricing path that produced `suggested_price`.
    pub pricing_strategy: String,
    pub errors: Vec<String>,
}

impl BatchResult {
    /// True iff no computation error was recorded.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
