//! # Recipe Overrides
//!
//! Builds a [`BatchDraft`] from a stored [`Recipe`] plus the handful of
//! per-run knobs a caller typically tweaks.
//!
//! ```text
//!   Recipe ───────────────┐
//!   (items, yield, waste) │
//!                         ├──► BatchDraft::from_recipe ──► validate() ──► BatchSpecification
//!   BatchOverrides ───────┘
//!   (markup, oil, energy)
//! ```
//!
//! Loose `{ "oilUsed": 3, ... }` maps coming from a UI go through
//! [`BatchOverrides::from_parameter_map`] first, so every key is typed before
//! it reaches the draft.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::money::Money;
use crate::strategy::DEFAULT_MARKUP;
use crate::types::{BatchDraft, Recipe};

pub const DEFAULT_OIL_USED_LITERS: Decimal = Decimal::from_parts(2, 0, 0, false, 0);
pub const DEFAULT_OIL_PRICE_PER_LITER: Decimal = Decimal::from_parts(18000, 0, 0, false, 0);
pub const DEFAULT_ENERGY_KWH: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
pub const DEFAULT_ENERGY_RATE_PER_KWH: Decimal = Decimal::from_parts(3000, 0, 0, false, 0);

// =============================================================================
// Batch Overrides
// =============================================================================

/// Per-run parameters layered on top of a recipe. `None` means "default".
///
/// | Key          | Field         | Default |
/// |--------------|---------------|---------|
/// | `markup`     | `markup`      | 0.5     |
/// | `oilUsed`    | `oil_used`    | 2       |
/// | `oilPrice`   | `oil_price`   | 18000   |
/// | `energy`     | `energy`      | 5       |
/// | `energyRate` | `energy_rate` | 3000    |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oil_used: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oil_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_rate: Option<Decimal>,
}

impl BatchOverrides {
    /// Reads the known keys out of a loose parameter map.
    ///
    /// Unknown keys are skipped.
    ///
    /// ## Example
    /// ```rust
    /// use batchcost_core::overrides::BatchOverrides;
    /// use rust_decimal::Decimal;
    /// use std::collections::BTreeMap;
    ///
    /// let params = BTreeMap::from([
    ///     ("oilUsed".to_string(), Decimal::from(3)),
    ///     ("colour".to_string(), Decimal::ONE),
    /// ]);
    /// let overrides = BatchOverrides::from_parameter_map(&params);
    /// assert_eq!(overrides.oil_used(), Decimal::from(3));
    /// assert_eq!(overrides.energy(), Decimal::from(5));
    /// ```
    pub fn from_parameter_map(params: &BTreeMap<String, Decimal>) -> Self {
        let mut overrides = BatchOverrides::default();

        for (key, &value) in params {
            match key.as_str() {
                "markup" => overrides.markup = Some(value),
                "oilUsed" => overrides.oil_used = Some(value),
                "oilPrice" => overrides.oil_price = Some(value),
                "energy" => overrides.energy = Some(value),
                "energyRate" => overrides.energy_rate = Some(value),
                other => debug!(key = other, "Ignoring unknown batch parameter"),
            }
        }

        overrides
    }

    /// Fills every unset field from `fallback`.
    pub fn or(self, fallback: BatchOverrides) -> Self {
        BatchOverrides {
            markup: self.markup.or(fallback.markup),
            oil_used: self.oil_used.or(fallback.oil_used),
            oil_price: self.oil_price.or(fallback.oil_price),
            energy: self.energy.or(fallback.energy),
            energy_rate: self.energy_rate.or(fallback.energy_rate),
        }
    }

    pub fn markup(&self) -> Decimal {
        self.markup.unwrap_or(DEFAULT_MARKUP)
    }

    pub fn oil_used(&self) -> Decimal {
        self.oil_used.unwrap_or(DEFAULT_OIL_USED_LITERS)
    }

    pub fn oil_price(&self) -> Money {
        Money::new(self.oil_price.unwrap_or(DEFAULT_OIL_PRICE_PER_LITER))
    }

    pub fn energy(&self) -> Decimal {
        self.energy.unwrap_or(DEFAULT_ENERGY_KWH)
    }

    pub fn energy_rate(&self) -> Money {
        Money::new(self.energy_rate.unwrap_or(DEFAULT_ENERGY_RATE_PER_KWH))
    }
}

// =============================================================================
// Draft From Recipe
// =============================================================================

impl BatchDraft {
    /// Draft for one batch of `recipe`.
    ///
    /// Items and yield come from the recipe; markup, oil and energy from
    /// `overrides`. Everything else keeps the [`BatchDraft::default`] value.
    /// The result is not validated yet.
    pub fn from_recipe(recipe: &Recipe, overrides: &BatchOverrides) -> Self {
        BatchDraft {
            items: recipe.items.clone(),
            theoretical_output: recipe.theoretical_output,
            waste_percent: recipe.waste_percent,
            markup: overrides.markup(),
            oil_used_liters: overrides.oil_used(),
            oil_price_per_liter: overrides.oil_price(),
            energy_kwh: overrides.energy(),
            energy_rate_per_kwh: overrides.energy_rate(),
            recipe_id: Some(recipe.id.clone()),
            ..BatchDraft::default()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
