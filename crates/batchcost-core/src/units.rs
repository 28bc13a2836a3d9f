//! # Unit Conversion
//!
//! Static table of unit aliases and their factor relative to a base unit
//! (kilogram for mass, liter for volume, 1 for counts).
//!
//! The calculator does not call into this module: line items are expected to
//! be quoted in the unit their price refers to. Callers that store quantities
//! in mixed units normalize them here before building a draft.
//!
//! Unknown units are never an error. [`convert`] hands the quantity back
//! unchanged.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What a unit measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitDimension {
    Mass,
    Volume,
    Count,
}

/// `(alias, mantissa, scale, dimension)`; factor = mantissa × 10^-scale.
const UNITS: &[(&str, i64, u32, UnitDimension)] = &[
    // mass, base kg
    ("kg", 1, 0, UnitDimension::Mass),
    ("gram", 1, 3, UnitDimension::Mass),
    ("g", 1, 3, UnitDimension::Mass),
    ("mg", 1, 6, UnitDimension::Mass),
    ("pound", 453_592, 6, UnitDimension::Mass),
    ("lb", 453_592, 6, UnitDimension::Mass),
    ("ounce", 283_495, 7, UnitDimension::Mass),
    ("oz", 283_495, 7, UnitDimension::Mass),
    // volume, base liter
    ("liter", 1, 0, UnitDimension::Volume),
    ("l", 1, 0, UnitDimension::Volume),
    ("ml", 1, 3, UnitDimension::Volume),
    ("gallon", 378_541, 5, UnitDimension::Volume),
    ("cup", 236_588, 6, UnitDimension::Volume),
    ("tablespoon", 15, 3, UnitDimension::Volume),
    ("tbsp", 15, 3, UnitDimension::Volume),
    ("teaspoon", 5, 3, UnitDimension::Volume),
    ("tsp", 5, 3, UnitDimension::Volume),
    // count
    ("piece", 1, 0, UnitDimension::Count),
    ("count", 1, 0, UnitDimension::Count),
    ("pcs", 1, 0, UnitDimension::Count),
];

fn lookup(unit: &str) -> Option<(Decimal, UnitDimension)> {
    let unit = unit.trim();
    UNITS
        .iter()
        .find(|(alias, ..)| alias.eq_ignore_ascii_case(unit))
        .map(|&(_, mantissa, scale, dimension)| (Decimal::new(mantissa, scale), dimension))
}

/// Factor of `unit` relative to its base unit, case-insensitive.
pub fn factor(unit: &str) -> Option<Decimal> {
    lookup(unit).map(|(f, _)| f)
}

/// Dimension of `unit`, if known.
pub fn dimension(unit: &str) -> Option<UnitDimension> {
    lookup(unit).map(|(_, d)| d)
}

/// Converts `quantity` from `from_unit` to `to_unit`.
///
/// - Same unit (ignoring case): quantity unchanged.
/// - Either unit unknown: quantity unchanged.
/// - Otherwise `quantity × from_factor / to_factor`.
///
/// Dimensions are not checked; converting kg to liter uses the raw factors.
/// Use [`dimension`] first when that matters.
///
/// ## Example
/// ```rust
/// use batchcost_core::units::convert;
/// use rust_decimal::Decimal;
///
/// assert_eq!(convert(Decimal::ONE, "kg", "gram"), Decimal::from(1000));
/// assert_eq!(convert(Decimal::TEN, "unknown", "kg"), Decimal::TEN);
/// ```
pub fn convert(quantity: Decimal, from_unit: &str, to_unit: &str) -> Decimal {
    if from_unit.eq_ignore_ascii_case(to_unit) {
        return quantity;
    }

    let (Some(from), Some(to)) = (factor(from_unit), factor(to_unit)) else {
        debug!(from_unit, to_unit, "Unknown unit, quantity left unchanged");
        return quantity;
    };

    quantity
        .checked_mul(from)
        .and_then(|base| base.checked_div(to))
        .unwrap_or(quantity)
}

/// Every alias in the table, in table order.
pub fn supported_units() -> impl Iterator<Item = &'static str> {
    UNITS.iter().map(|(alias, ..)| *alias)
}

/// Lowercases and trims a known unit; anything else comes back trimmed.
pub fn normalize_unit(unit: &str) -> String {
    let trimmed = unit.trim();
    match UNITS
        .iter()
        .find(|(alias, ..)| alias.eq_ignore_ascii_case(trimmed))
    {
        Some((alias, ..)) => (*alias).to_string(),
        None => trimmed.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
