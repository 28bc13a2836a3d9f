//! # Validation Module
//!
//! Entry invariants for a costing run.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Two Error Channels                                 │
//! │                                                                         │
//! │  BatchDraft                                                             │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  validate_batch_draft() ← THIS MODULE                                  │
//! │      │                                                                  │
//! │      ├── violation? → Err(ValidationError)   (call rejected, no math)  │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  BatchSpecification                                                     │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  calculate_batch_cost()                                                 │
//! │      │                                                                  │
//! │      └── zero sellable units / overflow → BatchResult.errors           │
//! │                                                                         │
//! │  Values are never coerced into range. A waste of 1.2 is rejected, not  │
//! │  clamped to 0.99.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deliberately NOT validated: markup (no ceiling, negative allowed), unknown
//! rounding rule ids, negative costs or quantities.

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::{BatchDraft, Recipe};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Batch Draft
// =============================================================================

/// Validates every entry invariant of a batch draft.
///
/// Checks run in a fixed order and the first violation wins:
/// theoretical output, waste, batch multiplier, VAT.
///
/// ## Example
/// ```rust
/// use batchcost_core::types::BatchDraft;
/// use batchcost_core::validation::validate_batch_draft;
///
/// assert!(validate_batch_draft(&BatchDraft::default()).is_ok());
///
/// let draft = BatchDraft { theoretical_output: 0, ..BatchDraft::default() };
/// let err = validate_batch_draft(&draft).unwrap_err();
/// assert_eq!(err.field(), "theoretical_output");
/// ```
pub fn validate_batch_draft(draft: &BatchDraft) -> ValidationResult<()> {
    validate_theoretical_output(draft.theoretical_output)?;
    validate_waste_percent(draft.waste_percent)?;
    validate_batch_multiplier(draft.batch_multiplier)?;
    validate_vat_percent(draft.vat_percent)?;
    Ok(())
}

// =============================================================================
// Recipe
// =============================================================================

/// Checks a stored recipe before it is turned into a draft.
///
/// Identity fields must be non-blank, every line must name its ingredient and
/// the yield parameters follow the same rules as a batch draft.
pub fn validate_recipe(recipe: &Recipe) -> ValidationResult<()> {
    validate_required("id", &recipe.id)?;
    validate_required("name", &recipe.name)?;
    for item in &recipe.items {
        validate_required("ingredient_id", &item.ingredient_id)?;
    }
    validate_theoretical_output(recipe.theoretical_output)?;
    validate_waste_percent(recipe.waste_percent)?;
    Ok(())
}

/// `value` must contain something other than whitespace.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// `theoretical_output` must be > 0.
pub fn validate_theoretical_output(output: i64) -> ValidationResult<()> {
    if output <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "theoretical_output".to_string(),
        });
    }

    Ok(())
}

/// `waste_percent` must satisfy `0 <= w < 1`.
///
/// 1 is excluded: a batch that wastes everything is an input mistake, while
/// a high-but-legal waste that floors to 0 units is reported in the result.
pub fn validate_waste_percent(waste: Decimal) -> ValidationResult<()> {
    if waste < Decimal::ZERO || waste >= Decimal::ONE {
        return Err(ValidationError::OutOfRange {
            field: "waste_percent".to_string(),
            constraint: "[0, 1)".to_string(),
        });
    }

    Ok(())
}

/// `batch_multiplier` must be > 0.
pub fn validate_batch_multiplier(multiplier: Decimal) -> ValidationResult<()> {
    if multiplier <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "batch_multiplier".to_string(),
        });
    }

    Ok(())
}

/// `vat_percent` must be >= 0.
pub fn validate_vat_percent(vat: Decimal) -> ValidationResult<()> {
    if vat < Decimal::ZERO {
        return Err(ValidationError::Negative {
            field: "vat_percent".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
