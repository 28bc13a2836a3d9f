//! # Error Types
//!
//! Domain-specific error types for batchcost-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  Channel 1: rejected call (fail fast, before any arithmetic)           │
//! │  └── ValidationError   - BatchDraft violates an entry invariant        │
//! │                                                                         │
//! │  Channel 2: carried in BatchResult::errors (call still returns)        │
//! │  └── ComputationError  - zero sellable units, arithmetic overflow      │
//! │                                                                         │
//! │  Everything else                                                       │
//! │  └── CoreError         - strategy lookup, scenario store, overflow     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CLI (anyhow) → stderr             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unknown rounding rules and unknown units are NOT errors anywhere in this
//! crate. They fall back to fixed behavior (see [`crate::rounding`] and
//! [`crate::units`]).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors from operations outside the calculation pipeline.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Strategy id is not in the registered set.
    #[error("Unknown pricing strategy: {0}")]
    UnknownStrategy(String),

    /// Scenario id is not in the store.
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    /// Scenario was saved without a calculation result, so it has no price
    /// to compare.
    #[error("Scenario {0} has no calculation result")]
    ScenarioWithoutResult(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Arithmetic fault outside a batch run (scenario comparison).
    #[error(transparent)]
    Computation(#[from] ComputationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Batch specification invariant violations.
///
/// Raised by [`crate::types::BatchDraft::validate`] before any computation
/// runs. Every variant names the offending field so callers can point the
/// user at the right input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly greater than zero.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Value must not be below zero.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Value falls outside an allowed interval.
    #[error("{field} must be in range {constraint}")]
    OutOfRange { field: String, constraint: String },
}

impl ValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::MustBePositive { field }
            | ValidationError::Negative { field }
            | ValidationError::OutOfRange { field, .. } => field,
        }
    }
}

// =============================================================================
// Computation Error
// =============================================================================

/// Failures detected while a calculation is already running.
///
/// These never escape [`crate::calculator::BatchCostCalculator::calculate_batch_cost`]
/// as `Err`; they are rendered to strings and appended to
/// [`crate::types::BatchResult::errors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ComputationError {
    /// Waste consumed the whole theoretical output.
    #[error("sellable units must be greater than 0")]
    NoSellableUnits,

    /// A decimal operation left the representable range.
    #[error("error calculating batch cost: arithmetic overflow in {step}")]
    Overflow { step: &'static str },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "theoretical_output".to_string(),
        };
        assert_eq!(err.to_string(), "theoretical_output must be greater than 0");
        assert_eq!(err.field(), "theoretical_output");

        let err = ValidationError::OutOfRange {
            field: "waste_percent".to_string(),
            constraint: "[0, 1)".to_string(),
        };
        assert_eq!(err.to_string(), "waste_percent must be in range [0, 1)");
    }

    #[test]
    fn test_computation_error_messages() {
        assert_eq!(
            ComputationError::NoSellableUnits.to_string(),
            "sellable units must be greater than 0"
        );
        let err = ComputationError::Overflow { step: "labor" };
        assert!(err.to_string().contains("labor"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Negative {
            field: "vat_percent".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = ComputationError::Overflow { step: "price difference" }.into();
        assert_eq!(
            core_err.to_string(),
            "error calculating batch cost: arithmetic overflow in price difference"
        );
    }
}
