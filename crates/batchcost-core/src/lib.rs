//! # batchcost-core: Pure Costing Engine for Batchcost
//!
//! This crate turns a bakery production batch (ingredients, fryer oil,
//! energy, labor, overhead, packaging, yield and waste) into a per-unit cost
//! and a market-ready selling price. Everything here is pure computation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Batchcost Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    batchcost CLI (apps/cli)                     │   │
//! │  │    config.toml ──► JSON spec / recipe ──► JSON result on stdout │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ batchcost-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ calculator│  │ strategy  │  │ rounding  │  │   │
//! │  │   │ BatchDraft│  │  pipeline │  │  markup   │  │  round100 │  │   │
//! │  │   │ BatchResult│ │  breakdown│  │  margin   │  │  price99  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │ validation│  │ overrides │  │ scenario  │  │   │
//! │  │   │  Decimal  │  │ invariants│  │  recipes  │  │  what-if  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO GLOBAL STATE          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (BatchDraft, BatchSpecification, BatchResult, Recipe)
//! - [`money`] - Money type over a 128-bit decimal (no floating point!)
//! - [`error`] - Validation and computation errors
//! - [`validation`] - Entry invariants of a batch
//! - [`calculator`] - The costing pipeline
//! - [`strategy`] - Markup, target-margin and competitive pricing
//! - [`rounding`] - Named rounding rules
//! - [`units`] - Unit conversion table
//! - [`overrides`] - Recipe + per-run parameters → draft
//! - [`scenario`] - Saved what-if results and price-change simulation
//!
//! ## Example Usage
//!
//! ```rust
//! use batchcost_core::{BatchCostCalculator, BatchDraft, LineItem, Money};
//! use rust_decimal::Decimal;
//!
//! let spec = BatchDraft {
//!     items: vec![
//!         LineItem::new("flour", Decimal::from(3), "kg", Money::from_major(12500)),
//!         LineItem::new("sugar", Decimal::new(15, 1), "kg", Money::from_major(14000)),
//!     ],
//!     ..BatchDraft::default()
//! }
//! .validate()
//! .expect("defaults are valid");
//!
//! let result = BatchCostCalculator::new().calculate_batch_cost(&spec);
//! assert!(result.is_valid());
//! assert_eq!(result.ingredient_cost, Money::from_major(58500));
//! assert_eq!(result.sellable_units, 95);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod error;
pub mod money;
pub mod overrides;
pub mod rounding;
pub mod scenario;
pub mod strategy;
pub mod types;
pub mod units;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use batchcost_core::Money` instead of
// `use batchcost_core::money::Money`

pub use calculator::{BatchCostCalculator, StrategyQuote, FIXED_MARKUP_LABEL};
pub use error::{ComputationError, CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use overrides::BatchOverrides;
pub use rounding::{RoundingRule, DEFAULT_RULE_ID};
pub use scenario::{simulate_price_change, PricingScenario, ScenarioComparison, ScenarioStore};
pub use strategy::{PricingStrategy, StrategyDescriptor, StrategyKind};
pub use types::*;
