//! # Batch Commands
//!
//! `calculate`, `unit-cost`, `compare` and `what-if`: everything that starts
//! from a batch file.

use batchcost_core::{
    simulate_price_change, BatchCostCalculator, Money, PricingScenario, ScenarioComparison,
    ScenarioStore, StrategyQuote,
};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use super::{load_spec, CommandOutput};
use crate::config::CliConfig;

#[derive(Args, Debug)]
pub struct SpecArgs {
    /// Batch specification JSON file (`-` for stdin).
    #[arg(long, short)]
    pub spec: PathBuf,
}

#[derive(Args, Debug)]
pub struct WhatIfArgs {
    /// Batch specification JSON file (`-` for stdin).
    #[arg(long, short)]
    pub spec: PathBuf,

    /// Ingredient and oil price change as a fraction (0.1 = +10%).
    #[arg(long, allow_hyphen_values = true)]
    pub change: Decimal,
}

#[derive(Debug, Serialize)]
struct UnitCostOutput {
    unit_cost: Money,
}

#[derive(Debug, Serialize)]
struct WhatIfOutput<'a> {
    change: Decimal,
    scenarios: Vec<&'a PricingScenario>,
    comparison: ScenarioComparison,
}

#[derive(Debug, Serialize)]
struct CompareOutput {
    unit_cost: Money,
    quotes: Vec<StrategyQuote>,
}

/// `batchcost calculate`
pub fn calculate(
    calculator: &BatchCostCalculator,
    config: &CliConfig,
    args: &SpecArgs,
) -> anyhow::Result<CommandOutput> {
    let spec = load_spec(&args.spec, config)?;
    let result = calculator.calculate_batch_cost(&spec);

    info!(
        unit_cost = %result.unit_cost,
        suggested_price = %result.suggested_price,
        "Batch calculated"
    );
    Ok(CommandOutput::new(&result)?.with_errors(!result.is_valid()))
}

/// `batchcost unit-cost`
pub fn unit_cost(
    calculator: &BatchCostCalculator,
    config: &CliConfig,
    args: &SpecArgs,
) -> anyhow::Result<CommandOutput> {
    let spec = load_spec(&args.spec, config)?;
    CommandOutput::new(&UnitCostOutput {
        unit_cost: calculator.calculate_unit_cost(&spec),
    })
}

/// `batchcost compare`
pub fn compare(
    calculator: &BatchCostCalculator,
    config: &CliConfig,
    args: &SpecArgs,
) -> anyhow::Result<CommandOutput> {
    let spec = load_spec(&args.spec, config)?;
    let quotes = calculator.compare_strategies(&spec);
    let has_errors = !quotes.iter().all(StrategyQuote::is_valid);

    let output = CompareOutput {
        unit_cost: calculator.calculate_unit_cost(&spec),
        quotes,
    };
    Ok(CommandOutput::new(&output)?.with_errors(has_errors))
}

/// `batchcost what-if`: baseline and adjusted runs side by side.
pub fn what_if(
    calculator: &BatchCostCalculator,
    config: &CliConfig,
    args: &WhatIfArgs,
) -> anyhow::Result<CommandOutput> {
    let spec = load_spec(&args.spec, config)?;
    let recipe_id = spec.recipe_id.clone().unwrap_or_default();

    let baseline = calculator.calculate_batch_cost(&spec);
    let adjusted = simulate_price_change(calculator, &spec, args.change);
    let has_errors = !baseline.is_valid() || !adjusted.is_valid();

    let mut store = ScenarioStore::new();
    let base_id = store.save(PricingScenario::new("Baseline", &recipe_id).with_result(baseline));
    let adjusted_id = store.save(
        PricingScenario::new(format!("Price change {}", args.change), &recipe_id)
            .with_parameter("priceChange", args.change)
            .with_result(adjusted),
    );
    let comparison = store.compare(&base_id, &adjusted_id)?;

    info!(
        change = %args.change,
        difference = %comparison.price_difference,
        "What-if calculated"
    );

    let output = WhatIfOutput {
        change: args.change,
        scenarios: [&base_id, &adjusted_id]
            .into_iter()
            .filter_map(|id| store.get(id))
            .collect(),
        comparison,
    };
    Ok(CommandOutput::new(&output)?.with_errors(has_errors))
}
