//! # Recipe Command
//!
//! `batchcost recipe --recipe FILE [--param key=value]...`
//!
//! Parameter precedence, highest first: `--param`, the config file's
//! `[overrides]` table, the built-in defaults.

use anyhow::Context;
use batchcost_core::validation::validate_recipe;
use batchcost_core::{BatchCostCalculator, BatchDraft, BatchOverrides, BatchResult, Recipe};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

use super::{read_json, CommandOutput};
use crate::config::CliConfig;

#[derive(Args, Debug)]
pub struct RecipeArgs {
    /// Recipe JSON file (`-` for stdin).
    #[arg(long, short)]
    pub recipe: PathBuf,

    /// Batch parameter, e.g. `--param oilUsed=3`. Known keys: markup,
    /// oilUsed, oilPrice, energy, energyRate. Repeatable.
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, Decimal)>,
}

/// Parses `key=value` with a decimal value.
pub fn parse_param(raw: &str) -> Result<(String, Decimal), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in `{raw}`"));
    }

    let value: Decimal = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid number for {key}: {e}"))?;
    Ok((key.to_string(), value))
}

#[derive(Debug, Serialize)]
struct RecipeOutput<'a> {
    recipe_id: &'a str,
    recipe_name: &'a str,
    overrides: BatchOverrides,
    result: BatchResult,
}

/// `batchcost recipe`
pub fn recipe(
    calculator: &BatchCostCalculator,
    config: &CliConfig,
    args: &RecipeArgs,
) -> anyhow::Result<CommandOutput> {
    let recipe: Recipe = read_json(&args.recipe)?;
    validate_recipe(&recipe).context("Recipe rejected")?;

    let params: BTreeMap<String, Decimal> = args.params.iter().cloned().collect();
    let overrides = BatchOverrides::from_parameter_map(&params).or(config.overrides);

    let draft = BatchDraft {
        rounding_rule: config.default_rounding_rule.clone(),
        vat_percent: config.default_vat_percent,
        ..BatchDraft::from_recipe(&recipe, &overrides)
    };
    let spec = draft.validate().context("Batch specification rejected")?;
    let result = calculator.calculate_batch_cost(&spec);

    info!(
        recipe_id = %recipe.id,
        unit_cost = %result.unit_cost,
        suggested_price = %result.suggested_price,
        "Recipe costed"
    );

    let has_errors = !result.is_valid();
    let output = RecipeOutput {
        recipe_id: &recipe.id,
        recipe_name: &recipe.name,
        overrides,
        result,
    };
    Ok(CommandOutput::new(&output)?.with_errors(has_errors))
}
