//! # batchcost
//!
//! Command-line front end for batchcost-core.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          batchcost <command>                            │
//! │                                                                         │
//! │   clap ──► CliConfig::load ──► init_tracing ──► commands::* ──► stdout  │
//! │                                      │                                  │
//! │                                      └──► stderr (logs)                 │
//! │                                                                         │
//! │   Exit codes                                                            │
//! │   ──────────                                                            │
//! │   0  success                                                            │
//! │   1  bad input, bad config, I/O failure (message on stderr)             │
//! │   2  result printed, but the costing run recorded errors                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod config;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use batchcost_core::BatchCostCalculator;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::batch::{SpecArgs, WhatIfArgs};
use crate::commands::pricing::{PriceArgs, RoundArgs};
use crate::commands::recipe::RecipeArgs;
use crate::commands::units::ConvertArgs;
use crate::commands::CommandOutput;
use crate::config::{CliConfig, DEFAULT_LOG_FILTER};

#[derive(Parser, Debug)]
#[command(name = "batchcost", version)]
#[command(about = "Batch costing and pricing for bakery production runs")]
struct Cli {
    /// Config file (default: platform config dir, `config.toml`).
    #[arg(long, global = true, env = "BATCHCOST_CONFIG")]
    config: Option<PathBuf>,

    /// Compact single-line JSON output.
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full cost breakdown and suggested price for a batch.
    Calculate(SpecArgs),
    /// Cost of one sellable unit.
    UnitCost(SpecArgs),
    /// Price one unit under every pricing strategy.
    Compare(SpecArgs),
    /// Price a unit cost with one strategy.
    Price(PriceArgs),
    /// Apply a rounding rule to a price.
    Round(RoundArgs),
    /// List rounding rules.
    Rules,
    /// List pricing strategies.
    Strategies,
    /// Convert a quantity between units.
    Convert(ConvertArgs),
    /// Cost one batch of a stored recipe.
    Recipe(RecipeArgs),
    /// Recompute a batch with ingredient and oil prices changed.
    WhatIf(WhatIfArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = CliConfig::load(cli.config.clone()).context("Failed to load configuration")?;
    init_tracing(&config.log_filter);
    debug!(?config, "Configuration loaded");

    let calculator = BatchCostCalculator::new();
    let output = dispatch(&calculator, &config, &cli.command)?;

    let pretty = config.pretty_output && !cli.compact;
    println!("{}", output.render(pretty)?);

    Ok(if output.has_errors {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

fn dispatch(
    calculator: &BatchCostCalculator,
    config: &CliConfig,
    command: &Command,
) -> anyhow::Result<CommandOutput> {
    match command {
        Command::Calculate(args) => commands::batch::calculate(calculator, config, args),
        Command::UnitCost(args) => commands::batch::unit_cost(calculator, config, args),
        Command::Compare(args) => commands::batch::compare(calculator, config, args),
        Command::WhatIf(args) => commands::batch::what_if(calculator, config, args),
        Command::Price(args) => commands::pricing::price(calculator, args),
        Command::Round(args) => commands::pricing::round(args),
        Command::Rules => commands::pricing::rules(),
        Command::Strategies => commands::pricing::strategies(calculator),
        Command::Convert(args) => commands::units::convert(args),
        Command::Recipe(args) => commands::recipe::recipe(calculator, config, args),
    }
}

/// Initializes the tracing subscriber on stderr.
///
/// `RUST_LOG` wins over the configured filter. An unparsable configured
/// filter falls back to [`DEFAULT_LOG_FILTER`].
fn init_tracing(configured: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::parse_from(["batchcost", "round", "--price", "1234", "--rule", "price99"]);
        assert!(matches!(cli.command, Command::Round(_)));

        let cli = Cli::parse_from([
            "batchcost", "what-if", "--spec", "batch.json", "--change", "-0.2",
        ]);
        let Command::WhatIf(args) = cli.command else {
            panic!("expected what-if");
        };
        assert_eq!(args.change, rust_decimal::Decimal::new(-2, 1));

        let cli = Cli::parse_from([
            "batchcost", "recipe", "--recipe", "r.json", "--param", "oilUsed=3", "--param",
            "markup=0.8",
        ]);
        let Command::Recipe(args) = cli.command else {
            panic!("expected recipe");
        };
        assert_eq!(args.params.len(), 2);
    }

    #[test]
    fn test_dispatch_listing_commands() {
        let calculator = BatchCostCalculator::new();
        let config = CliConfig::default();

        let output = dispatch(&calculator, &config, &Command::Rules).unwrap();
        assert!(!output.has_errors);
        assert_eq!(output.value.as_array().unwrap().len(), 6);

        let output = dispatch(&calculator, &config, &Command::Strategies).unwrap();
        assert_eq!(output.value.as_array().unwrap().len(), 3);
    }
}
