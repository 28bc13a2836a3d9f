//! # Pricing Commands
//!
//! `price`, `round`, `rules` and `strategies`: no batch file involved.

use batchcost_core::rounding::{self, RoundingRule};
use batchcost_core::strategy::{CompetitiveParams, MarkupParams, TargetMarginParams};
use anyhow::Context;
use batchcost_core::{BatchCostCalculator, Money, PricingStrategy, StrategyKind};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use super::CommandOutput;

#[derive(Args, Debug)]
pub struct PriceArgs {
    /// Cost of one sellable unit.
    #[arg(long, allow_hyphen_values = true)]
    pub unit_cost: Decimal,

    /// Strategy id or alias (markup-based, target-margin, competitive-rounding).
    #[arg(long)]
    pub strategy: String,

    /// Markup fraction for markup-based and competitive-rounding.
    #[arg(long, allow_hyphen_values = true)]
    pub markup: Option<Decimal>,

    /// Target margin fraction for target-margin.
    #[arg(long)]
    pub target_margin: Option<Decimal>,
}

#[derive(Args, Debug)]
pub struct RoundArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub price: Decimal,

    /// Rounding rule id. Unknown ids leave the price unchanged.
    #[arg(long)]
    pub rule: String,
}

#[derive(Debug, Serialize)]
struct PriceOutput {
    strategy: &'static str,
    name: &'static str,
    unit_cost: Money,
    price: Money,
    margin_percent: Decimal,
}

#[derive(Debug, Serialize)]
struct RoundOutput {
    rule: String,
    known: bool,
    price: Money,
    rounded: Money,
}

/// Builds the strategy for `kind` from the flags it reads, warning about the
/// ones it ignores.
fn strategy_from_args(kind: StrategyKind, args: &PriceArgs) -> PricingStrategy {
    match kind {
        StrategyKind::MarkupBased | StrategyKind::CompetitiveRounding => {
            if args.target_margin.is_some() {
                warn!(strategy = %kind, "--target-margin ignored by this strategy");
            }
            if kind == StrategyKind::MarkupBased {
                PricingStrategy::MarkupBased(MarkupParams {
                    markup: args.markup,
                })
            } else {
                PricingStrategy::CompetitiveRounding(CompetitiveParams {
                    markup: args.markup,
                })
            }
        }
        StrategyKind::TargetMargin => {
            if args.markup.is_some() {
                warn!(strategy = %kind, "--markup ignored by this strategy");
            }
            PricingStrategy::TargetMargin(TargetMarginParams {
                target_margin: args.target_margin,
            })
        }
    }
}

/// `batchcost price`
pub fn price(calculator: &BatchCostCalculator, args: &PriceArgs) -> anyhow::Result<CommandOutput> {
    let kind = calculator.strategy(&args.strategy)?;
    let strategy = strategy_from_args(kind, args);
    let unit_cost = Money::new(args.unit_cost);
    let price = calculator
        .calculate_suggested_price(unit_cost, &strategy)
        .with_context(|| format!("{} could not price unit cost {}", kind.name(), unit_cost))?;

    CommandOutput::new(&PriceOutput {
        strategy: kind.id(),
        name: kind.name(),
        unit_cost,
        price,
        margin_percent: strategy.calculate_margin(unit_cost, price),
    })
}

/// `batchcost round`
pub fn round(args: &RoundArgs) -> anyhow::Result<CommandOutput> {
    let known = rounding::rule(&args.rule).is_some();
    if !known {
        warn!(rule = %args.rule, "Unknown rounding rule, price left unchanged");
    }

    let price = Money::new(args.price);
    CommandOutput::new(&RoundOutput {
        rule: args.rule.clone(),
        known,
        price,
        rounded: rounding::apply_rule(price, &args.rule),
    })
}

/// `batchcost rules`
pub fn rules() -> anyhow::Result<CommandOutput> {
    let rules: &[RoundingRule] = rounding::rules();
    CommandOutput::new(&rules)
}

/// `batchcost strategies`
pub fn strategies(calculator: &BatchCostCalculator) -> anyhow::Result<CommandOutput> {
    CommandOutput::new(&calculator.available_strategies())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::decimal_at;
    use rust_decimal_macros::dec;

    fn price_args(strategy: &str) -> PriceArgs {
        PriceArgs {
            unit_cost: dec!(1000),
            strategy: strategy.to_string(),
            markup: None,
            target_margin: None,
        }
    }

    #[test]
    fn test_price_with_defaults() {
        let calculator = BatchCostCalculator::new();

        let output = price(&calculator, &price_args("markup")).unwrap();
        assert_eq!(output.value["strategy"], "markup-based");
        assert_eq!(decimal_at(&output.value["price"]), dec!(1500));

        let output = price(&calculator, &price_args("competitive")).unwrap();
        assert_eq!(decimal_at(&output.value["price"]), dec!(1400));
    }

    #[test]
    fn test_price_with_target_margin() {
        let args = PriceArgs {
            target_margin: Some(dec!(0.5)),
            ..price_args("target-margin")
        };
        let output = price(&BatchCostCalculator::new(), &args).unwrap();
        assert_eq!(decimal_at(&output.value["price"]), dec!(2000));
        assert_eq!(decimal_at(&output.value["margin_percent"]), dec!(0.5));
    }

    #[test]
    fn test_price_unknown_strategy() {
        let err = price(&BatchCostCalculator::new(), &price_args("cost-plus")).unwrap_err();
        assert!(err.to_string().contains("cost-plus"));
    }

    #[test]
    fn test_price_out_of_range_is_an_error() {
        let args = PriceArgs {
            unit_cost: Decimal::MAX,
            ..price_args("markup")
        };
        let err = price(&BatchCostCalculator::new(), &args).unwrap_err();
        assert!(format!("{err:#}").contains("arithmetic overflow in markup-based"));

        let args = PriceArgs {
            markup: Some(Decimal::MAX / dec!(100)),
            ..price_args("competitive")
        };
        assert!(price(&BatchCostCalculator::new(), &args).is_err());
    }

    #[test]
    fn test_round() {
        let output = round(&RoundArgs {
            price: dec!(1234),
            rule: "price99".to_string(),
        })
        .unwrap();
        assert_eq!(output.value["known"], true);
        assert_eq!(decimal_at(&output.value["rounded"]), dec!(1199));

        let output = round(&RoundArgs {
            price: dec!(1234),
            rule: "round42".to_string(),
        })
        .unwrap();
        assert_eq!(output.value["known"], false);
        assert_eq!(decimal_at(&output.value["rounded"]), dec!(1234));
    }

    #[test]
    fn test_listings() {
        let output = rules().unwrap();
        assert_eq!(output.value.as_array().unwrap().len(), 6);
        assert_eq!(output.value[4]["id"], "price99");
        assert_eq!(output.value[4]["subtract_one"], true);

        let output = strategies(&BatchCostCalculator::new()).unwrap();
        assert_eq!(output.value[1]["id"], "target-margin");
    }
}
