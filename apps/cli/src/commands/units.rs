//! # Unit Commands
//!
//! `batchcost convert QTY FROM TO`.

use batchcost_core::units::{self, UnitDimension};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use super::CommandOutput;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[arg(allow_hyphen_values = true)]
    pub quantity: Decimal,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
struct ConvertOutput {
    quantity: Decimal,
    from: String,
    to: String,
    result: Decimal,
    from_dimension: Option<UnitDimension>,
    to_dimension: Option<UnitDimension>,
}

/// `batchcost convert`
///
/// Unknown units and cross-dimension conversions still produce output; both
/// are logged at warn.
pub fn convert(args: &ConvertArgs) -> anyhow::Result<CommandOutput> {
    let from_dimension = units::dimension(&args.from);
    let to_dimension = units::dimension(&args.to);

    match (from_dimension, to_dimension) {
        (Some(a), Some(b)) if a != b => {
            warn!(from = %args.from, to = %args.to, "Converting across dimensions")
        }
        (None, _) | (_, None) => {
            warn!(from = %args.from, to = %args.to, "Unknown unit, quantity left unchanged")
        }
        _ => {}
    }

    CommandOutput::new(&ConvertOutput {
        quantity: args.quantity,
        from: units::normalize_unit(&args.from),
        to: units::normalize_unit(&args.to),
        result: units::convert(args.quantity, &args.from, &args.to),
        from_dimension,
        to_dimension,
    })
}
