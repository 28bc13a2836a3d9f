//! # CLI Commands
//!
//! One function per subcommand. Each returns a [`CommandOutput`]; `main`
//! decides how to print it and which exit code to use.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (shared input/output helpers)
//! ├── batch.rs    ◄─── calculate, unit-cost, compare, what-if
//! ├── pricing.rs  ◄─── price, round, rules, strategies
//! ├── recipe.rs   ◄─── recipe + --param overrides
//! └── units.rs    ◄─── convert
//! ```
//!
//! ## Input Files
//! `--spec` and `--recipe` take a JSON file path, or `-` for stdin. Batch
//! files may omit any field; `rounding_rule` and `vat_percent` then come
//! from [`CliConfig`], everything else from `BatchDraft::default()`.

pub mod batch;
pub mod pricing;
pub mod recipe;
pub mod units;

use anyhow::{bail, Context};
use batchcost_core::{BatchDraft, BatchSpecification};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::config::CliConfig;

// =============================================================================
// Command Output
// =============================================================================

/// What a command produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    /// Printed to stdout as JSON.
    pub value: Value,
    /// A costing run recorded errors; the value is still printed.
    pub has_errors: bool,
}

impl CommandOutput {
    pub fn new(value: &impl Serialize) -> anyhow::Result<Self> {
        Ok(CommandOutput {
            value: serde_json::to_value(value).context("Failed to serialize output")?,
            has_errors: false,
        })
    }

    pub fn with_errors(mut self, has_errors: bool) -> Self {
        self.has_errors = has_errors;
        self
    }

    /// Renders the value, pretty or compact.
    pub fn render(&self, pretty: bool) -> anyhow::Result<String> {
        let text = if pretty {
            serde_json::to_string_pretty(&self.value)?
        } else {
            serde_json::to_string(&self.value)?
        };
        Ok(text)
    }
}

// =============================================================================
// Input Helpers
// =============================================================================

/// Reads a whole file, or stdin for `-`.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Parses a JSON file into `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = read_input(path)?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Loads a batch file, fills config defaults and validates it.
pub fn load_spec(path: &Path, config: &CliConfig) -> anyhow::Result<BatchSpecification> {
    let value: Value = read_json(path)?;
    let draft = draft_with_defaults(value, config)
        .with_context(|| format!("Invalid batch file {}", path.display()))?;

    debug!(path = %path.display(), items = draft.items.len(), "Batch file loaded");
    draft.validate().context("Batch specification rejected")
}

/// Fills `rounding_rule` and `vat_percent` from config when the JSON omits
/// them.
pub fn draft_with_defaults(value: Value, config: &CliConfig) -> anyhow::Result<BatchDraft> {
    let Value::Object(mut fields) = value else {
        bail!("expected a JSON object");
    };

    fields
        .entry("rounding_rule")
        .or_insert_with(|| Value::String(config.default_rounding_rule.clone()));
    if !fields.contains_key("vat_percent") {
        fields.insert(
            "vat_percent".to_string(),
            serde_json::to_value(config.default_vat_percent)?,
        );
    }

    Ok(serde_json::from_value(Value::Object(fields))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::io::Write;

    /// Decimal behind a serialized amount, whatever its scale.
    pub(crate) fn decimal_at(value: &Value) -> rust_decimal::Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    pub(crate) fn spec_file(value: &Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(value.to_string().as_bytes()).unwrap();
        file
    }

    fn config() -> CliConfig {
        CliConfig {
            default_rounding_rule: "price99".to_string(),
            default_vat_percent: dec!(0.2),
            ..CliConfig::default()
        }
    }

    #[test]
    fn test_config_fills_missing_fields() {
        let draft = draft_with_defaults(json!({"theoretical_output": 50}), &config()).unwrap();
        assert_eq!(draft.rounding_rule, "price99");
        assert_eq!(draft.vat_percent, dec!(0.2));
        assert_eq!(draft.theoretical_output, 50);
        assert_eq!(draft.waste_percent, dec!(0.05));
    }

    #[test]
    fn test_file_values_win_over_config() {
        let draft = draft_with_defaults(
            json!({"rounding_rule": "round500", "vat_percent": "0"}),
            &config(),
        )
        .unwrap();
        assert_eq!(draft.rounding_rule, "round500");
        assert_eq!(draft.vat_percent, dec!(0));
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(draft_with_defaults(json!([1, 2]), &config()).is_err());
    }

    #[test]
    fn test_load_spec_validates() {
        let file = spec_file(&json!({"theoretical_output": 0}));
        let err = load_spec(file.path(), &config()).unwrap_err();
        assert!(format!("{err:#}").contains("theoretical_output"), "{err:#}");

        let file = spec_file(&json!({"waste_percent": "0.1"}));
        let spec = load_spec(file.path(), &config()).unwrap();
        assert_eq!(spec.waste_percent, dec!(0.1));
    }

    #[test]
    fn test_render() {
        let output = CommandOutput::new(&json!({"a": 1})).unwrap();
        assert_eq!(output.render(false).unwrap(), r#"{"a":1}"#);
        assert!(output.render(true).unwrap().contains('\n'));
        assert!(!output.has_errors);
    }
}
