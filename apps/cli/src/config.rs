//! # CLI Configuration
//!
//! Defaults the `batchcost` binary applies when a batch file or the command
//! line leaves something out.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BATCHCOST_ROUNDING_RULE=price99                                    │
//! │     BATCHCOST_VAT_PERCENT=0.11                                         │
//! │     BATCHCOST_LOG=debug                                                │
//! │     BATCHCOST_PRETTY=false                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/batchcost/config.toml (Linux)                            │
//! │     ~/Library/Application Support/com.batchcost.batchcost/config.toml  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     round100, VAT 10%, pretty JSON                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! default_rounding_rule = "round250"
//! default_vat_percent = "0.11"
//! log_filter = "warn,batchcost=debug"
//! pretty_output = true
//!
//! [overrides]
//! markup = "0.6"
//! oilUsed = 3
//! oilPrice = 17500
//! energy = 4
//! energyRate = 3100
//! ```

use batchcost_core::{rounding, BatchOverrides, DEFAULT_RULE_ID};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

/// Filter used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_LOG_FILTER: &str = "warn,batchcost=info";

// =============================================================================
// CLI Configuration
// =============================================================================

/// Complete CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Rounding rule for batch files that do not name one.
    pub default_rounding_rule: String,

    /// VAT fraction for batch files that do not set one.
    pub default_vat_percent: Decimal,

    /// `tracing` filter directive. `RUST_LOG` still wins when set.
    pub log_filter: String,

    /// Pretty-print JSON output.
    pub pretty_output: bool,

    /// Fallback recipe parameters for `batchcost recipe`.
    pub overrides: BatchOverrides,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            default_rounding_rule: DEFAULT_RULE_ID.to_string(),
            default_vat_percent: Decimal::new(1, 1),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            pretty_output: true,
            overrides: BatchOverrides::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (config.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// [`CliConfig::load`] with a custom variable lookup.
    pub fn load_with(
        config_path: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path).map_err(|source| {
                    ConfigError::Read {
                        path: path.clone(),
                        source,
                    }
                })?;
                config = toml::from_str(&contents)
                    .map_err(|source| ConfigError::Parse { path, source })?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides_from(lookup)?;
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// An unknown rounding rule is only logged: the calculator already falls
    /// back to rounding to 100 for it.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_vat_percent < Decimal::ZERO {
            return Err(ConfigError::Invalid(
                "default_vat_percent cannot be negative".into(),
            ));
        }

        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter cannot be empty".into()));
        }

        if rounding::rule(&self.default_rounding_rule).is_none() {
            warn!(
                rule = %self.default_rounding_rule,
                "Unknown default rounding rule, prices will round to 100"
            );
        }

        Ok(())
    }

    /// Applies `BATCHCOST_*` overrides read through `lookup`.
    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(rule) = lookup("BATCHCOST_ROUNDING_RULE") {
            debug!(rule = %rule, "Overriding rounding rule from environment");
            self.default_rounding_rule = rule;
        }

        if let Some(vat) = lookup("BATCHCOST_VAT_PERCENT") {
            self.default_vat_percent =
                vat.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: "BATCHCOST_VAT_PERCENT",
                    value: vat.clone(),
                })?;
        }

        if let Some(filter) = lookup("BATCHCOST_LOG") {
            self.log_filter = filter;
        }

        if let Some(pretty) = lookup("BATCHCOST_PRETTY") {
            self.pretty_output = match pretty.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: "BATCHCOST_PRETTY",
                        value: pretty,
                    })
                }
            };
        }

        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "batchcost", "batchcost")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
