//! # CLI Error Types
//!
//! Configuration failures get their own type so `main` can tell a bad
//! `config.toml` apart from a bad batch file. Everything else travels as
//! `anyhow::Error` with context attached at the call site.
//!
//! ```text
//!   config.toml / BATCHCOST_* ──► ConfigError ──┐
//!   --spec / --recipe files  ──► io / serde ────┼──► anyhow::Error ──► stderr, exit 1
//!   BatchDraft::validate     ──► ValidationError┘
//!   BatchResult.errors non-empty ───────────────────► stdout, exit 2
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or validating [`crate::config::CliConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::config::CliConfig`].
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An environment variable holds a value of the wrong type.
    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },

    /// A value parsed fine but breaks a rule.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ConfigError::InvalidEnv {
            var: "BATCHCOST_PRETTY",
            value: "maybe".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for BATCHCOST_PRETTY: maybe");

        let err = ConfigError::Invalid("default_vat_percent cannot be negative".to_string());
        assert!(err.to_string().contains("default_vat_percent"));
    }
}
