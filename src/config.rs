//! Checker configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command-line flags.

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unable to read config file {path}: {source}")]
    #[diagnostic(code(mplcheck::config::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    #[diagnostic(code(mplcheck::config::parse), help("see `mplcheck --help` for the accepted keys"))]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Bounds on the work spent checking one expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExpressionLimits {
    /// Longest expression accepted, in bytes.
    pub max_length: usize,
    /// Parser call budget per expression; 0 disables the limit.
    pub call_limit: usize,
}

impl Default for ExpressionLimits {
    fn default() -> Self {
        Self {
            max_length: 4096,
            call_limit: 100_000,
        }
    }
}

/// Top-level configuration.
///
/// `select` and `ignore` hold code prefixes: `E2` matches every `E2xx` code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CheckConfig {
    pub select: Vec<String>,
    pub ignore: Vec<String>,
    pub expression: ExpressionLimits,
}

impl CheckConfig {
    pub fn from_yaml_str(text: &str, path: &str) -> Result<Self, ConfigError> {
        // an empty file deserializes to null
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_yaml_str(&text, &display)
    }

    /// Whether diagnostics with `code` should be reported.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mplcheck::config::CheckConfig;
    /// let config = CheckConfig {
    ///     select: vec!["E2".into()],
    ///     ignore: vec!["E202".into()],
    ///     ..Default::default()
    /// };
    /// assert!(config.is_enabled("E205"));
    /// assert!(!config.is_enabled("E202"));
    /// assert!(!config.is_enabled("W010"));
    /// ```
    pub fn is_enabled(&self, code: &str) -> bool {
        let selected =
            self.select.is_empty() || self.select.iter().any(|prefix| code.starts_with(prefix.as_str()));
        let ignored = self.ignore.iter().any(|prefix| code.starts_with(prefix.as_str()));
        selected && !ignored
    }
}

/// Splits a comma-separated code list (`E001,W002`).
pub fn parse_code_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}
