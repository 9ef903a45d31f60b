//! Command-line arguments of `mplcheck`.
//!
//! Flags override the values read from `--config`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use termcolor::ColorChoice;

use crate::config::{parse_code_list, CheckConfig};

#[derive(Debug, Parser)]
#[command(
    name = "mplcheck",
    version,
    about = "Checks MuranoPL packages for structural and semantic mistakes."
)]
pub struct CheckArgs {
    /// Package directory or zip archive.
    #[arg(required = true)]
    pub pkg_path: PathBuf,

    /// Only report codes starting with one of these prefixes (comma-separated).
    #[arg(long, value_name = "CODES")]
    pub select: Option<String>,

    /// Never report codes starting with one of these prefixes (comma-separated).
    #[arg(long, value_name = "CODES")]
    pub ignore: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// YAML file with `select`, `ignore` and `expression` settings.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Log more (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `file:line:column: CODE message`
    Plain,
    /// A JSON array of diagnostics.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

impl CheckArgs {
    /// Overrides config file values with the flags that were given.
    pub fn apply(&self, config: &mut CheckConfig) {
        if let Some(select) = &self.select {
            config.select = parse_code_list(select);
        }
        if let Some(ignore) = &self.ignore {
            config.ignore = parse_code_list(ignore);
        }
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
