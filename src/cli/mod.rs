//! The `mplcheck` command-line interface.
//!
//! Exit status: 0 when no error-severity diagnostic is reported, 1 when at
//! least one is, 2 when the package or the configuration cannot be loaded.

use std::process;

use clap::Parser;
use miette::IntoDiagnostic;
use termcolor::StandardStream;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::args::{CheckArgs, OutputFormat};
use crate::config::CheckConfig;
use crate::engine::Checker;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = CheckArgs::parse();
    init_logging(args.log_level());

    match execute(&args) {
        Ok(false) => {}
        Ok(true) => process::exit(1),
        Err(report) => {
            eprintln!("{:?}", report);
            process::exit(2);
        }
    }
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // a second initialisation (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Runs one check; returns whether any error-severity diagnostic was reported.
fn execute(args: &CheckArgs) -> miette::Result<bool> {
    let mut config = match &args.config {
        Some(path) => CheckConfig::load(path)?,
        None => CheckConfig::default(),
    };
    args.apply(&mut config);
    tracing::debug!(?config, "configuration");

    let checker = Checker::new(config);
    let diagnostics = checker.check_path(&args.pkg_path)?;

    let fallback = args.pkg_path.display().to_string();
    match args.format {
        OutputFormat::Plain => {
            let mut stdout = StandardStream::stdout(args.color.choice());
            output::write_plain(&mut stdout, &diagnostics, &fallback).into_diagnostic()?;
        }
        OutputFormat::Json => {
            let mut stdout = std::io::stdout().lock();
            output::write_json(&mut stdout, &diagnostics).into_diagnostic()?;
        }
    }

    let (errors, warnings) = output::summarize(&diagnostics);
    tracing::info!(errors, warnings, "done");
    Ok(errors > 0)
}
