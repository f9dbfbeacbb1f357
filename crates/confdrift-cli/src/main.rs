//! confdrift - configuration drift detector.
//!
//! Loads two YAML/JSON configuration files, compares them with the drift
//! engine, and renders every difference grouped by kind.
//!
//! Exit codes follow the diff(1) convention: 0 when the documents match,
//! 1 when drift was found, 2 on load or usage errors.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use confdrift_core::{compare, load};
use tracing_subscriber::EnvFilter;

mod render;

/// Exit codes, diff(1) convention.
mod exit_codes {
    pub const NO_DRIFT: u8 = 0;
    pub const DRIFT_FOUND: u8 = 1;
    pub const ERROR: u8 = 2;
}

/// confdrift - detect configuration drift between two YAML/JSON documents
#[derive(Parser, Debug)]
#[command(name = "confdrift")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base configuration file (e.g. staging)
    base: PathBuf,

    /// Target configuration file to compare against the base (e.g.
    /// production)
    target: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable, grouped by drift kind.
    Text,
    /// Machine-readable JSON report.
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::from(exit_codes::DRIFT_FOUND),
        Ok(false) => ExitCode::from(exit_codes::NO_DRIFT),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(exit_codes::ERROR)
        },
    }
}

/// Loads both documents, compares, renders. Returns whether drift was found.
fn run(cli: &Cli) -> Result<bool> {
    let base = load(&cli.base)
        .with_context(|| format!("failed to load base document {}", cli.base.display()))?;
    let target = load(&cli.target)
        .with_context(|| format!("failed to load target document {}", cli.target.display()))?;

    let report = compare(&base, &target);
    tracing::debug!(
        added = report.added.len(),
        removed = report.removed.len(),
        modified = report.modified.len(),
        "comparison complete"
    );

    let rendered = match cli.format {
        OutputFormat::Text => render::render_text(&report),
        OutputFormat::Json => render::render_json(&report),
    };
    print!("{rendered}");

    Ok(!report.is_empty())
}
