// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `siteforge`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "siteforge",
    version,
    about = "Build a static site by running named pipelines of declarative steps.",
    long_about = None
)]
pub struct CliArgs {
    /// Pipeline to run (e.g. default, dev, build, test, compress, cleancss).
    #[arg(value_name = "PIPELINE", default_value = "default")]
    pub pipeline: String,

    /// Path to the config file (TOML).
    ///
    /// Default: `Siteforge.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Siteforge.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEFORGE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the resolved plan, but don't execute any steps.
    #[arg(long)]
    pub dry_run: bool,

    /// Non-interactive mode: lint violations produce a failing exit status.
    #[arg(long)]
    pub ci: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
