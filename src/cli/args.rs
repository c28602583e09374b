//! Defines the command-line arguments and subcommands for the casebook CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "casebook",
    version,
    about = "Runs parametrized test cases: one function, a table of cases, one result per case."
)]
pub struct CasebookArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the built-in suites and any case tables, then report.
    Run(RunArgs),
    /// List every registered test without running it.
    List {
        /// Directory of YAML case tables to register alongside the built-in suites.
        #[arg(long)]
        tables: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Directory of YAML case tables to register alongside the built-in suites.
    #[arg(long)]
    pub tables: Option<PathBuf>,

    /// Run only tests whose name contains this text (case-insensitive).
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Human)]
    pub format: Format,

    /// When to color human output.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Per-case timeout in milliseconds.
    #[arg(long, value_parser = RangedU64ValueParser::<u64>::new().range(1..))]
    pub timeout_ms: Option<u64>,

    /// Largest number of cases accepted from a single source.
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub max_cases: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_run(extra: &[&str]) -> Result<RunArgs, clap::Error> {
        let argv = ["casebook", "run"].into_iter().chain(extra.iter().copied());
        CasebookArgs::try_parse_from(argv).map(|args| match args.command {
            Command::Run(run) => run,
            Command::List { .. } => unreachable!("parsed `run`"),
        })
    }

    #[test]
    fn limits_must_be_positive() {
        assert!(parse_run(&["--timeout-ms", "0"]).is_err());
        assert!(parse_run(&["--max-cases", "0"]).is_err());

        let run = parse_run(&["--timeout-ms", "1", "--max-cases", "1"]).unwrap();
        assert_eq!(run.timeout_ms, Some(1));
        assert_eq!(run.max_cases, Some(1));
    }
}
