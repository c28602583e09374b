//! The casebook command-line interface.
//!
//! This module is the main entry point for all CLI commands: it builds the
//! registry (built-in suites plus any case tables), runs it, renders the
//! report, and turns the outcome into a process exit code.

use std::io;
use std::path::Path;

use clap::Parser;
use miette::IntoDiagnostic;
use termcolor::StandardStream;

use crate::calculate;
use crate::cli::args::{CasebookArgs, Command, Format};
use crate::cli::config::HostConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::registry::Registry;
use crate::runner::Runner;
use crate::table::discover_tables;

pub mod args;
pub mod config;
pub mod output;

pub use crate::error::EXIT_CONFIG_ERROR;

/// The main entry point for the CLI. Returns the process exit code.
pub fn run() -> i32 {
    let args = CasebookArgs::parse();

    let result = match args.command {
        Command::Run(run_args) => handle_run(HostConfig::from_run_args(run_args)),
        Command::List { tables } => handle_list(tables.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{:?}", report);
            EXIT_CONFIG_ERROR
        }
    }
}

/// Registers the built-in suites and every table found under `tables`.
pub fn build_registry(tables: Option<&Path>) -> ConfigResult<Registry> {
    let mut registry = Registry::new();
    calculate::register_suites(&mut registry)?;

    if let Some(dir) = tables {
        if !dir.is_dir() {
            return Err(ConfigError::Io {
                path: dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "case table directory not found"),
            });
        }
        for path in discover_tables(dir) {
            tracing::debug!(table = %path.display(), "registering case table");
            calculate::register_table(&mut registry, &path)?;
        }
    }
    Ok(registry)
}

/// Handles the `run` subcommand.
fn handle_run(config: HostConfig) -> miette::Result<i32> {
    let registry = build_registry(config.tables.as_deref())?;
    tracing::info!(tests = registry.len(), "running registry");

    let runner = Runner::new(config.runner.clone());
    let suite = registry.run(&runner, &config.selection);

    let mut stdout = StandardStream::stdout(config.color_choice());
    let written = match config.format {
        Format::Human => output::print_suite(&mut stdout, &suite),
        Format::Json => output::write_json(&mut stdout, &suite),
    };
    written.into_diagnostic()?;

    let code = suite.exit_code();
    for error in suite.into_config_errors() {
        eprintln!("{:?}", miette::Report::new(error));
    }
    Ok(code)
}

/// Handles the `list` subcommand.
fn handle_list(tables: Option<&Path>) -> miette::Result<i32> {
    let registry = build_registry(tables)?;
    for name in registry.names() {
        println!("{}", name);
    }
    Ok(0)
}
