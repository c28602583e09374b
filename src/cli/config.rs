//! Host-side configuration assembled from CLI arguments.

use std::path::PathBuf;
use std::time::Duration;

use termcolor::ColorChoice;

use crate::cli::args::{ColorMode, Format, RunArgs};
use crate::registry::Selection;
use crate::runner::RunnerConfig;

/// Configuration for one invocation of the host.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub tables: Option<PathBuf>,
    pub selection: Selection,
    pub format: Format,
    pub use_colors: bool,
    pub runner: RunnerConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tables: None,
            selection: Selection::default(),
            format: Format::Human,
            use_colors: atty::is(atty::Stream::Stdout),
            runner: RunnerConfig::default(),
        }
    }
}

impl HostConfig {
    pub fn from_run_args(args: RunArgs) -> Self {
        let defaults = Self::default();
        let use_colors = match args.color {
            ColorMode::Auto => defaults.use_colors,
            ColorMode::Always => true,
            ColorMode::Never => false,
        };
        let runner = RunnerConfig {
            max_cases: args.max_cases.unwrap_or(defaults.runner.max_cases),
            timeout: args.timeout_ms.map(Duration::from_millis),
        };
        Self {
            tables: args.tables,
            selection: Selection {
                filter: args.filter,
            },
            format: args.format,
            use_colors,
            runner,
        }
    }

    pub fn color_choice(&self) -> ColorChoice {
        if self.use_colors {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        }
    }
}
