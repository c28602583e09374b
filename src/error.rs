//! Configuration errors for case sources, tables, and the registry.
//!
//! Per-case failures are never errors in this sense: they are captured as
//! data in a [`CaseResult`](crate::outcome::CaseResult). A `ConfigError` is
//! the one failure that stops a run, and it is always raised before the
//! first case executes.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Fatal problems with how a run was set up.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("case source '{source_name}' produced more than {limit} cases")]
    #[diagnostic(
        code(casebook::config::unbounded),
        help("case sources must be finite; raise `max_cases` if the table is genuinely this large")
    )]
    Unbounded { source_name: String, limit: usize },

    #[error("case {index} in '{source_name}' is malformed: {reason}")]
    #[diagnostic(code(casebook::config::malformed_case))]
    MalformedCase {
        source_name: String,
        index: usize,
        reason: String,
    },

    #[error("a test named '{name}' is already registered")]
    #[diagnostic(
        code(casebook::config::duplicate_test),
        help("test names must be unique within a registry")
    )]
    DuplicateTest { name: String },

    #[error("case table '{path}' targets unknown function '{function}'")]
    #[diagnostic(
        code(casebook::config::unknown_function),
        help("known functions: {known}")
    )]
    UnknownFunction {
        path: PathBuf,
        function: String,
        known: String,
    },

    #[error("failed to read case table '{path}'")]
    #[diagnostic(code(casebook::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse case table '{path}'")]
    #[diagnostic(code(casebook::config::table))]
    Table {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    pub fn malformed(source_name: impl Into<String>, index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedCase {
            source_name: source_name.into(),
            index,
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Process exit code for runs stopped or degraded by a [`ConfigError`].
pub const EXIT_CONFIG_ERROR: i32 = 2;
