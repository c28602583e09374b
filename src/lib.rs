pub use crate::case::{Case, CaseError, ErrorExpectation, Expectation, FieldCheck};
pub use crate::error::{ConfigError, ConfigResult, EXIT_CONFIG_ERROR};
pub use crate::outcome::{CaseResult, ErrorCause, FailureKind};
pub use crate::report::{ReportEntry, RunReport, Summary};
pub use crate::runner::{run, Runner, RunnerConfig};
pub use crate::source::{generated, CaseSource, Generated};

pub mod calculate;
pub mod case;
pub mod cli;
pub mod error;
pub mod outcome;
pub mod registry;
pub mod report;
pub mod runner;
pub mod source;
pub mod table;
