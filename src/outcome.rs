//! Per-case results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a case that ran to completion did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The function returned a value different from the expected one.
    ValueMismatch,
    /// An error was expected but the function returned a value.
    ExpectedErrorNotRaised,
    /// An error was raised but its kind, message, or fields differ.
    ErrorKindMismatch,
}

/// Why a case could not be judged against its expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCause {
    /// The function failed where a value was expected.
    UnexpectedError,
    /// The function panicked.
    Panicked,
    /// The function did not return within the configured timeout.
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ValueMismatch => "value mismatch",
            FailureKind::ExpectedErrorNotRaised => "expected error not raised",
            FailureKind::ErrorKindMismatch => "error mismatch",
        }
    }
}

impl ErrorCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCause::UnexpectedError => "unexpected error",
            ErrorCause::Panicked => "panicked",
            ErrorCause::Timeout => "timed out",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of executing one case. Expected and actual sides are kept in
/// rendered form so results from differently typed tests can share a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CaseResult {
    Passed,
    Failed {
        failure: FailureKind,
        expected: String,
        actual: String,
    },
    Errored {
        cause: ErrorCause,
        expected_error: Option<String>,
        actual_error: String,
    },
    Skipped {
        reason: String,
    },
}

impl CaseResult {
    pub fn is_passed(&self) -> bool {
        matches!(self, CaseResult::Passed)
    }

    /// Passed and skipped cases are both acceptable outcomes.
    pub fn is_ok(&self) -> bool {
        matches!(self, CaseResult::Passed | CaseResult::Skipped { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            CaseResult::Passed => "PASS",
            CaseResult::Failed { .. } => "FAIL",
            CaseResult::Errored { .. } => "ERROR",
            CaseResult::Skipped { .. } => "SKIP",
        }
    }
}
