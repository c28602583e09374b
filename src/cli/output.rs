//! Handles all user-facing output for the CLI.
//!
//! Human reports go through `termcolor` so the same code paths serve a real
//! terminal and an in-memory buffer; JSON reports are the serialized
//! [`SuiteReport`].

use std::io::{self, Write};

use difference::{Changeset, Difference};
use termcolor::{Color, ColorSpec, WriteColor};

use crate::outcome::CaseResult;
use crate::registry::{SuiteReport, TestOutcome};
use crate::report::ReportEntry;

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Writes one line per case, then a summary and the list of failures.
pub fn print_suite<W: WriteColor>(out: &mut W, suite: &SuiteReport) -> io::Result<()> {
    let mut failures = Vec::new();

    for run in &suite.tests {
        match &run.outcome {
            TestOutcome::Ran { report } => {
                for entry in report {
                    print_entry(out, &run.name, entry)?;
                    if !entry.result.is_ok() {
                        failures.push(format!("{} [{}]", run.name, entry.label));
                    }
                }
            }
            TestOutcome::NotSelected { reason } => {
                paint(out, "SKIP", Color::Yellow)?;
                writeln!(out, ": {} ({})", run.name, reason)?;
            }
            TestOutcome::Misconfigured { error } => {
                paint(out, "CONFIG", Color::Red)?;
                writeln!(out, ": {}", run.name)?;
                writeln!(out, "  Error: {}", error)?;
                failures.push(run.name.clone());
            }
        }
    }

    let summary = suite.summary();
    writeln!(out)?;
    write!(out, "Test summary: total {}, ", summary.total())?;
    paint(out, "passed", Color::Green)?;
    write!(out, " {}, ", summary.passed)?;
    paint(out, "failed", Color::Red)?;
    write!(out, " {}, ", summary.failed)?;
    paint(out, "errored", Color::Magenta)?;
    write!(out, " {}, ", summary.errored)?;
    paint(out, "skipped", Color::Yellow)?;
    writeln!(out, " {}", summary.skipped)?;

    if !failures.is_empty() {
        writeln!(out, "\nFailed tests:")?;
        for name in failures {
            writeln!(out, "  - {}", name)?;
        }
    }
    Ok(())
}

/// Writes the suite as pretty-printed JSON.
pub fn write_json<W: Write>(out: &mut W, suite: &SuiteReport) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, suite)?;
    writeln!(out)
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_entry<W: WriteColor>(out: &mut W, test: &str, entry: &ReportEntry) -> io::Result<()> {
    let result = &entry.result;
    let color = match result {
        CaseResult::Passed => Color::Green,
        CaseResult::Failed { .. } => Color::Red,
        CaseResult::Errored { .. } => Color::Magenta,
        CaseResult::Skipped { .. } => Color::Yellow,
    };
    paint(out, result.status(), color)?;
    write!(out, ": {} #{} [{}]", test, entry.index, entry.label)?;

    match result {
        CaseResult::Passed => writeln!(out),
        CaseResult::Skipped { reason } => writeln!(out, " ({})", reason),
        CaseResult::Failed {
            failure,
            expected,
            actual,
        } => {
            writeln!(out, " ({})", failure)?;
            writeln!(out, "  Expected: {}", expected)?;
            writeln!(out, "  Actual:   {}", actual)?;
            writeln!(out, "  Diff:")?;
            print_diff(out, expected, actual)
        }
        CaseResult::Errored {
            cause,
            expected_error,
            actual_error,
        } => {
            writeln!(out, " ({})", cause)?;
            if let Some(expected) = expected_error {
                writeln!(out, "  Expected error: {}", expected)?;
            }
            writeln!(out, "  Error: {}", actual_error)
        }
    }
}

fn print_diff<W: WriteColor>(out: &mut W, expected: &str, actual: &str) -> io::Result<()> {
    let changeset = Changeset::new(expected, actual, "\n");
    for diff in &changeset.diffs {
        match diff {
            Difference::Same(x) => {
                out.reset()?;
                writeln!(out, "    {}", x)?;
            }
            Difference::Rem(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                writeln!(out, "  - {}", x)?;
            }
            Difference::Add(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                writeln!(out, "  + {}", x)?;
            }
        }
    }
    out.reset()
}

fn paint<W: WriteColor>(out: &mut W, text: &str, color: Color) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", text)?;
    out.reset()
}
