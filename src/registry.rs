//! Explicit test registry.
//!
//! Tests are added with [`Registry::register`], each one a name bound to a
//! function and a case source. Running the registry runs every test in
//! registration order and collects the per-test reports into a
//! [`SuiteReport`]. A malformed source fails its own test only; its
//! [`ConfigError`] is kept on the report so the host can render it.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::case::CaseError;
use crate::error::{ConfigError, ConfigResult, EXIT_CONFIG_ERROR};
use crate::report::{RunReport, Summary};
use crate::runner::Runner;
use crate::source::CaseSource;

/// A registered test with its types erased.
trait Suite {
    fn run(&self, runner: &Runner) -> ConfigResult<RunReport>;
}

struct Registered<F, S, I, V, E> {
    f: Arc<F>,
    source: S,
    _marker: PhantomData<fn(I) -> (V, E)>,
}

impl<F, S, I, V, E> Suite for Registered<F, S, I, V, E>
where
    F: Fn(I) -> Result<V, E> + Send + Sync + 'static,
    S: CaseSource<I, V, E>,
    I: Debug + Send + 'static,
    V: PartialEq + Debug + Send + 'static,
    E: CaseError + Send + 'static,
{
    fn run(&self, runner: &Runner) -> ConfigResult<RunReport> {
        runner.run_isolated(Arc::clone(&self.f), &self.source)
    }
}

struct RegisteredTest {
    name: String,
    suite: Box<dyn Suite>,
}

/// Which registered tests to run.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Case-insensitive substring a test name must contain.
    pub filter: Option<String>,
}

impl Selection {
    pub fn filtered(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
        }
    }

    /// Reason a test is left out of the run, if any.
    pub fn skip_reason(&self, name: &str) -> Option<String> {
        let filter = self.filter.as_deref()?;
        if name.to_lowercase().contains(&filter.to_lowercase()) {
            None
        } else {
            Some(format!("filtered out by substring: {}", filter))
        }
    }
}

#[derive(Default)]
pub struct Registry {
    tests: Vec<RegisteredTest>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to a function and its cases. Names must be unique.
    ///
    /// The function and the values crossing it must be `Send` so a runner
    /// configured with a timeout can move each invocation onto a worker.
    pub fn register<F, S, I, V, E>(&mut self, name: impl Into<String>, f: F, source: S) -> ConfigResult<&mut Self>
    where
        F: Fn(I) -> Result<V, E> + Send + Sync + 'static,
        S: CaseSource<I, V, E> + 'static,
        I: Debug + Send + 'static,
        V: PartialEq + Debug + Send + 'static,
        E: CaseError + Send + 'static,
    {
        let name = name.into();
        if self.contains(&name) {
            return Err(ConfigError::DuplicateTest { name });
        }
        tracing::trace!(test = %name, "registered test");
        self.tests.push(RegisteredTest {
            name,
            suite: Box::new(Registered {
                f: Arc::new(f),
                source,
                _marker: PhantomData,
            }),
        });
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tests.iter().any(|t| t.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tests.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Runs every selected test in registration order.
    pub fn run(&self, runner: &Runner, selection: &Selection) -> SuiteReport {
        let mut tests = Vec::with_capacity(self.tests.len());
        for test in &self.tests {
            let outcome = match selection.skip_reason(&test.name) {
                Some(reason) => {
                    tracing::debug!(test = %test.name, %reason, "test not selected");
                    TestOutcome::NotSelected { reason }
                }
                None => {
                    tracing::debug!(test = %test.name, "running test");
                    match test.suite.run(runner) {
                        Ok(report) => {
                            let summary = report.summary();
                            tracing::debug!(
                                test = %test.name,
                                passed = summary.passed,
                                failed = summary.failed,
                                errored = summary.errored,
                                skipped = summary.skipped,
                                "test finished"
                            );
                            TestOutcome::Ran { report }
                        }
                        Err(err) => {
                            tracing::warn!(test = %test.name, error = %err, "test not run: bad configuration");
                            TestOutcome::Misconfigured { error: err }
                        }
                    }
                }
            };
            tests.push(TestRun {
                name: test.name.clone(),
                outcome,
            });
        }
        SuiteReport { tests }
    }
}

/// What happened to one registered test.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome {
    Ran {
        report: RunReport,
    },
    NotSelected {
        reason: String,
    },
    Misconfigured {
        #[serde(serialize_with = "serialize_config_error")]
        error: ConfigError,
    },
}

fn serialize_config_error<S: Serializer>(error: &ConfigError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

#[derive(Debug, Serialize)]
pub struct TestRun {
    pub name: String,
    #[serde(flatten)]
    pub outcome: TestOutcome,
}

/// Results of running a whole registry.
#[derive(Debug, Default, Serialize)]
pub struct SuiteReport {
    pub tests: Vec<TestRun>,
}

impl SuiteReport {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for run in &self.tests {
            if let TestOutcome::Ran { report } = &run.outcome {
                summary.merge(report.summary());
            }
        }
        summary
    }

    pub fn misconfigured(&self) -> usize {
        self.tests
            .iter()
            .filter(|t| matches!(t.outcome, TestOutcome::Misconfigured { .. }))
            .count()
    }

    /// Configuration errors of the tests that could not run, by test name.
    pub fn config_errors(&self) -> impl Iterator<Item = (&str, &ConfigError)> {
        self.tests.iter().filter_map(|t| match &t.outcome {
            TestOutcome::Misconfigured { error } => Some((t.name.as_str(), error)),
            _ => None,
        })
    }

    /// Consumes the report, yielding the configuration errors it holds.
    pub fn into_config_errors(self) -> impl Iterator<Item = ConfigError> {
        self.tests.into_iter().filter_map(|t| match t.outcome {
            TestOutcome::Misconfigured { error } => Some(error),
            _ => None,
        })
    }

    pub fn report(&self, name: &str) -> Option<&RunReport> {
        self.tests.iter().find(|t| t.name == name).and_then(|t| match &t.outcome {
            TestOutcome::Ran { report } => Some(report),
            _ => None,
        })
    }

    pub fn is_success(&self) -> bool {
        !self.summary().has_failures() && self.misconfigured() == 0
    }

    /// 0 when everything passed or was skipped, [`EXIT_CONFIG_ERROR`] when
    /// any test could not run, 1 for case failures otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.misconfigured() > 0 {
            EXIT_CONFIG_ERROR
        } else if self.is_success() {
            0
        } else {
            1
        }
    }
}
