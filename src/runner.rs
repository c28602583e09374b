//! The case runner.
//!
//! [`Runner::run`] pulls a fresh sequence from a [`CaseSource`], invokes the
//! function once per case in order, and records one [`CaseResult`] per case.
//! Individual failures, errors and panics are captured as data; only a
//! malformed source aborts a run, and it does so before any case executes.
//!
//! The runner does no logging and no I/O. Rendering is the host's job.

use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::case::{describe_error, Case, CaseError, Expectation};
use crate::error::{ConfigError, ConfigResult};
use crate::outcome::{CaseResult, ErrorCause, FailureKind};
use crate::report::RunReport;
use crate::source::CaseSource;

pub const DEFAULT_MAX_CASES: usize = 10_000;

/// Knobs for a [`Runner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Upper bound on cases pulled from one source; anything beyond it is
    /// treated as a non-terminating source.
    pub max_cases: usize,
    /// Per-case timeout, honoured by [`Runner::run_isolated`].
    pub timeout: Option<Duration>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_cases: DEFAULT_MAX_CASES,
            timeout: None,
        }
    }
}

/// What happened when a case's function was invoked.
enum Invocation<V, E> {
    Returned(Result<V, E>),
    Panicked(String),
    TimedOut(Duration),
}

/// Executes case tables. Holds configuration only; no state survives a run.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs `f` over every case of `source`, sequentially, on the calling
    /// thread.
    pub fn run<I, V, E, F, S>(&self, f: F, source: &S) -> ConfigResult<RunReport>
    where
        F: Fn(I) -> Result<V, E>,
        S: CaseSource<I, V, E> + ?Sized,
        I: Debug,
        V: PartialEq + Debug,
        E: CaseError,
    {
        let cases = self.collect(source)?;
        let mut report = RunReport::with_capacity(cases.len());
        for case in cases {
            let label = case.label();
            let (input, expected, skip) = case.into_parts();
            let result = match skip {
                Some(reason) => CaseResult::Skipped { reason },
                None => {
                    let invocation = match panic::catch_unwind(AssertUnwindSafe(|| f(input))) {
                        Ok(returned) => Invocation::Returned(returned),
                        Err(payload) => Invocation::Panicked(panic_message(payload.as_ref())),
                    };
                    judge(&expected, invocation)
                }
            };
            report.push(label, result);
        }
        Ok(report)
    }

    /// Like [`Runner::run`], but each case executes on its own worker thread
    /// so the configured timeout can be enforced. A worker that overruns is
    /// abandoned and the case is reported as [`ErrorCause::Timeout`].
    ///
    /// Without a configured timeout this behaves exactly like `run`.
    pub fn run_isolated<I, V, E, F, S>(&self, f: Arc<F>, source: &S) -> ConfigResult<RunReport>
    where
        F: Fn(I) -> Result<V, E> + Send + Sync + 'static,
        S: CaseSource<I, V, E> + ?Sized,
        I: Debug + Send + 'static,
        V: PartialEq + Debug + Send + 'static,
        E: CaseError + Send + 'static,
    {
        let Some(timeout) = self.config.timeout else {
            return self.run(|input| (*f)(input), source);
        };

        let cases = self.collect(source)?;
        let mut report = RunReport::with_capacity(cases.len());
        for case in cases {
            let label = case.label();
            let (input, expected, skip) = case.into_parts();
            let result = match skip {
                Some(reason) => CaseResult::Skipped { reason },
                None => judge(&expected, invoke_with_timeout(Arc::clone(&f), input, timeout)),
            };
            report.push(label, result);
        }
        Ok(report)
    }

    /// Materializes a source into a concrete ordered sequence, enforcing
    /// `max_cases`.
    fn collect<I, V, E, S>(&self, source: &S) -> ConfigResult<Vec<Case<I, V, E>>>
    where
        S: CaseSource<I, V, E> + ?Sized,
        E: CaseError,
    {
        let limit = self.config.max_cases;
        let cases: Vec<_> = source.iter_cases()?.take(limit.saturating_add(1)).collect();
        if cases.len() > limit {
            return Err(ConfigError::Unbounded {
                source_name: source.source_name(),
                limit,
            });
        }
        Ok(cases)
    }
}

/// Runs `f` over `source` with a default [`Runner`].
pub fn run<I, V, E, F, S>(f: F, source: &S) -> ConfigResult<RunReport>
where
    F: Fn(I) -> Result<V, E>,
    S: CaseSource<I, V, E> + ?Sized,
    I: Debug,
    V: PartialEq + Debug,
    E: CaseError,
{
    Runner::default().run(f, source)
}

fn invoke_with_timeout<I, V, E, F>(f: Arc<F>, input: I, timeout: Duration) -> Invocation<V, E>
where
    F: Fn(I) -> Result<V, E> + Send + Sync + 'static,
    I: Send + 'static,
    V: Send + 'static,
    E: Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    // The handle is dropped on timeout, which detaches the worker.
    let _worker = thread::spawn(move || {
        let invocation = match panic::catch_unwind(AssertUnwindSafe(|| (*f)(input))) {
            Ok(returned) => Invocation::Returned(returned),
            Err(payload) => Invocation::Panicked(panic_message(payload.as_ref())),
        };
        let _ = tx.send(invocation);
    });
    match rx.recv_timeout(timeout) {
        Ok(invocation) => invocation,
        Err(RecvTimeoutError::Timeout) => Invocation::TimedOut(timeout),
        Err(RecvTimeoutError::Disconnected) => {
            Invocation::Panicked("worker exited without reporting a result".to_string())
        }
    }
}

/// Compares what happened against what was expected.
fn judge<V, E>(expected: &Expectation<V, E>, invocation: Invocation<V, E>) -> CaseResult
where
    V: PartialEq + Debug,
    E: CaseError,
{
    let expected_error = match expected {
        Expectation::Error(e) => Some(e.to_string()),
        Expectation::Value(_) => None,
    };
    match (expected, invocation) {
        (Expectation::Value(want), Invocation::Returned(Ok(got))) => {
            if *want == got {
                CaseResult::Passed
            } else {
                CaseResult::Failed {
                    failure: FailureKind::ValueMismatch,
                    expected: format!("{:?}", want),
                    actual: format!("{:?}", got),
                }
            }
        }
        (Expectation::Value(_), Invocation::Returned(Err(error))) => CaseResult::Errored {
            cause: ErrorCause::UnexpectedError,
            expected_error: None,
            actual_error: describe_error(&error),
        },
        (Expectation::Error(want), Invocation::Returned(Ok(got))) => CaseResult::Failed {
            failure: FailureKind::ExpectedErrorNotRaised,
            expected: want.to_string(),
            actual: format!("returned {:?}", got),
        },
        (Expectation::Error(want), Invocation::Returned(Err(error))) => match want.check(&error) {
            Ok(()) => CaseResult::Passed,
            Err(reason) => CaseResult::Failed {
                failure: FailureKind::ErrorKindMismatch,
                expected: want.to_string(),
                actual: format!("{}; {}", describe_error(&error), reason),
            },
        },
        (_, Invocation::Panicked(message)) => CaseResult::Errored {
            cause: ErrorCause::Panicked,
            expected_error,
            actual_error: message,
        },
        (_, Invocation::TimedOut(after)) => CaseResult::Errored {
            cause: ErrorCause::Timeout,
            expected_error,
            actual_error: format!("no result after {:?}", after),
        },
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}
