//! Run reports and summaries.

use serde::{Deserialize, Serialize};

use crate::outcome::CaseResult;

/// One line of a [`RunReport`]: where the case sat in its source, how it is
/// labelled, and what happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub index: usize,
    pub label: String,
    #[serde(flatten)]
    pub result: CaseResult,
}

/// Ordered results of one run, one entry per case in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunReport {
    entries: Vec<ReportEntry>,
}

impl RunReport {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, label: String, result: CaseResult) {
        let index = self.entries.len();
        self.entries.push(ReportEntry {
            index,
            label,
            result,
        });
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn results(&self) -> impl Iterator<Item = &CaseResult> {
        self.entries.iter().map(|e| &e.result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for result in self.results() {
            summary.record(result);
        }
        summary
    }

    pub fn is_success(&self) -> bool {
        self.results().all(CaseResult::is_ok)
    }

    /// 0 when every case passed or was skipped, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

impl<'a> IntoIterator for &'a RunReport {
    type Item = &'a ReportEntry;
    type IntoIter = std::slice::Iter<'a, ReportEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn record(&mut self, result: &CaseResult) {
        match result {
            CaseResult::Passed => self.passed += 1,
            CaseResult::Failed { .. } => self.failed += 1,
            CaseResult::Errored { .. } => self.errored += 1,
            CaseResult::Skipped { .. } => self.skipped += 1,
        }
    }

    pub fn merge(&mut self, other: Summary) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.errored += other.errored;
        self.skipped += other.skipped;
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.errored > 0
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored + self.skipped
    }

    /// Percentage of executed (non-skipped) cases that passed.
    pub fn success_rate(&self) -> f64 {
        let executed = self.total() - self.skipped;
        if executed == 0 {
            return 0.0;
        }
        (self.passed as f64 / executed as f64) * 100.0
    }
}
