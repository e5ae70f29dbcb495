use crate::assertion::{Test, TestResult};
use crate::runner::executor::TestExecutor;
use crate::runner::reporter::ResultReporter;
use crate::runner::types::{SuiteSummary, TestOutcome};
use crate::utils::indent;

/// Collects the results of tests registered into one suite.
///
/// Each registered test runs immediately, before `register` returns.
pub struct SuiteAggregator<'a> {
    executor: &'a TestExecutor,
    reporter: &'a ResultReporter,
    passed: usize,
    failed: usize,
    reports: Vec<String>,
}

impl<'a> SuiteAggregator<'a> {
    pub fn new(executor: &'a TestExecutor, reporter: &'a ResultReporter) -> Self {
        Self {
            executor,
            reporter,
            passed: 0,
            failed: 0,
            reports: Vec::new(),
        }
    }

    /// Run one test now and add it to the tally
    pub fn register<F>(&mut self, name: &str, callback: F)
    where
        F: FnOnce(&Test) -> TestResult,
    {
        let outcome = self.executor.execute(name, callback);
        self.record(&outcome);
    }

    /// Add an outcome produced elsewhere to the tally
    pub fn record(&mut self, outcome: &TestOutcome) {
        self.reports.push(indent(1, &self.reporter.render(outcome)));
        if outcome.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn finish(self, suite_name: &str) -> SuiteSummary {
        tracing::debug!(
            suite = suite_name,
            passed = self.passed,
            failed = self.failed,
            "Suite finished"
        );

        SuiteSummary {
            suite_name: suite_name.to_string(),
            passed: self.passed,
            failed: self.failed,
            reports: self.reports,
        }
    }
}
