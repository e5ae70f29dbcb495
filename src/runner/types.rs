use std::time::Duration;

use crate::assertion::{AssertionFailure, SourceLocation, StackFrame};
use crate::capture::DiagnosticRecord;

/// An error that did not come from an assertion predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhandledError {
    pub message: String,
    /// Where the error was raised, when known
    pub location: Option<SourceLocation>,
    /// Caller frames, innermost first, engine frames removed
    pub frames: Vec<StackFrame>,
}

/// Why a test failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedError {
    AssertionFailure(AssertionFailure),
    UnhandledError(UnhandledError),
}

impl ClassifiedError {
    pub fn message(&self) -> &str {
        match self {
            ClassifiedError::AssertionFailure(failure) => &failure.message,
            ClassifiedError::UnhandledError(error) => &error.message,
        }
    }
}

/// Result of running one test
#[derive(Debug, Clone)]
pub struct TestOutcome {
    pub name: String,
    pub passed: bool,
    pub captured_warnings: Vec<DiagnosticRecord>,
    pub captured_output: String,
    pub error: Option<ClassifiedError>,
    pub elapsed: Duration,
}

impl TestOutcome {
    pub fn new(
        name: impl Into<String>,
        captured_warnings: Vec<DiagnosticRecord>,
        captured_output: String,
        error: Option<ClassifiedError>,
        elapsed: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            passed: error.is_none(),
            captured_warnings,
            captured_output,
            error,
            elapsed,
        }
    }

    pub fn has_extra_data(&self) -> bool {
        !self.captured_warnings.is_empty() || !self.captured_output.is_empty()
    }
}

/// Tally of a finished suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteSummary {
    pub suite_name: String,
    pub passed: usize,
    pub failed: usize,
    /// Rendered reports, already indented one level
    pub reports: Vec<String>,
}

impl SuiteSummary {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_passed_tracks_error() {
        let passed = TestOutcome::new("ok", Vec::new(), String::new(), None, Duration::ZERO);
        assert!(passed.passed);
        assert!(!passed.has_extra_data());

        let error = ClassifiedError::UnhandledError(UnhandledError {
            message: "boom".to_string(),
            location: None,
            frames: Vec::new(),
        });
        let failed = TestOutcome::new(
            "bad",
            Vec::new(),
            "printed".to_string(),
            Some(error),
            Duration::from_millis(5),
        );
        assert!(!failed.passed);
        assert!(failed.has_extra_data());
        assert_eq!(failed.error.unwrap().message(), "boom");
    }

    #[test]
    fn test_summary_total() {
        let summary = SuiteSummary {
            suite_name: "empty".to_string(),
            passed: 0,
            failed: 0,
            reports: Vec::new(),
        };
        assert_eq!(summary.total(), 0);
    }
}
