use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tracing::Level;

use crate::assertion::{AssertionFailure, FatalError, StackFrame, Test, TestResult};
use crate::capture::{CaptureScope, PanicRecord, panics};
use crate::config::Config;
use crate::runner::traceback::{TracebackFilter, parse_backtrace};
use crate::runner::types::{ClassifiedError, TestOutcome, UnhandledError};

/// Runs one test body inside a capture scope
#[derive(Debug, Clone)]
pub struct TestExecutor {
    level: Level,
    filter: TracebackFilter,
}

impl TestExecutor {
    pub fn new() -> Self {
        Self {
            level: Level::WARN,
            filter: TracebackFilter::default(),
        }
    }

    pub fn from_config(config: &Config) -> crate::Result<Self> {
        Ok(Self {
            level: config.capture.level()?,
            filter: TracebackFilter::new(&config.traceback.internal_paths),
        })
    }

    /// Run `callback` and record how it went. Never fails and never panics
    /// on behalf of the test body.
    pub fn execute<F>(&self, name: &str, callback: F) -> TestOutcome
    where
        F: FnOnce(&Test) -> TestResult,
    {
        tracing::debug!(test = name, "Running test");
        let start = Instant::now();

        let scope = match CaptureScope::acquire(self.level) {
            Ok(scope) => scope,
            Err(e) => {
                let error = ClassifiedError::UnhandledError(UnhandledError {
                    message: e.to_string(),
                    location: None,
                    frames: Vec::new(),
                });
                return TestOutcome::new(name, Vec::new(), String::new(), Some(error), start.elapsed());
            }
        };

        let handle = Test::new();
        let result = panic::catch_unwind(AssertUnwindSafe(|| callback(&handle)));
        let captured = scope.release();

        let error = match result {
            Ok(Ok(())) => None,
            Ok(Err(error)) => Some(self.classify(error)),
            Err(payload) => Some(self.classify_panic(
                panics::payload_message(payload.as_ref()),
                captured.panic,
            )),
        };

        let outcome = TestOutcome::new(
            name,
            captured.warnings,
            captured.output,
            error,
            start.elapsed(),
        );

        tracing::debug!(
            test = name,
            passed = outcome.passed,
            assertions = handle.assertions(),
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Test finished"
        );

        outcome
    }

    /// Sort an error returned by a test body into its kind
    pub fn classify(&self, error: anyhow::Error) -> ClassifiedError {
        let error = match error.downcast::<AssertionFailure>() {
            Ok(failure) => return ClassifiedError::AssertionFailure(failure),
            Err(error) => error,
        };

        let error = match error.downcast::<FatalError>() {
            Ok(fatal) => {
                return ClassifiedError::UnhandledError(UnhandledError {
                    frames: self.filter.filter(fatal.frames),
                    location: Some(fatal.location),
                    message: fatal.message,
                });
            }
            Err(error) => error,
        };

        let frames = self.raising_frames(error.backtrace());
        ClassifiedError::UnhandledError(UnhandledError {
            message: format!("{:#}", error),
            location: frames.first().map(|frame| frame.location.clone()),
            frames,
        })
    }

    /// Caller frames of a returned error.
    ///
    /// Without a trace recorded at creation (`RUST_LIB_BACKTRACE` unset), the
    /// stack here still leads back to the caller that started the test.
    fn raising_frames(&self, trace: &Backtrace) -> Vec<StackFrame> {
        if trace.status() == BacktraceStatus::Captured {
            let frames = self.filter.filter(parse_backtrace(trace));
            if !frames.is_empty() {
                return frames;
            }
        }
        self.filter.filter(parse_backtrace(&Backtrace::force_capture()))
    }

    fn classify_panic(&self, message: String, record: Option<PanicRecord>) -> ClassifiedError {
        let (location, frames) = match record {
            Some(record) => (
                record.location,
                self.filter.filter(parse_backtrace(&record.trace)),
            ),
            None => (None, Vec::new()),
        };

        ClassifiedError::UnhandledError(UnhandledError {
            message,
            location,
            frames,
        })
    }
}

impl Default for TestExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passing_test() {
        let executor = TestExecutor::new();
        let outcome = executor.execute("adds", |t| {
            t.assert_equal(1 + 1, 2)?;
            Ok(())
        });

        assert!(outcome.passed);
        assert!(outcome.error.is_none());
        assert!(outcome.captured_warnings.is_empty());
        assert!(outcome.captured_output.is_empty());
    }

    #[test]
    fn test_second_assertion_is_reported() {
        let executor = TestExecutor::new();
        let line = line!() + 3;
        let outcome = executor.execute("t", |t| {
            t.assert_equal(1, 1)?;
            t.assert_equal(1, 2)?;
            Ok(())
        });

        match outcome.error {
            Some(ClassifiedError::AssertionFailure(failure)) => {
                assert_eq!(failure.message, "1 != 2");
                assert_eq!(failure.site.location.line, line);
            }
            other => panic!("Expected assertion failure, got {:?}", other),
        }
    }

    #[test]
    fn test_returned_error_is_unhandled() {
        let executor = TestExecutor::new();
        let outcome = executor.execute("io", |_| {
            let value: i32 = "nope".parse()?;
            let _ = value;
            Ok(())
        });

        match outcome.error {
            Some(ClassifiedError::UnhandledError(error)) => {
                assert_eq!(error.message, "invalid digit found in string");
            }
            other => panic!("Expected unhandled error, got {:?}", other),
        }
    }

    #[test]
    fn test_panic_is_unhandled_with_location() {
        let executor = TestExecutor::new();
        let outcome = executor.execute("panics", |_| panic!("exploded"));

        assert!(!outcome.passed);
        match outcome.error {
            Some(ClassifiedError::UnhandledError(error)) => {
                assert_eq!(error.message, "exploded");
                let location = error.location.unwrap();
                assert!(location.file.ends_with("executor.rs"));
            }
            other => panic!("Expected unhandled error, got {:?}", other),
        }
    }

    #[test]
    fn test_fatal_keeps_call_location() {
        let executor = TestExecutor::new();
        let line = line!() + 1;
        let outcome = executor.execute("fatal", |t| t.fatal("giving up"));

        match outcome.error {
            Some(ClassifiedError::UnhandledError(error)) => {
                assert_eq!(error.message, "giving up");
                assert_eq!(error.location.unwrap().line, line);
            }
            other => panic!("Expected unhandled error, got {:?}", other),
        }
    }

    #[test]
    fn test_side_effects_are_captured() {
        let executor = TestExecutor::new();
        let outcome = executor.execute("noisy", |_| {
            crate::outln!("first");
            crate::out!("second");
            tracing::warn!("deprecated");
            Ok(())
        });

        assert!(outcome.passed);
        assert_eq!(outcome.captured_output, "first\nsecond");
        assert_eq!(outcome.captured_warnings.len(), 1);
        assert_eq!(outcome.captured_warnings[0].message, "deprecated");
    }

    #[test]
    fn test_warnings_do_not_fail_test() {
        let executor = TestExecutor::new();
        let outcome = executor.execute("warns", |_| {
            tracing::error!("loud but harmless");
            Ok(())
        });

        assert!(outcome.passed);
        assert_eq!(outcome.captured_warnings.len(), 1);
    }

    #[test]
    fn test_nested_run_is_rejected() {
        let executor = TestExecutor::new();
        let outcome = executor.execute("outer", |t| {
            let inner = TestExecutor::new().execute("inner", |_| Ok(()));
            t.assert_false(inner.passed)?;
            Ok(())
        });

        assert!(outcome.passed);
    }

    #[test]
    fn test_capture_released_between_tests() {
        let executor = TestExecutor::new();
        let first = executor.execute("first", |_| {
            crate::out!("only in first");
            panic!("stop");
        });
        let second = executor.execute("second", |_| Ok(()));

        assert_eq!(first.captured_output, "only in first");
        assert!(second.captured_output.is_empty());
        assert!(second.passed);
    }
}
