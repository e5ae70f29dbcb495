use crate::assertion::{Test, TestResult};
use crate::capture::output;
use crate::config::Config;
use crate::discovery::{self, MethodFilteringError, TestClass};
use crate::runner::executor::TestExecutor;
use crate::runner::reporter::ResultReporter;
use crate::runner::suite::SuiteAggregator;
use crate::runner::types::{SuiteSummary, TestOutcome};

/// Runs tests and suites and prints their reports
#[derive(Debug, Clone, Default)]
pub struct Runner {
    executor: TestExecutor,
    reporter: ResultReporter,
}

impl Runner {
    pub fn new(config: &Config) -> crate::Result<Self> {
        Ok(Self {
            executor: TestExecutor::from_config(config)?,
            reporter: ResultReporter::from_config(config),
        })
    }

    /// Run one test and print its report
    pub fn run_test<F>(&self, name: &str, callback: F) -> TestOutcome
    where
        F: FnOnce(&Test) -> TestResult,
    {
        let outcome = self.executor.execute(name, callback);
        output::write_str(&self.reporter.render(&outcome));
        outcome
    }

    /// Run the tests `builder` registers and print the suite report
    pub fn run_suite<F>(&self, name: &str, builder: F) -> SuiteSummary
    where
        F: FnOnce(&mut SuiteAggregator<'_>),
    {
        tracing::debug!(suite = name, "Running suite");

        let mut suite = SuiteAggregator::new(&self.executor, &self.reporter);
        builder(&mut suite);
        let summary = suite.finish(name);

        output::write_str(&self.reporter.render_suite(&summary));
        summary
    }

    /// Run every `@test` method of `object` as one suite.
    ///
    /// Nothing runs and nothing is printed when a marked method has an
    /// unusable signature.
    pub fn run_suite_from_annotated_methods<T: TestClass>(
        &self,
        object: &T,
        name: Option<&str>,
    ) -> Result<SuiteSummary, MethodFilteringError> {
        let descriptors = discovery::discover::<T>()?;
        let suite_name = name.unwrap_or_else(|| T::class_name());

        Ok(self.run_suite(suite_name, |suite| {
            for descriptor in &descriptors {
                suite.register(&descriptor.display_name, |t| descriptor.invoke(object, t));
            }
        }))
    }

    pub fn reporter(&self) -> &ResultReporter {
        &self.reporter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub struct Counter {
        start: i64,
    }

    crate::test_class! {
        impl Counter {
            /// @test starts at zero
            pub fn check_start(&self, t: &Test) -> TestResult {
                t.assert_equal(self.start, 0_i64)?;
                Ok(())
            }

            /// @test
            pub fn check_increment(&self, t: &Test) -> TestResult {
                t.assert_equal(self.start + 1, 2_i64)?;
                Ok(())
            }
        }
    }

    pub struct Misdeclared;

    crate::test_class! {
        impl Misdeclared {
            /// @test
            pub fn takes_number(&self, n: i32) -> TestResult {
                let _ = n;
                Ok(())
            }
        }
    }

    pub struct Detached;

    impl TestClass for Detached {
        fn declare() -> Vec<discovery::MethodDecl<Self>> {
            vec![discovery::MethodDecl::new(
                "removed",
                " @test",
                discovery::Visibility::Public,
                vec![discovery::Param::typed("t", "&Test")],
            )]
        }
    }

    #[test]
    fn test_unreachable_method_fails_as_assertion() {
        let runner = Runner::default();
        let summary = runner
            .run_suite_from_annotated_methods(&Detached, None)
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert!(summary.reports[0].contains("Message: Method removed does not exist"));
        assert!(summary.reports[0].contains("| removed(Test)"));
    }

    #[test]
    fn test_run_test_returns_outcome() {
        let runner = Runner::default();
        let outcome = runner.run_test("adds", |t| {
            t.assert_true(true)?;
            Ok(())
        });

        assert!(outcome.passed);
        assert_eq!(runner.reporter().render(&outcome), "[\u{2713}] Test passed: adds\n");
    }

    #[test]
    fn test_run_suite_collects_reports() {
        let runner = Runner::default();
        let summary = runner.run_suite("numbers", |suite| {
            suite.register("one", |t| {
                t.assert_equal(1, 1)?;
                Ok(())
            });
        });

        assert_eq!(summary.passed, 1);
        assert_eq!(
            runner.reporter().render_suite(&summary),
            "\nTest suite:\n    [\u{2713}] Test passed: one\n\nResults:\n    Suite Name: numbers\n    Passed: 1/1\n    Failed: 0/1\n"
        );
    }

    #[test]
    fn test_annotated_suite_uses_display_names() {
        let runner = Runner::default();
        let summary = runner
            .run_suite_from_annotated_methods(&Counter { start: 0 }, None)
            .unwrap();

        assert_eq!(summary.suite_name, "Counter");
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert!(summary.reports[0].contains("[\u{2713}] Test passed: starts at zero"));
        assert!(summary.reports[1].contains("Name: check_increment"));
        assert!(summary.reports[1].contains("Message: 1 != 2"));
    }

    #[test]
    fn test_annotated_suite_name_override() {
        let runner = Runner::default();
        let summary = runner
            .run_suite_from_annotated_methods(&Counter { start: 1 }, Some("Counting"))
            .unwrap();

        assert_eq!(summary.suite_name, "Counting");
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_discovery_error_is_returned() {
        let runner = Runner::default();
        let err = runner
            .run_suite_from_annotated_methods(&Misdeclared, None)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Method takes_number is marked as a test but has incorrect type hint i32."
        );
    }
}
