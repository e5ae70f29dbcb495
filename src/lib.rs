pub mod assertion;
pub mod capture;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logger;
pub mod runner;
pub mod utils;

use once_cell::sync::Lazy;

// Re-export commonly used types
pub use assertion::{AssertResult, Test, TestResult};
pub use discovery::{MethodFilteringError, TestClass};
pub use error::{MarktestError, Result};
pub use runner::{Runner, SuiteAggregator, SuiteSummary, TestOutcome};

/// Runner configured from `marktest.toml`, or defaults when none is found
static DEFAULT_RUNNER: Lazy<Runner> = Lazy::new(|| {
    let config = config::Config::find_and_load().unwrap_or_default();
    Runner::new(&config).unwrap_or_else(|e| {
        tracing::warn!("Falling back to default configuration: {}", e);
        Runner::default()
    })
});

/// Run one test and print its report
pub fn run_test<F>(name: &str, callback: F) -> TestOutcome
where
    F: FnOnce(&Test) -> TestResult,
{
    DEFAULT_RUNNER.run_test(name, callback)
}

/// Run the tests registered by `builder` as one suite and print its report
pub fn run_suite<F>(name: &str, builder: F) -> SuiteSummary
where
    F: FnOnce(&mut SuiteAggregator<'_>),
{
    DEFAULT_RUNNER.run_suite(name, builder)
}

/// Run every `@test` method of `object` as one suite
pub fn run_suite_from_annotated_methods<T: TestClass>(
    object: &T,
    name: Option<&str>,
) -> std::result::Result<SuiteSummary, MethodFilteringError> {
    DEFAULT_RUNNER.run_suite_from_annotated_methods(object, name)
}
