pub mod executor;
pub mod harness;
pub mod reporter;
pub mod suite;
pub mod traceback;
pub mod types;

pub use executor::TestExecutor;
pub use harness::Runner;
pub use reporter::ResultReporter;
pub use suite::SuiteAggregator;
pub use traceback::TracebackFilter;
pub use types::{ClassifiedError, SuiteSummary, TestOutcome, UnhandledError};
