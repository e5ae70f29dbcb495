/// Assertion module: the test handle and the values it reports on failure
mod handle;
mod types;

pub use handle::{AssertResult, Test, TestResult};
pub use types::{Arg, ArgValue, AssertionFailure, FatalError, SourceLocation, StackFrame};
