mod filter;
/// `test_class!`
mod macros;
mod marker;
mod types;

pub use filter::{FilteringErrorKind, MethodFilteringError, discover};
pub use marker::{MARKER_TOKEN, Marker, parse_marker};
pub use types::{Invoker, MethodDecl, Param, TestClass, TestDescriptor, Visibility};
