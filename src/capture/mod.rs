mod diagnostics;
/// stdout, or the buffer of the active scope
pub mod output;
pub(crate) mod panics;
mod scope;
mod state;

pub use diagnostics::DiagnosticRecord;
pub use panics::PanicRecord;
pub use scope::{CaptureScope, Captured};
