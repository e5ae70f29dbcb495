use std::sync::{Arc, Mutex, PoisonError};

use tracing::Level;
use tracing::dispatcher::{self, DefaultGuard, Dispatch};
use tracing_subscriber::layer::SubscriberExt;

use super::diagnostics::{DiagnosticLayer, DiagnosticRecord, DiagnosticSink};
use super::panics::{self, PanicRecord};
use super::state;
use crate::Result;
use crate::error::MarktestError;

/// Everything a scope intercepted, frozen at release
#[derive(Debug, Default)]
pub struct Captured {
    pub warnings: Vec<DiagnosticRecord>,
    pub output: String,
    pub panic: Option<PanicRecord>,
}

/// Exclusive ownership of the current thread's side channels for one test.
///
/// Release happens exactly once: through [`CaptureScope::release`], or on
/// drop if the scope is abandoned (including during unwinding). Scopes do
/// not nest; acquiring while one is held fails with
/// [`MarktestError::CaptureActive`].
pub struct CaptureScope {
    sink: DiagnosticSink,
    dispatch_guard: Option<DefaultGuard>,
    released: bool,
}

impl CaptureScope {
    /// Start intercepting. Events at `level` or more severe become diagnostics.
    pub fn acquire(level: Level) -> Result<Self> {
        panics::install_hook();

        if !state::activate() {
            return Err(MarktestError::CaptureActive);
        }

        let sink: DiagnosticSink = Arc::new(Mutex::new(Vec::new()));
        let subscriber =
            tracing_subscriber::registry().with(DiagnosticLayer::new(level, Arc::clone(&sink)));
        let dispatch_guard = dispatcher::set_default(&Dispatch::new(subscriber));

        Ok(Self {
            sink,
            dispatch_guard: Some(dispatch_guard),
            released: false,
        })
    }

    /// Stop intercepting and hand back what was collected
    pub fn release(mut self) -> Captured {
        self.restore()
    }

    fn restore(&mut self) -> Captured {
        self.released = true;

        // Puts the previous default dispatcher back
        drop(self.dispatch_guard.take());

        let active = state::deactivate();
        let warnings = std::mem::take(&mut *self.sink.lock().unwrap_or_else(PoisonError::into_inner));

        Captured {
            warnings,
            output: active.output,
            panic: active.panic,
        }
    }
}

impl Drop for CaptureScope {
    fn drop(&mut self) {
        if !self.released {
            self.restore();
        }
    }
}
