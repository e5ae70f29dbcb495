use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{self, PanicHookInfo};

use once_cell::sync::OnceCell;

use super::state;
use crate::assertion::SourceLocation;

static HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

/// A panic intercepted inside a capture scope
#[derive(Debug)]
pub struct PanicRecord {
    pub message: String,
    pub location: Option<SourceLocation>,
    pub trace: Backtrace,
}

/// Install the intercepting panic hook once per process.
///
/// Panics on threads without an active capture scope go to whatever hook
/// was installed before.
pub(crate) fn install_hook() {
    HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            if !record(info) {
                previous(info);
            }
        }));
        tracing::trace!("Panic hook installed");
    });
}

fn record(info: &PanicHookInfo<'_>) -> bool {
    if !state::is_active() {
        return false;
    }

    let record = PanicRecord {
        message: payload_message(info.payload()),
        location: info.location().map(SourceLocation::from),
        trace: Backtrace::force_capture(),
    };

    state::with_active(|active| active.panic = Some(record)).is_some()
}

/// Take the panic recorded by the current scope
pub(crate) fn take_recorded() -> Option<PanicRecord> {
    state::with_active(|active| active.panic.take()).flatten()
}

/// Text of a panic payload
pub fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_message() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(payload_message(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(payload_message(payload.as_ref()), "owned message");

        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(payload_message(payload.as_ref()), "Box<dyn Any>");
    }
}
