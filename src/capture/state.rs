use std::cell::RefCell;

use super::panics::PanicRecord;

/// Side data collected by the active scope of the current thread
#[derive(Debug, Default)]
pub(crate) struct ActiveCapture {
    pub(crate) output: String,
    pub(crate) panic: Option<PanicRecord>,
}

thread_local! {
    static ACTIVE: RefCell<Option<ActiveCapture>> = const { RefCell::new(None) };
}

/// Mark the current thread as capturing. Returns false if it already was.
pub(crate) fn activate() -> bool {
    ACTIVE.with(|active| {
        let mut active = active.borrow_mut();
        if active.is_some() {
            return false;
        }
        *active = Some(ActiveCapture::default());
        true
    })
}

pub(crate) fn deactivate() -> ActiveCapture {
    ACTIVE
        .with(|active| active.borrow_mut().take())
        .unwrap_or_default()
}

pub(crate) fn is_active() -> bool {
    ACTIVE.with(|active| active.try_borrow().map(|a| a.is_some()).unwrap_or(true))
}

/// Run `f` against the active capture, if any.
///
/// Returns `None` when the thread is not capturing, or when the state is
/// already borrowed (a panic raised while writing).
pub(crate) fn with_active<R>(f: impl FnOnce(&mut ActiveCapture) -> R) -> Option<R> {
    ACTIVE
        .try_with(|active| {
            let mut active = active.try_borrow_mut().ok()?;
            active.as_mut().map(f)
        })
        .ok()
        .flatten()
}
