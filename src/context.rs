//! Per-thread binding back to the owning execution context.
//!
//! Read-only infrastructure for code that needs "which worker/context am I
//! running on" without threading a reference through every call. The slot is
//! set when a worker thread initializes and cleared at teardown; it is never
//! read before initialization.

use crate::config::CtxId;
use crate::runtime::worker::Worker;
use std::cell::RefCell;
use std::sync::Arc;

struct ThreadInfo {
    id: CtxId,
    worker: Arc<Worker>,
}

thread_local! {
    static CURRENT: RefCell<Option<ThreadInfo>> = const { RefCell::new(None) };
}

pub(crate) fn bind(id: CtxId, worker: Arc<Worker>) {
    CURRENT.with(|slot| {
        let mut slot = slot.borrow_mut();
        debug_assert!(slot.is_none(), "thread already bound to a context");
        *slot = Some(ThreadInfo { id, worker });
    });
}

pub(crate) fn unbind() {
    CURRENT.with(|slot| slot.borrow_mut().take());
}

/// Identity of the execution context driving the current thread, if any.
pub fn current_context_id() -> Option<CtxId> {
    CURRENT.with(|slot| slot.borrow().as_ref().map(|info| info.id))
}

/// Worker draining the current thread, if any.
pub(crate) fn current_worker() -> Option<Arc<Worker>> {
    CURRENT.with(|slot| slot.borrow().as_ref().map(|info| Arc::clone(&info.worker)))
}
