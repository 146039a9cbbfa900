use crate::runtime::worker::Worker;
use crate::task::task::{Core, Step};
use std::cell::RefCell;
use std::mem::ManuallyDrop;
use std::panic;
use std::sync::{Arc, Weak};
use std::task::{Context, RawWaker, RawWakerVTable, Waker};

struct RootCell {
    core: RefCell<Core<()>>,
    /// Repost target when the body reschedules itself. Weak so an
    /// outstanding handle does not keep a torn-down worker alive.
    worker: Weak<Worker>,
}

/// Handle to a detached root computation, as stored in the ready queue.
///
/// Cloning is an atomic reference-count bump: the waker built for the body
/// is `Send + Sync` by contract, so a body may clone it and drop or invoke
/// the clone on another thread. Dropping the last handle destroys the
/// suspended state.
#[derive(Clone)]
pub(crate) struct RawTask {
    inner: Arc<RootCell>,
}

// Safety: the strong count is atomic, so handles and the wakers derived
// from them may be cloned and dropped on any thread. The `RefCell` core is
// only ever borrowed by `resume`, which runs on one thread at a time: the
// spawning thread hands the task to the worker that drains it, ordered
// either by the worker thread's launch (handles posted before `start()`) or
// by the queue's `Shared` cursor mode.
unsafe impl Send for RawTask {}

impl RawTask {
    pub(crate) fn new(core: Core<()>, worker: Weak<Worker>) -> Self {
        Self {
            inner: Arc::new(RootCell {
                core: RefCell::new(core),
                worker,
            }),
        }
    }

    /// Run the computation until its next suspension point.
    ///
    /// A root task is always detached: completion drops the last handle and
    /// with it the suspended state, and a fault has no awaiter left to
    /// retrieve it, so it is re-raised right here and takes the worker
    /// thread down. That crash is the documented outcome, not a leak of an
    /// unhandled case.
    pub(crate) fn resume(self) {
        let waker = self.waker();
        let mut cx = Context::from_waker(&waker);

        let step = self.inner.core.borrow_mut().resume(&mut cx);

        match step {
            Ok(Step::Complete) | Ok(Step::Pending) => {}
            Err(fault) => {
                tracing::error!("fault escaped a detached task; crashing the worker thread");
                panic::resume_unwind(fault);
            }
        }
    }

    fn repost(&self) {
        match self.inner.worker.upgrade() {
            Some(worker) => worker.post(self.clone()),
            // The owning context is gone; the wake is dropped with it.
            None => tracing::debug!("woke a task whose worker no longer exists"),
        }
    }

    fn waker(&self) -> Waker {
        let ptr = Arc::into_raw(Arc::clone(&self.inner)) as *const ();
        // Safety: the vtable below treats the data pointer as a strong
        // `Arc<RootCell>` count, which `Arc::into_raw` just handed us.
        unsafe { Waker::from_raw(RawWaker::new(ptr, &VTABLE)) }
    }
}

unsafe fn clone_waker(ptr: *const ()) -> RawWaker {
    unsafe { Arc::increment_strong_count(ptr as *const RootCell) };
    RawWaker::new(ptr, &VTABLE)
}

// Wake by consuming the waker.
unsafe fn wake_by_val(ptr: *const ()) {
    let raw = RawTask {
        inner: unsafe { Arc::from_raw(ptr as *const RootCell) },
    };
    raw.repost();
}

// Wake without consuming the waker.
unsafe fn wake_by_ref(ptr: *const ()) {
    let raw = ManuallyDrop::new(RawTask {
        inner: unsafe { Arc::from_raw(ptr as *const RootCell) },
    });
    raw.repost();
}

unsafe fn drop_waker(ptr: *const ()) {
    unsafe { Arc::decrement_strong_count(ptr as *const RootCell) };
}

static VTABLE: RawWakerVTable =
    RawWakerVTable::new(clone_waker, wake_by_val, wake_by_ref, drop_waker);
