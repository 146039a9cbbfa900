use crate::task::promise::{Fault, Promise};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};

/// What a single resumption of a task body produced.
pub(crate) enum Step {
    /// The body hit a suspension point; its waker owns re-entry.
    Pending,
    /// The body reached its terminal point and the promise holds the result.
    Complete,
}

/// The suspended state behind a [`Task`]: the lazily started body plus the
/// promise that will hold its result.
pub(crate) struct Core<T> {
    /// `None` once the body has run to its terminal point.
    body: Option<Pin<Box<dyn Future<Output = T>>>>,
    promise: Promise<T>,
}

impl<T> Core<T> {
    fn new<F>(future: F) -> Self
    where
        F: Future<Output = T> + 'static,
    {
        Self {
            body: Some(Box::pin(future)),
            promise: Promise::new(),
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.body.is_none()
    }

    pub(crate) fn set_detached(&mut self) {
        self.promise.set_detached();
    }

    /// Run the body until its next suspension point.
    ///
    /// A panic escaping the body is captured here, where control returns to
    /// the runtime, and stored for retrieval at the await point. The `Err`
    /// arm only fires for detached promises, whose faults cannot be stored
    /// and must crash the resuming thread.
    pub(crate) fn resume(&mut self, cx: &mut Context<'_>) -> Result<Step, Fault> {
        let mut body = self.body.take().expect("resumed a finished task body");

        match panic::catch_unwind(AssertUnwindSafe(|| body.as_mut().poll(cx))) {
            Ok(Poll::Ready(value)) => {
                self.promise.fulfill(value);
                Ok(Step::Complete)
            }
            Ok(Poll::Pending) => {
                self.body = Some(body);
                Ok(Step::Pending)
            }
            Err(fault) => match self.promise.reject(fault) {
                None => Ok(Step::Complete),
                Some(fault) => Err(fault),
            },
        }
    }

    /// Retrieval point for an awaiter; see [`Promise::try_take`].
    fn try_take(&mut self) -> Option<Result<T, Fault>> {
        self.promise.try_take()
    }
}

/// A lazy, single-owner asynchronous computation.
///
/// Constructing a task never runs any of its body; execution begins at the
/// first resumption, which happens either when another task awaits it or
/// when a context's worker pops its handle off the ready queue. The type is
/// move-only: whoever holds the `Task` owns the suspended state, and
/// dropping a still-owning handle destroys that state without propagating a
/// result.
///
/// `Task<T>` implements [`Future`], so `task.await` inside another task body
/// is the await operation: the awaited body runs inline in the awaiter's
/// poll frame, and its terminal point hands control straight back to the
/// awaiter with no scheduler hop in between.
pub struct Task<T> {
    core: Option<Core<T>>,
}

// Nothing in a `Task` is pin-projected: the body lives behind its own
// `Pin<Box<...>>`, and the handle itself (promise slot included) is plain
// movable data even when `T` is not `Unpin`.
impl<T> Unpin for Task<T> {}

impl<T> Task<T> {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = T> + 'static,
    {
        Self {
            core: Some(Core::new(future)),
        }
    }

    /// Whether the computation has already reached its terminal point. An
    /// emptied handle (awaited to completion or detached) counts as finished.
    pub fn is_finished(&self) -> bool {
        self.core.as_ref().is_none_or(Core::is_finished)
    }
}

impl Task<()> {
    /// Relinquish ownership of the suspended state without destroying it and
    /// mark the promise detached, so that completion self-destroys instead
    /// of notifying an awaiter. Must happen before the first resume; the
    /// scheduler owns the lifecycle from here on.
    pub(crate) fn detach(mut self) -> Core<()> {
        let mut core = self.core.take().expect("detach() on an empty task handle");
        core.set_detached();
        core
    }
}

impl<T> Future for Task<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = self.get_mut();
        let core = this.core.as_mut().expect("task polled after completion");

        // Ready-immediately: the computation may have finished during an
        // earlier resumption.
        if let Some(result) = core.try_take() {
            this.core = None;
            return Poll::Ready(deliver(result));
        }

        // Transfer control into the awaited computation. It runs inline in
        // this poll frame until its next suspension point, so its terminal
        // point hands control straight back here. `cx` carries the root
        // waker down the chain; that waker is the continuation a leaf uses
        // when it explicitly reschedules itself.
        let step = match core.resume(cx) {
            Ok(step) => step,
            Err(_) => unreachable!("awaited task cannot be detached"),
        };

        match step {
            Step::Complete => {
                let result = core
                    .try_take()
                    .expect("completed task with an empty promise");
                this.core = None;
                Poll::Ready(deliver(result))
            }
            Step::Pending => Poll::Pending,
        }
    }
}

/// Deferred propagation: a fault was captured at the child's poll boundary
/// and surfaces here, at the awaiter's retrieval point.
fn deliver<T>(result: Result<T, Fault>) -> T {
    match result {
        Ok(value) => value,
        Err(fault) => panic::resume_unwind(fault),
    }
}
