use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Suspend the current computation once and reschedule its root handle at
/// the back of the owning worker's ready queue.
///
/// Most awaits transfer control directly between computations and never
/// touch the queue; this is the one shipped primitive that explicitly
/// re-enters it. A root that yields during a drain sweep is observed by the
/// next sweep, not the current one.
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

#[derive(Debug, Clone, Copy)]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}
