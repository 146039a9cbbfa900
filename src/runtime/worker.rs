use crate::config::Cur;
use crate::runtime::queue::ReadyQueue;
use crate::task::RawTask;

/// Per-thread engine: owns one ready queue and resumes one handle at a time.
///
/// Deliberately tracks nothing beyond what the queue exposes; the in-flight
/// count *is* the queue size, and the drain loop stops when it reads zero.
pub(crate) struct Worker {
    ready: ReadyQueue,
}

// Safety: the queue is strictly single producer/single consumer, and in the
// shipped `Unsync` cursor mode it is not even that across threads on its
// own. Handles are posted by the spawning thread and drained by the context
// worker thread; the worker thread's launch orders posts that happened
// before `start()`, and posting afterwards from another thread needs
// external ordering, as documented on `ExecutionContext::spawn`.
unsafe impl Send for Worker {}
unsafe impl Sync for Worker {}

impl Worker {
    pub(crate) fn new() -> Self {
        Self {
            ready: ReadyQueue::new(),
        }
    }

    pub(crate) fn post(&self, handle: RawTask) {
        self.ready.post(handle);
    }

    /// Pop the next ready handle.
    fn schedule(&self) -> RawTask {
        self.ready.fetch()
    }

    /// Pop one handle and run it until its next suspension point.
    pub(crate) fn work_once(&self) {
        self.schedule().resume();
    }

    pub(crate) fn task_num(&self) -> Cur {
        self.ready.len()
    }
}
