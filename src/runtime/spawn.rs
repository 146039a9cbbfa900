use crate::task::{RawTask, Task};
use std::sync::Arc;

/// Spawn a detached root task onto the execution context driving the
/// current thread.
///
/// This is how a running task adds sibling roots without holding a
/// reference to its [`ExecutionContext`](crate::ExecutionContext); the
/// handle lands at the back of the ready queue and is observed by the drain
/// loop's next sweep.
///
/// # Panics
///
/// Panics when called from a thread no execution context owns.
pub fn spawn_local(task: Task<()>) {
    let worker = crate::context::current_worker()
        .expect("spawn_local called outside of a running execution context");

    let handle = RawTask::new(task.detach(), Arc::downgrade(&worker));
    tracing::debug!("root task spawned from worker thread");
    worker.post(handle);
}
