use crate::config::{BARRIER_TIMEOUT, CtxId};
use crate::context;
use crate::runtime::registry::ContextRegistry;
use crate::runtime::worker::Worker;
use crate::task::{RawTask, Task};
use anyhow::{Context as _, Result};
use std::panic;
use std::process;
use std::sync::Arc;
use std::thread;

/// Owns one worker and its dedicated OS thread.
///
/// Lifecycle: constructed (registered, identity assigned), started (thread
/// launched, waiting at the startup barrier), running (draining the ready
/// queue), stopped (queue observed empty, thread torn down).
pub struct ExecutionContext {
    worker: Arc<Worker>,
    thread: Option<thread::JoinHandle<()>>,
    registry: &'static ContextRegistry,
    id: CtxId,
}

impl ExecutionContext {
    /// Register with the process-wide registry and receive an identity.
    pub fn new() -> Self {
        Self::with_registry(ContextRegistry::global())
    }

    pub(crate) fn with_registry(registry: &'static ContextRegistry) -> Self {
        let id = registry.register();
        tracing::debug!(id, "execution context registered");

        Self {
            worker: Arc::new(Worker::new()),
            thread: None,
            registry,
            id,
        }
    }

    pub fn id(&self) -> CtxId {
        self.id
    }

    /// Take ownership of a not-yet-started root task, detach it and post its
    /// handle onto the worker's ready queue.
    ///
    /// Valid before or after `start()`. The queue runs in its single-thread
    /// cursor mode, so posting while the worker is already draining relies
    /// on ordering the caller provides.
    pub fn spawn(&self, task: Task<()>) {
        let handle = RawTask::new(task.detach(), Arc::downgrade(&self.worker));
        tracing::debug!(id = self.id, "root task spawned");
        self.worker.post(handle);
    }

    /// Launch the dedicated worker thread.
    ///
    /// The thread binds its thread-local identity, arrives at the startup
    /// barrier (aborting the process if the cohort never completes), then
    /// drains the queue until a sweep observes it empty.
    pub fn start(&mut self) -> Result<()> {
        assert!(self.thread.is_none(), "execution context already started");

        let worker = Arc::clone(&self.worker);
        let registry = self.registry;
        let id = self.id;

        let thread = thread::Builder::new()
            .name(format!("cotask-worker-{id}"))
            .spawn(move || run(worker, registry, id))
            .context("failed to launch the context worker thread")?;

        self.thread = Some(thread);
        Ok(())
    }

    /// Block until the worker thread has finished draining and torn down.
    ///
    /// A fault that escaped a detached task killed the worker thread; it is
    /// re-raised here on the joiner so harnesses observe it deterministically.
    pub fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if let Err(fault) = thread.join() {
                panic::resume_unwind(fault);
            }
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            // `join()` is the loud path; drop must not panic.
            if thread.join().is_err() {
                tracing::error!(id = self.id, "worker thread terminated abnormally");
            }
        }
    }
}

fn run(worker: Arc<Worker>, registry: &'static ContextRegistry, id: CtxId) {
    context::bind(id, Arc::clone(&worker));

    if let Err(err) = registry.arrive_and_wait(BARRIER_TIMEOUT) {
        // A stuck barrier is a configuration error, not a recoverable fault.
        tracing::error!(id, %err, "aborting: sibling contexts never became ready");
        process::abort();
    }

    tracing::debug!(id, "execution context draining");

    // Resume exactly the handles seen in each sweep; anything a computation
    // reposts is observed by the next sweep.
    loop {
        let num = worker.task_num();
        if num == 0 {
            break;
        }
        for _ in 0..num {
            worker.work_once();
        }
    }

    tracing::debug!(id, "execution context drained");

    context::unbind();
    registry.deregister();
}
