//! Scheduling substrate: ready queue, worker, execution context and the
//! process-wide startup registry.

mod context;
pub use context::ExecutionContext;

pub(crate) mod queue;

mod registry;

mod spawn;
pub use spawn::spawn_local;

pub(crate) mod worker;

#[cfg(test)]
mod tests;
