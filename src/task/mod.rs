//! The lazy task type and its continuation protocol.
//!
//! Ownership rules, in short:
//!
//! 1. `Task<T>` is the exclusive owner of a suspended computation. Dropping
//!    a still-owning handle destroys the suspended state.
//! 2. Awaiting a task consumes its result exactly once; the backing promise
//!    transitions exactly once from empty to value or fault.
//! 3. `detach()` trades the owner for the scheduler: the state now destroys
//!    itself at its terminal point, and any fault it produces is fatal to
//!    the worker thread because nothing can ever retrieve it.

mod promise;

mod raw;
pub(crate) use raw::RawTask;

pub(crate) mod task;
pub use task::Task;

mod yield_now;
pub use yield_now::{YieldNow, yield_now};
