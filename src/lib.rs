//! A minimal cooperative task runtime.
//!
//! [`Task`] is a lazy, single-owner asynchronous computation: constructing
//! one never runs any of its body. Tasks chain by awaiting each other, and a
//! finishing task hands control straight back to its awaiter with no
//! scheduler round trip. Root tasks are handed to an [`ExecutionContext`],
//! which drives them on a dedicated worker thread through a fixed-capacity
//! FIFO ready queue; sibling contexts synchronize their startup through a
//! process-wide barrier.
//!
//! ```
//! use cotask::{ExecutionContext, Task};
//!
//! fn double(n: i32) -> Task<i32> {
//!     Task::new(async move { n * 2 })
//! }
//!
//! fn root() -> Task<()> {
//!     Task::new(async {
//!         let value = double(21).await;
//!         assert_eq!(value, 42);
//!     })
//! }
//!
//! let mut ctx = ExecutionContext::new();
//! ctx.spawn(root());
//! ctx.start().unwrap();
//! ctx.join();
//! ```

pub mod config;
pub use config::CtxId;

mod context;
pub use context::current_context_id;

pub mod runtime;
pub use runtime::{ExecutionContext, spawn_local};

pub mod task;
pub use task::{Task, yield_now};
