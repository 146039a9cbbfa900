//! Compile-time configuration.
//!
//! Log verbosity is not configured here: diagnostics go through `tracing`
//! and are filtered by whatever subscriber the embedding program installs.

use std::time::Duration;

/// Identity handed to each execution context at registration.
pub type CtxId = u16;

/// Width of the ready-queue cursors.
///
/// Wrapping arithmetic on this type stays correct under cursor wraparound as
/// long as the in-flight handle count never exceeds the queue capacity.
pub(crate) type Cur = u16;

/// Capacity of each worker's ready queue. Must be a power of two so slot
/// indices can be derived by masking the cursors.
pub const READY_QUEUE_CAPACITY: usize = 16384;

/// How long a starting worker thread waits for its sibling contexts before
/// the startup is declared stuck and the process aborts.
pub const BARRIER_TIMEOUT: Duration = Duration::from_secs(1);

const _: () = assert!(READY_QUEUE_CAPACITY.is_power_of_two());
const _: () = assert!(READY_QUEUE_CAPACITY - 1 <= Cur::MAX as usize);
