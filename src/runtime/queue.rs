use crate::config::{Cur, READY_QUEUE_CAPACITY};
use crate::task::RawTask;
use crossbeam_utils::CachePadded;
use std::cell::{Cell, UnsafeCell};
use std::fmt;
use std::sync::atomic::{AtomicU16, Ordering};

/// Cursor access mode, selected at the type level.
///
/// The cursor is one plain integer either way; whether loads and stores go
/// through atomics is decided here at compile time, instead of
/// reinterpreting a non-atomic field's storage at each access site.
pub(crate) trait Cursor: Default {
    fn load(&self) -> Cur;
    fn store(&self, val: Cur);
}

/// Plain load/store. Valid only while producer and consumer are the same
/// thread. This is the shipped configuration: one thread per context.
#[derive(Debug, Default)]
pub(crate) struct Unsync(Cell<Cur>);

impl Cursor for Unsync {
    #[inline]
    fn load(&self) -> Cur {
        self.0.get()
    }

    #[inline]
    fn store(&self, val: Cur) {
        self.0.set(val);
    }
}

/// Acquire loads and release stores: one thread may push while a different
/// thread pops, without a lock. Still strictly single producer and single
/// consumer. The shipped scheduler never selects this mode; it exists for
/// cross-thread handoff configurations.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub(crate) struct Shared(AtomicU16);

impl Cursor for Shared {
    #[inline]
    fn load(&self) -> Cur {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    fn store(&self, val: Cur) {
        self.0.store(val, Ordering::Release);
    }
}

/// Fixed-capacity ring buffer of handles eligible for resumption.
///
/// Indexed by two monotonically increasing cursors masked by `N - 1`; the
/// head belongs to the consumer, the tail to the producer. Handles become
/// eligible strictly in post order.
pub(crate) struct ReadyQueue<C: Cursor = Unsync, const N: usize = READY_QUEUE_CAPACITY> {
    head: CachePadded<C>,
    tail: CachePadded<C>,
    slots: Box<[UnsafeCell<Option<RawTask>>]>,
}

// Safety: with acquire/release cursors the slot at `tail & MASK` is written
// before the release store of the tail, and read only after the acquire
// load that observed that store. The single-producer/single-consumer
// discipline is still on the caller.
unsafe impl<const N: usize> Sync for ReadyQueue<Shared, N> {}

impl<C: Cursor, const N: usize> ReadyQueue<C, N> {
    const MASK: Cur = {
        assert!(N.is_power_of_two(), "queue capacity must be a power of two");
        assert!(N - 1 <= Cur::MAX as usize, "queue capacity exceeds the cursor width");
        (N - 1) as Cur
    };

    pub(crate) fn new() -> Self {
        Self {
            head: CachePadded::default(),
            tail: CachePadded::default(),
            slots: (0..N).map(|_| UnsafeCell::new(None)).collect(),
        }
    }

    /// Producer side. Capacity is never checked here: bounding the in-flight
    /// handle count by the capacity is a caller precondition, and exceeding
    /// it overwrites handles that were never fetched. Debug builds carry a
    /// checked variant of that precondition.
    pub(crate) fn post(&self, handle: RawTask) {
        debug_assert!((self.len() as usize) < N, "ready queue over capacity");

        let tail = self.tail.load();
        // Safety: the single producer is the only writer of this slot, and
        // the slot only becomes visible through the tail store below.
        unsafe { *self.slots[(tail & Self::MASK) as usize].get() = Some(handle) };
        self.tail.store(tail.wrapping_add(1));
    }

    /// Consumer side. Popping an empty queue is a programming error, not a
    /// recoverable condition; the guard compiles out in release builds.
    pub(crate) fn fetch(&self) -> RawTask {
        debug_assert!(self.len() > 0, "fetch on an empty ready queue");

        let head = self.head.load();
        // Safety: the tail store made this slot visible, and the single
        // consumer is the only reader of it.
        let handle = unsafe { (*self.slots[(head & Self::MASK) as usize].get()).take() };
        self.head.store(head.wrapping_add(1));
        handle.expect("fetched an empty ready-queue slot")
    }

    /// Outstanding handle count: `tail - head` in wrapping unsigned
    /// arithmetic, correct under cursor wraparound while the capacity
    /// precondition holds.
    pub(crate) fn len(&self) -> Cur {
        self.tail.load().wrapping_sub(self.head.load())
    }

    #[allow(dead_code)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: Cursor, const N: usize> fmt::Debug for ReadyQueue<C, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyQueue")
            .field("capacity", &N)
            .field("head", &self.head.load())
            .field("tail", &self.tail.load())
            .finish()
    }
}
