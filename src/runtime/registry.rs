use crate::config::CtxId;
use parking_lot::{Condvar, Mutex};
use std::time::Duration;
use thiserror::Error;

/// The startup barrier never became true within its bound.
///
/// This signals a stuck or misconfigured cohort, most often a context that
/// was constructed but whose `start()` was never called. It is not a
/// recoverable runtime fault: the worker thread that observes it aborts the
/// process.
#[derive(Debug, Error)]
#[error("startup barrier timed out after {timeout:?} (created={created}, ready={ready})")]
pub(crate) struct BarrierTimeout {
    timeout: Duration,
    created: CtxId,
    ready: CtxId,
}

#[derive(Debug, Default)]
struct Counts {
    created: CtxId,
    ready: CtxId,
}

/// Process-wide bookkeeping behind the multi-context startup barrier: two
/// counters and the mutex/condvar pair guarding them.
///
/// Mutated only during context construction, startup and teardown; steady
/// state draining never touches it. Teardown removes a context from both
/// counters, so the counters return to equality once a cohort has fully
/// drained and a later cohort can form; overlapping cohorts are unsupported.
#[derive(Debug)]
pub(crate) struct ContextRegistry {
    counts: Mutex<Counts>,
    barrier: Condvar,
}

static GLOBAL: ContextRegistry = ContextRegistry::new();

impl ContextRegistry {
    pub(crate) const fn new() -> Self {
        Self {
            counts: Mutex::new(Counts {
                created: 0,
                ready: 0,
            }),
            barrier: Condvar::new(),
        }
    }

    pub(crate) fn global() -> &'static ContextRegistry {
        &GLOBAL
    }

    /// Hand out the next context identity.
    pub(crate) fn register(&self) -> CtxId {
        let mut counts = self.counts.lock();
        let id = counts.created;
        counts.created += 1;
        id
    }

    /// Announce that this worker thread is ready, then wait until every
    /// constructed context has done the same. On success all other waiters
    /// are notified and the caller proceeds to draining.
    pub(crate) fn arrive_and_wait(&self, timeout: Duration) -> Result<(), BarrierTimeout> {
        let mut counts = self.counts.lock();
        counts.ready += 1;

        let timed_out = self
            .barrier
            .wait_while_for(&mut counts, |c| c.created != c.ready, timeout)
            .timed_out();

        if timed_out && counts.created != counts.ready {
            return Err(BarrierTimeout {
                timeout,
                created: counts.created,
                ready: counts.ready,
            });
        }

        drop(counts);
        self.barrier.notify_all();
        Ok(())
    }

    /// Worker teardown: leave the cohort entirely.
    pub(crate) fn deregister(&self) {
        let mut counts = self.counts.lock();
        counts.created -= 1;
        counts.ready -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn identities_are_handed_out_sequentially() {
        let registry = ContextRegistry::new();
        assert_eq!(registry.register(), 0);
        assert_eq!(registry.register(), 1);
        assert_eq!(registry.register(), 2);
    }

    #[test]
    fn lone_context_passes_the_barrier_immediately() {
        let registry = ContextRegistry::new();
        registry.register();

        let start = Instant::now();
        registry
            .arrive_and_wait(Duration::from_secs(5))
            .expect("complete cohort must pass");
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn incomplete_cohort_times_out() {
        let registry = ContextRegistry::new();
        registry.register();
        registry.register();

        // Only one of the two contexts ever arrives.
        let err = registry
            .arrive_and_wait(Duration::from_millis(50))
            .expect_err("predicate can never become true");
        assert!(err.to_string().contains("created=2, ready=1"));
    }

    #[test]
    fn teardown_lets_a_second_cohort_form() {
        let registry = ContextRegistry::new();
        registry.register();
        registry
            .arrive_and_wait(Duration::from_millis(50))
            .unwrap();
        registry.deregister();

        assert_eq!(registry.register(), 0);
        registry
            .arrive_and_wait(Duration::from_millis(50))
            .expect("fresh cohort must pass again");
    }
}
