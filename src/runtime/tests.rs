use crate::runtime::registry::ContextRegistry;
use crate::{ExecutionContext, Task, current_context_id, spawn_local, yield_now};
use parking_lot::Mutex;
use rstest::rstest;
use static_assertions::assert_impl_all;
use std::sync::Arc;

assert_impl_all!(ExecutionContext: Send);

type EventLog = Arc<Mutex<Vec<&'static str>>>;

/// Each test gets its own registry so parallel tests never share a startup
/// cohort; the public constructor wires in the process-wide one.
fn private_registry() -> &'static ContextRegistry {
    Box::leak(Box::new(ContextRegistry::new()))
}

fn log_task(log: &EventLog, event: &'static str) -> Task<()> {
    let log = Arc::clone(log);
    Task::new(async move { log.lock().push(event) })
}

fn task1(log: EventLog) -> Task<i32> {
    Task::new(async move {
        log.lock().push("task1 start");
        log.lock().push("task1 end");
        3
    })
}

fn task2(log: EventLog) -> Task<()> {
    Task::new(async move {
        log.lock().push("task2 start");
        let r = task1(Arc::clone(&log)).await;
        log.lock().push("task2 resume");
        assert_eq!(r, 3);
        log.lock().push("task1 result delivered");
        log.lock().push("task2 end");
    })
}

fn task3(log: EventLog) -> Task<()> {
    Task::new(async move {
        log.lock().push("task3 start");
        task2(Arc::clone(&log)).await;
        log.lock().push("task3 resume");
        log.lock().push("task3 end");
    })
}

#[test]
fn spawned_chain_runs_in_symmetric_order_on_the_worker() {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut ctx = ExecutionContext::with_registry(private_registry());

    ctx.spawn(task3(Arc::clone(&log)));
    ctx.start().unwrap();
    ctx.join();

    assert_eq!(
        *log.lock(),
        [
            "task3 start",
            "task2 start",
            "task1 start",
            "task1 end",
            "task2 resume",
            "task1 result delivered",
            "task2 end",
            "task3 resume",
            "task3 end",
        ]
    );
}

#[rstest]
#[case(1)]
#[case(16)]
#[case(100)]
fn roots_drain_in_spawn_order(#[case] roots: usize) {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut ctx = ExecutionContext::with_registry(private_registry());

    for n in 0..roots {
        let order = Arc::clone(&order);
        ctx.spawn(Task::new(async move { order.lock().push(n) }));
    }
    ctx.start().unwrap();
    ctx.join();

    assert_eq!(*order.lock(), (0..roots).collect::<Vec<_>>());
}

/// A root that yields re-enters the queue behind its siblings and is only
/// observed by the drain loop's next sweep.
#[test]
fn yielding_root_is_observed_by_the_next_sweep() {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut ctx = ExecutionContext::with_registry(private_registry());

    let first = {
        let log = Arc::clone(&log);
        Task::new(async move {
            log.lock().push("first before yield");
            yield_now().await;
            log.lock().push("first after yield");
        })
    };
    ctx.spawn(first);
    ctx.spawn(log_task(&log, "second"));
    ctx.start().unwrap();
    ctx.join();

    assert_eq!(
        *log.lock(),
        ["first before yield", "second", "first after yield"]
    );
}

#[test]
fn spawn_local_adds_a_sibling_root() {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut ctx = ExecutionContext::with_registry(private_registry());

    let root = {
        let log = Arc::clone(&log);
        Task::new(async move {
            log.lock().push("root");
            spawn_local(log_task(&log, "sibling"));
            log.lock().push("root end");
        })
    };
    ctx.spawn(root);
    ctx.start().unwrap();
    ctx.join();

    assert_eq!(*log.lock(), ["root", "root end", "sibling"]);
}

#[test]
fn worker_thread_is_bound_to_its_context_identity() {
    let mut ctx = ExecutionContext::with_registry(private_registry());
    let id = ctx.id();
    let seen = Arc::new(Mutex::new(None));

    let seen_in_task = Arc::clone(&seen);
    ctx.spawn(Task::new(async move {
        *seen_in_task.lock() = Some(current_context_id());
    }));
    ctx.start().unwrap();
    ctx.join();

    assert_eq!(*seen.lock(), Some(Some(id)));
    // The joining thread is not driven by any context.
    assert_eq!(current_context_id(), None);
}

#[test]
#[should_panic(expected = "boom")]
fn fault_escaping_a_detached_task_kills_the_worker() {
    let mut ctx = ExecutionContext::with_registry(private_registry());
    ctx.spawn(Task::new(async { panic!("boom") }));
    ctx.start().unwrap();
    ctx.join();
}

#[test]
fn sibling_contexts_pass_the_barrier_and_drain_independently() {
    let registry = private_registry();
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));

    let mut a = ExecutionContext::with_registry(registry);
    let mut b = ExecutionContext::with_registry(registry);
    assert_ne!(a.id(), b.id());

    a.spawn(log_task(&log, "a"));
    b.spawn(log_task(&log, "b"));
    a.start().unwrap();
    b.start().unwrap();
    a.join();
    b.join();

    let mut events = log.lock().clone();
    events.sort_unstable();
    assert_eq!(events, ["a", "b"]);
}

#[test]
#[should_panic(expected = "execution context already started")]
fn starting_a_context_twice_is_a_bug() {
    let mut ctx = ExecutionContext::with_registry(private_registry());
    ctx.start().unwrap();
    let _ = ctx.start();
}
