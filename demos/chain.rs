//! The canonical three-task await chain: task3 awaits task2 awaits task1.
//!
//! Run with `cargo run --example chain`; the log output shows the symmetric
//! hand-off order, with each child's terminal point resuming its parent
//! directly.

use anyhow::Result;
use cotask::{ExecutionContext, Task, current_context_id};
use tracing::info;

fn task1() -> Task<i32> {
    Task::new(async {
        info!("task1 start");
        info!("task1 end");
        3
    })
}

fn task2() -> Task<()> {
    Task::new(async {
        info!("task2 start");
        let r = task1().await;
        info!("task2 resume");
        info!(result = r, "task1 delivered");
        info!("task2 end");
    })
}

fn task3() -> Task<()> {
    Task::new(async {
        info!(ctx = ?current_context_id(), "task3 start");
        task2().await;
        info!("task3 resume");
        info!("task3 end");
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut ctx = ExecutionContext::new();
    ctx.spawn(task3());
    ctx.start()?;
    ctx.join();

    Ok(())
}
