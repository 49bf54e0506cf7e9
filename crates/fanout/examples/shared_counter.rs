//! Ten tasks increment a shared counter a thousand times each, once behind a
//! mutex and once with an atomic. Both end at 10000.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use fanout::{RunnerConfig, TaskRunner};

const WORKERS: usize = 10;
const INCREMENTS: u64 = 1000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let runner = TaskRunner::with_config(RunnerConfig::quiet().with_context("counter"))?;

    let counter = Mutex::new(0u64);
    let results = runner.try_run((0..WORKERS).map(|_| {
        let counter = &counter;
        move || {
            for _ in 0..INCREMENTS {
                *counter.lock().unwrap_or_else(|e| e.into_inner()) += 1;
            }
        }
    }))?;
    let total = counter.into_inner().unwrap_or_else(|e| e.into_inner());
    println!("mutex counter: {} ({:?})", total, results.elapsed());

    let counter = AtomicU64::new(0);
    let results = runner.try_run((0..WORKERS).map(|_| {
        let counter = &counter;
        move || {
            for _ in 0..INCREMENTS {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }
    }))?;
    println!(
        "atomic counter: {} ({:?})",
        counter.load(Ordering::SeqCst),
        results.elapsed()
    );

    Ok(())
}
