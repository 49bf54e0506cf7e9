//! Three staggered tasks run side by side
//!
//! One task simulates a 300ms I/O call, the other two print odd and even
//! numbers with different pauses. The whole batch takes about as long as the
//! slowest task.

use std::thread;
use std::time::{Duration, Instant};

use fanout::{task, Task, TaskRunner};

fn print_odd() {
    for i in (1..10).step_by(2) {
        println!("odd: {}", i);
        thread::sleep(Duration::from_millis(100));
    }
}

fn print_even() {
    for i in (2..=10).step_by(2) {
        println!("even: {}", i);
        thread::sleep(Duration::from_millis(200));
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    println!("=== Timed tasks ===\n");

    let tasks: Vec<Task<'_>> = vec![
        task(|| {
            thread::sleep(Duration::from_millis(300));
            println!("simulated I/O finished");
        }),
        task(print_odd),
        task(print_even),
    ];

    let runner = TaskRunner::new();
    let start = Instant::now();
    let results = runner.run(tasks);
    let wall = start.elapsed();

    println!("\nPer-task durations:");
    for outcome in &results {
        println!("  task {}: {:?}", outcome.id, outcome.duration);
    }

    let stats = results.stats();
    println!(
        "\nWall clock {:?}, sequential cost {:?}, parallelism {:.2}",
        wall,
        stats.cumulative_task_duration,
        stats.parallelism()
    );
}
