//! Producer and consumer tasks connected by a bounded channel
//!
//! The first run uses a single-slot channel so the producer waits for the
//! consumer on every item. The second uses a 50-slot buffer with a slow
//! consumer, letting the producer run ahead.

use std::time::Duration;

use fanout::{async_task, RunnerConfig, TaskRunner};
use tokio::sync::mpsc;
use tokio::time::sleep;

async fn pipeline(
    runner: &TaskRunner,
    capacity: usize,
    items: u32,
    produce_delay: Duration,
    consume_delay: Duration,
) -> Result<(), fanout::RunnerError> {
    let (tx, mut rx) = mpsc::channel::<u32>(capacity);

    let producer = async_task(async move {
        println!("producer started");
        for i in 1..=items {
            if tx.send(i).await.is_err() {
                break;
            }
            sleep(produce_delay).await;
        }
        println!("producer finished");
    });

    let consumer = async_task(async move {
        while let Some(value) = rx.recv().await {
            sleep(consume_delay).await;
            println!("received: {}", value);
        }
    });

    let results = runner.try_run_async(vec![producer, consumer]).await?;
    println!(
        "capacity {}: producer {:?}, consumer {:?}\n",
        capacity, results[0].duration, results[1].duration
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let runner = TaskRunner::with_config(RunnerConfig::default().with_context("pipeline"))?;

    pipeline(&runner, 1, 10, Duration::from_millis(500), Duration::ZERO).await?;
    pipeline(&runner, 50, 100, Duration::ZERO, Duration::from_millis(100)).await?;

    Ok(())
}
