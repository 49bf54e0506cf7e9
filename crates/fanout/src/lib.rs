//! Fanout - fixed fan-out task runner
//!
//! Runs an ordered batch of zero-argument tasks concurrently, waits for every
//! one of them, and reports how long each took.
//!
//! # Overview
//!
//! - Every task gets its own concurrent activity: an OS thread for
//!   [`TaskRunner::run`], a tokio task for [`TaskRunner::run_async`]
//! - All tasks start at once; there is no concurrency limit or queue
//! - The call blocks until every task has finished, then returns a
//!   [`ResultSet`] whose entry `i` describes task `i`, whatever order the
//!   tasks completed in
//! - A panicking task never hangs the join; [`TaskRunner::try_run`] reports
//!   the first fault as an error
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use fanout::{task, RunnerConfig, Task, TaskRunner};
//!
//! let runner = TaskRunner::with_config(RunnerConfig::quiet()).unwrap();
//! let tasks: Vec<Task<'_>> = vec![
//!     task(|| std::thread::sleep(Duration::from_millis(30))),
//!     task(|| std::thread::sleep(Duration::from_millis(10))),
//! ];
//!
//! let results = runner.run(tasks);
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[1].id, 1);
//! assert!(results[0].duration >= Duration::from_millis(30));
//! ```

pub mod config;
pub mod error;
pub mod outcome;
pub mod reporter;
pub mod runner;
pub mod task;

pub use config::RunnerConfig;
pub use error::{ConfigError, RunError, RunnerError, RunnerResult};
pub use outcome::{ResultSet, RunStats, TaskOutcome};
pub use reporter::{
    ConsoleReporter, ExecutionReporter, MultiReporter, NoOpReporter, TaskExecutionEvent,
};
pub use runner::TaskRunner;
pub use task::{async_task, task, AsyncTask, RunId, Task, TaskFault, TaskState};
