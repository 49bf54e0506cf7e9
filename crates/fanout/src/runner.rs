//! Fixed fan-out runner: launch every task at once, join them all, report durations

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use futures::future::{join_all, FutureExt};
use tracing::{debug, error, info, info_span, Instrument};

use crate::config::RunnerConfig;
use crate::error::{RunError, RunResult, RunnerResult};
use crate::outcome::{ResultSet, TaskOutcome};
use crate::reporter::{ConsoleReporter, ExecutionReporter, NoOpReporter, TaskExecutionEvent};
use crate::task::{RunId, TaskFault};

type SharedReporter = Arc<Mutex<Box<dyn ExecutionReporter>>>;

/// Runs a batch of tasks concurrently and collects one outcome per task.
///
/// Every task gets its own concurrent activity (an OS thread for [`run`], a
/// tokio task for [`run_async`]) and all of them start immediately: there is
/// no concurrency limit, no queueing and no cancellation. The call returns
/// once every activity has finished, with outcome `i` describing task `i`
/// regardless of completion order.
///
/// [`run`]: TaskRunner::run
/// [`run_async`]: TaskRunner::run_async
pub struct TaskRunner {
    config: RunnerConfig,
    reporter: SharedReporter,
}

impl std::fmt::Debug for TaskRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRunner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRunner {
    /// Create a runner with default configuration
    pub fn new() -> Self {
        Self::from_valid_config(RunnerConfig::default())
    }

    /// Create a runner with custom configuration
    pub fn with_config(config: RunnerConfig) -> RunnerResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: RunnerConfig) -> Self {
        let reporter: Box<dyn ExecutionReporter> = if config.report_progress {
            Box::new(ConsoleReporter::new())
        } else {
            Box::new(NoOpReporter)
        };
        let runner = Self {
            config,
            reporter: Arc::new(Mutex::new(reporter)),
        };
        runner.apply_context();
        runner
    }

    /// Replace the reporter that receives progress events
    pub fn with_reporter<R: ExecutionReporter + 'static>(mut self, reporter: R) -> Self {
        self.reporter = Arc::new(Mutex::new(Box::new(reporter)));
        self.apply_context();
        self
    }

    /// Get the current configuration
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    fn apply_context(&self) {
        if let Some(context) = &self.config.context {
            lock(&self.reporter).set_context(context.clone());
        }
    }

    /// Run every task on its own thread and wait for all of them.
    ///
    /// Tasks may borrow from the caller's stack; all threads are joined
    /// before this returns.
    ///
    /// # Panics
    ///
    /// Panics after every task has joined if a task panicked or a worker
    /// thread could not be spawned. Use [`TaskRunner::try_run`] to get the
    /// fault as an error instead.
    pub fn run<I, F>(&self, tasks: I) -> ResultSet
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() + Send,
    {
        match self.try_run(tasks) {
            Ok(results) => results,
            Err(err) => panic!("{}", err),
        }
    }

    /// Like [`TaskRunner::run`], but a panicking task is reported as an error.
    ///
    /// Every launched task is still joined before the first fault (in
    /// completion time) is returned.
    pub fn try_run<I, F>(&self, tasks: I) -> RunnerResult<ResultSet>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() + Send,
    {
        let tasks: Vec<F> = tasks.into_iter().collect();
        if tasks.is_empty() {
            return Ok(ResultSet::empty());
        }

        let run_id = RunId::new();
        let total_tasks = tasks.len();
        let span = info_span!("run", run_id = %run_id, total_tasks);
        let _entered = span.enter();

        let ctx = self.begin_run(run_id, total_tasks);
        let started = Instant::now();
        let mut slots: Vec<Option<TaskOutcome>> = vec![None; total_tasks];

        let spawn_error = thread::scope(|scope| {
            for (id, (slot, task)) in slots.iter_mut().zip(tasks).enumerate() {
                let ctx = &ctx;
                let span = span.clone();
                let spawned = self.thread_builder(id).spawn_scoped(scope, move || {
                    span.in_scope(|| {
                        ctx.task_started(id);
                        let start = Instant::now();
                        let result = panic::catch_unwind(AssertUnwindSafe(task));
                        *slot = ctx.task_finished(id, start.elapsed(), result);
                    })
                });

                if let Err(source) = spawned {
                    error!(task_id = id, error = %source, "failed to spawn worker thread");
                    return Some(RunError::spawn_failed(id, source));
                }
            }
            None
        });

        self.finish_run(&ctx, started.elapsed(), slots, spawn_error)
    }

    /// Spawn every future as its own tokio task and wait for all of them.
    ///
    /// Must be called from within a tokio runtime. Tasks run in parallel on a
    /// multi-threaded runtime.
    ///
    /// # Panics
    ///
    /// Panics after every task has joined if a task panicked or was aborted.
    pub async fn run_async<I, Fut>(&self, tasks: I) -> ResultSet
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future<Output = ()> + Send + 'static,
    {
        match self.try_run_async(tasks).await {
            Ok(results) => results,
            Err(err) => panic!("{}", err),
        }
    }

    /// Like [`TaskRunner::run_async`], but faults are reported as errors.
    pub async fn try_run_async<I, Fut>(&self, tasks: I) -> RunnerResult<ResultSet>
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let tasks: Vec<Fut> = tasks.into_iter().collect();
        if tasks.is_empty() {
            return Ok(ResultSet::empty());
        }

        let run_id = RunId::new();
        let total_tasks = tasks.len();
        let span = info_span!("run", run_id = %run_id, total_tasks);

        async move {
            let ctx = Arc::new(self.begin_run(run_id, total_tasks));
            let started = Instant::now();

            let handles: Vec<_> = tasks
                .into_iter()
                .enumerate()
                .map(|(id, task)| {
                    let ctx = ctx.clone();
                    tokio::spawn(
                        async move {
                            ctx.task_started(id);
                            let start = Instant::now();
                            let result = AssertUnwindSafe(task).catch_unwind().await;
                            ctx.task_finished(id, start.elapsed(), result)
                        }
                        .in_current_span(),
                    )
                })
                .collect();

            let slots: Vec<Option<TaskOutcome>> = join_all(handles)
                .await
                .into_iter()
                .enumerate()
                .map(|(id, joined)| match joined {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        error!(task_id = id, error = %err, "task aborted");
                        None
                    }
                })
                .collect();

            self.finish_run(&ctx, started.elapsed(), slots, None)
        }
        .instrument(span)
        .await
    }

    fn thread_builder(&self, id: usize) -> thread::Builder {
        let builder =
            thread::Builder::new().name(format!("{}-{}", self.config.thread_name_prefix, id));
        match self.config.stack_size {
            Some(size) => builder.stack_size(size),
            None => builder,
        }
    }

    fn begin_run(&self, run_id: RunId, total_tasks: usize) -> RunContext {
        info!("launching tasks");
        let ctx = RunContext {
            run_id,
            total_tasks,
            reporter: self.reporter.clone(),
            first_fault: OnceLock::new(),
            failed_tasks: AtomicUsize::new(0),
        };
        ctx.report(TaskExecutionEvent::RunStarted {
            run_id,
            total_tasks,
        });
        ctx
    }

    fn finish_run(
        &self,
        ctx: &RunContext,
        elapsed: Duration,
        slots: Vec<Option<TaskOutcome>>,
        spawn_error: Option<RunError>,
    ) -> RunnerResult<ResultSet> {
        let failed_tasks = ctx.failed_tasks.load(Ordering::SeqCst);
        ctx.report(TaskExecutionEvent::RunCompleted {
            run_id: ctx.run_id,
            total_tasks: ctx.total_tasks,
            failed_tasks,
            duration: elapsed,
        });
        lock(&ctx.reporter).finish();

        let outcomes = collect_outcomes(ctx.first_fault.get(), spawn_error, slots)?;
        info!(?elapsed, "all tasks completed");
        Ok(ResultSet::new(outcomes, elapsed))
    }
}

/// Turn the filled slots of a joined run into outcomes.
///
/// A task panic wins over a spawn failure, which wins over an empty slot.
fn collect_outcomes(
    first_fault: Option<&TaskFault>,
    spawn_error: Option<RunError>,
    slots: Vec<Option<TaskOutcome>>,
) -> RunResult<Vec<TaskOutcome>> {
    if let Some(fault) = first_fault {
        return Err(RunError::panicked(fault.id, fault.message.clone()));
    }
    if let Some(err) = spawn_error {
        return Err(err);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(id, slot)| slot.ok_or(RunError::aborted(id)))
        .collect()
}

/// State shared by the workers of one run
struct RunContext {
    run_id: RunId,
    total_tasks: usize,
    reporter: SharedReporter,
    first_fault: OnceLock<TaskFault>,
    failed_tasks: AtomicUsize,
}

impl RunContext {
    fn report(&self, event: TaskExecutionEvent) {
        lock(&self.reporter).report_event(event);
    }

    fn task_started(&self, id: usize) {
        debug!(task_id = id, "task started");
        self.report(TaskExecutionEvent::TaskStarted { id });
    }

    /// Must be called exactly once per task, on every exit path.
    fn task_finished(
        &self,
        id: usize,
        duration: Duration,
        result: Result<(), Box<dyn Any + Send>>,
    ) -> Option<TaskOutcome> {
        match result {
            Ok(()) => {
                debug!(task_id = id, ?duration, "task completed");
                self.report(TaskExecutionEvent::TaskCompleted { id, duration });
                Some(TaskOutcome { id, duration })
            }
            Err(payload) => {
                let fault = TaskFault::from_panic(id, payload);
                error!(task_id = id, ?duration, message = %fault.message, "task panicked");
                self.failed_tasks.fetch_add(1, Ordering::SeqCst);
                self.report(TaskExecutionEvent::TaskFailed {
                    id,
                    duration,
                    message: fault.message.clone(),
                });
                // Later faults are logged above but only the first is returned.
                let _ = self.first_fault.set(fault);
                None
            }
        }
    }
}

fn lock(reporter: &SharedReporter) -> std::sync::MutexGuard<'_, Box<dyn ExecutionReporter>> {
    reporter.lock().unwrap_or_else(PoisonError::into_inner)
}
