//! Progress reporting for task runs
//!
//! Reporters receive an event for every task state change. Worker threads
//! share a single reporter behind a mutex, so implementations only need to be
//! `Send`. Reporting is informational and never influences the result set.

use std::time::Duration;

use crate::task::{RunId, TaskState};

/// Event types that can be reported during a run
#[derive(Debug, Clone, PartialEq)]
pub enum TaskExecutionEvent {
    /// A run is about to launch its tasks
    RunStarted { run_id: RunId, total_tasks: usize },
    /// Task body started executing
    TaskStarted { id: usize },
    /// Task body returned
    TaskCompleted { id: usize, duration: Duration },
    /// Task body panicked
    TaskFailed {
        id: usize,
        duration: Duration,
        message: String,
    },
    /// Every task of the run has joined
    RunCompleted {
        run_id: RunId,
        total_tasks: usize,
        failed_tasks: usize,
        duration: Duration,
    },
}

impl TaskExecutionEvent {
    /// The task and the state this event moves it into, for task-level events
    pub fn task_state(&self) -> Option<(usize, TaskState)> {
        match self {
            TaskExecutionEvent::TaskStarted { id } => Some((*id, TaskState::Running)),
            TaskExecutionEvent::TaskCompleted { id, .. } => Some((*id, TaskState::Completed)),
            TaskExecutionEvent::TaskFailed { id, .. } => Some((*id, TaskState::Failed)),
            TaskExecutionEvent::RunStarted { .. } | TaskExecutionEvent::RunCompleted { .. } => None,
        }
    }
}

/// Trait for reporting run progress
pub trait ExecutionReporter: Send {
    /// Report a task execution event
    fn report_event(&mut self, event: TaskExecutionEvent);

    /// Set context for subsequent runs
    fn set_context(&mut self, context: String) {
        let _ = context;
    }

    /// Called after the last event of a run
    fn finish(&mut self) {}
}

/// A no-op reporter that discards all events
#[derive(Debug, Default)]
pub struct NoOpReporter;

impl ExecutionReporter for NoOpReporter {
    fn report_event(&mut self, _event: TaskExecutionEvent) {}
}

/// Prints one line per task completion to stdout
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    context: Option<String>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self { context: None }
    }

    pub(crate) fn format_duration(duration: Duration) -> String {
        if duration.as_secs() > 0 {
            format!("{:.1}s", duration.as_secs_f32())
        } else {
            format!("{}ms", duration.as_millis())
        }
    }

    fn format_event(&self, event: &TaskExecutionEvent) -> Option<String> {
        let prefix = self
            .context
            .as_ref()
            .map(|c| format!("[{}] ", c))
            .unwrap_or_default();

        match event {
            TaskExecutionEvent::TaskCompleted { id, duration } => Some(format!(
                "{}task {} completed in {}",
                prefix,
                id,
                Self::format_duration(*duration)
            )),
            TaskExecutionEvent::TaskFailed { id, duration, message } => Some(format!(
                "{}task {} failed after {}: {}",
                prefix,
                id,
                Self::format_duration(*duration),
                message
            )),
            TaskExecutionEvent::RunCompleted {
                total_tasks,
                failed_tasks,
                duration,
                ..
            } => Some(format!(
                "{}{} tasks finished in {} ({} failed)",
                prefix,
                total_tasks,
                Self::format_duration(*duration),
                failed_tasks
            )),
            TaskExecutionEvent::RunStarted { .. } | TaskExecutionEvent::TaskStarted { .. } => None,
        }
    }
}

impl ExecutionReporter for ConsoleReporter {
    fn report_event(&mut self, event: TaskExecutionEvent) {
        if let Some(line) = self.format_event(&event) {
            println!("{}", line);
        }
    }

    fn set_context(&mut self, context: String) {
        self.context = Some(context);
    }
}

/// Broadcasts events to multiple reporters
#[derive(Default)]
pub struct MultiReporter {
    reporters: Vec<Box<dyn ExecutionReporter>>,
}

impl MultiReporter {
    /// Create an empty broadcast list
    pub fn new() -> Self {
        Self {
            reporters: Vec::new(),
        }
    }

    /// Builder form of [`MultiReporter::push`]
    pub fn add_reporter<R: ExecutionReporter + 'static>(mut self, reporter: R) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }

    /// Add a reporter to an existing broadcast list
    pub fn push<R: ExecutionReporter + 'static>(&mut self, reporter: R) {
        self.reporters.push(Box::new(reporter));
    }
}

impl ExecutionReporter for MultiReporter {
    fn report_event(&mut self, event: TaskExecutionEvent) {
        for reporter in &mut self.reporters {
            reporter.report_event(event.clone());
        }
    }

    fn set_context(&mut self, context: String) {
        for reporter in &mut self.reporters {
            reporter.set_context(context.clone());
        }
    }

    fn finish(&mut self) {
        for reporter in &mut self.reporters {
            reporter.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct TestReporter {
        events: Arc<Mutex<Vec<TaskExecutionEvent>>>,
        finished: Arc<Mutex<bool>>,
    }

    impl ExecutionReporter for TestReporter {
        fn report_event(&mut self, event: TaskExecutionEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn finish(&mut self) {
            *self.finished.lock().unwrap() = true;
        }
    }

    #[test]
    fn test_console_reporter_lines() {
        let mut reporter = ConsoleReporter::new();
        let completed = TaskExecutionEvent::TaskCompleted {
            id: 2,
            duration: Duration::from_millis(130),
        };
        assert_eq!(
            reporter.format_event(&completed).as_deref(),
            Some("task 2 completed in 130ms")
        );

        reporter.set_context("demo".to_string());
        let failed = TaskExecutionEvent::TaskFailed {
            id: 0,
            duration: Duration::from_millis(1500),
            message: "boom".to_string(),
        };
        assert_eq!(
            reporter.format_event(&failed).as_deref(),
            Some("[demo] task 0 failed after 1.5s: boom")
        );

        let started = TaskExecutionEvent::TaskStarted { id: 1 };
        assert!(reporter.format_event(&started).is_none());
    }

    #[test]
    fn test_event_task_state() {
        assert_eq!(
            TaskExecutionEvent::TaskStarted { id: 3 }.task_state(),
            Some((3, TaskState::Running))
        );
        let completed = TaskExecutionEvent::TaskCompleted {
            id: 3,
            duration: Duration::ZERO,
        };
        assert_eq!(completed.task_state(), Some((3, TaskState::Completed)));

        let started = TaskExecutionEvent::RunStarted {
            run_id: RunId::new(),
            total_tasks: 1,
        };
        assert!(started.task_state().is_none());
    }

    #[test]
    fn test_multi_reporter() {
        let reporter1 = TestReporter::default();
        let reporter2 = TestReporter::default();

        let events1 = reporter1.events.clone();
        let events2 = reporter2.events.clone();
        let finished2 = reporter2.finished.clone();

        let mut multi = MultiReporter::new()
            .add_reporter(reporter1)
            .add_reporter(reporter2);

        multi.report_event(TaskExecutionEvent::TaskStarted { id: 0 });

        let reporter3 = TestReporter::default();
        let events3 = reporter3.events.clone();
        multi.push(reporter3);
        multi.report_event(TaskExecutionEvent::TaskStarted { id: 1 });
        multi.finish();

        assert_eq!(events1.lock().unwrap().len(), 2);
        assert_eq!(events2.lock().unwrap().len(), 2);
        assert_eq!(
            *events3.lock().unwrap(),
            vec![TaskExecutionEvent::TaskStarted { id: 1 }]
        );
        assert!(*finished2.lock().unwrap());
    }

    #[test]
    fn test_no_op_reporter() {
        let mut reporter = NoOpReporter;
        reporter.report_event(TaskExecutionEvent::TaskStarted { id: 0 });
        reporter.set_context("test".to_string());
        reporter.finish();
    }
}
