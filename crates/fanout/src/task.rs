//! Task abstractions and lifecycle

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A boxed zero-argument unit of work executed for its side effects
pub type Task<'a> = Box<dyn FnOnce() + Send + 'a>;

/// A boxed future that is Send and can be spawned onto the tokio runtime
pub type AsyncTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Box a closure so tasks of different types can share one list
pub fn task<'a, F>(f: F) -> Task<'a>
where
    F: FnOnce() + Send + 'a,
{
    Box::new(f)
}

/// Box a future so async tasks of different types can share one list
pub fn async_task<F>(future: F) -> AsyncTask
where
    F: Future<Output = ()> + Send + 'static,
{
    Box::pin(future)
}

/// Unique identifier for one invocation of the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new unique run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a single task within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Worker has not picked the task up yet
    NotStarted,
    /// Task body is executing
    Running,
    /// Task returned normally
    Completed,
    /// Task panicked
    Failed,
}

impl TaskState {
    /// Check if the task is in a final state
    pub fn is_finished(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

/// A panic captured from a task body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFault {
    pub id: usize,
    pub message: String,
}

impl TaskFault {
    /// Build a fault from the payload returned by `catch_unwind`
    pub fn from_panic(id: usize, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { id, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_generation() {
        let id1 = RunId::new();
        let id2 = RunId::new();
        assert_ne!(id1, id2);
        assert_eq!(id1.to_string(), id1.0.to_string());
    }

    #[test]
    fn test_task_state() {
        assert!(!TaskState::NotStarted.is_finished());
        assert!(!TaskState::Running.is_finished());
        assert!(TaskState::Completed.is_finished());
        assert!(TaskState::Failed.is_finished());
    }

    #[test]
    fn test_fault_from_panic_payloads() {
        let payload = std::panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(TaskFault::from_panic(0, payload).message, "static message");

        let payload = std::panic::catch_unwind(|| panic!("formatted {}", 42)).unwrap_err();
        let fault = TaskFault::from_panic(4, payload);
        assert_eq!(fault.id, 4);
        assert_eq!(fault.message, "formatted 42");

        let payload = std::panic::catch_unwind(|| std::panic::panic_any(17u8)).unwrap_err();
        assert_eq!(TaskFault::from_panic(1, payload).message, "non-string panic payload");
    }

    #[test]
    fn test_boxed_tasks_share_a_list() {
        let counter = std::sync::atomic::AtomicUsize::new(0);
        let tasks: Vec<Task<'_>> = vec![
            task(|| {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }),
            task(|| {
                counter.fetch_add(2, std::sync::atomic::Ordering::SeqCst);
            }),
        ];
        for t in tasks {
            t();
        }
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 3);
    }
}
