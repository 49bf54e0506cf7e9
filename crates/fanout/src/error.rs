//! Error types for the fanout task runner

use thiserror::Error;

/// Main error type for runner operations
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Run error: {0}")]
    Run(#[from] RunError),
}

/// Errors raised while running a batch of tasks
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Task {id} panicked: {message}")]
    TaskPanicked { id: usize, message: String },

    #[error("Failed to spawn worker for task {id}")]
    SpawnFailed {
        id: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Task {id} was aborted before completing")]
    TaskAborted { id: usize },
}

/// Errors related to configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Thread name prefix must not be empty")]
    EmptyThreadNamePrefix,

    #[error("Invalid thread name prefix {prefix:?}: must not contain NUL bytes")]
    InvalidThreadNamePrefix { prefix: String },

    #[error("Invalid stack size: {size} (must be > 0)")]
    InvalidStackSize { size: usize },
}

/// Result type alias for runner operations
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Result type alias for a single run
pub type RunResult<T> = Result<T, RunError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl RunnerError {
    /// Check if this error was caused by a panicking task
    pub fn is_panic(&self) -> bool {
        matches!(self, RunnerError::Run(RunError::TaskPanicked { .. }))
    }

    /// The index of the task this error refers to, if any
    pub fn task_id(&self) -> Option<usize> {
        match self {
            RunnerError::Run(err) => Some(err.task_id()),
            RunnerError::Config(_) => None,
        }
    }
}

impl RunError {
    /// Create a panic error
    pub fn panicked<S: Into<String>>(id: usize, message: S) -> Self {
        RunError::TaskPanicked {
            id,
            message: message.into(),
        }
    }

    /// Create a spawn failure error
    pub fn spawn_failed(id: usize, source: std::io::Error) -> Self {
        RunError::SpawnFailed { id, source }
    }

    /// Create an abort error
    pub fn aborted(id: usize) -> Self {
        RunError::TaskAborted { id }
    }

    /// The index of the task this error refers to
    pub fn task_id(&self) -> usize {
        match self {
            RunError::TaskPanicked { id, .. }
            | RunError::SpawnFailed { id, .. }
            | RunError::TaskAborted { id } => *id,
        }
    }
}

impl ConfigError {
    /// Create an invalid thread name prefix error
    pub fn invalid_thread_name_prefix<S: Into<String>>(prefix: S) -> Self {
        ConfigError::InvalidThreadNamePrefix {
            prefix: prefix.into(),
        }
    }

    /// Create an invalid stack size error
    pub fn invalid_stack_size(size: usize) -> Self {
        ConfigError::InvalidStackSize { size }
    }
}
