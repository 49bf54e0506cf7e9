//! Runner configuration

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Configuration for the task runner
///
/// Thread name and stack size apply to thread-backed runs only; async runs
/// spawn onto whatever tokio runtime is current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Worker threads are named `{thread_name_prefix}-{id}`
    pub thread_name_prefix: String,

    /// Stack size for worker threads (None for the platform default)
    pub stack_size: Option<usize>,

    /// Print a progress line per completed task
    pub report_progress: bool,

    /// Label forwarded to the reporter as context
    pub context: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "task".to_string(),
            stack_size: None,
            report_progress: true,
            context: None,
        }
    }
}

impl RunnerConfig {
    /// Create a new runner configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker thread name prefix
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> ConfigResult<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        self.thread_name_prefix = prefix;
        Ok(self)
    }

    /// Set the worker thread stack size
    pub fn with_stack_size(mut self, size: usize) -> ConfigResult<Self> {
        if size == 0 {
            return Err(ConfigError::invalid_stack_size(size));
        }
        self.stack_size = Some(size);
        Ok(self)
    }

    /// Enable or disable progress reporting
    pub fn with_progress_reporting(mut self, enabled: bool) -> Self {
        self.report_progress = enabled;
        self
    }

    /// Set the reporter context label
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        validate_prefix(&self.thread_name_prefix)?;

        if let Some(size) = self.stack_size {
            if size == 0 {
                return Err(ConfigError::invalid_stack_size(size));
            }
        }

        Ok(())
    }

    /// Create a configuration optimized for testing
    pub fn for_testing() -> Self {
        Self {
            thread_name_prefix: "test-task".to_string(),
            stack_size: None,
            report_progress: false,
            context: None,
        }
    }

    /// Default configuration without progress output
    pub fn quiet() -> Self {
        Self::default().with_progress_reporting(false)
    }
}

fn validate_prefix(prefix: &str) -> ConfigResult<()> {
    if prefix.is_empty() {
        return Err(ConfigError::EmptyThreadNamePrefix);
    }
    if prefix.contains('\0') {
        return Err(ConfigError::invalid_thread_name_prefix(prefix));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thread_name_prefix, "task");
        assert!(config.report_progress);
        assert!(config.stack_size.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = RunnerConfig::new()
            .with_thread_name_prefix("worker")
            .unwrap()
            .with_stack_size(256 * 1024)
            .unwrap()
            .with_progress_reporting(false)
            .with_context("batch");

        assert_eq!(config.thread_name_prefix, "worker");
        assert_eq!(config.stack_size, Some(256 * 1024));
        assert!(!config.report_progress);
        assert_eq!(config.context.as_deref(), Some("batch"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        assert_eq!(
            RunnerConfig::new().with_thread_name_prefix(""),
            Err(ConfigError::EmptyThreadNamePrefix)
        );
        assert!(matches!(
            RunnerConfig::new().with_thread_name_prefix("a\0b"),
            Err(ConfigError::InvalidThreadNamePrefix { .. })
        ));
        assert_eq!(
            RunnerConfig::new().with_stack_size(0),
            Err(ConfigError::InvalidStackSize { size: 0 })
        );

        let config = RunnerConfig {
            stack_size: Some(0),
            ..RunnerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_preset_configs() {
        let testing = RunnerConfig::for_testing();
        assert!(testing.validate().is_ok());
        assert!(!testing.report_progress);

        let quiet = RunnerConfig::quiet();
        assert!(quiet.validate().is_ok());
        assert!(!quiet.report_progress);
        assert_eq!(quiet.thread_name_prefix, "task");
    }

    #[test]
    fn test_deserialize_partial_config() {
        let json = r#"{ "thread_name_prefix": "io", "report_progress": false }"#;
        let config: RunnerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.thread_name_prefix, "io");
        assert!(!config.report_progress);
        assert!(config.stack_size.is_none());
        assert!(config.context.is_none());
    }
}
