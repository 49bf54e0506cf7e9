//! Per-task outcomes and the result set returned by a run

use std::ops::Index;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Completion record of a single task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// Position of the task in the submitted list
    pub id: usize,
    /// Wall-clock time spent inside the task body
    pub duration: Duration,
}

/// Outcomes of one run, indexed by submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    outcomes: Vec<TaskOutcome>,
    elapsed: Duration,
}

impl ResultSet {
    /// `outcomes[i].id` must equal `i`.
    pub(crate) fn new(outcomes: Vec<TaskOutcome>, elapsed: Duration) -> Self {
        debug_assert!(outcomes.iter().enumerate().all(|(i, o)| o.id == i));
        Self { outcomes, elapsed }
    }

    /// The result set of a run with no tasks
    pub fn empty() -> Self {
        Self::new(Vec::new(), Duration::ZERO)
    }

    /// Number of outcomes, equal to the number of submitted tasks
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True when the run had no tasks
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome of the task submitted at position `id`
    pub fn get(&self, id: usize) -> Option<&TaskOutcome> {
        self.outcomes.get(id)
    }

    /// Iterate outcomes in submission order
    pub fn iter(&self) -> std::slice::Iter<'_, TaskOutcome> {
        self.outcomes.iter()
    }

    /// Outcomes as a slice in submission order
    pub fn as_slice(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    /// Consume the set, keeping submission order
    pub fn into_vec(self) -> Vec<TaskOutcome> {
        self.outcomes
    }

    /// Wall-clock time from launching the first task to joining the last
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Summary statistics over all outcomes
    pub fn stats(&self) -> RunStats {
        RunStats::from_outcomes(&self.outcomes, self.elapsed)
    }
}

impl Index<usize> for ResultSet {
    type Output = TaskOutcome;

    fn index(&self, id: usize) -> &Self::Output {
        &self.outcomes[id]
    }
}

impl IntoIterator for ResultSet {
    type Item = TaskOutcome;
    type IntoIter = std::vec::IntoIter<TaskOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a TaskOutcome;
    type IntoIter = std::slice::Iter<'a, TaskOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

/// Run statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Wall-clock time of the whole run
    pub total_duration: Duration,

    /// Number of tasks executed
    pub total_tasks: usize,

    /// Sum of all task durations, i.e. what a sequential run would have cost
    pub cumulative_task_duration: Duration,

    /// Average task duration
    pub average_task_duration: Duration,

    /// Maximum task duration
    pub max_task_duration: Duration,

    /// Minimum task duration
    pub min_task_duration: Duration,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            total_duration: Duration::ZERO,
            total_tasks: 0,
            cumulative_task_duration: Duration::ZERO,
            average_task_duration: Duration::ZERO,
            max_task_duration: Duration::ZERO,
            min_task_duration: Duration::ZERO,
        }
    }
}

impl RunStats {
    fn from_outcomes(outcomes: &[TaskOutcome], total_duration: Duration) -> Self {
        if outcomes.is_empty() {
            return Self {
                total_duration,
                ..Self::default()
            };
        }

        let cumulative: Duration = outcomes.iter().map(|o| o.duration).sum();
        let max = outcomes.iter().map(|o| o.duration).max().unwrap_or_default();
        let min = outcomes.iter().map(|o| o.duration).min().unwrap_or_default();
        // Division by u32 keeps nanosecond precision; saturate for absurd task counts.
        let count = u32::try_from(outcomes.len()).unwrap_or(u32::MAX);

        Self {
            total_duration,
            total_tasks: outcomes.len(),
            cumulative_task_duration: cumulative,
            average_task_duration: cumulative / count,
            max_task_duration: max,
            min_task_duration: min,
        }
    }

    /// Ratio of cumulative task time to wall-clock time.
    ///
    /// Close to 1.0 for a sequential run, close to the task count when every
    /// task overlapped completely.
    pub fn parallelism(&self) -> f64 {
        if self.total_duration.is_zero() {
            return 0.0;
        }
        self.cumulative_task_duration.as_secs_f64() / self.total_duration.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: usize, ms: u64) -> TaskOutcome {
        TaskOutcome {
            id,
            duration: Duration::from_millis(ms),
        }
    }

    #[test]
    fn test_empty_result_set() {
        let results = ResultSet::empty();
        assert!(results.is_empty());
        assert_eq!(results.len(), 0);
        assert!(results.get(0).is_none());

        let stats = results.stats();
        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.parallelism(), 0.0);
    }

    #[test]
    fn test_indexing_and_iteration() {
        let results = ResultSet::new(
            vec![outcome(0, 300), outcome(1, 500), outcome(2, 1000)],
            Duration::from_millis(1000),
        );
        assert_eq!(results.len(), 3);
        assert_eq!(results[1].duration, Duration::from_millis(500));
        assert_eq!(results.get(2).map(|o| o.id), Some(2));

        let ids: Vec<usize> = results.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        let owned: Vec<TaskOutcome> = results.clone().into_iter().collect();
        assert_eq!(owned.as_slice(), results.as_slice());
    }

    #[test]
    fn test_stats() {
        let results = ResultSet::new(
            vec![outcome(0, 300), outcome(1, 500), outcome(2, 1000)],
            Duration::from_millis(1000),
        );
        let stats = results.stats();
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.total_duration, Duration::from_millis(1000));
        assert_eq!(stats.cumulative_task_duration, Duration::from_millis(1800));
        assert_eq!(stats.average_task_duration, Duration::from_millis(600));
        assert_eq!(stats.max_task_duration, Duration::from_millis(1000));
        assert_eq!(stats.min_task_duration, Duration::from_millis(300));
        assert!((stats.parallelism() - 1.8).abs() < 1e-9);
    }
}
