use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Execution metrics of one `build` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildMetrics {
    /// Successful runs by task family.
    pub tasks_executed: HashMap<String, u64>,
    /// Average run duration by task family.
    pub avg_task_duration: HashMap<String, Duration>,
    /// Last completion time by task family.
    pub last_run: HashMap<String, DateTime<Utc>>,
    /// Most tasks observed running at once.
    pub peak_concurrency: usize,
    /// Size of the worker pool.
    pub workers: usize,
}

impl BuildMetrics {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    /// Record a successful task run.
    pub fn record_execution(&mut self, family: &str, duration: Duration) {
        *self.tasks_executed.entry(family.to_string()).or_default() += 1;
        self.last_run.insert(family.to_string(), Utc::now());

        let count = self.tasks_executed[family];
        let prev_avg = self
            .avg_task_duration
            .get(family)
            .copied()
            .unwrap_or_default();

        // Incremental mean: new_avg = prev_avg + (duration - prev_avg) / count
        let new_avg = if count == 1 {
            duration
        } else {
            let prev_nanos = prev_avg.as_nanos() as f64;
            let cur_nanos = duration.as_nanos() as f64;
            let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / count as f64;
            Duration::from_nanos(avg_nanos as u64)
        };

        self.avg_task_duration.insert(family.to_string(), new_avg);
    }

    pub fn observe_running(&mut self, running: usize) {
        self.peak_concurrency = self.peak_concurrency.max(running);
    }

    /// Fraction of the pool in use at the busiest moment.
    pub fn peak_utilization(&self) -> f64 {
        if self.workers == 0 {
            0.0
        } else {
            self.peak_concurrency as f64 / self.workers as f64
        }
    }
}
