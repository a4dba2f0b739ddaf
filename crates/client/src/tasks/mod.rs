//! Dependency-aware task execution on a bounded worker pool.
//!
//! A [`Task`] names its dependencies through [`Task::requires`] and reports
//! whether its output already exists through [`Task::complete`]. [`build`]
//! deduplicates tasks by [`Task::task_id`], skips complete ones and runs the
//! rest with at most `workers` in flight.

mod build;
mod metrics;
mod project;
mod task;

pub use build::{build, BuildOptions, BuildSummary, FailedTask};
pub use metrics::BuildMetrics;
pub use project::{ProjectTask, ProjectTaskRunner};
pub use task::{Task, TaskError};
