//! HTTP client for weave-server and a small dependency-aware task runner.

pub mod client;
pub mod tasks;

pub use client::{Checkpoint, GraphClient, Node2VecRun};
pub use tasks::{
    build, BuildMetrics, BuildOptions, BuildSummary, ProjectTask, ProjectTaskRunner, Task,
    TaskError,
};
