use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use weave_core::config::OrchestrationConfig;

use super::metrics::BuildMetrics;
use super::task::{Task, TaskError};

#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Tasks allowed to run at once.
    pub workers: usize,
}

impl BuildOptions {
    pub fn from_config(config: &OrchestrationConfig) -> Self {
        Self {
            workers: config.resolved_workers(),
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedTask {
    pub task_id: String,
    pub error: String,
}

/// Outcome of a [`build`] call. Task ids are listed in the order they finished.
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub succeeded: Vec<String>,
    pub already_complete: Vec<String>,
    pub failed: Vec<FailedTask>,
    /// Never started because a dependency failed.
    pub not_run: Vec<String>,
    pub metrics: BuildMetrics,
}

impl BuildSummary {
    /// True when every scheduled task is complete.
    pub fn success(&self) -> bool {
        self.failed.is_empty() && self.not_run.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Running,
    Done,
    Failed,
    Blocked,
}

struct Node {
    task: Arc<dyn Task>,
    deps: Vec<String>,
    state: State,
}

/// Run `tasks` and everything they require.
///
/// Tasks are deduplicated by [`Task::task_id`]. A task whose
/// [`Task::complete`] holds is not run and its requirements are not
/// expanded. A task starts only after all of its requirements succeeded.
/// Task failures are reported in the summary; `Err` is reserved for an
/// unusable build (no workers, dependency cycle).
pub async fn build(
    tasks: Vec<Arc<dyn Task>>,
    options: BuildOptions,
) -> Result<BuildSummary, TaskError> {
    if options.workers == 0 {
        return Err(TaskError::InvalidBuild(
            "workers must be at least 1".to_string(),
        ));
    }

    let mut summary = BuildSummary {
        succeeded: Vec::new(),
        already_complete: Vec::new(),
        failed: Vec::new(),
        not_run: Vec::new(),
        metrics: BuildMetrics::new(options.workers),
    };

    let (mut nodes, order) = expand(tasks, &mut summary).await;
    info!(
        scheduled = order.len(),
        already_complete = summary.already_complete.len(),
        workers = options.workers,
        "Starting build"
    );

    let semaphore = Arc::new(Semaphore::new(options.workers));
    let mut running: JoinSet<(String, Result<(), TaskError>, Duration)> = JoinSet::new();

    loop {
        block_dependents(&mut nodes, &order, &mut summary);

        for id in &order {
            if !ready(&nodes, id) {
                continue;
            }
            let Ok(permit) = semaphore.clone().try_acquire_owned() else {
                break;
            };
            let Some(node) = nodes.get_mut(id) else {
                continue;
            };
            node.state = State::Running;
            let task = node.task.clone();
            let id = id.clone();
            debug!(task = %id, "Starting task");
            running.spawn(async move {
                let _permit = permit;
                let started = Instant::now();
                let result = AssertUnwindSafe(task.run())
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| Err(TaskError::Failed("task panicked".to_string())));
                (id, result, started.elapsed())
            });
        }
        summary
            .metrics
            .observe_running(options.workers - semaphore.available_permits());

        let Some(joined) = running.join_next().await else {
            break;
        };
        let (id, result, elapsed) =
            joined.map_err(|e| TaskError::InvalidBuild(format!("worker stopped: {}", e)))?;
        let node = nodes
            .get_mut(&id)
            .ok_or_else(|| TaskError::InvalidBuild(format!("unknown task {} finished", id)))?;
        match result {
            Ok(()) => {
                debug!(task = %id, ?elapsed, "Task succeeded");
                node.state = State::Done;
                summary.metrics.record_execution(node.task.family(), elapsed);
                summary.succeeded.push(id);
            }
            Err(e) => {
                warn!(task = %id, error = %e, "Task failed");
                node.state = State::Failed;
                summary.failed.push(FailedTask {
                    task_id: id,
                    error: e.to_string(),
                });
            }
        }
    }

    let stuck: Vec<&String> = order
        .iter()
        .filter(|id| nodes[*id].state == State::Pending)
        .collect();
    if !stuck.is_empty() {
        return Err(TaskError::InvalidBuild(format!(
            "dependency cycle among {:?}",
            stuck
        )));
    }

    info!(
        succeeded = summary.succeeded.len(),
        failed = summary.failed.len(),
        not_run = summary.not_run.len(),
        "Build finished"
    );
    Ok(summary)
}

/// Walk the requirement graph from `roots`, checking completion on the way.
/// Returns the nodes and the ids to schedule, in discovery order.
async fn expand(
    roots: Vec<Arc<dyn Task>>,
    summary: &mut BuildSummary,
) -> (HashMap<String, Node>, Vec<String>) {
    let mut nodes: HashMap<String, Node> = HashMap::new();
    let mut order = Vec::new();
    let mut stack: Vec<Arc<dyn Task>> = roots.into_iter().rev().collect();

    while let Some(task) = stack.pop() {
        let id = task.task_id();
        if nodes.contains_key(&id) {
            continue;
        }

        let (state, deps) = match task.complete().await {
            Ok(true) => {
                debug!(task = %id, "Already complete");
                summary.already_complete.push(id.clone());
                (State::Done, Vec::new())
            }
            Ok(false) => {
                let requires = task.requires();
                let deps = requires.iter().map(|t| t.task_id()).collect();
                stack.extend(requires.into_iter().rev());
                order.push(id.clone());
                (State::Pending, deps)
            }
            Err(e) => {
                warn!(task = %id, error = %e, "Completion check failed");
                summary.failed.push(FailedTask {
                    task_id: id.clone(),
                    error: e.to_string(),
                });
                (State::Failed, Vec::new())
            }
        };
        nodes.insert(id, Node { task, deps, state });
    }
    (nodes, order)
}

fn ready(nodes: &HashMap<String, Node>, id: &str) -> bool {
    let node = &nodes[id];
    node.state == State::Pending && node.deps.iter().all(|d| nodes[d].state == State::Done)
}

/// Mark pending tasks whose requirements failed, transitively.
fn block_dependents(
    nodes: &mut HashMap<String, Node>,
    order: &[String],
    summary: &mut BuildSummary,
) {
    loop {
        let blocked: Vec<String> = order
            .iter()
            .filter(|id| {
                let node = &nodes[*id];
                node.state == State::Pending
                    && node
                        .deps
                        .iter()
                        .any(|d| matches!(nodes[d].state, State::Failed | State::Blocked))
            })
            .cloned()
            .collect();
        if blocked.is_empty() {
            return;
        }
        for id in blocked {
            debug!(task = %id, "Dependency failed, not running");
            if let Some(node) = nodes.get_mut(&id) {
                node.state = State::Blocked;
            }
            summary.not_run.push(id);
        }
    }
}
