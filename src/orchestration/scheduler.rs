//! Scheduler step function.
//!
//! A step is one synchronous pass over the node pool in index order:
//! idle nodes take the head of the queue, busy nodes advance their task by a
//! fixed increment and release it once the required work is reached, and
//! offline nodes are skipped.
//!
//! Steps are triggered by the caller (once per submission and once per
//! explicit advance), so completion time is counted in steps rather than
//! wall-clock time. The step never sleeps or performs I/O beyond logging;
//! everything it did is returned as a [`StepReport`] for the driver to act on.

use serde::Serialize;

use crate::config::DEFAULT_PROGRESS_INCREMENT;
use crate::core::{NodeId, NodeStatus, TaskId, TaskQueue};
use crate::orchestration::pool::NodePool;
use crate::{dlog, dlog_debug, dlog_error, dlog_warn};

/// Something that happened to a node during a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum SchedulerEvent {
    /// The head of the queue was handed to an idle node.
    TaskDispatched {
        task_id: TaskId,
        node_id: NodeId,
        address: String,
    },
    /// A busy node advanced its task without finishing it.
    TaskProgressed {
        task_id: TaskId,
        node_id: NodeId,
        progress: u32,
        work_required: u32,
    },
    /// A task reached its required work and left the pool.
    TaskCompleted {
        task_id: TaskId,
        node_id: NodeId,
        result: String,
    },
    /// An idle node found nothing to do.
    NodeIdle { node_id: NodeId },
    /// An offline node was skipped.
    NodeOffline { node_id: NodeId },
}

/// Outcome of a single scheduler step, in node order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub events: Vec<SchedulerEvent>,
}

impl StepReport {
    /// Tasks dispatched during the step, as `(task, node)` pairs.
    pub fn dispatched(&self) -> Vec<(TaskId, NodeId)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SchedulerEvent::TaskDispatched {
                    task_id, node_id, ..
                } => Some((*task_id, *node_id)),
                _ => None,
            })
            .collect()
    }

    /// Tasks completed during the step.
    pub fn completed(&self) -> Vec<TaskId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SchedulerEvent::TaskCompleted { task_id, .. } => Some(*task_id),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Drives tasks from the queue through the node pool.
#[derive(Debug, Clone)]
pub struct Scheduler {
    increment: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INCREMENT)
    }
}

impl Scheduler {
    /// Create a scheduler that advances busy nodes by `increment` per step.
    pub fn new(increment: u32) -> Self {
        Self { increment }
    }

    /// Run one pass over the pool.
    ///
    /// Each idle node takes at most one task, so a single step can dispatch
    /// up to one task per idle node. A node that completes its task during
    /// this step becomes idle but is not offered new work until the next step.
    pub fn step(&self, queue: &mut TaskQueue, pool: &mut NodePool) -> StepReport {
        let mut report = StepReport::default();

        for node in pool.iter_mut() {
            let node_id = node.id();
            dlog_debug!(
                "SCHEDULER - Checking Node ID: {}, Status: {}, Queue Head Task ID: {}",
                node_id,
                node.status(),
                queue
                    .peek()
                    .map(|t| t.id.to_string())
                    .unwrap_or_else(|| "NULL".to_string())
            );

            match node.status() {
                NodeStatus::Idle => match queue.dequeue() {
                    Some(task) => {
                        let task_id = task.id;
                        if let Err(e) = node.assign(task) {
                            dlog_error!("Task ID: {} not dispatched: {}", task_id, e);
                            continue;
                        }
                        dlog!(
                            "Dispatched Task ID: {} to Node ID: {} @ address: {}",
                            task_id,
                            node_id,
                            node.address()
                        );
                        report.events.push(SchedulerEvent::TaskDispatched {
                            task_id,
                            node_id,
                            address: node.address().to_string(),
                        });
                    }
                    None => {
                        dlog_debug!("Node ID: {} is IDLE, there are no new tasks", node_id);
                        report.events.push(SchedulerEvent::NodeIdle { node_id });
                    }
                },
                NodeStatus::Busy => {
                    let Some(task) = node.active_task_mut() else {
                        continue;
                    };
                    task.advance(self.increment);
                    if !task.is_done() {
                        dlog!(
                            "Node ID: {} is busy with Task ID: {} ({}/{} units)",
                            node_id,
                            task.id,
                            task.progress,
                            task.work_required
                        );
                        report.events.push(SchedulerEvent::TaskProgressed {
                            task_id: task.id,
                            node_id,
                            progress: task.progress,
                            work_required: task.work_required,
                        });
                        continue;
                    }

                    task.complete();
                    if let Some(done) = node.release() {
                        dlog!("Task ID: {} completed over Node ID: {}", done.id, node_id);
                        report.events.push(SchedulerEvent::TaskCompleted {
                            task_id: done.id,
                            node_id,
                            result: done.result_data,
                        });
                    }
                }
                NodeStatus::Offline => {
                    dlog_warn!("Node ID: {} is offline, checking next node", node_id);
                    report.events.push(SchedulerEvent::NodeOffline { node_id });
                }
            }
        }

        report
    }
}
