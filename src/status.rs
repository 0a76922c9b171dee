//! Read-only status snapshots of the queue and node pool.

use serde::Serialize;
use std::fmt;

use crate::core::{Node, NodeId, NodeStatus, Task, TaskId, TaskQueue, TaskStatus, TaskType};
use crate::orchestration::NodePool;

/// Point-in-time view of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub progress: u32,
    pub work_required: u32,
}

impl From<&Task> for TaskSnapshot {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            task_type: task.task_type,
            status: task.status,
            progress: task.progress,
            work_required: task.work_required,
        }
    }
}

/// Point-in-time view of one node and its active task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub status: NodeStatus,
    pub address: String,
    pub responsive: bool,
    pub active_task: Option<TaskSnapshot>,
}

impl From<&Node> for NodeSnapshot {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id(),
            status: node.status(),
            address: node.address().to_string(),
            responsive: node.responsive,
            active_task: node.active_task().map(TaskSnapshot::from),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub nodes: Vec<NodeSnapshot>,
    /// Queued tasks from head to tail. Empty means the queue is empty.
    pub queue: Vec<TaskSnapshot>,
}

impl Snapshot {
    /// Capture the current state without mutating either structure.
    pub fn capture(queue: &TaskQueue, pool: &NodePool) -> Self {
        Self {
            nodes: pool.iter().map(NodeSnapshot::from).collect(),
            queue: queue.iter().map(TaskSnapshot::from).collect(),
        }
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn busy_nodes(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.status == NodeStatus::Busy)
            .count()
    }

    /// Tasks still alive: queued plus in flight.
    pub fn live_tasks(&self) -> usize {
        self.queue.len() + self.nodes.iter().filter(|n| n.active_task.is_some()).count()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            writeln!(
                f,
                "[STAT]: Node ID: {} Status: {} At addr: {}",
                node.id, node.status, node.address
            )?;
            if let Some(task) = &node.active_task {
                writeln!(
                    f,
                    "[PROG]: Task ID: {} Status: {} @ Node: {} Progress: ({}/{} units).",
                    task.id, task.status, node.address, task.progress, task.work_required
                )?;
            }
        }

        if self.queue.is_empty() {
            writeln!(f, "[STAT]: No Tasks are found in queue!")?;
        }
        for task in &self.queue {
            writeln!(
                f,
                "[PROG]: Task ID: {} Status: {} Progress: ({}/{} units).",
                task.id, task.status, task.progress, task.work_required
            )?;
        }
        Ok(())
    }
}
