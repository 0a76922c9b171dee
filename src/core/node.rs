//! Worker node model.
//!
//! A node holds at most one active task. The status and the active slot are
//! only changed together through [`Node::assign`] and [`Node::release`], so
//! a node is `Busy` exactly when it holds a task.

use serde::{Deserialize, Serialize};

use crate::core::task::Task;
use crate::error::{Error, Result};

/// Identifier of a node, equal to its index in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    #[default]
    Idle,
    Busy,
    Offline,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Idle => "IDLE",
            NodeStatus::Busy => "BUSY",
            NodeStatus::Offline => "OFFLINE",
        }
    }
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A worker slot.
///
/// Outside the crate a node is read-only: tasks are placed and removed only
/// by the scheduler and by shutdown.
///
/// ```compile_fail
/// use dtk::core::{Node, NodeId};
///
/// let mut node = Node::new(NodeId(0), "192.168.1.10");
/// node.release();
/// ```
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    status: NodeStatus,
    /// Advisory liveness flag. Dispatch does not consult it.
    pub responsive: bool,
    address: String,
    active_task: Option<Task>,
}

impl Node {
    /// Create an idle, responsive node with no task.
    pub fn new(id: NodeId, address: impl Into<String>) -> Self {
        Self {
            id,
            status: NodeStatus::Idle,
            responsive: true,
            address: address.into(),
            active_task: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_idle(&self) -> bool {
        self.status == NodeStatus::Idle
    }

    pub fn is_busy(&self) -> bool {
        self.status == NodeStatus::Busy
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.active_task.as_ref()
    }

    pub(crate) fn active_task_mut(&mut self) -> Option<&mut Task> {
        self.active_task.as_mut()
    }

    /// Take ownership of `task`, mark it dispatched and make the node busy.
    ///
    /// # Errors
    ///
    /// `NodeBusy` unless the node is idle. The current task, if any, is kept.
    pub(crate) fn assign(&mut self, mut task: Task) -> Result<()> {
        if !self.is_idle() {
            return Err(Error::NodeBusy(self.id));
        }
        task.dispatch();
        self.active_task = Some(task);
        self.status = NodeStatus::Busy;
        Ok(())
    }

    /// Detach the active task, if any, and return the node to idle.
    ///
    /// This is the only Busy -> Idle transition.
    pub(crate) fn release(&mut self) -> Option<Task> {
        let task = self.active_task.take();
        if task.is_some() {
            self.status = NodeStatus::Idle;
        }
        task
    }

    /// Take the node out of rotation. Busy nodes cannot go offline.
    pub fn go_offline(&mut self) -> Result<()> {
        match self.status {
            NodeStatus::Busy => Err(Error::NodeBusy(self.id)),
            _ => {
                self.status = NodeStatus::Offline;
                Ok(())
            }
        }
    }

    /// Return an offline node to idle. No effect on idle or busy nodes.
    pub fn go_online(&mut self) {
        if self.status == NodeStatus::Offline {
            self.status = NodeStatus::Idle;
        }
    }
}
