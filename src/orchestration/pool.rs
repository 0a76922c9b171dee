//! Fixed-size pool of worker nodes.
//!
//! The `NodePool` is allocated once at startup and never resized. Nodes are
//! kept in index order, which is the order the scheduler visits them.

use crate::core::{Node, NodeId, NodeStatus, Task};
use crate::error::{Error, Result};
use crate::{dlog, dlog_warn};

/// Ordered collection of worker nodes.
///
/// # Example
///
/// ```
/// use dtk::orchestration::NodePool;
///
/// let pool = NodePool::new(2, |i| format!("192.168.1.1{i}"));
/// assert_eq!(pool.len(), 2);
/// assert_eq!(pool.idle_count(), 2);
/// ```
#[derive(Debug)]
pub struct NodePool {
    nodes: Vec<Node>,
    capacity: usize,
}

impl NodePool {
    /// Allocate `capacity` idle nodes, addressing node `i` with `address(i)`.
    pub fn new(capacity: usize, address: impl Fn(usize) -> String) -> Self {
        let nodes = (0..capacity)
            .map(|i| Node::new(NodeId(i), address(i)))
            .collect();
        Self { nodes, capacity }
    }

    /// Number of nodes the pool was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of nodes currently held (zero once released).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True after `release_all` has torn the pool down.
    pub fn is_released(&self) -> bool {
        self.nodes.is_empty() && self.capacity > 0
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[cfg(test)]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn idle_count(&self) -> usize {
        self.count(NodeStatus::Idle)
    }

    pub fn busy_count(&self) -> usize {
        self.count(NodeStatus::Busy)
    }

    fn count(&self, status: NodeStatus) -> usize {
        self.nodes.iter().filter(|n| n.status() == status).count()
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(Error::NodeNotFound(id))
    }

    /// Take a node out of rotation.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` for an unknown id, `NodeBusy` if the node holds a task.
    pub fn set_offline(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.go_offline()?;
        dlog_warn!("Node ID {} set offline", id);
        Ok(())
    }

    /// Bring an offline node back to idle.
    pub fn set_online(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.go_online();
        dlog!("Node ID {} back online", id);
        Ok(())
    }

    pub fn set_responsive(&mut self, id: NodeId, responsive: bool) -> Result<()> {
        self.node_mut(id)?.responsive = responsive;
        Ok(())
    }

    /// Detach every active task and drop all nodes.
    ///
    /// Returns the tasks that were still in flight. Calling this again on a
    /// released pool returns nothing.
    pub(crate) fn release_all(&mut self) -> Vec<Task> {
        let mut in_flight = Vec::new();
        for mut node in self.nodes.drain(..) {
            dlog!(
                "Node ID: {} @ address: {} deletion in progress...",
                node.id(),
                node.address()
            );
            if let Some(task) = node.release() {
                dlog!("Task ID: {} in progress, but deleting...", task.id);
                in_flight.push(task);
            }
        }
        in_flight
    }
}
