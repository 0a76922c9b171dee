//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Building kernels with a given pool size
//! - Reading node/queue state by id
//! - Checking the ownership invariants

use std::collections::HashSet;

use dtk::core::{Node, NodeId, NodeStatus, Task, TaskId, TaskStatus};
use dtk::{Kernel, KernelConfig};

/// Kernel with `nodes` workers and default settings otherwise.
pub fn kernel_with_nodes(nodes: usize) -> Kernel {
    Kernel::new(KernelConfig {
        pool_size: nodes,
        ..Default::default()
    })
    .expect("Failed to start kernel")
}

pub fn node(kernel: &Kernel, id: usize) -> &Node {
    kernel.pool().get(NodeId(id)).expect("node exists")
}

/// The task currently running on node `id`.
pub fn active(kernel: &Kernel, id: usize) -> &Task {
    node(kernel, id).active_task().expect("node has an active task")
}

pub fn queued_ids(kernel: &Kernel) -> Vec<TaskId> {
    kernel.queue().iter().map(|t| t.id).collect()
}

/// Assert that every live task sits in exactly one place and that node
/// status agrees with the active slot.
pub fn assert_invariants(kernel: &Kernel) {
    let mut seen = HashSet::new();
    for task in kernel.queue().iter() {
        assert_eq!(task.status, TaskStatus::Pending, "queued task {} not pending", task.id);
        assert!(seen.insert(task.id), "task {} appears twice", task.id);
    }
    for node in kernel.pool().iter() {
        let busy = node.status() == NodeStatus::Busy;
        assert_eq!(
            busy,
            node.active_task().is_some(),
            "node {} status {} disagrees with active slot",
            node.id(),
            node.status()
        );
        if let Some(task) = node.active_task() {
            assert!(seen.insert(task.id), "task {} appears twice", task.id);
        }
    }
}
