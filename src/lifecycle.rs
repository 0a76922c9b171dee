//! Startup allocation and shutdown teardown of the queue and node pool.

use serde::Serialize;

use crate::config::KernelConfig;
use crate::core::{TaskId, TaskQueue};
use crate::orchestration::NodePool;
use crate::{dlog, Result};

/// Allocate the node pool described by `config`.
///
/// Every node starts idle, responsive and unassigned, addressed by
/// `address_prefix` followed by its index.
///
/// # Errors
///
/// Returns a validation error for a zero-sized pool.
pub fn startup(config: &KernelConfig) -> Result<NodePool> {
    config.validate()?;
    let pool = NodePool::new(config.pool_size, |i| config.node_address(i));
    dlog!("Startup: allocated {} nodes", pool.len());
    Ok(pool)
}

/// What a shutdown discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    /// Pending tasks removed from the queue.
    pub discarded_queued: Vec<TaskId>,
    /// Dispatched tasks dropped without completing.
    pub discarded_in_flight: Vec<TaskId>,
    pub nodes_released: usize,
}

impl ShutdownReport {
    /// True when there was nothing left to tear down.
    pub fn was_noop(&self) -> bool {
        self.discarded_queued.is_empty()
            && self.discarded_in_flight.is_empty()
            && self.nodes_released == 0
    }
}

/// Tear down the queue and the pool.
///
/// Queued tasks are drained, in-flight tasks are discarded rather than
/// finished, and every node is released. Safe to call more than once.
pub fn shutdown(queue: &mut TaskQueue, pool: &mut NodePool) -> ShutdownReport {
    dlog!("Initiating DTK shutdown...");

    let discarded_queued: Vec<TaskId> = queue.drain().into_iter().map(|t| t.id).collect();
    if queue.is_empty() {
        dlog!("All tasks have been cleared from the queue");
    }

    let nodes_released = pool.len();
    let discarded_in_flight: Vec<TaskId> =
        pool.release_all().into_iter().map(|t| t.id).collect();

    dlog!(
        "All resources deallocated: {} queued, {} in flight, {} nodes",
        discarded_queued.len(),
        discarded_in_flight.len(),
        nodes_released
    );

    ShutdownReport {
        discarded_queued,
        discarded_in_flight,
        nodes_released,
    }
}
