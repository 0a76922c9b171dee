//! Multi-step scheduling behaviour: FIFO order, node-order fairness,
//! offline nodes, and event delivery.

use dtk::core::{NodeId, NodeStatus, TaskId};
use dtk::orchestration::SchedulerEvent;
use dtk::{Error, Kernel, KernelConfig};

use crate::fixtures::{active, assert_invariants, kernel_with_nodes, node, queued_ids};

/// Test: FIFO order with no free nodes
/// Given every node offline
/// When N tasks are submitted
/// Then the queue holds them in submission order
#[test]
fn test_queue_preserves_submission_order() {
    let mut kernel = kernel_with_nodes(2);
    kernel.set_offline(NodeId(0)).unwrap();
    kernel.set_offline(NodeId(1)).unwrap();

    for ty in ["JOB_D", "JOB_C", "JOB_B", "JOB_A", "JOB_D"] {
        kernel.submit_task(ty, "x").unwrap();
    }

    let expected: Vec<TaskId> = (1..=5).map(TaskId).collect();
    assert_eq!(queued_ids(&kernel), expected);
    assert_invariants(&kernel);
}

/// Test: Tasks leave the queue in order as nodes free up
#[test]
fn test_dispatch_order_follows_queue_order() {
    let mut kernel = kernel_with_nodes(1);
    let rx = kernel.subscribe();
    for _ in 0..4 {
        kernel.submit_task("JOB_A", "x").unwrap();
    }
    for _ in 0..50 {
        kernel.advance();
    }

    let dispatched: Vec<TaskId> = rx
        .try_iter()
        .filter_map(|e| match e {
            SchedulerEvent::TaskDispatched { task_id, .. } => Some(task_id),
            _ => None,
        })
        .collect();
    assert_eq!(dispatched, (1..=4).map(TaskId).collect::<Vec<_>>());
    assert!(kernel.queue().is_empty());
}

/// Test: Lowest-index idle node gets the head of the queue
#[test]
fn test_first_idle_node_in_index_order_wins() {
    let mut kernel = kernel_with_nodes(3);
    kernel.submit_task("JOB_A", "x").unwrap();
    kernel.submit_task("JOB_B", "y").unwrap();

    assert_eq!(active(&kernel, 0).id, TaskId(1));
    assert_eq!(active(&kernel, 1).id, TaskId(2));
    assert!(node(&kernel, 2).is_idle());
}

/// Test: A busy node is not offered work until it finishes
#[test]
fn test_busy_node_holds_until_threshold() {
    let mut kernel = kernel_with_nodes(1);
    kernel.submit_task("JOB_A", "x").unwrap();
    kernel.submit_task("JOB_A", "y").unwrap();

    // T1 needs ceil(5/2) = 3 steps; the second submission already ran one.
    assert_eq!(active(&kernel, 0).id, TaskId(1));
    assert_eq!(active(&kernel, 0).progress, 2);
    assert_eq!(queued_ids(&kernel), vec![TaskId(2)]);

    kernel.advance();
    assert_eq!(active(&kernel, 0).id, TaskId(1));
    let report = kernel.advance();
    assert_eq!(report.completed(), vec![TaskId(1)]);
    assert_eq!(queued_ids(&kernel), vec![TaskId(2)]);

    kernel.advance();
    assert_eq!(active(&kernel, 0).id, TaskId(2));
    assert!(kernel.queue().is_empty());
    assert_invariants(&kernel);
}

/// Test: Offline nodes are skipped and rejoin when brought back
#[test]
fn test_offline_node_rejoins_rotation() {
    let mut kernel = kernel_with_nodes(2);
    kernel.set_offline(NodeId(0)).unwrap();

    kernel.submit_task("JOB_A", "x").unwrap();
    kernel.submit_task("JOB_B", "y").unwrap();
    assert_eq!(node(&kernel, 0).status(), NodeStatus::Offline);
    assert_eq!(active(&kernel, 1).id, TaskId(1));
    assert_eq!(queued_ids(&kernel), vec![TaskId(2)]);

    kernel.set_online(NodeId(0)).unwrap();
    let report = kernel.advance();
    assert_eq!(report.dispatched(), vec![(TaskId(2), NodeId(0))]);
    assert_invariants(&kernel);
}

/// Test: Larger increment finishes tasks in fewer steps
#[test]
fn test_custom_increment() {
    let mut kernel = Kernel::new(KernelConfig {
        pool_size: 1,
        progress_increment: 5,
        ..Default::default()
    })
    .unwrap();
    kernel.submit_task("JOB_A", "x").unwrap();

    let report = kernel.advance();
    assert_eq!(report.completed(), vec![TaskId(1)]);
}

/// Test: Status snapshot tracks the whole run
#[test]
fn test_status_snapshot_during_run() {
    let mut kernel = kernel_with_nodes(2);
    kernel
        .submit_batch(&[("A", "1"), ("B", "2"), ("C", "3")])
        .unwrap();

    let snap = kernel.status();
    assert_eq!(snap.busy_nodes(), 2);
    assert_eq!(snap.queue.len(), 1);
    assert_eq!(snap.queue[0].id, TaskId(3));
    assert_eq!(snap.live_tasks(), 3);

    let text = snap.to_string();
    assert!(text.contains("[STAT]: Node ID: 1 Status: BUSY At addr: 192.168.1.11"));
    assert!(text.contains("[PROG]: Task ID: 3 Status: PENDING Progress: (0/7 units)."));
}

/// Test: A dispatched task runs to completion whatever the operator does
/// Given a node running T1
/// When the operator tries to take it offline and submits an empty batch
/// Then both calls are rejected and T1 keeps its node and its progress
#[test]
fn test_running_task_survives_rejected_admin_calls() {
    let mut kernel = kernel_with_nodes(1);
    kernel.submit_task("JOB_A", "x").unwrap();
    kernel.advance();
    assert_eq!(active(&kernel, 0).progress, 2);

    assert!(matches!(kernel.set_offline(NodeId(0)), Err(Error::NodeBusy(NodeId(0)))));
    assert!(matches!(kernel.submit_batch(&[]), Err(Error::Validation(_))));
    kernel.set_responsive(NodeId(0), false).unwrap();

    assert_eq!(active(&kernel, 0).id, TaskId(1));
    assert_eq!(active(&kernel, 0).progress, 2);
    assert_invariants(&kernel);

    kernel.advance();
    let report = kernel.advance();
    assert_eq!(report.completed(), vec![TaskId(1)]);
    assert!(!kernel.is_shut_down());
}
