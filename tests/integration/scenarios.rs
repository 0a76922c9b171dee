//! Reference walkthroughs of dispatch, progress, rejection and shutdown.

use dtk::core::{NodeId, NodeStatus, TaskId, TaskStatus};
use dtk::orchestration::SchedulerEvent;
use dtk::Error;

use crate::fixtures::{active, assert_invariants, kernel_with_nodes, node, queued_ids};

/// Scenario A
/// Given a pool of 2 idle nodes
/// When T1 (type A, work 5) is submitted
/// Then the triggered step dispatches T1 to node 0 and the queue is empty
#[test]
fn test_submit_dispatches_to_node_zero() {
    let mut kernel = kernel_with_nodes(2);

    let id = kernel.submit_task("JOB_A", "input").unwrap();

    assert_eq!(id, TaskId(1));
    assert_eq!(node(&kernel, 0).status(), NodeStatus::Busy);
    assert_eq!(active(&kernel, 0).id, TaskId(1));
    assert_eq!(active(&kernel, 0).work_required, 5);
    assert_eq!(active(&kernel, 0).status, TaskStatus::Dispatched);
    assert!(kernel.queue().is_empty());
    assert!(node(&kernel, 1).is_idle());
    assert_invariants(&kernel);
}

/// Scenario B
/// Given T1 active on node 0 with work 5 and increment 2
/// When advance is called three times
/// Then progress goes 2, 4 and the third call completes T1
#[test]
fn test_three_advances_complete_first_task() {
    let mut kernel = kernel_with_nodes(2);
    kernel.submit_task("JOB_A", "input").unwrap();

    kernel.advance();
    assert_eq!(active(&kernel, 0).progress, 2);
    kernel.advance();
    assert_eq!(active(&kernel, 0).progress, 4);
    assert_invariants(&kernel);

    let report = kernel.advance();
    assert_eq!(report.completed(), vec![TaskId(1)]);
    assert!(report.events.iter().any(|e| matches!(
        e,
        SchedulerEvent::TaskCompleted { task_id: TaskId(1), result, .. } if result == "[TASK COMPLETE]"
    )));
    assert!(node(&kernel, 0).is_idle());
    assert!(node(&kernel, 0).active_task().is_none());
    assert_eq!(kernel.status().live_tasks(), 0);

    // Completion is not repeated.
    assert!(kernel.advance().completed().is_empty());
}

/// Scenario C
/// Given 2 idle nodes
/// When T1 and T2 are submitted in one burst
/// Then a single step dispatches T1 to node 0 and T2 to node 1
#[test]
fn test_burst_dispatches_both_in_one_step() {
    let mut kernel = kernel_with_nodes(2);

    let (ids, step) = kernel
        .submit_batch(&[("JOB_A", "first"), ("JOB_B", "second")])
        .unwrap();

    assert_eq!(ids, vec![TaskId(1), TaskId(2)]);
    assert_eq!(
        step.dispatched(),
        vec![(TaskId(1), NodeId(0)), (TaskId(2), NodeId(1))]
    );
    assert_eq!(active(&kernel, 0).id, TaskId(1));
    assert_eq!(active(&kernel, 1).id, TaskId(2));
    assert!(kernel.queue().is_empty());
    assert_invariants(&kernel);
}

/// Scenario D
/// Given a running kernel
/// When a task is submitted with an unknown type
/// Then InvalidTaskType is returned and nothing changes
#[test]
fn test_unknown_type_is_rejected_without_side_effects() {
    let mut kernel = kernel_with_nodes(2);
    kernel.set_offline(NodeId(0)).unwrap();
    kernel.set_offline(NodeId(1)).unwrap();
    kernel.submit_task("JOB_A", "queued").unwrap();
    let before = kernel.queue().len();

    let err = kernel.submit_task("JOB_Q", "bad").unwrap_err();

    assert!(matches!(err, Error::InvalidTaskType(ref s) if s == "JOB_Q"));
    assert_eq!(kernel.queue().len(), before);
    assert_eq!(kernel.submit_task("JOB_B", "next").unwrap(), TaskId(2));
    assert_eq!(queued_ids(&kernel), vec![TaskId(1), TaskId(2)]);
}

/// Scenario E
/// Given node 0 busy with T3
/// When shutdown is called
/// Then T3 is discarded, not completed, and every node is released
#[test]
fn test_shutdown_discards_in_flight_task() {
    let mut kernel = kernel_with_nodes(2);
    kernel.set_offline(NodeId(1)).unwrap();
    kernel.submit_task("JOB_A", "one").unwrap();
    for _ in 0..3 {
        kernel.advance();
    }
    kernel.submit_task("JOB_B", "two").unwrap();
    for _ in 0..4 {
        kernel.advance();
    }
    let t3 = kernel.submit_task("JOB_C", "three").unwrap();
    assert_eq!(t3, TaskId(3));
    assert_eq!(active(&kernel, 0).id, t3);

    let report = kernel.shutdown_with_report();

    assert_eq!(report.discarded_in_flight, vec![t3]);
    assert!(report.discarded_queued.is_empty());
    assert_eq!(report.nodes_released, 2);
    assert!(kernel.queue().is_empty());
    assert!(kernel.pool().is_released());
    assert_eq!(kernel.status().live_tasks(), 0);
    assert!(kernel.status().nodes.is_empty());
}

/// Shutdown is idempotent and blocks further submissions.
#[test]
fn test_shutdown_twice_is_safe() {
    let mut kernel = kernel_with_nodes(2);
    kernel.submit_task("JOB_A", "x").unwrap();

    assert!(kernel.shutdown());
    assert!(kernel.shutdown());
    assert!(kernel.shutdown_with_report().was_noop());
    assert!(matches!(
        kernel.submit_task("JOB_A", "late"),
        Err(Error::KernelShutDown)
    ));
}
