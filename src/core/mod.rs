//! Core domain models for the kernel.
//!
//! This module contains the fundamental data structures the scheduler
//! operates on: tasks, the pending-task queue and worker nodes.

pub mod node;
pub mod queue;
pub mod task;

pub use node::{Node, NodeId, NodeStatus};
pub use queue::TaskQueue;
pub use task::{Task, TaskId, TaskStatus, TaskType, TASK_COMPLETE_RESULT};
