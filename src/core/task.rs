//! Task data model.
//!
//! Tasks are the units of work moved from the queue onto nodes. Each task
//! carries its type, lifecycle status and a simulated effort counter.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Result payload attached to every completed task.
pub const TASK_COMPLETE_RESULT: &str = "[TASK COMPLETE]";

/// Identifier for a submitted task.
///
/// Assigned monotonically by the kernel starting at 1 and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of job kinds a task can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    #[serde(rename = "JOB_A")]
    A,
    #[serde(rename = "JOB_B")]
    B,
    #[serde(rename = "JOB_C")]
    C,
    #[serde(rename = "JOB_D")]
    D,
}

impl TaskType {
    pub const ALL: [TaskType; 4] = [TaskType::A, TaskType::B, TaskType::C, TaskType::D];

    /// Parse a type name, accepting `A`..`D` or `JOB_A`..`JOB_D` in any case.
    ///
    /// Returns `None` for everything else; never panics.
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let letter = upper.strip_prefix("JOB_").unwrap_or(upper.as_str());
        match letter {
            "A" => Some(TaskType::A),
            "B" => Some(TaskType::B),
            "C" => Some(TaskType::C),
            "D" => Some(TaskType::D),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::A => "JOB_A",
            TaskType::B => "JOB_B",
            TaskType::C => "JOB_C",
            TaskType::D => "JOB_D",
        }
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::InvalidTaskType(s.to_string()))
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task status in its lifecycle.
///
/// Progression is Pending -> Dispatched -> Completed. `Failed` is reserved
/// for future error paths and is never produced by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    Dispatched,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Dispatched => "DISPATCHED",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of submitted work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub input_data: String,
    /// Empty until the task completes.
    pub result_data: String,
    /// Simulated work done so far.
    pub progress: u32,
    /// Simulated work needed to finish.
    pub work_required: u32,
}

impl Task {
    /// Create a pending task with no progress.
    pub fn new(id: TaskId, task_type: TaskType, input_data: &str, work_required: u32) -> Self {
        Self {
            id,
            task_type,
            status: TaskStatus::Pending,
            input_data: input_data.to_string(),
            result_data: String::new(),
            progress: 0,
            work_required,
        }
    }

    /// Mark the task as handed to a node.
    pub fn dispatch(&mut self) {
        self.status = TaskStatus::Dispatched;
    }

    /// Add `increment` units of simulated work and return the new progress.
    pub fn advance(&mut self, increment: u32) -> u32 {
        self.progress = self.progress.saturating_add(increment);
        self.progress
    }

    /// Whether accumulated progress has reached the required work.
    pub fn is_done(&self) -> bool {
        self.progress >= self.work_required
    }

    /// Mark the task completed and attach its result.
    pub fn complete(&mut self) {
        self.status = TaskStatus::Completed;
        self.result_data = TASK_COMPLETE_RESULT.to_string();
    }
}
