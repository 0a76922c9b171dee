//! FIFO queue of pending tasks.

use std::collections::VecDeque;

use crate::core::task::{Task, TaskStatus};
use crate::{dlog, dlog_trace};

/// Ordered collection of tasks waiting for a node.
///
/// Tasks leave in exactly the order they arrived. Only `Pending` tasks are
/// ever stored here.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task at the tail.
    pub fn enqueue(&mut self, task: Task) {
        debug_assert_eq!(task.status, TaskStatus::Pending);
        dlog_trace!("TaskQueue::enqueue task={}", task.id);
        self.tasks.push_back(task);
    }

    /// Remove and return the head, or `None` when the queue is empty.
    pub fn dequeue(&mut self) -> Option<Task> {
        let task = self.tasks.pop_front();
        match &task {
            Some(t) => dlog!("Task ID {} dequeued", t.id),
            None => dlog_trace!("TaskQueue::dequeue on empty queue"),
        }
        task
    }

    /// The head task, without removing it.
    pub fn peek(&self) -> Option<&Task> {
        self.tasks.front()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Iterate from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Remove every remaining task, returning them in queue order.
    ///
    /// Draining an empty queue returns an empty vector.
    pub fn drain(&mut self) -> Vec<Task> {
        let drained: Vec<Task> = self.tasks.drain(..).collect();
        for task in &drained {
            dlog!("Task ID {} deleted from queue", task.id);
        }
        drained
    }
}
