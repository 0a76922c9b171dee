//! The kernel facade: owns the queue, the node pool and the id counters, and
//! exposes the submit / advance / status / shutdown contract.

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::config::KernelConfig;
use crate::core::{NodeId, Task, TaskId, TaskQueue, TaskType};
use crate::lifecycle::{self, ShutdownReport};
use crate::orchestration::{NodePool, Scheduler, SchedulerEvent, StepReport};
use crate::status::Snapshot;
use crate::{dlog, dlog_error, dlog_warn, Error, Result};

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub task_id: TaskId,
    /// The scheduler step the submission triggered.
    pub step: StepReport,
}

/// Counters handing out task ids and simulated work sizes.
///
/// `None` means the counter ran past its maximum: the last value was handed
/// out and nothing follows it.
#[derive(Debug, Clone, Copy)]
struct Allocator {
    next_id: Option<u64>,
    next_work_units: Option<u32>,
    work_units_step: u32,
}

impl Allocator {
    fn new(config: &KernelConfig) -> Self {
        Self {
            next_id: Some(1),
            next_work_units: Some(config.initial_work_units),
            work_units_step: config.work_units_step,
        }
    }

    /// Build the next task. Counters only move when this succeeds.
    fn allocate(&mut self, task_type: TaskType, input: &str) -> Result<Task> {
        let id = self
            .next_id
            .ok_or_else(|| Error::AllocationFailure("task ids exhausted".to_string()))?;
        let work = self
            .next_work_units
            .ok_or_else(|| Error::AllocationFailure("work units overflow".to_string()))?;

        self.next_id = id.checked_add(1);
        self.next_work_units = work.checked_add(self.work_units_step);
        Ok(Task::new(TaskId(id), task_type, input, work))
    }
}

/// Single-owner driver for the scheduling core.
///
/// All mutation happens through `&mut self`, so there is exactly one actor
/// changing the queue and pool at any time.
///
/// # Example
///
/// ```
/// use dtk::{Kernel, KernelConfig};
///
/// let mut kernel = Kernel::new(KernelConfig::default()).unwrap();
/// let id = kernel.submit_task("JOB_A", "payload").unwrap();
/// assert_eq!(id.0, 1);
/// assert_eq!(kernel.status().busy_nodes(), 1);
/// assert!(kernel.shutdown());
/// ```
pub struct Kernel {
    config: KernelConfig,
    queue: TaskQueue,
    pool: NodePool,
    scheduler: Scheduler,
    allocator: Allocator,
    subscribers: Vec<Sender<SchedulerEvent>>,
    shut_down: bool,
}

impl Kernel {
    /// Start a kernel with the pool described by `config`.
    pub fn new(config: KernelConfig) -> Result<Self> {
        let pool = lifecycle::startup(&config)?;
        Ok(Self {
            queue: TaskQueue::new(),
            pool,
            scheduler: Scheduler::new(config.progress_increment),
            allocator: Allocator::new(&config),
            subscribers: Vec::new(),
            shut_down: false,
            config,
        })
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn pool(&self) -> &NodePool {
        &self.pool
    }

    /// Take an idle node out of rotation.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` for an unknown id, `NodeBusy` while it runs a task.
    pub fn set_offline(&mut self, id: NodeId) -> Result<()> {
        self.pool.set_offline(id)
    }

    /// Return an offline node to the rotation.
    pub fn set_online(&mut self, id: NodeId) -> Result<()> {
        self.pool.set_online(id)
    }

    pub fn set_responsive(&mut self, id: NodeId, responsive: bool) -> Result<()> {
        self.pool.set_responsive(id, responsive)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Receive every scheduler event from now on.
    ///
    /// Delivery never blocks the kernel: when the buffer is full, events are
    /// dropped for that subscriber.
    pub fn subscribe(&mut self) -> Receiver<SchedulerEvent> {
        let (tx, rx) = crossbeam_channel::bounded(self.config.event_capacity.max(1));
        self.subscribers.push(tx);
        rx
    }

    /// Submit a task and run one scheduler step.
    ///
    /// # Errors
    ///
    /// - `InvalidTaskType` if `task_type` is not one of the four job kinds
    /// - `AllocationFailure` if no further task can be created
    /// - `KernelShutDown` after [`Kernel::shutdown`]
    ///
    /// On error neither the queue nor the pool changes and no id is consumed.
    pub fn submit(&mut self, task_type: &str, input: &str) -> Result<Submission> {
        self.ensure_running()?;
        let ty = parse_type(task_type)?;
        let task = self.allocator.allocate(ty, input).inspect_err(|e| {
            dlog_error!("{}", e);
        })?;

        let task_id = task.id;
        self.queue.enqueue(task);
        dlog!("Task ID {} ({}) submitted and queued", task_id, ty);

        let step = self.advance();
        Ok(Submission { task_id, step })
    }

    /// Submit a task and return its id.
    pub fn submit_task(&mut self, task_type: &str, input: &str) -> Result<TaskId> {
        self.submit(task_type, input).map(|s| s.task_id)
    }

    /// Submit several tasks as one burst, then run a single step.
    ///
    /// Every entry is validated before anything is queued; one bad entry
    /// rejects the whole batch. An empty batch is rejected without stepping.
    pub fn submit_batch(&mut self, entries: &[(&str, &str)]) -> Result<(Vec<TaskId>, StepReport)> {
        self.ensure_running()?;
        if entries.is_empty() {
            dlog_error!("empty batch rejected");
            return Err(Error::Validation("batch has no tasks".to_string()));
        }
        let types = entries
            .iter()
            .map(|(ty, _)| parse_type(ty))
            .collect::<Result<Vec<_>>>()?;

        let mut allocator = self.allocator;
        let tasks = types
            .into_iter()
            .zip(entries)
            .map(|(ty, (_, input))| allocator.allocate(ty, input))
            .collect::<Result<Vec<_>>>()?;
        self.allocator = allocator;

        let ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
        for task in tasks {
            dlog!("Task ID {} ({}) submitted and queued", task.id, task.task_type);
            self.queue.enqueue(task);
        }

        let step = self.advance();
        Ok((ids, step))
    }

    /// Run one scheduler step without submitting work.
    pub fn advance(&mut self) -> StepReport {
        if self.shut_down {
            dlog_warn!("advance called after shutdown");
        }
        let report = self.scheduler.step(&mut self.queue, &mut self.pool);
        self.publish(&report);
        report
    }

    pub fn status(&self) -> Snapshot {
        Snapshot::capture(&self.queue, &self.pool)
    }

    /// Discard all queued and in-flight work and release the nodes.
    ///
    /// Always succeeds; calling it again is harmless.
    pub fn shutdown(&mut self) -> bool {
        self.shutdown_with_report();
        true
    }

    /// Like [`Kernel::shutdown`], returning what was discarded.
    pub fn shutdown_with_report(&mut self) -> ShutdownReport {
        let report = lifecycle::shutdown(&mut self.queue, &mut self.pool);
        self.shut_down = true;
        self.subscribers.clear();
        report
    }

    fn ensure_running(&self) -> Result<()> {
        if self.shut_down {
            dlog_warn!("submission rejected: kernel is shut down");
            return Err(Error::KernelShutDown);
        }
        Ok(())
    }

    fn publish(&mut self, report: &StepReport) {
        if self.subscribers.is_empty() {
            return;
        }
        self.subscribers.retain(|tx| {
            report.events.iter().all(|event| {
                !matches!(tx.try_send(event.clone()), Err(TrySendError::Disconnected(_)))
            })
        });
    }
}

fn parse_type(task_type: &str) -> Result<TaskType> {
    task_type.parse::<TaskType>().inspect_err(|e| {
        dlog_error!("{}", e);
    })
}
