//! Scheduling layer: the node pool and the step function that moves tasks
//! from the queue through it.

mod pool;
mod scheduler;

pub use pool::NodePool;
pub use scheduler::{Scheduler, SchedulerEvent, StepReport};
