pub mod config;
pub mod core;
pub mod error;
pub mod kernel;
pub mod lifecycle;
pub mod log;
pub mod orchestration;
pub mod packet;
pub mod shell;
pub mod status;

pub use config::KernelConfig;
pub use error::{Error, Result};
pub use kernel::{Kernel, Submission};
pub use status::Snapshot;
