use thiserror::Error;

use crate::core::NodeId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown task type: {0} (supported: JOB_A, JOB_B, JOB_C, JOB_D)")]
    InvalidTaskType(String),

    #[error("Failed to allocate task: {0}")]
    AllocationFailure(String),

    #[error("Kernel has been shut down")]
    KernelShutDown,

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is busy")]
    NodeBusy(NodeId),
}

pub type Result<T> = std::result::Result<T, Error>;
