use thiserror::Error;

use super::state::{Pid, Ticks};

#[derive(Debug, Error)]
pub enum SchedError {
    #[error("unknown scheduler `{name}` (valid: {valid})")]
    UnknownScheduler { name: String, valid: String },

    #[error("invalid job {job}: {reason}")]
    InvalidJob { job: u64, reason: String },

    #[error("deadlock at tick {tick}: processes {blocked:?} are blocked and nothing can run")]
    Deadlock { tick: Ticks, blocked: Vec<Pid> },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed workload: {0}")]
    Workload(#[from] serde_json::Error),
}
