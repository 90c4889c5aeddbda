pub mod core;
pub mod scheduler;
pub mod sim;

pub use crate::core::{SchedError, SimCtx, SimEvent};
pub use scheduler::{Scheduler, SchedulerKind};
pub use sim::{Job, Report, Sim};
