pub mod error;
pub mod event;
pub mod observer;
pub mod state;

pub use error::SchedError;
pub use event::SimEvent;
pub use observer::Observer;
pub use state::{
    DEFAULT_PRIORITY, MAX_PRIORITY, NR_RESOURCES, Pid, Priority, Process, ProcessStatus, Queue,
    QueueId, Resource, ResourceId, SimCtx, Ticks,
};
