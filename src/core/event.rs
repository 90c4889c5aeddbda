use crate::core::{Pid, ResourceId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    Arrived {
        pid: Pid,
    },
    // Current slot changed to `pid`
    Dispatched {
        pid: Pid,
        prev: Option<Pid>,
    },
    Acquired {
        pid: Pid,
        resource: ResourceId,
    },
    Blocked {
        pid: Pid,
        resource: ResourceId,
        owner: Pid,
    },
    Released {
        pid: Pid,
        resource: ResourceId,
        woken: Option<Pid>,
    },
    Exited {
        pid: Pid,
    },
    // Nothing runnable this tick
    Idle,
}
