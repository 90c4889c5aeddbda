pub mod aging;
pub mod fifo;
pub mod prio;
pub mod protocol;
pub mod rr;
pub mod sjf;
pub mod srtf;

use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::core::{Pid, ProcessStatus, ResourceId, SchedError, SimCtx};
pub use aging::AgingScheduler;
pub use fifo::FifoScheduler;
pub use prio::PrioScheduler;
pub use protocol::{FcfsProtocol, PcpProtocol, PipProtocol, PrioProtocol, Protocol};
pub use rr::RoundRobinScheduler;
pub use sjf::SjfScheduler;
pub use srtf::SrtfScheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    Granted,
    // The caller is now waiting; reschedule
    Denied,
}

/// Which candidate wins when the extremum key recurs in a head-to-tail scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    #[default]
    FirstSeen,
    LastSeen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extremum {
    Min,
    Max,
}

pub(crate) fn pick_by_key<K: Ord>(
    pids: impl Iterator<Item = Pid>,
    want: Extremum,
    tie_break: TieBreak,
    key: impl Fn(Pid) -> K,
) -> Option<Pid> {
    let mut best: Option<(Pid, K)> = None;
    for pid in pids {
        let k = key(pid);
        let replace = match &best {
            None => true,
            Some((_, b)) => {
                let ord = match want {
                    Extremum::Min => b.cmp(&k),
                    Extremum::Max => k.cmp(b),
                };
                match ord {
                    std::cmp::Ordering::Greater => true,
                    std::cmp::Ordering::Equal => tie_break == TieBreak::LastSeen,
                    std::cmp::Ordering::Less => false,
                }
            }
        };
        if replace {
            best = Some((pid, k));
        }
    }
    best.map(|(pid, _)| pid)
}

/// The current process if it can keep competing for the CPU: bound,
/// not blocked on a resource, and with service time left.
pub(crate) fn runnable_current(ctx: &SimCtx) -> Option<Pid> {
    let pid = ctx.current()?;
    let process = ctx.process(pid);
    if process.status == ProcessStatus::Wait || process.is_complete() {
        return None;
    }
    Some(pid)
}

pub trait Policy {
    fn name(&self) -> &'static str;

    fn initialize(&mut self, _ctx: &mut SimCtx) -> Result<(), SchedError> {
        Ok(())
    }

    fn finalize(&mut self, _ctx: &mut SimCtx) {}

    /// Pick the process to run this tick, detached from the ready set.
    fn schedule(&mut self, ctx: &mut SimCtx) -> Option<Pid>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerKind {
    Fifo,
    Sjf,
    Srtf,
    RoundRobin,
    Priority,
    PriorityAging,
    PriorityCeiling,
    PriorityInheritance,
}

impl SchedulerKind {
    pub const ALL: [SchedulerKind; 8] = [
        Self::Fifo,
        Self::Sjf,
        Self::Srtf,
        Self::RoundRobin,
        Self::Priority,
        Self::PriorityAging,
        Self::PriorityCeiling,
        Self::PriorityInheritance,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fifo => "fifo",
            Self::Sjf => "sjf",
            Self::Srtf => "srtf",
            Self::RoundRobin => "rr",
            Self::Priority => "prio",
            Self::PriorityAging => "pa",
            Self::PriorityCeiling => "pcp",
            Self::PriorityInheritance => "pip",
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::Sjf => "Shortest-Job First",
            Self::Srtf => "Shortest Remaining Time First",
            Self::RoundRobin => "Round-Robin",
            Self::Priority => "Priority",
            Self::PriorityAging => "Priority + aging",
            Self::PriorityCeiling => "Priority + PCP Protocol",
            Self::PriorityInheritance => "Priority + PIP Protocol",
        }
    }
}

impl FromStr for SchedulerKind {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fifo" | "fcfs" => Ok(Self::Fifo),
            "sjf" => Ok(Self::Sjf),
            "srtf" => Ok(Self::Srtf),
            "rr" | "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            "prio" | "priority" => Ok(Self::Priority),
            "pa" | "aging" => Ok(Self::PriorityAging),
            "pcp" => Ok(Self::PriorityCeiling),
            "pip" => Ok(Self::PriorityInheritance),
            _ => Err(SchedError::UnknownScheduler {
                name: s.to_string(),
                valid: Self::ALL.map(|k| k.as_str()).join(", "),
            }),
        }
    }
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduling policy paired with one arbitration protocol.
pub struct Scheduler {
    name: String,
    policy: Box<dyn Policy>,
    protocol: Box<dyn Protocol>,
}

impl Scheduler {
    pub fn new(kind: SchedulerKind) -> Self {
        let (policy, protocol): (Box<dyn Policy>, Box<dyn Protocol>) = match kind {
            SchedulerKind::Fifo => (Box::new(FifoScheduler), Box::new(FcfsProtocol)),
            SchedulerKind::Sjf => (Box::new(SjfScheduler::default()), Box::new(FcfsProtocol)),
            SchedulerKind::Srtf => (Box::new(SrtfScheduler::default()), Box::new(FcfsProtocol)),
            SchedulerKind::RoundRobin => (Box::new(RoundRobinScheduler), Box::new(FcfsProtocol)),
            SchedulerKind::Priority => (Box::new(PrioScheduler::default()), Box::new(PrioProtocol)),
            SchedulerKind::PriorityAging => {
                (Box::new(AgingScheduler::default()), Box::new(PrioProtocol))
            }
            SchedulerKind::PriorityCeiling => {
                (Box::new(PrioScheduler::default()), Box::new(PcpProtocol))
            }
            SchedulerKind::PriorityInheritance => {
                (Box::new(PrioScheduler::default()), Box::new(PipProtocol))
            }
        };
        Self::compose(kind.description(), policy, protocol)
    }

    pub fn compose(
        name: impl Into<String>,
        policy: Box<dyn Policy>,
        protocol: Box<dyn Protocol>,
    ) -> Self {
        Self {
            name: name.into(),
            policy,
            protocol,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initialize(&mut self, ctx: &mut SimCtx) -> Result<(), SchedError> {
        info!(
            scheduler = %self.name,
            policy = self.policy.name(),
            protocol = self.protocol.name(),
            "initialize"
        );
        self.policy.initialize(ctx)
    }

    pub fn finalize(&mut self, ctx: &mut SimCtx) {
        self.policy.finalize(ctx);
        info!(scheduler = %self.name, tick = ctx.now, "finalize");
    }

    pub fn schedule(&mut self, ctx: &mut SimCtx) -> Option<Pid> {
        self.policy.schedule(ctx)
    }

    pub fn acquire(&mut self, ctx: &mut SimCtx, resource: ResourceId) -> Acquire {
        self.protocol.acquire(ctx, resource)
    }

    pub fn release(&mut self, ctx: &mut SimCtx, resource: ResourceId) -> Option<Pid> {
        self.protocol.release(ctx, resource)
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("name", &self.name)
            .field("policy", &self.policy.name())
            .field("protocol", &self.protocol.name())
            .finish()
    }
}
