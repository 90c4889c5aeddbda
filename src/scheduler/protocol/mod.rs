mod fcfs;
mod pcp;
mod pip;
mod prio;

pub use fcfs::FcfsProtocol;
pub use pcp::PcpProtocol;
pub use pip::PipProtocol;
pub use prio::PrioProtocol;

use super::Acquire;
use crate::core::{Pid, ResourceId, SimCtx};

pub trait Protocol {
    fn name(&self) -> &'static str;

    /// Called for the current process wanting `resource`.
    fn acquire(&mut self, ctx: &mut SimCtx, resource: ResourceId) -> Acquire;

    /// Called for the current process giving up `resource`, which it must
    /// own. Returns the waiter moved to the ready set, if any.
    fn release(&mut self, ctx: &mut SimCtx, resource: ResourceId) -> Option<Pid>;
}

pub(crate) fn requester(ctx: &SimCtx) -> Pid {
    ctx.current().expect("Resource operation without a current process")
}

// Take a free resource, or park the requester on its waitqueue
pub(crate) fn grant_or_block(ctx: &mut SimCtx, resource: ResourceId, pid: Pid) -> Acquire {
    if ctx.resource(resource).owner.is_none() {
        ctx.resource_mut(resource).owner = Some(pid);
        return Acquire::Granted;
    }
    ctx.block_on(resource, pid);
    Acquire::Denied
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::core::{Pid, SimCtx};

    // `pids[0]` is current; the rest are ready
    pub(crate) fn ctx_with_priorities(priorities: &[u32]) -> (SimCtx, Vec<Pid>) {
        let mut ctx = SimCtx::new(2);
        let pids: Vec<Pid> = priorities
            .iter()
            .map(|&p| ctx.create_process(10, p))
            .collect();
        for &pid in &pids[1..] {
            ctx.ready_push_back(pid);
        }
        ctx.set_current(Some(pids[0]));
        (ctx, pids)
    }

    // Make `pid` current, taking it out of the ready set
    pub(crate) fn switch_to(ctx: &mut SimCtx, pid: Pid) {
        if let Some(current) = ctx.current() {
            ctx.preempt(current, false);
        }
        assert!(ctx.ready_remove(pid));
        ctx.set_current(Some(pid));
    }
}
