use super::prio::highest_waiter;
use super::{Protocol, grant_or_block, requester};
use crate::core::{MAX_PRIORITY, Pid, ResourceId, SimCtx};
use crate::scheduler::Acquire;

/// Priority ceiling: every holder runs at `MAX_PRIORITY` until release.
/// The woken waiter is pre-boosted so it is dispatched ahead of anyone
/// who could take the resource first.
pub struct PcpProtocol;

impl Protocol for PcpProtocol {
    fn name(&self) -> &'static str {
        "pcp"
    }

    fn acquire(&mut self, ctx: &mut SimCtx, resource: ResourceId) -> Acquire {
        let pid = requester(ctx);
        let granted = grant_or_block(ctx, resource, pid);
        if granted == Acquire::Granted {
            ctx.set_priority(pid, MAX_PRIORITY);
        }
        granted
    }

    fn release(&mut self, ctx: &mut SimCtx, resource: ResourceId) -> Option<Pid> {
        let pid = requester(ctx);
        ctx.disown(resource, pid);
        ctx.restore_priority(pid);

        let waiter = highest_waiter(ctx, resource, |p| ctx.process(p).priority)?;
        ctx.wake(resource, waiter);
        ctx.set_priority(waiter, MAX_PRIORITY);
        Some(waiter)
    }
}
