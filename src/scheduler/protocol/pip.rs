use super::prio::highest_waiter;
use super::{Protocol, requester};
use crate::core::{Pid, ResourceId, SimCtx};
use crate::scheduler::Acquire;

/// Priority inheritance, one level deep: a holder runs at the highest base
/// priority among the processes it blocks.
pub struct PipProtocol;

impl Protocol for PipProtocol {
    fn name(&self) -> &'static str {
        "pip"
    }

    fn acquire(&mut self, ctx: &mut SimCtx, resource: ResourceId) -> Acquire {
        let pid = requester(ctx);

        let Some(owner) = ctx.resource(resource).owner else {
            ctx.resource_mut(resource).owner = Some(pid);

            // Waiters queued before this grant still need a donor
            let inherit = ctx
                .waitqueue(resource)
                .iter()
                .map(|p| ctx.process(p).priority_base())
                .max();
            if let Some(inherit) = inherit {
                if ctx.process(pid).priority < inherit {
                    ctx.set_priority(pid, inherit);
                }
            }
            return Acquire::Granted;
        };

        let donated = ctx.process(pid).priority_base();
        if ctx.process(owner).priority < donated {
            ctx.set_priority(owner, donated);
        }
        ctx.block_on(resource, pid);
        Acquire::Denied
    }

    fn release(&mut self, ctx: &mut SimCtx, resource: ResourceId) -> Option<Pid> {
        let pid = requester(ctx);
        ctx.disown(resource, pid);
        ctx.restore_priority(pid);

        let waiter = highest_waiter(ctx, resource, |p| ctx.process(p).priority_base())?;
        ctx.wake(resource, waiter);
        Some(waiter)
    }
}
