use super::{Protocol, grant_or_block, requester};
use crate::core::{Pid, ResourceId, SimCtx};
use crate::scheduler::{Acquire, Extremum, TieBreak, pick_by_key};

/// First-come acquisition; release wakes the waiter with the highest
/// working priority.
pub struct PrioProtocol;

pub(crate) fn highest_waiter(
    ctx: &SimCtx,
    resource: ResourceId,
    key: impl Fn(Pid) -> u32,
) -> Option<Pid> {
    pick_by_key(
        ctx.waitqueue(resource).iter(),
        Extremum::Max,
        TieBreak::FirstSeen,
        key,
    )
}

impl Protocol for PrioProtocol {
    fn name(&self) -> &'static str {
        "prio"
    }

    fn acquire(&mut self, ctx: &mut SimCtx, resource: ResourceId) -> Acquire {
        let pid = requester(ctx);
        grant_or_block(ctx, resource, pid)
    }

    fn release(&mut self, ctx: &mut SimCtx, resource: ResourceId) -> Option<Pid> {
        let pid = requester(ctx);
        ctx.disown(resource, pid);

        let waiter = highest_waiter(ctx, resource, |p| ctx.process(p).priority)?;
        ctx.wake(resource, waiter);
        Some(waiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::protocol::tests::{ctx_with_priorities, switch_to};

    #[test]
    fn wakes_highest_priority_waiter() {
        let (mut ctx, pids) = ctx_with_priorities(&[1, 3, 7, 7]);
        let mut prio = PrioProtocol;

        assert_eq!(prio.acquire(&mut ctx, 0), Acquire::Granted);
        for &pid in &pids[1..] {
            switch_to(&mut ctx, pid);
            assert_eq!(prio.acquire(&mut ctx, 0), Acquire::Denied);
        }

        switch_to(&mut ctx, pids[0]);
        assert_eq!(prio.release(&mut ctx, 0), Some(pids[2]));
        assert_eq!(
            ctx.waitqueue(0).iter().collect::<Vec<_>>(),
            vec![pids[1], pids[3]]
        );
    }

    #[test]
    fn zero_priority_waiters_still_wake() {
        let (mut ctx, pids) = ctx_with_priorities(&[0, 0]);
        let mut prio = PrioProtocol;

        prio.acquire(&mut ctx, 0);
        switch_to(&mut ctx, pids[1]);
        prio.acquire(&mut ctx, 0);

        switch_to(&mut ctx, pids[0]);
        assert_eq!(prio.release(&mut ctx, 0), Some(pids[1]));
    }
}
