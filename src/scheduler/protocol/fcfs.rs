use super::{Protocol, grant_or_block, requester};
use crate::core::{Pid, ResourceId, SimCtx};
use crate::scheduler::Acquire;

/// Serve waiters in request order, ignoring priority.
pub struct FcfsProtocol;

impl Protocol for FcfsProtocol {
    fn name(&self) -> &'static str {
        "fcfs"
    }

    fn acquire(&mut self, ctx: &mut SimCtx, resource: ResourceId) -> Acquire {
        let pid = requester(ctx);
        grant_or_block(ctx, resource, pid)
    }

    fn release(&mut self, ctx: &mut SimCtx, resource: ResourceId) -> Option<Pid> {
        let pid = requester(ctx);
        ctx.disown(resource, pid);

        let waiter = ctx.waitqueue(resource).front()?;
        ctx.wake(resource, waiter);
        Some(waiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProcessStatus;
    use crate::scheduler::protocol::tests::{ctx_with_priorities, switch_to};

    #[test]
    fn second_requester_waits_then_is_woken_first_come() {
        let (mut ctx, pids) = ctx_with_priorities(&[1, 2, 9]);
        let mut fcfs = FcfsProtocol;

        assert_eq!(fcfs.acquire(&mut ctx, 0), Acquire::Granted);
        assert_eq!(ctx.resource(0).owner, Some(pids[0]));

        switch_to(&mut ctx, pids[1]);
        assert_eq!(fcfs.acquire(&mut ctx, 0), Acquire::Denied);
        assert_eq!(ctx.process(pids[1]).status, ProcessStatus::Wait);
        assert_eq!(ctx.current(), None);

        let next = ctx.ready_pop_front();
        ctx.set_current(next);
        assert_eq!(ctx.current(), Some(pids[2]));
        assert_eq!(fcfs.acquire(&mut ctx, 0), Acquire::Denied);

        switch_to(&mut ctx, pids[0]);
        assert_eq!(fcfs.release(&mut ctx, 0), Some(pids[1]));
        assert_eq!(ctx.resource(0).owner, None);
        assert_eq!(ctx.process(pids[1]).status, ProcessStatus::Ready);
        assert_eq!(ctx.ready().iter().last(), Some(pids[1]));
        assert_eq!(ctx.waitqueue(0).front(), Some(pids[2]));
        assert_eq!(ctx.process(pids[0]).priority, 1);
    }

    #[test]
    #[should_panic(expected = "does not own")]
    fn release_by_non_owner_is_fatal() {
        let (mut ctx, _) = ctx_with_priorities(&[1]);
        FcfsProtocol.release(&mut ctx, 1);
    }
}
