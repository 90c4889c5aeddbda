use super::{Policy, runnable_current};
use crate::core::{Pid, SimCtx};

/// One-tick quantum, rotation order.
pub struct RoundRobinScheduler;

impl Policy for RoundRobinScheduler {
    fn name(&self) -> &'static str {
        "rr"
    }

    fn schedule(&mut self, ctx: &mut SimCtx) -> Option<Pid> {
        if let Some(pid) = runnable_current(ctx) {
            ctx.preempt(pid, false);
        }
        ctx.ready_pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::tests::{ctx_with, run_tick};

    #[test]
    fn rotates_one_tick_each() {
        let (mut ctx, pids) = ctx_with(&[(2, 0), (1, 0), (2, 0)]);
        let mut rr = RoundRobinScheduler;

        let mut order = Vec::new();
        while let Some(pid) = rr.schedule(&mut ctx) {
            order.push(pid);
            run_tick(&mut ctx, Some(pid));
            if ctx.process(pid).is_complete() {
                ctx.exit_current();
            }
        }

        assert_eq!(order, vec![pids[0], pids[1], pids[2], pids[0], pids[2]]);
    }

    #[test]
    fn lone_process_is_requeued_and_picked_again() {
        let (mut ctx, pids) = ctx_with(&[(3, 0)]);
        let mut rr = RoundRobinScheduler;

        let pick = rr.schedule(&mut ctx);
        run_tick(&mut ctx, pick);
        assert_eq!(rr.schedule(&mut ctx), Some(pids[0]));
        assert!(ctx.ready().is_empty());
    }
}
