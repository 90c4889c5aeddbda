use super::{Policy, runnable_current};
use crate::core::{Pid, SimCtx};

/// Non-preemptive, arrival order.
pub struct FifoScheduler;

impl Policy for FifoScheduler {
    fn name(&self) -> &'static str {
        "fifo"
    }

    fn schedule(&mut self, ctx: &mut SimCtx) -> Option<Pid> {
        if let Some(pid) = runnable_current(ctx) {
            return Some(pid);
        }
        ctx.ready_pop_front()
    }
}
