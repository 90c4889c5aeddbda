use super::prio::pick_highest;
use super::{Policy, TieBreak, runnable_current};
use crate::core::{MAX_PRIORITY, Pid, SimCtx};

/// Priority scheduling where every tick spent in the ready set is worth
/// one priority level, up to `MAX_PRIORITY`. The dispatched process drops
/// back to its base priority.
#[derive(Default)]
pub struct AgingScheduler {
    tie_break: TieBreak,
}

impl AgingScheduler {
    pub fn with_tie_break(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }
}

impl Policy for AgingScheduler {
    fn name(&self) -> &'static str {
        "pa"
    }

    fn schedule(&mut self, ctx: &mut SimCtx) -> Option<Pid> {
        if let Some(pid) = runnable_current(ctx) {
            ctx.preempt(pid, false);
        }

        let ready: Vec<Pid> = ctx.ready().iter().collect();
        for pid in ready {
            let process = ctx.process_mut(pid);
            process.priority = (process.priority + 1).min(MAX_PRIORITY);
        }

        let next = pick_highest(ctx, self.tie_break)?;
        ctx.ready_remove(next);
        ctx.restore_priority(next);
        Some(next)
    }
}
