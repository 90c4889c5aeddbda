use super::{Extremum, Policy, TieBreak, pick_by_key, runnable_current};
use crate::core::{Pid, SimCtx};

/// Preemptive highest-`priority`-first. Selection reads the working
/// priority, so boosts applied by the arbitration protocol take effect
/// on the next tick.
#[derive(Default)]
pub struct PrioScheduler {
    tie_break: TieBreak,
}

impl PrioScheduler {
    pub fn with_tie_break(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }
}

pub(crate) fn pick_highest(ctx: &SimCtx, tie_break: TieBreak) -> Option<Pid> {
    pick_by_key(ctx.ready().iter(), Extremum::Max, tie_break, |pid| {
        ctx.process(pid).priority
    })
}

impl Policy for PrioScheduler {
    fn name(&self) -> &'static str {
        "prio"
    }

    fn schedule(&mut self, ctx: &mut SimCtx) -> Option<Pid> {
        if let Some(pid) = runnable_current(ctx) {
            ctx.preempt(pid, false);
        }

        let next = pick_highest(ctx, self.tie_break)?;
        ctx.ready_remove(next);
        Some(next)
    }
}
