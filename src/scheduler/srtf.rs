use super::{Extremum, Policy, TieBreak, pick_by_key, runnable_current};
use crate::core::{Pid, SimCtx};

/// Preemptive shortest remaining time first. The preempted process is
/// requeued at the head, so it wins ties under first-seen.
#[derive(Default)]
pub struct SrtfScheduler {
    tie_break: TieBreak,
}

impl SrtfScheduler {
    pub fn with_tie_break(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }
}

impl Policy for SrtfScheduler {
    fn name(&self) -> &'static str {
        "srtf"
    }

    fn schedule(&mut self, ctx: &mut SimCtx) -> Option<Pid> {
        if let Some(pid) = runnable_current(ctx) {
            ctx.preempt(pid, true);
        }

        let next = pick_by_key(ctx.ready().iter(), Extremum::Min, self.tie_break, |pid| {
            ctx.process(pid).remaining()
        })?;
        ctx.ready_remove(next);
        Some(next)
    }
}
