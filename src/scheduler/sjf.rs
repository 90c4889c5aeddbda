use super::{Extremum, Policy, TieBreak, pick_by_key, runnable_current};
use crate::core::{Pid, SimCtx};

/// Non-preemptive shortest job first, keyed on total lifespan.
pub struct SjfScheduler {
    tie_break: TieBreak,
}

impl Default for SjfScheduler {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::LastSeen,
        }
    }
}

impl SjfScheduler {
    pub fn with_tie_break(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }
}

impl Policy for SjfScheduler {
    fn name(&self) -> &'static str {
        "sjf"
    }

    fn schedule(&mut self, ctx: &mut SimCtx) -> Option<Pid> {
        if let Some(pid) = runnable_current(ctx) {
            return Some(pid);
        }

        let next = pick_by_key(ctx.ready().iter(), Extremum::Min, self.tie_break, |pid| {
            ctx.process(pid).lifespan
        })?;
        ctx.ready_remove(next);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::tests::{ctx_with, run_tick};

    #[test]
    fn picks_shortest_and_keeps_it() {
        let (mut ctx, pids) = ctx_with(&[(5, 0), (3, 0), (8, 0)]);
        let mut sjf = SjfScheduler::default();

        let pick = sjf.schedule(&mut ctx);
        assert_eq!(pick, Some(pids[1]));
        run_tick(&mut ctx, pick);

        // A shorter arrival does not preempt
        let late = ctx.create_process(1, 0);
        ctx.ready_push_back(late);
        assert_eq!(sjf.schedule(&mut ctx), Some(pids[1]));
        assert!(!ctx.ready().contains(pids[1]));
    }

    #[test]
    fn equal_lifespans_favor_last_seen_by_default() {
        let (mut ctx, pids) = ctx_with(&[(4, 0), (2, 0), (2, 0), (6, 0)]);
        assert_eq!(SjfScheduler::default().schedule(&mut ctx), Some(pids[2]));

        let (mut ctx, pids) = ctx_with(&[(4, 0), (2, 0), (2, 0), (6, 0)]);
        assert_eq!(
            SjfScheduler::with_tie_break(TieBreak::FirstSeen).schedule(&mut ctx),
            Some(pids[1])
        );
    }
}
