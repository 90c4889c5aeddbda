#![allow(dead_code)]

use tick_sched::core::Pid;
use tick_sched::{Job, Report, Scheduler, SchedulerKind, Sim};

pub fn run(kind: SchedulerKind, jobs: Vec<Job>) -> Report {
    Sim::new(Scheduler::new(kind), jobs)
        .expect("valid workload")
        .run()
        .expect("simulation completes")
}

pub fn ticks_run(report: &Report, pid: Pid) -> usize {
    report.timeline.iter().filter(|&&t| t == Some(pid)).count()
}

pub fn pids(ids: &[usize]) -> Vec<Option<Pid>> {
    ids.iter().map(|&id| Some(id)).collect()
}

pub fn completion(report: &Report, job: u64) -> u64 {
    report
        .job(job)
        .and_then(|j| j.completion)
        .expect("job completed")
}
