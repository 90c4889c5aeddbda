use std::fmt;

use average::{Estimate, Mean};

use super::job::{JobId, JobInstance};
use crate::core::{Pid, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub id: JobId,
    pub pid: Option<Pid>,
    pub arrival: Ticks,
    pub lifespan: Ticks,
    pub start: Option<Ticks>,
    pub completion: Option<Ticks>,
}

impl JobReport {
    pub fn turnaround(&self) -> Option<Ticks> {
        Some(self.completion? - self.arrival)
    }

    // Time to first run
    pub fn response(&self) -> Option<Ticks> {
        Some(self.start? - self.arrival)
    }

    pub fn waiting(&self) -> Option<Ticks> {
        Some(self.turnaround()? - self.lifespan)
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub scheduler: String,
    // Pid run at each tick, None when idle
    pub timeline: Vec<Option<Pid>>,
    pub jobs: Vec<JobReport>,
}

impl Report {
    pub fn new(scheduler: &str, jobs: &[JobInstance], timeline: &[Option<Pid>]) -> Self {
        Self {
            scheduler: scheduler.to_string(),
            timeline: timeline.to_vec(),
            jobs: jobs
                .iter()
                .map(|j| JobReport {
                    id: j.job.id,
                    pid: j.pid,
                    arrival: j.job.arrival_time,
                    lifespan: j.job.lifespan,
                    start: j.start_time,
                    completion: j.completion_time,
                })
                .collect(),
        }
    }

    pub fn ticks(&self) -> Ticks {
        self.timeline.len() as Ticks
    }

    pub fn idle_ticks(&self) -> Ticks {
        self.timeline.iter().filter(|t| t.is_none()).count() as Ticks
    }

    /// Pids in the order they took the CPU, one entry per uninterrupted run.
    pub fn dispatch_order(&self) -> Vec<Pid> {
        let mut order: Vec<Pid> = Vec::new();
        let mut last = None;
        for &slot in &self.timeline {
            if let Some(pid) = slot {
                if last != Some(pid) {
                    order.push(pid);
                }
            }
            last = slot;
        }
        order
    }

    pub fn completion_order(&self) -> Vec<JobId> {
        let mut done: Vec<&JobReport> = self
            .jobs
            .iter()
            .filter(|j| j.completion.is_some())
            .collect();
        done.sort_by_key(|j| j.completion);
        done.into_iter().map(|j| j.id).collect()
    }

    pub fn job(&self, id: JobId) -> Option<&JobReport> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn avg_turnaround(&self) -> f64 {
        avg(self.jobs.iter().filter_map(|j| j.turnaround()))
    }

    pub fn avg_response(&self) -> f64 {
        avg(self.jobs.iter().filter_map(|j| j.response()))
    }

    pub fn avg_waiting(&self) -> f64 {
        avg(self.jobs.iter().filter_map(|j| j.waiting()))
    }
}

fn avg(iter: impl Iterator<Item = Ticks>) -> f64 {
    iter.map(|t| t as f64).collect::<Mean>().estimate()
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scheduler: {}", self.scheduler)?;
        writeln!(f, "Ticks: {} ({} idle)", self.ticks(), self.idle_ticks())?;
        writeln!(
            f,
            "{:>6} {:>5} {:>8} {:>8} {:>6} {:>10}",
            "job", "pid", "arrival", "lifespan", "start", "completion"
        )?;
        for job in &self.jobs {
            let opt = |v: Option<Ticks>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
            writeln!(
                f,
                "{:>6} {:>5} {:>8} {:>8} {:>6} {:>10}",
                job.id,
                job.pid.map_or_else(|| "-".to_string(), |p| p.to_string()),
                job.arrival,
                job.lifespan,
                opt(job.start),
                opt(job.completion)
            )?;
        }
        writeln!(f, "Average turnaround time: {:.2} ticks", self.avg_turnaround())?;
        writeln!(f, "Average response time: {:.2} ticks", self.avg_response())?;
        write!(f, "Average waiting time: {:.2} ticks", self.avg_waiting())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::job::Job;

    fn instance(
        id: JobId,
        arrival: Ticks,
        lifespan: Ticks,
        start: Ticks,
        done: Ticks,
    ) -> JobInstance {
        JobInstance {
            job: Job::new(id, arrival, lifespan),
            pid: Some(id as Pid),
            start_time: Some(start),
            completion_time: Some(done),
        }
    }

    #[test]
    fn averages_and_orders() {
        let jobs = [instance(0, 0, 2, 0, 4), instance(1, 1, 2, 2, 3)];
        let timeline = [Some(0), Some(0), Some(1), Some(0), None];
        let report = Report::new("test", &jobs, &timeline);

        assert_eq!(report.dispatch_order(), vec![0, 1, 0]);
        assert_eq!(report.completion_order(), vec![1, 0]);
        assert_eq!(report.idle_ticks(), 1);
        // turnaround 4 and 2, response 0 and 1, waiting 2 and 0
        assert_eq!(report.avg_turnaround(), 3.0);
        assert_eq!(report.avg_response(), 0.5);
        assert_eq!(report.avg_waiting(), 1.0);
        assert!(report.to_string().contains("Average turnaround time: 3.00 ticks"));
    }
}
