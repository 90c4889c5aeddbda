use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::job::{Job, JobInstance};
use super::report::Report;
use crate::core::{
    NR_RESOURCES, Observer, Pid, ProcessStatus, ResourceId, SchedError, SimCtx, SimEvent, Ticks,
};
use crate::scheduler::{Acquire, Scheduler};

pub struct Sim {
    pub ctx: SimCtx,
    pub scheduler: Scheduler,
    pub jobs: Vec<JobInstance>,
    job_cursor: usize,
    // Pid --> jobs[index]; used to look up resource requests and record timings
    pids_to_jobs: FxHashMap<Pid, usize>,
    observer: Observer,
    timeline: Vec<Option<Pid>>,
    finalized: bool,
}

impl Sim {
    pub fn new(scheduler: Scheduler, jobs: Vec<Job>) -> Result<Self, SchedError> {
        Self::with_resources(scheduler, jobs, NR_RESOURCES)
    }

    pub fn with_resources(
        mut scheduler: Scheduler,
        mut jobs: Vec<Job>,
        nr_resources: usize,
    ) -> Result<Self, SchedError> {
        for job in &jobs {
            job.validate(nr_resources)?;
        }
        // Stable: jobs arriving together keep their listed order
        jobs.sort_by_key(|job| job.arrival_time);

        let mut ctx = SimCtx::new(nr_resources);
        scheduler.initialize(&mut ctx)?;

        Ok(Self {
            ctx,
            scheduler,
            jobs: jobs.into_iter().map(JobInstance::new).collect(),
            job_cursor: 0,
            pids_to_jobs: FxHashMap::default(),
            observer: Observer::new(),
            timeline: Vec::new(),
            finalized: false,
        })
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn timeline(&self) -> &[Option<Pid>] {
        &self.timeline
    }

    pub fn job_of(&self, pid: Pid) -> &Job {
        &self.jobs[self.pids_to_jobs[&pid]].job
    }

    fn instance_mut(&mut self, pid: Pid) -> &mut JobInstance {
        let index = self.pids_to_jobs[&pid];
        &mut self.jobs[index]
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.jobs.iter().all(|job| job.completion_time.is_some())
    }

    pub fn step(&mut self) -> Result<Vec<SimEvent>, SchedError> {
        let mut events = Vec::new();

        self.handle_arrivals(&mut events);
        self.dispatch(&mut events);

        let ran = self.ctx.current();
        match ran {
            Some(pid) => self.run_current(pid, &mut events),
            None => {
                self.check_deadlock()?;
                events.push(SimEvent::Idle);
            }
        }

        self.timeline.push(ran);
        self.observer.observe(&self.ctx);
        trace!(tick = self.ctx.now, ?ran, events = events.len(), "tick");
        self.ctx.advance_time(1);

        Ok(events)
    }

    pub fn run(&mut self) -> Result<Report, SchedError> {
        self.run_with(|_, _| {})
    }

    /// Step until every job has exited, handing each tick's events to
    /// `on_tick`.
    pub fn run_with(
        &mut self,
        mut on_tick: impl FnMut(Ticks, &[SimEvent]),
    ) -> Result<Report, SchedError> {
        while !self.all_jobs_completed() {
            let now = self.now();
            let events = match self.step() {
                Ok(events) => events,
                Err(err) => {
                    self.finish();
                    return Err(err);
                }
            };
            on_tick(now, &events);
        }
        Ok(self.finish())
    }

    pub fn finish(&mut self) -> Report {
        if !self.finalized {
            self.scheduler.finalize(&mut self.ctx);
            self.finalized = true;
        }
        Report::new(self.scheduler.name(), &self.jobs, &self.timeline)
    }

    fn handle_arrivals(&mut self, events: &mut Vec<SimEvent>) {
        let now = self.ctx.now;
        // Contiguous, since jobs are sorted by arrival
        while let Some(instance) = self.jobs.get_mut(self.job_cursor) {
            if instance.job.arrival_time > now {
                break;
            }

            let pid = self
                .ctx
                .create_process(instance.job.lifespan, instance.job.priority);
            instance.pid = Some(pid);
            self.pids_to_jobs.insert(pid, self.job_cursor);
            self.ctx.ready_push_back(pid);

            debug!(tick = now, pid, job = instance.job.id, "arrived");
            events.push(SimEvent::Arrived { pid });
            self.job_cursor += 1;
        }
    }

    // Ask the scheduler for a process until one holds everything it needs
    // at its current age
    fn dispatch(&mut self, events: &mut Vec<SimEvent>) {
        loop {
            let prev = self.ctx.current();
            let next = self.scheduler.schedule(&mut self.ctx);
            self.ctx.set_current(next);

            let Some(pid) = next else {
                return;
            };
            if prev != next {
                debug!(tick = self.ctx.now, pid, ?prev, "dispatch");
                events.push(SimEvent::Dispatched { pid, prev });
            }

            if self.acquire_due(pid, events) {
                let now = self.ctx.now;
                self.instance_mut(pid).start_time.get_or_insert(now);
                return;
            }
        }
    }

    fn acquire_due(&mut self, pid: Pid, events: &mut Vec<SimEvent>) -> bool {
        let age = self.ctx.process(pid).age;
        let due: Vec<ResourceId> = self
            .job_of(pid)
            .requests
            .iter()
            .filter(|r| r.at == age)
            .map(|r| r.resource)
            .collect();

        for resource in due {
            let owner = self.ctx.resource(resource).owner;
            if owner == Some(pid) {
                continue;
            }

            match self.scheduler.acquire(&mut self.ctx, resource) {
                Acquire::Granted => events.push(SimEvent::Acquired { pid, resource }),
                Acquire::Denied => {
                    let owner = owner.expect("Acquisition of a free resource was denied");
                    events.push(SimEvent::Blocked {
                        pid,
                        resource,
                        owner,
                    });
                    return false;
                }
            }
        }
        true
    }

    fn run_current(&mut self, pid: Pid, events: &mut Vec<SimEvent>) {
        let process = self.ctx.process_mut(pid);
        process.age += 1;
        let age = process.age;

        let due: Vec<ResourceId> = self
            .job_of(pid)
            .requests
            .iter()
            .filter(|r| r.until() == age)
            .map(|r| r.resource)
            .collect();
        for resource in due {
            let woken = self.scheduler.release(&mut self.ctx, resource);
            events.push(SimEvent::Released {
                pid,
                resource,
                woken,
            });
        }

        if self.ctx.process(pid).is_complete() {
            self.ctx.exit_current();
            let completion = self.ctx.now + 1;
            self.instance_mut(pid).completion_time = Some(completion);
            debug!(tick = self.ctx.now, pid, "exited");
            events.push(SimEvent::Exited { pid });
        }
    }

    fn check_deadlock(&self) -> Result<(), SchedError> {
        if self.job_cursor < self.jobs.len() || !self.ctx.ready().is_empty() {
            return Ok(());
        }

        let blocked: Vec<Pid> = self
            .ctx
            .processes()
            .filter(|p| p.status == ProcessStatus::Wait)
            .map(|p| p.pid)
            .collect();
        if blocked.is_empty() {
            return Ok(());
        }

        Err(SchedError::Deadlock {
            tick: self.ctx.now,
            blocked,
        })
    }
}
