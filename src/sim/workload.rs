use std::fs;
use std::path::Path;

use rand::prelude::*;

use super::job::{Job, ResourceRequest};
use crate::core::{MAX_PRIORITY, NR_RESOURCES, Priority, SchedError, Ticks};

pub fn load(path: &Path) -> Result<Vec<Job>, SchedError> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<Vec<Job>, SchedError> {
    Ok(serde_json::from_str(text)?)
}

/// Seeded random job mix.
#[derive(Debug, Clone)]
pub struct RandomWorkload {
    pub jobs: usize,
    // Arrivals are drawn from 0..=arrival_window
    pub arrival_window: Ticks,
    pub max_lifespan: Ticks,
    pub max_priority: Priority,
    // Chance of each request slot being used
    pub p_request: f64,
    pub max_requests: usize,
    pub nr_resources: usize,
}

impl Default for RandomWorkload {
    fn default() -> Self {
        Self {
            jobs: 8,
            arrival_window: 10,
            max_lifespan: 10,
            max_priority: MAX_PRIORITY,
            p_request: 0.3,
            max_requests: 1,
            nr_resources: 4.min(NR_RESOURCES),
        }
    }
}

impl RandomWorkload {
    pub fn generate(&self, seed: u64) -> Vec<Job> {
        let mut rng = StdRng::seed_from_u64(seed);
        let max_lifespan = self.max_lifespan.max(1);
        let max_priority = self.max_priority.min(MAX_PRIORITY);

        let mut jobs: Vec<Job> = (0..self.jobs)
            .map(|id| {
                let lifespan = rng.random_range(1..=max_lifespan);
                let mut job = Job::new(
                    id as u64,
                    rng.random_range(0..=self.arrival_window),
                    lifespan,
                )
                .with_priority(rng.random_range(0..=max_priority));

                for _ in 0..self.max_requests {
                    if self.nr_resources == 0 || !rng.random_bool(self.p_request.clamp(0.0, 1.0)) {
                        continue;
                    }
                    let resource = rng.random_range(0..self.nr_resources);
                    if job.requests.iter().any(|r| r.resource == resource) {
                        continue;
                    }
                    let at = rng.random_range(0..lifespan);
                    let duration = rng.random_range(1..=lifespan - at);
                    job.requests.push(ResourceRequest {
                        resource,
                        at,
                        duration,
                    });
                }
                job
            })
            .collect();

        jobs.sort_by_key(|job| job.arrival_time);
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_jobs() {
        let mix = RandomWorkload::default();
        assert_eq!(mix.generate(42), mix.generate(42));
    }

    #[test]
    fn generated_jobs_are_valid() {
        let mix = RandomWorkload {
            jobs: 64,
            p_request: 0.8,
            max_requests: 3,
            ..RandomWorkload::default()
        };
        for seed in 0..16 {
            for job in mix.generate(seed) {
                job.validate(mix.nr_resources).unwrap();
            }
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(parse("[{ \"id\": 1 }]"), Err(SchedError::Workload(_))));
        assert_eq!(parse("[]").unwrap(), Vec::new());
    }
}
