use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_PRIORITY, MAX_PRIORITY, Pid, Priority, ResourceId, SchedError, Ticks};

pub type JobId = u64;

/// Hold `resource` while `at <= age < at + duration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub resource: ResourceId,
    pub at: Ticks,
    pub duration: Ticks,
}

impl ResourceRequest {
    pub fn until(&self) -> Ticks {
        self.at + self.duration
    }

    fn overlaps(&self, other: &ResourceRequest) -> bool {
        self.resource == other.resource && self.at < other.until() && other.at < self.until()
    }
}

fn default_priority() -> Priority {
    DEFAULT_PRIORITY
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(rename = "arrival", default)]
    pub arrival_time: Ticks,
    pub lifespan: Ticks,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub requests: Vec<ResourceRequest>,
}

impl Job {
    pub fn new(id: JobId, arrival_time: Ticks, lifespan: Ticks) -> Self {
        Self {
            id,
            arrival_time,
            lifespan,
            priority: DEFAULT_PRIORITY,
            requests: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_request(mut self, resource: ResourceId, at: Ticks, duration: Ticks) -> Self {
        self.requests.push(ResourceRequest {
            resource,
            at,
            duration,
        });
        self
    }

    pub fn validate(&self, nr_resources: usize) -> Result<(), SchedError> {
        let invalid = |reason: String| SchedError::InvalidJob {
            job: self.id,
            reason,
        };

        if self.lifespan == 0 {
            return Err(invalid("lifespan must be at least one tick".into()));
        }
        if self.priority > MAX_PRIORITY {
            return Err(invalid(format!(
                "priority {} exceeds maximum ({MAX_PRIORITY})",
                self.priority
            )));
        }

        for (i, request) in self.requests.iter().enumerate() {
            if request.resource >= nr_resources {
                return Err(invalid(format!(
                    "resource {} out of range (0..{nr_resources})",
                    request.resource
                )));
            }
            if request.duration == 0 {
                return Err(invalid(format!(
                    "request for resource {} holds it for zero ticks",
                    request.resource
                )));
            }
            if request.until() > self.lifespan {
                return Err(invalid(format!(
                    "request for resource {} ends at age {} past lifespan {}",
                    request.resource,
                    request.until(),
                    self.lifespan
                )));
            }
            if let Some(other) = self.requests[..i].iter().find(|o| o.overlaps(request)) {
                return Err(invalid(format!(
                    "overlapping requests for resource {} at ages {} and {}",
                    request.resource, other.at, request.at
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct JobInstance {
    pub job: Job,
    pub pid: Option<Pid>,
    pub start_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
}

impl JobInstance {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            pid: None,
            start_time: None,
            completion_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_job() {
        let job = Job::new(1, 0, 6)
            .with_priority(10)
            .with_request(0, 0, 2)
            .with_request(0, 2, 4)
            .with_request(3, 1, 1);
        assert!(job.validate(4).is_ok());
    }

    #[test]
    fn rejects_malformed_jobs() {
        let cases = [
            Job::new(1, 0, 0),
            Job::new(2, 0, 3).with_priority(MAX_PRIORITY + 1),
            Job::new(3, 0, 3).with_request(4, 0, 1),
            Job::new(4, 0, 3).with_request(0, 1, 0),
            Job::new(5, 0, 3).with_request(0, 2, 2),
            Job::new(6, 0, 5).with_request(0, 0, 3).with_request(0, 2, 1),
        ];
        for job in cases {
            let err = job.validate(4).unwrap_err();
            assert!(
                matches!(err, SchedError::InvalidJob { job: id, .. } if id == job.id),
                "{err}"
            );
        }
    }

    #[test]
    fn json_defaults() {
        let job: Job = serde_json::from_str(r#"{ "id": 7, "lifespan": 4 }"#).unwrap();
        assert_eq!(job, Job::new(7, 0, 4));

        let job: Job = serde_json::from_str(
            r#"{ "id": 8, "arrival": 3, "lifespan": 4, "priority": 2,
                 "requests": [{ "resource": 1, "at": 1, "duration": 2 }] }"#,
        )
        .unwrap();
        assert_eq!(job, Job::new(8, 3, 4).with_priority(2).with_request(1, 1, 2));
    }
}
