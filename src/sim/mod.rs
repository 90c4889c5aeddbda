pub mod driver;
pub mod job;
pub mod report;
pub mod workload;

pub use driver::Sim;
pub use job::{Job, JobId, JobInstance, ResourceRequest};
pub use report::{JobReport, Report};
pub use workload::RandomWorkload;
