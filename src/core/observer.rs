use super::state::{ProcessStatus, SimCtx};

#[derive(Debug, Default)]
pub struct Observer;

impl Observer {
    pub fn new() -> Self {
        Self
    }

    pub fn observe(&mut self, ctx: &SimCtx) {
        for process in ctx.processes() {
            let pid = process.pid;
            assert!(
                process.age <= process.lifespan,
                "Process {pid} ran past its lifespan ({} > {})",
                process.age,
                process.lifespan
            );
            if process.status == ProcessStatus::Exited {
                assert!(
                    ctx.queue_of(pid).is_none(),
                    "Exited process {pid} still linked into a queue"
                );
            }
        }

        if let Some(pid) = ctx.current() {
            let process = ctx.process(pid);
            assert_eq!(
                process.status,
                ProcessStatus::Running,
                "Current process {pid} must be Running"
            );
            assert!(
                ctx.queue_of(pid).is_none(),
                "Current process {pid} must not appear in any queue"
            );
        }

        let mut linked = 0;
        for (queue_id, queue) in &ctx.queues {
            let expected = if queue_id == ctx.ready_id() {
                ProcessStatus::Ready
            } else {
                ProcessStatus::Wait
            };
            linked += queue.len();
            for pid in queue.iter() {
                assert_eq!(
                    ctx.queue_of(pid),
                    Some(queue_id),
                    "Process {pid} found in queue {queue_id:?} without membership"
                );
                assert_eq!(
                    ctx.process(pid).status,
                    expected,
                    "Process {pid} in queue {queue_id:?} has the wrong status"
                );
            }
        }
        // Each process is linked at most once
        assert_eq!(
            linked,
            ctx.proc_to_queue.len(),
            "Queue contents and membership index disagree"
        );

        // An owner may wait on another resource, never on its own
        for resource in &ctx.resources {
            if let Some(owner) = resource.owner {
                assert_ne!(
                    ctx.process(owner).status,
                    ProcessStatus::Exited,
                    "Owner {owner} of resource {} has exited",
                    resource.id
                );
                assert_ne!(
                    ctx.queue_of(owner),
                    Some(resource.waitqueue),
                    "Owner {owner} waits on its own resource {}",
                    resource.id
                );
            }
        }
    }
}
