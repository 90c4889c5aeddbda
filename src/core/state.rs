use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use std::collections::VecDeque;
use tracing::debug;

// Index into the process table
pub type Pid = usize;
// Index into the resource table
pub type ResourceId = usize;
pub type Ticks = u64;
pub type Priority = u32;

pub const MAX_PRIORITY: Priority = 100;
pub const DEFAULT_PRIORITY: Priority = 0;
pub const NR_RESOURCES: usize = 32;

new_key_type! {
    pub struct QueueId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Ready,
    Running,
    Wait,
    Exited,
}

#[derive(Debug, Clone)]
pub struct Process {
    pub pid: Pid,
    pub status: ProcessStatus,
    pub age: Ticks,
    pub lifespan: Ticks,
    pub priority: Priority,
    priority_base: Priority,
}

impl Process {
    pub fn priority_base(&self) -> Priority {
        self.priority_base
    }

    pub fn remaining(&self) -> Ticks {
        self.lifespan - self.age
    }

    pub fn is_complete(&self) -> bool {
        self.age >= self.lifespan
    }
}

#[derive(Debug)]
pub struct Resource {
    pub id: ResourceId,
    pub owner: Option<Pid>,
    pub waitqueue: QueueId,
}

/// Ordered sequence of pids. Mutation goes through [`SimCtx`] so the
/// membership index stays in sync.
#[derive(Debug, Default)]
pub struct Queue {
    pids: VecDeque<Pid>,
}

impl Queue {
    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn front(&self) -> Option<Pid> {
        self.pids.front().copied()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.pids.contains(&pid)
    }

    // Head to tail; `.rev()` scans backwards
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Pid> + '_ {
        self.pids.iter().copied()
    }
}

#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    pub(crate) current: Option<Pid>,
    pub(crate) procs: Vec<Process>,
    pub(crate) queues: SlotMap<QueueId, Queue>,
    pub(crate) proc_to_queue: FxHashMap<Pid, QueueId>,
    pub(crate) ready_id: QueueId,
    pub(crate) resources: Vec<Resource>,
}

impl Default for SimCtx {
    fn default() -> Self {
        Self::new(NR_RESOURCES)
    }
}

impl SimCtx {
    pub fn new(nr_resources: usize) -> Self {
        let mut queues = SlotMap::with_capacity_and_key(1 + nr_resources);

        let ready_id = queues.insert(Queue::default());

        let resources = (0..nr_resources)
            .map(|id| Resource {
                id,
                owner: None,
                waitqueue: queues.insert(Queue::default()),
            })
            .collect();

        Self {
            now: 0,
            current: None,
            procs: Vec::new(),
            queues,
            proc_to_queue: FxHashMap::default(),
            ready_id,
            resources,
        }
    }

    // New processes start READY but unlinked; the caller queues them
    pub fn create_process(&mut self, lifespan: Ticks, priority: Priority) -> Pid {
        debug_assert!(lifespan > 0, "Process lifespan must be positive");
        debug_assert!(
            priority <= MAX_PRIORITY,
            "Priority {priority} exceeds MAX_PRIORITY"
        );

        let pid = self.procs.len();
        self.procs.push(Process {
            pid,
            status: ProcessStatus::Ready,
            age: 0,
            lifespan,
            priority,
            priority_base: priority,
        });
        pid
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn process(&self, pid: Pid) -> &Process {
        &self.procs[pid]
    }

    pub fn process_mut(&mut self, pid: Pid) -> &mut Process {
        &mut self.procs[pid]
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.procs.iter()
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id]
    }

    pub fn resource_mut(&mut self, id: ResourceId) -> &mut Resource {
        &mut self.resources[id]
    }

    pub fn nr_resources(&self) -> usize {
        self.resources.len()
    }

    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    pub fn ready_id(&self) -> QueueId {
        self.ready_id
    }

    pub fn queue(&self, id: QueueId) -> &Queue {
        self.queues.get(id).expect("Unknown queue")
    }

    pub fn ready(&self) -> &Queue {
        self.queue(self.ready_id)
    }

    pub fn waitqueue(&self, resource: ResourceId) -> &Queue {
        self.queue(self.resources[resource].waitqueue)
    }

    pub fn queue_of(&self, pid: Pid) -> Option<QueueId> {
        self.proc_to_queue.get(&pid).copied()
    }

    fn link(&mut self, id: QueueId, pid: Pid, front: bool) {
        assert!(
            !self.proc_to_queue.contains_key(&pid),
            "Process {pid} already linked into a queue"
        );
        assert_ne!(
            self.current,
            Some(pid),
            "Current process {pid} must not be linked into a queue"
        );

        let queue = self.queues.get_mut(id).expect("Unknown queue");
        if front {
            queue.pids.push_front(pid);
        } else {
            queue.pids.push_back(pid);
        }
        self.proc_to_queue.insert(pid, id);
    }

    pub fn queue_push_back(&mut self, id: QueueId, pid: Pid) {
        self.link(id, pid, false);
    }

    pub fn queue_push_front(&mut self, id: QueueId, pid: Pid) {
        self.link(id, pid, true);
    }

    pub fn queue_pop_front(&mut self, id: QueueId) -> Option<Pid> {
        let pid = self.queues.get_mut(id)?.pids.pop_front()?;

        let removed = self.proc_to_queue.remove(&pid);
        debug_assert_eq!(removed, Some(id), "Process {pid} missing queue membership");

        Some(pid)
    }

    // Returns false if `pid` is not linked into `id`
    pub fn queue_remove(&mut self, id: QueueId, pid: Pid) -> bool {
        if self.proc_to_queue.get(&pid) != Some(&id) {
            return false;
        }

        let queue = self.queues.get_mut(id).expect("Unknown queue");
        let index = queue
            .pids
            .iter()
            .position(|&p| p == pid)
            .expect("Membership index out of sync with queue");
        queue.pids.remove(index);
        self.proc_to_queue.remove(&pid);
        true
    }

    pub fn ready_push_back(&mut self, pid: Pid) {
        self.queue_push_back(self.ready_id, pid);
    }

    pub fn ready_push_front(&mut self, pid: Pid) {
        self.queue_push_front(self.ready_id, pid);
    }

    pub fn ready_pop_front(&mut self) -> Option<Pid> {
        self.queue_pop_front(self.ready_id)
    }

    pub fn ready_remove(&mut self, pid: Pid) -> bool {
        self.queue_remove(self.ready_id, pid)
    }

    /// Bind `pid` (or nothing) as the process running this tick.
    pub fn set_current(&mut self, pid: Option<Pid>) {
        if let Some(pid) = pid {
            assert!(
                !self.proc_to_queue.contains_key(&pid),
                "Running process {pid} must not be enqueued"
            );
            let process = self.process_mut(pid);
            debug_assert!(
                process.status != ProcessStatus::Wait && process.status != ProcessStatus::Exited,
                "Process {pid} cannot run from {:?}",
                process.status
            );
            process.status = ProcessStatus::Running;
        }
        self.current = pid;
    }

    /// Move the current process back into the ready set.
    pub fn preempt(&mut self, pid: Pid, front: bool) {
        assert_eq!(self.current, Some(pid), "Preempting non-current process {pid}");
        self.current = None;
        self.process_mut(pid).status = ProcessStatus::Ready;
        self.link(self.ready_id, pid, front);
    }

    /// Park `pid` on the waitqueue of `resource`.
    pub fn block_on(&mut self, resource: ResourceId, pid: Pid) {
        if self.current == Some(pid) {
            self.current = None;
        }
        self.process_mut(pid).status = ProcessStatus::Wait;
        let waitqueue = self.resources[resource].waitqueue;
        self.link(waitqueue, pid, false);
        debug!(pid, resource, "blocked");
    }

    /// Move a waiter of `resource` to the ready-set tail.
    pub fn wake(&mut self, resource: ResourceId, pid: Pid) {
        assert_eq!(
            self.process(pid).status,
            ProcessStatus::Wait,
            "Woken process {pid} is not waiting"
        );
        let waitqueue = self.resources[resource].waitqueue;
        let removed = self.queue_remove(waitqueue, pid);
        assert!(removed, "Process {pid} is not waiting on resource {resource}");

        self.process_mut(pid).status = ProcessStatus::Ready;
        self.ready_push_back(pid);
        debug!(pid, resource, "woken");
    }

    /// Drop ownership of `resource`; `pid` must be its owner.
    pub fn disown(&mut self, resource: ResourceId, pid: Pid) {
        let r = &mut self.resources[resource];
        assert_eq!(
            r.owner,
            Some(pid),
            "Process {pid} releasing resource {resource} it does not own"
        );
        r.owner = None;
    }

    pub fn set_priority(&mut self, pid: Pid, priority: Priority) {
        let process = self.process_mut(pid);
        let priority = priority.min(MAX_PRIORITY);
        if process.priority != priority {
            debug!(pid, from = process.priority, to = priority, "priority change");
            process.priority = priority;
        }
    }

    pub fn restore_priority(&mut self, pid: Pid) {
        let base = self.process(pid).priority_base;
        self.set_priority(pid, base);
    }

    /// Tear down the completed current process.
    pub fn exit_current(&mut self) -> Option<Pid> {
        let pid = self.current.take()?;
        debug_assert!(
            self.procs[pid].is_complete(),
            "Process {pid} exiting before completion"
        );
        debug_assert!(
            !self.proc_to_queue.contains_key(&pid),
            "Exiting process {pid} still enqueued"
        );
        self.procs[pid].status = ProcessStatus::Exited;
        Some(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_set_keeps_order_and_membership() {
        let mut ctx = SimCtx::new(1);
        let a = ctx.create_process(3, 0);
        let b = ctx.create_process(3, 0);
        let c = ctx.create_process(3, 0);

        ctx.ready_push_back(a);
        ctx.ready_push_back(b);
        ctx.ready_push_front(c);

        assert_eq!(ctx.ready().iter().collect::<Vec<_>>(), vec![c, a, b]);
        assert_eq!(ctx.ready().iter().rev().collect::<Vec<_>>(), vec![b, a, c]);
        assert_eq!(ctx.queue_of(a), Some(ctx.ready_id()));

        assert!(ctx.ready_remove(a));
        assert!(!ctx.ready_remove(a));
        assert_eq!(ctx.queue_of(a), None);

        assert_eq!(ctx.ready_pop_front(), Some(c));
        assert_eq!(ctx.ready_pop_front(), Some(b));
        assert_eq!(ctx.ready_pop_front(), None);
        assert!(ctx.ready().is_empty());
    }

    #[test]
    #[should_panic(expected = "already linked")]
    fn double_link_panics() {
        let mut ctx = SimCtx::new(1);
        let a = ctx.create_process(3, 0);
        ctx.ready_push_back(a);
        ctx.ready_push_back(a);
    }

    #[test]
    #[should_panic(expected = "must not be enqueued")]
    fn running_a_queued_process_panics() {
        let mut ctx = SimCtx::new(1);
        let a = ctx.create_process(3, 0);
        ctx.ready_push_back(a);
        ctx.set_current(Some(a));
    }

    #[test]
    fn block_and_wake_move_between_containers() {
        let mut ctx = SimCtx::new(2);
        let a = ctx.create_process(3, 0);
        ctx.set_current(Some(a));

        ctx.block_on(1, a);
        assert_eq!(ctx.current(), None);
        assert_eq!(ctx.process(a).status, ProcessStatus::Wait);
        assert_eq!(ctx.waitqueue(1).front(), Some(a));
        assert!(ctx.ready().is_empty());

        ctx.wake(1, a);
        assert_eq!(ctx.process(a).status, ProcessStatus::Ready);
        assert!(ctx.waitqueue(1).is_empty());
        assert_eq!(ctx.ready().front(), Some(a));
    }

    #[test]
    #[should_panic(expected = "is not waiting")]
    fn waking_a_ready_process_panics() {
        let mut ctx = SimCtx::new(1);
        let a = ctx.create_process(3, 0);
        ctx.ready_push_back(a);
        ctx.wake(0, a);
    }

    #[test]
    #[should_panic(expected = "does not own")]
    fn disown_by_non_owner_panics() {
        let mut ctx = SimCtx::new(1);
        let a = ctx.create_process(3, 0);
        let b = ctx.create_process(3, 0);
        ctx.resource_mut(0).owner = Some(a);
        ctx.disown(0, b);
    }

    #[test]
    fn priority_is_capped_and_restorable() {
        let mut ctx = SimCtx::new(1);
        let a = ctx.create_process(3, 7);
        ctx.set_priority(a, MAX_PRIORITY + 40);
        assert_eq!(ctx.process(a).priority, MAX_PRIORITY);
        ctx.restore_priority(a);
        assert_eq!(ctx.process(a).priority, 7);
        assert_eq!(ctx.process(a).priority_base(), 7);
    }
}
