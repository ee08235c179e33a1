//! Delayed task queue ordered by fire time

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;

use parking_lot::Mutex;

use super::Task;

/// Priority of tasks scheduled without one
pub const DEFAULT_TASK_PRIORITY: u32 = 1;

/// A task waiting for its fire time
pub(crate) struct DelayedTask {
    pub(crate) fire_at: Instant,
    pub(crate) priority: u32,
    seq: u64,
    pub(crate) task: Task,
}

impl DelayedTask {
    pub(crate) fn new(fire_at: Instant, priority: u32, seq: u64, task: Task) -> Self {
        Self {
            fire_at,
            priority,
            seq,
            task,
        }
    }

    fn key(&self) -> (Instant, u32, u64) {
        (self.fire_at, self.priority, self.seq)
    }
}

impl PartialEq for DelayedTask {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for DelayedTask {}

impl PartialOrd for DelayedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DelayedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Min-heap of delayed tasks
#[derive(Default)]
pub(crate) struct DelayedQueue {
    heap: Mutex<BinaryHeap<Reverse<DelayedTask>>>,
}

impl DelayedQueue {
    pub(crate) fn push(&self, task: DelayedTask) {
        self.heap.lock().push(Reverse(task));
    }

    /// Remove every task due at `now`, in firing order
    ///
    /// Tasks pushed after this returns wait for the next call even when
    /// they are already due.
    pub(crate) fn take_due(&self, now: Instant) -> Vec<DelayedTask> {
        let mut heap = self.heap.lock();
        let mut due = Vec::new();
        while heap.peek().is_some_and(|Reverse(next)| next.fire_at <= now) {
            if let Some(Reverse(task)) = heap.pop() {
                due.push(task);
            }
        }
        due
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.lock().len()
    }

    pub(crate) fn clear(&self) -> usize {
        let mut heap = self.heap.lock();
        let count = heap.len();
        heap.clear();
        count
    }
}
