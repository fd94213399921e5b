//! Pending-task queue with safe concurrent draining.
//!
//! The queue is one of only two shared-mutable structures in the pool (the
//! other is the result collector). Dequeue is atomic — at most one worker
//! receives any given entry — and an in-flight counter lets workers decide
//! when the queue is truly drained rather than merely momentarily empty.

use crate::task::Task;
use crossbeam::queue::SegQueue;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A task plus the attempt number it will execute as (1-based).
#[derive(Debug, Clone)]
pub struct QueuedTask {
    pub task: Task,
    pub attempt: u32,
}

/// Lock-free multi-producer multi-consumer queue of pending tasks.
///
/// A task is in exactly one of three places at any time: in the queue,
/// in flight with a worker, or completed (recorded by the collector). The
/// transitions are `try_dequeue` (queued → in flight), `requeue`
/// (in flight → queued), and `task_done` (in flight → completed).
#[derive(Debug, Default)]
pub struct TaskQueue {
    pending: SegQueue<QueuedTask>,
    in_flight: AtomicUsize,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fresh task as attempt 1.
    pub fn enqueue(&self, task: Task) {
        self.pending.push(QueuedTask { task, attempt: 1 });
    }

    /// Pop one task, marking it in flight. Non-blocking; `None` means the
    /// queue is momentarily empty, not necessarily drained.
    pub fn try_dequeue(&self) -> Option<QueuedTask> {
        let queued = self.pending.pop()?;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        Some(queued)
    }

    /// Reinsert a task after a retryable failure, bumping its attempt number.
    ///
    /// The task is pushed before the in-flight mark is cleared so a
    /// concurrent [`is_drained`](Self::is_drained) check can never observe an
    /// empty queue with nothing in flight while the task is in limbo.
    pub fn requeue(&self, queued: QueuedTask) {
        self.pending.push(QueuedTask {
            attempt: queued.attempt + 1,
            task: queued.task,
        });
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Clear the in-flight mark for a task that reached a terminal outcome.
    pub fn task_done(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Number of tasks waiting in the queue.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of tasks currently held by workers.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// True once the queue is empty and no task is held by any worker.
    ///
    /// The in-flight counter is read before emptiness; paired with the
    /// publish-before-clear ordering in [`requeue`](Self::requeue) this
    /// prevents a false drained reading while a retry is being reinserted.
    pub fn is_drained(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) == 0 && self.pending.is_empty()
    }
}
