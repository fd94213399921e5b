//! Aggregation of task outcomes across workers.
//!
//! The collector is the second of the pool's two shared-mutable structures.
//! All mutation goes through atomic record insertion; workers never exchange
//! results with each other directly.

use crate::task::TaskId;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Terminal disposition of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum TaskDisposition {
    Success { result: serde_json::Value },
    TerminalFailure { reason: String },
}

/// Per-task completion record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub disposition: TaskDisposition,
    /// Attempt number that produced the terminal outcome (1-based).
    pub attempts: u32,
    pub completed_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn is_success(&self) -> bool {
        matches!(self.disposition, TaskDisposition::Success { .. })
    }
}

/// Point-in-time aggregate of task outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSnapshot {
    pub total: usize,
    pub successes: usize,
    pub terminal_failures: usize,
    pub pending: usize,
    /// Retryable failures observed across all attempts, pool-wide. This is
    /// an attempt counter, not a task counter.
    pub retry_attempts: u64,
    pub taken_at: DateTime<Utc>,
    pub records: Vec<TaskRecord>,
}

impl ResultSnapshot {
    /// Tasks that reached a terminal outcome, successful or not.
    pub fn completed(&self) -> usize {
        self.successes + self.terminal_failures
    }

    /// True once every enqueued task reached a terminal outcome.
    pub fn is_complete(&self) -> bool {
        self.pending == 0
    }

    /// Identifiers of tasks that ended as terminal failures, for callers
    /// that want to re-run them.
    pub fn failed_task_ids(&self) -> Vec<TaskId> {
        self.records
            .iter()
            .filter(|record| !record.is_success())
            .map(|record| record.task_id)
            .collect()
    }
}

/// Thread-safe collector of task outcomes.
///
/// Exactly one terminal record is kept per task; a second record for the
/// same task indicates a scheduler bug and is logged and dropped.
#[derive(Debug)]
pub struct ResultCollector {
    total: usize,
    records: DashMap<TaskId, TaskRecord>,
    successes: AtomicUsize,
    terminal_failures: AtomicUsize,
    retry_attempts: AtomicU64,
}

impl ResultCollector {
    /// Create a collector expecting `total` enqueued tasks.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            records: DashMap::new(),
            successes: AtomicUsize::new(0),
            terminal_failures: AtomicUsize::new(0),
            retry_attempts: AtomicU64::new(0),
        }
    }

    /// Record a successful completion.
    pub fn record_success(&self, task_id: TaskId, result: serde_json::Value, attempt: u32) {
        self.insert_record(TaskRecord {
            task_id,
            disposition: TaskDisposition::Success { result },
            attempts: attempt,
            completed_at: Utc::now(),
        });
    }

    /// Record a terminal failure — executor-declared or retries exhausted.
    pub fn record_terminal_failure(&self, task_id: TaskId, reason: String, attempt: u32) {
        self.insert_record(TaskRecord {
            task_id,
            disposition: TaskDisposition::TerminalFailure { reason },
            attempts: attempt,
            completed_at: Utc::now(),
        });
    }

    /// Note a retryable failure. No per-task record is written — the task is
    /// still live — but the attempt is counted so progress reporting can
    /// expose churn.
    pub fn record_retry(&self, task_id: TaskId, attempt: u32, reason: &str) {
        self.retry_attempts.fetch_add(1, Ordering::SeqCst);
        debug!(
            task_id = %task_id,
            attempt,
            reason,
            "retryable failure recorded"
        );
    }

    fn insert_record(&self, record: TaskRecord) {
        use dashmap::mapref::entry::Entry;

        match self.records.entry(record.task_id) {
            Entry::Occupied(_) => {
                warn!(
                    task_id = %record.task_id,
                    "duplicate terminal record ignored (first write wins)"
                );
            }
            Entry::Vacant(slot) => {
                if record.is_success() {
                    self.successes.fetch_add(1, Ordering::SeqCst);
                } else {
                    self.terminal_failures.fetch_add(1, Ordering::SeqCst);
                }
                slot.insert(record);
            }
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Tasks that reached a terminal outcome so far.
    pub fn completed(&self) -> usize {
        self.records.len()
    }

    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn terminal_failures(&self) -> usize {
        self.terminal_failures.load(Ordering::SeqCst)
    }

    pub fn retry_attempts(&self) -> u64 {
        self.retry_attempts.load(Ordering::SeqCst)
    }

    /// Produce a point-in-time snapshot. Idempotent: calling it twice with no
    /// intervening completions yields identical counts.
    pub fn snapshot(&self) -> ResultSnapshot {
        let mut records: Vec<TaskRecord> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| {
            a.completed_at
                .cmp(&b.completed_at)
                .then_with(|| a.task_id.cmp(&b.task_id))
        });

        let successes = records.iter().filter(|record| record.is_success()).count();
        let terminal_failures = records.len() - successes;

        ResultSnapshot {
            total: self.total,
            successes,
            terminal_failures,
            pending: self.total.saturating_sub(records.len()),
            retry_attempts: self.retry_attempts(),
            taken_at: Utc::now(),
            records,
        }
    }
}
