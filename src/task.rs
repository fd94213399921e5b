//! Task identity, payloads, and execution outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of work to be executed against a resource.
///
/// The payload is opaque to the scheduler; only the executor interprets it.
/// Tasks are immutable once enqueued — retry bookkeeping travels with the
/// queue entry, never on the task itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
}

impl Task {
    /// Create a task with a generated identifier.
    pub fn new(payload: serde_json::Value) -> Self {
        Self::with_id(TaskId::new(), payload)
    }

    /// Create a task under a caller-supplied identifier.
    pub fn with_id(id: TaskId, payload: serde_json::Value) -> Self {
        Self {
            id,
            payload,
            enqueued_at: Utc::now(),
        }
    }
}

/// Result of one execution attempt, as reported by the task executor.
///
/// The variant drives what the worker does next: record, requeue, or discard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// The task completed and produced a result.
    Success(serde_json::Value),
    /// Transient failure; the task may succeed if requeued.
    RetryableFailure(String),
    /// Unrecoverable failure; the task must never be retried.
    TerminalFailure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RetryableFailure(_))
    }

    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::TerminalFailure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_ids_are_unique() {
        let a = Task::new(json!("13800000001"));
        let b = Task::new(json!("13800000001"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_outcome_predicates() {
        assert!(Outcome::Success(json!(1)).is_success());
        assert!(Outcome::RetryableFailure("timeout".into()).is_retryable());
        assert!(Outcome::TerminalFailure("rejected".into()).is_terminal_failure());
        assert!(!Outcome::RetryableFailure("timeout".into()).is_terminal_failure());
    }

    #[test]
    fn test_outcome_serde_tags() {
        let json = serde_json::to_string(&Outcome::RetryableFailure("blip".into())).unwrap();
        assert_eq!(json, r#"{"outcome":"retryable_failure","detail":"blip"}"#);

        let parsed: Outcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Outcome::RetryableFailure("blip".into()));
    }
}
