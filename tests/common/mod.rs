//! Shared mock capabilities for scheduler integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use dashmap::DashMap;
use rota_core::{Outcome, ProvisionError, ResourceProvisioner, Task, TaskExecutor, TaskId};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Provisioner that fails its first `fail_first` acquisitions, then hands
/// out numbered sessions. Counts every call for assertions.
pub struct CountingProvisioner {
    fail_first: u32,
    acquire_calls: AtomicU32,
    acquired: AtomicU32,
    released: AtomicU32,
}

impl CountingProvisioner {
    pub fn new(fail_first: u32) -> Self {
        Self {
            fail_first,
            acquire_calls: AtomicU32::new(0),
            acquired: AtomicU32::new(0),
            released: AtomicU32::new(0),
        }
    }

    pub fn acquire_calls(&self) -> u32 {
        self.acquire_calls.load(Ordering::SeqCst)
    }

    pub fn acquired(&self) -> u32 {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> u32 {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceProvisioner for CountingProvisioner {
    type Resource = u32;

    async fn acquire(&self) -> Result<u32, ProvisionError> {
        let call = self.acquire_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.fail_first {
            return Err(ProvisionError::acquisition("simulated pool outage"));
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(call)
    }

    async fn release(&self, _session: u32) -> Result<(), ProvisionError> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// How the scripted executor treats each attempt.
pub enum ExecutorMode {
    AlwaysSucceed,
    AlwaysRetryable,
    /// Retryable failure while attempt <= n, success afterwards.
    RetryableFirst(u32),
    PanicOnFirstAttempt,
    /// Outcome decided by the task payload:
    /// `{"kind": "success"}`, `{"kind": "terminal"}`, or
    /// `{"kind": "flaky", "fail_times": k}`.
    PayloadDriven,
}

/// Executor whose behavior is scripted per mode, recording the attempt
/// count per task so tests can assert exact retry behavior.
pub struct ScriptedExecutor {
    mode: ExecutorMode,
    latency: Duration,
    pub attempts: DashMap<TaskId, u32>,
}

impl ScriptedExecutor {
    pub fn new(mode: ExecutorMode) -> Self {
        Self {
            mode,
            latency: Duration::ZERO,
            attempts: DashMap::new(),
        }
    }

    pub fn with_latency(mode: ExecutorMode, latency: Duration) -> Self {
        Self {
            mode,
            latency,
            attempts: DashMap::new(),
        }
    }

    pub fn attempts_for(&self, task_id: TaskId) -> u32 {
        self.attempts.get(&task_id).map(|entry| *entry).unwrap_or(0)
    }
}

#[async_trait]
impl TaskExecutor<u32> for ScriptedExecutor {
    async fn execute(&self, _session: &mut u32, task: &Task) -> Outcome {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let attempt = {
            let mut entry = self.attempts.entry(task.id).or_insert(0);
            *entry += 1;
            *entry
        };

        match &self.mode {
            ExecutorMode::AlwaysSucceed => Outcome::Success(json!({ "attempt": attempt })),
            ExecutorMode::AlwaysRetryable => {
                Outcome::RetryableFailure("simulated transient failure".to_string())
            }
            ExecutorMode::RetryableFirst(n) => {
                if attempt <= *n {
                    Outcome::RetryableFailure("simulated transient failure".to_string())
                } else {
                    Outcome::Success(json!({ "attempt": attempt }))
                }
            }
            ExecutorMode::PanicOnFirstAttempt => {
                if attempt == 1 {
                    panic!("executor blew up on first attempt");
                }
                Outcome::Success(json!({ "attempt": attempt }))
            }
            ExecutorMode::PayloadDriven => {
                let kind = task.payload["kind"].as_str().unwrap_or("success");
                match kind {
                    "terminal" => Outcome::TerminalFailure("declared unrecoverable".to_string()),
                    "flaky" => {
                        let fail_times = task.payload["fail_times"].as_u64().unwrap_or(1) as u32;
                        if attempt <= fail_times {
                            Outcome::RetryableFailure("still flaky".to_string())
                        } else {
                            Outcome::Success(json!({ "attempt": attempt }))
                        }
                    }
                    _ => Outcome::Success(json!({ "attempt": attempt })),
                }
            }
        }
    }
}

/// Tasks with plain string payloads, one per index.
pub fn simple_tasks(count: usize) -> Vec<Task> {
    (0..count)
        .map(|n| Task::new(json!(format!("1380000{n:04}"))))
        .collect()
}

/// A config tuned for fast tests: tiny backoff delays, short cooldown.
pub fn fast_config(worker_count: usize) -> rota_core::SchedulerConfig {
    let mut config = rota_core::SchedulerConfig {
        worker_count,
        ..rota_core::SchedulerConfig::default()
    };
    config.provisioning.backoff.base_delay_ms = 1;
    config.provisioning.backoff.max_delay_ms = 5;
    config.provisioning.degraded_cooldown_secs = 1;
    config.poll_interval_ms = 5;
    config
}
