//! # Scheduler Configuration
//!
//! Tuning knobs for the worker pool, with documented defaults and explicit
//! validation. Configuration can be built programmatically via `Default` /
//! struct update syntax, or loaded from YAML files with environment-specific
//! overlays (see [`loader`]).

pub mod error;
pub mod loader;

pub use error::{ConfigResult, ConfigurationError};

use crate::constants::defaults;
use crate::retry::BackoffPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root scheduler configuration.
///
/// Every field has a serde default, so partial YAML documents work: omitted
/// sections fall back to the values in [`crate::constants::defaults`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Workers to spawn. `0` means one per available core. The effective
    /// count never exceeds the number of enqueued tasks.
    pub worker_count: usize,

    /// Resource rotation thresholds.
    pub rotation: RotationConfig,

    /// Bounded task retry settings.
    pub retry: RetryConfig,

    /// Resource provisioning and degraded-worker settings.
    pub provisioning: ProvisioningConfig,

    /// Milliseconds a running worker waits before re-polling an empty,
    /// not-yet-drained queue.
    pub poll_interval_ms: u64,

    /// Milliseconds between periodic progress callbacks.
    pub progress_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_count: 0,
            rotation: RotationConfig::default(),
            retry: RetryConfig::default(),
            provisioning: ProvisioningConfig::default(),
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
            progress_interval_ms: defaults::PROGRESS_INTERVAL_MS,
        }
    }
}

/// Resource rotation thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Task attempts executed on one resource before rotation (default 20).
    pub rotation_threshold: u32,

    /// Consecutive failed attempts before rotation (default 3).
    pub failure_threshold: u32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            rotation_threshold: defaults::ROTATION_THRESHOLD,
            failure_threshold: defaults::FAILURE_THRESHOLD,
        }
    }
}

/// Bounded task retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Times a task may be requeued after a retryable failure before it is
    /// recorded as a terminal failure (default 3, so at most 4 attempts).
    pub max_task_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_task_retries: defaults::MAX_TASK_RETRIES,
        }
    }
}

/// Resource provisioning and degraded-worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Acquisition attempts per provisioning round before the worker
    /// degrades (default 3).
    pub retry_limit: u32,

    /// Seconds a degraded worker cools down before provisioning again
    /// (default 60).
    pub degraded_cooldown_secs: u64,

    /// Backoff applied between acquisition attempts within a round.
    pub backoff: BackoffPolicy,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            retry_limit: defaults::PROVISION_RETRY_LIMIT,
            degraded_cooldown_secs: defaults::DEGRADED_COOLDOWN_SECS,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl ProvisioningConfig {
    pub fn degraded_cooldown(&self) -> Duration {
        Duration::from_secs(self.degraded_cooldown_secs)
    }
}

impl SchedulerConfig {
    /// Worker count actually spawned for a run: the configured cap (or one
    /// per core when 0), never more than the number of tasks.
    pub fn effective_worker_count(&self, task_count: usize) -> usize {
        let configured = if self.worker_count == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.worker_count
        };
        configured.min(task_count)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Reject configurations that would stall or spin the pool.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rotation.rotation_threshold == 0 {
            return Err(ConfigurationError::Invalid(
                "rotation_threshold must be positive".to_string(),
            ));
        }
        if self.rotation.failure_threshold == 0 {
            return Err(ConfigurationError::Invalid(
                "failure_threshold must be positive".to_string(),
            ));
        }
        if self.provisioning.retry_limit == 0 {
            return Err(ConfigurationError::Invalid(
                "provisioning retry_limit must be positive".to_string(),
            ));
        }
        if self.provisioning.backoff.multiplier < 1.0 {
            return Err(ConfigurationError::Invalid(
                "backoff multiplier must be >= 1.0".to_string(),
            ));
        }
        if self.provisioning.backoff.base_delay_ms > self.provisioning.backoff.max_delay_ms {
            return Err(ConfigurationError::Invalid(
                "backoff base_delay_ms must not exceed max_delay_ms".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigurationError::Invalid(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.progress_interval_ms == 0 {
            return Err(ConfigurationError::Invalid(
                "progress_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
