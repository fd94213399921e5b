//! System-wide constants shared between configuration defaults and tests.

/// Default tuning values for the scheduler configuration.
///
/// Every knob on [`crate::config::SchedulerConfig`] defaults to one of these
/// values; they are exposed so callers and tests can reference the same
/// numbers the `Default` impls use.
pub mod defaults {
    /// Task attempts executed on one resource before rotation is forced.
    pub const ROTATION_THRESHOLD: u32 = 20;

    /// Consecutive failed attempts on one resource before rotation is forced.
    pub const FAILURE_THRESHOLD: u32 = 3;

    /// Times a task may be requeued after a retryable failure before it is
    /// recorded as a terminal failure.
    pub const MAX_TASK_RETRIES: u32 = 3;

    /// Provisioning attempts per provisioning round before a worker degrades.
    pub const PROVISION_RETRY_LIMIT: u32 = 3;

    /// Seconds a degraded worker cools down before provisioning again.
    pub const DEGRADED_COOLDOWN_SECS: u64 = 60;

    /// Milliseconds a running worker waits before re-polling an empty queue
    /// that still has tasks in flight elsewhere.
    pub const POLL_INTERVAL_MS: u64 = 50;

    /// Milliseconds between periodic progress callbacks.
    pub const PROGRESS_INTERVAL_MS: u64 = 1000;

    /// Base delay for exponential provisioning backoff.
    pub const BACKOFF_BASE_DELAY_MS: u64 = 1000;

    /// Ceiling for exponential provisioning backoff.
    pub const BACKOFF_MAX_DELAY_MS: u64 = 300_000;

    /// Growth factor applied to the provisioning backoff per failed attempt.
    pub const BACKOFF_MULTIPLIER: f64 = 2.0;
}
