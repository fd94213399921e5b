//! Exponential backoff policy for resource provisioning.

use crate::constants::defaults;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff with a hard ceiling.
///
/// The delay before attempt `n` (1-based) is
/// `base_delay_ms * multiplier^(n - 1)`, capped at `max_delay_ms`. No jitter
/// is applied: workers back off independently, so synchronized retry storms
/// are not a concern here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    /// Delay before the second attempt, in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay between attempts, in milliseconds.
    pub max_delay_ms: u64,

    /// Growth factor applied per failed attempt. Must be >= 1.0.
    pub multiplier: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: defaults::BACKOFF_BASE_DELAY_MS,
            max_delay_ms: defaults::BACKOFF_MAX_DELAY_MS,
            multiplier: defaults::BACKOFF_MULTIPLIER,
        }
    }
}

impl BackoffPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        // Exponent is clamped so the f64 computation cannot overflow to
        // infinity before the ceiling applies.
        let exponent = attempt.saturating_sub(1).min(63);
        let raw = self.base_delay_ms as f64 * self.multiplier.powi(exponent as i32);
        let capped = raw.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }
}
