//! Resource rotation policy.
//!
//! One rotation-policy abstraction shared by every resource kind, replacing
//! ad hoc per-call-site counters: a resource is retired after a fixed number
//! of task attempts or after too many consecutive failures, whichever comes
//! first.

use std::fmt;

/// Why a rotation was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationTrigger {
    /// The resource served its full task budget.
    TaskThreshold,
    /// Consecutive failures suggest the resource itself went bad.
    FailureThreshold,
}

impl fmt::Display for RotationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskThreshold => write!(f, "task_threshold"),
            Self::FailureThreshold => write!(f, "failure_threshold"),
        }
    }
}

/// Rotation thresholds plus the per-resource counters they drive.
///
/// Owned exclusively by one worker; counters reset when the resource is
/// replaced.
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    rotation_threshold: u32,
    failure_threshold: u32,
    tasks_since_rotation: u32,
    consecutive_failures: u32,
}

impl RotationPolicy {
    pub fn new(rotation_threshold: u32, failure_threshold: u32) -> Self {
        Self {
            rotation_threshold,
            failure_threshold,
            tasks_since_rotation: 0,
            consecutive_failures: 0,
        }
    }

    /// Record one finished attempt against the current resource.
    pub fn record_attempt(&mut self, success: bool) {
        self.tasks_since_rotation += 1;
        if success {
            self.consecutive_failures = 0;
        } else {
            self.consecutive_failures += 1;
        }
    }

    /// Check whether the current resource should be retired, and why.
    /// Failure pressure wins when both thresholds trip at once.
    pub fn should_rotate(&self) -> Option<RotationTrigger> {
        if self.consecutive_failures >= self.failure_threshold {
            Some(RotationTrigger::FailureThreshold)
        } else if self.tasks_since_rotation >= self.rotation_threshold {
            Some(RotationTrigger::TaskThreshold)
        } else {
            None
        }
    }

    /// Reset counters for a freshly acquired resource.
    pub fn reset(&mut self) {
        self.tasks_since_rotation = 0;
        self.consecutive_failures = 0;
    }

    pub fn tasks_since_rotation(&self) -> u32 {
        self.tasks_since_rotation
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_threshold_boundary() {
        let mut policy = RotationPolicy::new(3, 10);

        policy.record_attempt(true);
        policy.record_attempt(true);
        // threshold - 1 attempts: no rotation yet
        assert_eq!(policy.should_rotate(), None);

        policy.record_attempt(true);
        // exactly threshold attempts: rotation due
        assert_eq!(policy.should_rotate(), Some(RotationTrigger::TaskThreshold));
    }

    #[test]
    fn test_failure_threshold_boundary() {
        let mut policy = RotationPolicy::new(100, 3);

        policy.record_attempt(false);
        policy.record_attempt(false);
        assert_eq!(policy.should_rotate(), None);

        policy.record_attempt(false);
        assert_eq!(
            policy.should_rotate(),
            Some(RotationTrigger::FailureThreshold)
        );
    }

    #[test]
    fn test_success_resets_failure_streak() {
        let mut policy = RotationPolicy::new(100, 3);

        policy.record_attempt(false);
        policy.record_attempt(false);
        policy.record_attempt(true);
        policy.record_attempt(false);
        assert_eq!(policy.should_rotate(), None);
        assert_eq!(policy.consecutive_failures(), 1);
        assert_eq!(policy.tasks_since_rotation(), 4);
    }

    #[test]
    fn test_failure_trigger_takes_precedence() {
        let mut policy = RotationPolicy::new(3, 3);
        policy.record_attempt(false);
        policy.record_attempt(false);
        policy.record_attempt(false);

        assert_eq!(
            policy.should_rotate(),
            Some(RotationTrigger::FailureThreshold)
        );
    }

    #[test]
    fn test_reset_clears_counters() {
        let mut policy = RotationPolicy::new(2, 2);
        policy.record_attempt(false);
        policy.record_attempt(true);
        assert!(policy.should_rotate().is_some());

        policy.reset();
        assert_eq!(policy.should_rotate(), None);
        assert_eq!(policy.tasks_since_rotation(), 0);
        assert_eq!(policy.consecutive_failures(), 0);
    }
}
