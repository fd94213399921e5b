//! Resource provisioning capability and backoff-driven acquisition.

use crate::retry::BackoffPolicy;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};

/// Errors surfaced by a resource provisioner.
///
/// Acquisition failures are transient from the scheduler's point of view;
/// the per-round retry budget decides when a worker stops trying and
/// degrades instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("resource acquisition failed: {reason}")]
    AcquisitionFailed { reason: String },

    #[error("resource release failed: {reason}")]
    ReleaseFailed { reason: String },
}

impl ProvisionError {
    pub fn acquisition(reason: impl Into<String>) -> Self {
        Self::AcquisitionFailed {
            reason: reason.into(),
        }
    }

    pub fn release(reason: impl Into<String>) -> Self {
        Self::ReleaseFailed {
            reason: reason.into(),
        }
    }
}

/// Supplies and reclaims the exclusively owned resources workers execute
/// tasks against — a session, connection, credential, or any other stateful
/// handle that is expensive to create and worth rotating.
#[async_trait]
pub trait ResourceProvisioner: Send + Sync {
    type Resource: Send;

    /// Provision a fresh resource. May block; failures are transient.
    async fn acquire(&self) -> Result<Self::Resource, ProvisionError>;

    /// Reclaim a resource the worker is done with. Best-effort: callers log
    /// failures and move on, they never propagate them.
    async fn release(&self, resource: Self::Resource) -> Result<(), ProvisionError>;
}

/// Shared provisioners work as-is: callers can hand the scheduler an `Arc`
/// and keep their own handle for inspection.
#[async_trait]
impl<P> ResourceProvisioner for std::sync::Arc<P>
where
    P: ResourceProvisioner + ?Sized,
{
    type Resource = P::Resource;

    async fn acquire(&self) -> Result<Self::Resource, ProvisionError> {
        (**self).acquire().await
    }

    async fn release(&self, resource: Self::Resource) -> Result<(), ProvisionError> {
        (**self).release(resource).await
    }
}

/// Acquire a resource, retrying with exponential backoff between attempts.
///
/// Makes up to `retry_limit` attempts, sleeping per `backoff` after each
/// failure. The stop signal short-circuits the backoff sleep so shutdown is
/// not held up by a long delay. Returns the last error once the budget is
/// exhausted; the caller decides whether that means degrading.
pub async fn acquire_with_backoff<P: ResourceProvisioner>(
    provisioner: &P,
    backoff: &BackoffPolicy,
    retry_limit: u32,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<P::Resource, ProvisionError> {
    let mut last_error = ProvisionError::acquisition("no provisioning attempt made");

    for attempt in 1..=retry_limit.max(1) {
        if *shutdown.borrow() {
            return Err(ProvisionError::acquisition("stop signal received"));
        }

        match provisioner.acquire().await {
            Ok(resource) => {
                if attempt > 1 {
                    info!(attempt, "resource acquired after retry");
                }
                return Ok(resource);
            }
            Err(error) => {
                warn!(
                    attempt,
                    retry_limit,
                    error = %error,
                    "resource acquisition attempt failed"
                );
                last_error = error;

                if attempt < retry_limit {
                    let delay = backoff.delay_for_attempt(attempt);
                    tokio::select! {
                        _ = sleep(delay) => {}
                        _ = shutdown.changed() => {}
                    }
                }
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `fail_first` acquisitions, then hands out counters.
    struct FlakyProvisioner {
        fail_first: u32,
        calls: AtomicU32,
    }

    impl FlakyProvisioner {
        fn new(fail_first: u32) -> Self {
            Self {
                fail_first,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ResourceProvisioner for FlakyProvisioner {
        type Resource = u32;

        async fn acquire(&self) -> Result<u32, ProvisionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.fail_first {
                Err(ProvisionError::acquisition("upstream pool empty"))
            } else {
                Ok(call)
            }
        }

        async fn release(&self, _resource: u32) -> Result<(), ProvisionError> {
            Ok(())
        }
    }

    fn fast_backoff() -> BackoffPolicy {
        BackoffPolicy {
            base_delay_ms: 1,
            max_delay_ms: 5,
            multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_acquire_succeeds_within_budget() {
        let provisioner = FlakyProvisioner::new(2);
        let (_tx, mut rx) = watch::channel(false);

        let resource = acquire_with_backoff(&provisioner, &fast_backoff(), 3, &mut rx)
            .await
            .unwrap();
        assert_eq!(resource, 3);
        assert_eq!(provisioner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_acquire_returns_last_error_when_exhausted() {
        let provisioner = FlakyProvisioner::new(10);
        let (_tx, mut rx) = watch::channel(false);

        let result = acquire_with_backoff(&provisioner, &fast_backoff(), 3, &mut rx).await;
        assert_eq!(
            result,
            Err(ProvisionError::acquisition("upstream pool empty"))
        );
        // Exactly the budgeted number of attempts were made.
        assert_eq!(provisioner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_acquire_bails_out_on_stop_signal() {
        let provisioner = FlakyProvisioner::new(0);
        let (tx, mut rx) = watch::channel(false);
        tx.send_replace(true);

        let result = acquire_with_backoff(&provisioner, &fast_backoff(), 3, &mut rx).await;
        assert!(result.is_err());
        assert_eq!(provisioner.calls.load(Ordering::SeqCst), 0);
    }
}
