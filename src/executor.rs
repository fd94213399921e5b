//! Task execution capability consumed by the scheduler.

use crate::task::{Outcome, Task};
use async_trait::async_trait;
use std::sync::Arc;

/// Executes one task against an exclusively held resource.
///
/// Implementations encapsulate whatever domain action a task performs; its
/// latency is opaque to the scheduler. Classifying the attempt is the
/// executor's responsibility — the worker acts only on the returned
/// [`Outcome`]. A panic inside `execute` is caught by the worker and treated
/// as a retryable failure.
#[async_trait]
pub trait TaskExecutor<R>: Send + Sync
where
    R: Send,
{
    async fn execute(&self, resource: &mut R, task: &Task) -> Outcome;
}

/// Shared executors work as-is: callers can hand the scheduler an `Arc` and
/// keep their own handle for inspection.
#[async_trait]
impl<R, T> TaskExecutor<R> for Arc<T>
where
    R: Send,
    T: TaskExecutor<R> + ?Sized,
{
    async fn execute(&self, resource: &mut R, task: &Task) -> Outcome {
        (**self).execute(resource, task).await
    }
}
