//! Worker lifecycle: provisioning, task execution, rotation, drain.
//!
//! Each worker is single-threaded internally and owns its resource and
//! rotation counters exclusively. The only shared structures it touches are
//! the task queue and the result collector; workers never communicate with
//! each other.

pub mod rotation;
pub mod states;

pub use rotation::{RotationPolicy, RotationTrigger};
pub use states::WorkerPhase;

use crate::collector::ResultCollector;
use crate::config::SchedulerConfig;
use crate::executor::TaskExecutor;
use crate::provisioner::{acquire_with_backoff, ResourceProvisioner};
use crate::queue::{QueuedTask, TaskQueue};
use crate::task::Outcome;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Per-worker tallies reported when the worker drains.
#[derive(Debug, Clone)]
pub struct WorkerSummary {
    pub worker_id: usize,
    /// Task attempts executed, including retries.
    pub tasks_processed: u64,
    pub successes: u64,
    /// Failed attempts, retryable and terminal alike.
    pub failures: u64,
    pub rotations: u64,
    pub resources_acquired: u64,
    pub degraded_episodes: u64,
}

impl WorkerSummary {
    fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            tasks_processed: 0,
            successes: 0,
            failures: 0,
            rotations: 0,
            resources_acquired: 0,
            degraded_episodes: 0,
        }
    }
}

/// One pool worker.
///
/// Drives the phase machine `Idle → Provisioning → Running → {Rotating,
/// Degraded, Draining}` until the queue drains or a stop is requested.
pub struct Worker<P, E>
where
    P: ResourceProvisioner + 'static,
    E: TaskExecutor<P::Resource> + 'static,
{
    id: usize,
    queue: Arc<TaskQueue>,
    collector: Arc<ResultCollector>,
    provisioner: Arc<P>,
    executor: Arc<E>,
    config: Arc<SchedulerConfig>,
    shutdown: watch::Receiver<bool>,
    phase: WorkerPhase,
    rotation: RotationPolicy,
    summary: WorkerSummary,
}

impl<P, E> Worker<P, E>
where
    P: ResourceProvisioner + 'static,
    E: TaskExecutor<P::Resource> + 'static,
{
    pub(crate) fn new(
        id: usize,
        queue: Arc<TaskQueue>,
        collector: Arc<ResultCollector>,
        provisioner: Arc<P>,
        executor: Arc<E>,
        config: Arc<SchedulerConfig>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let rotation = RotationPolicy::new(
            config.rotation.rotation_threshold,
            config.rotation.failure_threshold,
        );
        Self {
            id,
            queue,
            collector,
            provisioner,
            executor,
            config,
            shutdown,
            phase: WorkerPhase::Idle,
            rotation,
            summary: WorkerSummary::new(id),
        }
    }

    fn set_phase(&mut self, next: WorkerPhase) {
        debug!(
            worker_id = self.id,
            from = %self.phase,
            to = %next,
            "worker phase transition"
        );
        self.phase = next;
    }

    fn stop_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Drive the worker until the queue drains or a stop is requested.
    /// Consumes the worker and returns its tallies.
    pub async fn run(mut self) -> WorkerSummary {
        info!(worker_id = self.id, "🛠️ worker started");
        let mut resource: Option<P::Resource> = None;

        loop {
            match self.phase {
                WorkerPhase::Idle => self.set_phase(WorkerPhase::Provisioning),

                WorkerPhase::Provisioning => {
                    if self.stop_requested() || self.queue.is_drained() {
                        self.set_phase(WorkerPhase::Draining);
                        continue;
                    }
                    match acquire_with_backoff(
                        self.provisioner.as_ref(),
                        &self.config.provisioning.backoff,
                        self.config.provisioning.retry_limit,
                        &mut self.shutdown,
                    )
                    .await
                    {
                        Ok(acquired) => {
                            self.summary.resources_acquired += 1;
                            resource = Some(acquired);
                            self.set_phase(WorkerPhase::Running);
                        }
                        Err(error) => {
                            if self.stop_requested() {
                                self.set_phase(WorkerPhase::Draining);
                                continue;
                            }
                            warn!(
                                worker_id = self.id,
                                error = %error,
                                retry_limit = self.config.provisioning.retry_limit,
                                "⏸️ provisioning retries exhausted, worker degrading"
                            );
                            self.summary.degraded_episodes += 1;
                            self.set_phase(WorkerPhase::Degraded);
                        }
                    }
                }

                WorkerPhase::Degraded => {
                    if self.stop_requested() || self.queue.is_drained() {
                        self.set_phase(WorkerPhase::Draining);
                        continue;
                    }
                    let cooldown = self.config.provisioning.degraded_cooldown();
                    info!(
                        worker_id = self.id,
                        cooldown_ms = cooldown.as_millis() as u64,
                        "worker cooling down before re-provisioning"
                    );
                    tokio::select! {
                        _ = sleep(cooldown) => {}
                        _ = self.shutdown.changed() => {}
                    }
                    self.set_phase(WorkerPhase::Provisioning);
                }

                WorkerPhase::Running => {
                    let Some(held) = resource.as_mut() else {
                        // Running without a resource is unreachable through
                        // normal transitions; reacquire rather than panic.
                        self.set_phase(WorkerPhase::Provisioning);
                        continue;
                    };
                    if self.stop_requested() {
                        self.set_phase(WorkerPhase::Draining);
                        continue;
                    }
                    match self.queue.try_dequeue() {
                        Some(queued) => {
                            self.process_task(held, queued).await;
                            if let Some(trigger) = self.rotation.should_rotate() {
                                info!(
                                    worker_id = self.id,
                                    trigger = %trigger,
                                    tasks_since_rotation = self.rotation.tasks_since_rotation(),
                                    consecutive_failures = self.rotation.consecutive_failures(),
                                    "🔄 resource rotation triggered"
                                );
                                self.set_phase(WorkerPhase::Rotating);
                            }
                        }
                        None => {
                            if self.queue.is_drained() {
                                self.set_phase(WorkerPhase::Draining);
                            } else {
                                // Another worker may still requeue its
                                // in-flight task; poll again shortly.
                                sleep(self.config.poll_interval()).await;
                            }
                        }
                    }
                }

                WorkerPhase::Rotating => {
                    if let Some(retired) = resource.take() {
                        self.release_resource(retired).await;
                    }
                    self.rotation.reset();
                    self.summary.rotations += 1;
                    self.set_phase(WorkerPhase::Provisioning);
                }

                WorkerPhase::Draining => {
                    if let Some(held) = resource.take() {
                        self.release_resource(held).await;
                    }
                    info!(
                        worker_id = self.id,
                        tasks_processed = self.summary.tasks_processed,
                        successes = self.summary.successes,
                        failures = self.summary.failures,
                        rotations = self.summary.rotations,
                        "🏁 worker drained"
                    );
                    return self.summary;
                }
            }
        }
    }

    /// Execute one dequeued task and route its outcome: record, requeue, or
    /// discard. A panic inside the executor is contained and classified as a
    /// retryable failure.
    async fn process_task(&mut self, resource: &mut P::Resource, queued: QueuedTask) {
        let QueuedTask { task, attempt } = queued;
        debug!(
            worker_id = self.id,
            task_id = %task.id,
            attempt,
            "executing task"
        );

        let outcome = match AssertUnwindSafe(self.executor.execute(resource, &task))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Outcome::RetryableFailure("task execution panicked".to_string()),
        };

        self.summary.tasks_processed += 1;
        match outcome {
            Outcome::Success(result) => {
                self.summary.successes += 1;
                self.rotation.record_attempt(true);
                self.collector.record_success(task.id, result, attempt);
                self.queue.task_done();
            }
            Outcome::RetryableFailure(reason) => {
                self.summary.failures += 1;
                self.rotation.record_attempt(false);
                self.collector.record_retry(task.id, attempt, &reason);
                if attempt > self.config.retry.max_task_retries {
                    warn!(
                        worker_id = self.id,
                        task_id = %task.id,
                        attempt,
                        "retries exhausted, recording terminal failure"
                    );
                    self.collector.record_terminal_failure(
                        task.id,
                        format!("retries exhausted after {attempt} attempts: {reason}"),
                        attempt,
                    );
                    self.queue.task_done();
                } else {
                    self.queue.requeue(QueuedTask { task, attempt });
                }
            }
            Outcome::TerminalFailure(reason) => {
                self.summary.failures += 1;
                self.rotation.record_attempt(false);
                self.collector.record_terminal_failure(task.id, reason, attempt);
                self.queue.task_done();
            }
        }
    }

    async fn release_resource(&self, resource: P::Resource) {
        if let Err(error) = self.provisioner.release(resource).await {
            warn!(
                worker_id = self.id,
                error = %error,
                "resource release failed, discarding handle"
            );
        }
    }
}
