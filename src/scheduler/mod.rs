//! # Pool Manager
//!
//! Owns worker lifecycle: spawns the pool, waits for the queue to drain and
//! every in-flight task to reach a terminal outcome, then returns the
//! aggregated snapshot. Guarantees that, absent a stop request, every
//! enqueued task ends in exactly one terminal outcome — no silent drops.

use crate::collector::{ResultCollector, ResultSnapshot};
use crate::config::SchedulerConfig;
use crate::error::{Result, RotaError};
use crate::executor::TaskExecutor;
use crate::provisioner::ResourceProvisioner;
use crate::queue::TaskQueue;
use crate::task::Task;
use crate::worker::Worker;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Progress counts handed to the optional progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Tasks that reached a terminal outcome, successful or not.
    pub completed: usize,
    pub total: usize,
    /// Tasks that ended as terminal failures.
    pub failed: usize,
}

/// Callback invoked periodically while the pool runs, and once at the end.
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Remote handle for requesting a cooperative stop of a running pool.
///
/// Workers observe the signal at safe points — after finishing the current
/// task, between provisioning attempts, during a degraded cooldown — so no
/// task is preempted mid-execution. The stop latches for the scheduler's
/// lifetime; build a new scheduler for a fresh run.
#[derive(Clone)]
pub struct SchedulerHandle {
    shutdown: Arc<watch::Sender<bool>>,
}

impl SchedulerHandle {
    /// Request a stop. Idempotent.
    pub fn stop(&self) {
        debug!("pool stop requested");
        self.shutdown.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.shutdown.borrow()
    }
}

/// Bounded worker-pool task scheduler with resource rotation and retry.
///
/// Distributes a bounded set of tasks across a fixed pool of workers, each
/// exclusively owning a provisioner-supplied resource that is rotated on
/// policy thresholds. Transient failures requeue with a bounded retry
/// budget; the final [`ResultSnapshot`] accounts for every task.
pub struct Scheduler<P, E>
where
    P: ResourceProvisioner + 'static,
    E: TaskExecutor<P::Resource> + 'static,
{
    config: Arc<SchedulerConfig>,
    provisioner: Arc<P>,
    executor: Arc<E>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
    progress: Option<ProgressCallback>,
}

impl<P, E> Scheduler<P, E>
where
    P: ResourceProvisioner + 'static,
    E: TaskExecutor<P::Resource> + 'static,
{
    /// Build a scheduler over caller-supplied capabilities. Fails on invalid
    /// configuration.
    pub fn new(config: SchedulerConfig, provisioner: P, executor: E) -> Result<Self> {
        config
            .validate()
            .map_err(|e| RotaError::ConfigurationError(e.to_string()))?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            config: Arc::new(config),
            provisioner: Arc::new(provisioner),
            executor: Arc::new(executor),
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
            progress: None,
        })
    }

    /// Attach a progress callback, invoked every `progress_interval` while
    /// the pool runs and once with the final counts.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Handle for requesting a cooperative stop from another task or thread.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shutdown: Arc::clone(&self.shutdown_tx),
        }
    }

    /// Run the pool over `tasks` until every task reaches a terminal outcome
    /// or a stop is requested. Returns the aggregated snapshot; after a stop
    /// the snapshot may report `pending > 0`.
    pub async fn run(&self, tasks: Vec<Task>) -> Result<ResultSnapshot> {
        let total = tasks.len();
        let collector = Arc::new(ResultCollector::new(total));
        if total == 0 {
            info!("no tasks enqueued, returning empty snapshot");
            return Ok(collector.snapshot());
        }

        let queue = Arc::new(TaskQueue::new());
        for task in tasks {
            queue.enqueue(task);
        }

        let worker_count = self.config.effective_worker_count(total);
        info!(
            worker_count,
            total_tasks = total,
            "🚀 scheduler starting worker pool"
        );

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 1..=worker_count {
            let worker = Worker::new(
                worker_id,
                Arc::clone(&queue),
                Arc::clone(&collector),
                Arc::clone(&self.provisioner),
                Arc::clone(&self.executor),
                Arc::clone(&self.config),
                self.shutdown_rx.clone(),
            );
            handles.push(tokio::spawn(worker.run()));
        }

        let monitor = self
            .progress
            .as_ref()
            .map(|callback| self.spawn_monitor(Arc::clone(callback), Arc::clone(&collector)));

        for joined in join_all(handles).await {
            match joined {
                Ok(summary) => info!(
                    worker_id = summary.worker_id,
                    tasks_processed = summary.tasks_processed,
                    successes = summary.successes,
                    failures = summary.failures,
                    rotations = summary.rotations,
                    resources_acquired = summary.resources_acquired,
                    degraded_episodes = summary.degraded_episodes,
                    "worker summary"
                ),
                Err(join_error) => error!(error = %join_error, "worker task aborted"),
            }
        }

        if let Some(monitor) = monitor {
            // Wait the cancellation out so no periodic callback can land
            // after the final one below.
            monitor.abort();
            let _ = monitor.await;
        }

        let snapshot = collector.snapshot();
        let stopped = *self.shutdown_rx.borrow();
        if !stopped && !snapshot.is_complete() {
            // Workers only drain once the queue is empty with nothing in
            // flight, so a shortfall here means a task was lost.
            error!(
                pending = snapshot.pending,
                "pool completed with unaccounted tasks"
            );
            return Err(RotaError::SchedulerError(format!(
                "{} tasks unaccounted for at pool completion",
                snapshot.pending
            )));
        }

        if let Some(callback) = &self.progress {
            callback(ProgressUpdate {
                completed: snapshot.completed(),
                total,
                failed: snapshot.terminal_failures,
            });
        }

        info!(
            successes = snapshot.successes,
            terminal_failures = snapshot.terminal_failures,
            pending = snapshot.pending,
            retry_attempts = snapshot.retry_attempts,
            stopped,
            "🎉 pool run complete"
        );
        Ok(snapshot)
    }

    fn spawn_monitor(
        &self,
        callback: ProgressCallback,
        collector: Arc<ResultCollector>,
    ) -> JoinHandle<()> {
        let period = self.config.progress_interval();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // First tick fires immediately; skip it so the first report
            // lands one full period in.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                callback(ProgressUpdate {
                    completed: collector.completed(),
                    total: collector.total(),
                    failed: collector.terminal_failures(),
                });
            }
        })
    }
}
