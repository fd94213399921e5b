//! # Pool Simulator
//!
//! Command-line harness that runs the scheduler against simulated resources
//! and tasks. Useful for eyeballing rotation, retry, and degraded-worker
//! behavior under different tuning values without any real workload.

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use rota_core::{
    logging, Outcome, ProgressUpdate, ProvisionError, ResourceProvisioner, Scheduler,
    SchedulerConfig, Task, TaskExecutor,
};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "pool-sim")]
#[command(about = "Run the worker pool against simulated tasks and resources")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Number of simulated tasks to enqueue
    #[arg(short, long, default_value_t = 50)]
    tasks: usize,

    /// Worker count (0 = one per core)
    #[arg(short, long, default_value_t = 4)]
    workers: usize,

    /// Task attempts per resource before rotation
    #[arg(long, default_value_t = 10)]
    rotation_threshold: u32,

    /// Every Nth task fails once with a retryable failure (0 disables)
    #[arg(long, default_value_t = 5)]
    flaky_every: u64,

    /// Every Nth acquisition fails (0 disables)
    #[arg(long, default_value_t = 7)]
    acquire_fail_every: u64,

    /// Simulated task latency in milliseconds
    #[arg(long, default_value_t = 20)]
    task_latency_ms: u64,
}

/// Hands out numbered sessions; every Nth acquisition fails to exercise the
/// provisioning backoff path.
struct SimulatedProvisioner {
    acquisitions: AtomicU64,
    fail_every: u64,
}

#[async_trait]
impl ResourceProvisioner for SimulatedProvisioner {
    type Resource = u64;

    async fn acquire(&self) -> Result<u64, ProvisionError> {
        let session = self.acquisitions.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(Duration::from_millis(5)).await;
        if self.fail_every > 0 && session % self.fail_every == 0 {
            return Err(ProvisionError::acquisition("simulated upstream outage"));
        }
        Ok(session)
    }

    async fn release(&self, session: u64) -> Result<(), ProvisionError> {
        info!(session, "session released");
        Ok(())
    }
}

/// Sleeps to simulate work; flaky tasks fail their first attempt.
struct SimulatedExecutor {
    flaky_every: u64,
    latency: Duration,
    attempts: dashmap::DashMap<rota_core::TaskId, u64>,
}

#[async_trait]
impl TaskExecutor<u64> for SimulatedExecutor {
    async fn execute(&self, session: &mut u64, task: &Task) -> Outcome {
        tokio::time::sleep(self.latency).await;
        let attempt = {
            let mut entry = self.attempts.entry(task.id).or_insert(0);
            *entry += 1;
            *entry
        };

        let index = task.payload["index"].as_u64().unwrap_or(0);
        if self.flaky_every > 0 && index % self.flaky_every == 0 && attempt == 1 {
            return Outcome::RetryableFailure("simulated transient failure".to_string());
        }
        Outcome::Success(json!({ "session": *session, "attempt": attempt }))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_structured_logging();
    let cli = Cli::parse();

    let mut config = SchedulerConfig {
        worker_count: cli.workers,
        ..SchedulerConfig::default()
    };
    config.rotation.rotation_threshold = cli.rotation_threshold;
    config.provisioning.backoff.base_delay_ms = 50;
    config.provisioning.degraded_cooldown_secs = 2;
    config.progress_interval_ms = 500;

    let tasks: Vec<Task> = (0..cli.tasks)
        .map(|index| Task::new(json!({ "index": index })))
        .collect();

    let provisioner = SimulatedProvisioner {
        acquisitions: AtomicU64::new(0),
        fail_every: cli.acquire_fail_every,
    };
    let executor = SimulatedExecutor {
        flaky_every: cli.flaky_every,
        latency: Duration::from_millis(cli.task_latency_ms),
        attempts: dashmap::DashMap::new(),
    };

    let scheduler = Scheduler::new(config, provisioner, executor)?.with_progress(Arc::new(
        |update: ProgressUpdate| {
            info!(
                completed = update.completed,
                total = update.total,
                failed = update.failed,
                "progress"
            );
        },
    ));

    let snapshot = scheduler.run(tasks).await?;

    info!(
        total = snapshot.total,
        successes = snapshot.successes,
        terminal_failures = snapshot.terminal_failures,
        retry_attempts = snapshot.retry_attempts,
        "simulation finished"
    );
    println!(
        "{} tasks: {} succeeded, {} failed terminally, {} retry attempts",
        snapshot.total, snapshot.successes, snapshot.terminal_failures, snapshot.retry_attempts
    );
    Ok(())
}
