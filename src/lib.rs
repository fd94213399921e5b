#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Rota Core
//!
//! Bounded worker-pool task scheduler with resource rotation and retry.
//!
//! ## Overview
//!
//! A fixed pool of workers drains a shared queue of opaque tasks. Each
//! worker exclusively owns an expensive, stateful resource obtained from a
//! caller-supplied provisioner — a session, a connection, a credential —
//! and rotates it after a configurable number of task attempts or
//! consecutive failures. Transient failures requeue the task under a
//! bounded retry budget; every task ends in exactly one terminal outcome,
//! `Success` or `TerminalFailure`, with nothing silently dropped.
//!
//! The scheduler knows nothing about what a task does or what a resource
//! is: both arrive through the [`TaskExecutor`] and [`ResourceProvisioner`]
//! capability traits.
//!
//! ## Module Organization
//!
//! - [`task`] - Task identity, payloads, and execution outcomes
//! - [`queue`] - Pending-task queue with safe concurrent draining
//! - [`worker`] - Worker state machine, rotation policy
//! - [`collector`] - Outcome aggregation and snapshots
//! - [`scheduler`] - Pool manager and stop handle
//! - [`provisioner`] - Resource provisioning capability, backoff acquisition
//! - [`executor`] - Task execution capability
//! - [`retry`] - Exponential backoff policy
//! - [`config`] - Configuration with YAML loading and validation
//! - [`logging`] - Structured logging setup
//! - [`error`] - Top-level error type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use rota_core::{
//!     Outcome, ProvisionError, ResourceProvisioner, Scheduler, SchedulerConfig, Task,
//!     TaskExecutor,
//! };
//!
//! struct SessionProvisioner;
//!
//! #[async_trait]
//! impl ResourceProvisioner for SessionProvisioner {
//!     type Resource = u64;
//!
//!     async fn acquire(&self) -> Result<u64, ProvisionError> {
//!         Ok(42)
//!     }
//!
//!     async fn release(&self, _session: u64) -> Result<(), ProvisionError> {
//!         Ok(())
//!     }
//! }
//!
//! struct EchoExecutor;
//!
//! #[async_trait]
//! impl TaskExecutor<u64> for EchoExecutor {
//!     async fn execute(&self, _session: &mut u64, task: &Task) -> Outcome {
//!         Outcome::Success(task.payload.clone())
//!     }
//! }
//!
//! # async fn example() -> rota_core::Result<()> {
//! let tasks: Vec<Task> = (0..10)
//!     .map(|n| Task::new(serde_json::json!({ "n": n })))
//!     .collect();
//!
//! let scheduler = Scheduler::new(SchedulerConfig::default(), SessionProvisioner, EchoExecutor)?;
//! let snapshot = scheduler.run(tasks).await?;
//! println!(
//!     "{} succeeded, {} failed",
//!     snapshot.successes, snapshot.terminal_failures
//! );
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod constants;
pub mod error;
pub mod executor;
pub mod logging;
pub mod provisioner;
pub mod queue;
pub mod retry;
pub mod scheduler;
pub mod task;
pub mod worker;

pub use collector::{ResultCollector, ResultSnapshot, TaskDisposition, TaskRecord};
pub use config::{ProvisioningConfig, RetryConfig, RotationConfig, SchedulerConfig};
pub use error::{Result, RotaError};
pub use executor::TaskExecutor;
pub use provisioner::{ProvisionError, ResourceProvisioner};
pub use retry::BackoffPolicy;
pub use scheduler::{ProgressCallback, ProgressUpdate, Scheduler, SchedulerHandle};
pub use task::{Outcome, Task, TaskId};
pub use worker::{RotationPolicy, RotationTrigger, WorkerPhase, WorkerSummary};
