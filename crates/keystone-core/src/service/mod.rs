//! # Keystone Background Services
//!
//! Long-running units of work supervised with explicit state, fault
//! isolation and cooperative cancellation.
//!
//! - [`Service`]: the work itself, a single async call that must return once
//!   its [`CancellationToken`] is cancelled.
//! - [`SupervisedService`]: wraps a `Service` with its [`ServiceState`],
//!   last error and per-run cancellation token.
//! - [`Supervisor`]: owns every `SupervisedService` and the shared
//!   cancellation scope used for one run cycle.
//! - [`JobScheduler`]: the built-in scheduled-job engine, itself run as a
//!   supervised service.
//!
//! ## State machine
//! ```text
//! Stopped ──run()──► Running ──Ok / Cancelled──► Stopped
//!    ▲                  │
//!    └──run()── Failed ◄┘  (error or panic)
//! ```
pub mod error;
pub mod scheduler;
pub mod supervised;
pub mod supervisor;

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub use error::ServiceError;
pub use scheduler::{Job, JobScheduler};
pub use supervised::SupervisedService;
pub use supervisor::Supervisor;

/// Core trait that all background services must implement
#[async_trait]
pub trait Service: Send + Sync {
    /// Run until the work is done or `cancel` fires.
    ///
    /// Services should return `Err(ServiceError::Cancelled)` (or `Ok(())`)
    /// after observing cancellation.
    async fn run(&self, cancel: CancellationToken) -> Result<(), ServiceError>;
}

#[async_trait]
impl<F, Fut> Service for F
where
    F: Fn(CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ServiceError>> + Send,
{
    async fn run(&self, cancel: CancellationToken) -> Result<(), ServiceError> {
        (self)(cancel).await
    }
}

/// Observable state of a supervised service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    /// Not running. Initial state and the state after a clean exit or stop.
    Stopped,
    /// The service task is running
    Running,
    /// The last run returned an error or panicked
    Failed,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceState::Stopped => write!(f, "Stopped"),
            ServiceState::Running => write!(f, "Running"),
            ServiceState::Failed => write!(f, "Failed"),
        }
    }
}

// Test module declaration
#[cfg(test)]
mod tests;
