//! # Keystone Service Errors
//!
//! Defines [`ServiceError`], the outcome of a failed or interrupted
//! service run. [`ServiceError::Cancelled`] is the graceful exit a service
//! returns after observing its cancellation token; every other variant moves
//! the service to `Failed` and is kept as its last error.
use thiserror::Error;

use crate::module_system::error::BoxError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Service cancelled")]
    Cancelled,

    #[error("Service failed: {message}")]
    Failed { message: String },

    #[error("Service panicked: {message}")]
    Panicked { message: String },

    #[error("No tokio runtime available to spawn the service task")]
    NoRuntime,

    #[error(transparent)]
    Other(#[from] BoxError),
}

impl ServiceError {
    pub fn failed(message: impl Into<String>) -> Self {
        ServiceError::Failed { message: message.into() }
    }

    /// Whether this is the graceful cancellation outcome
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ServiceError::Cancelled)
    }
}
