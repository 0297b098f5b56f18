//! # Keystone Kernel Errors
//!
//! Defines [`Error`], the top-level error returned by the [`Server`](crate::kernel::Server).
//!
//! Module system and configuration failures keep their typed errors
//! ([`ModuleSystemError`], [`ConfigError`]) and are wrapped here. Service
//! failures never reach the caller; they stay on the supervised service.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::ConfigError;
use crate::module_system::error::ModuleSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Module registration, dependency resolution or initialization error
    #[error("Module system error: {0}")]
    ModuleSystem(#[from] ModuleSystemError),

    /// Configuration loading error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        message: String,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Start")]
    Start,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// The underlying module system error, if any
    pub fn as_module_error(&self) -> Option<&ModuleSystemError> {
        match self {
            Error::ModuleSystem(err) => Some(err),
            _ => None,
        }
    }
}
