//! # Keystone Module System Errors
//!
//! Defines error types specific to module registration, dependency
//! resolution and initializer tree execution.
//!
//! Build-time wiring faults ([`ModuleSystemError::DuplicateModule`],
//! [`ModuleSystemError::InvalidArgument`]) are reported while modules are
//! being declared. Dependency faults are returned from
//! [`DependencyResolver::init`](crate::module_system::DependencyResolver::init)
//! before any initialization step runs. [`ModuleSystemError::StepFailed`]
//! carries the error returned by a failing initialization action.
use thiserror::Error;

/// Boxed error type returned by initialization actions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ModuleSystemError {
    #[error("Module '{name}' is already registered")]
    DuplicateModule { name: String },

    #[error("Module '{name}' not found")]
    ModuleNotFound { name: String },

    #[error("Dependency resolver has already been initialized")]
    AlreadyInitialized,

    #[error("Module '{module}' depends on '{dependency}', which is not registered")]
    MissingDependency { module: String, dependency: String },

    #[error("Circular dependency detected for module '{module}'")]
    CircularDependency { module: String },

    #[error("No registered module declares the tag '{tag}'")]
    UnknownTag { tag: String },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Initialization step '{step}' failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: BoxError,
    },
}

pub type Result<T> = std::result::Result<T, ModuleSystemError>;
