//! # Keystone Kernel
//!
//! The `kernel` module ties the subsystems together into a [`Server`].
//!
//! ## Key Responsibilities & Components:
//!
//! - **Server Bootstrapping**: [`Server`](bootstrap::Server) owns the
//!   [`DependencyResolver`](crate::module_system::DependencyResolver) and the
//!   [`Supervisor`](crate::service::Supervisor), registers modules, runs
//!   initialization once and starts/stops background services.
//! - **Core Constants**: application name, version and scheduler defaults in
//!   the `constants` submodule.
//! - **Error Handling**: the aggregated [`Error`](error::Error) type and the
//!   `Result` alias in the `error` submodule.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::Server;
pub use error::{Error, Result};
