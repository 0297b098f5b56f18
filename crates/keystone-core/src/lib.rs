pub mod config;
pub mod kernel;
pub mod module_system;
pub mod service;

// Re-export key public types/traits for easier use by the binary
pub use config::ServerConfig;
pub use kernel::Server;
pub use kernel::error::Error as KernelError;
pub use module_system::{BoxError, DependencyResolver, InitializerNode, Module, ModuleSystemError};
pub use service::{Service, ServiceError, ServiceState, Supervisor, SupervisedService};
