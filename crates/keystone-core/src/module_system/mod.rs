//! # Keystone Module System
//!
//! Declares server modules, resolves their dependencies and runs their
//! initialization steps.
//!
//! - [`Module`]: name, dependency names, a main [`InitializerNode`] tree and
//!   optional tagged trees for install/upgrade style one-shot actions.
//! - [`InitializerNode`]: a named, optionally executable step with nested
//!   children, executed depth-first.
//! - [`DependencyResolver`]: validates the whole graph (missing
//!   dependencies, cycles, unknown tags) and then initializes modules in
//!   dependency order, strictly one step at a time.
//!
//! ```text
//! Module::new ─► add_init / tag / add_service ─► resolver.add
//!                                                     │
//!                      init(tag) ─► validate ─► execute trees in order
//! ```
pub mod error;
pub mod initializer;
pub mod module;
pub mod resolver;

pub use error::{BoxError, ModuleSystemError};
pub use initializer::{InitAction, InitializerNode};
pub use module::{InitPlan, Module};
pub use resolver::DependencyResolver;

// Test module declaration
#[cfg(test)]
mod tests;
