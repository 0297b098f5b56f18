use std::future::Future;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::module_system::{DependencyResolver, Module};
use crate::service::Supervisor;

/// Server instance owning one dependency resolver and one supervisor.
///
/// Lifecycle: register modules (build phase) → [`init`](Self::init) once →
/// [`start_services`](Self::start_services) → [`stop_services`](Self::stop_services).
/// Several servers can live in one process; nothing here is global.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    resolver: DependencyResolver,
    supervisor: Arc<Supervisor>,
}

impl Server {
    /// Creates a server with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        log::info!("Creating {} v{}", constants::APP_NAME, constants::APP_VERSION);
        let supervisor = Arc::new(Supervisor::with_config(&config.scheduler));
        Self {
            config,
            resolver: DependencyResolver::new(),
            supervisor,
        }
    }

    /// Register a module and hand its declared services to the supervisor.
    ///
    /// After [`init`](Self::init) the module is initialized immediately and
    /// its services are handed over only once that succeeded. A rejected or
    /// failing module registers no services.
    pub async fn register_module(&mut self, mut module: Module) -> Result<()> {
        let name = module.name().to_string();
        let services = module.take_services();
        if self.resolver.is_initialized() {
            log::info!("Initializing late module '{}'", name);
        }
        self.resolver.add(module).await?;

        for (title, service) in services {
            log::debug!("Module '{}' declares service '{}'", name, title);
            self.supervisor.add_shared(title, service);
        }
        Ok(())
    }

    /// Validate the module graph and run initialization once.
    ///
    /// An empty `tag` means normal startup; any other value runs the
    /// tag-scoped trees.
    pub async fn init(&mut self, tag: &str) -> Result<()> {
        self.resolver.init(tag).await.map_err(Error::from)
    }

    /// Start every registered service.
    pub fn start_services(&self) -> Result<()> {
        if !self.resolver.is_initialized() {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Start,
                message: "modules must be initialized before services start".to_string(),
            });
        }
        self.supervisor.run();
        Ok(())
    }

    /// Request cancellation of every running service without waiting.
    pub fn stop_services(&self) -> Result<()> {
        if !self.supervisor.is_running() {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Shutdown,
                message: "services are not running".to_string(),
            });
        }
        self.supervisor.stop();
        Ok(())
    }

    /// Initialize and, for a normal startup, supervise services until
    /// `shutdown` resolves.
    ///
    /// A tagged run is a one-shot action: it returns right after the tagged
    /// initialization without starting services.
    pub async fn run<F>(&mut self, tag: &str, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.init(tag).await?;
        if !tag.is_empty() {
            log::info!("Action '{}' completed", tag);
            return Ok(());
        }

        self.start_services()?;
        log::info!("{} running", constants::APP_NAME);
        shutdown.await;
        log::info!("Shutting down");
        self.stop_services()
    }

    pub fn supervisor(&self) -> Arc<Supervisor> {
        Arc::clone(&self.supervisor)
    }

    pub fn resolver(&self) -> &DependencyResolver {
        &self.resolver
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}
