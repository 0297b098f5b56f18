use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::kernel::constants;
use crate::service::{JobScheduler, Service, ServiceState, SupervisedService};

/// Owns every background service and the cancellation scope of the current
/// run cycle.
///
/// Services run as independent tokio tasks; nothing orders them relative to
/// each other. [`stop`](Self::stop) only requests cancellation and never
/// waits for the tasks, so callers poll [`SupervisedService::state`] when they
/// need to observe the exit.
pub struct Supervisor {
    services: Mutex<Vec<Arc<SupervisedService>>>,
    /// Shared scope, replaced (never reused) on every `run()`
    scope: Mutex<CancellationToken>,
    running: AtomicBool,
    scheduler: Option<Arc<JobScheduler>>,
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("services", &self.states())
            .field("running", &self.is_running())
            .finish()
    }
}

impl Supervisor {
    /// Create a supervisor with the default scheduler configuration
    pub fn new() -> Self {
        Self::with_config(&SchedulerConfig::default())
    }

    /// Create a supervisor; registers the built-in job scheduler service when enabled.
    pub fn with_config(config: &SchedulerConfig) -> Self {
        let mut supervisor = Self {
            services: Mutex::new(Vec::new()),
            scope: Mutex::new(CancellationToken::new()),
            running: AtomicBool::new(false),
            scheduler: None,
        };

        if config.enabled {
            let scheduler = Arc::new(JobScheduler::new(Duration::from_millis(config.tick_interval_ms)));
            supervisor.register(constants::SCHEDULER_SERVICE_TITLE, scheduler.clone());
            supervisor.scheduler = Some(scheduler);
        }
        supervisor
    }

    fn services(&self) -> MutexGuard<'_, Vec<Arc<SupervisedService>>> {
        self.services.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current_scope(&self) -> CancellationToken {
        self.scope.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    fn register(&self, title: &str, service: Arc<dyn Service>) -> Arc<SupervisedService> {
        let supervised = Arc::new(SupervisedService::new(title, service));
        self.services().push(Arc::clone(&supervised));
        log::debug!("Registered service '{}'", title);
        supervised
    }

    /// Register a service. When the supervisor is running the service starts immediately.
    pub fn add<S>(&self, title: impl Into<String>, service: S) -> Arc<SupervisedService>
    where
        S: Service + 'static,
    {
        self.add_shared(title, Arc::new(service))
    }

    /// Same as [`add`](Self::add) for a service that is already shared.
    pub fn add_shared(&self, title: impl Into<String>, service: Arc<dyn Service>) -> Arc<SupervisedService> {
        let title = title.into();
        let supervised = self.register(&title, service);
        if self.is_running() {
            supervised.run(&self.current_scope());
        }
        supervised
    }

    /// Start every registered service under a fresh cancellation scope.
    pub fn run(&self) {
        let scope = CancellationToken::new();
        *self.scope.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = scope.clone();
        self.running.store(true, Ordering::SeqCst);

        let services: Vec<Arc<SupervisedService>> = self.services().clone();
        log::info!("Starting {} services", services.len());
        for service in &services {
            service.run(&scope);
        }
    }

    /// Cancel the shared scope. Returns without waiting for services to exit.
    pub fn stop(&self) {
        log::info!("Stopping services");
        self.current_scope().cancel();
        self.running.store(false, Ordering::SeqCst);
    }

    /// Stop a single service by title. Returns false when no service has that title.
    pub fn stop_service(&self, title: &str) -> bool {
        match self.service(title) {
            Some(service) => {
                service.stop();
                true
            }
            None => false,
        }
    }

    /// First service registered under `title`
    pub fn service(&self, title: &str) -> Option<Arc<SupervisedService>> {
        self.services().iter().find(|s| s.title() == title).cloned()
    }

    /// All services in registration order
    pub fn all_services(&self) -> Vec<Arc<SupervisedService>> {
        self.services().clone()
    }

    /// Snapshot of (title, state) pairs in registration order
    pub fn states(&self) -> Vec<(String, ServiceState)> {
        self.services()
            .iter()
            .map(|s| (s.title().to_string(), s.state()))
            .collect()
    }

    pub fn service_count(&self) -> usize {
        self.services().len()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The built-in job scheduler, if enabled
    pub fn scheduler(&self) -> Option<Arc<JobScheduler>> {
        self.scheduler.clone()
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}
