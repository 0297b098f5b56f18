use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::service::{Service, ServiceError, ServiceState};

/// Mutable part of a supervised service, guarded by one lock.
struct Slot {
    state: ServiceState,
    /// Token of the current run, present only while Running
    cancel: Option<CancellationToken>,
    /// Sticky: only ever replaced by a newer failure
    last_error: Option<Arc<ServiceError>>,
    /// Incremented on every start; results of older runs are discarded
    generation: u64,
}

/// A [`Service`] together with its observable state.
///
/// Every state transition happens under the per-service lock, so the
/// supervising caller and the completion handler of the service task never
/// race on `state`/`last_error`.
pub struct SupervisedService {
    title: String,
    service: Arc<dyn Service>,
    slot: Mutex<Slot>,
}

impl fmt::Debug for SupervisedService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupervisedService")
            .field("title", &self.title)
            .field("state", &self.state())
            .finish()
    }
}

impl SupervisedService {
    pub fn new(title: impl Into<String>, service: Arc<dyn Service>) -> Self {
        Self {
            title: title.into(),
            service,
            slot: Mutex::new(Slot {
                state: ServiceState::Stopped,
                cancel: None,
                last_error: None,
                generation: 0,
            }),
        }
    }

    // The slot holds plain data, so a poisoned lock is still consistent.
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> ServiceState {
        self.slot().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == ServiceState::Running
    }

    /// Error of the most recent failed run, kept after later clean runs.
    pub fn last_error(&self) -> Option<Arc<ServiceError>> {
        self.slot().last_error.clone()
    }

    /// Start the service on the current tokio runtime, scoped to `scope`.
    ///
    /// Does nothing when the service is already running. The service gets a
    /// child token of `scope`, so cancelling the scope or calling
    /// [`stop`](Self::stop) both reach it.
    pub fn run(self: &Arc<Self>, scope: &CancellationToken) {
        let mut slot = self.slot();
        if slot.state == ServiceState::Running {
            log::debug!("Service '{}' is already running", self.title);
            return;
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::error!("Cannot start service '{}': no tokio runtime", self.title);
                slot.state = ServiceState::Failed;
                slot.last_error = Some(Arc::new(ServiceError::NoRuntime));
                return;
            }
        };

        let token = scope.child_token();
        slot.generation += 1;
        slot.state = ServiceState::Running;
        slot.cancel = Some(token.clone());
        let generation = slot.generation;
        drop(slot);

        log::info!("Starting service '{}'", self.title);
        let this = Arc::clone(self);
        handle.spawn(async move {
            let service = Arc::clone(&this.service);
            // The inner task is the recovery boundary: a panic inside the
            // service surfaces here as a JoinError instead of unwinding further.
            let outcome = tokio::spawn(async move { service.run(token).await }).await;
            this.complete(generation, outcome);
        });
    }

    /// Cancel the current run and report Stopped immediately.
    ///
    /// The service task may still be finishing its cleanup when this returns.
    pub fn stop(&self) {
        let mut slot = self.slot();
        if let Some(token) = slot.cancel.take() {
            token.cancel();
        }
        if slot.state == ServiceState::Running {
            log::info!("Stopping service '{}'", self.title);
        }
        slot.state = ServiceState::Stopped;
    }

    fn complete(&self, generation: u64, outcome: Result<Result<(), ServiceError>, JoinError>) {
        let result = match outcome {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => {
                let message = panic_message(join_err.into_panic());
                log::warn!("Service '{}' panicked: {}", self.title, message);
                Err(ServiceError::Panicked { message })
            }
            // Aborted by runtime shutdown
            Err(_) => Err(ServiceError::Cancelled),
        };

        let mut slot = self.slot();
        if slot.generation != generation {
            log::warn!("Discarding result of a superseded run of service '{}'", self.title);
            return;
        }
        slot.cancel = None;

        match result {
            Ok(()) | Err(ServiceError::Cancelled) => {
                if slot.state == ServiceState::Running {
                    log::info!("Service '{}' stopped", self.title);
                    slot.state = ServiceState::Stopped;
                }
            }
            Err(err) => {
                log::error!("Service '{}' failed: {}", self.title, err);
                slot.last_error = Some(Arc::new(err));
                // An explicit stop() already decided the state.
                if slot.state == ServiceState::Running {
                    slot.state = ServiceState::Failed;
                }
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send + 'static>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
