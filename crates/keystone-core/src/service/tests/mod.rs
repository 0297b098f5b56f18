#[cfg(test)]
mod supervised_tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::service::{Service, ServiceError, ServiceState, SupervisedService};

/// Polls until `service` reports `expected`, giving up after two seconds.
pub(crate) async fn wait_for_state(service: &SupervisedService, expected: ServiceState) -> bool {
    for _ in 0..200 {
        if service.state() == expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    service.state() == expected
}

/// Polls until `counter` reaches at least `target`.
pub(crate) async fn wait_for_count(counter: &AtomicUsize, target: usize) -> bool {
    for _ in 0..200 {
        if counter.load(Ordering::SeqCst) >= target {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Ticks on a timer until cancelled.
pub(crate) struct TickingService {
    pub(crate) ticks: Arc<AtomicUsize>,
    pub(crate) period: Duration,
}

impl TickingService {
    pub(crate) fn new(ticks: Arc<AtomicUsize>) -> Self {
        Self {
            ticks,
            period: Duration::from_millis(5),
        }
    }
}

#[async_trait]
impl Service for TickingService {
    async fn run(&self, cancel: CancellationToken) -> Result<(), ServiceError> {
        let mut interval = tokio::time::interval(self.period);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ServiceError::Cancelled),
                _ = interval.tick() => {
                    self.ticks.fetch_add(1, Ordering::SeqCst);
                }
            }
        }
    }
}

/// Ticks like [`TickingService`] but panics once at iteration `panic_at`.
pub(crate) struct PanickingService {
    pub(crate) ticks: Arc<AtomicUsize>,
    pub(crate) panic_at: usize,
    pub(crate) armed: Arc<AtomicBool>,
}

#[async_trait]
impl Service for PanickingService {
    async fn run(&self, cancel: CancellationToken) -> Result<(), ServiceError> {
        let mut interval = tokio::time::interval(Duration::from_millis(5));
        let mut iteration = 0;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ServiceError::Cancelled),
                _ = interval.tick() => {
                    iteration += 1;
                    self.ticks.fetch_add(1, Ordering::SeqCst);
                    if iteration == self.panic_at && self.armed.swap(false, Ordering::SeqCst) {
                        panic!("tick {} exploded", iteration);
                    }
                }
            }
        }
    }
}

/// Returns an error right away.
pub(crate) struct FailingService {
    pub(crate) message: &'static str,
}

#[async_trait]
impl Service for FailingService {
    async fn run(&self, _cancel: CancellationToken) -> Result<(), ServiceError> {
        Err(ServiceError::failed(self.message))
    }
}

/// Ignores cancellation for a while, then returns an error.
pub(crate) struct StubbornService {
    pub(crate) delay: Duration,
}

#[async_trait]
impl Service for StubbornService {
    async fn run(&self, _cancel: CancellationToken) -> Result<(), ServiceError> {
        tokio::time::sleep(self.delay).await;
        Err(ServiceError::failed("cleanup failed"))
    }
}
