//! Demo modules registered by the binary.
use std::future::ready;
use std::sync::Arc;
use std::time::Duration;

use keystone_core::service::JobScheduler;
use keystone_core::{BoxError, Module, ModuleSystemError, ServiceError};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

const HEARTBEAT_PERIOD: Duration = Duration::from_secs(1);
const FLUSH_PERIOD: Duration = Duration::from_secs(5);

/// `storage` opens its data directory on startup and creates the schema on `install`.
pub fn storage() -> Result<Module, ModuleSystemError> {
    let mut module = Module::new("storage", "Local persistent storage");

    let open = module.add_init_group("open")?;
    open.add_child("check-data-dir", || {
        info!("Data directory is available");
        ready(Ok::<(), BoxError>(()))
    })?;
    open.add_child("load-index", || {
        info!("Index loaded");
        ready(Ok::<(), BoxError>(()))
    })?;

    module.tag("install").add_child("create-schema", || {
        info!("Schema created");
        ready(Ok::<(), BoxError>(()))
    })?;
    Ok(module)
}

/// `metrics` depends on `storage`, schedules a periodic flush and runs the
/// `heartbeat` service.
pub fn metrics(scheduler: Option<Arc<JobScheduler>>) -> Result<Module, ModuleSystemError> {
    let mut module = Module::new("metrics", "Runtime metrics").depends_on("storage");

    module.add_init("schedule-flush", move || {
        match &scheduler {
            Some(scheduler) => scheduler.add_job("flush-metrics", FLUSH_PERIOD, || {
                info!("Flushing metrics");
                ready(Ok::<(), BoxError>(()))
            }),
            None => warn!("Job scheduler is disabled, metrics will not be flushed"),
        }
        ready(Ok::<(), BoxError>(()))
    })?;

    module.add_service("heartbeat", |cancel: CancellationToken| async move {
        let mut beats: u64 = 0;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Err::<(), ServiceError>(ServiceError::Cancelled),
                _ = tokio::time::sleep(HEARTBEAT_PERIOD) => {
                    beats += 1;
                    debug!("heartbeat #{}", beats);
                }
            }
        }
    });
    Ok(module)
}
