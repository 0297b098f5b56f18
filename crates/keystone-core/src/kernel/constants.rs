use std::time::Duration;

/// Application name
pub const APP_NAME: &str = "Keystone";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Title of the built-in scheduled-job service
pub const SCHEDULER_SERVICE_TITLE: &str = "scheduler";

/// Default period at which the job scheduler checks for due jobs
pub const DEFAULT_SCHEDULER_TICK: Duration = Duration::from_secs(1);
