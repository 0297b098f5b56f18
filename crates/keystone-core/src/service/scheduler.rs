use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::kernel::constants;
use crate::module_system::error::BoxError;
use crate::service::{Service, ServiceError};

// Stand-in due time for periods too large to add to an Instant
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

fn due_after(from: Instant, every: Duration) -> Instant {
    from.checked_add(every)
        .or_else(|| from.checked_add(FAR_FUTURE))
        .unwrap_or(from)
}

/// A unit of scheduled work
#[async_trait]
pub trait Job: Send + Sync {
    async fn execute(&self) -> Result<(), BoxError>;
}

#[async_trait]
impl<F, Fut> Job for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    async fn execute(&self) -> Result<(), BoxError> {
        (self)().await
    }
}

struct ScheduledJob {
    name: String,
    every: Duration,
    next_due: Instant,
    job: Arc<dyn Job>,
}

/// Minimal scheduled-job engine: runs registered jobs on a fixed period
/// until cancelled.
///
/// Due jobs are checked once per tick and run one after another on the
/// scheduler's own task. A failing job is logged and rescheduled.
pub struct JobScheduler {
    tick: Duration,
    jobs: Mutex<Vec<ScheduledJob>>,
}

impl fmt::Debug for JobScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobScheduler")
            .field("tick", &self.tick)
            .field("jobs", &self.job_names())
            .finish()
    }
}

impl JobScheduler {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick: if tick.is_zero() { constants::DEFAULT_SCHEDULER_TICK } else { tick },
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Register a job running every `every`, first due one period from now.
    pub fn add_job<J>(&self, name: impl Into<String>, every: Duration, job: J)
    where
        J: Job + 'static,
    {
        let name = name.into();
        log::debug!("Scheduling job '{}' every {:?}", name, every);
        self.jobs().push(ScheduledJob {
            name,
            every,
            next_due: due_after(Instant::now(), every),
            job: Arc::new(job),
        });
    }

    fn jobs(&self) -> MutexGuard<'_, Vec<ScheduledJob>> {
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn job_count(&self) -> usize {
        self.jobs().len()
    }

    pub fn job_names(&self) -> Vec<String> {
        self.jobs().iter().map(|j| j.name.clone()).collect()
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Collect due jobs and push their next due time forward.
    fn take_due(&self, now: Instant) -> Vec<(String, Arc<dyn Job>)> {
        self.jobs()
            .iter_mut()
            .filter(|j| j.next_due <= now)
            .map(|j| {
                j.next_due = due_after(now, j.every);
                (j.name.clone(), Arc::clone(&j.job))
            })
            .collect()
    }
}

#[async_trait]
impl Service for JobScheduler {
    async fn run(&self, cancel: CancellationToken) -> Result<(), ServiceError> {
        let mut ticker = time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    log::debug!("Job scheduler cancelled");
                    return Err(ServiceError::Cancelled);
                }
                now = ticker.tick() => {
                    for (name, job) in self.take_due(now) {
                        if let Err(e) = job.execute().await {
                            log::error!("Scheduled job '{}' failed: {}", name, e);
                        }
                    }
                }
            }
        }
    }
}
