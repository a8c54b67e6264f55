//! Fixed-cadence runner for scheduled tasks

use super::ScheduledTask;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

/// Runs every registered task, one after another, on each tick
///
/// Ticks never overlap: a slow run delays the next tick instead of starting a
/// second run alongside it.
pub struct TaskScheduler {
    tasks: Vec<Arc<dyn ScheduledTask>>,
    cadence: Duration,
}

impl TaskScheduler {
    pub fn new(cadence: Duration) -> Self {
        Self {
            tasks: Vec::new(),
            cadence,
        }
    }

    pub fn with_task(mut self, task: Arc<dyn ScheduledTask>) -> Self {
        self.tasks.push(task);
        self
    }

    /// Execute every task once; returns how many failed
    pub async fn run_all(&self) -> usize {
        let mut failures = 0;

        for task in &self.tasks {
            let name = task.name();
            info!(task = %name, "Running scheduled task");

            match task.execute().await {
                Ok(()) => info!(task = %name, "Scheduled task completed"),
                Err(e) => {
                    failures += 1;
                    error!(task = %name, error = %e, "Scheduled task failed");
                }
            }
        }

        failures
    }

    /// Tick until `shutdown` resolves; the first tick fires immediately
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut interval = time::interval(self.cadence);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            tasks = self.tasks.len(),
            cadence_secs = self.cadence.as_secs(),
            "Starting task scheduler"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping task scheduler");
                    break;
                }
                _ = interval.tick() => {
                    self.run_all().await;
                }
            }
        }
    }
}
