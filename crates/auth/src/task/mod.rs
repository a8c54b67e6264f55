//! Scheduled background tasks

pub mod dispatch;
pub mod expiry_reminder;
pub mod report;
pub mod scheduler;

pub use dispatch::NotificationDispatcher;
pub use expiry_reminder::{ExpiryReminderTask, NotificationContext, ISSUERS_PAGE};
pub use report::{DispatchOutcome, DispatchStatus, RunReport, SkippedSource};
pub use scheduler::TaskScheduler;

use crate::error::Result;
use async_trait::async_trait;

/// A unit of work run on a fixed cadence
#[async_trait]
pub trait ScheduledTask: Send + Sync {
    /// Descriptive name shown to admins
    fn name(&self) -> String;

    async fn execute(&self) -> Result<()>;
}
