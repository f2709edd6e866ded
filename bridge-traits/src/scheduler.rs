//! Deferred Task Scheduling
//!
//! One-shot delayed execution used for the playback auto-stop.

use std::time::Duration;

use crate::error::Result;

/// Work run once the delay elapses.
pub type DeferredTask = Box<dyn FnOnce() + Send + 'static>;

/// Single-shot deferred task scheduler.
///
/// The task runs on a scheduler-owned thread or task, never on the calling
/// thread before `schedule_once` returns. Callers may therefore hold locks
/// the task itself needs while scheduling.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::scheduler::DeferredScheduler;
/// use std::time::Duration;
///
/// fn arm(scheduler: &dyn DeferredScheduler) -> bridge_traits::error::Result<()> {
///     let handle = scheduler.schedule_once(
///         Duration::from_secs(10),
///         Box::new(|| tracing::info!("elapsed")),
///     )?;
///     handle.cancel();
///     Ok(())
/// }
/// ```
pub trait DeferredScheduler: Send + Sync {
    fn schedule_once(&self, delay: Duration, task: DeferredTask) -> Result<Box<dyn ScheduledTask>>;
}

/// Handle to a scheduled task.
pub trait ScheduledTask: Send + Sync {
    /// Prevent the task from running. No-op if it already ran.
    fn cancel(&self);

    /// `true` until the task runs or is cancelled.
    fn is_pending(&self) -> bool;
}
