//! Deferred Task Scheduling using Tokio timers

use bridge_traits::{
    error::{BridgeError, Result},
    scheduler::{DeferredScheduler, DeferredTask, ScheduledTask},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Tokio-based one-shot scheduler.
///
/// Each scheduled task is a spawned timer racing a [`CancellationToken`].
/// Without an explicit runtime handle the scheduler uses the runtime of the
/// calling thread, so `schedule_once` fails with `NotAvailable` outside one.
#[derive(Debug, Clone, Default)]
pub struct TokioDeferredScheduler {
    handle: Option<Handle>,
}

impl TokioDeferredScheduler {
    /// Create a scheduler bound to the caller's runtime.
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Create a scheduler that always spawns onto `handle`.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    fn runtime(&self) -> Result<Handle> {
        match &self.handle {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current().map_err(|_| {
                BridgeError::NotAvailable("No Tokio runtime available for timers".to_string())
            }),
        }
    }
}

impl DeferredScheduler for TokioDeferredScheduler {
    fn schedule_once(&self, delay: Duration, task: DeferredTask) -> Result<Box<dyn ScheduledTask>> {
        let runtime = self.runtime()?;
        let state = Arc::new(TimerState {
            token: CancellationToken::new(),
            fired: AtomicBool::new(false),
        });

        debug!(delay_ms = delay.as_millis() as u64, "Scheduling deferred task");

        let timer = Arc::clone(&state);
        runtime.spawn(async move {
            tokio::select! {
                _ = timer.token.cancelled() => {
                    debug!("Deferred task cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    if timer.token.is_cancelled() || timer.fired.swap(true, Ordering::SeqCst) {
                        return;
                    }
                    task();
                }
            }
        });

        Ok(Box::new(TokioScheduledTask { state }))
    }
}

struct TimerState {
    token: CancellationToken,
    fired: AtomicBool,
}

/// Handle returned by [`TokioDeferredScheduler`].
pub struct TokioScheduledTask {
    state: Arc<TimerState>,
}

impl ScheduledTask for TokioScheduledTask {
    fn cancel(&self) {
        self.state.token.cancel();
    }

    fn is_pending(&self) -> bool {
        !self.state.token.is_cancelled() && !self.state.fired.load(Ordering::SeqCst)
    }
}
