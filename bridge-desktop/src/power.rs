//! Wake-Lock Implementation
//!
//! Desktop hosts have no CPU suspend to hold off, so the lock only tracks its
//! own hold window. This keeps the acquire/release bookkeeping observable and
//! lets the core exercise the same contract it uses on mobile.

use bridge_traits::{
    error::{BridgeError, Result},
    power::{PowerManager, WakeLock, WakeLockLevel},
    time::{Clock, SystemClock},
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Power manager handing out [`DesktopWakeLock`]s.
pub struct DesktopPowerManager {
    clock: Arc<dyn Clock>,
}

impl DesktopPowerManager {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a power manager whose locks expire against `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for DesktopPowerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerManager for DesktopPowerManager {
    fn new_wake_lock(&self, level: WakeLockLevel, tag: &str) -> Result<Box<dyn WakeLock>> {
        if tag.trim().is_empty() {
            return Err(BridgeError::OperationFailed(
                "Wake-lock tag cannot be empty".to_string(),
            ));
        }

        debug!(tag = tag, level = ?level, "Created wake-lock");

        Ok(Box::new(DesktopWakeLock {
            tag: tag.to_string(),
            clock: Arc::clone(&self.clock),
            held_until: Mutex::new(None),
        }))
    }
}

/// Timed wake-lock. Expires on its own once the acquire timeout elapses.
pub struct DesktopWakeLock {
    tag: String,
    clock: Arc<dyn Clock>,
    held_until: Mutex<Option<DateTime<Utc>>>,
}

impl DesktopWakeLock {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Instant the current hold lapses, if held.
    pub fn held_until(&self) -> Option<DateTime<Utc>> {
        let held_until = *self.held_until.lock();
        held_until.filter(|deadline| *deadline > self.clock.now())
    }
}

impl WakeLock for DesktopWakeLock {
    fn acquire(&self, timeout: Duration) -> Result<()> {
        let timeout = chrono::Duration::from_std(timeout).map_err(|e| {
            BridgeError::OperationFailed(format!("Invalid wake-lock timeout: {}", e))
        })?;
        let deadline = self.clock.now() + timeout;

        let mut held_until = self.held_until.lock();
        let extended = match *held_until {
            Some(current) if current > deadline => current,
            _ => deadline,
        };
        *held_until = Some(extended);

        debug!(tag = %self.tag, until = %extended, "Wake-lock acquired");
        Ok(())
    }

    fn release(&self) -> Result<()> {
        let now = self.clock.now();
        let mut held_until = self.held_until.lock();
        match held_until.take() {
            Some(deadline) if deadline > now => {
                debug!(tag = %self.tag, "Wake-lock released");
                Ok(())
            }
            _ => Err(BridgeError::InvalidState(format!(
                "Wake-lock {} released while not held",
                self.tag
            ))),
        }
    }

    fn is_held(&self) -> bool {
        self.held_until().is_some()
    }
}
