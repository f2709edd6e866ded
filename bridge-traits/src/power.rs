//! Power Retention Abstraction
//!
//! Keeps the processor running while an alarm plays with the screen off.

use std::time::Duration;

use crate::error::Result;

/// How much of the device a wake-lock keeps awake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeLockLevel {
    /// CPU only; screen and keyboard backlight may turn off.
    Partial,
}

/// Device power service.
///
/// # Platform Support
///
/// - **Android**: `PowerManager.newWakeLock`
/// - **iOS**: background audio session (no explicit lock)
/// - **Desktop**: inhibitor APIs, or a timed in-process lock for headless hosts
pub trait PowerManager: Send + Sync {
    /// Create a wake-lock handle. The returned lock is not yet held.
    fn new_wake_lock(&self, level: WakeLockLevel, tag: &str) -> Result<Box<dyn WakeLock>>;
}

/// A non-reference-counted wake-lock.
///
/// Acquiring an already held lock extends it; releasing a lock that is not
/// held is an error, so callers check [`WakeLock::is_held`] first.
pub trait WakeLock: Send + Sync {
    /// Hold the lock for at most `timeout`.
    fn acquire(&self, timeout: Duration) -> Result<()>;

    fn release(&self) -> Result<()>;

    /// Whether the lock is currently held (a timed-out lock is not).
    fn is_held(&self) -> bool;
}
