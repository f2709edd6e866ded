//! Workspace façade crate.
//!
//! Host applications can depend on `alarm-bridge-workspace` and pick a
//! feature instead of wiring each crate individually:
//! - `desktop-shims` (default): the full service with desktop bridge defaults.
//! - `playback-only`: just the playback controller; the host injects every
//!   capability itself.

#[cfg(feature = "desktop-shims")]
pub use core_service as service;

#[cfg(feature = "playback-only")]
pub use core_playback as playback;
