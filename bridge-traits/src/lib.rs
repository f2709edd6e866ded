//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the alarm playback core and the
//! platform it runs on. Each trait is a capability the core needs but cannot
//! provide portably: a native audio player, a wake-lock, a timer, access to
//! bundled assets and the command channel to the application layer.
//!
//! ## Traits
//!
//! ### Audio
//! - [`AudioEngineFactory`](audio::AudioEngineFactory) / [`AudioEngine`](audio::AudioEngine) - Native player handles
//! - [`EngineListener`](audio::EngineListener) - Ready / completion / error notifications
//! - [`AssetResolver`](assets::AssetResolver) - Bundled asset byte ranges
//!
//! ### Platform Integration
//! - [`PowerManager`](power::PowerManager) / [`WakeLock`](power::WakeLock) - Keep the CPU awake while playing
//! - [`DeferredScheduler`](scheduler::DeferredScheduler) - One-shot timers
//! - [`BinaryMessenger`](channel::BinaryMessenger) / [`MethodCallHandler`](channel::MethodCallHandler) - Command channel
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Desktop / headless | `bridge-desktop` |
//! | Android  | host app (JNI) |
//! | iOS      | host app |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform failures into it with enough context (paths, codes)
//! to be actionable in logs.
//!
//! ## Thread Safety
//!
//! Shared capabilities are `Send + Sync`. Per-session handles
//! ([`AudioEngine`](audio::AudioEngine)) only need `Send`; the core keeps
//! them behind a lock.

pub mod assets;
pub mod audio;
pub mod channel;
pub mod error;
pub mod power;
pub mod scheduler;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use assets::AssetResolver;
pub use audio::{
    AssetDescriptor, AudioAttributes, AudioEngine, AudioEngineFactory, AudioUsage, ContentType,
    DataSource, EngineEvent, EngineListener,
};
pub use channel::{BinaryMessenger, MethodCall, MethodCallHandler, MethodResponse};
pub use power::{PowerManager, WakeLock, WakeLockLevel};
pub use scheduler::{DeferredScheduler, DeferredTask, ScheduledTask};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, SystemClock};
