//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop and headless hosts
//! (macOS, Windows, Linux, CI).
//!
//! ## Overview
//!
//! This crate provides working implementations of every capability the
//! alarm playback core needs, so the core can run and be tested without a
//! mobile host:
//! - `AudioEngineFactory` as a headless engine that probes sources with `symphonia`
//! - `PowerManager` with timed wake-locks tracked against a `Clock`
//! - `DeferredScheduler` using Tokio timers and cancellation tokens
//! - `AssetResolver` reading bundled assets from a directory
//! - `BinaryMessenger` dispatching method calls in-process
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopPowerManager, HeadlessEngineFactory, TokioDeferredScheduler};
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = CoreConfig::builder()
//!         .engine_factory(Arc::new(HeadlessEngineFactory::new()))
//!         .power_manager(Arc::new(DesktopPowerManager::new()))
//!         .scheduler(Arc::new(TokioDeferredScheduler::new()))
//!         .assets_dir("assets")
//!         .build()
//!         .unwrap();
//! }
//! ```

mod assets;
mod engine;
mod messenger;
mod power;
mod scheduler;

pub use assets::DirectoryAssetResolver;
pub use engine::{
    HeadlessAudioEngine, HeadlessEngineFactory, MEDIA_ERROR_IO, MEDIA_ERROR_UNKNOWN,
    MEDIA_ERROR_UNSUPPORTED,
};
pub use messenger::InProcessMessenger;
pub use power::{DesktopPowerManager, DesktopWakeLock};
pub use scheduler::{TokioDeferredScheduler, TokioScheduledTask};
