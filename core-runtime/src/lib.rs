//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the alarm playback core:
//! - Logging and tracing infrastructure
//! - Configuration management (capability wiring and playback settings)
//!
//! Every other core crate depends on this one for its configuration types and
//! logging conventions.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder, PlaybackSettings};
pub use error::{Error, Result};
