//! Audio engine bridge traits and supporting types.
//!
//! The core never decodes or renders audio itself. Hosts hand it an
//! [`AudioEngineFactory`] that allocates one native player per playback
//! session (Android `MediaPlayer`, AVAudioPlayer, a desktop sink, ...). The
//! engine reports readiness, completion and failures back through an
//! [`EngineListener`].

use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Content category reported to the platform audio policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Music,
    Speech,
    /// Short or repeating signalling sounds (alarms, beeps, ringtones).
    Sonification,
    Unknown,
}

/// Usage the stream is declared for. Platforms route volume and focus
/// decisions through this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioUsage {
    Media,
    Alarm,
    Notification,
    Unknown,
}

/// Output attributes applied to an engine before a source is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioAttributes {
    pub content_type: ContentType,
    pub usage: AudioUsage,
}

impl AudioAttributes {
    /// Attributes for alarm playback: alarm usage, sonification content.
    pub fn alarm() -> Self {
        Self {
            content_type: ContentType::Sonification,
            usage: AudioUsage::Alarm,
        }
    }
}

impl Default for AudioAttributes {
    fn default() -> Self {
        Self {
            content_type: ContentType::Unknown,
            usage: AudioUsage::Media,
        }
    }
}

/// A byte range inside a file that holds one bundled asset.
///
/// Packaged assets often live inside a larger archive, so the engine must
/// only read `length` bytes starting at `start_offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub path: PathBuf,
    pub start_offset: u64,
    pub length: u64,
}

impl AssetDescriptor {
    pub fn new(path: impl Into<PathBuf>, start_offset: u64, length: u64) -> Self {
        Self {
            path: path.into(),
            start_offset,
            length,
        }
    }

    /// Offset one past the last byte of the asset.
    pub fn end_offset(&self) -> u64 {
        self.start_offset.saturating_add(self.length)
    }
}

/// Data source bound to an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Filesystem path or URI opened directly by the engine.
    Uri(String),
    /// Bundled asset addressed by descriptor.
    Asset(AssetDescriptor),
}

/// Asynchronous notifications emitted by an engine after `prepare_async`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// Preparation finished; `start` may be called.
    Ready,
    /// The clip played to its end (only reachable without looping).
    Completed,
    /// Playback or decoding failed. Codes are engine-specific.
    Error { what: i32, extra: i32 },
}

/// Receiver for engine notifications.
///
/// Implementations must return quickly and must not block; the engine may
/// invoke the listener from its own worker thread or synchronously from
/// inside `prepare_async`.
pub trait EngineListener: Send + Sync {
    fn on_event(&self, event: EngineEvent);
}

/// One native playback handle.
///
/// Every method may fail with a [`BridgeError`](crate::BridgeError); callers
/// decide which failures are fatal. After `release` the handle is unusable.
pub trait AudioEngine: Send {
    /// Configure output attributes (must precede `set_data_source`).
    fn set_audio_attributes(&mut self, attributes: AudioAttributes) -> Result<()>;

    /// Bind the data source to play.
    fn set_data_source(&mut self, source: DataSource) -> Result<()>;

    /// Replay the clip until stopped.
    fn set_looping(&mut self, looping: bool) -> Result<()>;

    /// Begin preparation without blocking. Exactly one of `Ready` or `Error`
    /// is later delivered to `listener`, unless the engine is released first.
    fn prepare_async(&mut self, listener: Arc<dyn EngineListener>) -> Result<()>;

    fn start(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    /// Free the native resources behind this handle.
    fn release(&mut self) -> Result<()>;

    fn is_playing(&self) -> Result<bool>;

    /// Per-channel gain, each in `0.0..=1.0`.
    fn set_volume(&mut self, left: f32, right: f32) -> Result<()>;
}

/// Allocates engine instances.
pub trait AudioEngineFactory: Send + Sync {
    fn create_engine(&self) -> Result<Box<dyn AudioEngine>>;
}
