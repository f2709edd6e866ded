//! # Playback Error Types
//!
//! Error types for alarm playback operations.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur while starting or running a playback session.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Request Errors
    // ========================================================================
    /// The play request is missing a path, duration or session id.
    #[error("Invalid play request: {0}")]
    InvalidRequest(String),

    // ========================================================================
    // Source Errors
    // ========================================================================
    /// Failed to open or bind the audio source.
    #[error("Failed to open audio source: {0}")]
    SourceError(String),

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The engine reported an asynchronous failure.
    #[error("Engine error (what: {what}, extra: {extra})")]
    EngineError { what: i32, extra: i32 },

    /// A host capability call failed.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// A newer play request replaced this session before it became ready.
    #[error("Session superseded by a newer play request")]
    Superseded,

    /// The session was stopped before it became ready.
    #[error("Playback stopped before it started")]
    Stopped,

    /// A required capability is not available in this process.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
