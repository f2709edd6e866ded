//! Playback session types.

use crate::error::{PlaybackError, Result};
use bridge_traits::{AudioEngine, ScheduledTask};
use std::fmt;
use std::time::Duration;
use tokio::sync::oneshot;

/// Caller-supplied token identifying a playback request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Longest accepted auto-stop interval (the channel carries a 32-bit second count).
pub const MAX_PLAY_DURATION: Duration = Duration::from_secs(i32::MAX as u64);

/// Request to play one resource for a bounded time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRequest {
    /// Filesystem path, URI, or asset-prefixed bundled resource
    pub resource_path: String,
    /// Auto-stop interval
    pub duration: Duration,
    pub session_id: SessionId,
}

impl PlayRequest {
    pub fn new(
        resource_path: impl Into<String>,
        duration: Duration,
        session_id: impl Into<SessionId>,
    ) -> Self {
        Self {
            resource_path: resource_path.into(),
            duration,
            session_id: session_id.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.resource_path.trim().is_empty() {
            return Err(PlaybackError::InvalidRequest(
                "resource path cannot be empty".to_string(),
            ));
        }

        if self.duration.is_zero() {
            return Err(PlaybackError::InvalidRequest(
                "duration must be greater than zero".to_string(),
            ));
        }

        if self.duration > MAX_PLAY_DURATION {
            return Err(PlaybackError::InvalidRequest(format!(
                "duration exceeds {} seconds",
                MAX_PLAY_DURATION.as_secs()
            )));
        }

        if self.session_id.as_str().is_empty() {
            return Err(PlaybackError::InvalidRequest(
                "session id cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Externally visible controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Preparing { session_id: SessionId },
    Playing { session_id: SessionId },
}

impl PlaybackState {
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::Idle => None,
            Self::Preparing { session_id } | Self::Playing { session_id } => Some(session_id),
        }
    }
}

pub(crate) enum SessionPhase {
    /// Waiting for the engine; `reply` resolves the pending `play`.
    Preparing {
        reply: oneshot::Sender<Result<()>>,
    },
    Playing {
        timer: Option<Box<dyn ScheduledTask>>,
    },
}

/// The single live session owned by the controller.
pub(crate) struct PlaybackSession {
    pub(crate) id: SessionId,
    pub(crate) generation: u64,
    pub(crate) duration: Duration,
    pub(crate) engine: Box<dyn AudioEngine>,
    pub(crate) phase: SessionPhase,
}

impl PlaybackSession {
    pub(crate) fn preparing(
        request: PlayRequest,
        generation: u64,
        engine: Box<dyn AudioEngine>,
        reply: oneshot::Sender<Result<()>>,
    ) -> Self {
        Self {
            id: request.session_id,
            generation,
            duration: request.duration,
            engine,
            phase: SessionPhase::Preparing { reply },
        }
    }

    pub(crate) fn state(&self) -> PlaybackState {
        let session_id = self.id.clone();
        match self.phase {
            SessionPhase::Preparing { .. } => PlaybackState::Preparing { session_id },
            SessionPhase::Playing { .. } => PlaybackState::Playing { session_id },
        }
    }
}
