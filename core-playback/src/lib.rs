//! # Alarm Playback Module
//!
//! Drives alarm-style audio playback through host capabilities.
//!
//! ## Overview
//!
//! This module handles:
//! - The single playback session and its lifecycle (`PlaybackController`)
//! - Request validation and bundled-asset source resolution
//! - Wake-lock handling while audio plays
//! - Auto-stop after the requested duration
//!
//! Decoding and output are delegated to the host's
//! [`AudioEngine`](bridge_traits::AudioEngine).

pub mod controller;
pub mod error;
pub mod session;
pub mod source;

pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use session::{PlayRequest, PlaybackState, SessionId, MAX_PLAY_DURATION};
pub use source::resolve_source;
