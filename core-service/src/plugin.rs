//! Command-channel plugin for alarm playback.
//!
//! Decodes [`MethodCall`]s arriving on the playback channel, drives the
//! [`PlaybackController`] and answers every call with exactly one
//! [`MethodResponse`]. Failures never surface as channel errors: the
//! application layer only ever sees `true`/`false`, or `NotImplemented` for
//! unknown methods.

use async_trait::async_trait;
use bridge_traits::channel::{BinaryMessenger, MethodCall, MethodCallHandler, MethodResponse};
use core_playback::{PlayRequest, PlaybackController, PlaybackError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::Result;

/// Methods understood on the playback channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMethod {
    Initialize,
    PlayAudio,
    StopAudio,
    IsPlaying,
    SetVolume,
}

impl ChannelMethod {
    pub const ALL: [ChannelMethod; 5] = [
        Self::Initialize,
        Self::PlayAudio,
        Self::StopAudio,
        Self::IsPlaying,
        Self::SetVolume,
    ];

    /// Wire name of the method.
    pub fn name(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::PlayAudio => "playAudio",
            Self::StopAudio => "stopAudio",
            Self::IsPlaying => "isPlaying",
            Self::SetVolume => "setVolume",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.name() == name)
    }
}

/// Argument keys of `playAudio` and `setVolume`.
const ARG_AUDIO_PATH: &str = "audioPath";
const ARG_DURATION: &str = "duration";
const ARG_SESSION_ID: &str = "sinalId";
const ARG_VOLUME: &str = "volume";

/// Method-call handler bridging the playback channel to the controller.
pub struct AlarmAudioPlugin {
    controller: PlaybackController,
    channel: String,
}

impl AlarmAudioPlugin {
    pub fn new(controller: PlaybackController) -> Self {
        let channel = controller.settings().channel_name.clone();
        Self {
            controller,
            channel,
        }
    }

    pub fn channel_name(&self) -> &str {
        &self.channel
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    /// Register as the handler for the playback channel.
    pub fn attach(plugin: &Arc<Self>, messenger: &dyn BinaryMessenger) -> Result<()> {
        let handler: Arc<dyn MethodCallHandler> = Arc::clone(plugin) as Arc<dyn MethodCallHandler>;
        messenger.set_method_call_handler(&plugin.channel, Some(handler))?;
        info!(channel = %plugin.channel, "Alarm audio plugin attached");
        Ok(())
    }

    /// Unregister from the channel, then stop playback and drop the wake-lock.
    pub fn detach(&self, messenger: &dyn BinaryMessenger) -> Result<()> {
        let unregistered = messenger.set_method_call_handler(&self.channel, None);
        self.controller.shutdown();
        unregistered?;
        info!(channel = %self.channel, "Alarm audio plugin detached");
        Ok(())
    }

    fn handle_initialize(&self) -> bool {
        match self.controller.initialize() {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "Failed to initialize playback");
                false
            }
        }
    }

    async fn handle_play_audio(&self, call: &MethodCall) -> bool {
        let (Some(path), Some(duration), Some(session_id)) = (
            call.argument::<String>(ARG_AUDIO_PATH),
            call.argument::<u64>(ARG_DURATION),
            call.argument::<String>(ARG_SESSION_ID),
        ) else {
            warn!("playAudio called with missing or invalid arguments");
            return false;
        };

        let request = PlayRequest::new(path, Duration::from_secs(duration), session_id);
        match self.controller.play(request).await {
            Ok(()) => true,
            Err(err @ (PlaybackError::Superseded | PlaybackError::Stopped)) => {
                info!(reason = %err, "Play request ended before playback started");
                false
            }
            Err(err) => {
                error!(error = %err, "Failed to play audio");
                false
            }
        }
    }

    fn handle_set_volume(&self, call: &MethodCall) -> bool {
        let Some(volume) = call.argument::<f64>(ARG_VOLUME) else {
            warn!("setVolume called without a volume");
            return false;
        };
        self.controller.set_volume(volume as f32);
        true
    }
}

#[async_trait]
impl MethodCallHandler for AlarmAudioPlugin {
    async fn on_method_call(&self, call: MethodCall) -> MethodResponse {
        let Some(method) = ChannelMethod::from_name(&call.method) else {
            debug!(method = %call.method, "Unknown method");
            return MethodResponse::NotImplemented;
        };

        debug!(method = method.name(), "Method call received");

        let outcome = match method {
            ChannelMethod::Initialize => self.handle_initialize(),
            ChannelMethod::PlayAudio => self.handle_play_audio(&call).await,
            ChannelMethod::StopAudio => {
                self.controller.stop();
                true
            }
            ChannelMethod::IsPlaying => self.controller.is_playing(),
            ChannelMethod::SetVolume => self.handle_set_volume(&call),
        };

        MethodResponse::success(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_round_trip() {
        for method in ChannelMethod::ALL {
            assert_eq!(ChannelMethod::from_name(method.name()), Some(method));
        }
    }

    #[test]
    fn test_unknown_method_name() {
        assert_eq!(ChannelMethod::from_name("pauseAudio"), None);
        assert_eq!(ChannelMethod::from_name("PlayAudio"), None);
    }
}
