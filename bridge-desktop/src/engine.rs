//! Headless Audio Engine
//!
//! Implements the native player contract without an output device. Sources
//! are opened and probed with Symphonia, so unreadable or undecodable clips
//! fail preparation exactly as a real player would, and clip length drives
//! the completion notification when looping is off.

use bridge_traits::{
    audio::{
        AudioAttributes, AudioEngine, AudioEngineFactory, DataSource, EngineEvent,
        EngineListener,
    },
    error::{BridgeError, Result},
};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Generic failure reported in `EngineEvent::Error::what`.
pub const MEDIA_ERROR_UNKNOWN: i32 = 1;

/// Source could not be read; reported in `EngineEvent::Error::extra`.
pub const MEDIA_ERROR_IO: i32 = -1004;

/// Source was read but is not a playable audio stream.
pub const MEDIA_ERROR_UNSUPPORTED: i32 = -1010;

/// Factory for [`HeadlessAudioEngine`]s.
#[derive(Debug, Clone, Default)]
pub struct HeadlessEngineFactory {
    handle: Option<Handle>,
}

impl HeadlessEngineFactory {
    /// Engines run their background work on the caller's runtime.
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Engines run their background work on `handle`.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}

impl AudioEngineFactory for HeadlessEngineFactory {
    fn create_engine(&self) -> Result<Box<dyn AudioEngine>> {
        Ok(Box::new(HeadlessAudioEngine::new(self.handle.clone())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Initialized,
    Preparing,
    Prepared,
    Started,
    Stopped,
    Released,
}

struct EngineState {
    phase: Phase,
    attributes: AudioAttributes,
    source: Option<DataSource>,
    looping: bool,
    volume: (f32, f32),
    clip_duration: Option<Duration>,
    listener: Option<Arc<dyn EngineListener>>,
    completion: Option<CancellationToken>,
    prepare_epoch: u64,
}

/// A player with no audio output.
///
/// Tracks the same state transitions as a platform media player: data source
/// only while idle, `start` only once prepared, nothing after `release`.
pub struct HeadlessAudioEngine {
    state: Arc<Mutex<EngineState>>,
    handle: Option<Handle>,
}

impl HeadlessAudioEngine {
    pub fn new(handle: Option<Handle>) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState {
                phase: Phase::Idle,
                attributes: AudioAttributes::default(),
                source: None,
                looping: false,
                volume: (1.0, 1.0),
                clip_duration: None,
                listener: None,
                completion: None,
                prepare_epoch: 0,
            })),
            handle,
        }
    }

    pub fn attributes(&self) -> AudioAttributes {
        self.state.lock().attributes
    }

    pub fn volume(&self) -> (f32, f32) {
        self.state.lock().volume
    }

    /// Length of the prepared clip, when the container reports one.
    pub fn clip_duration(&self) -> Option<Duration> {
        self.state.lock().clip_duration
    }

    fn runtime(&self) -> Result<Handle> {
        match &self.handle {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current().map_err(|_| {
                BridgeError::NotAvailable("No Tokio runtime available for the engine".to_string())
            }),
        }
    }

    fn ensure_usable(state: &EngineState) -> Result<()> {
        if state.phase == Phase::Released {
            return Err(BridgeError::InvalidState("Engine already released".to_string()));
        }
        Ok(())
    }

    fn cancel_completion(state: &mut EngineState) {
        if let Some(token) = state.completion.take() {
            token.cancel();
        }
    }

    fn arm_completion(&self, state: &mut EngineState) {
        let Some(clip) = state.clip_duration else {
            return;
        };
        if state.looping {
            return;
        }

        let runtime = match self.runtime() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(error = %err, "Completion notification unavailable");
                return;
            }
        };

        let token = CancellationToken::new();
        state.completion = Some(token.clone());
        let shared = Arc::clone(&self.state);

        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(clip) => {
                    let listener = {
                        let mut state = shared.lock();
                        if token.is_cancelled() || state.phase != Phase::Started {
                            return;
                        }
                        state.phase = Phase::Prepared;
                        state.completion = None;
                        state.listener.clone()
                    };
                    if let Some(listener) = listener {
                        listener.on_event(EngineEvent::Completed);
                    }
                }
            }
        });
    }
}

impl AudioEngine for HeadlessAudioEngine {
    fn set_audio_attributes(&mut self, attributes: AudioAttributes) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_usable(&state)?;
        state.attributes = attributes;
        Ok(())
    }

    fn set_data_source(&mut self, source: DataSource) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_usable(&state)?;
        if state.phase != Phase::Idle {
            return Err(BridgeError::InvalidState(
                "Data source can only be set on an idle engine".to_string(),
            ));
        }
        state.source = Some(source);
        state.phase = Phase::Initialized;
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_usable(&state)?;
        state.looping = looping;
        Ok(())
    }

    fn prepare_async(&mut self, listener: Arc<dyn EngineListener>) -> Result<()> {
        let runtime = self.runtime()?;

        let (source, epoch) = {
            let mut state = self.state.lock();
            Self::ensure_usable(&state)?;
            let source = match (&state.phase, &state.source) {
                (Phase::Initialized | Phase::Stopped, Some(source)) => source.clone(),
                _ => {
                    return Err(BridgeError::InvalidState(
                        "Engine must have a data source before preparing".to_string(),
                    ))
                }
            };
            state.phase = Phase::Preparing;
            state.listener = Some(Arc::clone(&listener));
            state.prepare_epoch += 1;
            (source, state.prepare_epoch)
        };

        let shared = Arc::clone(&self.state);
        runtime.spawn_blocking(move || {
            let probed = probe_source(&source);

            let event = {
                let mut state = shared.lock();
                if state.phase != Phase::Preparing || state.prepare_epoch != epoch {
                    debug!("Preparation result discarded");
                    return;
                }
                match probed {
                    Ok(clip_duration) => {
                        state.phase = Phase::Prepared;
                        state.clip_duration = clip_duration;
                        EngineEvent::Ready
                    }
                    Err(extra) => {
                        state.phase = Phase::Initialized;
                        EngineEvent::Error {
                            what: MEDIA_ERROR_UNKNOWN,
                            extra,
                        }
                    }
                }
            };

            listener.on_event(event);
        });

        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_usable(&state)?;
        match state.phase {
            Phase::Started => Ok(()),
            Phase::Prepared => {
                state.phase = Phase::Started;
                self.arm_completion(&mut state);
                Ok(())
            }
            phase => Err(BridgeError::InvalidState(format!(
                "Cannot start engine in {:?} state",
                phase
            ))),
        }
    }

    fn stop(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_usable(&state)?;
        match state.phase {
            Phase::Prepared | Phase::Started | Phase::Stopped => {
                Self::cancel_completion(&mut state);
                state.phase = Phase::Stopped;
                Ok(())
            }
            phase => Err(BridgeError::InvalidState(format!(
                "Cannot stop engine in {:?} state",
                phase
            ))),
        }
    }

    fn release(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        Self::cancel_completion(&mut state);
        state.phase = Phase::Released;
        state.listener = None;
        state.source = None;
        Ok(())
    }

    fn is_playing(&self) -> Result<bool> {
        let state = self.state.lock();
        Self::ensure_usable(&state)?;
        Ok(state.phase == Phase::Started)
    }

    fn set_volume(&mut self, left: f32, right: f32) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_usable(&state)?;
        state.volume = (left.clamp(0.0, 1.0), right.clamp(0.0, 1.0));
        Ok(())
    }
}

/// Open and probe `source`, returning the clip length.
///
/// Failures are reported as the `extra` code of an engine error.
fn probe_source(source: &DataSource) -> std::result::Result<Option<Duration>, i32> {
    let (media, hint) = open_media(source).map_err(|err| {
        warn!(error = %err, "Failed to open audio source");
        MEDIA_ERROR_IO
    })?;

    let stream = MediaSourceStream::new(media, Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| {
            warn!(error = %err, "Format probe failed");
            MEDIA_ERROR_IO
        })?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(MEDIA_ERROR_UNSUPPORTED)?;

    symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|err| {
            warn!(error = %err, "No decoder for track");
            MEDIA_ERROR_UNSUPPORTED
        })?;

    let duration = match (track.codec_params.n_frames, track.codec_params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => {
            Some(Duration::from_secs_f64(frames as f64 / rate as f64))
        }
        _ => None,
    };

    debug!(duration = ?duration, "Source prepared");
    Ok(duration)
}

fn open_media(source: &DataSource) -> Result<(Box<dyn MediaSource>, Hint)> {
    match source {
        DataSource::Uri(uri) => {
            // Local files only. Mobile engines also stream network and content
            // URIs; the headless engine has no transport for them.
            let path = match uri.strip_prefix("file://") {
                Some(path) => path,
                None if uri.contains("://") => {
                    return Err(BridgeError::NotAvailable(format!(
                        "Unsupported URI scheme: {}",
                        uri
                    )))
                }
                None => uri.as_str(),
            };
            let path = Path::new(path);
            let file = File::open(path)?;
            Ok((Box::new(file), hint_for(path)))
        }
        DataSource::Asset(descriptor) => {
            let mut file = File::open(&descriptor.path)?;
            file.seek(SeekFrom::Start(descriptor.start_offset))?;

            let mut data = Vec::new();
            file.take(descriptor.length).read_to_end(&mut data)?;

            Ok((Box::new(Cursor::new(data)), hint_for(&descriptor.path)))
        }
    }
}

fn hint_for(path: &Path) -> Hint {
    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }
    hint
}
