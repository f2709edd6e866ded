//! # Playback Controller
//!
//! Owns the single alarm playback session and every OS resource tied to it:
//! the engine handle, the wake-lock and the auto-stop timer.
//!
//! ## State Machine
//!
//! ```text
//! Idle --play--> Preparing --Ready--> Playing --stop/timer/complete/error--> Idle
//!                    |                                  ^
//!                    +------- error / stop / replace ---+
//! ```
//!
//! ## Concurrency
//!
//! All state sits behind one mutex. Engine notifications are pushed into a
//! channel tagged with the session generation and applied by a single event
//! task, so they never re-enter the controller while a command holds the
//! lock. The auto-stop timer compares its generation and tears down inside
//! the same critical section, so a timer armed for an earlier session can
//! never stop a later one.

use crate::error::{PlaybackError, Result};
use crate::session::{PlayRequest, PlaybackSession, PlaybackState, SessionPhase};
use crate::source::resolve_source;
use bridge_traits::{
    AssetResolver, AudioAttributes, AudioEngine, AudioEngineFactory, DeferredScheduler,
    EngineEvent, EngineListener, PowerManager, WakeLock, WakeLockLevel,
};
use core_runtime::config::{CoreConfig, PlaybackSettings};
use parking_lot::Mutex;
use std::mem;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

type EventSender = mpsc::UnboundedSender<(u64, EngineEvent)>;
type EventReceiver = mpsc::UnboundedReceiver<(u64, EngineEvent)>;

/// Alarm playback controller.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct PlaybackController {
    shared: Arc<Shared>,
}

struct Shared {
    me: Weak<Shared>,
    engine_factory: Arc<dyn AudioEngineFactory>,
    power_manager: Arc<dyn PowerManager>,
    scheduler: Arc<dyn DeferredScheduler>,
    asset_resolver: Arc<dyn AssetResolver>,
    settings: PlaybackSettings,
    events: EventSender,
    state: Mutex<ControllerState>,
}

#[derive(Default)]
struct ControllerState {
    wake_lock: Option<Box<dyn WakeLock>>,
    session: Option<PlaybackSession>,
    generation: u64,
}

/// Why a session is being torn down.
enum StopReason {
    Requested,
    Replaced,
    Completed,
    TimerElapsed,
    Shutdown,
    Failed(PlaybackError),
}

impl StopReason {
    fn label(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Replaced => "replaced",
            Self::Completed => "completed",
            Self::TimerElapsed => "timer_elapsed",
            Self::Shutdown => "shutdown",
            Self::Failed(_) => "failed",
        }
    }

    /// Outcome delivered to a `play` call still waiting on preparation.
    fn into_pending_error(self) -> PlaybackError {
        match self {
            Self::Replaced => PlaybackError::Superseded,
            Self::Failed(err) => err,
            _ => PlaybackError::Stopped,
        }
    }
}

struct SessionListener {
    generation: u64,
    events: EventSender,
}

impl EngineListener for SessionListener {
    fn on_event(&self, event: EngineEvent) {
        // Receiver only closes when the controller is gone.
        let _ = self.events.send((self.generation, event));
    }
}

impl PlaybackController {
    /// Create a controller from a built configuration.
    ///
    /// Must be called within a Tokio runtime; the controller's event task
    /// is spawned on it.
    pub fn new(config: &CoreConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| PlaybackError::CapabilityMissing {
            capability: "tokio runtime".to_string(),
            message: "PlaybackController must be created inside a Tokio runtime".to_string(),
        })?;

        let (events, receiver) = mpsc::unbounded_channel();
        let shared = Arc::new_cyclic(|me| Shared {
            me: me.clone(),
            engine_factory: Arc::clone(&config.engine_factory),
            power_manager: Arc::clone(&config.power_manager),
            scheduler: Arc::clone(&config.scheduler),
            asset_resolver: Arc::clone(&config.asset_resolver),
            settings: config.playback.clone(),
            events,
            state: Mutex::new(ControllerState::default()),
        });

        runtime.spawn(run_event_loop(Arc::downgrade(&shared), receiver));

        Ok(Self { shared })
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.shared.settings
    }

    /// Create the playback wake-lock handle. Does not acquire it.
    ///
    /// Idempotent: an existing handle is kept.
    pub fn initialize(&self) -> Result<()> {
        let mut state = self.shared.state.lock();
        if state.wake_lock.is_some() {
            debug!("Wake-lock already created");
            return Ok(());
        }

        let lock = self
            .shared
            .power_manager
            .new_wake_lock(WakeLockLevel::Partial, &self.shared.settings.wake_lock_tag)?;
        state.wake_lock = Some(lock);

        info!(tag = %self.shared.settings.wake_lock_tag, "Playback controller initialized");
        Ok(())
    }

    /// Start a new session, replacing any current one.
    ///
    /// Resolves once the engine is ready and playing, or with the error that
    /// ended the session first.
    #[instrument(skip(self, request), fields(session_id = %request.session_id))]
    pub async fn play(&self, request: PlayRequest) -> Result<()> {
        request.validate()?;

        let ready = self.shared.begin_session(request)?;
        match ready.await {
            Ok(outcome) => outcome,
            Err(_) => Err(PlaybackError::Stopped),
        }
    }

    /// Stop playback and release every session resource. Never fails.
    pub fn stop(&self) {
        let mut state = self.shared.state.lock();
        self.shared.teardown(&mut state, StopReason::Requested);
    }

    /// Whether the engine is audibly playing. Query errors read as `false`.
    pub fn is_playing(&self) -> bool {
        let state = self.shared.state.lock();
        let Some(session) = state.session.as_ref() else {
            return false;
        };
        if let SessionPhase::Preparing { .. } = session.phase {
            return false;
        }

        session.engine.is_playing().unwrap_or_else(|err| {
            warn!(error = %err, "Engine state query failed");
            false
        })
    }

    /// Apply `level` to both channels, clamped to `0.0..=1.0`.
    ///
    /// No-op without a session.
    pub fn set_volume(&self, level: f32) {
        let level = clamp_volume(level);
        let mut state = self.shared.state.lock();
        let Some(session) = state.session.as_mut() else {
            debug!(level, "No session; volume ignored");
            return;
        };

        match session.engine.set_volume(level, level) {
            Ok(()) => debug!(level, "Volume applied"),
            Err(err) => warn!(error = %err, level, "Failed to set volume"),
        }
    }

    pub fn state(&self) -> PlaybackState {
        let state = self.shared.state.lock();
        state
            .session
            .as_ref()
            .map(PlaybackSession::state)
            .unwrap_or(PlaybackState::Idle)
    }

    /// Stop playback and drop the wake-lock handle.
    pub fn shutdown(&self) {
        let mut state = self.shared.state.lock();
        self.shared.teardown(&mut state, StopReason::Shutdown);
        state.wake_lock = None;
        debug!("Playback controller shut down");
    }
}

impl Shared {
    fn begin_session(&self, request: PlayRequest) -> Result<oneshot::Receiver<Result<()>>> {
        let mut state = self.state.lock();
        self.teardown(&mut state, StopReason::Replaced);

        state.generation += 1;
        let generation = state.generation;

        let mut engine = self.engine_factory.create_engine()?;
        if let Err(err) = self.configure_engine(engine.as_mut(), &request, generation) {
            error!(error = %err, generation, "Failed to set up engine");
            if let Err(release_err) = engine.release() {
                warn!(error = %release_err, "Failed to release engine");
            }
            return Err(err);
        }

        info!(
            generation,
            duration_secs = request.duration.as_secs(),
            "Preparing playback"
        );

        let (reply, ready) = oneshot::channel();
        state.session = Some(PlaybackSession::preparing(request, generation, engine, reply));
        Ok(ready)
    }

    fn configure_engine(
        &self,
        engine: &mut dyn AudioEngine,
        request: &PlayRequest,
        generation: u64,
    ) -> Result<()> {
        engine.set_audio_attributes(AudioAttributes::alarm())?;

        let source = resolve_source(
            &request.resource_path,
            &self.settings.asset_prefix,
            self.asset_resolver.as_ref(),
        )?;
        engine
            .set_data_source(source)
            .map_err(|e| PlaybackError::SourceError(e.to_string()))?;

        engine.set_looping(true)?;
        engine.prepare_async(Arc::new(SessionListener {
            generation,
            events: self.events.clone(),
        }))?;
        Ok(())
    }

    fn handle_event(&self, generation: u64, event: EngineEvent) {
        let mut state = self.state.lock();
        let current = state.session.as_ref().map(|s| s.generation);
        if current != Some(generation) {
            debug!(generation, event = ?event, "Ignoring notification from stale session");
            return;
        }

        match event {
            EngineEvent::Ready => self.on_ready(&mut state),
            EngineEvent::Completed => {
                info!(generation, "Playback completed");
                self.teardown(&mut state, StopReason::Completed);
            }
            EngineEvent::Error { what, extra } => {
                error!(generation, what, extra, "Engine reported an error");
                self.teardown(
                    &mut state,
                    StopReason::Failed(PlaybackError::EngineError { what, extra }),
                );
            }
        }
    }

    fn on_ready(&self, state: &mut ControllerState) {
        let ControllerState {
            wake_lock, session, ..
        } = &mut *state;
        let Some(session) = session.as_mut() else {
            return;
        };
        if let SessionPhase::Playing { .. } = session.phase {
            debug!(generation = session.generation, "Duplicate ready notification");
            return;
        }

        if let Err(err) = session.engine.start() {
            error!(error = %err, "Failed to start engine");
            self.teardown(state, StopReason::Failed(err.into()));
            return;
        }

        if let Some(lock) = wake_lock.as_ref() {
            if !lock.is_held() {
                let timeout = session.duration.saturating_add(self.settings.wake_lock_margin);
                match lock.acquire(timeout) {
                    Ok(()) => debug!(timeout_ms = timeout.as_millis() as u64, "Wake-lock acquired"),
                    Err(err) => warn!(error = %err, "Failed to acquire wake-lock"),
                }
            }
        } else {
            debug!("No wake-lock handle; playing without one");
        }

        let generation = session.generation;
        let me = self.me.clone();
        let timer = self.scheduler.schedule_once(
            session.duration,
            Box::new(move || {
                if let Some(shared) = me.upgrade() {
                    shared.stop_if_current(generation);
                }
            }),
        );
        let timer = match timer {
            Ok(timer) => timer,
            Err(err) => {
                error!(error = %err, "Failed to schedule auto-stop");
                self.teardown(state, StopReason::Failed(err.into()));
                return;
            }
        };

        let previous = mem::replace(
            &mut session.phase,
            SessionPhase::Playing { timer: Some(timer) },
        );
        if let SessionPhase::Preparing { reply } = previous {
            let _ = reply.send(Ok(()));
        }

        info!(
            session_id = %session.id,
            generation,
            duration_secs = session.duration.as_secs(),
            "Playback started"
        );
    }

    fn stop_if_current(&self, generation: u64) {
        let mut state = self.state.lock();
        match state.session.as_ref() {
            Some(session) if session.generation == generation => {
                info!(generation, "Auto-stop timer elapsed");
                self.teardown(&mut state, StopReason::TimerElapsed);
            }
            _ => debug!(generation, "Auto-stop timer for a finished session"),
        }
    }

    /// Release the current session, if any, and the wake-lock.
    fn teardown(&self, state: &mut ControllerState, reason: StopReason) {
        if let Some(session) = state.session.take() {
            let PlaybackSession {
                id,
                generation,
                mut engine,
                phase,
                ..
            } = session;

            let pending = match phase {
                SessionPhase::Playing { timer } => {
                    if let Some(timer) = timer {
                        timer.cancel();
                    }
                    None
                }
                SessionPhase::Preparing { reply } => Some(reply),
            };

            match engine.is_playing() {
                Ok(true) => {
                    if let Err(err) = engine.stop() {
                        warn!(error = %err, "Failed to stop engine");
                    }
                }
                Ok(false) => {}
                Err(err) => warn!(error = %err, "Engine state query failed during stop"),
            }
            if let Err(err) = engine.release() {
                warn!(error = %err, "Failed to release engine");
            }

            info!(session_id = %id, generation, reason = reason.label(), "Playback stopped");

            if let Some(reply) = pending {
                let _ = reply.send(Err(reason.into_pending_error()));
            }
        }

        if let Some(lock) = state.wake_lock.as_ref() {
            if lock.is_held() {
                match lock.release() {
                    Ok(()) => debug!("Wake-lock released"),
                    Err(err) => warn!(error = %err, "Failed to release wake-lock"),
                }
            }
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let mut state = mem::take(self.state.get_mut());
        self.teardown(&mut state, StopReason::Shutdown);
    }
}

async fn run_event_loop(shared: Weak<Shared>, mut events: EventReceiver) {
    while let Some((generation, event)) = events.recv().await {
        let Some(shared) = shared.upgrade() else {
            break;
        };
        shared.handle_event(generation, event);
    }
    debug!("Playback event loop finished");
}

fn clamp_volume(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}
