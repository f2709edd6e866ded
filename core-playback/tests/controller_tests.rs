//! Controller tests
//!
//! This test suite verifies:
//! - Session lifecycle (prepare, ready, auto-stop, completion, errors)
//! - Replacement semantics and stale timer/notification handling
//! - Wake-lock bookkeeping
//! - Volume clamping and failure-to-default behaviour

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    AssetDescriptor, AssetResolver, AudioAttributes, AudioEngine, AudioEngineFactory,
    BridgeError, DataSource, DeferredScheduler, DeferredTask, EngineEvent, EngineListener,
    PowerManager, ScheduledTask, WakeLock, WakeLockLevel,
};
use core_playback::{
    PlayRequest, PlaybackController, PlaybackError, PlaybackState, SessionId, MAX_PLAY_DURATION,
};
use core_runtime::config::CoreConfig;
use mockall::mock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mocks
// ============================================================================

mock! {
    Lock {}

    impl WakeLock for Lock {
        fn acquire(&self, timeout: Duration) -> BridgeResult<()>;
        fn release(&self) -> BridgeResult<()>;
        fn is_held(&self) -> bool;
    }
}

mock! {
    Power {}

    impl PowerManager for Power {
        fn new_wake_lock(&self, level: WakeLockLevel, tag: &str) -> BridgeResult<Box<dyn WakeLock>>;
    }
}

mock! {
    Assets {}

    impl AssetResolver for Assets {
        fn open_asset(&self, asset_path: &str) -> BridgeResult<AssetDescriptor>;
    }
}

/// Observable wake-lock state shared with the mock.
#[derive(Default)]
struct LockProbe {
    held: AtomicBool,
    acquisitions: Mutex<Vec<Duration>>,
    releases: Mutex<usize>,
}

fn tracked_lock(probe: Arc<LockProbe>) -> MockLock {
    let mut lock = MockLock::new();

    let p = Arc::clone(&probe);
    lock.expect_acquire().returning(move |timeout| {
        p.acquisitions.lock().unwrap().push(timeout);
        p.held.store(true, Ordering::SeqCst);
        Ok(())
    });

    let p = Arc::clone(&probe);
    lock.expect_release().returning(move || {
        if !p.held.swap(false, Ordering::SeqCst) {
            return Err(BridgeError::InvalidState("not held".into()));
        }
        *p.releases.lock().unwrap() += 1;
        Ok(())
    });

    let p = Arc::clone(&probe);
    lock.expect_is_held()
        .returning(move || p.held.load(Ordering::SeqCst));

    lock
}

fn tracked_power(probe: Arc<LockProbe>) -> MockPower {
    let mut power = MockPower::new();
    power
        .expect_new_wake_lock()
        .withf(|level, tag| *level == WakeLockLevel::Partial && tag == "AudioBackgroundPlugin::WakeLock")
        .times(1)
        .returning(move |_, _| {
            Ok(Box::new(tracked_lock(Arc::clone(&probe))) as Box<dyn WakeLock>)
        });
    power
}

fn bundle_assets() -> MockAssets {
    let mut assets = MockAssets::new();
    assets
        .expect_open_asset()
        .returning(|path| Ok(AssetDescriptor::new(format!("/bundle/{}", path), 64, 2048)));
    assets
}

// ============================================================================
// Fake engine
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Prepare {
    /// Report Ready from inside `prepare_async`
    Ready,
    /// Report an error from inside `prepare_async`
    Fail(i32, i32),
    /// Report nothing; the test drives the listener
    Hold,
    /// Report Ready, but `start` fails
    StartFails,
}

#[derive(Default)]
struct EngineLog {
    created: usize,
    live: usize,
    calls: Vec<String>,
    attributes: Vec<AudioAttributes>,
    sources: Vec<DataSource>,
    looping: Vec<bool>,
    volumes: Vec<(f32, f32)>,
    listeners: Vec<Arc<dyn EngineListener>>,
}

impl EngineLog {
    fn position(&self, call: &str) -> usize {
        self.calls
            .iter()
            .position(|c| c == call)
            .unwrap_or_else(|| panic!("call {} not recorded in {:?}", call, self.calls))
    }

    fn has(&self, call: &str) -> bool {
        self.calls.iter().any(|c| c == call)
    }
}

#[derive(Default)]
struct FakeFactory {
    log: Arc<Mutex<EngineLog>>,
    plans: Mutex<VecDeque<Prepare>>,
    query_fails: AtomicBool,
}

impl FakeFactory {
    fn plan(&self, prepare: Prepare) {
        self.plans.lock().unwrap().push_back(prepare);
    }

    fn emit(&self, engine: usize, event: EngineEvent) {
        let listener = Arc::clone(&self.log.lock().unwrap().listeners[engine]);
        listener.on_event(event);
    }
}

impl AudioEngineFactory for FakeFactory {
    fn create_engine(&self) -> BridgeResult<Box<dyn AudioEngine>> {
        let mut log = self.log.lock().unwrap();
        let index = log.created;
        log.created += 1;
        log.live += 1;
        log.calls.push(format!("{}:create", index));

        let prepare = self.plans.lock().unwrap().pop_front().unwrap_or(Prepare::Ready);
        Ok(Box::new(FakeEngine {
            index,
            prepare,
            log: Arc::clone(&self.log),
            playing: false,
            released: false,
            query_fails: self.query_fails.load(Ordering::SeqCst),
        }))
    }
}

struct FakeEngine {
    index: usize,
    prepare: Prepare,
    log: Arc<Mutex<EngineLog>>,
    playing: bool,
    released: bool,
    query_fails: bool,
}

impl FakeEngine {
    fn record(&self, call: &str) {
        self.log
            .lock()
            .unwrap()
            .calls
            .push(format!("{}:{}", self.index, call));
    }
}

impl AudioEngine for FakeEngine {
    fn set_audio_attributes(&mut self, attributes: AudioAttributes) -> BridgeResult<()> {
        self.record("attributes");
        self.log.lock().unwrap().attributes.push(attributes);
        Ok(())
    }

    fn set_data_source(&mut self, source: DataSource) -> BridgeResult<()> {
        self.record("source");
        self.log.lock().unwrap().sources.push(source);
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) -> BridgeResult<()> {
        self.record("looping");
        self.log.lock().unwrap().looping.push(looping);
        Ok(())
    }

    fn prepare_async(&mut self, listener: Arc<dyn EngineListener>) -> BridgeResult<()> {
        self.record("prepare");
        self.log
            .lock()
            .unwrap()
            .listeners
            .push(Arc::clone(&listener));

        match self.prepare {
            Prepare::Ready | Prepare::StartFails => listener.on_event(EngineEvent::Ready),
            Prepare::Fail(what, extra) => listener.on_event(EngineEvent::Error { what, extra }),
            Prepare::Hold => {}
        }
        Ok(())
    }

    fn start(&mut self) -> BridgeResult<()> {
        self.record("start");
        if let Prepare::StartFails = self.prepare {
            return Err(BridgeError::OperationFailed("start refused".into()));
        }
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) -> BridgeResult<()> {
        self.record("stop");
        self.playing = false;
        Ok(())
    }

    fn release(&mut self) -> BridgeResult<()> {
        self.record("release");
        if !self.released {
            self.released = true;
            self.playing = false;
            self.log.lock().unwrap().live -= 1;
        }
        Ok(())
    }

    fn is_playing(&self) -> BridgeResult<bool> {
        if self.query_fails {
            return Err(BridgeError::InvalidState("query failed".into()));
        }
        Ok(self.playing)
    }

    fn set_volume(&mut self, left: f32, right: f32) -> BridgeResult<()> {
        self.log.lock().unwrap().volumes.push((left, right));
        Ok(())
    }
}

// ============================================================================
// Fake scheduler
// ============================================================================

struct FakeTimer {
    delay: Duration,
    task: Mutex<Option<DeferredTask>>,
    cancelled: AtomicBool,
}

struct FakeTimerHandle(Arc<FakeTimer>);

impl ScheduledTask for FakeTimerHandle {
    fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_pending(&self) -> bool {
        !self.0.cancelled.load(Ordering::SeqCst) && self.0.task.lock().unwrap().is_some()
    }
}

#[derive(Default)]
struct FakeScheduler {
    timers: Mutex<Vec<Arc<FakeTimer>>>,
    fails: AtomicBool,
}

impl FakeScheduler {
    fn timer(&self, index: usize) -> Arc<FakeTimer> {
        Arc::clone(&self.timers.lock().unwrap()[index])
    }

    fn count(&self) -> usize {
        self.timers.lock().unwrap().len()
    }

    fn pending(&self) -> usize {
        self.timers
            .lock()
            .unwrap()
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst) && t.task.lock().unwrap().is_some())
            .count()
    }

    /// Run the timer as the platform would: cancelled timers do nothing.
    fn fire(&self, index: usize) {
        let timer = self.timer(index);
        if timer.cancelled.load(Ordering::SeqCst) {
            return;
        }
        let task = timer.task.lock().unwrap().take();
        if let Some(task) = task {
            task();
        }
    }

    /// Run the timer even if cancelled, as when cancel loses a race.
    fn fire_despite_cancel(&self, index: usize) {
        let task = self.timer(index).task.lock().unwrap().take();
        if let Some(task) = task {
            task();
        }
    }
}

impl DeferredScheduler for FakeScheduler {
    fn schedule_once(&self, delay: Duration, task: DeferredTask) -> BridgeResult<Box<dyn ScheduledTask>> {
        if self.fails.load(Ordering::SeqCst) {
            return Err(BridgeError::NotAvailable("timers disabled".into()));
        }
        let timer = Arc::new(FakeTimer {
            delay,
            task: Mutex::new(Some(task)),
            cancelled: AtomicBool::new(false),
        });
        self.timers.lock().unwrap().push(Arc::clone(&timer));
        Ok(Box::new(FakeTimerHandle(timer)))
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    controller: PlaybackController,
    engines: Arc<FakeFactory>,
    scheduler: Arc<FakeScheduler>,
    lock: Arc<LockProbe>,
}

impl Harness {
    fn new() -> Self {
        Self::with_assets(bundle_assets())
    }

    fn with_assets(assets: MockAssets) -> Self {
        let engines = Arc::new(FakeFactory::default());
        let scheduler = Arc::new(FakeScheduler::default());
        let lock = Arc::new(LockProbe::default());

        let config = CoreConfig::builder()
            .engine_factory(engines.clone())
            .power_manager(Arc::new(tracked_power(Arc::clone(&lock))))
            .scheduler(scheduler.clone())
            .asset_resolver(Arc::new(assets))
            .build()
            .unwrap();

        let controller = PlaybackController::new(&config).unwrap();
        controller.initialize().unwrap();

        Self {
            controller,
            engines,
            scheduler,
            lock,
        }
    }

    fn log(&self) -> std::sync::MutexGuard<'_, EngineLog> {
        self.engines.log.lock().unwrap()
    }

    fn lock_held(&self) -> bool {
        self.lock.held.load(Ordering::SeqCst)
    }
}

fn request(path: &str, secs: u64, id: &str) -> PlayRequest {
    PlayRequest::new(path, Duration::from_secs(secs), id)
}

/// Let the controller's event task drain pending notifications.
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

async fn wait_for_state(controller: &PlaybackController, expected: PlaybackState) {
    for _ in 0..100 {
        if controller.state() == expected {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("controller never reached {:?}, is {:?}", expected, controller.state());
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_play_bundled_asset_until_timer() {
    let h = Harness::new();

    h.controller
        .play(request("assets/alarm.mp3", 10, "s1"))
        .await
        .expect("play succeeds");

    assert!(h.controller.is_playing());
    assert_eq!(
        h.controller.state(),
        PlaybackState::Playing {
            session_id: SessionId::new("s1")
        }
    );

    {
        let log = h.log();
        assert_eq!(log.attributes, vec![AudioAttributes::alarm()]);
        assert_eq!(
            log.sources,
            vec![DataSource::Asset(AssetDescriptor::new(
                "/bundle/alarm.mp3",
                64,
                2048
            ))]
        );
        assert_eq!(log.looping, vec![true]);
        assert!(log.position("0:attributes") < log.position("0:source"));
        assert!(log.position("0:prepare") < log.position("0:start"));
    }

    assert!(h.lock_held());
    assert_eq!(
        *h.lock.acquisitions.lock().unwrap(),
        vec![Duration::from_millis(15_000)]
    );
    assert_eq!(h.scheduler.count(), 1);
    assert_eq!(h.scheduler.timer(0).delay, Duration::from_secs(10));

    h.scheduler.fire(0);

    assert!(!h.controller.is_playing());
    assert_eq!(h.controller.state(), PlaybackState::Idle);
    assert!(!h.lock_held());
    let log = h.log();
    assert_eq!(log.live, 0);
    assert!(log.position("0:stop") < log.position("0:release"));
}

#[tokio::test]
async fn test_direct_path_bypasses_asset_resolver() {
    let mut assets = MockAssets::new();
    assets.expect_open_asset().never();
    let h = Harness::with_assets(assets);

    h.controller
        .play(request("/storage/Alarms/ring.mp3", 5, "s1"))
        .await
        .unwrap();

    assert_eq!(
        h.log().sources,
        vec![DataSource::Uri("/storage/Alarms/ring.mp3".to_string())]
    );
}

#[tokio::test]
async fn test_replacement_tears_down_previous_session_first() {
    let h = Harness::new();

    h.controller.play(request("/a.mp3", 30, "s1")).await.unwrap();
    h.controller.play(request("/b.mp3", 20, "s2")).await.unwrap();

    {
        let log = h.log();
        assert_eq!(log.created, 2);
        assert_eq!(log.live, 1);
        assert!(log.position("0:stop") < log.position("1:create"));
        assert!(log.position("0:release") < log.position("1:create"));
    }

    assert_eq!(h.scheduler.count(), 2);
    assert_eq!(h.scheduler.pending(), 1);
    assert_eq!(
        h.controller.state(),
        PlaybackState::Playing {
            session_id: SessionId::new("s2")
        }
    );
    // Released between sessions, re-acquired for the second
    assert_eq!(*h.lock.releases.lock().unwrap(), 1);
    assert_eq!(h.lock.acquisitions.lock().unwrap().len(), 2);
    assert!(h.lock_held());
}

#[tokio::test]
async fn test_stale_timer_never_stops_replacement() {
    let h = Harness::new();

    h.controller.play(request("/a.mp3", 30, "s1")).await.unwrap();
    h.controller.play(request("/b.mp3", 20, "s2")).await.unwrap();

    h.scheduler.fire_despite_cancel(0);

    assert!(h.controller.is_playing());
    assert_eq!(
        h.controller.state(),
        PlaybackState::Playing {
            session_id: SessionId::new("s2")
        }
    );
    assert!(!h.log().has("1:stop"));
}

#[tokio::test]
async fn test_reused_session_id_is_still_distinct() {
    let h = Harness::new();

    h.controller.play(request("/a.mp3", 30, "same")).await.unwrap();
    h.controller.play(request("/a.mp3", 30, "same")).await.unwrap();

    h.scheduler.fire_despite_cancel(0);
    assert!(h.controller.is_playing());

    h.scheduler.fire(1);
    assert!(!h.controller.is_playing());
}

#[tokio::test]
async fn test_natural_completion_stops() {
    let h = Harness::new();
    h.controller.play(request("/a.mp3", 30, "s1")).await.unwrap();

    h.engines.emit(0, EngineEvent::Completed);
    wait_for_state(&h.controller, PlaybackState::Idle).await;

    assert!(!h.lock_held());
    assert_eq!(h.scheduler.pending(), 0);
    assert_eq!(h.log().live, 0);
}

// ============================================================================
// Stop
// ============================================================================

#[tokio::test]
async fn test_stop_is_idempotent() {
    let h = Harness::new();

    h.controller.stop();
    h.controller.stop();
    assert_eq!(h.controller.state(), PlaybackState::Idle);

    h.controller.play(request("/a.mp3", 30, "s1")).await.unwrap();
    h.controller.stop();
    h.controller.stop();

    assert!(!h.controller.is_playing());
    assert!(!h.lock_held());
    assert_eq!(h.scheduler.pending(), 0);
    assert_eq!(*h.lock.releases.lock().unwrap(), 1);

    let log = h.log();
    assert_eq!(log.live, 0);
    assert_eq!(log.calls.iter().filter(|c| *c == "0:release").count(), 1);
}

#[tokio::test]
async fn test_stop_while_preparing_resolves_play() {
    let h = Harness::new();
    h.engines.plan(Prepare::Hold);

    let controller = h.controller.clone();
    let pending = tokio::spawn(async move { controller.play(request("/a.mp3", 30, "s1")).await });

    wait_for_state(
        &h.controller,
        PlaybackState::Preparing {
            session_id: SessionId::new("s1"),
        },
    )
    .await;
    assert!(!h.controller.is_playing());

    h.controller.stop();

    let result = pending.await.unwrap();
    assert!(matches!(result, Err(PlaybackError::Stopped)));
    assert_eq!(h.log().live, 0);
    assert!(!h.lock_held());
}

#[tokio::test]
async fn test_replacement_while_preparing_supersedes() {
    let h = Harness::new();
    h.engines.plan(Prepare::Hold);

    let controller = h.controller.clone();
    let first = tokio::spawn(async move { controller.play(request("/a.mp3", 30, "s1")).await });
    wait_for_state(
        &h.controller,
        PlaybackState::Preparing {
            session_id: SessionId::new("s1"),
        },
    )
    .await;

    h.controller.play(request("/b.mp3", 10, "s2")).await.unwrap();

    assert!(matches!(
        first.await.unwrap(),
        Err(PlaybackError::Superseded)
    ));

    // A late Ready from the replaced engine is ignored
    h.engines.emit(0, EngineEvent::Ready);
    settle().await;

    let log = h.log();
    assert!(!log.has("0:start"));
    assert_eq!(log.live, 1);
    drop(log);
    assert_eq!(
        h.controller.state(),
        PlaybackState::Playing {
            session_id: SessionId::new("s2")
        }
    );
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_invalid_request_has_no_side_effects() {
    let h = Harness::new();

    let result = h.controller.play(request("", 10, "s1")).await;
    assert!(matches!(result, Err(PlaybackError::InvalidRequest(_))));

    let result = h.controller.play(request("/a.mp3", 0, "s1")).await;
    assert!(matches!(result, Err(PlaybackError::InvalidRequest(_))));

    assert_eq!(h.log().created, 0);
    assert_eq!(h.scheduler.count(), 0);
    assert!(h.lock.acquisitions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_duration_is_rejected_and_controller_recovers() {
    let h = Harness::new();

    let huge = PlayRequest::new("assets/alarm.mp3", Duration::from_secs(u64::MAX), "big");
    let result = h.controller.play(huge).await;
    assert!(matches!(result, Err(PlaybackError::InvalidRequest(_))));
    assert_eq!(h.log().created, 0);

    h.controller
        .play(request("assets/alarm.mp3", 5, "next"))
        .await
        .expect("later play still settles");
    assert_eq!(
        h.controller.state(),
        PlaybackState::Playing {
            session_id: SessionId::new("next")
        }
    );
}

#[tokio::test]
async fn test_longest_duration_plays() {
    let h = Harness::new();

    h.controller
        .play(PlayRequest::new("assets/alarm.mp3", MAX_PLAY_DURATION, "long"))
        .await
        .unwrap();

    assert!(h.controller.is_playing());
    assert_eq!(
        *h.lock.acquisitions.lock().unwrap(),
        vec![MAX_PLAY_DURATION + Duration::from_secs(5)]
    );
    assert_eq!(h.scheduler.timer(0).delay, MAX_PLAY_DURATION);

    h.controller.stop();
    assert!(!h.lock_held());
    assert_eq!(h.scheduler.pending(), 0);
}

#[tokio::test]
async fn test_missing_asset_releases_engine() {
    let mut assets = MockAssets::new();
    assets
        .expect_open_asset()
        .returning(|path| Err(BridgeError::OperationFailed(format!("no asset {}", path))));
    let h = Harness::with_assets(assets);

    let result = h.controller.play(request("assets/missing.mp3", 10, "s1")).await;

    assert!(matches!(result, Err(PlaybackError::SourceError(_))));
    assert_eq!(h.controller.state(), PlaybackState::Idle);
    let log = h.log();
    assert_eq!(log.created, 1);
    assert_eq!(log.live, 0);
    assert!(!log.has("0:prepare"));
}

#[tokio::test]
async fn test_engine_error_tears_down() {
    let h = Harness::new();
    h.engines.plan(Prepare::Fail(1, -1004));

    let result = h.controller.play(request("/broken.mp3", 10, "s1")).await;

    assert!(matches!(
        result,
        Err(PlaybackError::EngineError {
            what: 1,
            extra: -1004
        })
    ));
    assert_eq!(h.controller.state(), PlaybackState::Idle);
    assert_eq!(h.log().live, 0);
    assert!(h.lock.acquisitions.lock().unwrap().is_empty());
    assert_eq!(h.scheduler.count(), 0);
}

#[tokio::test]
async fn test_engine_error_while_playing_tears_down() {
    let h = Harness::new();
    h.controller.play(request("/a.mp3", 30, "s1")).await.unwrap();

    h.engines.emit(0, EngineEvent::Error { what: 100, extra: 0 });
    wait_for_state(&h.controller, PlaybackState::Idle).await;

    assert!(!h.lock_held());
    assert_eq!(h.scheduler.pending(), 0);
}

#[tokio::test]
async fn test_start_failure_fails_play() {
    let h = Harness::new();
    h.engines.plan(Prepare::StartFails);

    let result = h.controller.play(request("/a.mp3", 10, "s1")).await;

    assert!(matches!(result, Err(PlaybackError::Bridge(_))));
    assert_eq!(h.controller.state(), PlaybackState::Idle);
    assert_eq!(h.log().live, 0);
    assert!(!h.lock_held());
}

#[tokio::test]
async fn test_schedule_failure_fails_play() {
    let h = Harness::new();
    h.scheduler.fails.store(true, Ordering::SeqCst);

    let result = h.controller.play(request("/a.mp3", 10, "s1")).await;

    assert!(matches!(result, Err(PlaybackError::Bridge(_))));
    assert_eq!(h.controller.state(), PlaybackState::Idle);
    assert_eq!(h.log().live, 0);
    assert!(!h.lock_held());
}

#[tokio::test]
async fn test_engine_query_error_reads_as_not_playing() {
    let h = Harness::new();
    h.engines.query_fails.store(true, Ordering::SeqCst);

    h.controller.play(request("/a.mp3", 10, "s1")).await.unwrap();

    assert!(!h.controller.is_playing());
    h.controller.stop();
    assert_eq!(h.log().live, 0);
}

// ============================================================================
// Volume, initialize, shutdown
// ============================================================================

#[tokio::test]
async fn test_set_volume_clamps() {
    let h = Harness::new();

    h.controller.set_volume(0.5);
    assert!(h.log().volumes.is_empty());

    h.controller.play(request("/a.mp3", 10, "s1")).await.unwrap();
    h.controller.set_volume(-0.5);
    h.controller.set_volume(1.5);
    h.controller.set_volume(0.3);
    h.controller.set_volume(f32::NAN);

    assert_eq!(
        h.log().volumes,
        vec![(0.0, 0.0), (1.0, 1.0), (0.3, 0.3), (0.0, 0.0)]
    );
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    // tracked_power expects exactly one wake-lock creation
    let h = Harness::new();
    h.controller.initialize().unwrap();
    h.controller.initialize().unwrap();
}

#[tokio::test]
async fn test_play_without_initialize_skips_wake_lock() {
    let engines = Arc::new(FakeFactory::default());
    let mut power = MockPower::new();
    power.expect_new_wake_lock().never();

    let config = CoreConfig::builder()
        .engine_factory(engines.clone())
        .power_manager(Arc::new(power))
        .scheduler(Arc::new(FakeScheduler::default()))
        .asset_resolver(Arc::new(bundle_assets()))
        .build()
        .unwrap();
    let controller = PlaybackController::new(&config).unwrap();

    controller.play(request("/a.mp3", 10, "s1")).await.unwrap();
    assert!(controller.is_playing());
}

#[tokio::test]
async fn test_initialize_failure_is_reported() {
    let mut power = MockPower::new();
    power
        .expect_new_wake_lock()
        .returning(|_, _| Err(BridgeError::NotAvailable("no power service".into())));

    let config = CoreConfig::builder()
        .engine_factory(Arc::new(FakeFactory::default()))
        .power_manager(Arc::new(power))
        .scheduler(Arc::new(FakeScheduler::default()))
        .asset_resolver(Arc::new(bundle_assets()))
        .build()
        .unwrap();
    let controller = PlaybackController::new(&config).unwrap();

    assert!(matches!(
        controller.initialize(),
        Err(PlaybackError::Bridge(_))
    ));
}

#[tokio::test]
async fn test_shutdown_stops_and_drops_wake_lock() {
    let h = Harness::new();
    h.controller.play(request("/a.mp3", 10, "s1")).await.unwrap();

    h.controller.shutdown();

    assert_eq!(h.controller.state(), PlaybackState::Idle);
    assert!(!h.lock_held());

    // The handle is gone: a new session plays without acquiring
    h.controller.play(request("/a.mp3", 10, "s2")).await.unwrap();
    assert_eq!(h.lock.acquisitions.lock().unwrap().len(), 1);
}

#[test]
fn test_new_requires_runtime() {
    let config = CoreConfig::builder()
        .engine_factory(Arc::new(FakeFactory::default()))
        .power_manager(Arc::new(MockPower::new()))
        .scheduler(Arc::new(FakeScheduler::default()))
        .asset_resolver(Arc::new(MockAssets::new()))
        .build()
        .unwrap();

    assert!(matches!(
        PlaybackController::new(&config),
        Err(PlaybackError::CapabilityMissing { .. })
    ));
}
