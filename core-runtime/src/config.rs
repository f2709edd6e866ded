//! # Core Configuration Module
//!
//! Provides configuration management for the alarm playback core.
//!
//! ## Overview
//!
//! A builder assembles a [`CoreConfig`] holding every capability the playback
//! controller needs plus the tunable [`PlaybackSettings`]. The builder is
//! fail-fast: a missing capability is reported at build time with a message
//! saying what to inject, rather than surfacing later as a failed `play`.
//!
//! ## Required Capabilities
//!
//! - `AudioEngineFactory` - Allocates native players
//! - `PowerManager` - Creates the playback wake-lock
//! - `DeferredScheduler` - Auto-stop timers
//! - `AssetResolver` - Opens bundled assets
//!
//! When the `desktop-shims` feature is enabled, the `bridge-desktop`
//! implementations are injected for any capability that was not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .engine_factory(Arc::new(MyEngineFactory))
//!     .power_manager(Arc::new(MyPowerManager))
//!     .scheduler(Arc::new(MyScheduler))
//!     .asset_resolver(Arc::new(MyAssets))
//!     .wake_lock_tag("MyApp::AlarmLock")
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{AssetResolver, AudioEngineFactory, DeferredScheduler, PowerManager};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Channel the application layer talks to.
pub const DEFAULT_CHANNEL_NAME: &str = "audio_background_service";

/// Resource paths starting with this marker are bundled assets.
pub const DEFAULT_ASSET_PREFIX: &str = "assets/";

/// Tag attached to the playback wake-lock.
pub const DEFAULT_WAKE_LOCK_TAG: &str = "AudioBackgroundPlugin::WakeLock";

/// Extra time the wake-lock is held past the requested playback duration.
pub const DEFAULT_WAKE_LOCK_MARGIN: Duration = Duration::from_millis(5000);

const MAX_WAKE_LOCK_MARGIN: Duration = Duration::from_secs(600);

/// Tunable playback behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSettings {
    /// Name of the command channel the plugin registers on
    pub channel_name: String,

    /// Marker identifying bundled-asset paths; stripped before resolving
    pub asset_prefix: String,

    /// Wake-lock tag (shows up in platform battery diagnostics)
    pub wake_lock_tag: String,

    /// Safety margin added to the playback duration for the wake-lock timeout
    pub wake_lock_margin: Duration,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            asset_prefix: DEFAULT_ASSET_PREFIX.to_string(),
            wake_lock_tag: DEFAULT_WAKE_LOCK_TAG.to_string(),
            wake_lock_margin: DEFAULT_WAKE_LOCK_MARGIN,
        }
    }
}

impl PlaybackSettings {
    pub fn validate(&self) -> Result<()> {
        if self.channel_name.trim().is_empty() {
            return Err(Error::Config("Channel name cannot be empty".to_string()));
        }

        if self.asset_prefix.is_empty() {
            return Err(Error::Config("Asset prefix cannot be empty".to_string()));
        }

        if self.wake_lock_tag.trim().is_empty() {
            return Err(Error::Config("Wake-lock tag cannot be empty".to_string()));
        }

        if self.wake_lock_margin > MAX_WAKE_LOCK_MARGIN {
            return Err(Error::Config(
                "Wake-lock margin exceeds maximum of 10 minutes".to_string(),
            ));
        }

        Ok(())
    }
}

/// Core configuration for the alarm playback core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Native player factory (required)
    pub engine_factory: Arc<dyn AudioEngineFactory>,

    /// Wake-lock provider (required)
    pub power_manager: Arc<dyn PowerManager>,

    /// One-shot timer scheduler (required)
    pub scheduler: Arc<dyn DeferredScheduler>,

    /// Bundled asset resolver (required)
    pub asset_resolver: Arc<dyn AssetResolver>,

    /// Playback tuning
    pub playback: PlaybackSettings,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("engine_factory", &"AudioEngineFactory { ... }")
            .field("power_manager", &"PowerManager { ... }")
            .field("scheduler", &"DeferredScheduler { ... }")
            .field("asset_resolver", &"AssetResolver { ... }")
            .field("playback", &self.playback)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.playback.validate()
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_engine_factory() -> Result<Arc<dyn AudioEngineFactory>> {
    Err(Error::capability_missing(
        "AudioEngineFactory",
        "An audio engine factory is required to allocate players. \
         Desktop: enable the 'desktop-shims' feature for the headless engine. \
         Mobile: inject an adapter over the native media player.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_engine_factory() -> Result<Arc<dyn AudioEngineFactory>> {
    Ok(Arc::new(bridge_desktop::HeadlessEngineFactory::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_power_manager() -> Result<Arc<dyn PowerManager>> {
    Err(Error::capability_missing(
        "PowerManager",
        "A power manager is required to keep the device awake during playback. \
         Desktop: enable the 'desktop-shims' feature. \
         Android: wrap PowerManager.newWakeLock.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_power_manager() -> Result<Arc<dyn PowerManager>> {
    Ok(Arc::new(bridge_desktop::DesktopPowerManager::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_scheduler() -> Result<Arc<dyn DeferredScheduler>> {
    Err(Error::capability_missing(
        "DeferredScheduler",
        "A deferred scheduler is required for playback auto-stop. \
         Desktop: enable the 'desktop-shims' feature for the tokio scheduler.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_scheduler() -> Result<Arc<dyn DeferredScheduler>> {
    Ok(Arc::new(bridge_desktop::TokioDeferredScheduler::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_asset_resolver(_assets_dir: Option<PathBuf>) -> Result<Arc<dyn AssetResolver>> {
    Err(Error::capability_missing(
        "AssetResolver",
        "An asset resolver is required to open bundled sounds. \
         Desktop: enable the 'desktop-shims' feature and set .assets_dir(). \
         Android: wrap AssetManager.openFd.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_asset_resolver(assets_dir: Option<PathBuf>) -> Result<Arc<dyn AssetResolver>> {
    let root = assets_dir.unwrap_or_else(|| PathBuf::from("assets"));
    Ok(Arc::new(bridge_desktop::DirectoryAssetResolver::new(root)))
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    engine_factory: Option<Arc<dyn AudioEngineFactory>>,
    power_manager: Option<Arc<dyn PowerManager>>,
    scheduler: Option<Arc<dyn DeferredScheduler>>,
    asset_resolver: Option<Arc<dyn AssetResolver>>,
    assets_dir: Option<PathBuf>,
    playback: PlaybackSettings,
}

impl CoreConfigBuilder {
    /// Sets the audio engine factory.
    pub fn engine_factory(mut self, factory: Arc<dyn AudioEngineFactory>) -> Self {
        self.engine_factory = Some(factory);
        self
    }

    /// Sets the power manager used for the playback wake-lock.
    pub fn power_manager(mut self, manager: Arc<dyn PowerManager>) -> Self {
        self.power_manager = Some(manager);
        self
    }

    /// Sets the deferred scheduler used for auto-stop timers.
    pub fn scheduler(mut self, scheduler: Arc<dyn DeferredScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Sets the bundled asset resolver.
    pub fn asset_resolver(mut self, resolver: Arc<dyn AssetResolver>) -> Self {
        self.asset_resolver = Some(resolver);
        self
    }

    /// Root directory for the desktop asset resolver. Ignored when an
    /// explicit resolver is set.
    pub fn assets_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.assets_dir = Some(path.into());
        self
    }

    pub fn channel_name(mut self, name: impl Into<String>) -> Self {
        self.playback.channel_name = name.into();
        self
    }

    pub fn asset_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.playback.asset_prefix = prefix.into();
        self
    }

    pub fn wake_lock_tag(mut self, tag: impl Into<String>) -> Self {
        self.playback.wake_lock_tag = tag.into();
        self
    }

    pub fn wake_lock_margin(mut self, margin: Duration) -> Self {
        self.playback.wake_lock_margin = margin;
        self
    }

    /// Replace all playback settings at once.
    pub fn playback_settings(mut self, settings: PlaybackSettings) -> Self {
        self.playback = settings;
        self
    }

    /// Builds the configuration, injecting platform defaults where available.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] if a capability was not provided and no
    ///   default exists for this build
    /// - [`Error::Config`] if the playback settings are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let engine_factory = match self.engine_factory {
            Some(factory) => factory,
            None => provide_default_engine_factory()?,
        };

        let power_manager = match self.power_manager {
            Some(manager) => manager,
            None => provide_default_power_manager()?,
        };

        let scheduler = match self.scheduler {
            Some(scheduler) => scheduler,
            None => provide_default_scheduler()?,
        };

        let asset_resolver = match self.asset_resolver {
            Some(resolver) => resolver,
            None => provide_default_asset_resolver(self.assets_dir)?,
        };

        let config = CoreConfig {
            engine_factory,
            power_manager,
            scheduler,
            asset_resolver,
            playback: self.playback,
        };

        config.validate()?;

        Ok(config)
    }
}
