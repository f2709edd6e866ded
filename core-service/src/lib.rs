//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (audio engine,
//! power manager, scheduler, asset access) into the playback core and exposes
//! it on a command channel. Desktop and headless hosts typically enable the
//! `desktop-shims` feature (which depends on `bridge-desktop`) and call
//! [`bootstrap_desktop`]; mobile hosts build a [`CoreConfig`] from their own
//! adapters and call [`CoreService::new`].

pub mod error;
pub mod plugin;

pub use error::{CoreError, Result};
pub use plugin::{AlarmAudioPlugin, ChannelMethod};

use std::sync::Arc;

use bridge_traits::channel::BinaryMessenger;
use core_playback::PlaybackController;
use core_runtime::config::CoreConfig;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::InProcessMessenger;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<CoreConfig>,
    plugin: Arc<AlarmAudioPlugin>,
}

impl CoreService {
    /// Create a new service from the provided configuration.
    ///
    /// Must be called within a Tokio runtime.
    pub fn new(config: CoreConfig) -> Result<Self> {
        let controller = PlaybackController::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            plugin: Arc::new(AlarmAudioPlugin::new(controller)),
        })
    }

    /// Access the configuration the service was built from.
    pub fn config(&self) -> Arc<CoreConfig> {
        Arc::clone(&self.config)
    }

    pub fn controller(&self) -> &PlaybackController {
        self.plugin.controller()
    }

    pub fn plugin(&self) -> Arc<AlarmAudioPlugin> {
        Arc::clone(&self.plugin)
    }

    /// Expose the playback channel on `messenger`.
    pub fn attach(&self, messenger: &dyn BinaryMessenger) -> Result<()> {
        AlarmAudioPlugin::attach(&self.plugin, messenger)
    }

    /// Remove the playback channel and release every playback resource.
    pub fn detach(&self, messenger: &dyn BinaryMessenger) -> Result<()> {
        self.plugin.detach(messenger)
    }
}

/// Convenience bootstrapper for desktop and headless hosts.
///
/// Builds the core with the `bridge-desktop` capabilities, serving bundled
/// assets from `assets_dir`, and attaches it to a fresh in-process messenger.
///
/// ```no_run
/// # #[cfg(feature = "desktop-shims")]
/// # async fn example() -> core_service::Result<()> {
/// use bridge_traits::channel::MethodCall;
/// use core_service::bootstrap_desktop;
///
/// let (core, messenger) = bootstrap_desktop("assets")?;
/// let channel = core.plugin().channel_name().to_string();
/// let response = messenger
///     .invoke(&channel, MethodCall::bare("isPlaying"))
///     .await;
/// assert_eq!(response.as_bool(), Some(false));
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(
    assets_dir: impl Into<std::path::PathBuf>,
) -> Result<(CoreService, Arc<InProcessMessenger>)> {
    let config = CoreConfig::builder()
        .assets_dir(assets_dir)
        .build()
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

    let core = CoreService::new(config)?;
    let messenger = Arc::new(InProcessMessenger::new());
    core.attach(messenger.as_ref())?;

    Ok((core, messenger))
}
