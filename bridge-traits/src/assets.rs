//! Bundled asset resolution.

use crate::{audio::AssetDescriptor, error::Result};

/// Maps asset-relative paths to byte ranges the audio engine can open.
///
/// - **Android**: `AssetManager.openFd` (APK offset + length)
/// - **iOS**: `Bundle.main.path(forResource:)`
/// - **Desktop**: a directory of loose files
pub trait AssetResolver: Send + Sync {
    /// Open `asset_path` (already stripped of any bundle prefix).
    fn open_asset(&self, asset_path: &str) -> Result<AssetDescriptor>;
}
