//! Bundled Asset Access backed by a directory

use bridge_traits::{
    assets::AssetResolver,
    audio::AssetDescriptor,
    error::{BridgeError, Result},
};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Resolves asset paths relative to a root directory.
///
/// Every asset is a whole file, so descriptors always start at offset 0.
#[derive(Debug, Clone)]
pub struct DirectoryAssetResolver {
    root: PathBuf,
}

impl DirectoryAssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn checked_relative(asset_path: &str) -> Result<&Path> {
        let relative = Path::new(asset_path);
        if asset_path.is_empty() {
            return Err(BridgeError::OperationFailed(
                "Asset path cannot be empty".to_string(),
            ));
        }

        let escapes_root = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes_root {
            return Err(BridgeError::OperationFailed(format!(
                "Asset path must stay inside the asset root: {}",
                asset_path
            )));
        }

        Ok(relative)
    }
}

impl AssetResolver for DirectoryAssetResolver {
    fn open_asset(&self, asset_path: &str) -> Result<AssetDescriptor> {
        let full_path = self.root.join(Self::checked_relative(asset_path)?);
        let metadata = std::fs::metadata(&full_path)?;

        if !metadata.is_file() {
            return Err(BridgeError::OperationFailed(format!(
                "Asset is not a file: {}",
                asset_path
            )));
        }

        debug!(asset = asset_path, size = metadata.len(), "Opened asset");
        Ok(AssetDescriptor::new(full_path, 0, metadata.len()))
    }
}
