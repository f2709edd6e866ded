//! Resolution of resource paths into engine data sources.

use crate::error::{PlaybackError, Result};
use bridge_traits::{AssetResolver, DataSource};
use core_runtime::logging::strip_path;
use tracing::debug;

/// Map `resource_path` to a [`DataSource`].
///
/// Paths starting with `asset_prefix` name bundled assets: the prefix is
/// stripped and the remainder opened through `resolver`. Anything else is
/// handed to the engine as-is.
pub fn resolve_source(
    resource_path: &str,
    asset_prefix: &str,
    resolver: &dyn AssetResolver,
) -> Result<DataSource> {
    let Some(asset_path) = resource_path.strip_prefix(asset_prefix) else {
        debug!(file = %strip_path(resource_path), "Using direct source");
        return Ok(DataSource::Uri(resource_path.to_string()));
    };

    let descriptor = resolver.open_asset(asset_path).map_err(|e| {
        PlaybackError::SourceError(format!("asset {}: {}", asset_path, e))
    })?;

    debug!(
        asset = asset_path,
        offset = descriptor.start_offset,
        length = descriptor.length,
        "Resolved bundled asset"
    );
    Ok(DataSource::Asset(descriptor))
}
