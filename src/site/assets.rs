//! Site-level image assets such as the avatar or favicon.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::info;

use crate::site::error::{SiteError, SiteResult};
use crate::site::layout::SiteLayout;

/// Replace the asset at `relative` (inside the site directory) with a copy
/// of `source`. Returns the local path written.
pub fn replace_asset(layout: &SiteLayout, relative: &str, source: &Path) -> SiteResult<PathBuf> {
    let relative_path = Path::new(relative.trim_start_matches('/'));
    let valid = relative_path.components().count() > 0
        && relative_path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !valid {
        return Err(SiteError::InvalidAssetPath(relative.to_string()));
    }

    let target = layout.root().join(relative_path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| SiteError::io(parent, e))?;
    }

    // read first so a bad source leaves the old asset in place
    let bytes = fs::read(source).map_err(|e| SiteError::io(source, e))?;
    fs::write(&target, bytes).map_err(|e| SiteError::io(&target, e))?;

    info!(asset = %target.display(), from = %source.display(), "site asset replaced");
    Ok(target)
}
