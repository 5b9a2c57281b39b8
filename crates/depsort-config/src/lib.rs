//! Item manifests and sorter settings
//!
//! This crate reads `depsort.toml` / `depsort.json` manifests: a `[sorter]`
//! settings table and a list of items described by name. Every manifest item
//! implements the core capability traits so a manifest can be sorted as is.

pub mod json;
pub mod manifest;
pub mod settings;
pub mod toml;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use manifest::{Manifest, ManifestItem, ManifestKind, ItemSpec};
pub use settings::SorterSettings;

use camino::Utf8Path;
use depsort_core::DepSortError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, DepSortError>;

/// Loads a manifest, the format follows the file extension
pub fn load_manifest(path: &Utf8Path) -> ConfigResult<Manifest> {
    match path.extension() {
        Some("toml") => crate::toml::load_from_file(path),
        Some("json") => crate::json::load_from_file(path),
        other => Err(DepSortError::validation(
            "manifest",
            format!(
                "unsupported manifest extension '{}' for {path}, expected .toml or .json",
                other.unwrap_or_default()
            ),
        )),
    }
}

fn read_file(path: &Utf8Path) -> ConfigResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DepSortError::io(format!("Failed to read {path}"), e))
}
