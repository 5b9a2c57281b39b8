//! JSON manifest parsing and serialization
//!
//! Same shape as the TOML manifest: a `sorter` object and an `item` array.

use crate::manifest::Manifest;
use crate::ConfigResult;
use camino::Utf8Path;
use depsort_core::DepSortError;

/// Parse a manifest from JSON text
pub fn parse_manifest_json(content: &str) -> ConfigResult<Manifest> {
    let manifest: Manifest =
        serde_json::from_str(content).map_err(|e| DepSortError::JsonParse {
            message: format!("JSON parsing error: {e}"),
        })?;
    manifest.validate()?;
    Ok(manifest)
}

/// Serialize a manifest to pretty JSON
pub fn serialize_manifest_json(manifest: &Manifest) -> ConfigResult<String> {
    serde_json::to_string_pretty(manifest)
        .map_err(|e| DepSortError::serialization("JSON manifest", e))
}

/// Load a manifest from a JSON file
pub fn load_from_file(path: &Utf8Path) -> ConfigResult<Manifest> {
    let content = crate::read_file(path)?;
    parse_manifest_json(&content).map_err(|e| match e {
        DepSortError::JsonParse { message } => DepSortError::JsonParse {
            message: format!("In file {path}: {message}"),
        },
        other => other,
    })
}
