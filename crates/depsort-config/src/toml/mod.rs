//! `depsort.toml` manifest parsing and serialization

use crate::manifest::Manifest;
use crate::ConfigResult;
use camino::Utf8Path;
use depsort_core::DepSortError;

/// Parse a TOML manifest and validate it
pub fn parse_manifest_toml(content: &str) -> ConfigResult<Manifest> {
    // Syntax errors from toml_edit point at the offending line
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| DepSortError::TomlParse {
            message: format!("TOML syntax error: {e}"),
        })?;

    let manifest: Manifest = toml::from_str(content).map_err(|e| DepSortError::TomlParse {
        message: format!("TOML parsing error: {e}"),
    })?;

    manifest.validate()?;
    Ok(manifest)
}

/// Serialize a manifest to TOML
pub fn serialize_manifest_toml(manifest: &Manifest) -> ConfigResult<String> {
    toml::to_string_pretty(manifest).map_err(|e| DepSortError::serialization("TOML manifest", e))
}

/// Load a TOML manifest from disk
pub fn load_from_file(path: &Utf8Path) -> ConfigResult<Manifest> {
    let content = crate::read_file(path)?;
    parse_manifest_toml(&content).map_err(|e| match e {
        DepSortError::TomlParse { message } => DepSortError::TomlParse {
            message: format!("In file {path}: {message}"),
        },
        DepSortError::ConfigValidation { field, reason } => DepSortError::ConfigValidation {
            field,
            reason: format!("in file {path}: {reason}"),
        },
        other => other,
    })
}
