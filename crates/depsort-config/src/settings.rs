//! Sorter settings and their environment overrides

use crate::ConfigResult;
use depsort_core::DepSortError;
use depsort_resolver::{SorterOptions, SorterResult};
use serde::{Deserialize, Serialize};

/// Reverses the lexical tie-break
pub const ENV_REVERSE_NAME: &str = "DEPSORT_REVERSE_NAME";
/// Drops requirements to enclosing containers
pub const ENV_SKIP_DEPENDENCY_TO_CONTAINER: &str = "DEPSORT_SKIP_DEPENDENCY_TO_CONTAINER";
/// Whether missing required references make the result incomplete
pub const ENV_REQUIRED_MISSING_IS_ERROR: &str = "DEPSORT_REQUIRED_MISSING_IS_ERROR";

/// Plain-data sorter options, as found in a manifest `[sorter]` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SorterSettings {
    pub reverse_name: bool,
    pub skip_dependency_to_container: bool,
    pub consider_required_missing_as_structure_error: bool,
}

impl Default for SorterSettings {
    fn default() -> Self {
        Self {
            reverse_name: false,
            skip_dependency_to_container: false,
            consider_required_missing_as_structure_error: true,
        }
    }
}

impl SorterSettings {
    /// Engine options, without hooks
    pub fn to_options<'a>(&self) -> SorterOptions<'a> {
        SorterOptions::new()
            .with_reverse_name(self.reverse_name)
            .with_skip_dependency_to_container(self.skip_dependency_to_container)
    }

    /// Applies the result-level toggle
    pub fn apply_to(&self, result: &mut SorterResult) {
        result.set_consider_required_missing_as_structure_error(
            self.consider_required_missing_as_structure_error,
        );
    }

    /// Applies `DEPSORT_*` overrides; unknown keys are ignored
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let key = key.as_ref();
            let target = match key {
                ENV_REVERSE_NAME => &mut self.reverse_name,
                ENV_SKIP_DEPENDENCY_TO_CONTAINER => &mut self.skip_dependency_to_container,
                ENV_REQUIRED_MISSING_IS_ERROR => {
                    &mut self.consider_required_missing_as_structure_error
                }
                _ => continue,
            };
            *target = parse_flag(key, value.as_ref())?;
        }
        Ok(())
    }

    /// Applies the overrides found in the process environment
    pub fn with_env_overrides(mut self) -> ConfigResult<Self> {
        self.apply_overrides(std::env::vars().filter(|(key, _)| key.starts_with("DEPSORT_")))?;
        Ok(self)
    }
}

fn parse_flag(field: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(DepSortError::validation(
            field,
            format!("expected a boolean (true/false, 1/0, yes/no), got '{other}'"),
        )),
    }
}
