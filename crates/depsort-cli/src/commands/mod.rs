//! Command implementations and dispatch logic.
//!
//! Every command loads a manifest, sorts it with the manifest settings
//! (overridden by the environment, then by the command line) and renders
//! the `SorterResult`.

use anyhow::Context;
use camino::Utf8Path;
use depsort_config::{Manifest, SorterSettings};
use depsort_core::DepSortResult;
use depsort_resolver::SorterResult;
use tracing::{debug, info};

pub mod check;
pub mod explain;
pub mod order;


use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub output: OutputHandler,
    /// Apply the `DEPSORT_*` environment overrides
    pub env_overrides: bool,
}

impl CommandContext {
    pub fn new() -> Self {
        Self {
            output: OutputHandler::new(),
            env_overrides: true,
        }
    }

    /// Manifest settings with the environment overrides applied
    pub fn settings(&self, manifest: &Manifest) -> DepSortResult<SorterSettings> {
        if self.env_overrides {
            manifest.sorter.with_env_overrides()
        } else {
            Ok(manifest.sorter)
        }
    }
}

impl Default for CommandContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A loaded manifest and its sort
pub struct Sorted {
    pub manifest: Manifest,
    pub settings: SorterSettings,
    pub result: SorterResult,
}

/// Loads `path` and sorts it; `adjust` applies the command line flags
pub fn load_and_sort(
    path: &Utf8Path,
    ctx: &CommandContext,
    adjust: impl FnOnce(&mut SorterSettings),
) -> anyhow::Result<Sorted> {
    let manifest = depsort_config::load_manifest(path)
        .with_context(|| format!("Failed to load manifest '{path}'"))?;
    let mut settings = ctx.settings(&manifest)?;
    adjust(&mut settings);
    debug!(?settings, items = manifest.items.len(), "manifest loaded");

    let result = manifest.order_with(&settings);
    Ok(Sorted {
        manifest,
        settings,
        result,
    })
}

/// Dispatch a command to its handler
pub fn dispatch_command(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    match command {
        Commands::Order {
            manifest,
            reverse,
            skip_container_deps,
            json,
        } => {
            info!("Ordering {}", manifest);
            let args = order::OrderArgs {
                reverse,
                skip_container_deps,
                json,
            };
            order::execute(&manifest, args, ctx)
        }
        Commands::Check { manifest } => {
            info!("Checking {}", manifest);
            check::execute(&manifest, ctx)
        }
        Commands::Explain { manifest, name } => {
            info!("Explaining '{}' in {}", name, manifest);
            explain::execute(&manifest, &name, ctx)
        }
    }
}

/// Closest candidate within two edits, ignoring case
pub fn suggest_similar_name<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let input = input.to_lowercase();
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        let distance = edit_distance(&input, &candidate.to_lowercase());
        if distance < best_distance && distance <= 2 {
            best_distance = distance;
            best_match = Some(candidate);
        }
    }

    best_match.map(str::to_string)
}

/// Levenshtein distance
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single row, `previous` holds the diagonal
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut previous = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let next = (row[j] + 1).min(row[j - 1] + 1).min(previous + cost);
            previous = row[j];
            row[j] = next;
        }
    }
    row[b.len()]
}
