//! `depsort explain`

use super::{load_and_sort, suggest_similar_name, CommandContext};
use camino::Utf8Path;
use depsort_core::{DepSortError, DepSortResult};
use depsort_resolver::SorterResult;

/// Print the details of one sorted item
pub fn execute(path: &Utf8Path, name: &str, ctx: &CommandContext) -> anyhow::Result<()> {
    let sorted = load_and_sort(path, ctx, |_| {})?;
    let details = explain(&sorted.result, name)?;
    ctx.output.print(details.trim_end());
    Ok(())
}

/// Details of the sorted entry named `name`
pub fn explain(result: &SorterResult, name: &str) -> DepSortResult<String> {
    if let Some(item) = result.find(name) {
        return Ok(item.to_string_details());
    }
    let Some(items) = result.sorted_items() else {
        result.ensure_complete()?;
        return Err(DepSortError::Incomplete {
            reason: "nothing has been sorted".to_string(),
        });
    };

    let mut reason = format!("no sorted item is named '{name}'");
    if let Some(suggestion) = suggest_similar_name(name, items.iter().map(|i| i.full_name())) {
        reason.push_str(&format!(", did you mean '{suggestion}'?"));
    }
    Err(DepSortError::validation("name", reason))
}
