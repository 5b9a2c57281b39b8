//! `depsort order`

use super::{load_and_sort, CommandContext};
use crate::output::colors::ColorSupport;
use anyhow::Context;
use camino::Utf8Path;
use depsort_core::{DepSortError, DepSortResult, SinkLevel, TracingSink};
use depsort_resolver::{log_sorted, SorterResult};

/// Flags of the `order` command
pub struct OrderArgs {
    pub reverse: bool,
    pub skip_container_deps: bool,
    pub json: bool,
}

/// Sort a manifest and print the order
pub fn execute(path: &Utf8Path, args: OrderArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let sorted = load_and_sort(path, ctx, |settings| {
        settings.reverse_name |= args.reverse;
        settings.skip_dependency_to_container |= args.skip_container_deps;
    })?;
    let result = &sorted.result;

    if args.json {
        ctx.output.print(&render_json(result)?);
    } else if let Some(text) = render_text(result, ctx.output.colors()) {
        if let Some(items) = result.sorted_items() {
            log_sorted(&items, &mut TracingSink::new(), SinkLevel::Debug);
        }
        ctx.output.print(&text);
    }

    if !result.is_complete() {
        if !args.json {
            result.log_error(&mut ctx.output.sink());
        }
        result
            .ensure_complete()
            .with_context(|| format!("'{path}' cannot be fully ordered"))?;
    }
    Ok(())
}

/// `rank  full name` lines, `None` when nothing has been sorted
pub fn render_text(result: &SorterResult, colors: ColorSupport) -> Option<String> {
    let items = result.sorted_items()?;
    let width = items
        .iter()
        .map(|item| item.rank().to_string().len())
        .max()
        .unwrap_or(1);
    let lines: Vec<String> = items
        .iter()
        .map(|item| {
            let rank = format!("{:>width$}", item.rank());
            let name = if item.is_group_head() {
                colors.dim(item.full_name())
            } else {
                item.full_name().to_string()
            };
            format!("{}  {}", colors.cyan(&rank), name)
        })
        .collect();
    Some(lines.join("\n"))
}

/// Pretty-printed `SortReport`
pub fn render_json(result: &SorterResult) -> DepSortResult<String> {
    serde_json::to_string_pretty(&result.report())
        .map_err(|e| DepSortError::serialization("sort report", e))
}
