//! `depsort check`

use super::{load_and_sort, CommandContext};
use camino::Utf8Path;
use depsort_core::{IssueSink, MemorySink, SinkLevel};
use depsort_resolver::SorterResult;
use tracing::debug;

/// Report the issues of a manifest without printing the order
pub fn execute(path: &Utf8Path, ctx: &CommandContext) -> anyhow::Result<()> {
    let sorted = load_and_sort(path, ctx, |_| {})?;
    let result = &sorted.result;

    let sink = collect_issues(result);
    debug!(
        settings = ?sorted.settings,
        lines = sink.lines().len(),
        errors = sink.count_at(SinkLevel::Error),
        "issues collected"
    );
    for line in sink.lines() {
        ctx.output.print(&ctx.output.format_line(line));
    }

    result.ensure_complete()?;
    ctx.output.success(&format!(
        "{} item(s) can be ordered",
        sorted.manifest.items.len()
    ));
    Ok(())
}

/// Errors of an incomplete result, or the remaining warnings of a complete one
pub fn collect_issues(result: &SorterResult) -> MemorySink {
    let mut sink = MemorySink::new();
    if result.is_complete() {
        for issue in result.item_issues() {
            sink.open_group(SinkLevel::Warn, &format!("Warnings on '{}'", issue.full_name()));
            issue.log_error(&mut sink);
            sink.close_group();
        }
    } else {
        result.log_error(&mut sink);
    }
    sink
}
