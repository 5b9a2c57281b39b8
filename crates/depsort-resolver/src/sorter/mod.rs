//! Sort entry point.
//!
//! `DependencySorter` chains the stages: discovery, graph building, the
//! severity gate, the start hooks, ranking and the result assembly.

use crate::discovery::{discover, Discoverer};
use crate::graph::build;
use crate::options::SorterOptions;
use crate::rank::{clean_requires, compute_ranks, flatten};
use crate::result::SorterResult;
use depsort_core::{ItemHandle, StartSignal};
use tracing::{debug, error, warn};

/// Orders dependent items
pub struct DependencySorter<'a> {
    options: SorterOptions<'a>,
    discoverer: Option<&'a dyn Discoverer>,
}

impl<'a> DependencySorter<'a> {
    /// Create a sorter from options or a `reverse_name` flag
    pub fn new(options: impl Into<SorterOptions<'a>>) -> Self {
        Self {
            options: options.into(),
            discoverer: None,
        }
    }

    /// Supplies extra items for every discovered item
    pub fn with_discoverer(mut self, discoverer: &'a dyn Discoverer) -> Self {
        self.discoverer = Some(discoverer);
        self
    }

    pub fn options(&self) -> &SorterOptions<'a> {
        &self.options
    }

    /// Sorts the closure of `seed`. Duplicated seed items are ignored.
    pub fn order<I>(&mut self, seed: I) -> SorterResult
    where
        I: IntoIterator<Item = ItemHandle>,
    {
        let discovered = discover(seed, self.discoverer);
        debug!(
            items = discovered.len(),
            homonyms = discovered.homonyms.len(),
            "items discovered"
        );
        if let Some(hook) = self.options.hook_input.as_mut() {
            hook(&discovered.items);
        }

        let built = build(&discovered, self.options.skip_dependency_to_container);
        let has_severe = built.issues.has_severe();
        let mut graph = built.graph;
        let issues = built.issues.into_vec();

        if has_severe {
            warn!(issues = issues.len(), "severe structure error, sort aborted");
            let mut result = SorterResult::new(graph, issues);
            result.has_severe_structure_error = true;
            return result;
        }

        let mut start_error_count = 0;
        let mut has_start_fatal = false;
        for item in &discovered.items {
            match item.start_dependency_sort() {
                StartSignal::Ok => {}
                StartSignal::Error(message) => {
                    error!(item = item.full_name(), %message, "start error");
                    start_error_count += 1;
                }
                StartSignal::Fatal(message) => {
                    error!(item = item.full_name(), %message, "fatal start error");
                    has_start_fatal = true;
                    break;
                }
            }
        }

        if has_start_fatal {
            let mut result = SorterResult::new(graph, issues);
            result.start_error_count = start_error_count;
            result.has_start_fatal = true;
            return result;
        }

        let ranked = compute_ranks(&mut graph);
        let mut result = match ranked {
            Err(cycle) => {
                let mut result = SorterResult::new(graph, issues);
                result.cycle = Some(cycle);
                debug!(cycle = ?result.cycle_explained_string(), "sort stopped on a cycle");
                result
            }
            Ok(max_rank) => {
                let sorted = flatten(&graph, self.options.reverse_name);
                clean_requires(&mut graph, &sorted);
                debug!(entries = sorted.len(), max_rank = ?max_rank, "items sorted");
                let mut result = SorterResult::new(graph, issues);
                if start_error_count == 0 {
                    result.set_sorted(sorted);
                }
                result
            }
        };
        result.start_error_count = start_error_count;

        if let Some(hook) = self.options.hook_output.as_mut() {
            if let Some(sorted) = result.sorted_items() {
                hook(&sorted);
            }
        }
        result
    }
}

impl Default for DependencySorter<'_> {
    fn default() -> Self {
        Self::new(SorterOptions::default())
    }
}

/// One-shot sort of `seed`
pub fn order_items<'a, I>(
    seed: I,
    discoverer: Option<&'a dyn Discoverer>,
    options: impl Into<SorterOptions<'a>>,
) -> SorterResult
where
    I: IntoIterator<Item = ItemHandle>,
{
    let mut sorter = DependencySorter::new(options);
    if let Some(discoverer) = discoverer {
        sorter = sorter.with_discoverer(discoverer);
    }
    sorter.order(seed)
}
