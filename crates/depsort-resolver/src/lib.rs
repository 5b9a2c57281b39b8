//! # depsort-resolver
//!
//! Orders dependent items: containers before their content, base items before
//! their specializations, requirements before the items that require them.
//!
//! A sort runs in stages:
//! - `discovery`: closure of the seed items through every live reference
//! - `graph`: entries (plus a head per group) and the ordering edges between them
//! - `rank`: layered topological ranks, or the first cycle found
//! - `result`: the sorted view, the issues and the completeness flags
//!
//! Malformed input never fails the sort; it is reported on the `SorterResult`.

pub mod discovery;
pub mod graph;
pub mod issue;
pub mod options;
pub mod rank;
pub mod result;
pub mod sorter;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use discovery::Discoverer;
pub use issue::{DependentItemIssue, IssueReport};
pub use options::{InputHook, OutputHook, SorterOptions};
pub use result::{
    log_sorted, CycleExplainedElement, CycleRelation, SortReport, SortedEntryReport, SortedItem,
    SorterResult,
};
pub use sorter::{order_items, DependencySorter};

/// Result alias for fallible resolver helpers
pub type ResolverResult<T> = Result<T, depsort_core::DepSortError>;
