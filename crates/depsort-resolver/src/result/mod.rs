//! Sort outcome.
//!
//! A `SorterResult` owns the entry graph of one sort. Sorted items are cheap
//! `SortedItem` views borrowing it; every derived flag is recomputed on
//! access so that `set_consider_required_missing_as_structure_error` can be
//! flipped after the fact.

use crate::graph::{Entry, EntryGraph, EntryId};
use crate::issue::{DependentItemIssue, IssueReport};
use crate::ResolverResult;
use depsort_core::{DepSortError, IssueSink, ItemHandle, ItemKind, SinkLevel};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::fmt::Write as _;

/// Relation between two consecutive elements of a detected cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleRelation {
    /// First element of the cycle
    Start,
    Requires,
    RequiredBy,
    /// A required-by declared on the target, seen from the requiring side
    RequiredByRequires,
    Generalization,
    ElementOfContainer,
    Contains,
    ElementOf,
    ContainsMember,
}

impl CycleRelation {
    /// Symbol used in cycle strings
    pub fn symbol(self) -> &'static str {
        match self {
            CycleRelation::Start => "↳",
            CycleRelation::Requires => "⇀",
            CycleRelation::RequiredBy => "↽",
            CycleRelation::RequiredByRequires => "⇌",
            CycleRelation::Generalization => "↟",
            CycleRelation::ElementOfContainer => "⊏",
            CycleRelation::Contains => "⊐",
            CycleRelation::ElementOf => "∈",
            CycleRelation::ContainsMember => "∋",
        }
    }
}

impl fmt::Display for CycleRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One step of a detected cycle
#[derive(Clone)]
pub struct CycleExplainedElement {
    relation: CycleRelation,
    item: ItemHandle,
}

impl CycleExplainedElement {
    pub(crate) fn new(relation: CycleRelation, item: ItemHandle) -> Self {
        Self { relation, item }
    }

    pub fn relation(&self) -> CycleRelation {
        self.relation
    }

    pub fn item(&self) -> &ItemHandle {
        &self.item
    }

    pub fn full_name(&self) -> &str {
        self.item.full_name()
    }
}

impl fmt::Display for CycleExplainedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.relation, self.full_name())
    }
}

impl fmt::Debug for CycleExplainedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CycleExplainedElement({self})")
    }
}

/// Result of `DependencySorter::order`
pub struct SorterResult {
    pub(crate) graph: EntryGraph,
    /// Present when ranking ran to completion and nothing withheld the order
    pub(crate) sorted: Option<Vec<EntryId>>,
    /// Position of every entry in `sorted`
    pub(crate) positions: Vec<usize>,
    pub(crate) cycle: Option<Vec<CycleExplainedElement>>,
    pub(crate) issues: Vec<DependentItemIssue>,
    pub(crate) start_error_count: usize,
    pub(crate) has_start_fatal: bool,
    pub(crate) has_severe_structure_error: bool,
    consider_required_missing: bool,
}

impl SorterResult {
    pub(crate) fn new(graph: EntryGraph, issues: Vec<DependentItemIssue>) -> Self {
        Self {
            graph,
            sorted: None,
            positions: Vec::new(),
            cycle: None,
            issues,
            start_error_count: 0,
            has_start_fatal: false,
            has_severe_structure_error: false,
            consider_required_missing: true,
        }
    }

    pub(crate) fn set_sorted(&mut self, sorted: Vec<EntryId>) {
        let mut positions = vec![0; self.graph.len()];
        for (pos, id) in sorted.iter().enumerate() {
            positions[id.index()] = pos;
        }
        self.positions = positions;
        self.sorted = Some(sorted);
    }

    /// Sorted items, `None` on a cycle, a severe structure error or a start error
    pub fn sorted_items(&self) -> Option<Vec<SortedItem<'_>>> {
        self.sorted
            .as_ref()
            .map(|sorted| sorted.iter().map(|&id| self.view(id)).collect())
    }

    /// Names of the sorted entries, `None` when no order was produced
    pub fn sorted_full_names(&self) -> Option<Vec<&str>> {
        self.sorted
            .as_ref()
            .map(|sorted| sorted.iter().map(|&id| self.graph.entry(id).full_name()).collect())
    }

    /// Sorted item (or head, `<name>.Head`) by full name
    pub fn find(&self, full_name: &str) -> Option<SortedItem<'_>> {
        self.sorted
            .as_ref()?
            .iter()
            .find(|&&id| self.graph.entry(id).full_name() == full_name)
            .map(|&id| self.view(id))
    }

    /// First cycle found, starting and ending on the same item
    pub fn cycle_detected(&self) -> Option<&[CycleExplainedElement]> {
        self.cycle.as_deref()
    }

    /// Space-joined cycle, `↳ A ⇀ B ⇀ A`
    pub fn cycle_explained_string(&self) -> Option<String> {
        self.cycle.as_ref().map(|cycle| {
            cycle
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    /// One issue per item with a problem, in registration order
    pub fn item_issues(&self) -> &[DependentItemIssue] {
        &self.issues
    }

    pub fn start_error_count(&self) -> usize {
        self.start_error_count
    }

    /// Check if a start hook stopped the sort
    pub fn has_start_fatal(&self) -> bool {
        self.has_start_fatal
    }

    /// Check if a structure error prevented ranking
    pub fn has_severe_structure_error(&self) -> bool {
        self.has_severe_structure_error
    }

    pub fn has_required_missing(&self) -> bool {
        self.issues.iter().any(|i| i.required_missing_count() > 0)
    }

    pub fn consider_required_missing_as_structure_error(&self) -> bool {
        self.consider_required_missing
    }

    pub fn set_consider_required_missing_as_structure_error(&mut self, consider: bool) {
        self.consider_required_missing = consider;
    }

    /// Items with a structure error, required missing ones included when configured
    pub fn structure_error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.is_structure_error(self.consider_required_missing))
            .count()
    }

    pub fn has_structure_error(&self) -> bool {
        self.structure_error_count() > 0
    }

    /// Check if the sort produced an order without any error
    pub fn is_complete(&self) -> bool {
        self.cycle.is_none()
            && !self.has_structure_error()
            && !self.has_start_fatal
            && self.start_error_count == 0
    }

    /// `'Item' => {'a', 'b'}` per item with required missing references,
    /// `None` when nothing required is missing
    pub fn required_missing_description(&self) -> Option<String> {
        if !self.has_required_missing() {
            return None;
        }
        let description = self
            .issues
            .iter()
            .filter(|i| i.required_missing_count() > 0)
            .map(|i| {
                let mut missing = i.required_missing_list();
                if let Some(generalization) = i.missing_generalization() {
                    if !missing.is_empty() {
                        missing.push_str(", ");
                    }
                    let _ = write!(missing, "'{generalization}'");
                }
                format!("'{}' => {{{}}}", i.full_name(), missing)
            })
            .collect::<Vec<_>>()
            .join(", ");
        Some(description)
    }

    /// Turns an incomplete result into an error
    pub fn ensure_complete(&self) -> ResolverResult<()> {
        if let Some(cycle) = self.cycle_explained_string() {
            return Err(DepSortError::CircularDependency { cycle });
        }
        let reason = if self.has_start_fatal {
            "a fatal error has been raised during sort start".to_string()
        } else if self.start_error_count > 0 {
            format!("{} error(s) have been raised during sort start", self.start_error_count)
        } else if self.has_structure_error() {
            format!("{} item(s) have structure errors", self.structure_error_count())
        } else {
            return Ok(());
        };
        Err(DepSortError::Incomplete { reason })
    }

    /// Reports why the result is not complete; does nothing when it is
    pub fn log_error(&self, sink: &mut dyn IssueSink) {
        if self.is_complete() {
            return;
        }
        for issue in &self.issues {
            if issue.is_structure_error(self.consider_required_missing) {
                sink.open_group(SinkLevel::Error, &format!("Errors on '{}'", issue.full_name()));
                issue.log_error(sink);
                sink.close_group();
            }
        }
        if let Some(cycle) = self.cycle_explained_string() {
            sink.error(&format!("Cycle detected: {cycle}."));
        }
        if self.has_start_fatal {
            sink.error("A fatal error has been raised during sort start.");
        } else if self.start_error_count > 0 {
            sink.error(&format!(
                "{} error(s) have been raised during sort start.",
                self.start_error_count
            ));
        }
    }

    /// Serializable snapshot
    pub fn report(&self) -> SortReport {
        SortReport {
            complete: self.is_complete(),
            sorted: self
                .sorted_items()
                .map(|items| items.iter().map(SortedItem::to_report).collect()),
            cycle: self.cycle_explained_string(),
            issues: self.issues.iter().map(DependentItemIssue::to_report).collect(),
            structure_error_count: self.structure_error_count(),
            start_error_count: self.start_error_count,
            has_start_fatal: self.has_start_fatal,
            has_severe_structure_error: self.has_severe_structure_error,
        }
    }

    fn view(&self, id: EntryId) -> SortedItem<'_> {
        SortedItem { result: self, id }
    }
}

impl fmt::Debug for SorterResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SorterResult")
            .field("sorted", &self.sorted_full_names())
            .field("cycle", &self.cycle_explained_string())
            .field("issues", &self.issues)
            .field("start_error_count", &self.start_error_count)
            .field("has_start_fatal", &self.has_start_fatal)
            .field("has_severe_structure_error", &self.has_severe_structure_error)
            .finish()
    }
}

/// Read-only view of one sorted entry
#[derive(Clone, Copy)]
pub struct SortedItem<'a> {
    result: &'a SorterResult,
    id: EntryId,
}

impl<'a> SortedItem<'a> {
    fn entry(&self) -> &'a Entry {
        self.result.graph.entry(self.id)
    }

    fn related(&self, id: EntryId) -> SortedItem<'a> {
        SortedItem {
            result: self.result,
            id,
        }
    }

    fn related_all(&self, ids: impl IntoIterator<Item = EntryId>) -> Vec<SortedItem<'a>> {
        ids.into_iter().map(|id| self.related(id)).collect()
    }

    /// Item name, or `<name>.Head` for a head
    pub fn full_name(&self) -> &'a str {
        self.entry().full_name()
    }

    pub fn item(&self) -> &'a ItemHandle {
        &self.entry().item
    }

    /// Position in the sorted list
    pub fn index(&self) -> usize {
        self.result.positions[self.id.index()]
    }

    /// Layer of the entry, 0 for entries without predecessors
    pub fn rank(&self) -> usize {
        self.entry().rank.unwrap_or_default()
    }

    pub fn item_kind(&self) -> ItemKind {
        self.entry().kind
    }

    /// Tail entry of a group or container
    pub fn is_group(&self) -> bool {
        self.entry().head.is_some()
    }

    /// Check if this is the head entry of a group
    pub fn is_group_head(&self) -> bool {
        self.entry().is_head()
    }

    /// Head entry of this group
    pub fn head_for_group(&self) -> Option<SortedItem<'a>> {
        self.entry().head.map(|id| self.related(id))
    }

    pub fn group_for_head(&self) -> Option<SortedItem<'a>> {
        self.entry().group.map(|id| self.related(id))
    }

    /// Effective container, declared or inherited
    pub fn container(&self) -> Option<SortedItem<'a>> {
        self.entry().container.map(|id| self.related(id))
    }

    /// Container set by the item itself or by a child list
    pub fn configured_container(&self) -> Option<SortedItem<'a>> {
        self.entry().configured_container.map(|id| self.related(id))
    }

    pub fn generalization(&self) -> Option<SortedItem<'a>> {
        self.entry().generalization.map(|id| self.related(id))
    }

    /// Requirements not already implied by another requirement
    pub fn requires(&self) -> Vec<SortedItem<'a>> {
        self.related_all(self.entry().clean_requires.iter().copied())
    }

    /// Requirements as declared, required-by of other items included
    pub fn direct_requires(&self) -> Vec<SortedItem<'a>> {
        self.related_all(self.entry().requires.keys().copied())
    }

    /// Transitive requirements in sorted order
    pub fn all_requires(&self) -> Vec<SortedItem<'a>> {
        let graph = &self.result.graph;
        let mut seen = HashSet::new();
        let mut pending: Vec<EntryId> = self.entry().requires.keys().copied().collect();
        while let Some(id) = pending.pop() {
            if seen.insert(id) {
                pending.extend(graph.entry(id).requires.keys().copied());
            }
        }
        self.in_sorted_order(seen)
    }

    /// Groups the item is a member of
    pub fn groups(&self) -> Vec<SortedItem<'a>> {
        self.related_all(self.entry().groups.iter().copied())
    }

    /// Contained items and group members
    pub fn children(&self) -> Vec<SortedItem<'a>> {
        self.related_all(self.entry().children.iter().copied())
    }

    /// Children of children, without duplicates, in sorted order
    pub fn all_children(&self) -> Vec<SortedItem<'a>> {
        let graph = &self.result.graph;
        let mut seen = HashSet::new();
        let mut pending: Vec<EntryId> = self.entry().children.iter().copied().collect();
        while let Some(id) = pending.pop() {
            if id != self.id && seen.insert(id) {
                pending.extend(graph.entry(id).children.iter().copied());
            }
        }
        self.in_sorted_order(seen)
    }

    /// Not contained, in no group and required by nothing
    pub fn is_entry_point(&self) -> bool {
        let entry = self.entry();
        !entry.is_head()
            && entry.container.is_none()
            && entry.groups.is_empty()
            && !entry.required_by_others
    }

    fn in_sorted_order(&self, ids: HashSet<EntryId>) -> Vec<SortedItem<'a>> {
        let mut items = self.related_all(ids);
        items.sort_by_key(SortedItem::index);
        items
    }

    /// Multi-line dump: kind letter, name, rank then relations
    pub fn to_string_details(&self) -> String {
        let mut out = String::new();
        let names = |items: Vec<SortedItem<'_>>| {
            items
                .iter()
                .map(|i| i.full_name().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let one = |item: Option<SortedItem<'_>>| {
            item.map(|i| i.full_name().to_string())
                .unwrap_or_else(|| "(null)".to_string())
        };
        let _ = writeln!(out, "{} - {} -[{}]", self.item_kind().letter(), self.full_name(), self.rank());
        let _ = writeln!(out, "| Container = {}", one(self.container()));
        let _ = writeln!(out, "| Generalization = {}", one(self.generalization()));
        let _ = writeln!(out, "| Requires = {}", names(self.requires()));
        let _ = writeln!(out, "| Groups = {}", names(self.groups()));
        if self.is_group() {
            let _ = writeln!(out, "| Children = {}", names(self.children()));
        }
        out
    }

    pub fn to_report(&self) -> SortedEntryReport {
        let name = |item: SortedItem<'_>| item.full_name().to_string();
        SortedEntryReport {
            index: self.index(),
            rank: self.rank(),
            full_name: self.full_name().to_string(),
            kind: self.item_kind(),
            is_head: self.is_group_head(),
            container: self.container().map(name),
            generalization: self.generalization().map(name),
            requires: self.requires().into_iter().map(name).collect(),
            groups: self.groups().into_iter().map(name).collect(),
        }
    }
}

impl fmt::Display for SortedItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

impl fmt::Debug for SortedItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedItem")
            .field("full_name", &self.full_name())
            .field("rank", &self.rank())
            .field("index", &self.index())
            .finish()
    }
}

impl PartialEq for SortedItem<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.result, other.result) && self.id == other.id
    }
}

impl Eq for SortedItem<'_> {}

/// Logs every sorted item's details under one group
pub fn log_sorted(items: &[SortedItem<'_>], sink: &mut dyn IssueSink, level: SinkLevel) {
    sink.open_group(level, "Sorted items (C - for container, G - for group and I - for item)");
    for item in items {
        sink.log(level, item.to_string_details().trim_end());
    }
    sink.close_group();
}

/// Serializable view of a whole result
#[derive(Debug, Clone, Serialize)]
pub struct SortReport {
    pub complete: bool,
    pub sorted: Option<Vec<SortedEntryReport>>,
    /// Cycle as rendered by `SorterResult::cycle_explained_string`
    pub cycle: Option<String>,
    pub issues: Vec<IssueReport>,
    pub structure_error_count: usize,
    pub start_error_count: usize,
    pub has_start_fatal: bool,
    pub has_severe_structure_error: bool,
}

/// Serializable view of one sorted entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortedEntryReport {
    pub index: usize,
    /// Layer in the order
    pub rank: usize,
    pub full_name: String,
    pub kind: ItemKind,
    /// Set for `<Name>.Head` entries
    pub is_head: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generalization: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}
