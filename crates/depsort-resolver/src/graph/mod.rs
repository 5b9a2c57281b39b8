//! Entry graph used for ordering.
//!
//! One entry per registered item, plus a head entry right before every group
//! or container. Edges go from an entry to the entries it must follow and are
//! tagged with the relation they come from so that a cycle can be explained.

mod builder;

pub(crate) use builder::build;

use crate::result::CycleRelation;
use depsort_core::{ItemHandle, ItemKind};
use indexmap::{IndexMap, IndexSet};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

/// Index of an entry in the graph
pub type EntryId = NodeIndex;

/// Why an entry must follow another one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// A group's tail follows its own head
    HeadLink,
    Relation(CycleRelation),
}

/// Ordering node
#[derive(Clone)]
pub struct Entry {
    pub(crate) item: ItemHandle,
    /// Item name, or `<name>.Head` for heads
    pub(crate) full_name: String,
    pub(crate) kind: ItemKind,
    /// Set on group entries
    pub(crate) head: Option<EntryId>,
    /// Set on head entries
    pub(crate) group: Option<EntryId>,
    pub(crate) container: Option<EntryId>,
    pub(crate) configured_container: Option<EntryId>,
    pub(crate) generalization: Option<EntryId>,
    /// Merged requires and required-by, with the relation each one comes from
    pub(crate) requires: IndexMap<EntryId, CycleRelation>,
    /// Transitive reduction of `requires`, filled once ranked
    pub(crate) clean_requires: Vec<EntryId>,
    pub(crate) groups: IndexSet<EntryId>,
    pub(crate) children: IndexSet<EntryId>,
    pub(crate) required_by_others: bool,
    pub(crate) rank: Option<usize>,
}

impl Entry {
    pub(crate) fn new(item: ItemHandle, kind: ItemKind) -> Self {
        let full_name = item.full_name().to_string();
        Self {
            item,
            full_name,
            kind,
            head: None,
            group: None,
            container: None,
            configured_container: None,
            generalization: None,
            requires: IndexMap::new(),
            clean_requires: Vec::new(),
            groups: IndexSet::new(),
            children: IndexSet::new(),
            required_by_others: false,
            rank: None,
        }
    }

    pub(crate) fn head_of(item: ItemHandle, kind: ItemKind) -> Self {
        let mut entry = Self::new(item, kind);
        entry.full_name.push_str(".Head");
        entry
    }

    /// Item name, with `.Head` for head entries
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Name of the item, the same for a group and its head
    pub fn item_name(&self) -> &str {
        self.item.full_name()
    }

    /// Check if this entry opens a group
    pub fn is_head(&self) -> bool {
        self.group.is_some()
    }
}

/// Entries and ordering edges
#[derive(Clone, Default)]
pub struct EntryGraph {
    pub(crate) graph: DiGraph<Entry, EdgeKind>,
}

impl EntryGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Entry behind `id`
    pub fn entry(&self, id: EntryId) -> &Entry {
        &self.graph[id]
    }

    pub(crate) fn entry_mut(&mut self, id: EntryId) -> &mut Entry {
        &mut self.graph[id]
    }

    /// Ids in creation order
    pub fn ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.graph.node_indices()
    }

    pub(crate) fn add_entry(&mut self, entry: Entry) -> EntryId {
        self.graph.add_node(entry)
    }

    /// `from` must come after `to`
    pub(crate) fn add_constraint(&mut self, from: EntryId, to: EntryId, kind: EdgeKind) {
        self.graph.add_edge(from, to, kind);
    }

    /// Entries `id` must follow, in insertion order
    pub fn predecessors(&self, id: EntryId) -> Vec<(EntryId, EdgeKind)> {
        // petgraph walks the adjacency list from the most recent edge
        let mut preds: Vec<_> = self
            .graph
            .edges(id)
            .map(|edge| (edge.target(), *edge.weight()))
            .collect();
        preds.reverse();
        preds
    }

    /// Entry that carries a group's ordering relations (its head) or the entry itself
    pub fn anchor(&self, id: EntryId) -> EntryId {
        self.graph[id].head.unwrap_or(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{handle, TestItem};

    #[test]
    fn test_head_entry_naming() {
        let item = handle(&TestItem::container("Package", &[]));
        let mut graph = EntryGraph::new();
        let head = graph.add_entry(Entry::head_of(ItemHandle::clone(&item), ItemKind::Container));
        let tail = graph.add_entry(Entry::new(item, ItemKind::Container));
        graph.entry_mut(head).group = Some(tail);
        graph.entry_mut(tail).head = Some(head);

        assert_eq!(graph.entry(head).full_name(), "Package.Head");
        assert_eq!(graph.entry(head).item_name(), "Package");
        assert!(graph.entry(head).is_head());
        assert!(!graph.entry(tail).is_head());
        assert_eq!(graph.anchor(tail), head);
    }

    #[test]
    fn test_predecessors_keep_insertion_order() {
        let mut graph = EntryGraph::new();
        let ids: Vec<EntryId> = ["A", "B", "C", "D"]
            .iter()
            .map(|name| {
                let item = handle(&TestItem::item(name, &[]));
                graph.add_entry(Entry::new(item, ItemKind::Item))
            })
            .collect();
        let requires = EdgeKind::Relation(CycleRelation::Requires);
        graph.add_constraint(ids[0], ids[2], requires);
        graph.add_constraint(ids[0], ids[1], EdgeKind::HeadLink);
        graph.add_constraint(ids[0], ids[3], requires);

        let preds: Vec<EntryId> = graph.predecessors(ids[0]).into_iter().map(|p| p.0).collect();
        assert_eq!(preds, vec![ids[2], ids[1], ids[3]]);
        assert!(graph.predecessors(ids[3]).is_empty());
        assert_eq!(graph.anchor(ids[0]), ids[0]);
    }
}
