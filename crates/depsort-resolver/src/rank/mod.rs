//! Layered ranking and cycle detection.
//!
//! `rank(e) = 0` without predecessors, `1 + max(rank(p))` otherwise. The walk
//! is an explicit-stack depth-first search: an entry is `InProgress` while on
//! the stack, so reaching one again closes a cycle made of the stack slice
//! from that entry to the top.

use crate::graph::{EdgeKind, EntryGraph, EntryId};
use crate::result::{CycleExplainedElement, CycleRelation};
use std::collections::BTreeSet;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    entry: EntryId,
    /// Edge followed to reach this entry, `None` for a walk root
    via: Option<EdgeKind>,
    next: usize,
    rank: usize,
}

impl Frame {
    fn new(entry: EntryId, via: Option<EdgeKind>) -> Self {
        Self {
            entry,
            via,
            next: 0,
            rank: 0,
        }
    }
}

/// Ranks every entry, walking roots in entry order.
///
/// Returns the highest rank, or the first cycle met.
pub(crate) fn compute_ranks(
    graph: &mut EntryGraph,
) -> Result<Option<usize>, Vec<CycleExplainedElement>> {
    let count = graph.len();
    let preds: Vec<Vec<(EntryId, EdgeKind)>> =
        graph.ids().map(|id| graph.predecessors(id)).collect();
    let mut state = vec![VisitState::Unvisited; count];
    let mut ranks = vec![0usize; count];

    for root in graph.ids().collect::<Vec<_>>() {
        if state[root.index()] != VisitState::Unvisited {
            continue;
        }
        state[root.index()] = VisitState::InProgress;
        let mut stack = vec![Frame::new(root, None)];

        while let Some(&Frame { entry, next, .. }) = stack.last() {
            match preds[entry.index()].get(next).copied() {
                Some((pred, kind)) => {
                    if let Some(top) = stack.last_mut() {
                        top.next += 1;
                    }
                    match state[pred.index()] {
                        VisitState::Resolved => {
                            if let Some(top) = stack.last_mut() {
                                top.rank = top.rank.max(ranks[pred.index()] + 1);
                            }
                        }
                        VisitState::InProgress => {
                            let cycle = explain_cycle(graph, &stack, pred, kind);
                            debug!(length = cycle.len(), "cycle detected while ranking");
                            return Err(cycle);
                        }
                        VisitState::Unvisited => {
                            state[pred.index()] = VisitState::InProgress;
                            stack.push(Frame::new(pred, Some(kind)));
                        }
                    }
                }
                None => {
                    let Some(done) = stack.pop() else { break };
                    ranks[done.entry.index()] = done.rank;
                    state[done.entry.index()] = VisitState::Resolved;
                    if let Some(parent) = stack.last_mut() {
                        parent.rank = parent.rank.max(done.rank + 1);
                    }
                }
            }
        }
    }

    for id in graph.ids().collect::<Vec<_>>() {
        graph.entry_mut(id).rank = Some(ranks[id.index()]);
    }
    let max_rank = ranks.iter().copied().max();
    trace!(entries = count, max_rank = ?max_rank, "ranks computed");
    Ok(max_rank)
}

/// Stack slice from `closing` to the top, closed by the edge that found it.
/// Head links are folded: a head shows under its group's name.
fn explain_cycle(
    graph: &EntryGraph,
    stack: &[Frame],
    closing: EntryId,
    closing_kind: EdgeKind,
) -> Vec<CycleExplainedElement> {
    let start = stack
        .iter()
        .rposition(|frame| frame.entry == closing)
        .unwrap_or(0);
    let mut elements = Vec::new();
    let item = |id: EntryId| graph.entry(id).item.clone();

    elements.push(CycleExplainedElement::new(CycleRelation::Start, item(stack[start].entry)));
    let steps = stack[start + 1..]
        .iter()
        .map(|frame| (frame.via, frame.entry))
        .chain(std::iter::once((Some(closing_kind), closing)));
    for (via, id) in steps {
        if let Some(EdgeKind::Relation(relation)) = via {
            elements.push(CycleExplainedElement::new(relation, item(id)));
        }
    }
    elements
}

/// Sorted flattening: rank, then full name (descending when `reverse_name`)
pub(crate) fn flatten(graph: &EntryGraph, reverse_name: bool) -> Vec<EntryId> {
    let mut ids: Vec<EntryId> = graph.ids().collect();
    ids.sort_by(|&a, &b| {
        let (ea, eb) = (graph.entry(a), graph.entry(b));
        ea.rank.cmp(&eb.rank).then_with(|| {
            let by_name = ea.full_name.cmp(&eb.full_name);
            if reverse_name {
                by_name.reverse()
            } else {
                by_name
            }
        })
    });
    ids
}

/// Transitive reduction of each entry's requirements.
///
/// `sorted` must be ranked: a requirement always has a lower rank than the
/// entry requiring it, so closures are complete when reused.
pub(crate) fn clean_requires(graph: &mut EntryGraph, sorted: &[EntryId]) {
    let mut closures: Vec<BTreeSet<EntryId>> = vec![BTreeSet::new(); graph.len()];
    for &id in sorted {
        let direct: Vec<EntryId> = graph.entry(id).requires.keys().copied().collect();
        let mut closure = BTreeSet::new();
        for &target in &direct {
            closure.insert(target);
            closure.extend(closures[target.index()].iter().copied());
        }
        let clean: Vec<EntryId> = direct
            .iter()
            .copied()
            .filter(|&target| {
                !direct
                    .iter()
                    .any(|&other| other != target && closures[other.index()].contains(&target))
            })
            .collect();
        closures[id.index()] = closure;
        graph.entry_mut(id).clean_requires = clean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Entry;
    use crate::testing::{handle, TestItem};
    use depsort_core::ItemKind;

    fn chain(names: &[&str]) -> (EntryGraph, Vec<EntryId>) {
        let mut graph = EntryGraph::new();
        let ids: Vec<EntryId> = names
            .iter()
            .map(|name| graph.add_entry(Entry::new(handle(&TestItem::item(name, &[])), ItemKind::Item)))
            .collect();
        (graph, ids)
    }

    fn requires() -> EdgeKind {
        EdgeKind::Relation(CycleRelation::Requires)
    }

    #[test]
    fn test_layered_ranks() {
        let (mut graph, ids) = chain(&["A", "B", "C", "D"]);
        graph.add_constraint(ids[1], ids[0], requires());
        graph.add_constraint(ids[2], ids[1], requires());
        graph.add_constraint(ids[3], ids[0], requires());

        assert_eq!(compute_ranks(&mut graph).ok(), Some(Some(2)));
        let ranks: Vec<Option<usize>> = ids.iter().map(|&id| graph.entry(id).rank).collect();
        assert_eq!(ranks, vec![Some(0), Some(1), Some(2), Some(1)]);

        let names: Vec<&str> = flatten(&graph, false)
            .into_iter()
            .map(|id| graph.entry(id).full_name())
            .collect();
        assert_eq!(names, vec!["A", "B", "D", "C"]);
        let names: Vec<&str> = flatten(&graph, true)
            .into_iter()
            .map(|id| graph.entry(id).full_name())
            .collect();
        assert_eq!(names, vec!["A", "D", "B", "C"]);
    }

    #[test]
    fn test_empty_graph_has_no_rank() {
        let mut graph = EntryGraph::new();
        assert_eq!(compute_ranks(&mut graph).ok(), Some(None));
    }

    #[test]
    fn test_cycle_is_explained_from_its_first_entry() {
        let (mut graph, ids) = chain(&["A", "B", "C"]);
        graph.add_constraint(ids[0], ids[1], requires());
        graph.add_constraint(ids[1], ids[2], requires());
        graph.add_constraint(ids[2], ids[1], EdgeKind::Relation(CycleRelation::Generalization));

        let cycle = compute_ranks(&mut graph).err().expect("cycle expected");
        let text: Vec<String> = cycle.iter().map(|e| e.to_string()).collect();
        assert_eq!(text, vec!["↳ B", "⇀ C", "↟ B"]);
    }

    #[test]
    fn test_self_requirement_is_a_cycle() {
        let (mut graph, ids) = chain(&["A"]);
        graph.add_constraint(ids[0], ids[0], requires());
        let cycle = compute_ranks(&mut graph).err().expect("cycle expected");
        let text: Vec<String> = cycle.iter().map(|e| e.to_string()).collect();
        assert_eq!(text, vec!["↳ A", "⇀ A"]);
    }

    #[test]
    fn test_clean_requires_is_a_transitive_reduction() {
        let (mut graph, ids) = chain(&["A", "B", "C"]);
        for (from, to) in [(1, 0), (2, 1), (2, 0)] {
            graph
                .entry_mut(ids[from])
                .requires
                .insert(ids[to], CycleRelation::Requires);
            graph.add_constraint(ids[from], ids[to], requires());
        }
        compute_ranks(&mut graph).ok();
        let sorted = flatten(&graph, false);
        clean_requires(&mut graph, &sorted);
        assert_eq!(graph.entry(ids[2]).clean_requires, vec![ids[1]]);
        assert_eq!(graph.entry(ids[1]).clean_requires, vec![ids[0]]);
    }
}
