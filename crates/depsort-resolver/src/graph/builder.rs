//! Turns discovered items into entries and ordering edges.
//!
//! Named references are bound here, every inconsistency is recorded on the
//! issue of the item that declares it. Containers are resolved in this order
//! of precedence: the one an item declares, the one it inherits from its
//! generalization, the first container listing it as a child.

use super::{EdgeKind, Entry, EntryGraph, EntryId};
use crate::discovery::Discovered;
use crate::issue::IssueLedger;
use crate::result::CycleRelation;
use depsort_core::{resolve_kind, ItemKind, StructureError};
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

/// Output of the build stage
pub(crate) struct Built {
    pub graph: EntryGraph,
    /// Main entry of every registered item, by registration index
    #[cfg(test)]
    pub entries: Vec<EntryId>,
    pub issues: IssueLedger,
}

/// Relations bound to registration indexes
struct Bound {
    kinds: Vec<ItemKind>,
    /// Item declared a container reference, resolved or not
    declares_container: Vec<bool>,
    declared_container: Vec<Option<usize>>,
    /// Containers listing the item as a child
    claims: Vec<IndexSet<usize>>,
    generalization: Vec<Option<usize>>,
    container: Vec<Option<usize>>,
    configured_container: Vec<Option<usize>>,
    groups: Vec<IndexSet<usize>>,
    requires: Vec<IndexMap<usize, CycleRelation>>,
}

impl Bound {
    fn new(kinds: Vec<ItemKind>) -> Self {
        let n = kinds.len();
        Self {
            kinds,
            declares_container: vec![false; n],
            declared_container: vec![None; n],
            claims: vec![IndexSet::new(); n],
            generalization: vec![None; n],
            container: vec![None; n],
            configured_container: vec![None; n],
            groups: vec![IndexSet::new(); n],
            requires: vec![IndexMap::new(); n],
        }
    }
}

pub(crate) fn build(discovered: &Discovered, skip_dependency_to_container: bool) -> Built {
    let mut issues = IssueLedger::default();
    for (holder, other) in &discovered.homonyms {
        issues
            .on(*holder, &discovered.items[*holder])
            .add_homonym(other.clone());
    }

    let kinds = discovered
        .items
        .iter()
        .map(|item| resolve_kind(item.as_ref()))
        .collect();
    let mut bound = Bound::new(kinds);

    bind_children(discovered, &mut bound, &mut issues);
    bind_declared_containers(discovered, &mut bound, &mut issues);
    bind_generalizations(discovered, &mut bound, &mut issues);
    resolve_containers(&mut bound);
    report_extraneous_containers(discovered, &bound, &mut issues);
    bind_groups(discovered, &mut bound, &mut issues);
    bind_requirements(discovered, &mut bound, &mut issues, skip_dependency_to_container);

    let (graph, _entries) = create_entries(discovered, &bound);
    debug!(
        items = discovered.len(),
        entries = graph.len(),
        "dependency graph built"
    );
    Built {
        graph,
        #[cfg(test)]
        entries: _entries,
        issues,
    }
}

/// Children lists: container claims, group memberships, refused children
fn bind_children(discovered: &Discovered, bound: &mut Bound, issues: &mut IssueLedger) {
    for (idx, item) in discovered.items.iter().enumerate() {
        let Some(group) = item.as_group() else {
            continue;
        };
        let children = group.children();
        if bound.kinds[idx] == ItemKind::Item {
            if !children.is_empty() {
                let live = children.iter().any(|c| c.live_item().is_some());
                issues.on(idx, item).refuse_children(live);
            }
            continue;
        }
        for child in &children {
            match discovered.lookup(child) {
                None if child.is_optional() => {}
                None => issues.on(idx, item).add_missing_child(child.full_name()),
                Some(c) if bound.kinds[idx] == ItemKind::Container => {
                    bound.claims[c].insert(idx);
                }
                Some(c) => {
                    bound.groups[c].insert(idx);
                }
            }
        }
    }
}

fn bind_declared_containers(discovered: &Discovered, bound: &mut Bound, issues: &mut IssueLedger) {
    for (idx, item) in discovered.items.iter().enumerate() {
        let Some(reference) = item.container() else {
            continue;
        };
        bound.declares_container[idx] = true;
        let name = reference.full_name();
        match discovered.lookup(&reference) {
            None if reference.is_optional() => {}
            None => issues
                .on(idx, item)
                .set_container_error(StructureError::MISSING_NAMED_CONTAINER, name),
            Some(c) if bound.kinds[c] == ItemKind::Container => {
                bound.declared_container[idx] = Some(c);
            }
            Some(c) => {
                let refuses = discovered.items[c]
                    .as_group()
                    .and_then(|g| g.as_typed())
                    .is_some();
                let error = if refuses {
                    StructureError::EXISTING_CONTAINER_ASKED_TO_NOT_BE_A_CONTAINER
                } else {
                    StructureError::EXISTING_ITEM_IS_NOT_A_CONTAINER
                };
                issues.on(idx, item).set_container_error(error, name);
            }
        }
    }
}

fn bind_generalizations(discovered: &Discovered, bound: &mut Bound, issues: &mut IssueLedger) {
    for (idx, item) in discovered.items.iter().enumerate() {
        let Some(reference) = item.generalization() else {
            continue;
        };
        match discovered.lookup(&reference) {
            Some(g) => bound.generalization[idx] = Some(g),
            None if reference.is_optional() => {}
            None => issues
                .on(idx, item)
                .set_missing_generalization(reference.full_name()),
        }
    }
}

/// Effective and configured containers.
///
/// Walks generalization chains without recursion; a generalization cycle
/// inherits nothing (ranking reports the cycle).
fn resolve_containers(bound: &mut Bound) {
    let n = bound.kinds.len();
    let mut resolved: Vec<Option<Option<usize>>> = vec![None; n];
    let mut on_chain = vec![false; n];

    for start in 0..n {
        if resolved[start].is_some() {
            continue;
        }
        let mut chain = Vec::new();
        let mut current = Some(start);
        let mut inherited = None;
        while let Some(idx) = current {
            if let Some(known) = resolved[idx] {
                inherited = known;
                break;
            }
            if on_chain[idx] {
                inherited = None;
                break;
            }
            if bound.declares_container[idx] {
                let declared = bound.declared_container[idx];
                resolved[idx] = Some(declared);
                bound.configured_container[idx] = declared;
                inherited = declared;
                break;
            }
            on_chain[idx] = true;
            chain.push(idx);
            current = bound.generalization[idx];
        }
        for &idx in chain.iter().rev() {
            let value = match inherited {
                Some(container) => Some(container),
                None => {
                    let claimed = bound.claims[idx].first().copied();
                    bound.configured_container[idx] = claimed;
                    claimed
                }
            };
            resolved[idx] = Some(value);
            on_chain[idx] = false;
            inherited = value;
        }
    }

    for (idx, value) in resolved.into_iter().enumerate() {
        bound.container[idx] = value.flatten();
    }
}

fn report_extraneous_containers(discovered: &Discovered, bound: &Bound, issues: &mut IssueLedger) {
    for (idx, item) in discovered.items.iter().enumerate() {
        let effective = bound.container[idx];
        for &claimant in &bound.claims[idx] {
            if Some(claimant) != effective {
                let claimant_name = discovered.items[claimant].full_name();
                issues.on(idx, item).add_extraneous_container(claimant_name);
            }
        }
    }
}

fn bind_groups(discovered: &Discovered, bound: &mut Bound, issues: &mut IssueLedger) {
    for (idx, item) in discovered.items.iter().enumerate() {
        let mut groups = IndexSet::new();
        for reference in item.groups() {
            match discovered.lookup(&reference) {
                None if reference.is_optional() => {}
                None => issues.on(idx, item).add_missing_group(reference.full_name()),
                Some(g) if bound.kinds[g].is_group() => {
                    groups.insert(g);
                }
                Some(_) => issues.on(idx, item).add_invalid_group(reference.full_name()),
            }
        }
        // Memberships coming from the groups' children lists come last.
        groups.extend(bound.groups[idx].iter().copied());
        bound.groups[idx] = groups;
    }
}

fn bind_requirements(
    discovered: &Discovered,
    bound: &mut Bound,
    issues: &mut IssueLedger,
    skip_dependency_to_container: bool,
) {
    for (idx, item) in discovered.items.iter().enumerate() {
        for reference in item.requires() {
            match discovered.lookup(&reference) {
                Some(target) => {
                    bound.requires[idx].insert(target, CycleRelation::Requires);
                }
                None => issues.on(idx, item).add_missing_dependency(&reference),
            }
        }
    }
    // Missing required-by targets are meaningless and silently ignored.
    for (idx, item) in discovered.items.iter().enumerate() {
        for reference in item.required_by() {
            if let Some(target) = discovered.lookup(&reference) {
                bound.requires[target]
                    .entry(idx)
                    .or_insert(CycleRelation::RequiredByRequires);
            }
        }
    }
    for idx in 0..bound.requires.len() {
        if let Some(generalization) = bound.generalization[idx] {
            bound.requires[idx].shift_remove(&generalization);
        }
        if skip_dependency_to_container {
            // Every enclosing container, the loop guard stops on container cycles.
            let mut current = bound.container[idx];
            let mut steps = 0;
            while let Some(container) = current {
                bound.requires[idx].shift_remove(&container);
                steps += 1;
                if steps > bound.kinds.len() {
                    break;
                }
                current = bound.container[container];
            }
        }
    }
}

fn create_entries(discovered: &Discovered, bound: &Bound) -> (EntryGraph, Vec<EntryId>) {
    let mut graph = EntryGraph::new();
    let mut entries = Vec::with_capacity(discovered.len());
    let mut heads = Vec::with_capacity(discovered.len());

    for (idx, item) in discovered.items.iter().enumerate() {
        let kind = bound.kinds[idx];
        let head = kind
            .is_group()
            .then(|| graph.add_entry(Entry::head_of(item.clone(), kind)));
        let id = graph.add_entry(Entry::new(item.clone(), kind));
        if let Some(head) = head {
            graph.entry_mut(head).group = Some(id);
            graph.entry_mut(id).head = Some(head);
        }
        entries.push(id);
        heads.push(head);
    }

    // Relation fields
    for idx in 0..entries.len() {
        let id = entries[idx];
        let container = bound.container[idx].map(|c| entries[c]);
        let entry = graph.entry_mut(id);
        entry.container = container;
        entry.configured_container = bound.configured_container[idx].map(|c| entries[c]);
        entry.generalization = bound.generalization[idx].map(|g| entries[g]);
        entry.requires = bound.requires[idx]
            .iter()
            .map(|(&target, &relation)| (entries[target], relation))
            .collect();
        entry.groups = bound.groups[idx].iter().map(|&g| entries[g]).collect();
        if let Some(head) = heads[idx] {
            graph.entry_mut(head).container = container;
        }
        for &target in bound.requires[idx].keys() {
            graph.entry_mut(entries[target]).required_by_others = true;
        }
    }
    for idx in 0..entries.len() {
        if let Some(container) = bound.container[idx] {
            graph.entry_mut(entries[container]).children.insert(entries[idx]);
        }
        for &group in &bound.groups[idx] {
            graph.entry_mut(entries[group]).children.insert(entries[idx]);
        }
    }

    // Ordering edges: the anchor (head for groups) carries the item's relations.
    for idx in 0..entries.len() {
        let id = entries[idx];
        let anchor = heads[idx].unwrap_or(id);
        if let Some(container) = bound.container[idx] {
            if let Some(container_head) = heads[container] {
                graph.add_constraint(
                    anchor,
                    container_head,
                    EdgeKind::Relation(CycleRelation::ElementOfContainer),
                );
            }
        }
        for &group in &bound.groups[idx] {
            if let Some(group_head) = heads[group] {
                graph.add_constraint(
                    anchor,
                    group_head,
                    EdgeKind::Relation(CycleRelation::ElementOf),
                );
            }
        }
        if let Some(generalization) = bound.generalization[idx] {
            graph.add_constraint(
                anchor,
                entries[generalization],
                EdgeKind::Relation(CycleRelation::Generalization),
            );
        }
        for (&target, &relation) in &bound.requires[idx] {
            graph.add_constraint(anchor, entries[target], EdgeKind::Relation(relation));
        }
        if let Some(head) = heads[idx] {
            graph.add_constraint(id, head, EdgeKind::HeadLink);
            let children: Vec<EntryId> = graph.entry(id).children.iter().copied().collect();
            for child in children {
                let relation = if graph.entry(child).container == Some(id) {
                    CycleRelation::Contains
                } else {
                    CycleRelation::ContainsMember
                };
                graph.add_constraint(id, child, EdgeKind::Relation(relation));
            }
        }
    }

    (graph, entries)
}
