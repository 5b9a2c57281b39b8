//! Discovery of the full item set.
//!
//! Seed items go through a FIFO work queue. Each processed item enqueues what
//! its required live references point to, its related items and whatever the
//! call-level discoverer returns. Enqueueing is idempotent: an instance is
//! registered once, a second instance with a known name is a homonym.

use depsort_core::{DependentItem, ItemHandle, ItemRef};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use tracing::trace;

/// Supplies additional items to register for a discovered item
pub trait Discoverer {
    fn other_items(&self, item: &dyn DependentItem) -> Vec<ItemHandle>;
}

impl<F> Discoverer for F
where
    F: Fn(&dyn DependentItem) -> Vec<ItemHandle>,
{
    fn other_items(&self, item: &dyn DependentItem) -> Vec<ItemHandle> {
        self(item)
    }
}

/// Closure of the seed items
#[derive(Default)]
pub struct Discovered {
    /// Registration order
    pub items: Vec<ItemHandle>,
    /// Full name to registration index
    pub by_name: HashMap<String, usize>,
    /// (index of the first holder of the name, the other instance)
    pub homonyms: Vec<(usize, ItemHandle)>,
}

impl Discovered {
    /// Registration index of the item a reference names
    pub fn lookup(&self, reference: &ItemRef) -> Option<usize> {
        self.by_name.get(reference.full_name()).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Identity key of an instance
fn identity(item: &ItemHandle) -> usize {
    Rc::as_ptr(item) as *const () as usize
}

/// Every reference an item declares, children included
pub(crate) fn declared_references(item: &dyn DependentItem) -> Vec<ItemRef> {
    let mut refs = Vec::new();
    refs.extend(item.container());
    refs.extend(item.generalization());
    refs.extend(item.requires());
    refs.extend(item.required_by());
    refs.extend(item.groups());
    if let Some(group) = item.as_group() {
        refs.extend(group.children());
    }
    refs
}

/// Compute the closure of `seed`
pub fn discover<I>(seed: I, discoverer: Option<&dyn Discoverer>) -> Discovered
where
    I: IntoIterator<Item = ItemHandle>,
{
    let mut queue: VecDeque<ItemHandle> = seed.into_iter().collect();
    let mut seen: HashSet<usize> = HashSet::new();
    let mut discovered = Discovered::default();

    while let Some(item) = queue.pop_front() {
        if !seen.insert(identity(&item)) {
            continue;
        }

        let name = item.full_name().to_string();
        if let Some(&holder) = discovered.by_name.get(&name) {
            trace!(name = %name, "homonym discovered");
            discovered.homonyms.push((holder, item));
            continue;
        }
        discovered.by_name.insert(name, discovered.items.len());
        discovered.items.push(Rc::clone(&item));

        for reference in declared_references(item.as_ref()) {
            if let Some(target) = reference.discoverable() {
                queue.push_back(Rc::clone(target));
            }
        }
        queue.extend(item.related_items());
        if let Some(discoverer) = discoverer {
            queue.extend(discoverer.other_items(item.as_ref()));
        }
    }

    discovered
}
