//! Dependent item capabilities.
//!
//! An item only has to expose its full name; every relationship accessor has
//! an empty default. Items that behave as groups or containers expose the
//! `DependentItemGroup` capability, and those that decide their kind at
//! runtime also expose `TypedKind`.

use super::kind::ItemKind;
use super::reference::ItemRef;
use crate::sink::{IssueSink, SinkLevel};
use std::fmt::Write as _;
use std::rc::Rc;

/// Shared handle on a caller-owned item
pub type ItemHandle = Rc<dyn DependentItem>;

/// Outcome of the start hook called once per item before ranking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StartSignal {
    #[default]
    Ok,
    /// Counted; the sorted list is withheld but the sort runs to its end
    Error(String),
    /// Stops the sort before ranking
    Fatal(String),
}

/// An item that takes part in a dependency sort
pub trait DependentItem {
    /// Unique, case-sensitive identifier
    fn full_name(&self) -> &str;

    /// Container that owns this item
    fn container(&self) -> Option<ItemRef> {
        None
    }

    /// Base item: it comes first and lends its container
    fn generalization(&self) -> Option<ItemRef> {
        None
    }

    /// Items that must come before this one
    fn requires(&self) -> Vec<ItemRef> {
        Vec::new()
    }

    /// Items that must come after this one
    fn required_by(&self) -> Vec<ItemRef> {
        Vec::new()
    }

    /// Groups this item belongs to
    fn groups(&self) -> Vec<ItemRef> {
        Vec::new()
    }

    /// Group capability, `None` for plain items
    fn as_group(&self) -> Option<&dyn DependentItemGroup> {
        None
    }

    /// Extra items to register when this one is discovered
    fn related_items(&self) -> Vec<ItemHandle> {
        Vec::new()
    }

    /// Called once per sort, before ranking
    fn start_dependency_sort(&self) -> StartSignal {
        StartSignal::Ok
    }
}

/// Capability of items that have children
pub trait DependentItemGroup {
    fn children(&self) -> Vec<ItemRef>;

    /// Containers own their children; plain groups only aggregate them
    fn is_container(&self) -> bool {
        false
    }

    /// Dynamic kind capability
    fn as_typed(&self) -> Option<&dyn TypedKind> {
        None
    }
}

/// Capability of groups whose kind is decided at runtime
pub trait TypedKind {
    fn item_kind(&self) -> ItemKind;
}

/// Kind of an item from its capabilities: a typed kind wins over the
/// static group/container shape, `Unknown` resolves to `Item`.
pub fn resolve_kind(item: &dyn DependentItem) -> ItemKind {
    match item.as_group() {
        None => ItemKind::Item,
        Some(group) => match group.as_typed() {
            Some(typed) => typed.item_kind().resolved(),
            None if group.is_container() => ItemKind::Container,
            None => ItemKind::Group,
        },
    }
}

/// Identity comparison (same instance), ignoring vtables
pub fn same_item(a: &ItemHandle, b: &ItemHandle) -> bool {
    std::ptr::eq(
        Rc::as_ptr(a) as *const (),
        Rc::as_ptr(b) as *const (),
    )
}

/// Multi-line dump of an item's declared relations
pub fn describe_item(item: &dyn DependentItem) -> String {
    let kind = resolve_kind(item);
    let mut out = String::new();
    let _ = writeln!(out, "{} - FullName = {}", kind.letter(), item.full_name());
    let _ = writeln!(out, "| Container = {}", one_name(item.container()));
    let _ = writeln!(out, "| Generalization = {}", one_name(item.generalization()));
    let _ = writeln!(out, "| Requires = {}", names(&item.requires()));
    let _ = writeln!(out, "| RequiredBy = {}", names(&item.required_by()));
    let _ = writeln!(out, "| Groups = {}", names(&item.groups()));
    if let Some(group) = item.as_group() {
        let _ = writeln!(out, "| Children = {}", names(&group.children()));
    }
    out
}

/// Log a set of items under one group
pub fn log_items(items: &[ItemHandle], sink: &mut dyn IssueSink, level: SinkLevel) {
    sink.open_group(
        level,
        "Dependent items (C - for container, G - for group and I - for item)",
    );
    for item in items {
        sink.log(level, &describe_item(item.as_ref()));
    }
    sink.close_group();
}

fn one_name(reference: Option<ItemRef>) -> String {
    reference
        .map(|r| r.display_name())
        .unwrap_or_else(|| "(null)".to_string())
}

fn names(references: &[ItemRef]) -> String {
    references
        .iter()
        .map(ItemRef::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    struct Leaf {
        name: String,
        requires: Vec<ItemRef>,
    }

    impl DependentItem for Leaf {
        fn full_name(&self) -> &str {
            &self.name
        }

        fn requires(&self) -> Vec<ItemRef> {
            self.requires.clone()
        }
    }

    struct Package {
        name: String,
        kind: Option<ItemKind>,
        children: Vec<ItemRef>,
    }

    impl DependentItem for Package {
        fn full_name(&self) -> &str {
            &self.name
        }

        fn as_group(&self) -> Option<&dyn DependentItemGroup> {
            Some(self)
        }
    }

    impl DependentItemGroup for Package {
        fn children(&self) -> Vec<ItemRef> {
            self.children.clone()
        }

        fn is_container(&self) -> bool {
            true
        }

        fn as_typed(&self) -> Option<&dyn TypedKind> {
            self.kind.map(|_| self as &dyn TypedKind)
        }
    }

    impl TypedKind for Package {
        fn item_kind(&self) -> ItemKind {
            self.kind.unwrap_or_default()
        }
    }

    fn package(name: &str, kind: Option<ItemKind>) -> Package {
        Package {
            name: name.to_string(),
            kind,
            children: vec![ItemRef::named("A")],
        }
    }

    #[test]
    fn test_resolve_kind() {
        let leaf = Leaf {
            name: "A".to_string(),
            requires: Vec::new(),
        };
        assert_eq!(resolve_kind(&leaf), ItemKind::Item);
        assert_eq!(resolve_kind(&package("C", None)), ItemKind::Container);
        assert_eq!(
            resolve_kind(&package("C", Some(ItemKind::Group))),
            ItemKind::Group
        );
        assert_eq!(
            resolve_kind(&package("C", Some(ItemKind::Unknown))),
            ItemKind::Item
        );
    }

    #[test]
    fn test_same_item_is_identity() {
        let a: ItemHandle = Rc::new(package("C", None));
        let b: ItemHandle = Rc::new(package("C", None));
        assert!(same_item(&a, &Rc::clone(&a)));
        assert!(!same_item(&a, &b));
    }

    #[test]
    fn test_describe_item() {
        let leaf = Leaf {
            name: "B".to_string(),
            requires: vec![ItemRef::named("A"), ItemRef::named("?X")],
        };
        let text = describe_item(&leaf);
        assert!(text.starts_with("I - FullName = B\n"));
        assert!(text.contains("| Container = (null)\n"));
        assert!(text.contains("| Requires = A, ?X\n"));
        assert!(!text.contains("Children"));

        let text = describe_item(&package("P", None));
        assert!(text.starts_with("C - FullName = P\n"));
        assert!(text.contains("| Children = A\n"));
    }

    #[test]
    fn test_log_items_opens_one_group() {
        let items: Vec<ItemHandle> = vec![Rc::new(package("P", None))];
        let mut sink = MemorySink::new();
        log_items(&items, &mut sink, SinkLevel::Info);
        assert_eq!(sink.lines().len(), 2);
        assert_eq!(sink.lines()[1].depth, 1);
    }
}
