//! Test items and result checks.
//!
//! Relations are written as a symbol followed by a name, a leading `?` on the
//! name makes the reference optional:
//! `⊏ C` container, `⊐ X` / `∋ X` child, `↟ B` generalization,
//! `⇀ B` requires, `↽ B` required by, `∈ G` group.

use crate::result::{SortedItem, SorterResult};
use depsort_core::{
    DependentItem, DependentItemGroup, ItemHandle, ItemKind, ItemRef, StartSignal, TypedKind,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Item,
    Group,
    Container,
    Typed(ItemKind),
}

#[derive(Default)]
struct Relations {
    container: Option<ItemRef>,
    generalization: Option<ItemRef>,
    requires: Vec<ItemRef>,
    required_by: Vec<ItemRef>,
    groups: Vec<ItemRef>,
    children: Vec<ItemRef>,
    related: Vec<ItemHandle>,
}

pub(crate) struct TestItem {
    name: String,
    shape: Cell<Shape>,
    relations: RefCell<Relations>,
    start: RefCell<StartSignal>,
    start_calls: Cell<usize>,
}

pub(crate) fn handle(item: &Rc<TestItem>) -> ItemHandle {
    Rc::clone(item) as ItemHandle
}

impl TestItem {
    fn build(name: &str, shape: Shape, relations: &[&str]) -> Rc<Self> {
        let item = Rc::new(Self {
            name: name.to_string(),
            shape: Cell::new(shape),
            relations: RefCell::new(Relations::default()),
            start: RefCell::new(StartSignal::Ok),
            start_calls: Cell::new(0),
        });
        for relation in relations {
            item.add(relation);
        }
        item
    }

    pub fn item(name: &str, relations: &[&str]) -> Rc<Self> {
        Self::build(name, Shape::Item, relations)
    }

    pub fn group(name: &str, relations: &[&str]) -> Rc<Self> {
        Self::build(name, Shape::Group, relations)
    }

    pub fn container(name: &str, relations: &[&str]) -> Rc<Self> {
        Self::build(name, Shape::Container, relations)
    }

    /// Container whose kind is decided by `kind`
    pub fn typed(kind: ItemKind, name: &str, relations: &[&str]) -> Rc<Self> {
        Self::build(name, Shape::Typed(kind), relations)
    }

    pub fn set_kind(&self, kind: ItemKind) {
        self.shape.set(Shape::Typed(kind));
    }

    /// Adds one relation written as `symbol name`
    pub fn add(&self, relation: &str) {
        let relation = relation.trim();
        let mut chars = relation.chars();
        let symbol = chars.next().unwrap_or(' ');
        let reference = ItemRef::named(chars.as_str().trim());
        let mut relations = self.relations.borrow_mut();
        match symbol {
            '⊏' => relations.container = Some(reference),
            '⊐' | '∋' => relations.children.push(reference),
            '↟' => relations.generalization = Some(reference),
            '⇀' => relations.requires.push(reference),
            '↽' => relations.required_by.push(reference),
            '∈' => relations.groups.push(reference),
            other => panic!("unknown relation symbol '{other}' in '{relation}'"),
        }
    }

    pub fn set_container(&self, container: Option<ItemRef>) {
        self.relations.borrow_mut().container = container;
    }

    pub fn set_generalization(&self, generalization: ItemRef) {
        self.relations.borrow_mut().generalization = Some(generalization);
    }

    pub fn require(&self, reference: ItemRef) {
        self.relations.borrow_mut().requires.push(reference);
    }

    pub fn required_by(&self, reference: ItemRef) {
        self.relations.borrow_mut().required_by.push(reference);
    }

    pub fn join(&self, group: ItemRef) {
        self.relations.borrow_mut().groups.push(group);
    }

    pub fn add_child(&self, child: ItemRef) {
        self.relations.borrow_mut().children.push(child);
    }

    pub fn relate(&self, item: ItemHandle) {
        self.relations.borrow_mut().related.push(item);
    }

    /// Live child that also points back to this container
    pub fn contain(self: &Rc<Self>, child: &Rc<TestItem>) {
        self.add_child(ItemRef::live(handle(child)));
        child.set_container(Some(ItemRef::live(handle(self))));
    }

    /// Live member of this group
    pub fn include(self: &Rc<Self>, member: &Rc<TestItem>) {
        self.add_child(ItemRef::live(handle(member)));
    }

    pub fn on_start(&self, signal: StartSignal) {
        *self.start.borrow_mut() = signal;
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.get()
    }
}

impl DependentItem for TestItem {
    fn full_name(&self) -> &str {
        &self.name
    }

    fn container(&self) -> Option<ItemRef> {
        self.relations.borrow().container.clone()
    }

    fn generalization(&self) -> Option<ItemRef> {
        self.relations.borrow().generalization.clone()
    }

    fn requires(&self) -> Vec<ItemRef> {
        self.relations.borrow().requires.clone()
    }

    fn required_by(&self) -> Vec<ItemRef> {
        self.relations.borrow().required_by.clone()
    }

    fn groups(&self) -> Vec<ItemRef> {
        self.relations.borrow().groups.clone()
    }

    fn as_group(&self) -> Option<&dyn DependentItemGroup> {
        match self.shape.get() {
            Shape::Item => None,
            _ => Some(self),
        }
    }

    fn related_items(&self) -> Vec<ItemHandle> {
        self.relations.borrow().related.clone()
    }

    fn start_dependency_sort(&self) -> StartSignal {
        self.start_calls.set(self.start_calls.get() + 1);
        self.start.borrow().clone()
    }
}

impl DependentItemGroup for TestItem {
    fn children(&self) -> Vec<ItemRef> {
        self.relations.borrow().children.clone()
    }

    fn is_container(&self) -> bool {
        !matches!(self.shape.get(), Shape::Group)
    }

    fn as_typed(&self) -> Option<&dyn TypedKind> {
        match self.shape.get() {
            Shape::Typed(_) => Some(self),
            _ => None,
        }
    }
}

impl TypedKind for TestItem {
    fn item_kind(&self) -> ItemKind {
        match self.shape.get() {
            Shape::Typed(kind) => kind,
            Shape::Item => ItemKind::Item,
            Shape::Group => ItemKind::Group,
            Shape::Container => ItemKind::Container,
        }
    }
}

/// Full names of the sorted items
pub(crate) fn sorted_names(result: &SorterResult) -> Vec<String> {
    result
        .sorted_items()
        .unwrap_or_default()
        .iter()
        .map(|item| item.full_name().to_string())
        .collect()
}

#[track_caller]
pub(crate) fn assert_ordered(result: &SorterResult, expected: &[&str]) {
    assert_eq!(sorted_names(result), expected);
}

/// Checks every ordering constraint on a sorted result
#[track_caller]
pub(crate) fn check_constraints(result: &SorterResult) {
    let sorted = result.sorted_items().expect("result must be sorted");
    let position: HashMap<String, usize> = sorted
        .iter()
        .enumerate()
        .map(|(pos, item)| (item.full_name().to_string(), pos))
        .collect();
    let pos = |item: &SortedItem<'_>| position[item.full_name()];

    for item in &sorted {
        let at = pos(item);
        for required in item.direct_requires() {
            assert!(pos(&required) < at, "{} must follow {}", item.full_name(), required.full_name());
        }
        if let Some(generalization) = item.generalization() {
            assert!(pos(&generalization) < at);
        }
        if let Some(container) = item.container() {
            let head = container.head_for_group().expect("containers have a head");
            assert!(pos(&head) < at);
            assert!(at < pos(&container));
        }
        for group in item.groups() {
            let head = group.head_for_group().expect("groups have a head");
            assert!(pos(&head) < at);
            assert!(at < pos(&group));
        }
        if let Some(head) = item.head_for_group() {
            assert!(pos(&head) < at);
            assert!(head.index() < item.index());
            for child in item.children() {
                assert!(pos(&head) < pos(&child));
                assert!(pos(&child) < at);
            }
        }
        let rank = item.rank();
        if at > 0 {
            assert!(sorted[at - 1].rank() <= rank, "ranks must not decrease");
        }
    }
}
