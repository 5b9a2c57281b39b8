//! Per-item issue accumulation.
//!
//! One `DependentItemIssue` per item, created on the first problem found and
//! enriched afterwards. The ledger lists them in item registration order.

use depsort_core::{IssueSink, ItemHandle, ItemRef, StructureError};
use serde::Serialize;
use std::collections::BTreeMap;

/// Problems found on one item
#[derive(Clone)]
pub struct DependentItemIssue {
    item: ItemHandle,
    structure_error: StructureError,
    missing_dependencies: Vec<String>,
    missing_children: Vec<String>,
    missing_groups: Vec<String>,
    invalid_groups: Vec<String>,
    extraneous_containers: Vec<String>,
    homonyms: Vec<ItemHandle>,
    container_name: Option<String>,
    missing_generalization: Option<String>,
    required_missing_count: usize,
    has_live_children: bool,
}

impl DependentItemIssue {
    pub(crate) fn new(item: ItemHandle) -> Self {
        Self {
            item,
            structure_error: StructureError::empty(),
            missing_dependencies: Vec::new(),
            missing_children: Vec::new(),
            missing_groups: Vec::new(),
            invalid_groups: Vec::new(),
            extraneous_containers: Vec::new(),
            homonyms: Vec::new(),
            container_name: None,
            missing_generalization: None,
            required_missing_count: 0,
            has_live_children: false,
        }
    }

    pub fn item(&self) -> &ItemHandle {
        &self.item
    }

    pub fn full_name(&self) -> &str {
        self.item.full_name()
    }

    /// Structure errors raised on the item
    pub fn structure_error(&self) -> StructureError {
        self.structure_error
    }

    /// Missing requirements, optional ones prefixed by `?`
    pub fn missing_dependencies(&self) -> &[String] {
        &self.missing_dependencies
    }

    pub fn missing_children(&self) -> &[String] {
        &self.missing_children
    }

    pub fn missing_groups(&self) -> &[String] {
        &self.missing_groups
    }

    /// Declared groups that resolved to plain items
    pub fn invalid_groups(&self) -> &[String] {
        &self.invalid_groups
    }

    /// Containers that listed the item as a child but lost to another one
    pub fn extraneous_containers(&self) -> &[String] {
        &self.extraneous_containers
    }

    /// Other instances that share this item's name
    pub fn homonyms(&self) -> &[ItemHandle] {
        &self.homonyms
    }

    /// Name of a generalization that could not be found
    pub fn missing_generalization(&self) -> Option<&str> {
        self.missing_generalization.as_deref()
    }

    /// Required missing dependencies, plus one for a missing generalization
    pub fn required_missing_count(&self) -> usize {
        self.required_missing_count
    }

    /// Structural, unless the only errors are unresolved required references
    /// and those are not considered structural
    pub fn is_structure_error(&self, consider_required_missing: bool) -> bool {
        let mut errors = self.structure_error;
        if !consider_required_missing {
            errors.remove(StructureError::REQUIRED_MISSING);
        }
        !errors.is_empty()
    }

    /// Makes the graph undefinable: no ranking is attempted
    pub fn is_severe(&self) -> bool {
        let errors = self.structure_error;
        let refused_children = errors
            .contains(StructureError::CONTAINER_ASKED_TO_NOT_BE_A_GROUP_BUT_CONTAINS_CHILDREN)
            && self.has_live_children;
        let homonym_and_more =
            errors.contains(StructureError::HOMONYM) && errors != StructureError::HOMONYM;
        refused_children || homonym_and_more
    }

    /// Required missing dependencies, quoted: `'a', 'b'`
    pub(crate) fn required_missing_list(&self) -> String {
        self.missing_dependencies
            .iter()
            .filter(|name| !name.starts_with('?'))
            .map(|name| format!("'{name}'"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Writes one line per problem
    pub fn log_error(&self, sink: &mut dyn IssueSink) {
        let errors = self.structure_error;
        let container = self.container_name.as_deref().unwrap_or_default();
        if !self.homonyms.is_empty() {
            sink.error(&format!(
                "Homonyms: {} other item(s) are named '{}'.",
                self.homonyms.len(),
                self.full_name()
            ));
        }
        if errors.contains(StructureError::MISSING_NAMED_CONTAINER) {
            sink.error(&format!("Missing container named '{container}'."));
        }
        if errors.contains(StructureError::EXISTING_ITEM_IS_NOT_A_CONTAINER) {
            sink.error(&format!(
                "Item '{container}' is declared as the container but it is not a container."
            ));
        }
        if errors.contains(StructureError::EXISTING_CONTAINER_ASKED_TO_NOT_BE_A_CONTAINER) {
            sink.error(&format!(
                "Item '{container}' is declared as the container but its kind refuses to be a container."
            ));
        }
        if errors.contains(StructureError::CONTAINER_ASKED_TO_NOT_BE_A_GROUP_BUT_CONTAINS_CHILDREN) {
            sink.error("Its kind is Item but it has children.");
        }
        if errors.contains(StructureError::MULTIPLE_CONTAINER) {
            sink.error(&format!(
                "Also claimed as a child by: {}.",
                quoted(&self.extraneous_containers)
            ));
        }
        if let Some(generalization) = &self.missing_generalization {
            sink.error(&format!("Missing generalization '{generalization}'."));
        }
        if errors.contains(StructureError::MISSING_DEPENDENCY) {
            sink.error(&format!(
                "Missing required dependencies: {}.",
                self.required_missing_list()
            ));
        }
        let optional: Vec<String> = self
            .missing_dependencies
            .iter()
            .filter_map(|name| name.strip_prefix('?'))
            .map(str::to_string)
            .collect();
        if !optional.is_empty() {
            sink.warn(&format!("Missing optional dependencies: {}.", quoted(&optional)));
        }
        if errors.contains(StructureError::MISSING_NAMED_CHILD) {
            sink.error(&format!("Missing children: {}.", quoted(&self.missing_children)));
        }
        if errors.contains(StructureError::MISSING_NAMED_GROUP) {
            sink.error(&format!("Missing groups: {}.", quoted(&self.missing_groups)));
        }
        if errors.contains(StructureError::DECLARED_GROUP_REFUSED_TO_BE_A_GROUP) {
            sink.error(&format!(
                "Declared groups that are not groups: {}.",
                quoted(&self.invalid_groups)
            ));
        }
    }

    /// Serializable snapshot
    pub fn to_report(&self) -> IssueReport {
        IssueReport {
            item: self.full_name().to_string(),
            errors: self.structure_error.names().into_iter().map(String::from).collect(),
            missing_dependencies: self.missing_dependencies.clone(),
            missing_children: self.missing_children.clone(),
            missing_groups: self.missing_groups.clone(),
            invalid_groups: self.invalid_groups.clone(),
            extraneous_containers: self.extraneous_containers.clone(),
            homonyms: self.homonyms.len(),
            required_missing_count: self.required_missing_count,
        }
    }

    // Accumulation

    /// A strong reference replaces a weak one to the same name
    pub(crate) fn add_missing_dependency(&mut self, reference: &ItemRef) {
        let name = reference.full_name();
        let weak = format!("?{name}");
        if reference.is_optional() {
            if !self.missing_dependencies.iter().any(|m| *m == name || *m == weak) {
                self.missing_dependencies.push(weak);
            }
            return;
        }
        if self.missing_dependencies.iter().any(|m| m == name) {
            return;
        }
        match self.missing_dependencies.iter().position(|m| *m == weak) {
            Some(at) => self.missing_dependencies[at] = name.to_string(),
            None => self.missing_dependencies.push(name.to_string()),
        }
        self.required_missing_count += 1;
        self.structure_error |= StructureError::MISSING_DEPENDENCY;
    }

    pub(crate) fn set_missing_generalization(&mut self, name: &str) {
        if self.missing_generalization.is_none() {
            self.missing_generalization = Some(name.to_string());
            self.required_missing_count += 1;
            self.structure_error |= StructureError::MISSING_GENERALIZATION;
        }
    }

    pub(crate) fn set_container_error(&mut self, error: StructureError, container: &str) {
        self.container_name = Some(container.to_string());
        self.structure_error |= error;
    }

    pub(crate) fn add_missing_child(&mut self, name: &str) {
        push_unique(&mut self.missing_children, name);
        self.structure_error |= StructureError::MISSING_NAMED_CHILD;
    }

    pub(crate) fn add_missing_group(&mut self, name: &str) {
        push_unique(&mut self.missing_groups, name);
        self.structure_error |= StructureError::MISSING_NAMED_GROUP;
    }

    pub(crate) fn add_invalid_group(&mut self, name: &str) {
        push_unique(&mut self.invalid_groups, name);
        self.structure_error |= StructureError::DECLARED_GROUP_REFUSED_TO_BE_A_GROUP;
    }

    pub(crate) fn add_extraneous_container(&mut self, name: &str) {
        push_unique(&mut self.extraneous_containers, name);
        self.structure_error |= StructureError::MULTIPLE_CONTAINER;
    }

    pub(crate) fn add_homonym(&mut self, other: ItemHandle) {
        self.homonyms.push(other);
        self.structure_error |= StructureError::HOMONYM;
    }

    pub(crate) fn refuse_children(&mut self, has_live_children: bool) {
        self.has_live_children |= has_live_children;
        self.structure_error |=
            StructureError::CONTAINER_ASKED_TO_NOT_BE_A_GROUP_BUT_CONTAINS_CHILDREN;
    }
}

impl std::fmt::Debug for DependentItemIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependentItemIssue")
            .field("item", &self.full_name())
            .field("structure_error", &self.structure_error)
            .field("missing_dependencies", &self.missing_dependencies)
            .field("required_missing_count", &self.required_missing_count)
            .finish_non_exhaustive()
    }
}

/// Serializable view of an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueReport {
    pub item: String,
    pub errors: Vec<String>,
    pub missing_dependencies: Vec<String>,
    pub missing_children: Vec<String>,
    pub missing_groups: Vec<String>,
    pub invalid_groups: Vec<String>,
    pub extraneous_containers: Vec<String>,
    pub homonyms: usize,
    pub required_missing_count: usize,
}

/// Issues keyed by the registration index of their item
#[derive(Default)]
pub(crate) struct IssueLedger {
    issues: BTreeMap<usize, DependentItemIssue>,
}

impl IssueLedger {
    pub fn on(&mut self, index: usize, item: &ItemHandle) -> &mut DependentItemIssue {
        self.issues
            .entry(index)
            .or_insert_with(|| DependentItemIssue::new(ItemHandle::clone(item)))
    }

    /// Check if any issue prevents ranking
    pub fn has_severe(&self) -> bool {
        self.issues.values().any(DependentItemIssue::is_severe)
    }

    pub fn into_vec(self) -> Vec<DependentItemIssue> {
        self.issues.into_values().collect()
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
