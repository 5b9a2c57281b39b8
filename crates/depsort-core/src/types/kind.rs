//! Item kinds and structure error flags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a dependent item once resolved by the sorter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Not decided: resolves to `Item`
    #[default]
    Unknown,
    /// Plain item, no children
    Item,
    /// Aggregates members without owning them
    Group,
    /// Owns its children positionally
    Container,
}

impl ItemKind {
    /// Groups and containers both get a head entry
    pub fn is_group(&self) -> bool {
        matches!(self, ItemKind::Group | ItemKind::Container)
    }

    /// Check if this kind owns children
    pub fn is_container(&self) -> bool {
        matches!(self, ItemKind::Container)
    }

    /// `Unknown` defaults to `Item`
    pub fn resolved(self) -> Self {
        match self {
            ItemKind::Unknown => ItemKind::Item,
            other => other,
        }
    }

    /// Single letter used in detail dumps (I, G, C or U)
    pub fn letter(&self) -> char {
        match self {
            ItemKind::Unknown => 'U',
            ItemKind::Item => 'I',
            ItemKind::Group => 'G',
            ItemKind::Container => 'C',
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::Unknown => "Unknown",
            ItemKind::Item => "Item",
            ItemKind::Group => "Group",
            ItemKind::Container => "Container",
        };
        f.write_str(name)
    }
}

bitflags::bitflags! {
    /// Structural problems detected on one item. Several may be set at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StructureError: u32 {
        /// The named container cannot be found.
        const MISSING_NAMED_CONTAINER = 1 << 0;
        /// The container exists but is a plain item or a group.
        const EXISTING_ITEM_IS_NOT_A_CONTAINER = 1 << 1;
        /// The container exists but its dynamic kind refuses to be a container.
        const EXISTING_CONTAINER_ASKED_TO_NOT_BE_A_CONTAINER = 1 << 2;
        /// The item says it is a plain item but it has children.
        const CONTAINER_ASKED_TO_NOT_BE_A_GROUP_BUT_CONTAINS_CHILDREN = 1 << 3;
        /// A required generalization cannot be found.
        const MISSING_GENERALIZATION = 1 << 4;
        /// At least one required dependency cannot be found.
        const MISSING_DEPENDENCY = 1 << 5;
        /// A declared group resolves to a plain item.
        const DECLARED_GROUP_REFUSED_TO_BE_A_GROUP = 1 << 6;
        /// A named group cannot be found.
        const MISSING_NAMED_GROUP = 1 << 7;
        /// Another item instance has the same full name.
        const HOMONYM = 1 << 8;
        /// More than one container claims the item.
        const MULTIPLE_CONTAINER = 1 << 9;
        /// A named child cannot be found.
        const MISSING_NAMED_CHILD = 1 << 10;
    }
}

impl StructureError {
    /// Errors that only come from unresolved required references.
    pub const REQUIRED_MISSING: StructureError = StructureError::MISSING_DEPENDENCY
        .union(StructureError::MISSING_GENERALIZATION);

    /// Flag names, in declaration order
    pub fn names(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        f.write_str(&self.names().join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_resolution() {
        assert_eq!(ItemKind::Unknown.resolved(), ItemKind::Item);
        assert_eq!(ItemKind::Group.resolved(), ItemKind::Group);
        assert!(ItemKind::Container.is_group());
        assert!(!ItemKind::Group.is_container());
        assert!(!ItemKind::Item.is_group());
    }

    #[test]
    fn test_structure_error_display() {
        assert_eq!(StructureError::empty().to_string(), "NONE");
        let both = StructureError::MISSING_NAMED_CHILD | StructureError::MISSING_DEPENDENCY;
        assert_eq!(both.to_string(), "MISSING_DEPENDENCY | MISSING_NAMED_CHILD");
    }

    #[test]
    fn test_required_missing_mask() {
        let only_missing = StructureError::MISSING_DEPENDENCY;
        assert!(StructureError::REQUIRED_MISSING.contains(only_missing));
        assert!(!StructureError::REQUIRED_MISSING.contains(StructureError::HOMONYM));
    }
}
