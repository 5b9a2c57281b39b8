//! References between dependent items.
//!
//! A reference either names its target (`"Model.Base"`, `"?Optional"`) and is
//! bound by name once every item is known, or carries the target itself. Live
//! references pull their target into the sort unless they are optional.

use super::item::{DependentItem, ItemHandle};
use crate::error::{DepSortError, DepSortResult};
use std::fmt;
use std::rc::Rc;

/// A purely symbolic reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedRef {
    full_name: String,
    optional: bool,
}

impl NamedRef {
    /// Parse a reference name: a leading `?` marks it optional
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        match name.strip_prefix('?') {
            Some(rest) => Self {
                full_name: rest.to_string(),
                optional: true,
            },
            None => Self {
                full_name: name.to_string(),
                optional: false,
            },
        }
    }

    /// Same as `new` but rejects names that resolve to nothing
    pub fn parse(name: &str) -> DepSortResult<Self> {
        let reference = Self::new(name);
        if reference.full_name.trim().is_empty() {
            return Err(DepSortError::InvalidName {
                name: name.to_string(),
                reason: "a reference must name an item".to_string(),
            });
        }
        Ok(reference)
    }

    /// Name without the `?` prefix
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Check if the reference was written with `?`
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

impl fmt::Display for NamedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            f.write_str("?")?;
        }
        f.write_str(&self.full_name)
    }
}

/// Reference to a dependent item
#[derive(Clone)]
pub enum ItemRef {
    /// Bound by name after discovery
    Named(NamedRef),
    /// Points to the item itself
    Live {
        item: ItemHandle,
        optional: bool,
    },
}

impl ItemRef {
    /// Named reference, `?` prefix for optional
    pub fn named(name: impl AsRef<str>) -> Self {
        ItemRef::Named(NamedRef::new(name))
    }

    /// Required live reference
    pub fn live(item: ItemHandle) -> Self {
        ItemRef::Live {
            item,
            optional: false,
        }
    }

    /// Optional live reference: the target is not discovered through it
    pub fn optional_live(item: ItemHandle) -> Self {
        ItemRef::Live {
            item,
            optional: true,
        }
    }

    /// Full name of the target (never prefixed by `?`)
    pub fn full_name(&self) -> &str {
        match self {
            ItemRef::Named(named) => named.full_name(),
            ItemRef::Live { item, .. } => item.full_name(),
        }
    }

    pub fn is_optional(&self) -> bool {
        match self {
            ItemRef::Named(named) => named.is_optional(),
            ItemRef::Live { optional, .. } => *optional,
        }
    }

    /// The target when this reference carries it
    pub fn live_item(&self) -> Option<&ItemHandle> {
        match self {
            ItemRef::Named(_) => None,
            ItemRef::Live { item, .. } => Some(item),
        }
    }

    /// Items that discovery must register because of this reference
    pub fn discoverable(&self) -> Option<&ItemHandle> {
        if self.is_optional() {
            None
        } else {
            self.live_item()
        }
    }

    /// Same target, optional
    pub fn to_optional(&self) -> Self {
        match self {
            ItemRef::Named(named) => ItemRef::Named(NamedRef {
                full_name: named.full_name.clone(),
                optional: true,
            }),
            ItemRef::Live { item, .. } => ItemRef::optional_live(Rc::clone(item)),
        }
    }

    /// Name as written in reports: `?Name` when optional
    pub fn display_name(&self) -> String {
        if self.is_optional() {
            format!("?{}", self.full_name())
        } else {
            self.full_name().to_string()
        }
    }
}

impl fmt::Debug for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Named(named) => write!(f, "Named({named})"),
            ItemRef::Live { .. } => write!(f, "Live({})", self.display_name()),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl From<&str> for ItemRef {
    fn from(name: &str) -> Self {
        ItemRef::named(name)
    }
}

impl From<String> for ItemRef {
    fn from(name: String) -> Self {
        ItemRef::named(name)
    }
}

impl<T: DependentItem + 'static> From<Rc<T>> for ItemRef {
    fn from(item: Rc<T>) -> Self {
        ItemRef::live(item)
    }
}
