//! Core data types for dependency sorting.
//!
//! This module contains the item capability traits, references between
//! items, item kinds and the structure error flags.

pub mod item;
pub mod kind;
pub mod reference;

pub use item::{
    describe_item, log_items, resolve_kind, same_item, DependentItem, DependentItemGroup,
    ItemHandle, StartSignal, TypedKind,
};
pub use kind::{ItemKind, StructureError};
pub use reference::{ItemRef, NamedRef};
