//! # depsort-core
//!
//! Core types shared across all depsort crates.
//!
//! This crate provides:
//! - The `DependentItem` capability traits a caller implements to take part in a sort
//! - `ItemRef` references (live or by name, required or optional)
//! - `ItemKind` and the `StructureError` flags reported on issues
//! - The `IssueSink` reporting surface with tracing and in-memory implementations
//! - `DepSortError` for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: item model, references, kinds and structure error flags
//! - `sink`: leveled, grouped message sinks used to report results
//! - `error`: Error types and result aliases

pub mod error;
pub mod sink;
pub mod types;

// Re-export commonly used types
pub use error::{DepSortError, DepSortResult};
pub use sink::{IssueSink, MemorySink, SinkLevel, SinkLine, TracingSink};
pub use types::{
    describe_item, log_items, resolve_kind, same_item, DependentItem, DependentItemGroup,
    ItemHandle, ItemKind, ItemRef, NamedRef, StartSignal, StructureError, TypedKind,
};
