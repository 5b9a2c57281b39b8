//! depsort benchmarking suite
//!
//! Criterion benchmarks of the sort engine (`benches/order.rs`) and of
//! manifest parsing (`benches/parse.rs`), plus the manifest generators
//! they share.

pub mod common;
pub mod fixtures;

pub use common::*;
pub use fixtures::*;
