//! # Persistent Storage
//!
//! Disk-backed `EdgeStore` implementations.

mod redb_graph;

pub use redb_graph::RedbGraph;
