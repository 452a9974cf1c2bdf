//! Graph data structures and operations.
//!
//! This module provides the pipeline's core graph structure using
//! petgraph's StableGraph, keyed by stable node identifiers from the input
//! document, with insertion-ordered deterministic iteration.

mod edge;
mod node;
mod store;

pub use edge::LinkAttrs;
pub use node::{NodeAttrs, NodeKey};
pub use store::{GraphStore, LinkRef};
