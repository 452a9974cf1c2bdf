//! Pipeline error types.
//!
//! Every fallible operation in the crate returns [`Result`]. Ingestion
//! errors are fatal to a run (a partial graph is not usable for layout);
//! layout and clustering are expected not to fail on a valid store, with
//! the single exception of numeric instability, which is surfaced as
//! [`GraphError::LayoutUnstable`] rather than silently passed downstream.

use thiserror::Error;

use crate::graph::NodeKey;

/// Errors produced by the layout and clustering pipeline.
#[derive(Error, Debug)]
pub enum GraphError {
    // Ingestion errors
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeKey),

    #[error("link references unknown node id: {0}")]
    UnknownNode(NodeKey),

    // Lookup errors
    #[error("node not found: {0}")]
    NodeNotFound(NodeKey),

    // Normalization errors (strict mode only; the default scale path
    // falls back to the target midpoint instead)
    #[error("degenerate sample range: min == max ({0})")]
    DegenerateRange(f64),

    // Layout errors
    #[error("layout produced a non-finite position for node {node} after {steps} steps")]
    LayoutUnstable { node: NodeKey, steps: u32 },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GraphError>;
