//! Graph ingestion: raw JSON description -> [`GraphStore`].
//!
//! Two input shapes are accepted:
//! - **Attributed form**: an object with `nodes` (`{id, label, size,
//!   color}`) and `edges` (`{source, target, size}`). Node sizes and edge
//!   sizes are independently range-scanned and mapped into `[1.0, 5.0]`.
//! - **Bare form**: an array of `{source, target}` pairs with no
//!   attributes; referenced nodes are created implicitly.
//!
//! The shape is resolved exactly once at parse time into a tagged
//! [`GraphInput`] variant; nothing downstream re-checks it. Attributed-form
//! nodes are all inserted before any edge, so a dangling edge reference
//! fails with [`GraphError::UnknownNode`] before any layout work starts.

use serde::Deserialize;
use tracing::debug;

use crate::error::{GraphError, Result};
use crate::graph::{GraphStore, LinkAttrs, NodeAttrs, NodeKey};
use crate::scale::SampleRange;

/// Lower bound of the display range sizes and weights are mapped into.
pub const SCALE_MIN: f64 = 1.0;
/// Upper bound of the display range sizes and weights are mapped into.
pub const SCALE_MAX: f64 = 5.0;

/// A node entry in attributed-form input.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    /// Stable identifier, string or integer.
    pub id: NodeKey,
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
    /// Raw size magnitude.
    #[serde(default)]
    pub size: Option<f64>,
    /// Color suggested by the input; superseded by the cluster color.
    #[serde(default)]
    pub color: Option<String>,
}

/// An edge entry in attributed-form input.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeSpec {
    /// Source node id.
    pub source: NodeKey,
    /// Target node id.
    pub target: NodeKey,
    /// Raw weight magnitude.
    #[serde(default)]
    pub size: Option<f64>,
}

/// An edge entry in bare edge-list input.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgePair {
    /// Source node id.
    pub source: NodeKey,
    /// Target node id.
    pub target: NodeKey,
}

/// A parsed input document, shape resolved at the ingestion boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GraphInput {
    /// Object with both `nodes` and `edges` top-level keys.
    Attributed {
        /// Node entries.
        nodes: Vec<NodeSpec>,
        /// Edge entries.
        edges: Vec<EdgeSpec>,
    },
    /// Bare sequence of `{source, target}` pairs.
    EdgeList(Vec<EdgePair>),
}

impl GraphInput {
    /// Parse an input document from JSON text.
    ///
    /// Fails with [`GraphError::MalformedInput`] if the text is not valid
    /// JSON or matches neither recognized shape.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| GraphError::MalformedInput(err.to_string()))
    }

    /// Build a [`GraphStore`] from this input.
    pub fn build(self) -> Result<GraphStore> {
        match self {
            GraphInput::Attributed { nodes, edges } => build_attributed(nodes, edges),
            GraphInput::EdgeList(pairs) => build_edge_list(pairs),
        }
    }
}

/// Attributed form: scan size ranges, insert all nodes, then all edges.
fn build_attributed(nodes: Vec<NodeSpec>, edges: Vec<EdgeSpec>) -> Result<GraphStore> {
    let node_sizes = SampleRange::from_samples(nodes.iter().map(|n| n.size));
    let edge_sizes = SampleRange::from_samples(edges.iter().map(|e| e.size));
    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        node_size_min = ?node_sizes.min(),
        node_size_max = ?node_sizes.max(),
        "ingesting attributed graph"
    );

    let mut store = GraphStore::with_capacity(nodes.len(), edges.len());

    // Nodes must all exist before any edge references them.
    for spec in nodes {
        let scaled_size = spec
            .size
            .map(|raw| node_sizes.scale(raw, SCALE_MIN, SCALE_MAX));
        store.add_node(
            spec.id,
            NodeAttrs {
                label: spec.label,
                raw_size: spec.size,
                scaled_size,
                color_hint: spec.color,
            },
        )?;
    }

    for spec in edges {
        let scaled_weight = spec
            .size
            .map(|raw| edge_sizes.scale(raw, SCALE_MIN, SCALE_MAX));
        store.add_link(
            &spec.source,
            &spec.target,
            LinkAttrs {
                raw_weight: spec.size,
                scaled_weight,
            },
        )?;
    }

    Ok(store)
}

/// Bare form: no attribute scaling; endpoints are created as encountered.
fn build_edge_list(pairs: Vec<EdgePair>) -> Result<GraphStore> {
    debug!(edges = pairs.len(), "ingesting bare edge list");

    let mut store = GraphStore::with_capacity(pairs.len(), pairs.len());
    for pair in pairs {
        store.ensure_node(&pair.source);
        store.ensure_node(&pair.target);
        store.add_link(&pair.source, &pair.target, LinkAttrs::bare())?;
    }
    Ok(store)
}
