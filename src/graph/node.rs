//! Node key and node attributes.
//!
//! Nodes are identified by a stable key taken directly from the input
//! document (a JSON string or integer), unique within one [`GraphStore`].
//! Attributes attached during the pipeline:
//! - `label`: display string (optional)
//! - `raw_size` / `scaled_size`: input magnitude and its `[1.0, 5.0]` mapping
//! - `color_hint`: color carried by attributed-form input, superseded by the
//!   cluster color during attribute assignment
//!
//! [`GraphStore`]: crate::graph::GraphStore

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable node identifier, string or integer.
///
/// Input documents may key nodes either way (`"TP53"` or `42`); both forms
/// hash and compare by value, so a store never holds two nodes with the
/// same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKey {
    /// Integer key, e.g. `42`.
    Int(i64),
    /// String key, e.g. `"TP53"`.
    Str(String),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Int(id) => write!(f, "{id}"),
            NodeKey::Str(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for NodeKey {
    #[inline]
    fn from(id: i64) -> Self {
        NodeKey::Int(id)
    }
}

impl From<&str> for NodeKey {
    #[inline]
    fn from(id: &str) -> Self {
        NodeKey::Str(id.to_owned())
    }
}

impl From<String> for NodeKey {
    #[inline]
    fn from(id: String) -> Self {
        NodeKey::Str(id)
    }
}

/// Attributes attached to a node.
///
/// `scaled_size` is write-once: ingestion computes it exactly once from the
/// observed size range and nothing downstream recomputes it. A node without
/// a `raw_size` keeps `scaled_size: None` and falls back to the unscaled
/// default at attribute assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeAttrs {
    /// Display label, if the input provided one.
    pub label: Option<String>,
    /// Original numeric magnitude from the input.
    pub raw_size: Option<f64>,
    /// `raw_size` linearly mapped into `[1.0, 5.0]`.
    pub scaled_size: Option<f64>,
    /// Color carried by the input document (attributed form only).
    pub color_hint: Option<String>,
}

impl NodeAttrs {
    /// Attributes for an implicitly created node (edge-list form).
    #[inline]
    pub fn bare() -> Self {
        Self::default()
    }
}
