//! GraphStore - the pipeline's graph structure.
//!
//! A directed multigraph over petgraph's StableGraph, keyed by stable
//! [`NodeKey`]s from the input document. The store is mutable only during
//! ingestion; the layout and clustering stages treat it as read-mostly and
//! attach derived attributes without altering topology.
//!
//! Iteration over nodes and links is in insertion order and restartable, so
//! every stage (and any consumer reproducing "first node" selection) sees
//! the same deterministic sequence.

use std::collections::HashMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::Directed;

use super::edge::LinkAttrs;
use super::node::{NodeAttrs, NodeKey};
use crate::error::{GraphError, Result};

/// A directed link resolved to its endpoints.
#[derive(Debug, Clone, Copy)]
pub struct LinkRef<'a> {
    /// Source node key.
    pub source: &'a NodeKey,
    /// Target node key.
    pub target: &'a NodeKey,
    /// Dense slot of the source node (see [`GraphStore::slot_of`]).
    pub source_slot: usize,
    /// Dense slot of the target node.
    pub target_slot: usize,
    /// Link attributes.
    pub attrs: &'a LinkAttrs,
}

/// Mutable directed multigraph with stable keys and insertion-ordered
/// iteration.
///
/// Because the store only ever grows (no removal API; a store is built
/// fresh per run), petgraph node indices are dense: node number `i` in
/// insertion order has `NodeIndex(i)`. The layout and community stages rely
/// on this to address per-node buffers by slot.
#[derive(Debug)]
pub struct GraphStore {
    /// Topology; node weights are attributes, edge weights are link attributes.
    graph: StableGraph<NodeAttrs, LinkAttrs, Directed>,
    /// Stable key -> petgraph index.
    key_to_index: HashMap<NodeKey, NodeIndex>,
    /// Node keys in insertion order, indexed by slot.
    keys: Vec<NodeKey>,
    /// Edge indices in insertion order.
    link_order: Vec<EdgeIndex>,
}

impl GraphStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            key_to_index: HashMap::new(),
            keys: Vec::new(),
            link_order: Vec::new(),
        }
    }

    /// Create a store with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, link_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, link_capacity),
            key_to_index: HashMap::with_capacity(node_capacity),
            keys: Vec::with_capacity(node_capacity),
            link_order: Vec::with_capacity(link_capacity),
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Insert a node under `key`.
    ///
    /// Fails with [`GraphError::DuplicateNode`] if the key is already
    /// present.
    pub fn add_node(&mut self, key: NodeKey, attrs: NodeAttrs) -> Result<NodeIndex> {
        if self.key_to_index.contains_key(&key) {
            return Err(GraphError::DuplicateNode(key));
        }

        let index = self.graph.add_node(attrs);
        self.key_to_index.insert(key.clone(), index);
        self.keys.push(key);
        Ok(index)
    }

    /// Look up a node's index, inserting it with default attributes if
    /// absent. Edge-list ingestion uses this to create endpoints on first
    /// sight.
    pub fn ensure_node(&mut self, key: &NodeKey) -> NodeIndex {
        if let Some(&index) = self.key_to_index.get(key) {
            return index;
        }

        let index = self.graph.add_node(NodeAttrs::bare());
        self.key_to_index.insert(key.clone(), index);
        self.keys.push(key.clone());
        index
    }

    /// Whether a node with this key exists.
    #[inline]
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.key_to_index.contains_key(key)
    }

    /// Get a node's attributes.
    ///
    /// Fails with [`GraphError::NodeNotFound`] if the key is unknown.
    pub fn node(&self, key: &NodeKey) -> Result<&NodeAttrs> {
        let index = self.index_of(key)?;
        // The index came from our own map, so the weight is present.
        Ok(&self.graph[index])
    }

    /// Get a node's attributes mutably.
    pub fn node_mut(&mut self, key: &NodeKey) -> Result<&mut NodeAttrs> {
        let index = self.index_of(key)?;
        Ok(&mut self.graph[index])
    }

    /// Resolve a key to its petgraph index.
    pub fn index_of(&self, key: &NodeKey) -> Result<NodeIndex> {
        self.key_to_index
            .get(key)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(key.clone()))
    }

    /// Dense slot of a node (its position in insertion order).
    pub fn slot_of(&self, key: &NodeKey) -> Result<usize> {
        self.index_of(key).map(|index| index.index())
    }

    /// The key occupying a slot, if in range.
    #[inline]
    pub fn key_at_slot(&self, slot: usize) -> Option<&NodeKey> {
        self.keys.get(slot)
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.keys.len()
    }

    // =========================================================================
    // Link Operations
    // =========================================================================

    /// Insert a directed link from `source` to `target`.
    ///
    /// Fails with [`GraphError::UnknownNode`] if either endpoint is absent.
    /// Parallel links are allowed (multigraph).
    pub fn add_link(
        &mut self,
        source: &NodeKey,
        target: &NodeKey,
        attrs: LinkAttrs,
    ) -> Result<EdgeIndex> {
        let source_index = self
            .key_to_index
            .get(source)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(source.clone()))?;
        let target_index = self
            .key_to_index
            .get(target)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(target.clone()))?;

        let index = self.graph.add_edge(source_index, target_index, attrs);
        self.link_order.push(index);
        Ok(index)
    }

    /// Number of links.
    #[inline]
    pub fn link_count(&self) -> usize {
        self.link_order.len()
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Iterate nodes as `(key, attributes)` in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeKey, &NodeAttrs)> {
        self.keys.iter().map(|key| {
            let index = self.key_to_index[key];
            (key, &self.graph[index])
        })
    }

    /// Iterate node keys in insertion order.
    pub fn node_keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.keys.iter()
    }

    /// Iterate links in insertion order, resolved to endpoint keys and
    /// slots.
    pub fn links(&self) -> impl Iterator<Item = LinkRef<'_>> {
        self.link_order.iter().map(|&edge| {
            // Endpoints and weight exist for every index we handed out.
            let (source_index, target_index) = self
                .graph
                .edge_endpoints(edge)
                .expect("link index tracked by store");
            LinkRef {
                source: &self.keys[source_index.index()],
                target: &self.keys[target_index.index()],
                source_slot: source_index.index(),
                target_slot: target_index.index(),
                attrs: &self.graph[edge],
            }
        })
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup_node() {
        let mut store = GraphStore::new();
        store
            .add_node(
                NodeKey::from("A"),
                NodeAttrs {
                    label: Some("Alpha".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(store.node_count(), 1);
        let attrs = store.node(&NodeKey::from("A")).unwrap();
        assert_eq!(attrs.label.as_deref(), Some("Alpha"));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut store = GraphStore::new();
        store.add_node(NodeKey::from("A"), NodeAttrs::bare()).unwrap();

        let err = store
            .add_node(NodeKey::from("A"), NodeAttrs::bare())
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode(_)));
    }

    #[test]
    fn test_lookup_missing_node() {
        let store = GraphStore::new();
        let err = store.node(&NodeKey::from("ghost")).unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound(_)));
    }

    #[test]
    fn test_link_requires_both_endpoints() {
        let mut store = GraphStore::new();
        store.add_node(NodeKey::from("A"), NodeAttrs::bare()).unwrap();

        let err = store
            .add_link(&NodeKey::from("A"), &NodeKey::from("B"), LinkAttrs::bare())
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode(NodeKey::Str(k)) if k == "B"));
    }

    #[test]
    fn test_parallel_links_allowed() {
        let mut store = GraphStore::new();
        store.add_node(NodeKey::from("A"), NodeAttrs::bare()).unwrap();
        store.add_node(NodeKey::from("B"), NodeAttrs::bare()).unwrap();

        store
            .add_link(&NodeKey::from("A"), &NodeKey::from("B"), LinkAttrs::bare())
            .unwrap();
        store
            .add_link(&NodeKey::from("A"), &NodeKey::from("B"), LinkAttrs::bare())
            .unwrap();
        assert_eq!(store.link_count(), 2);
    }

    #[test]
    fn test_ensure_node_idempotent() {
        let mut store = GraphStore::new();
        let first = store.ensure_node(&NodeKey::from("X"));
        let second = store.ensure_node(&NodeKey::from("X"));
        assert_eq!(first, second);
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_insertion_order_iteration() {
        let mut store = GraphStore::new();
        for key in ["C", "A", "B"] {
            store.add_node(NodeKey::from(key), NodeAttrs::bare()).unwrap();
        }

        let order: Vec<String> = store.node_keys().map(|k| k.to_string()).collect();
        assert_eq!(order, ["C", "A", "B"]);

        // Restartable: a second pass sees the same order.
        let again: Vec<String> = store.node_keys().map(|k| k.to_string()).collect();
        assert_eq!(order, again);
    }

    #[test]
    fn test_slots_are_dense_insertion_order() {
        let mut store = GraphStore::new();
        store.add_node(NodeKey::from("A"), NodeAttrs::bare()).unwrap();
        store.add_node(NodeKey::from(7), NodeAttrs::bare()).unwrap();

        assert_eq!(store.slot_of(&NodeKey::from("A")).unwrap(), 0);
        assert_eq!(store.slot_of(&NodeKey::from(7)).unwrap(), 1);
        assert_eq!(store.key_at_slot(1), Some(&NodeKey::from(7)));
    }

    #[test]
    fn test_link_iteration_resolves_endpoints() {
        let mut store = GraphStore::new();
        store.add_node(NodeKey::from("A"), NodeAttrs::bare()).unwrap();
        store.add_node(NodeKey::from("B"), NodeAttrs::bare()).unwrap();
        store
            .add_link(
                &NodeKey::from("A"),
                &NodeKey::from("B"),
                LinkAttrs {
                    raw_weight: Some(5.0),
                    scaled_weight: Some(3.0),
                },
            )
            .unwrap();

        let links: Vec<_> = store.links().collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].source, &NodeKey::from("A"));
        assert_eq!(links[0].target, &NodeKey::from("B"));
        assert_eq!(links[0].source_slot, 0);
        assert_eq!(links[0].target_slot, 1);
        assert_eq!(links[0].attrs.scaled_weight, Some(3.0));
    }
}
