//! Attribute assignment: the pipeline's final stage.
//!
//! Combines the layout positions, the cluster partition and the scaled
//! ingestion attributes into finalized per-node and per-link visual
//! records, ready for an external renderer. Clusters are colored in
//! first-encountered order by popping palette entries; every node of a
//! cluster shares that cluster's color.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{GraphError, Result};
use crate::graph::{GraphStore, NodeKey};
use crate::layout::{ClusterAssignment, ClusterId, ForceLayout, Point3};
use crate::palette::ColorPalette;

/// Display size of a node that carried no raw size.
pub const DEFAULT_NODE_SIZE: f64 = 1.0;
/// Display weight of a link that carried no raw weight.
pub const DEFAULT_LINK_WEIGHT: f64 = 1.0;

/// Finalized visual record for one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeRecord {
    /// Stable node id from the input.
    pub id: NodeKey,
    /// Display label, if the input provided one.
    pub label: Option<String>,
    /// Converged 3-D position.
    pub position: Point3,
    /// Scaled display size (`[1.0, 5.0]` when the input carried sizes).
    pub size: f64,
    /// Cluster color; identical for every node in the cluster.
    pub color: String,
    /// Cluster label.
    pub cluster: ClusterId,
}

/// Finalized visual record for one link: the endpoints' resolved positions
/// plus the scaled display weight.
#[derive(Debug, Clone, Serialize)]
pub struct LinkRecord {
    /// Position of the source node.
    pub source_position: Point3,
    /// Position of the target node.
    pub target_position: Point3,
    /// Scaled display weight (`[1.0, 5.0]` when the input carried weights).
    pub weight: f64,
}

/// Produce the finalized node and link records, in insertion order.
///
/// The layout and cluster assignment must come from the same store; a
/// mismatch surfaces as [`GraphError::NodeNotFound`].
pub fn assign(
    store: &GraphStore,
    layout: &ForceLayout,
    clusters: &ClusterAssignment,
    mut palette: ColorPalette,
) -> Result<(Vec<NodeRecord>, Vec<LinkRecord>)> {
    // Color clusters in the order nodes (and therefore clusters) were first
    // encountered, consuming one palette entry per distinct cluster.
    let mut cluster_colors: HashMap<ClusterId, String> = HashMap::new();
    for key in store.node_keys() {
        let cluster = clusters.get_class(key)?;
        cluster_colors
            .entry(cluster)
            .or_insert_with(|| palette.take().to_owned());
    }
    debug!(
        clusters = cluster_colors.len(),
        palette = palette.len(),
        "assigned cluster colors"
    );

    let mut nodes = Vec::with_capacity(store.node_count());
    for (slot, (key, attrs)) in store.nodes().enumerate() {
        let position = layout
            .position_at(slot)
            .ok_or_else(|| GraphError::NodeNotFound(key.clone()))?;
        let cluster = clusters.get_class(key)?;
        nodes.push(NodeRecord {
            id: key.clone(),
            label: attrs.label.clone(),
            position,
            size: attrs.scaled_size.unwrap_or(DEFAULT_NODE_SIZE),
            color: cluster_colors[&cluster].clone(),
            cluster,
        });
    }

    let mut links = Vec::with_capacity(store.link_count());
    for link in store.links() {
        let source_position = layout
            .position_at(link.source_slot)
            .ok_or_else(|| GraphError::NodeNotFound(link.source.clone()))?;
        let target_position = layout
            .position_at(link.target_slot)
            .ok_or_else(|| GraphError::NodeNotFound(link.target.clone()))?;
        links.push(LinkRecord {
            source_position,
            target_position,
            weight: link.attrs.scaled_weight.unwrap_or(DEFAULT_LINK_WEIGHT),
        });
    }

    Ok((nodes, links))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LinkAttrs, NodeAttrs};
    use crate::layout::{self, ForceConfig, LouvainConfig};

    fn clique_pair_store() -> GraphStore {
        // Two triangles, no bridge: two clear clusters.
        let mut store = GraphStore::new();
        for i in 0..6i64 {
            store.add_node(NodeKey::from(i), NodeAttrs::bare()).unwrap();
        }
        for &(s, t) in &[(0i64, 1i64), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)] {
            store
                .add_link(&NodeKey::from(s), &NodeKey::from(t), LinkAttrs::bare())
                .unwrap();
        }
        store
    }

    fn run_stages(store: &GraphStore) -> (ForceLayout, ClusterAssignment) {
        let mut force = ForceLayout::new(store, ForceConfig::default());
        force.run(50).unwrap();
        let clusters = layout::community::detect(store, &LouvainConfig::default());
        (force, clusters)
    }

    #[test]
    fn test_same_cluster_same_color() {
        let store = clique_pair_store();
        let (force, clusters) = run_stages(&store);
        let (nodes, _) = assign(&store, &force, &clusters, ColorPalette::default()).unwrap();

        let mut by_cluster: HashMap<ClusterId, &str> = HashMap::new();
        for node in &nodes {
            let color = by_cluster.entry(node.cluster).or_insert(&node.color);
            assert_eq!(*color, node.color, "cluster {} must share one color", node.cluster);
        }
    }

    #[test]
    fn test_distinct_clusters_distinct_colors() {
        let store = clique_pair_store();
        let (force, clusters) = run_stages(&store);
        let (nodes, _) = assign(&store, &force, &clusters, ColorPalette::default()).unwrap();

        let mut colors: HashMap<ClusterId, String> = HashMap::new();
        for node in &nodes {
            colors.insert(node.cluster, node.color.clone());
        }
        let distinct: std::collections::HashSet<_> = colors.values().collect();
        assert_eq!(distinct.len(), colors.len());
    }

    #[test]
    fn test_first_encountered_cluster_gets_first_color() {
        let store = clique_pair_store();
        let (force, clusters) = run_stages(&store);
        let (nodes, _) = assign(&store, &force, &clusters, ColorPalette::default()).unwrap();

        // Node at slot 0 belongs to the first-encountered cluster.
        assert_eq!(nodes[0].color, "#1f77b4");
    }

    #[test]
    fn test_default_size_and_weight_fallbacks() {
        let store = clique_pair_store();
        let (force, clusters) = run_stages(&store);
        let (nodes, links) = assign(&store, &force, &clusters, ColorPalette::default()).unwrap();

        // Bare input carried no sizes or weights.
        assert!(nodes.iter().all(|n| n.size == DEFAULT_NODE_SIZE));
        assert!(links.iter().all(|l| l.weight == DEFAULT_LINK_WEIGHT));
    }

    #[test]
    fn test_link_endpoints_match_node_positions() {
        let store = clique_pair_store();
        let (force, clusters) = run_stages(&store);
        let (nodes, links) = assign(&store, &force, &clusters, ColorPalette::default()).unwrap();

        // First link is 0 -> 1 in insertion order.
        assert_eq!(links[0].source_position, nodes[0].position);
        assert_eq!(links[0].target_position, nodes[1].position);
    }

    #[test]
    fn test_records_in_insertion_order() {
        let store = clique_pair_store();
        let (force, clusters) = run_stages(&store);
        let (nodes, links) = assign(&store, &force, &clusters, ColorPalette::default()).unwrap();

        let ids: Vec<String> = nodes.iter().map(|n| n.id.to_string()).collect();
        assert_eq!(ids, ["0", "1", "2", "3", "4", "5"]);
        assert_eq!(links.len(), 6);
    }

    #[test]
    fn test_scaled_size_carries_through() {
        let mut store = GraphStore::new();
        store
            .add_node(
                NodeKey::from("A"),
                NodeAttrs {
                    scaled_size: Some(5.0),
                    raw_size: Some(20.0),
                    ..Default::default()
                },
            )
            .unwrap();
        let (force, clusters) = run_stages(&store);
        let (nodes, _) = assign(&store, &force, &clusters, ColorPalette::default()).unwrap();
        assert_eq!(nodes[0].size, 5.0);
    }
}
