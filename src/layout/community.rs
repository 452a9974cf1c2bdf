//! Multi-level Louvain community detection.
//!
//! Partitions the store's nodes into clusters by modularity optimization
//! over the weighted topology, independent of layout positions.
//!
//! # Algorithm
//!
//! 1. **Local moving**: each node starts in its own community; nodes move
//!    to the neighboring community with the best positive modularity gain
//!    until no move improves.
//! 2. **Aggregation**: each community collapses into a super-node; edge
//!    weights between super-nodes sum the inter-community weights,
//!    intra-community weights become self-loops.
//! 3. Repeat on the coarsened graph; modularity is evaluated on the
//!    original graph at every level and the best partition wins.
//!
//! The result is always a complete partition: every node belongs to exactly
//! one cluster, clusters are disjoint, and their union is the node set.
//! Given a fixed graph the run is deterministic: nodes are visited in
//! insertion order and candidate communities are evaluated in ascending id
//! order, so tie-breaking is fixed.
//!
//! # References
//!
//! - Blondel et al., "Fast unfolding of communities in large networks" (2008)

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::{GraphError, Result};
use crate::graph::{GraphStore, NodeKey};

/// Cluster label: contiguous ids in first-encountered order.
pub type ClusterId = u32;

/// Configuration for community detection.
#[derive(Debug, Clone, Copy)]
pub struct LouvainConfig {
    /// Resolution parameter (1.0 = standard modularity). Higher values
    /// produce more, smaller communities.
    pub resolution: f64,
    /// Maximum local-moving sweeps per level (default: 100).
    pub max_iterations: u32,
    /// Convergence threshold on per-sweep modularity gain (default: 1e-4).
    pub min_modularity_gain: f64,
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            max_iterations: 100,
            min_modularity_gain: 1e-4,
        }
    }
}

/// A complete partition of the node set into clusters.
pub struct ClusterAssignment {
    /// Cluster per node slot (insertion order).
    slots: Vec<ClusterId>,
    /// Key -> slot, for by-key lookup.
    by_key: HashMap<NodeKey, usize>,
    cluster_count: u32,
    modularity: f64,
}

impl ClusterAssignment {
    /// Cluster label of a node.
    ///
    /// Fails with [`GraphError::NodeNotFound`] for an unknown key.
    pub fn get_class(&self, key: &NodeKey) -> Result<ClusterId> {
        self.by_key
            .get(key)
            .map(|&slot| self.slots[slot])
            .ok_or_else(|| GraphError::NodeNotFound(key.clone()))
    }

    /// Cluster label of the node occupying `slot`, if in range.
    #[inline]
    pub fn cluster_at_slot(&self, slot: usize) -> Option<ClusterId> {
        self.slots.get(slot).copied()
    }

    /// Number of distinct clusters.
    #[inline]
    pub fn cluster_count(&self) -> u32 {
        self.cluster_count
    }

    /// Modularity Q of the kept partition (0.0 when the graph has no
    /// edges).
    #[inline]
    pub fn modularity(&self) -> f64 {
        self.modularity
    }
}

/// Undirected weighted adjacency built from the store's links.
///
/// A directed link contributes its weight to both endpoints; a link with no
/// scaled weight counts as 1.0.
struct Adjacency {
    /// Per node: `(neighbor_slot, weight)` pairs, including self-loops.
    neighbors: Vec<Vec<(usize, f64)>>,
    /// Sum of all edge weights, each undirected edge counted once.
    total_weight: f64,
    /// Weighted degree per node.
    degree: Vec<f64>,
}

impl Adjacency {
    fn from_store(store: &GraphStore) -> Self {
        let node_count = store.node_count();
        let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); node_count];
        let mut degree = vec![0.0f64; node_count];
        let mut total_weight = 0.0f64;

        for link in store.links() {
            let (src, tgt) = (link.source_slot, link.target_slot);
            let w = link.attrs.effective_weight();
            if src == tgt {
                // Self-loop: one neighbor entry, full weight on the degree.
                neighbors[src].push((src, w));
                degree[src] += 2.0 * w;
            } else {
                neighbors[src].push((tgt, w));
                neighbors[tgt].push((src, w));
                degree[src] += w;
                degree[tgt] += w;
            }
            total_weight += w;
        }

        Self {
            neighbors,
            total_weight,
            degree,
        }
    }

    fn node_count(&self) -> usize {
        self.neighbors.len()
    }
}

/// Detect communities over the store's weighted topology.
pub fn detect(store: &GraphStore, config: &LouvainConfig) -> ClusterAssignment {
    let node_count = store.node_count();
    let by_key: HashMap<NodeKey, usize> = store
        .node_keys()
        .enumerate()
        .map(|(slot, key)| (key.clone(), slot))
        .collect();

    if node_count == 0 {
        return ClusterAssignment {
            slots: Vec::new(),
            by_key,
            cluster_count: 0,
            modularity: 0.0,
        };
    }

    let original = Adjacency::from_store(store);

    // No edges: every node is its own singleton cluster.
    if original.total_weight < f64::EPSILON {
        return ClusterAssignment {
            slots: (0..node_count as u32).collect(),
            by_key,
            cluster_count: node_count as u32,
            modularity: 0.0,
        };
    }

    // Multi-level optimization with per-level modularity tracking on the
    // original graph. Keeping the best-scoring level prevents over-coarsening
    // a sparse graph past the partition that actually scores highest.
    let mut levels: Vec<Vec<usize>> = Vec::new();
    let mut current = Adjacency::from_store(store);
    let max_levels = 20;

    // The baseline to beat is the all-singletons partition, scored for
    // real: a candidate that merges the whole graph into one community is
    // legitimate whenever it scores higher (a clique does).
    let mut best_slots: Vec<u32> = (0..node_count as u32).collect();
    let mut best_count = node_count as u32;
    let mut best_modularity = modularity(&best_slots, best_count, &original, config.resolution);

    for level in 0..max_levels {
        let community = local_moving(&current, config);
        let (compacted, num_communities) = compact(&community);

        if num_communities >= current.node_count() {
            break; // no further reduction
        }
        levels.push(compacted.clone());

        let candidate = flatten_levels(&levels, node_count);
        let candidate_count = candidate.iter().max().map_or(0, |&c| c + 1);
        let candidate_modularity =
            modularity(&candidate, candidate_count, &original, config.resolution);
        debug!(
            level,
            communities = candidate_count,
            modularity = candidate_modularity,
            "louvain level complete"
        );

        if candidate_modularity > best_modularity {
            best_slots = candidate;
            best_count = candidate_count;
            best_modularity = candidate_modularity;
        } else if candidate_modularity < best_modularity - 0.01 {
            break; // further coarsening is hurting the partition
        }

        current = coarsen(&current, &compacted, num_communities);
    }

    ClusterAssignment {
        slots: best_slots,
        by_key,
        cluster_count: best_count,
        modularity: best_modularity,
    }
}

/// Phase 1: local moving. Returns the (uncompacted) community per node.
fn local_moving(adj: &Adjacency, config: &LouvainConfig) -> Vec<usize> {
    let node_count = adj.node_count();
    if adj.total_weight < f64::EPSILON {
        return (0..node_count).collect();
    }

    let m2 = 2.0 * adj.total_weight;
    let mut community: Vec<usize> = (0..node_count).collect();
    let mut sigma_tot: Vec<f64> = adj.degree.clone();

    let mut iteration = 0u32;
    let mut improved = true;

    while improved && iteration < config.max_iterations {
        improved = false;
        iteration += 1;
        let mut sweep_gain = 0.0f64;

        for node in 0..node_count {
            let node_comm = community[node];
            let k_i = adj.degree[node];
            if k_i < f64::EPSILON {
                continue;
            }

            // Edge weight from this node into each adjacent community.
            // BTreeMap: candidates are evaluated in ascending community id
            // order, fixing the tie-break.
            let mut comm_weights: BTreeMap<usize, f64> = BTreeMap::new();
            for &(neighbor, weight) in &adj.neighbors[node] {
                if neighbor != node {
                    *comm_weights.entry(community[neighbor]).or_insert(0.0) += weight;
                }
            }

            let k_i_in = comm_weights.get(&node_comm).copied().unwrap_or(0.0);

            // Remove the node from its community before evaluating moves.
            sigma_tot[node_comm] -= k_i;

            let removal_loss =
                k_i_in / m2 - config.resolution * sigma_tot[node_comm] * k_i / (m2 * m2);

            let mut best_comm = node_comm;
            let mut best_gain = 0.0f64;
            for (&target_comm, &k_i_to_c) in &comm_weights {
                let insertion_gain = k_i_to_c / m2
                    - config.resolution * sigma_tot[target_comm] * k_i / (m2 * m2);
                let net_gain = insertion_gain - removal_loss;
                if net_gain > best_gain {
                    best_gain = net_gain;
                    best_comm = target_comm;
                }
            }

            community[node] = best_comm;
            sigma_tot[best_comm] += k_i;

            if best_comm != node_comm {
                improved = true;
                sweep_gain += best_gain;
            }
        }

        if sweep_gain < config.min_modularity_gain {
            break;
        }
    }

    community
}

/// Phase 2: collapse each community into a super-node.
fn coarsen(adj: &Adjacency, community: &[usize], num_communities: usize) -> Adjacency {
    // Accumulate weights between community pairs; the adjacency stores both
    // directions, so each undirected edge is visited twice here.
    let mut inter: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for node in 0..community.len() {
        let src_comm = community[node];
        for &(neighbor, weight) in &adj.neighbors[node] {
            let tgt_comm = community[neighbor];
            *inter.entry((src_comm, tgt_comm)).or_insert(0.0) += weight;
        }
    }

    let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); num_communities];
    let mut degree = vec![0.0f64; num_communities];
    let mut total_weight = 0.0f64;

    for (&(src_comm, tgt_comm), &w) in &inter {
        if src_comm == tgt_comm {
            // Internal edges become a self-loop; w already double-counts
            // them, so halve for the stored weight.
            neighbors[src_comm].push((src_comm, w / 2.0));
            degree[src_comm] += w;
            total_weight += w / 2.0;
        } else {
            neighbors[src_comm].push((tgt_comm, w));
            degree[src_comm] += w;
            total_weight += w / 2.0;
        }
    }

    Adjacency {
        neighbors,
        total_weight,
        degree,
    }
}

/// Compact community ids to contiguous `0..n` in first-encountered order.
fn compact(community: &[usize]) -> (Vec<usize>, usize) {
    let mut id_map: HashMap<usize, usize> = HashMap::new();
    let mut next_id = 0usize;
    let compacted = community
        .iter()
        .map(|&comm| {
            *id_map.entry(comm).or_insert_with(|| {
                let id = next_id;
                next_id += 1;
                id
            })
        })
        .collect();
    (compacted, next_id)
}

/// Trace every original node through the level stack to its final cluster,
/// re-compacted to contiguous ids in slot order.
fn flatten_levels(levels: &[Vec<usize>], node_count: usize) -> Vec<u32> {
    let mut assignments = vec![0u32; node_count];
    for node in 0..node_count {
        let mut comm = node;
        for level in levels {
            comm = level[comm];
        }
        assignments[node] = comm as u32;
    }

    let mut id_map: HashMap<u32, u32> = HashMap::new();
    let mut next_id = 0u32;
    for assignment in &mut assignments {
        let compacted = *id_map.entry(*assignment).or_insert_with(|| {
            let id = next_id;
            next_id += 1;
            id
        });
        *assignment = compacted;
    }
    assignments
}

/// Modularity Q of a partition:
/// `Q = sum_c [ L_c / m - resolution * (d_c / 2m)^2 ]`.
fn modularity(assignments: &[u32], cluster_count: u32, adj: &Adjacency, resolution: f64) -> f64 {
    if adj.total_weight < f64::EPSILON {
        return 0.0;
    }

    let m2 = 2.0 * adj.total_weight;
    let mut internal = vec![0.0f64; cluster_count as usize];
    let mut cluster_degree = vec![0.0f64; cluster_count as usize];

    for node in 0..assignments.len() {
        let c = assignments[node] as usize;
        cluster_degree[c] += adj.degree[node];
        for &(neighbor, weight) in &adj.neighbors[node] {
            if assignments[neighbor] == assignments[node] {
                internal[c] += weight;
            }
        }
    }

    // Each internal edge was counted from both endpoints.
    let mut q = 0.0f64;
    for c in 0..cluster_count as usize {
        let l_c = internal[c] / 2.0;
        let d_c = cluster_degree[c];
        q += l_c / adj.total_weight - resolution * (d_c / m2).powi(2);
    }
    q
}
