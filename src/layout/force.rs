//! 3-D force-directed layout.
//!
//! Iterative physics simulation assigning every node a position in space:
//! all node pairs repel with an inverse-square force, connected nodes are
//! pulled toward a configured rest length by Hooke springs, and velocities
//! decay under drag. Integration is fixed-step Euler over a fixed number of
//! steps with no convergence early-exit; each step reads only the positions
//! produced by the prior step (forces are fully accumulated before any
//! position moves).
//!
//! Determinism: initial placement uses a seeded RNG, so identical topology,
//! configuration and seed reproduce identical coordinates. Callers should
//! still rely only on relative structure, not absolute coordinates; the
//! seed is a tuning knob, not a contract.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::error::{GraphError, Result};
use crate::graph::{GraphStore, NodeKey};

/// Minimum separation used in the repulsion denominator. Caps the force
/// spike when two nodes pass very close to each other.
const MIN_SEPARATION: f64 = 1.0;

/// A 3-D coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// Create a point from its components.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Whether all components are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Configuration for the force simulation.
#[derive(Debug, Clone, Copy)]
pub struct ForceConfig {
    /// Rest length of the spring between connected nodes (default: 30.0).
    /// A value extremely close to zero (e.g. 1e-5) makes connectivity
    /// distance dominated by repulsion rather than a fixed target spacing.
    pub spring_length: f64,
    /// Stiffness multiplier for the spring term (default: 1.6).
    pub spring_coefficient: f64,
    /// Charge-like pairwise repulsion strength (default: 200.0).
    /// Zero disables repulsion entirely.
    pub repulsion: f64,
    /// Per-step velocity decay factor in `[0, 1)` (default: 0.02).
    pub drag: f64,
    /// Integration time step (default: 0.02).
    pub time_step: f64,
    /// Seed for the initial random placement.
    pub seed: u64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            spring_length: 30.0,
            spring_coefficient: 1.6,
            repulsion: 200.0,
            drag: 0.02,
            time_step: 0.02,
            seed: 0x6f72_7265_7279,
        }
    }
}

/// A spring between two node slots, one per link.
struct Spring {
    source: usize,
    target: usize,
}

/// The force simulation state.
///
/// Build one from an ingested [`GraphStore`], call
/// [`run`](ForceLayout::run) for the configured number of steps, then read
/// positions by node slot. Node keys are retained for error reporting only.
pub struct ForceLayout {
    config: ForceConfig,
    /// Node keys by slot, mirroring the store's insertion order.
    keys: Vec<NodeKey>,
    springs: Vec<Spring>,
    positions: Vec<Point3>,
    velocities: Vec<Point3>,
    /// Scratch buffer: forces accumulated within the current step.
    forces: Vec<Point3>,
    steps_taken: u32,
}

impl ForceLayout {
    /// Create a simulation over the store's topology, seeding every node
    /// with a random position inside a cube whose extent grows with the
    /// cube root of the node count.
    pub fn new(store: &GraphStore, config: ForceConfig) -> Self {
        let node_count = store.node_count();
        let keys: Vec<NodeKey> = store.node_keys().cloned().collect();
        let springs = store
            .links()
            .map(|link| Spring {
                source: link.source_slot,
                target: link.target_slot,
            })
            .collect();

        let extent = (node_count as f64).cbrt() * config.spring_length.max(1.0);
        let mut rng = StdRng::seed_from_u64(config.seed);
        let positions = (0..node_count)
            .map(|_| {
                Point3::new(
                    rng.gen_range(-extent..=extent),
                    rng.gen_range(-extent..=extent),
                    rng.gen_range(-extent..=extent),
                )
            })
            .collect();

        Self {
            config,
            keys,
            springs,
            positions,
            velocities: vec![Point3::default(); node_count],
            forces: vec![Point3::default(); node_count],
            steps_taken: 0,
        }
    }

    /// Advance the simulation by one step.
    pub fn step(&mut self) {
        let n = self.positions.len();
        for f in &mut self.forces {
            *f = Point3::default();
        }

        // Pairwise repulsion: inverse-square, pushing nodes apart along
        // their separation vector. O(n^2) over the prior step's positions.
        let repulsion = self.config.repulsion;
        if repulsion != 0.0 {
            for i in 0..n {
                for j in (i + 1)..n {
                    let (dx, dy, dz) = separation(&self.positions, i, j);
                    let dist_sq = (dx * dx + dy * dy + dz * dz)
                        .max(MIN_SEPARATION * MIN_SEPARATION);
                    let dist = dist_sq.sqrt();
                    // F = repulsion / d^2, applied along the unit vector.
                    let scale = repulsion / (dist_sq * dist);
                    let (fx, fy, fz) = (dx * scale, dy * scale, dz * scale);
                    self.forces[i].x += fx;
                    self.forces[i].y += fy;
                    self.forces[i].z += fz;
                    self.forces[j].x -= fx;
                    self.forces[j].y -= fy;
                    self.forces[j].z -= fz;
                }
            }
        }

        // Springs: Hooke force toward the rest length per link.
        let k = self.config.spring_coefficient;
        let rest = self.config.spring_length;
        for spring in &self.springs {
            let (i, j) = (spring.source, spring.target);
            if i == j {
                continue; // self-loop exerts no force
            }
            let (dx, dy, dz) = separation(&self.positions, i, j);
            let dist = (dx * dx + dy * dy + dz * dz).sqrt().max(1e-9);
            // Positive when stretched past the rest length: pulls inward.
            let scale = k * (dist - rest) / dist;
            let (fx, fy, fz) = (dx * scale, dy * scale, dz * scale);
            self.forces[i].x -= fx;
            self.forces[i].y -= fy;
            self.forces[i].z -= fz;
            self.forces[j].x += fx;
            self.forces[j].y += fy;
            self.forces[j].z += fz;
        }

        // Euler integration with velocity drag.
        let dt = self.config.time_step;
        let damping = 1.0 - self.config.drag;
        for i in 0..n {
            let v = &mut self.velocities[i];
            v.x = (v.x + self.forces[i].x * dt) * damping;
            v.y = (v.y + self.forces[i].y * dt) * damping;
            v.z = (v.z + self.forces[i].z * dt) * damping;
            let p = &mut self.positions[i];
            p.x += v.x * dt;
            p.y += v.y * dt;
            p.z += v.z * dt;
        }

        self.steps_taken += 1;
    }

    /// Run a fixed number of steps, then verify every position is finite.
    ///
    /// Numeric instability (NaN/infinite coordinates) is a fatal invariant
    /// violation surfaced as [`GraphError::LayoutUnstable`], never silently
    /// passed to a renderer.
    pub fn run(&mut self, steps: u32) -> Result<()> {
        debug!(steps, nodes = self.positions.len(), "running force layout");
        for _ in 0..steps {
            self.step();
        }
        self.ensure_finite()
    }

    /// Position of the node occupying `slot`, if in range.
    #[inline]
    pub fn position_at(&self, slot: usize) -> Option<Point3> {
        self.positions.get(slot).copied()
    }

    /// All positions, indexed by node slot.
    #[inline]
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    /// Number of steps taken so far.
    #[inline]
    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    /// Check that every node has a finite position.
    pub fn ensure_finite(&self) -> Result<()> {
        for (slot, position) in self.positions.iter().enumerate() {
            if !position.is_finite() {
                return Err(GraphError::LayoutUnstable {
                    node: self.keys[slot].clone(),
                    steps: self.steps_taken,
                });
            }
        }
        Ok(())
    }
}

/// Separation vector from node `j` to node `i` (points away from `j`).
#[inline]
fn separation(positions: &[Point3], i: usize, j: usize) -> (f64, f64, f64) {
    let (a, b) = (&positions[i], &positions[j]);
    let (dx, dy, dz) = (a.x - b.x, a.y - b.y, a.z - b.z);
    if dx == 0.0 && dy == 0.0 && dz == 0.0 {
        // Coincident points have no direction; nudge deterministically so
        // the pair separates instead of dividing by zero.
        return (1e-3 * (i as f64 - j as f64), 1e-3, -1e-3);
    }
    (dx, dy, dz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphStore, LinkAttrs, NodeAttrs};

    fn two_node_store() -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node(NodeKey::from("A"), NodeAttrs::bare()).unwrap();
        store.add_node(NodeKey::from("B"), NodeAttrs::bare()).unwrap();
        store
            .add_link(&NodeKey::from("A"), &NodeKey::from("B"), LinkAttrs::bare())
            .unwrap();
        store
    }

    #[test]
    fn test_spring_pair_settles_near_rest_length() {
        // With repulsion disabled the spring target is the only
        // equilibrium, so the pair must settle at the rest length.
        let config = ForceConfig {
            repulsion: 0.0,
            ..Default::default()
        };
        let store = two_node_store();
        let mut layout = ForceLayout::new(&store, config);
        layout.run(1000).unwrap();

        let a = layout.position_at(0).unwrap();
        let b = layout.position_at(1).unwrap();
        let dist = a.distance(&b);
        let rest = config.spring_length;
        assert!(
            (dist - rest).abs() / rest < 0.05,
            "pair should settle near rest length {rest}, got {dist}"
        );
    }

    #[test]
    fn test_identical_runs_are_identical() {
        let store = two_node_store();
        let config = ForceConfig::default();

        let mut first = ForceLayout::new(&store, config);
        first.run(1000).unwrap();
        let mut second = ForceLayout::new(&store, config);
        second.run(1000).unwrap();

        for slot in 0..2 {
            assert_eq!(first.position_at(slot), second.position_at(slot));
        }
    }

    #[test]
    fn test_different_seeds_same_relative_structure() {
        let store = two_node_store();
        let base = ForceConfig {
            repulsion: 0.0,
            ..Default::default()
        };

        let mut first = ForceLayout::new(&store, base);
        first.run(1000).unwrap();
        let mut second = ForceLayout::new(&store, ForceConfig { seed: 99, ..base });
        second.run(1000).unwrap();

        // Absolute coordinates differ with the seed, relative distance
        // does not.
        let d1 = first.position_at(0).unwrap().distance(&first.position_at(1).unwrap());
        let d2 = second.position_at(0).unwrap().distance(&second.position_at(1).unwrap());
        assert!((d1 - d2).abs() / d1 < 0.05, "relative structure should match: {d1} vs {d2}");
    }

    #[test]
    fn test_repulsion_spreads_disconnected_nodes() {
        // No springs: the only force is repulsion, so the pair must end up
        // strictly further apart than it started.
        let mut store = GraphStore::new();
        store.add_node(NodeKey::from(0), NodeAttrs::bare()).unwrap();
        store.add_node(NodeKey::from(1), NodeAttrs::bare()).unwrap();

        let mut layout = ForceLayout::new(&store, ForceConfig::default());
        let before = layout.position_at(0).unwrap().distance(&layout.position_at(1).unwrap());
        layout.run(500).unwrap();
        let after = layout.position_at(0).unwrap().distance(&layout.position_at(1).unwrap());
        assert!(after > before, "repulsion should push the pair apart: {before} -> {after}");
    }

    #[test]
    fn test_near_zero_spring_length_tuning() {
        // The pipeline's standard tuning: connectivity spacing dominated by
        // repulsion. The pair must still settle at a stable finite distance.
        let config = ForceConfig {
            spring_length: 1e-5,
            ..Default::default()
        };
        let store = two_node_store();
        let mut layout = ForceLayout::new(&store, config);
        layout.run(1000).unwrap();

        let dist = layout
            .position_at(0)
            .unwrap()
            .distance(&layout.position_at(1).unwrap());
        assert!(dist.is_finite() && dist > 0.0);
        // Equilibrium balances spring pull and repulsion push:
        // k * d = repulsion / d^2  =>  d = (repulsion / k)^(1/3)
        let expected = (config.repulsion / config.spring_coefficient).cbrt();
        assert!(
            (dist - expected).abs() / expected < 0.1,
            "expected repulsion-dominated spacing ~{expected}, got {dist}"
        );
    }

    #[test]
    fn test_every_node_positioned_after_run() {
        let store = two_node_store();
        let mut layout = ForceLayout::new(&store, ForceConfig::default());
        layout.run(10).unwrap();
        assert_eq!(layout.positions().len(), 2);
        assert!(layout.positions().iter().all(Point3::is_finite));
        assert_eq!(layout.steps_taken(), 10);
    }

    #[test]
    fn test_self_loop_exerts_no_force() {
        let mut store = GraphStore::new();
        store.add_node(NodeKey::from("A"), NodeAttrs::bare()).unwrap();
        store
            .add_link(&NodeKey::from("A"), &NodeKey::from("A"), LinkAttrs::bare())
            .unwrap();
        let mut layout = ForceLayout::new(&store, ForceConfig::default());
        layout.run(100).unwrap();
        assert!(layout.position_at(0).unwrap().is_finite());
    }

    #[test]
    fn test_unstable_layout_is_reported() {
        let store = two_node_store();
        let mut layout = ForceLayout::new(&store, ForceConfig::default());
        layout.positions[1] = Point3::new(f64::NAN, 0.0, 0.0);

        let err = layout.ensure_finite().unwrap_err();
        assert!(matches!(err, GraphError::LayoutUnstable { node, .. } if node == NodeKey::from("B")));
    }
}
