//! Orrery - 3-D graph layout and clustering pipeline.
//!
//! Ingests a graph description (attributed nodes + weighted edges, or a
//! bare edge list), computes a spatial layout via iterative force
//! simulation, partitions the graph into communities, and derives
//! per-entity visual attributes (position, size, color) for downstream
//! rendering. The pipeline is a pure data transformation: it knows nothing
//! about rendering surfaces, input devices or scenes.
//!
//! # Architecture
//!
//! - `graph`: mutable directed multigraph over petgraph's StableGraph,
//!   keyed by stable input ids, insertion-ordered iteration
//! - `scale`: range normalization of raw sizes/weights into `[1.0, 5.0]`
//! - `ingest`: JSON document -> [`GraphStore`], shape resolved at parse time
//! - `layout`: 3-D force simulation and multi-level Louvain clustering
//! - `palette` / `assign`: deterministic cluster colors and finalized
//!   per-node / per-link records
//! - `pipeline`: the per-run context wiring the stages together
//!
//! # Example
//!
//! ```
//! use orrery::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig { steps: 100, ..Default::default() });
//! let output = pipeline
//!     .run_json(r#"[{"source": "A", "target": "B"}]"#)
//!     .unwrap();
//! assert_eq!(output.nodes.len(), 2);
//! ```

pub mod assign;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod layout;
pub mod palette;
pub mod pipeline;
pub mod scale;

pub use assign::{LinkRecord, NodeRecord};
pub use error::{GraphError, Result};
pub use graph::{GraphStore, LinkAttrs, NodeAttrs, NodeKey};
pub use ingest::GraphInput;
pub use layout::{ClusterAssignment, ForceConfig, ForceLayout, LouvainConfig, Point3};
pub use palette::ColorPalette;
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput, LAYOUT_STEPS};
