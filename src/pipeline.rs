//! The end-to-end pipeline: one run, one context, no globals.
//!
//! A [`Pipeline`] owns the configuration for a single run and threads an
//! explicit context through the stages (ingest, force layout, community
//! detection, attribute assignment) strictly in that order, single
//! threaded, with no retries. An ingestion error aborts the whole run; no
//! partial graph ever reaches layout. Multiple pipelines can run
//! independently, each over its own store.

use serde::Serialize;
use tracing::info;

use crate::assign::{self, LinkRecord, NodeRecord};
use crate::error::Result;
use crate::graph::GraphStore;
use crate::ingest::GraphInput;
use crate::layout::{self, ForceConfig, ForceLayout, LouvainConfig};
use crate::palette::ColorPalette;

/// Number of simulation steps per run. Fixed rather than
/// convergence-detected: enough for the layout to settle into a visually
/// stable configuration.
pub const LAYOUT_STEPS: u32 = 1000;

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Force simulation parameters.
    pub force: ForceConfig,
    /// Number of simulation steps (default: [`LAYOUT_STEPS`]).
    pub steps: u32,
    /// Community detection parameters.
    pub louvain: LouvainConfig,
    /// Cluster color palette.
    pub palette: ColorPalette,
}

impl Default for PipelineConfig {
    /// The standard tuning: a near-zero spring rest length so connectivity
    /// spacing is dominated by repulsion, with a stiff spring coefficient.
    fn default() -> Self {
        Self {
            force: ForceConfig {
                spring_length: 1e-5,
                spring_coefficient: 1.6,
                ..Default::default()
            },
            steps: LAYOUT_STEPS,
            louvain: LouvainConfig::default(),
            palette: ColorPalette::default(),
        }
    }
}

/// Everything the presentation layer needs: finalized records plus
/// partition metadata.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// Finalized node records, in insertion order.
    pub nodes: Vec<NodeRecord>,
    /// Finalized link records, in insertion order.
    pub links: Vec<LinkRecord>,
    /// Number of distinct clusters.
    pub cluster_count: u32,
    /// Modularity of the kept partition.
    pub modularity: f64,
}

/// A single-run pipeline context.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with explicit configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The pipeline's configuration.
    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline over a parsed input document.
    pub fn run(&self, input: GraphInput) -> Result<PipelineOutput> {
        let store = input.build()?;
        info!(
            nodes = store.node_count(),
            links = store.link_count(),
            "graph ingested"
        );
        self.run_store(&store)
    }

    /// Run the full pipeline over JSON text.
    pub fn run_json(&self, text: &str) -> Result<PipelineOutput> {
        self.run(GraphInput::from_json(text)?)
    }

    /// Run the layout, clustering and assignment stages over an already
    /// ingested store.
    pub fn run_store(&self, store: &GraphStore) -> Result<PipelineOutput> {
        let mut force = ForceLayout::new(store, self.config.force);
        force.run(self.config.steps)?;
        info!(steps = self.config.steps, "force layout converged");

        let clusters = layout::community::detect(store, &self.config.louvain);
        info!(
            clusters = clusters.cluster_count(),
            modularity = clusters.modularity(),
            "communities detected"
        );

        let (nodes, links) = assign::assign(store, &force, &clusters, self.config.palette.clone())?;
        Ok(PipelineOutput {
            nodes,
            links,
            cluster_count: clusters.cluster_count(),
            modularity: clusters.modularity(),
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
