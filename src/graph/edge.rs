//! Link attributes.
//!
//! Links are directed connections between nodes. A link carries:
//! - `raw_weight`: original numeric magnitude from the input (optional)
//! - `scaled_weight`: the weight linearly mapped into `[1.0, 5.0]` given the
//!   weight range observed across all links at ingestion time
//!
//! Endpoints are not stored here: they live in the graph topology, and a
//! link with a dangling endpoint is rejected at construction.

/// Attributes attached to a directed link.
///
/// Like node sizes, `scaled_weight` is write-once per run: computed by
/// ingestion from the observed weight range, never recomputed downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkAttrs {
    /// Original numeric magnitude from the input.
    pub raw_weight: Option<f64>,
    /// `raw_weight` linearly mapped into `[1.0, 5.0]`.
    pub scaled_weight: Option<f64>,
}

impl LinkAttrs {
    /// Attributes for a link from edge-list input, which carries no weight.
    #[inline]
    pub fn bare() -> Self {
        Self::default()
    }

    /// The simulation weight of this link: the scaled weight when present,
    /// otherwise 1.0. Used by the community detector's weighted adjacency.
    #[inline]
    pub fn effective_weight(&self) -> f64 {
        self.scaled_weight.unwrap_or(1.0)
    }
}
