//! Range normalization: linear rescaling of observed magnitudes.
//!
//! Ingestion scans the raw node sizes and edge weights of a document and
//! maps them into the fixed display range `[1.0, 5.0]`. The scan is a
//! single min/max pass; absent samples contribute nothing, but zero is a
//! valid sample and participates in the range.

use crate::error::{GraphError, Result};

/// Observed `{min, max}` of a numeric attribute across a collection.
///
/// Build one with [`SampleRange::from_samples`] (or feed values through
/// [`observe`](SampleRange::observe)), then map values into a target
/// interval with [`scale`](SampleRange::scale).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleRange {
    min: Option<f64>,
    max: Option<f64>,
}

impl SampleRange {
    /// An empty range with no observations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan an iterator of optional samples in one pass.
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut range = Self::new();
        for sample in samples.into_iter().flatten() {
            range.observe(sample);
        }
        range
    }

    /// Record one sample. Non-finite values are ignored; they would poison
    /// every scaled output.
    pub fn observe(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// The observed minimum, if any sample was seen.
    #[inline]
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// The observed maximum, if any sample was seen.
    #[inline]
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Whether the range is degenerate: empty, or collapsed to a single
    /// value (`max == min`).
    pub fn is_degenerate(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min == max,
            _ => true,
        }
    }

    /// Linearly map `value` from the observed range into
    /// `[target_min, target_max]`.
    ///
    /// A degenerate range would divide by zero; instead of propagating a
    /// non-finite value, this returns the midpoint of the target range, so
    /// a data set where every sample is equal still gets a sensible
    /// mid-sized visual.
    pub fn scale(&self, value: f64, target_min: f64, target_max: f64) -> f64 {
        match self.try_scale(value, target_min, target_max) {
            Ok(scaled) => scaled,
            Err(_) => (target_min + target_max) / 2.0,
        }
    }

    /// Strict variant of [`scale`](SampleRange::scale): a degenerate range
    /// is an error instead of a fallback.
    pub fn try_scale(&self, value: f64, target_min: f64, target_max: f64) -> Result<f64> {
        let (Some(min), Some(max)) = (self.min, self.max) else {
            return Err(GraphError::DegenerateRange(f64::NAN));
        };
        if min == max {
            return Err(GraphError::DegenerateRange(min));
        }
        Ok((target_max - target_min) * (value - min) / (max - min) + target_min)
    }
}
