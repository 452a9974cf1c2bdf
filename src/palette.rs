//! Deterministic cluster color palette.
//!
//! A finite ordered sequence of colors, consumed without replacement in the
//! order clusters are first encountered, one entry per distinct cluster.
//! When more clusters exist than palette entries, assignment wraps around
//! modulo the palette length, so every cluster still gets a stable color
//! (distinct colors are only guaranteed while un-consumed entries remain).

/// Color handed out by an empty palette. A neutral gray keeps rendering
/// sensible instead of panicking on a zero-length sequence.
pub const FALLBACK_COLOR: &str = "#7f7f7f";

/// The categorical 20-color scheme (d3's `schemeCategory20`).
pub const CATEGORY20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728",
    "#ff9896", "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2",
    "#7f7f7f", "#c7c7c7", "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// An ordered color sequence with a take-next cursor.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<String>,
    next: usize,
}

impl ColorPalette {
    /// Build a palette from an explicit color sequence.
    ///
    /// An empty sequence is accepted; such a palette hands out
    /// [`FALLBACK_COLOR`] for every cluster.
    pub fn new<I, S>(colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            colors: colors.into_iter().map(Into::into).collect(),
            next: 0,
        }
    }

    /// Pop the next color, wrapping around when the sequence is exhausted.
    /// An empty palette yields [`FALLBACK_COLOR`].
    pub fn take(&mut self) -> &str {
        if self.colors.is_empty() {
            return FALLBACK_COLOR;
        }
        let color = &self.colors[self.next % self.colors.len()];
        self.next += 1;
        color
    }

    /// Number of distinct colors available.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette holds no colors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// How many colors have been handed out so far.
    #[inline]
    pub fn taken(&self) -> usize {
        self.next
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::new(CATEGORY20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_takes_in_order() {
        let mut palette = ColorPalette::default();
        assert_eq!(palette.take(), "#1f77b4");
        assert_eq!(palette.take(), "#aec7e8");
        assert_eq!(palette.taken(), 2);
    }

    #[test]
    fn test_distinct_while_entries_remain() {
        let mut palette = ColorPalette::default();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..palette.len() {
            assert!(seen.insert(palette.take().to_owned()));
        }
    }

    #[test]
    fn test_wraps_on_exhaustion() {
        let mut palette = ColorPalette::new(["red", "green"]);
        assert_eq!(palette.take(), "red");
        assert_eq!(palette.take(), "green");
        // 3rd distinct consumer wraps back to the start.
        assert_eq!(palette.take(), "red");
    }

    #[test]
    fn test_empty_palette_yields_fallback() {
        let mut palette = ColorPalette::new(Vec::<String>::new());
        assert!(palette.is_empty());
        assert_eq!(palette.take(), FALLBACK_COLOR);
        assert_eq!(palette.take(), FALLBACK_COLOR);
    }

    #[test]
    fn test_custom_scheme() {
        let mut palette = ColorPalette::new(vec![String::from("#000000")]);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.take(), "#000000");
        assert_eq!(palette.take(), "#000000");
    }
}
