use std::fmt;

/// Counts describing a built dataset cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetStats {
    /// Number of `no_ref` views
    pub plain_views: usize,

    /// Number of reference-relative views
    pub reference_views: usize,

    /// Rows dropped from reference views because the baseline was absent
    pub dropped_reference_rows: usize,

    /// Number of proteins with at least one view
    pub proteins: usize,
}

impl fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dataset: {} proteins, {} no_ref views, {} reference views, {} rows without baseline",
            self.proteins, self.plain_views, self.reference_views, self.dropped_reference_rows
        )
    }
}
