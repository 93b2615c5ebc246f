/// Errors that can occur during dataset lookups
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// No view exists for the requested combination
    #[error("No dataset for protein {protein}, exposure {exposure}, view {view}")]
    NotFound {
        /// Requested protein
        protein: String,
        /// Requested exposure after normalization
        exposure: String,
        /// Requested view (`no_ref` or the baseline state)
        view: String,
    },
}
