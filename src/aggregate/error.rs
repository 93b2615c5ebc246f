/// Errors that can occur while aggregating replicate measurements
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// A peptide/state group has no exposure 0 row to compute uptake against
    #[error(
        "missing exposure 0 reference for {protein} {sequence} ({start}-{end}) in state '{state}'"
    )]
    MissingReference {
        /// Protein identifier
        protein: String,
        /// Peptide sequence
        sequence: String,
        /// First residue
        start: u32,
        /// Last residue
        end: u32,
        /// Experimental state
        state: String,
    },

    /// A replicate group was empty
    #[error("cannot summarize an empty replicate group")]
    EmptyGroup,
}
