use crate::aggregate::AggregateError;
use crate::dataset::DatasetError;
use crate::ingest::IngestError;
use crate::runner::RunnerError;

/// Errors that terminate a pipeline run or its export
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No measurements were supplied
    #[error("No measurements supplied")]
    EmptyInput,

    /// Input rows violate the record contract
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Replicate aggregation failed (e.g. missing exposure 0 reference)
    #[error("Aggregation error: {0}")]
    Aggregate(#[from] AggregateError),

    /// The worker pool could not be created
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The cancellation token fired
    #[error("Pipeline cancelled: {0}")]
    Cancelled(String),

    /// Dataset lookup failed
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// I/O error while exporting results
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV error while exporting results
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl From<RunnerError> for PipelineError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::ThreadPool(e) => PipelineError::ThreadPool(e),
            cancelled @ RunnerError::Cancelled { .. } => {
                PipelineError::Cancelled(cancelled.to_string())
            }
        }
    }
}
