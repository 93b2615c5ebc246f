//! # Parallel Position Runner
//!
//! Fans the per-position work of one protein out over a rayon thread pool.
//!
//! ```text
//! positions 1..=max ──chunks(batch_size)──▶ ┌──────────────┐
//!                      (cancel check)       │ rayon pool   │──▶ PositionOutcome
//!                                           │ N workers    │       │
//!                                           └──────────────┘       │
//!                          progress every `progress_interval` ◀────┘
//!                                                                  ▼
//!                                              gather ─▶ sort by position ─▶ rows
//! ```
//!
//! Workers share nothing mutable except an atomic completion counter used for
//! progress. Results are merged by the calling thread only after a batch has
//! fully drained.

mod cancel;
mod progress;


pub use cancel::CancellationToken;
pub use progress::{
    progress_channel, relay, relay_until, LogSink, NoopSink, ProgressEvent, ProgressSender,
    ProgressSink, RelayStats, SinkError, SinkResult,
};

use log::debug;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::aggregate::FractionalUptake;
use crate::position::{PositionEngine, PositionOutcome, PositionStat};

/// Lower bound on the number of positions between two progress events.
pub const MIN_PROGRESS_INTERVAL: usize = 10;

/// Errors raised by the runner
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The worker pool could not be created
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The run was cancelled between position batches
    #[error("Cancelled while processing {protein} after {completed}/{total} positions")]
    Cancelled {
        /// Protein being processed
        protein: String,
        /// Positions completed before cancellation
        completed: usize,
        /// Positions scheduled for the protein
        total: usize,
    },
}

/// Configuration for [`ParallelPositionRunner`].
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Number of worker threads (defaults to available parallelism)
    pub num_workers: usize,
    /// Completed positions between two progress events (clamped to at least 10)
    pub progress_interval: usize,
    /// Positions dispatched between two cancellation checks
    pub batch_size: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            num_workers: std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4),
            progress_interval: MIN_PROGRESS_INTERVAL,
            batch_size: 256,
        }
    }
}

/// Rows and diagnostics for one protein.
#[derive(Debug, Clone, Default)]
pub struct ProteinOutcome {
    /// Position rows in ascending position order
    pub rows: Vec<PositionStat>,
    /// Positions evaluated
    pub positions_evaluated: usize,
    /// Positions covered by at least one peptide
    pub positions_covered: usize,
    /// Tukey cells left at their default
    pub undefined_tukey_cells: usize,
}

/// Runs the position engine over every position of a protein in parallel.
pub struct ParallelPositionRunner {
    engine: PositionEngine,
    pool: rayon::ThreadPool,
    progress_interval: usize,
    batch_size: usize,
}

impl ParallelPositionRunner {
    /// Create a runner with its own worker pool.
    pub fn new(engine: PositionEngine, config: &RunnerConfig) -> Result<Self, RunnerError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_workers.max(1))
            .thread_name(|i| format!("hdxstat-position-{i}"))
            .build()?;

        Ok(Self {
            engine,
            pool,
            progress_interval: config.progress_interval.max(MIN_PROGRESS_INTERVAL),
            batch_size: config.batch_size.max(1),
        })
    }

    /// Number of worker threads.
    pub fn num_workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Compute all position rows of one protein.
    ///
    /// `peptides` must all belong to `protein`. Emits `(protein, "0/<max>")`
    /// before dispatch and `(protein, "<done>/<max>")` every
    /// `progress_interval` completed positions and at completion.
    pub fn process_protein(
        &self,
        protein: &str,
        peptides: &[FractionalUptake],
        progress: &ProgressSender,
        cancel: &CancellationToken,
    ) -> Result<ProteinOutcome, RunnerError> {
        let max_position = PositionEngine::max_position(peptides);
        let total = max_position as usize;
        progress.emit(protein, format!("0/{total}"));

        let positions: Vec<u32> = (1..=max_position).collect();
        let completed = AtomicUsize::new(0);
        let mut gathered: Vec<PositionOutcome> = Vec::with_capacity(positions.len());

        for batch in positions.chunks(self.batch_size) {
            if cancel.is_cancelled() {
                return Err(RunnerError::Cancelled {
                    protein: protein.to_string(),
                    completed: completed.load(Ordering::SeqCst),
                    total,
                });
            }

            let outcomes: Vec<PositionOutcome> = self.pool.install(|| {
                batch
                    .par_iter()
                    .map(|&position| {
                        let outcome = self.engine.compute_position(protein, position, peptides);
                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                        if done % self.progress_interval == 0 || done == total {
                            progress.emit(protein, format!("{done}/{total}"));
                        }
                        outcome
                    })
                    .collect()
            });
            gathered.extend(outcomes);
        }

        // single-writer merge in position order
        gathered.sort_by_key(|o| o.position);

        let mut result = ProteinOutcome {
            positions_evaluated: gathered.len(),
            ..Default::default()
        };
        for outcome in gathered {
            if !outcome.rows.is_empty() {
                result.positions_covered += 1;
            }
            result.undefined_tukey_cells += outcome.undefined_tukey_cells;
            result.rows.extend(outcome.rows);
        }

        debug!(
            "{}: {} of {} positions covered, {} rows",
            protein,
            result.positions_covered,
            result.positions_evaluated,
            result.rows.len()
        );

        Ok(result)
    }
}
