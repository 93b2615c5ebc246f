//! # hdxstat - Residue-Level Statistics for HDX-MS Experiments
//!
//! `hdxstat` turns replicate peptide measurements from a hydrogen/deuterium
//! exchange mass-spectrometry (HDX-MS) experiment into per-residue uptake
//! estimates, and tests at every residue whether experimental states differ.
//!
//! ## Key Features
//!
//! - **Intensity-Weighted Replicates**: Replicate centroids are folded into
//!   weighted mean/variance summaries per peptide, exposure and state.
//!
//! - **Residue Resolution**: Overlapping peptides are pooled into combined
//!   statistics for every position they cover (N-terminal residue excluded).
//!
//! - **Significance Testing**: One-way ANOVA across states, followed by Tukey
//!   post-hoc comparisons when the ANOVA is significant.
//!
//! - **Parallel Positions**: Positions of a protein are evaluated on a rayon
//!   worker pool with deterministic, position-ordered output.
//!
//! - **Chart-Ready Cache**: Every (protein, exposure, view) slice is precomputed
//!   with its y-axis bounds.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hdxstat::ingest;
//! use hdxstat::pipeline;
//! use hdxstat::runner::LogSink;
//!
//! let rows = ingest::read_csv("cluster.csv")?;
//! let result = pipeline::run(&rows, &mut LogSink)?;
//!
//! let (states, exposures, proteins) = result.list_states_exposures_proteins();
//! let view = result.get_dataset(&proteins[0], exposures[0], Some(&states[0]))?;
//! for row in &view.data {
//!     println!("{} {} {:.3} p={:?}", row.position, row.state, row.mean, row.p_value);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Measurement ─▶ uptake ─▶ aggregate ─▶ position (stats) ─▶ dataset
//!                                            ▲
//!                                         runner (rayon pool, progress relay)
//! ```
//!
//! - [`ingest`]: cluster CSV ingestion and record contract validation
//! - [`uptake`]: charge-state correction and uptake arithmetic
//! - [`aggregate`]: replicate summaries and fractional uptake
//! - [`stats`]: pooling, ANOVA, Tukey and the distributions behind them
//! - [`position`]: per-position statistics engine
//! - [`runner`]: parallel per-protein runner, progress and cancellation
//! - [`dataset`]: keyed view cache
//! - [`pipeline`]: orchestration, configuration and CSV export
//!
//! ## Input Format
//!
//! | Column | Type | Description |
//! |--------|------|-------------|
//! | Protein | string | Protein identifier |
//! | Sequence | string | Peptide sequence |
//! | Start, End | integer | Peptide span, `Start < End` |
//! | Exposure | real | Exchange time in seconds, 0 = reference |
//! | State | string | Experimental condition |
//! | z | integer | Charge state |
//! | Center | real | Centroid m/z |
//! | Inten | real | Intensity (replicate weight) |
//! | MaxUptake | real | Maximum exchangeable hydrogens |
//! | MHP | real | Protonated monoisotopic mass |

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
// Allow some patterns common in scientific code
#![allow(clippy::too_many_arguments)]

pub mod aggregate;
pub mod dataset;
pub mod exposure;
pub mod ingest;
pub mod pipeline;
pub mod position;
pub mod runner;
pub mod stats;
pub mod uptake;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::aggregate::{AggregateError, FractionalUptake, ReplicateSummary};
    pub use crate::dataset::{Dataset, DatasetError, DatasetKey, DatasetView, ViewRow, ViewSelector};
    pub use crate::exposure::Exposure;
    pub use crate::ingest::{IngestError, Measurement};
    pub use crate::pipeline::{
        Pipeline, PipelineConfig, PipelineError, PipelineResult, RunDiagnostics,
    };
    pub use crate::position::{PositionEngine, PositionStat};
    pub use crate::runner::{
        CancellationToken, LogSink, NoopSink, ParallelPositionRunner, ProgressSink, SinkResult,
    };
}
