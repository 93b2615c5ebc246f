//! # Analysis Pipeline
//!
//! Runs every stage over a batch of measurements and packages the results.
//!
//! ```text
//! Measurements ──▶ summarize_replicates ──▶ fractional_uptake_table
//!                                                    │
//!                              per protein, in input order
//!                                                    ▼
//!                  ParallelPositionRunner (rayon) ──▶ position table ──▶ Dataset
//!                           │
//!                           └─ progress ──▶ relay thread ──▶ ProgressSink
//! ```
//!
//! Stages are strictly sequential. A run ends in either one terminal
//! [`PipelineError`] or a complete [`PipelineResult`]; no partial results are
//! returned.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hdxstat::ingest;
//! use hdxstat::pipeline::{Pipeline, PipelineConfig};
//! use hdxstat::runner::LogSink;
//!
//! let rows = ingest::read_csv("cluster.csv")?;
//! let result = Pipeline::new(PipelineConfig::default()).run(&rows, &mut LogSink)?;
//!
//! let view = result.get_dataset("P1", 30.0, Some("apo"))?;
//! println!("{} points, bounds {:?}", view.data.len(), view.min_max);
//! result.write_csv("positions.csv")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod diagnostics;
mod error;
mod export;


pub use config::PipelineConfig;
pub use diagnostics::RunDiagnostics;
pub use error::PipelineError;

use log::{debug, info};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::aggregate::{fractional_uptake_table, summarize_replicates, FractionalUptake};
use crate::dataset::{Dataset, DatasetError, DatasetView};
use crate::exposure::Exposure;
use crate::ingest::{validate_all, Measurement};
use crate::position::PositionStat;
use crate::runner::{
    progress_channel, relay_until, CancellationToken, ParallelPositionRunner, ProgressSink,
};

/// Configured pipeline, reusable across runs.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    cancel: CancellationToken,
}

impl Pipeline {
    /// Create a pipeline with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that cancels this pipeline's runs.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage over `rows`, reporting progress to `sink`.
    ///
    /// The sink is driven from a dedicated relay thread; its errors and panics
    /// are counted in [`RunDiagnostics::progress_failures`] and never fail the
    /// run. Events the sink has not consumed by the time the positions are
    /// computed are dropped and counted in [`RunDiagnostics::progress_discarded`],
    /// so a slow sink delays the result by at most one in-flight call.
    pub fn run<S>(
        &self,
        rows: &[Measurement],
        sink: &mut S,
    ) -> Result<PipelineResult, PipelineError>
    where
        S: ProgressSink + Send + ?Sized,
    {
        let start = Instant::now();
        if rows.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        validate_all(rows)?;

        let decimals = self.config.exposure_decimals;
        info!("Aggregating {} measurements", rows.len());
        let summaries = summarize_replicates(rows, decimals)?;
        let peptides = fractional_uptake_table(&summaries)?;
        info!(
            "{} replicate groups, {} peptide rows",
            summaries.len(),
            peptides.len()
        );

        let (states, exposures, proteins) = self.listing(rows);
        let runner = ParallelPositionRunner::new(self.config.engine(), &self.config.runner())?;
        info!(
            "Computing position statistics for {} proteins on {} workers",
            proteins.len(),
            runner.num_workers()
        );

        let (sender, receiver) = progress_channel(self.config.progress_capacity);
        let stop = AtomicBool::new(false);
        let stop_relay = &stop;

        let (outcome, relay_stats) = std::thread::scope(|scope| {
            let relay_handle = scope.spawn(move || relay_until(receiver, sink, stop_relay));

            let outcome = (|| -> Result<ProteinTable, PipelineError> {
                let mut table = ProteinTable::default();
                for protein in &proteins {
                    if self.cancel.is_cancelled() {
                        return Err(PipelineError::Cancelled(format!(
                            "before protein {protein}"
                        )));
                    }
                    let protein_peptides: Vec<FractionalUptake> = peptides
                        .iter()
                        .filter(|p| &p.protein == protein)
                        .cloned()
                        .collect();
                    debug!(
                        "Processing {} ({} peptide rows)",
                        protein,
                        protein_peptides.len()
                    );
                    let result =
                        runner.process_protein(protein, &protein_peptides, &sender, &self.cancel)?;
                    table.positions_evaluated += result.positions_evaluated;
                    table.positions_covered += result.positions_covered;
                    table.undefined_tukey_cells += result.undefined_tukey_cells;
                    table.rows.extend(result.rows);
                }
                Ok(table)
            })();

            // the backlog is discarded, not drained
            stop.store(true, Ordering::Release);
            drop(sender);
            let relay_stats = relay_handle.join().unwrap_or_default();
            (outcome, relay_stats)
        });
        let table = outcome?;

        let dataset = Dataset::build(&table.rows, decimals);

        let diagnostics = RunDiagnostics {
            measurements: rows.len(),
            replicate_groups: summaries.len(),
            peptide_rows: peptides.len(),
            proteins: proteins.len(),
            positions_evaluated: table.positions_evaluated,
            positions_covered: table.positions_covered,
            position_rows: table.rows.len(),
            undefined_tukey_cells: table.undefined_tukey_cells,
            progress_delivered: relay_stats.delivered,
            progress_failures: relay_stats.failures,
            progress_discarded: relay_stats.discarded,
            elapsed_seconds: start.elapsed().as_secs_f64(),
        };
        info!(
            "Position table: {} rows over {} positions in {:.2}s",
            diagnostics.position_rows, diagnostics.positions_covered, diagnostics.elapsed_seconds
        );

        Ok(PipelineResult {
            positions: table.rows,
            peptides,
            dataset,
            states,
            exposures,
            proteins,
            diagnostics,
        })
    }

    /// Unique states, exposures and proteins in first-seen input order.
    fn listing(&self, rows: &[Measurement]) -> (Vec<String>, Vec<Exposure>, Vec<String>) {
        let decimals = self.config.exposure_decimals;
        let mut states = FirstSeen::default();
        let mut exposures = FirstSeen::default();
        let mut proteins = FirstSeen::default();

        for row in rows {
            states.push(row.state.clone());
            proteins.push(row.protein.clone());
            let exposure = Exposure::new(row.exposure, decimals);
            if !exposure.is_reference() || self.config.include_reference_exposure {
                exposures.push(exposure);
            }
        }

        (states.items, exposures.items, proteins.items)
    }
}

/// Run the pipeline with the default configuration.
pub fn run<S>(rows: &[Measurement], sink: &mut S) -> Result<PipelineResult, PipelineError>
where
    S: ProgressSink + Send + ?Sized,
{
    Pipeline::default().run(rows, sink)
}

#[derive(Default)]
struct ProteinTable {
    rows: Vec<PositionStat>,
    positions_evaluated: usize,
    positions_covered: usize,
    undefined_tukey_cells: usize,
}

struct FirstSeen<T> {
    seen: HashSet<T>,
    items: Vec<T>,
}

impl<T> Default for FirstSeen<T> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }
}

impl<T: Clone + Eq + std::hash::Hash> FirstSeen<T> {
    fn push(&mut self, item: T) {
        if self.seen.insert(item.clone()) {
            self.items.push(item);
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    positions: Vec<PositionStat>,
    peptides: Vec<FractionalUptake>,
    dataset: Dataset,
    states: Vec<String>,
    exposures: Vec<Exposure>,
    proteins: Vec<String>,
    diagnostics: RunDiagnostics,
}

impl PipelineResult {
    /// Position table, grouped by protein in input order, then by position.
    pub fn positions(&self) -> &[PositionStat] {
        &self.positions
    }

    /// Peptide-level fractional uptake rows.
    pub fn peptides(&self) -> &[FractionalUptake] {
        &self.peptides
    }

    /// Dataset cache.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Run counters.
    pub fn diagnostics(&self) -> &RunDiagnostics {
        &self.diagnostics
    }

    /// Unique states, exposures (seconds) and proteins in first-seen input order.
    ///
    /// Exposure 0 is listed only when it takes part in position statistics.
    pub fn list_states_exposures_proteins(&self) -> (Vec<String>, Vec<f64>, Vec<String>) {
        (
            self.states.clone(),
            self.exposures.iter().map(|e| e.seconds()).collect(),
            self.proteins.clone(),
        )
    }

    /// Look up a cached view; `state == None` selects the `no_ref` view.
    pub fn get_dataset(
        &self,
        protein: &str,
        exposure: f64,
        state: Option<&str>,
    ) -> Result<&DatasetView, DatasetError> {
        self.dataset.get(protein, exposure, state)
    }

    /// Bounds spanning every reference view of `protein`.
    pub fn ref_min_max(&self, protein: &str) -> Option<(f64, f64)> {
        self.dataset.ref_min_max(protein)
    }

    /// Write the position table to a CSV file.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_csv_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the position table as CSV to any writer.
    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<(), PipelineError> {
        export::write_positions(&self.positions, writer)
    }
}
