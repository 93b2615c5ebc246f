//! # Position Statistics Engine
//!
//! Turns peptide-level fractional uptake into residue-level statistics. For one
//! position of one protein:
//!
//! 1. select the peptides with `start < position <= end`
//! 2. pool them per (exposure, state) into a combined mean/variance/count
//! 3. run a one-way ANOVA across the states of each exposure
//! 4. run Tukey post-hoc tests when the ANOVA is significant
//!
//! Positions never depend on each other, which is what lets
//! [`crate::runner::ParallelPositionRunner`] fan them out across a worker pool.

#[cfg(test)]
mod tests;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregate::FractionalUptake;
use crate::exposure::Exposure;
use crate::stats::{one_way_anova, pool, tukey_hsd, GroupStats, TukeyOutcome};

/// Default ANOVA significance level gating the Tukey post-hoc test.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Pooled statistics of one state at one (protein, position, exposure).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionStat {
    /// Protein identifier
    pub protein: String,
    /// Residue position
    pub position: u32,
    /// Normalized exposure
    pub exposure: Exposure,
    /// Experimental state
    pub state: String,
    /// Pooled fractional uptake mean
    pub combined_mean: f64,
    /// Pooled fractional uptake variance
    pub combined_variance: f64,
    /// Total replicate count over all covering peptides
    pub combined_count: u64,
    /// ANOVA p-value shared by all states at this position and exposure
    pub anova_p: f64,
    /// This state's row of the Tukey matrix, keyed by the compared state.
    /// Contains every state at this position and exposure, itself included.
    pub tukey: BTreeMap<String, f64>,
}

impl PositionStat {
    /// Tukey p-value of this state against `other`, if `other` was measured here.
    pub fn tukey_p(&self, other: &str) -> Option<f64> {
        self.tukey.get(other).copied()
    }
}

/// All rows produced for one position, plus diagnostics.
#[derive(Debug, Clone, Default)]
pub struct PositionOutcome {
    /// Residue position
    pub position: u32,
    /// One row per (exposure, state); empty when no peptide covers the position
    pub rows: Vec<PositionStat>,
    /// Tukey cells left at their default because the distribution was undefined
    pub undefined_tukey_cells: usize,
}

/// Computes [`PositionStat`] rows for individual positions.
#[derive(Debug, Clone, Copy)]
pub struct PositionEngine {
    significance_level: f64,
    include_reference_exposure: bool,
}

impl Default for PositionEngine {
    fn default() -> Self {
        Self {
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            include_reference_exposure: false,
        }
    }
}

impl PositionEngine {
    /// Create an engine with the default significance level, excluding the
    /// exposure 0 reference from position statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ANOVA significance level gating the Tukey test.
    pub fn with_significance_level(mut self, alpha: f64) -> Self {
        self.significance_level = alpha;
        self
    }

    /// Include or exclude exposure 0 rows from position statistics.
    pub fn with_reference_exposure(mut self, include: bool) -> Self {
        self.include_reference_exposure = include;
        self
    }

    /// ANOVA significance level.
    pub fn significance_level(&self) -> f64 {
        self.significance_level
    }

    /// Whether exposure 0 rows take part in position statistics.
    pub fn includes_reference_exposure(&self) -> bool {
        self.include_reference_exposure
    }

    /// Last position to evaluate for a protein: the largest peptide end.
    pub fn max_position(peptides: &[FractionalUptake]) -> u32 {
        peptides.iter().map(|p| p.end).max().unwrap_or(0)
    }

    /// Compute every (exposure, state) row for `position`.
    ///
    /// `peptides` are the fractional uptake rows of a single protein.
    pub fn compute_position(
        &self,
        protein: &str,
        position: u32,
        peptides: &[FractionalUptake],
    ) -> PositionOutcome {
        // exposure -> state -> peptide summaries
        let mut by_exposure: BTreeMap<Exposure, BTreeMap<&str, Vec<GroupStats>>> = BTreeMap::new();
        for peptide in peptides.iter().filter(|p| p.covers(position)) {
            if peptide.exposure.is_reference() && !self.include_reference_exposure {
                continue;
            }
            by_exposure
                .entry(peptide.exposure)
                .or_default()
                .entry(peptide.state.as_str())
                .or_default()
                .push(GroupStats::new(
                    peptide.count,
                    peptide.rel_uptake_mean,
                    peptide.rel_uptake_variance,
                ));
        }

        let mut outcome = PositionOutcome {
            position,
            ..Default::default()
        };

        for (exposure, states) in by_exposure {
            let combined: Vec<(&str, GroupStats)> = states
                .iter()
                .filter_map(|(state, groups)| pool(groups).map(|g| (*state, g)))
                .collect();
            let summaries: Vec<GroupStats> = combined.iter().map(|(_, g)| *g).collect();

            let anova = one_way_anova(&summaries);
            let tukey = if anova.p_value < self.significance_level {
                tukey_hsd(&summaries, anova.ms_within)
            } else {
                TukeyOutcome::ones(summaries.len())
            };
            outcome.undefined_tukey_cells += tukey.undefined_cells;

            for (i, (state, stats)) in combined.iter().enumerate() {
                let row = combined
                    .iter()
                    .enumerate()
                    .map(|(j, (other, _))| (other.to_string(), tukey.get(i, j)))
                    .collect();

                outcome.rows.push(PositionStat {
                    protein: protein.to_string(),
                    position,
                    exposure,
                    state: state.to_string(),
                    combined_mean: stats.mean,
                    combined_variance: stats.variance,
                    combined_count: stats.count,
                    anova_p: anova.p_value,
                    tukey: row,
                });
            }
        }

        outcome
    }
}
