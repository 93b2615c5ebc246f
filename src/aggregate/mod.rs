//! # Replicate Aggregation
//!
//! Folds replicate measurements into per-peptide summaries in two steps:
//!
//! ```text
//!  Measurement rows
//!        │  group by (protein, sequence, start, end, exposure, state)
//!        ▼
//!  ReplicateSummary      intensity-weighted mean/variance of corrected mass
//!        │  group by (protein, sequence, start, end, state)
//!        ▼
//!  FractionalUptake      uptake against the exposure 0 row, scaled by MaxUptake
//! ```
//!
//! Groups are keyed through ordered maps, so output order depends only on the
//! keys and never on input row order.

mod error;


pub use error::AggregateError;

use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::exposure::Exposure;
use crate::ingest::Measurement;
use crate::uptake::{corrected_mass, fractional_uptake, uptake};

/// Intensity-weighted summary of the replicates of one peptide at one
/// exposure and state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicateSummary {
    /// Protein identifier
    pub protein: String,
    /// Peptide sequence
    pub sequence: String,
    /// First residue
    pub start: u32,
    /// Last residue
    pub end: u32,
    /// Normalized exposure
    pub exposure: Exposure,
    /// Experimental state
    pub state: String,
    /// Maximum exchangeable hydrogens of the peptide
    pub max_uptake: f64,
    /// Weighted mean of the corrected mass
    pub mass_mean: f64,
    /// Weighted (population) variance of the corrected mass
    pub mass_variance: f64,
    /// Number of replicate measurements folded into this summary
    pub count: u64,
}

/// Uptake summary of one peptide at one exposure and state, relative to the
/// exposure 0 reference of the same peptide and state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FractionalUptake {
    /// Protein identifier
    pub protein: String,
    /// Peptide sequence
    pub sequence: String,
    /// First residue
    pub start: u32,
    /// Last residue
    pub end: u32,
    /// Normalized exposure
    pub exposure: Exposure,
    /// Experimental state
    pub state: String,
    /// Number of replicates
    pub count: u64,
    /// Absolute uptake mean (Da)
    pub abs_uptake_mean: f64,
    /// Absolute uptake variance
    pub abs_uptake_variance: f64,
    /// Fractional uptake mean
    pub rel_uptake_mean: f64,
    /// Fractional uptake variance
    pub rel_uptake_variance: f64,
}

impl FractionalUptake {
    /// Whether this peptide covers `position`.
    ///
    /// The N-terminal residue is excluded (`start < position <= end`) because its
    /// label is lost to back-exchange.
    #[inline]
    pub fn covers(&self, position: u32) -> bool {
        self.start < position && position <= self.end
    }
}

/// Weighted mean and population variance of `(value, weight)` pairs.
///
/// Returns NaN for both when the weights sum to zero.
pub fn weighted_mean_variance(pairs: &[(f64, f64)]) -> (f64, f64) {
    let total_weight: f64 = pairs.iter().map(|(_, w)| w).sum();
    let mean = pairs.iter().map(|(x, w)| w * x).sum::<f64>() / total_weight;
    let variance = pairs
        .iter()
        .map(|(x, w)| w * (x - mean).powi(2))
        .sum::<f64>()
        / total_weight;
    (mean, variance)
}

/// Summarize one replicate group.
///
/// All rows are expected to share protein, sequence, bounds, exposure and state;
/// identity fields are taken from the first row.
pub fn summarize(
    rows: &[&Measurement],
    exposure_decimals: u32,
) -> Result<ReplicateSummary, AggregateError> {
    let first = rows.first().ok_or(AggregateError::EmptyGroup)?;

    let pairs: Vec<(f64, f64)> = rows
        .iter()
        .map(|m| (corrected_mass(m.charge, m.center), m.intensity))
        .collect();
    let (mass_mean, mass_variance) = weighted_mean_variance(&pairs);

    Ok(ReplicateSummary {
        protein: first.protein.clone(),
        sequence: first.sequence.clone(),
        start: first.start,
        end: first.end,
        exposure: Exposure::new(first.exposure, exposure_decimals),
        state: first.state.clone(),
        max_uptake: first.max_uptake,
        mass_mean,
        mass_variance,
        count: rows.len() as u64,
    })
}

type ReplicateKey<'a> = (&'a str, &'a str, u32, u32, Exposure, &'a str);
type PeptideStateKey<'a> = (&'a str, &'a str, u32, u32, &'a str);

/// Group measurements by (protein, sequence, start, end, exposure, state) and
/// summarize each group.
pub fn summarize_replicates(
    measurements: &[Measurement],
    exposure_decimals: u32,
) -> Result<Vec<ReplicateSummary>, AggregateError> {
    let mut groups: BTreeMap<ReplicateKey<'_>, Vec<&Measurement>> = BTreeMap::new();
    for m in measurements {
        let key = (
            m.protein.as_str(),
            m.sequence.as_str(),
            m.start,
            m.end,
            Exposure::new(m.exposure, exposure_decimals),
            m.state.as_str(),
        );
        groups.entry(key).or_default().push(m);
    }

    debug!(
        "Summarizing {} measurements into {} replicate groups",
        measurements.len(),
        groups.len()
    );

    groups
        .values()
        .map(|rows| summarize(rows, exposure_decimals))
        .collect()
}

/// Compute uptake for one (protein, sequence, start, end, state) group against
/// its exposure 0 row.
pub fn to_fractional(group: &[&ReplicateSummary]) -> Result<Vec<FractionalUptake>, AggregateError> {
    let first = group.first().ok_or(AggregateError::EmptyGroup)?;
    let reference = group
        .iter()
        .find(|s| s.exposure.is_reference())
        .ok_or_else(|| AggregateError::MissingReference {
            protein: first.protein.clone(),
            sequence: first.sequence.clone(),
            start: first.start,
            end: first.end,
            state: first.state.clone(),
        })?;

    let rows = group
        .iter()
        .map(|s| {
            let abs_uptake_mean = uptake(s.mass_mean, reference.mass_mean);
            let abs_uptake_variance = s.mass_variance + reference.mass_variance;
            FractionalUptake {
                protein: s.protein.clone(),
                sequence: s.sequence.clone(),
                start: s.start,
                end: s.end,
                exposure: s.exposure,
                state: s.state.clone(),
                count: s.count,
                abs_uptake_mean,
                abs_uptake_variance,
                rel_uptake_mean: fractional_uptake(abs_uptake_mean, s.max_uptake),
                rel_uptake_variance: fractional_uptake(abs_uptake_variance, s.max_uptake.powi(2)),
            }
        })
        .collect();

    Ok(rows)
}

/// Convert every replicate summary into fractional uptake.
///
/// Fails on the first peptide/state group that lacks an exposure 0 row.
pub fn fractional_uptake_table(
    summaries: &[ReplicateSummary],
) -> Result<Vec<FractionalUptake>, AggregateError> {
    let mut groups: BTreeMap<PeptideStateKey<'_>, Vec<&ReplicateSummary>> = BTreeMap::new();
    for s in summaries {
        let key = (
            s.protein.as_str(),
            s.sequence.as_str(),
            s.start,
            s.end,
            s.state.as_str(),
        );
        groups.entry(key).or_default().push(s);
    }

    let mut table = Vec::with_capacity(summaries.len());
    for group in groups.values() {
        table.extend(to_fractional(group)?);
    }
    Ok(table)
}
