//! # Dataset Cache
//!
//! Precomputed, read-only views over the position table so any
//! (protein, exposure, view) slice can be fetched in O(1).
//!
//! ```text
//! Dataset
//! ├── (P1, 30.0, no_ref)     -> { data, min_max = global bounds }
//! ├── (P1, 30.0, "apo")      -> { data relative to "apo", min_max = ref bounds of P1 }
//! ├── (P1, 30.0, "holo")     -> { ... }
//! ├── (P1, 120.0, no_ref)    -> { ... }
//! └── ref_min_max: { P1 -> (lo, hi) }
//! ```
//!
//! Reference views subtract the baseline state's combined mean at the same
//! position and attach the Tukey p-value against the baseline. Rows at positions
//! where the baseline was not measured are dropped.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let dataset = Dataset::build(&position_rows, 2);
//! let view = dataset.get("P1", 30.0, Some("apo"))?;
//! for row in &view.data {
//!     println!("{} {} {:?}", row.position, row.mean, row.p_value);
//! }
//! ```

mod error;
mod stats;
mod types;


pub use error::DatasetError;
pub use stats::DatasetStats;
pub use types::{DatasetKey, DatasetView, ViewRow, ViewSelector};

use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::exposure::Exposure;
use crate::position::PositionStat;

/// Keyed cache of chart-ready views, rebuilt wholesale for every run.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    views: HashMap<DatasetKey, DatasetView>,
    ref_min_max: HashMap<String, (f64, f64)>,
    exposure_decimals: u32,
    stats: DatasetStats,
}

impl Dataset {
    /// Build every view from the position table.
    ///
    /// `exposure_decimals` must match the precision the table was built with;
    /// it is reused to normalize lookups.
    pub fn build(table: &[PositionStat], exposure_decimals: u32) -> Self {
        let global = table
            .iter()
            .fold(None, |acc, row| widen(acc, plain_row(row).bounds()))
            .unwrap_or((0.0, 0.0));

        let mut slices: BTreeMap<(&str, Exposure), Vec<&PositionStat>> = BTreeMap::new();
        for row in table {
            slices
                .entry((row.protein.as_str(), row.exposure))
                .or_default()
                .push(row);
        }

        let mut dataset = Dataset {
            exposure_decimals,
            ..Default::default()
        };
        let mut ref_bounds: HashMap<String, Option<(f64, f64)>> = HashMap::new();
        let mut reference_keys: Vec<DatasetKey> = Vec::new();

        for ((protein, exposure), mut rows) in slices {
            rows.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.state.cmp(&b.state)));

            let plain = DatasetView {
                data: rows.iter().map(|row| plain_row(row)).collect(),
                min_max: global,
            };
            dataset.insert(protein, exposure, ViewSelector::NoRef, plain);
            dataset.stats.plain_views += 1;

            let bounds = ref_bounds.entry(protein.to_string()).or_insert(None);
            let states: BTreeSet<&str> = rows.iter().map(|r| r.state.as_str()).collect();

            for baseline in states {
                let baseline_means: HashMap<u32, f64> = rows
                    .iter()
                    .filter(|r| r.state == baseline)
                    .map(|r| (r.position, r.combined_mean))
                    .collect();

                let mut data = Vec::with_capacity(rows.len());
                for row in &rows {
                    let Some(base_mean) = baseline_means.get(&row.position) else {
                        dataset.stats.dropped_reference_rows += 1;
                        continue;
                    };
                    let view_row = ViewRow {
                        mean: row.combined_mean - base_mean,
                        p_value: Some(row.tukey_p(baseline).unwrap_or(1.0)),
                        ..plain_row(row)
                    };
                    *bounds = widen(*bounds, view_row.bounds());
                    data.push(view_row);
                }

                let view = DatasetView {
                    data,
                    min_max: (0.0, 0.0),
                };
                let selector = ViewSelector::Reference(baseline.to_string());
                reference_keys.push(dataset.insert(protein, exposure, selector, view));
                dataset.stats.reference_views += 1;
            }
        }

        dataset.ref_min_max = ref_bounds
            .into_iter()
            .map(|(protein, bounds)| (protein, bounds.unwrap_or((0.0, 0.0))))
            .collect();

        // every reference view of a protein shares the protein-wide bound
        for key in reference_keys {
            if let (Some(view), Some(bounds)) = (
                dataset.views.get_mut(&key),
                dataset.ref_min_max.get(&key.protein),
            ) {
                view.min_max = *bounds;
            }
        }

        dataset.stats.proteins = dataset.ref_min_max.len();
        debug!("{}", dataset.stats);

        dataset
    }

    fn insert(
        &mut self,
        protein: &str,
        exposure: Exposure,
        view: ViewSelector,
        data: DatasetView,
    ) -> DatasetKey {
        let key = DatasetKey {
            protein: protein.to_string(),
            exposure,
            view,
        };
        self.views.insert(key.clone(), data);
        key
    }

    /// Look up a view. `state == None` selects the `no_ref` view.
    pub fn get(
        &self,
        protein: &str,
        exposure: f64,
        state: Option<&str>,
    ) -> Result<&DatasetView, DatasetError> {
        let key = DatasetKey {
            protein: protein.to_string(),
            exposure: Exposure::new(exposure, self.exposure_decimals),
            view: ViewSelector::from_state(state),
        };
        self.get_key(&key)
    }

    /// Look up a view by its composite key.
    pub fn get_key(&self, key: &DatasetKey) -> Result<&DatasetView, DatasetError> {
        self.views.get(key).ok_or_else(|| DatasetError::NotFound {
            protein: key.protein.clone(),
            exposure: key.exposure.to_string(),
            view: key.view.to_string(),
        })
    }

    /// Bounds spanning every reference view of `protein`.
    pub fn ref_min_max(&self, protein: &str) -> Option<(f64, f64)> {
        self.ref_min_max.get(protein).copied()
    }

    /// All keys in sorted order.
    pub fn keys(&self) -> Vec<&DatasetKey> {
        let mut keys: Vec<&DatasetKey> = self.views.keys().collect();
        keys.sort();
        keys
    }

    /// Number of views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether the cache holds no views.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Build counts.
    pub fn stats(&self) -> DatasetStats {
        self.stats
    }
}

fn plain_row(row: &PositionStat) -> ViewRow {
    ViewRow {
        position: row.position,
        state: row.state.clone(),
        mean: row.combined_mean,
        variance: row.combined_variance,
        count: row.combined_count,
        anova_p: row.anova_p,
        p_value: None,
    }
}

/// Extend `acc` to cover the finite ends of `(lo, hi)`.
fn widen(acc: Option<(f64, f64)>, (lo, hi): (f64, f64)) -> Option<(f64, f64)> {
    let mut acc = acc;
    for value in [lo, hi] {
        if !value.is_finite() {
            continue;
        }
        acc = Some(match acc {
            Some((min, max)) => (min.min(value), max.max(value)),
            None => (value, value),
        });
    }
    acc
}
