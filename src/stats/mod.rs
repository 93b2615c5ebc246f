//! # Statistics
//!
//! Group-level statistics used by the position engine:
//!
//! - [`pool`]: combine several (count, mean, variance) summaries into one
//! - [`one_way_anova`]: F-test across groups
//! - [`tukey_hsd`]: pairwise studentized-range p-values
//!
//! Every reduction first puts its inputs into a canonical order, so the result
//! is bit-for-bit identical for any permutation of the input slice.

mod anova;
mod distribution;
mod pooling;
mod special;
mod tukey;

pub use anova::{one_way_anova, AnovaResult};
pub use distribution::{f_sf, studentized_range_sf};
pub use pooling::pool;
pub use special::{erfc, ln_gamma, normal_cdf, regularized_beta};
pub use tukey::{tukey_hsd, TukeyOutcome};

use serde::Serialize;
use std::cmp::Ordering;

/// Count, mean and variance of one group of observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupStats {
    /// Number of observations
    pub count: u64,
    /// Mean
    pub mean: f64,
    /// Variance
    pub variance: f64,
}

impl GroupStats {
    /// Create a new group summary.
    pub fn new(count: u64, mean: f64, variance: f64) -> Self {
        Self {
            count,
            mean,
            variance,
        }
    }

    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.mean
            .total_cmp(&other.mean)
            .then_with(|| self.variance.total_cmp(&other.variance))
            .then_with(|| self.count.cmp(&other.count))
    }
}

/// Copy `groups` into canonical order for order-independent summation.
fn canonical(groups: &[GroupStats]) -> Vec<GroupStats> {
    let mut sorted = groups.to_vec();
    sorted.sort_by(GroupStats::canonical_cmp);
    sorted
}
