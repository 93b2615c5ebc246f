use log::debug;

use super::{studentized_range_sf, GroupStats};

/// Pairwise Tukey p-values for `k` groups.
#[derive(Debug, Clone, PartialEq)]
pub struct TukeyOutcome {
    /// Row-major `k × k` matrix; cell `(i, j)` compares group `i` with group `j`.
    pub p_values: Vec<f64>,
    /// Number of groups (matrix side)
    pub k: usize,
    /// Off-diagonal cells left at 1.0 because the studentized range distribution
    /// was undefined for the inputs.
    pub undefined_cells: usize,
}

impl TukeyOutcome {
    /// A `k × k` matrix of ones (no pair significant).
    pub fn ones(k: usize) -> Self {
        Self {
            p_values: vec![1.0; k * k],
            k,
            undefined_cells: 0,
        }
    }

    /// p-value comparing group `i` with group `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.p_values[i * self.k + j]
    }
}

/// Tukey HSD p-values for every ordered pair of distinct groups.
///
/// `se = sqrt(ms_within / 2 · (1/n_i + 1/n_j))`, `q = |m_i - m_j| / se` (0 when
/// `se == 0`), and the p-value is the studentized range upper tail at
/// `(k, Σn - k)`. The diagonal is always exactly 1.0. Cells for which the
/// distribution is undefined keep their 1.0 default and are counted in
/// [`TukeyOutcome::undefined_cells`].
pub fn tukey_hsd(groups: &[GroupStats], ms_within: f64) -> TukeyOutcome {
    let k = groups.len();
    let mut outcome = TukeyOutcome::ones(k);
    let n_total: u64 = groups.iter().map(|g| g.count).sum();
    let df = n_total as f64 - k as f64;

    for (i, a) in groups.iter().enumerate() {
        for (j, b) in groups.iter().enumerate() {
            if i == j {
                continue;
            }
            let se = ((ms_within / 2.0) * (1.0 / a.count as f64 + 1.0 / b.count as f64)).sqrt();
            let mean_diff = (a.mean - b.mean).abs();
            let q = if se != 0.0 { mean_diff / se } else { 0.0 };

            match studentized_range_sf(q, k, df) {
                Some(p) => outcome.p_values[i * k + j] = p,
                None => {
                    debug!("studentized range undefined for q={q}, k={k}, df={df}; keeping 1.0");
                    outcome.undefined_cells += 1;
                }
            }
        }
    }

    outcome
}
