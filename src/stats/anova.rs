use serde::Serialize;

use super::{canonical, f_sf, GroupStats};

/// Result of a one-way ANOVA across groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnovaResult {
    /// Between-group sum of squares
    pub ss_between: f64,
    /// Between-group degrees of freedom (groups - 1)
    pub df_between: u64,
    /// Within-group sum of squares
    pub ss_within: f64,
    /// Within-group degrees of freedom (Σn - groups)
    pub df_within: u64,
    /// Between-group mean square (0 when `df_between == 0`)
    pub ms_between: f64,
    /// Within-group mean square (0 when `df_within == 0`)
    pub ms_within: f64,
    /// F statistic (0 when `ms_within == 0`)
    pub f_statistic: f64,
    /// Upper-tail p-value of the F statistic (1 when F is 0 or a df is 0)
    pub p_value: f64,
}

/// One-way ANOVA from group summaries.
///
/// Degenerate inputs are not errors: a zero degree of freedom gives a zero mean
/// square, a zero within mean square gives `F = 0`, and `F = 0` gives `p = 1`.
/// A single group therefore always yields `p = 1`, and so do groups with zero
/// within variance even when their means differ.
pub fn one_way_anova(groups: &[GroupStats]) -> AnovaResult {
    let groups = canonical(groups);
    let k = groups.len() as u64;
    let n_total: u64 = groups.iter().map(|g| g.count).sum();

    let grand_mean = groups.iter().map(|g| g.count as f64 * g.mean).sum::<f64>() / n_total as f64;

    let ss_between: f64 = groups
        .iter()
        .map(|g| g.count as f64 * (g.mean - grand_mean).powi(2))
        .sum();
    let df_between = k.saturating_sub(1);
    let ms_between = if df_between != 0 {
        ss_between / df_between as f64
    } else {
        0.0
    };

    let ss_within: f64 = groups
        .iter()
        .map(|g| (g.count as f64 - 1.0) * g.variance)
        .sum();
    let df_within = n_total.saturating_sub(k);
    let ms_within = if df_within != 0 {
        ss_within / df_within as f64
    } else {
        0.0
    };

    let f_statistic = if ms_within != 0.0 {
        ms_between / ms_within
    } else {
        0.0
    };

    let p_value = if df_between == 0 || df_within == 0 || f_statistic == 0.0 {
        1.0
    } else {
        f_sf(f_statistic, df_between as f64, df_within as f64)
    };

    AnovaResult {
        ss_between,
        df_between,
        ss_within,
        df_within,
        ms_between,
        ms_within,
        f_statistic,
        p_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_group_is_not_significant() {
        let result = one_way_anova(&[GroupStats::new(9, 0.4, 0.001)]);
        assert_eq!(result.df_between, 0);
        assert_eq!(result.ms_between, 0.0);
        assert_eq!(result.f_statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_identical_groups_give_f_zero() {
        let g = GroupStats::new(10, 0.25, 0.002);
        let result = one_way_anova(&[g, g]);
        assert_eq!(result.f_statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_zero_within_variance_is_guarded() {
        let a = GroupStats::new(5, 1.0, 0.0);
        let b = GroupStats::new(5, 2.0, 0.0);
        let result = one_way_anova(&[a, b]);
        assert_eq!(result.ms_within, 0.0);
        assert_eq!(result.f_statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_zero_within_df() {
        let a = GroupStats::new(1, 1.0, 0.0);
        let b = GroupStats::new(1, 2.0, 0.0);
        let result = one_way_anova(&[a, b]);
        assert_eq!(result.df_within, 0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_separated_groups_are_significant() {
        let a = GroupStats::new(9, 0.10, 0.0024 / 7.0);
        let b = GroupStats::new(9, 0.30, 0.0024 / 7.0);
        let result = one_way_anova(&[a, b]);

        assert_eq!(result.df_between, 1);
        assert_eq!(result.df_within, 16);
        assert!((result.ss_between - 0.18).abs() < 1e-12);
        assert!((result.ms_within - 0.0024 / 7.0).abs() < 1e-12);
        assert!(result.p_value < 0.05);
    }

    #[test]
    fn test_textbook_example() {
        // groups {1,2,3}, {2,3,4}, {5,6,7}: SSB = 26, SSW = 6, F = 13 on (2, 6)
        let a = GroupStats::new(3, 2.0, 1.0);
        let b = GroupStats::new(3, 3.0, 1.0);
        let c = GroupStats::new(3, 6.0, 1.0);
        let result = one_way_anova(&[a, b, c]);

        assert!((result.ss_between - 26.0).abs() < 1e-10);
        assert!((result.ss_within - 6.0).abs() < 1e-10);
        assert!((result.f_statistic - 13.0).abs() < 1e-10);
        // P(F(2, 6) > 13) = (1 + 13/3)^(-3)
        let expected = (1.0f64 + 13.0 / 3.0).powi(-3);
        assert!((result.p_value - expected).abs() < 1e-9);
    }

    #[test]
    fn test_order_invariance() {
        let groups = [
            GroupStats::new(4, 0.31, 0.002),
            GroupStats::new(7, 0.12, 0.004),
            GroupStats::new(3, 0.55, 0.001),
        ];
        let reversed: Vec<_> = groups.iter().rev().copied().collect();
        assert_eq!(one_way_anova(&groups), one_way_anova(&reversed));
    }
}
