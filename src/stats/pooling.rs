use super::{canonical, GroupStats};

/// Pool peptide-level summaries into one combined summary.
///
/// ```text
/// mean     = Σ(n·m) / Σn
/// within   = Σ((n-1)·v)
/// between  = Σ(n·(m - mean)²)
/// variance = (within + between) / (Σ(n-1) + 1)
/// count    = Σn
/// ```
///
/// The `+ 1` in the variance denominator is kept for compatibility with
/// existing reference outputs; it is not the textbook pooled variance.
///
/// Returns `None` for an empty slice.
pub fn pool(groups: &[GroupStats]) -> Option<GroupStats> {
    if groups.is_empty() {
        return None;
    }
    let groups = canonical(groups);

    let count: u64 = groups.iter().map(|g| g.count).sum();
    let n_total = count as f64;

    let mean = groups.iter().map(|g| g.count as f64 * g.mean).sum::<f64>() / n_total;
    let within: f64 = groups
        .iter()
        .map(|g| (g.count as f64 - 1.0) * g.variance)
        .sum();
    let between: f64 = groups
        .iter()
        .map(|g| g.count as f64 * (g.mean - mean).powi(2))
        .sum();
    let denominator = groups.iter().map(|g| g.count as f64 - 1.0).sum::<f64>() + 1.0;

    Some(GroupStats {
        count,
        mean,
        variance: (within + between) / denominator,
    })
}
