//! Normalized exposure times.
//!
//! Exposure values read from cluster exports often differ only by floating-point
//! rounding (`30.0` vs `30.000000001`). Grouping on raw `f64` would silently
//! fragment replicate groups, so every exposure is rounded to a fixed number of
//! decimals and wrapped in [`Exposure`], which is totally ordered and hashable.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Default number of decimal places exposures are rounded to.
pub const DEFAULT_EXPOSURE_DECIMALS: u32 = 2;

/// An exposure time in seconds, rounded to a fixed decimal precision.
///
/// Equality, ordering and hashing all operate on the rounded value, so two
/// exposures built with the same precision compare equal whenever they round
/// to the same number.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct Exposure(f64);

impl Exposure {
    /// The undeuterated reference time point.
    pub const REFERENCE: Exposure = Exposure(0.0);

    /// Round `seconds` to `decimals` places.
    pub fn new(seconds: f64, decimals: u32) -> Self {
        let scale = 10f64.powi(decimals.min(15) as i32);
        let rounded = (seconds * scale).round() / scale;
        // fold -0.0 into 0.0 so both hash identically
        if rounded == 0.0 {
            Self(0.0)
        } else {
            Self(rounded)
        }
    }

    /// Exposure in seconds.
    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Whether this is the exposure 0 reference time point.
    pub fn is_reference(self) -> bool {
        self.0 == 0.0
    }
}

impl PartialEq for Exposure {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Exposure {}

impl PartialOrd for Exposure {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Exposure {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Exposure {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Exposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rounding_merges_nearby_values() {
        let a = Exposure::new(30.0, 2);
        let b = Exposure::new(30.000_000_1, 2);
        let c = Exposure::new(29.999_999, 2);
        assert_eq!(a, b);
        assert_eq!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_distinct_values_stay_distinct() {
        assert_ne!(Exposure::new(0.5, 2), Exposure::new(0.51, 2));
        assert!(Exposure::new(0.5, 2) < Exposure::new(0.51, 2));
    }

    #[test]
    fn test_negative_zero_is_reference() {
        let e = Exposure::new(-0.001, 2);
        assert!(e.is_reference());
        assert_eq!(e, Exposure::REFERENCE);
    }
}
