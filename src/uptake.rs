//! Per-measurement uptake arithmetic.
//!
//! Observed peptide signals are reported as m/z at some charge state `z`. Before
//! replicates can be compared, each signal is converted to the mass of the
//! singly-charged species by removing the `z - 1` extra protons added during
//! ionization. Uptake is then the mass shift against the undeuterated
//! (exposure 0) reference, optionally scaled by the theoretical maximum number of
//! exchangeable hydrogens.

/// Proton mass used for charge-state correction (Da).
pub const PROTON_MASS: f64 = 1.0078;

/// Mass of the singly-charged equivalent of a signal observed at `center` m/z
/// with charge `z`.
///
/// `mass = center * z - (z - 1) * PROTON_MASS`
#[inline]
pub fn corrected_mass(z: u32, center: f64) -> f64 {
    let z = f64::from(z);
    center * z - (z - 1.0) * PROTON_MASS
}

/// Absolute uptake: the mass shift relative to the reference mass.
#[inline]
pub fn uptake(mass: f64, reference_mass: f64) -> f64 {
    mass - reference_mass
}

/// Fractional uptake: absolute uptake scaled by the maximum exchangeable hydrogens.
///
/// A `max_uptake` of zero yields NaN rather than an error; downstream statistics
/// carry the NaN through.
#[inline]
pub fn fractional_uptake(delta: f64, max_uptake: f64) -> f64 {
    if max_uptake == 0.0 {
        return f64::NAN;
    }
    delta / max_uptake
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrected_mass_singly_charged_is_identity() {
        assert_eq!(corrected_mass(1, 5678.1234), 5678.1234);
    }

    #[test]
    fn test_corrected_mass_removes_extra_protons() {
        let mass = corrected_mass(3, 945.352);
        assert!((mass - 2834.0404).abs() < 1e-9);
    }

    #[test]
    fn test_uptake_is_difference() {
        assert!((uptake(1002.5, 1000.0) - 2.5).abs() < 1e-12);
        assert!((uptake(1000.0, 1002.5) + 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_fractional_uptake() {
        assert!((fractional_uptake(2.5, 10.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_fractional_uptake_zero_max_is_nan() {
        assert!(fractional_uptake(2.5, 0.0).is_nan());
        assert!(fractional_uptake(0.0, 0.0).is_nan());
    }
}
