//! Per-pair max-bin phase comparison
//!
//! Each channel's phase is read at that channel's own strongest bin and the two are subtracted.
//! The two peak bins are not required to coincide, so the result is only meaningful when both
//! channels are dominated by the same tone. The cross-correlation estimate from the accumulator
//! is the authoritative one; this is a sanity check that runs on every pair.

use num::complex::Complex64;

use crate::error::{InvalidLengthSnafu, LengthMismatchSnafu, Result};
use crate::math::{argmax, magnitudes, phase};
use crate::spectrum::check_finite;
use snafu::ensure;

/// Max-bin phase comparison for one spectrum pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerSampleDiagnostic {
    /// Strongest bin of channel 1
    pub peak_index1: usize,
    /// Strongest bin of channel 2
    pub peak_index2: usize,
    /// Channel 1 phase at `peak_index1`, radians in (-π, π]
    pub phase1_radians: f64,
    /// Channel 2 phase at `peak_index2`, radians in (-π, π]
    pub phase2_radians: f64,
    /// `degrees(phase1 - phase2)`, not re-wrapped, so it spans (-360, 360)
    pub direct_phase_diff_degrees: f64,
}

impl PerSampleDiagnostic {
    pub fn phase1_degrees(&self) -> f64 {
        self.phase1_radians.to_degrees()
    }

    pub fn phase2_degrees(&self) -> f64 {
        self.phase2_radians.to_degrees()
    }

    /// Whether both channels peaked in the same bin
    pub fn peaks_coincide(&self) -> bool {
        self.peak_index1 == self.peak_index2
    }
}

/// Compare the phases of two half-spectra at their respective magnitude peaks
///
/// # Errors
/// * `LengthMismatch` if the half-spectra differ in length
/// * `InvalidLength` if they are empty
/// * `NonFiniteBin` if either holds a NaN or infinite bin
pub fn diagnose(half1: &[Complex64], half2: &[Complex64]) -> Result<PerSampleDiagnostic> {
    ensure!(
        half1.len() == half2.len(),
        LengthMismatchSnafu { len1: half1.len(), len2: half2.len() }
    );
    check_finite(half1, 1)?;
    check_finite(half2, 2)?;

    let (peak_index1, peak_index2) = match (argmax(&magnitudes(half1)), argmax(&magnitudes(half2))) {
        (Some(i1), Some(i2)) => (i1, i2),
        _ => return InvalidLengthSnafu { len: 0usize }.fail(),
    };

    let phase1_radians = phase(half1[peak_index1]);
    let phase2_radians = phase(half2[peak_index2]);

    Ok(PerSampleDiagnostic {
        peak_index1,
        peak_index2,
        phase1_radians,
        phase2_radians,
        direct_phase_diff_degrees: (phase1_radians - phase2_radians).to_degrees(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CorrelationError;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_diagnose_same_peak() {
        let half1 = [c(0.1, 0.0), Complex64::from_polar(5.0, 40f64.to_radians()), c(0.2, 0.0)];
        let half2 = [c(0.0, 0.1), Complex64::from_polar(4.0, 10f64.to_radians()), c(0.0, 0.0)];

        let d = diagnose(&half1, &half2).unwrap();
        assert_eq!(d.peak_index1, 1);
        assert_eq!(d.peak_index2, 1);
        assert!(d.peaks_coincide());
        assert!((d.phase1_degrees() - 40.0).abs() < 1e-9);
        assert!((d.phase2_degrees() - 10.0).abs() < 1e-9);
        assert!((d.direct_phase_diff_degrees - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_diagnose_different_peaks_still_compared() {
        // Channel peaks in different bins: the difference mixes two frequencies
        let half1 = [c(0.0, 3.0), c(1.0, 0.0)];
        let half2 = [c(1.0, 0.0), c(-3.0, 0.0)];

        let d = diagnose(&half1, &half2).unwrap();
        assert_eq!((d.peak_index1, d.peak_index2), (0, 1));
        assert!(!d.peaks_coincide());
        // 90° - 180°
        assert!((d.direct_phase_diff_degrees + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_diagnose_difference_is_not_wrapped() {
        let half1 = [Complex64::from_polar(1.0, 170f64.to_radians())];
        let half2 = [Complex64::from_polar(1.0, -170f64.to_radians())];

        let d = diagnose(&half1, &half2).unwrap();
        assert!((d.direct_phase_diff_degrees - 340.0).abs() < 1e-9);
    }

    #[test]
    fn test_diagnose_tie_break_lowest_bin() {
        let half = [c(1.0, 0.0), c(0.0, 1.0), c(-1.0, 0.0)];
        let d = diagnose(&half, &half).unwrap();
        assert_eq!(d.peak_index1, 0);
        assert_eq!(d.peak_index2, 0);
    }

    #[test]
    fn test_diagnose_rejects_mismatch_and_empty() {
        assert_eq!(
            diagnose(&[c(1.0, 0.0)], &[]),
            Err(CorrelationError::LengthMismatch { len1: 1, len2: 0 })
        );
        assert_eq!(diagnose(&[], &[]), Err(CorrelationError::InvalidLength { len: 0 }));
    }

    #[test]
    fn test_diagnose_rejects_non_finite() {
        let half1 = [c(5.0, 0.0), c(f64::NAN, 0.0), c(1.0, 0.0)];
        let half2 = [c(1.0, 0.0); 3];
        assert_eq!(
            diagnose(&half1, &half2),
            Err(CorrelationError::NonFiniteBin { channel: 1, bin: 1 })
        );
        assert_eq!(
            diagnose(&half2, &[c(1.0, 0.0), c(f64::NEG_INFINITY, 1.0), c(0.0, 0.0)]),
            Err(CorrelationError::NonFiniteBin { channel: 2, bin: 1 })
        );
    }
}
