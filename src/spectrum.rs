//! Spectrum pair ingestion
//!
//! Acquisition delivers one full complex spectrum per channel. Only the first N/2 bins carry
//! non-redundant content for a real input signal, so each pair is validated and truncated to
//! that half before it reaches the accumulator.
//!
//! **Checks, in order**:
//! 1. Both spectra have the same length N
//! 2. N is positive and even
//! 3. Every retained bin is finite

use core::ops::Deref;

use num::complex::Complex64;
use snafu::ensure;

use crate::error::{
    ComponentLengthMismatchSnafu, InvalidLengthSnafu, LengthMismatchSnafu, NonFiniteBinSnafu,
    Result,
};

/// One channel's complex spectrum, indexed by frequency bin
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexSpectrum {
    bins: Vec<Complex64>,
}

impl ComplexSpectrum {
    pub fn new(bins: Vec<Complex64>) -> Self {
        Self { bins }
    }

    /// Assemble a spectrum from separate real and imaginary sequences
    ///
    /// FPGA snapshot blocks expose the FFT output as two parallel arrays per channel.
    pub fn from_parts(re: &[f64], im: &[f64]) -> Result<Self> {
        ensure!(
            re.len() == im.len(),
            ComponentLengthMismatchSnafu { real: re.len(), imag: im.len() }
        );

        let bins = re
            .iter()
            .zip(im)
            .map(|(&r, &i)| Complex64::new(r, i))
            .collect();
        Ok(Self { bins })
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn as_slice(&self) -> &[Complex64] {
        &self.bins
    }

    pub fn into_inner(self) -> Vec<Complex64> {
        self.bins
    }
}

impl From<Vec<Complex64>> for ComplexSpectrum {
    fn from(bins: Vec<Complex64>) -> Self {
        Self::new(bins)
    }
}

/// Bins `[0, N/2)` of a validated `ComplexSpectrum`
#[derive(Debug, Clone, PartialEq)]
pub struct HalfSpectrum {
    bins: Vec<Complex64>,
}

impl HalfSpectrum {
    pub fn into_inner(self) -> Vec<Complex64> {
        self.bins
    }
}

impl Deref for HalfSpectrum {
    type Target = [Complex64];

    fn deref(&self) -> &[Complex64] {
        &self.bins
    }
}

/// Validate a spectrum pair and reduce both channels to their half-spectra
///
/// # Arguments
/// * `spectrum1` - Channel 1 spectrum (N bins)
/// * `spectrum2` - Channel 2 spectrum (N bins)
///
/// # Errors
/// * `LengthMismatch` if the channels differ in length
/// * `InvalidLength` if N is zero or odd
/// * `NonFiniteBin` if a retained bin is NaN or infinite
pub fn normalize(
    spectrum1: ComplexSpectrum,
    spectrum2: ComplexSpectrum,
) -> Result<(HalfSpectrum, HalfSpectrum)> {
    let n = spectrum1.len();
    ensure!(
        n == spectrum2.len(),
        LengthMismatchSnafu { len1: n, len2: spectrum2.len() }
    );
    ensure!(n > 0 && n % 2 == 0, InvalidLengthSnafu { len: n });

    let half = n / 2;
    let mut bins1 = spectrum1.into_inner();
    let mut bins2 = spectrum2.into_inner();
    bins1.truncate(half);
    bins2.truncate(half);

    check_finite(&bins1, 1)?;
    check_finite(&bins2, 2)?;

    Ok((HalfSpectrum { bins: bins1 }, HalfSpectrum { bins: bins2 }))
}

/// First NaN or infinite bin of one channel, reported as `NonFiniteBin`
pub(crate) fn check_finite(bins: &[Complex64], channel: u8) -> Result<()> {
    match bins.iter().position(|z| !z.is_finite()) {
        Some(bin) => NonFiniteBinSnafu { channel, bin }.fail(),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CorrelationError;

    fn ramp(n: usize) -> ComplexSpectrum {
        (0..n)
            .map(|i| Complex64::new(i as f64, -(i as f64)))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_normalize_keeps_first_half() {
        let (h1, h2) = normalize(ramp(8), ramp(8)).unwrap();
        assert_eq!(h1.len(), 4);
        assert_eq!(h2.len(), 4);
        assert_eq!(h1[3], Complex64::new(3.0, -3.0));
    }

    #[test]
    fn test_normalize_rejects_zero_and_odd() {
        assert_eq!(
            normalize(ramp(0), ramp(0)),
            Err(CorrelationError::InvalidLength { len: 0 })
        );
        assert_eq!(
            normalize(ramp(7), ramp(7)),
            Err(CorrelationError::InvalidLength { len: 7 })
        );
    }

    #[test]
    fn test_normalize_rejects_length_mismatch() {
        assert_eq!(
            normalize(ramp(8), ramp(16)),
            Err(CorrelationError::LengthMismatch { len1: 8, len2: 16 })
        );
    }

    #[test]
    fn test_normalize_mismatch_reported_before_odd_length() {
        // Both odd and unequal: the pair is a mismatch first
        assert!(matches!(
            normalize(ramp(5), ramp(7)),
            Err(CorrelationError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_normalize_rejects_nan_in_retained_half() {
        let mut bins = ramp(8).into_inner();
        bins[2] = Complex64::new(f64::NAN, 0.0);
        assert_eq!(
            normalize(ramp(8), bins.into()),
            Err(CorrelationError::NonFiniteBin { channel: 2, bin: 2 })
        );
    }

    #[test]
    fn test_normalize_ignores_nan_in_discarded_half() {
        let mut bins = ramp(8).into_inner();
        bins[6] = Complex64::new(f64::INFINITY, 0.0);
        assert!(normalize(bins.into(), ramp(8)).is_ok());
    }

    #[test]
    fn test_from_parts() {
        let s = ComplexSpectrum::from_parts(&[1.0, 2.0], &[3.0, 4.0]).unwrap();
        assert_eq!(s.as_slice(), &[Complex64::new(1.0, 3.0), Complex64::new(2.0, 4.0)]);

        assert_eq!(
            ComplexSpectrum::from_parts(&[1.0, 2.0], &[3.0]),
            Err(CorrelationError::ComponentLengthMismatch { real: 2, imag: 1 })
        );
    }
}
