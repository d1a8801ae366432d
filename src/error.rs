//! Error types
//!
//! `CorrelationError` covers everything the numerical core can reject. `SourceError` belongs to
//! the acquisition side and `DriverError` to the run loop.

use snafu::Snafu;

/// Result alias for the numerical core
pub type Result<T, E = CorrelationError> = core::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CorrelationError {
    /// The two spectra (or half-spectra) of a pair differ in length
    #[snafu(display("spectrum lengths differ: channel 1 has {len1} bins, channel 2 has {len2}"))]
    LengthMismatch { len1: usize, len2: usize },

    /// Spectrum length cannot be halved into a half-spectrum
    #[snafu(display("spectrum length {len} must be positive and even"))]
    InvalidLength { len: usize },

    /// Spectrum length changed while a cycle was open
    #[snafu(display(
        "half-spectrum length changed mid-cycle: accumulating {expected} bins, got {actual}"
    ))]
    AccumulatorLengthChanged { expected: usize, actual: usize },

    /// Accumulations per cycle must be at least one
    #[snafu(display("accumulation target must be at least 1, got {target}"))]
    InvalidTarget { target: usize },

    /// Real and imaginary component sequences differ in length
    #[snafu(display("component lengths differ: {real} real parts, {imag} imaginary parts"))]
    ComponentLengthMismatch { real: usize, imag: usize },

    /// NaN or infinite bin
    #[snafu(display("channel {channel} has a non-finite value at bin {bin}"))]
    NonFiniteBin { channel: u8, bin: usize },
}

impl CorrelationError {
    /// True for errors that only invalidate the pair being processed
    pub fn is_pair_fault(&self) -> bool {
        matches!(
            self,
            CorrelationError::LengthMismatch { .. }
                | CorrelationError::InvalidLength { .. }
                | CorrelationError::NonFiniteBin { .. }
                | CorrelationError::ComponentLengthMismatch { .. }
        )
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SourceError {
    #[snafu(display("failed to open WAV file '{path}': {source}"))]
    OpenWav { path: String, source: hound::Error },

    #[snafu(display("failed to read WAV samples: {source}"))]
    ReadWav { source: hound::Error },

    #[snafu(display("unsupported WAV format: {channels} channel(s), {bits} bits per sample"))]
    UnsupportedFormat { channels: u16, bits: u16 },

    #[snafu(display("frame length {len} must be positive and even"))]
    InvalidFrameLength { len: usize },

    #[snafu(display("invalid synthetic source configuration: {reason}"))]
    InvalidSynthetic { reason: String },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DriverError {
    #[snafu(display("acquisition source failed: {source}"))]
    Source { source: SourceError },
}
