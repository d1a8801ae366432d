//! Cross-correlation accumulator
//!
//! Sums `half1 · conj(half2)` bin by bin over a fixed number of spectrum pairs, then resolves
//! the average into a phase estimate at the strongest bin and starts over.
//!
//! **Cycle**:
//! 1. First pair after a reset sizes the buffer to its half-spectrum length (all zeros)
//! 2. Every pair adds its cross-spectrum contribution and bumps `count`
//! 3. When `count` reaches `target`: average, magnitude, argmax, phase, then reset
//!
//! Averaging complex amplitudes before taking the angle weights each pair by its magnitude and
//! never averages wrapped phases, so a constant phase offset survives heavy noise.

use num::complex::Complex64;
use snafu::ensure;

use crate::diagnostic::{diagnose, PerSampleDiagnostic};
use crate::error::{AccumulatorLengthChangedSnafu, CorrelationError, InvalidTargetSnafu, Result};
use crate::math::{argmax, cross, magnitudes, phase};

/// Accumulations per cycle when nothing else is configured
pub const DEFAULT_ACCUMULATIONS: usize = 1000;

/// Accumulator configuration
#[derive(Debug, Clone)]
pub struct AccumulatorConfig {
    /// Pairs summed before a phase estimate is produced
    pub accumulations: usize,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            accumulations: DEFAULT_ACCUMULATIONS,
        }
    }
}

/// Averaged cross-spectrum and its phase estimate for one completed cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleResult {
    /// `buffer / target`
    pub averaged: Vec<Complex64>,
    /// `|averaged|` per bin
    pub magnitude: Vec<f64>,
    /// Phase of `averaged` per bin, radians in (-π, π]
    pub phase_radians: Vec<f64>,
    /// Bin of maximum magnitude (lowest bin on ties)
    pub peak_index: usize,
    /// Phase at `peak_index`, radians in (-π, π]
    pub peak_phase_radians: f64,
    /// Phase at `peak_index`, degrees in (-180, 180]
    pub peak_phase_degrees: f64,
    /// Number of pairs averaged
    pub accumulations: usize,
}

impl CycleResult {
    fn from_buffer(buffer: &[Complex64], target: usize) -> Self {
        let averaged: Vec<Complex64> = buffer.iter().map(|&z| z / target as f64).collect();
        let magnitude = magnitudes(&averaged);
        let phase_radians: Vec<f64> = averaged.iter().map(|&z| phase(z)).collect();

        // Buffers are never empty: ingest rejects empty half-spectra
        let peak_index = argmax(&magnitude).unwrap_or(0);
        let peak_phase_radians = phase_radians[peak_index];

        Self {
            averaged,
            magnitude,
            phase_radians,
            peak_index,
            peak_phase_radians,
            peak_phase_degrees: peak_phase_radians.to_degrees(),
            accumulations: target,
        }
    }
}

/// What a single `ingest` call produced
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Cycle still open; `count` pairs summed so far
    Accumulating {
        count: usize,
        diagnostic: PerSampleDiagnostic,
    },
    /// Cycle closed on this pair; the accumulator has already been reset
    CycleComplete {
        result: CycleResult,
        diagnostic: PerSampleDiagnostic,
    },
}

impl StepOutcome {
    pub fn diagnostic(&self) -> &PerSampleDiagnostic {
        match self {
            StepOutcome::Accumulating { diagnostic, .. } => diagnostic,
            StepOutcome::CycleComplete { diagnostic, .. } => diagnostic,
        }
    }

    pub fn cycle_result(&self) -> Option<&CycleResult> {
        match self {
            StepOutcome::Accumulating { .. } => None,
            StepOutcome::CycleComplete { result, .. } => Some(result),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, StepOutcome::CycleComplete { .. })
    }
}

/// Running cross-correlation state
///
/// Single writer: `ingest` takes `&mut self` and runs to completion. Wrap the accumulator in a
/// channel or mutex before sharing it between producers.
#[derive(Debug, Clone)]
pub struct CrossCorrelationAccumulator {
    buffer: Vec<Complex64>,
    count: usize,
    target: usize,
}

impl CrossCorrelationAccumulator {
    /// Create an accumulator that closes a cycle every `target` pairs
    ///
    /// # Errors
    /// * `InvalidTarget` if `target` is zero
    pub fn new(target: usize) -> Result<Self> {
        ensure!(target >= 1, InvalidTargetSnafu { target });
        Ok(Self {
            buffer: Vec::new(),
            count: 0,
            target,
        })
    }

    pub fn from_config(config: &AccumulatorConfig) -> Result<Self> {
        Self::new(config.accumulations)
    }

    /// Pairs summed in the open cycle
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Half-spectrum length of the open cycle, `None` until its first pair
    pub fn bins(&self) -> Option<usize> {
        (self.count > 0).then_some(self.buffer.len())
    }

    pub fn is_cycle_open(&self) -> bool {
        self.count > 0
    }

    /// Running sum of the open cycle
    pub fn buffer(&self) -> &[Complex64] {
        if self.count == 0 {
            &[]
        } else {
            &self.buffer[..]
        }
    }

    /// Drop any partial cycle
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.count = 0;
    }

    /// Add one pair of half-spectra to the running cross-correlation
    ///
    /// The per-pair diagnostic is returned on every call, closed cycle or not.
    ///
    /// # Errors
    /// * `LengthMismatch` if the halves differ in length (state untouched)
    /// * `InvalidLength` if the halves are empty (state untouched)
    /// * `NonFiniteBin` if either half holds a NaN or infinite bin (state untouched)
    /// * `AccumulatorLengthChanged` if the length differs from the open cycle's; the partial
    ///   cycle is discarded
    pub fn ingest(&mut self, half1: &[Complex64], half2: &[Complex64]) -> Result<StepOutcome> {
        let diagnostic = diagnose(half1, half2)?;

        if self.count == 0 {
            self.buffer.clear();
            self.buffer.resize(half1.len(), Complex64::new(0.0, 0.0));
        } else if half1.len() != self.buffer.len() {
            let expected = self.buffer.len();
            self.reset();
            return AccumulatorLengthChangedSnafu { expected, actual: half1.len() }.fail();
        }

        for ((acc, &z1), &z2) in self.buffer.iter_mut().zip(half1).zip(half2) {
            *acc += cross(z1, z2);
        }
        self.count += 1;

        if self.count < self.target {
            return Ok(StepOutcome::Accumulating {
                count: self.count,
                diagnostic,
            });
        }

        let result = CycleResult::from_buffer(&self.buffer, self.target);
        self.reset();

        Ok(StepOutcome::CycleComplete { result, diagnostic })
    }
}

impl TryFrom<AccumulatorConfig> for CrossCorrelationAccumulator {
    type Error = CorrelationError;

    fn try_from(config: AccumulatorConfig) -> Result<Self> {
        Self::from_config(&config)
    }
}
