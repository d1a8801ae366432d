//! Acquisition run loop
//!
//! Pulls spectrum pairs from a `SpectrumSource`, pushes them through `normalize` and the
//! accumulator, and forwards diagnostics and cycle results to an `OutputSink`.
//!
//! **Fault policy**:
//! - Malformed pair (length mismatch, odd/zero length, non-finite bin): discard it, keep going
//! - Length change inside an open cycle: the accumulator drops the partial cycle, keep going
//! - Source failure: stop and return the error
//!
//! The stop flag is checked between pairs only; an interrupted cycle is simply abandoned.

use std::sync::atomic::{AtomicBool, Ordering};

use snafu::ResultExt;
use tracing::{debug, info, instrument, trace, warn};

use crate::accumulator::{CrossCorrelationAccumulator, CycleResult};
use crate::diagnostic::PerSampleDiagnostic;
use crate::error::{DriverError, SourceError, SourceSnafu};
use crate::spectrum::{normalize, ComplexSpectrum};

/// Supplies one spectrum per channel per call, both taken over the same acquisition window
pub trait SpectrumSource {
    /// Next pair, or `None` once the source is exhausted
    fn next_pair(&mut self) -> Result<Option<(ComplexSpectrum, ComplexSpectrum)>, SourceError>;
}

/// Receives everything the accumulator emits
pub trait OutputSink {
    /// Called for every accepted pair
    fn on_diagnostic(&mut self, diagnostic: &PerSampleDiagnostic);

    /// Called when a cycle closes, after `on_diagnostic` for the closing pair
    fn on_cycle(&mut self, result: &CycleResult);
}

impl<T: OutputSink + ?Sized> OutputSink for &mut T {
    fn on_diagnostic(&mut self, diagnostic: &PerSampleDiagnostic) {
        (**self).on_diagnostic(diagnostic)
    }

    fn on_cycle(&mut self, result: &CycleResult) {
        (**self).on_cycle(result)
    }
}

/// Counters for one `run`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Pairs pulled from the source
    pub pairs: usize,
    /// Cycles completed
    pub cycles: usize,
    /// Pairs rejected before contributing
    pub discarded_pairs: usize,
    /// Cycles abandoned because the spectrum length changed
    pub aborted_cycles: usize,
}

/// Drive the accumulator until the source runs dry, `stop` is raised, or `max_cycles` cycles
/// have completed
#[instrument(skip_all, fields(accumulations = accumulator.target(), max_cycles = ?max_cycles))]
pub fn run<S, K>(
    source: &mut S,
    accumulator: &mut CrossCorrelationAccumulator,
    sink: &mut K,
    stop: &AtomicBool,
    max_cycles: Option<usize>,
) -> Result<RunSummary, DriverError>
where
    S: SpectrumSource + ?Sized,
    K: OutputSink + ?Sized,
{
    let mut summary = RunSummary::default();
    let mut fft_len = None;

    loop {
        if stop.load(Ordering::Relaxed) {
            info!(pairs = summary.pairs, "stop requested, leaving run loop");
            break;
        }
        if max_cycles.is_some_and(|max| summary.cycles >= max) {
            break;
        }

        let Some((spectrum1, spectrum2)) = source.next_pair().context(SourceSnafu)? else {
            debug!(pairs = summary.pairs, "source exhausted");
            break;
        };
        summary.pairs += 1;

        if fft_len != Some(spectrum1.len()) {
            info!(fft_len = spectrum1.len(), "FFT length");
            fft_len = Some(spectrum1.len());
        }

        let outcome = match normalize(spectrum1, spectrum2)
            .and_then(|(half1, half2)| accumulator.ingest(&half1, &half2))
        {
            Ok(outcome) => outcome,
            Err(e) if e.is_pair_fault() => {
                summary.discarded_pairs += 1;
                warn!(error = %e, "discarding spectrum pair");
                continue;
            }
            Err(e) => {
                summary.aborted_cycles += 1;
                warn!(error = %e, "accumulation cycle aborted");
                continue;
            }
        };

        trace!(count = accumulator.count(), "pair accumulated");
        sink.on_diagnostic(outcome.diagnostic());
        if let Some(result) = outcome.cycle_result() {
            summary.cycles += 1;
            sink.on_cycle(result);
        }
    }

    info!(
        pairs = summary.pairs,
        cycles = summary.cycles,
        discarded = summary.discarded_pairs,
        aborted = summary.aborted_cycles,
        "run finished"
    );
    Ok(summary)
}

/// Sink that reports through `tracing`
#[derive(Debug, Default)]
pub struct LogSink;

impl OutputSink for LogSink {
    fn on_diagnostic(&mut self, d: &PerSampleDiagnostic) {
        debug!(
            peak_index1 = d.peak_index1,
            phase1_deg = format_args!("{:.2}", d.phase1_degrees()),
            peak_index2 = d.peak_index2,
            phase2_deg = format_args!("{:.2}", d.phase2_degrees()),
            direct_diff_deg = format_args!("{:.2}", d.direct_phase_diff_degrees),
            "max bin phase comparison"
        );
    }

    fn on_cycle(&mut self, result: &CycleResult) {
        info!(
            peak_index = result.peak_index,
            phase_deg = format_args!("{:.2}", result.peak_phase_degrees),
            accumulations = result.accumulations,
            "cross-correlation phase"
        );
    }
}

/// Sink that keeps everything it receives
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<PerSampleDiagnostic>,
    pub cycles: Vec<CycleResult>,
}

impl OutputSink for CollectingSink {
    fn on_diagnostic(&mut self, diagnostic: &PerSampleDiagnostic) {
        self.diagnostics.push(*diagnostic);
    }

    fn on_cycle(&mut self, result: &CycleResult) {
        self.cycles.push(result.clone());
    }
}
