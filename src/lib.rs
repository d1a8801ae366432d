//! Two-channel phase estimation by accumulated frequency-domain cross-correlation
//!
//! Paired channel spectra are reduced to half-spectra (`spectrum`), cross-correlated and summed
//! over a fixed number of pairs (`accumulator`), and resolved into the phase at the strongest
//! correlation bin. `driver` and `source` provide the acquisition loop around that core.

pub mod accumulator;
pub mod diagnostic;
pub mod driver;
pub mod error;
pub mod math;
pub mod source;
pub mod spectrum;
pub mod tracing_init;

pub use accumulator::{AccumulatorConfig, CrossCorrelationAccumulator, CycleResult, StepOutcome};
pub use diagnostic::{diagnose, PerSampleDiagnostic};
pub use driver::{run, CollectingSink, LogSink, OutputSink, RunSummary, SpectrumSource};
pub use error::{CorrelationError, DriverError, SourceError};
pub use spectrum::{normalize, ComplexSpectrum, HalfSpectrum};
