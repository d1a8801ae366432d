//! Shared helpers for integration tests

#![allow(dead_code)]

use num::complex::Complex64;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustydoa::ComplexSpectrum;

/// Install a test-writer subscriber once per test binary
///
/// `RUST_LOG` overrides the default `rustydoa=warn` filter.
pub fn init_test_tracing() {
    static TRACING: Lazy<()> = Lazy::new(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("rustydoa=warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_line_number(true)
            .with_test_writer()
            .try_init();
    });

    Lazy::force(&TRACING);
}

/// Build a complex value
pub fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// Full spectrum whose first half is `half` and second half is zeros
pub fn spectrum_with_half(half: &[Complex64]) -> ComplexSpectrum {
    let mut bins = half.to_vec();
    bins.resize(half.len() * 2, c(0.0, 0.0));
    bins.into()
}

/// Seeded random half-spectrum pairs
pub fn random_halves(seed: u64, count: usize, bins: usize) -> Vec<(Vec<Complex64>, Vec<Complex64>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut draw = move || c(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
    (0..count)
        .map(|_| {
            let h1 = (0..bins).map(|_| draw()).collect();
            let h2 = (0..bins).map(|_| draw()).collect();
            (h1, h2)
        })
        .collect()
}

/// Elementwise complex comparison within `eps`
pub fn assert_bins_close(actual: &[Complex64], expected: &[Complex64], eps: f64) {
    assert_eq!(actual.len(), expected.len(), "length differs");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).norm() < eps, "bin {}: got {}, expected {}", i, a, e);
    }
}
