//! Elementwise helpers shared by the accumulator and the diagnostics
//!
//! These pin down the numeric conventions explicitly instead of leaning on a numeric library:
//! - `argmax` returns the first (lowest) index of the maximum
//! - `phase` lies in (-π, π]

use core::f64::consts::PI;
use num::complex::Complex64;

/// Index of the largest value, first occurrence on ties
///
/// NaN entries never win. Returns `None` for an empty or all-NaN slice.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Magnitude of every bin
pub fn magnitudes(bins: &[Complex64]) -> Vec<f64> {
    bins.iter().map(|z| z.norm()).collect()
}

/// Phase of a complex value in radians, range (-π, π]
///
/// `atan2(im, re)` yields -π for a negative real axis approached with a negative-zero
/// imaginary part; that point is folded onto +π.
pub fn phase(z: Complex64) -> f64 {
    let p = z.im.atan2(z.re);
    if p <= -PI {
        p + 2.0 * PI
    } else {
        p
    }
}

/// `z1 * conj(z2)`
#[inline]
pub fn cross(z1: Complex64, z2: Complex64) -> Complex64 {
    z1 * z2.conj()
}
