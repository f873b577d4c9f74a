//! Series preprocessing: endpoint detrending, ordering helpers and energy checks.

use std::cmp::Ordering;

/// Rounding allowance per sample, in units of `f64::EPSILON` relative to the
/// original scale, below which a detrended series counts as identically zero.
pub const DEGENERACY_EPSILONS_PER_SAMPLE: f64 = 4.0;

/// Remove the straight line through the first and last sample.
///
/// Subtracts `x0 + i * (xN - x0) / (L - 1)` from every sample, so both
/// endpoints become zero and a perfectly linear series becomes the zero
/// series up to rounding.
pub fn detrend_endpoints(data: &[f64]) -> Vec<f64> {
    let trend = endpoint_trend(data);
    data.iter().zip(&trend).map(|(&x, &t)| x - t).collect()
}

/// The line through the first and last sample, evaluated at every index.
pub fn endpoint_trend(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    if n < 2 {
        return data.to_vec();
    }

    let x0 = data[0];
    let slope = (data[n - 1] - x0) / (n - 1) as f64;
    (0..n).map(|i| x0 + i as f64 * slope).collect()
}

/// Total order on f64 that sorts NaN after every number.
#[inline]
fn nan_last(a: f64, b: f64) -> Ordering {
    match a.partial_cmp(&b) {
        Some(ord) => ord,
        None => {
            if a.is_nan() && b.is_nan() {
                Ordering::Equal
            } else if a.is_nan() {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
    }
}

/// Sort ascending in place; NaN values go last.
pub fn sort_f64_slice(slice: &mut [f64]) {
    slice.sort_by(|a, b| nan_last(*a, *b));
}

/// Sorted copy of `data`.
pub fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sort_f64_slice(&mut sorted);
    sorted
}

/// Indices that would sort `data` ascending.
///
/// Ties keep their original order (stable), so rank assignment is
/// deterministic for repeated values.
pub fn argsort(data: &[f64], order: &mut Vec<usize>) {
    order.clear();
    order.extend(0..data.len());
    order.sort_by(|&i, &j| nan_last(data[i], data[j]));
}

/// Sum of `(x / scale)^2`.
///
/// Dividing first keeps the squares finite for any finite input when
/// `scale` is the largest magnitude involved.
#[inline]
pub fn scaled_sum_of_squares(data: &[f64], scale: f64) -> f64 {
    data.iter().map(|&x| (x / scale) * (x / scale)).sum()
}

/// Largest absolute value, 0 for an empty slice.
#[inline]
pub fn max_abs(data: &[f64]) -> f64 {
    data.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs()))
}

/// Whether `reference` is zero to within rounding of a series of magnitude `scale`.
///
/// The allowance grows with the series length, since detrending accumulates
/// one rounding error per sample at most. An exactly zero series is always
/// degenerate.
pub fn is_zero_energy(reference: &[f64], scale: f64) -> bool {
    let allowance =
        DEGENERACY_EPSILONS_PER_SAMPLE * reference.len() as f64 * f64::EPSILON * scale.abs();
    max_abs(reference) <= allowance
}
