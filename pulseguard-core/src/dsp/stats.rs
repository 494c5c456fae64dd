//! Descriptive statistics with explicit degenerate-case handling
//!
//! ## Design Principles
//!
//! ### Pure Functions
//! No side effects, no allocation. Safe to call from the frame callback.
//!
//! ### No NaN, Ever
//! Every function here has a defined answer for empty input and for a zero
//! denominator:
//!
//! ```text
//! mean([])                 = 0
//! variance([]), ([x])      = 0
//! coefficient_of_variation = 0 when |mean| is ~0
//! ```
//!
//! Downstream scores are built from these, so a camera stuck on one value
//! produces zeros instead of poisoning the whole result with NaN.
//!
//! Accumulation is done in `f64`; results are returned as `f32`.

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    (sum / values.len() as f64) as f32
}

/// Population variance (divides by `n`), 0 for fewer than two values
pub fn variance(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values) as f64;
    let sq: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - m;
            d * d
        })
        .sum();
    (sq / values.len() as f64) as f32
}

/// Population standard deviation
pub fn std_dev(values: &[f32]) -> f32 {
    libm::sqrtf(variance(values))
}

/// Standard deviation divided by mean, 0 when the mean is ~0
pub fn coefficient_of_variation(values: &[f32]) -> f32 {
    let m = mean(values);
    if libm::fabsf(m) < f32::EPSILON {
        return 0.0;
    }
    std_dev(values) / m
}

/// Clamp to `[0, 1]`, mapping NaN to 0
pub fn clamp_unit(x: f32) -> f32 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}
