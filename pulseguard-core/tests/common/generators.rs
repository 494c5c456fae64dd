//! Beat-level generators
//!
//! Build filtered-signal sample windows from an explicit RR interval
//! sequence, so rhythm metrics can be checked against known intervals
//! without going through the camera and filter chain.

use pulseguard_core::Sample;

/// `n` identical intervals
pub fn regular_rr(interval_s: f64, n: usize) -> Vec<f64> {
    vec![interval_s; n]
}

/// Intervals alternating short and long around `mean_s` by `± spread_s`,
/// with a seeded jitter so the sequence is not perfectly periodic
pub fn irregular_rr(mean_s: f64, spread_s: f64, n: usize, seed: u32) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|i| {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            let jitter = (state as f64 / u32::MAX as f64 - 0.5) * spread_s * 0.5;
            let sign = if i % 2 == 0 { -1.0 } else { 1.0 };
            mean_s + sign * spread_s + jitter
        })
        .collect()
}

/// Pulse train with one Gaussian bump per beat, sampled at `rate_hz`
///
/// The first beat lands at `0.5 s`; the window runs `0.5 s` past the last
/// beat.
pub fn samples_from_rr(rr_s: &[f64], rate_hz: f64) -> Vec<Sample> {
    let mut beats = Vec::with_capacity(rr_s.len() + 1);
    let mut t = 0.5;
    beats.push(t);
    for rr in rr_s {
        t += rr;
        beats.push(t);
    }

    let end = t + 0.5;
    let n = (end * rate_hz) as usize;
    (0..n)
        .map(|i| {
            let ts = i as f64 / rate_hz;
            let v: f64 = beats
                .iter()
                .map(|b| {
                    let d = (ts - b) / 0.08;
                    (-d * d).exp()
                })
                .sum();
            Sample { timestamp: ts, raw_value: 180.0, filtered_value: (2.0 * v) as f32 }
        })
        .collect()
}
