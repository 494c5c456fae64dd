//! Batch smoothing and detrending
//!
//! Symmetric (non-causal) windows over a complete slice. Near the edges the
//! window is truncated to the samples that exist rather than padded, so the
//! first and last outputs are plain averages of fewer points.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Mean of `values[i - window/2 ..= i + window/2]` for every `i`
///
/// Runs in O(n) using a prefix sum accumulated in `f64`.
pub fn centred_moving_mean(values: &[f32], window: usize) -> Vec<f32> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let half = window.max(1) / 2;

    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0f64);
    let mut running = 0.0f64;
    for &v in values {
        running += v as f64;
        prefix.push(running);
    }

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(n);
            ((prefix[end] - prefix[start]) / (end - start) as f64) as f32
        })
        .collect()
}

/// Symmetric moving-average smoothing
///
/// A window of 1 returns the input unchanged.
pub fn smooth_symmetric(values: &[f32], window: usize) -> Vec<f32> {
    if window <= 1 {
        return values.to_vec();
    }
    centred_moving_mean(values, window)
}

/// Remove slow baseline drift by subtracting a centred moving mean
pub fn detrend(values: &[f32], window: usize) -> Vec<f32> {
    let baseline = centred_moving_mean(values, window);
    values
        .iter()
        .zip(baseline.iter())
        .map(|(v, b)| v - b)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert!(smooth_symmetric(&[], 5).is_empty());
        assert!(detrend(&[], 5).is_empty());
    }

    #[test]
    fn smoothing_truncates_at_edges() {
        let smoothed = smooth_symmetric(&[0.0, 3.0, 6.0, 9.0, 12.0], 3);
        // first output averages [0, 3], last averages [9, 12]
        assert_eq!(smoothed, vec![1.5, 3.0, 6.0, 9.0, 10.5]);
    }

    #[test]
    fn window_of_one_is_identity() {
        let values = [1.0, -2.0, 4.0];
        assert_eq!(smooth_symmetric(&values, 1), values.to_vec());
    }

    #[test]
    fn detrend_removes_linear_ramp_in_the_interior() {
        let ramp: Vec<f32> = (0..50).map(|i| 2.0 * i as f32 + 10.0).collect();
        let flat = detrend(&ramp, 9);
        for v in &flat[5..45] {
            assert!(v.abs() < 1e-3, "residual {v}");
        }
    }

    #[test]
    fn detrend_keeps_oscillation() {
        let wave: Vec<f32> = (0..120)
            .map(|i| 100.0 + if (i / 5) % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let out = detrend(&wave, 61);
        let max = out[30..90].iter().cloned().fold(f32::MIN, f32::max);
        assert!(max > 0.8);
    }
}
