//! Time-domain heart rate variability

use crate::constants::physiology::{MIN_INTERVALS_FOR_HRV, MS_PER_S};

/// SDNN, RMSSD and mean RR of one accepted interval set (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HrvMetrics {
    /// Population standard deviation of RR intervals
    pub sdnn_ms: f32,
    /// Root mean square of successive differences
    pub rmssd_ms: f32,
    /// Mean RR interval
    pub mean_rr_ms: f32,
}

/// Derive HRV from RR intervals given in seconds
///
/// Returns `None` with fewer than three intervals. RMSSD divides the sum of
/// squared successive differences by `n - 1`, where `n` is the number of
/// intervals (so by the number of differences).
pub fn hrv_metrics(intervals_s: &[f32]) -> Option<HrvMetrics> {
    let n = intervals_s.len();
    if n < MIN_INTERVALS_FOR_HRV {
        return None;
    }

    let mean_ms = intervals_s.iter().map(|&s| (s * MS_PER_S) as f64).sum::<f64>() / n as f64;

    let sq_dev: f64 = intervals_s
        .iter()
        .map(|&s| {
            let d = (s * MS_PER_S) as f64 - mean_ms;
            d * d
        })
        .sum();
    let sdnn = libm::sqrt(sq_dev / n as f64);

    let sq_diff: f64 = intervals_s
        .windows(2)
        .map(|w| {
            let d = ((w[1] - w[0]) * MS_PER_S) as f64;
            d * d
        })
        .sum();
    let rmssd = libm::sqrt(sq_diff / (n - 1) as f64);

    Some(HrvMetrics {
        sdnn_ms: sdnn as f32,
        rmssd_ms: rmssd as f32,
        mean_rr_ms: mean_ms as f32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_three_intervals() {
        assert!(hrv_metrics(&[]).is_none());
        assert!(hrv_metrics(&[0.8, 0.8]).is_none());
        assert!(hrv_metrics(&[0.8, 0.8, 0.8]).is_some());
    }

    #[test]
    fn constant_rhythm_has_zero_variability() {
        let hrv = hrv_metrics(&[0.8, 0.8, 0.8]).unwrap();
        assert!(hrv.sdnn_ms.abs() < 1e-3);
        assert!(hrv.rmssd_ms.abs() < 1e-3);
        assert!((hrv.mean_rr_ms - 800.0).abs() < 1e-3);
    }

    #[test]
    fn reference_values() {
        let hrv = hrv_metrics(&[0.7, 0.8, 0.9]).unwrap();
        assert!((hrv.sdnn_ms - 81.65).abs() < 0.01, "sdnn {}", hrv.sdnn_ms);
        assert!((hrv.rmssd_ms - 100.0).abs() < 0.01, "rmssd {}", hrv.rmssd_ms);
    }
}
