//! Batch pipeline stages
//!
//! Each stage is a pure function of its inputs so the whole calculation can
//! be replayed on a stored window and give bit-identical output.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::{
    constants::{physiology::MIN_PLAUSIBLE_BPM, quality, time::SECONDS_PER_MINUTE},
    dsp::{clamp_unit, coefficient_of_variation, mean, variance},
    traits::Sample,
};

/// Effective sample rate from timestamps, or `fallback_hz` if they span no time
pub fn estimate_sample_rate(samples: &[Sample], fallback_hz: f32) -> f32 {
    if samples.len() < 2 {
        return fallback_hz;
    }
    let span = samples[samples.len() - 1].timestamp - samples[0].timestamp;
    if !(span > 0.0) || !span.is_finite() {
        return fallback_hz;
    }
    ((samples.len() - 1) as f64 / span) as f32
}

/// Convert a duration to a sample count at `rate_hz`, at least 1
pub fn seconds_to_samples(seconds: f32, rate_hz: f32) -> usize {
    libm::roundf(seconds * rate_hz).max(1.0) as usize
}

/// Indices of local maxima above `threshold`, at least `min_distance` apart
///
/// A sample is a candidate when it is strictly greater than its left
/// neighbour and not less than its right one, so on a flat top the first
/// sample is taken. When two candidates fall within `min_distance`, the
/// taller one is kept.
pub fn detect_peaks(signal: &[f32], threshold: f32, min_distance: usize) -> Vec<usize> {
    let mut peaks: Vec<usize> = Vec::new();
    if signal.len() < 3 {
        return peaks;
    }

    for i in 1..signal.len() - 1 {
        let x = signal[i];
        if !(x > signal[i - 1] && x >= signal[i + 1] && x > threshold) {
            continue;
        }

        match peaks.last_mut() {
            Some(last) if i - *last < min_distance => {
                if x > signal[*last] {
                    *last = i;
                }
            }
            _ => peaks.push(i),
        }
    }
    peaks
}

/// Seconds between consecutive peaks
pub fn rr_intervals(samples: &[Sample], peaks: &[usize]) -> Vec<f32> {
    peaks
        .windows(2)
        .filter_map(|w| {
            let a = samples.get(w[0])?;
            let b = samples.get(w[1])?;
            Some((b.timestamp - a.timestamp) as f32)
        })
        .collect()
}

/// Keep intervals in `[min_s, max_s]`; returns `(accepted, rejected_count)`
pub fn filter_intervals(intervals: &[f32], min_s: f32, max_s: f32) -> (Vec<f32>, usize) {
    let accepted: Vec<f32> = intervals
        .iter()
        .copied()
        .filter(|rr| (min_s..=max_s).contains(rr))
        .collect();
    let rejected = intervals.len() - accepted.len();
    (accepted, rejected)
}

/// Beats per minute from the mean interval, 0 if there is none
pub fn bpm_from_intervals(intervals: &[f32]) -> f32 {
    let mean_rr = mean(intervals);
    if mean_rr <= 0.0 {
        return 0.0;
    }
    SECONDS_PER_MINUTE / mean_rr
}

/// `1 - cv / ceiling`, clamped; 0 with fewer than two intervals
pub fn stability(intervals: &[f32], cv_ceiling: f32) -> f32 {
    if intervals.len() < 2 {
        return 0.0;
    }
    clamp_unit(1.0 - coefficient_of_variation(intervals) / cv_ceiling)
}

/// Standard deviation relative to the level counted as full amplitude
pub fn amplitude_score(std_dev: f32, full_amplitude: f32) -> f32 {
    if full_amplitude <= 0.0 {
        return 0.0;
    }
    clamp_unit(std_dev / full_amplitude)
}

/// Peaks found relative to the fewest a plausible heart would produce
pub fn peak_score(peak_count: usize, window_s: f32) -> f32 {
    let expected = window_s * MIN_PLAUSIBLE_BPM / SECONDS_PER_MINUTE;
    if expected <= 0.0 {
        return 0.0;
    }
    clamp_unit(peak_count as f32 / expected)
}

/// Weighted confidence, scaled by the share of intervals that survived filtering
///
/// `amplitude_score` is taken from the band-passed sequence, i.e. the
/// pulsatile part of the raw intensity. The raw channel's own spread is
/// dominated by torch level, skin tone and slow drift, none of which say
/// anything about how well beats were resolved.
pub fn confidence(peak_score: f32, stability: f32, amplitude_score: f32, acceptance: f32) -> f32 {
    let blended = quality::CONFIDENCE_WEIGHT_PEAKS * peak_score
        + quality::CONFIDENCE_WEIGHT_REGULARITY * stability
        + quality::CONFIDENCE_WEIGHT_AMPLITUDE * amplitude_score;
    clamp_unit(blended * clamp_unit(acceptance))
}

/// Contact quality of the pre-smoothing filtered sequence
///
/// `snr / (snr + 1)` where `snr` compares the variance of the smoothed
/// signal with the variance of what smoothing removed, scaled by the
/// amplitude score. 0 when the input is (near) constant.
pub fn signal_quality(filtered: &[f32], smoothed: &[f32], full_amplitude: f32) -> f32 {
    let total = variance(filtered);
    if total < quality::DEGENERATE_VARIANCE || filtered.len() != smoothed.len() {
        return 0.0;
    }

    let residual: Vec<f32> = filtered.iter().zip(smoothed).map(|(f, s)| f - s).collect();
    let noise = variance(&residual);
    let signal = variance(smoothed);

    let snr_term = if noise < quality::DEGENERATE_VARIANCE {
        1.0
    } else {
        let snr = signal / noise;
        snr / (snr + 1.0)
    };

    clamp_unit(snr_term * amplitude_score(libm::sqrtf(total), full_amplitude))
}
