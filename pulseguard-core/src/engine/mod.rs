//! Calculation Engine
//!
//! ## Overview
//!
//! Buffers forwarded samples and, once they span the mode's target
//! duration, runs the batch pipeline over them:
//!
//! ```text
//! filtered ──► smooth(5) ──► detrend(2 s) ──► peaks ──► RR intervals
//!    │                                                      │
//!    │                                            keep [0.25, 2.0] s
//!    │                                                      │
//!    └──► signal quality              BPM, stability, confidence
//!                                                           │
//!                                              ≥ 3 intervals: HRV + risk
//! ```
//!
//! ## Guarantees
//!
//! - [`CalculationEngine::calculate`] takes `&self` and touches no state, so
//!   running it twice on the same samples gives the same result.
//! - Every division is guarded. A flat or empty window yields zeros and a
//!   [`Degradation`], never NaN.
//! - The rhythm group ([`RhythmAnalysis`]) is built from one interval set and
//!   is either fully present or absent.
//!
//! ## Triggering
//!
//! With [`TriggerPolicy::Once`] the engine fires a single time, when the
//! buffer first spans the target duration. With
//! [`TriggerPolicy::Rolling`] it fires at the target duration and then every
//! `every_s` seconds over a trailing window of the same length; older
//! samples are discarded as they fall out of the window.

pub mod hrv;
pub mod rhythm;
pub mod stages;

pub use hrv::{hrv_metrics, HrvMetrics};
pub use rhythm::{irregular_risk, irregular_score, IrregularRisk, RiskLevel};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::{
    buffer::SampleBuffer,
    config::{DetectionConfig, DetectionMode, TriggerPolicy},
    constants::quality::DEGENERATE_VARIANCE,
    dsp::{detrend, smooth_symmetric, std_dev, variance},
    errors::Degradation,
    result::{MeasurementResult, RhythmAnalysis},
    traits::{Sample, Seconds},
};

/// Windowed batch calculation over forwarded samples
#[derive(Debug, Clone)]
pub struct CalculationEngine {
    config: DetectionConfig,
    mode: DetectionMode,
    session_id: u32,
    buffer: SampleBuffer,
    origin: Option<Seconds>,
    last_fired: Option<Seconds>,
}

impl CalculationEngine {
    /// Engine for one session
    pub fn new(config: DetectionConfig, mode: DetectionMode, session_id: u32) -> Self {
        let expected = (mode.target_duration_s() * config.sample_rate_hz as f64) as usize;
        Self {
            config,
            mode,
            session_id,
            buffer: SampleBuffer::with_capacity(expected + expected / 4),
            origin: None,
            last_fired: None,
        }
    }

    /// Session start time; elapsed durations are measured from here
    ///
    /// Defaults to the first buffered sample if never set.
    pub fn set_origin(&mut self, origin: Seconds) {
        self.origin = Some(origin);
    }

    /// Append a forwarded sample; returns a result when the trigger fires
    pub fn process_sample(&mut self, sample: Sample) -> Option<MeasurementResult> {
        if !self.buffer.push(sample) {
            log_warn!(
                "Dropped sample at {:.3}s: timestamp does not advance",
                sample.timestamp
            );
            return None;
        }

        let target = self.mode.target_duration_s();
        if self.buffer.duration() < target {
            return None;
        }

        let now = sample.timestamp;
        match (self.config.trigger, self.last_fired) {
            (TriggerPolicy::Once, Some(_)) => None,
            (TriggerPolicy::Rolling { every_s }, Some(last)) if now - last < every_s => None,
            (trigger, _) => {
                self.last_fired = Some(now);
                let result = self.calculate(self.buffer.trailing(target), self.elapsed(now));
                if let TriggerPolicy::Rolling { .. } = trigger {
                    self.buffer.discard_before(now - target);
                }
                Some(result)
            }
        }
    }

    /// Run the pipeline on whatever is buffered, regardless of duration
    pub fn finish(&self, now: Seconds) -> MeasurementResult {
        self.calculate(self.buffer.as_slice(), self.elapsed(now))
    }

    /// Drop everything buffered so far
    ///
    /// Called when contact is lost: the next window has to span the target
    /// duration with unbroken signal, not with a gap in the middle.
    pub fn restart_window(&mut self) {
        if !self.buffer.is_empty() {
            log_info!("Discarding {} buffered samples after contact loss", self.buffer.len());
            self.buffer.clear();
        }
    }

    /// Mode this engine was built for
    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    /// True once the trigger has fired at least once
    pub fn has_fired(&self) -> bool {
        self.last_fired.is_some()
    }

    /// Buffered samples
    pub fn samples(&self) -> &[Sample] {
        self.buffer.as_slice()
    }

    /// Time from session start to `now`
    fn elapsed(&self, now: Seconds) -> Seconds {
        let origin = self
            .origin
            .or_else(|| self.buffer.as_slice().first().map(|s| s.timestamp))
            .unwrap_or(now);
        (now - origin).max(0.0)
    }

    /// Run the batch pipeline over `samples`
    ///
    /// Pure: reads configuration only, never the engine's buffer.
    pub fn calculate(&self, samples: &[Sample], elapsed: Seconds) -> MeasurementResult {
        let config = &self.config;
        let waveform: Vec<f32> = samples.iter().map(|s| s.filtered_value).collect();

        let guard = config.min_batch_samples();
        if samples.len() <= guard {
            log_info!("Calculation skipped: {} samples, need more than {}", samples.len(), guard);
            return self.zeroed(
                waveform,
                elapsed,
                Degradation::InsufficientData { required: guard + 1, available: samples.len() },
            );
        }

        if variance(&waveform) < DEGENERATE_VARIANCE {
            log_info!("Calculation skipped: flat signal");
            return self.zeroed(waveform, elapsed, Degradation::DegenerateInput);
        }

        let rate = stages::estimate_sample_rate(samples, config.sample_rate_hz);
        let window_s = (samples[samples.len() - 1].timestamp - samples[0].timestamp) as f32;

        let smoothed = smooth_symmetric(&waveform, config.smoothing_window);
        let detrended = detrend(&smoothed, stages::seconds_to_samples(config.detrend_window_s, rate));
        let threshold = config.peak_threshold_std * std_dev(&detrended);
        let peaks = stages::detect_peaks(
            &detrended,
            threshold,
            stages::seconds_to_samples(config.refractory_s, rate),
        );

        let intervals = stages::rr_intervals(samples, &peaks);
        let (accepted, rejected) = stages::filter_intervals(&intervals, config.min_rr_s, config.max_rr_s);

        let amplitude = stages::amplitude_score(std_dev(&waveform), config.quality_full_amplitude);
        let signal_quality = stages::signal_quality(&waveform, &smoothed, config.quality_full_amplitude);

        let mut result = MeasurementResult {
            session_id: self.session_id,
            mode: self.mode,
            average_bpm: 0.0,
            stability: 0.0,
            confidence: 0.0,
            signal_quality,
            peak_count: peaks.len(),
            valid_interval_count: accepted.len(),
            waveform_data: Vec::new(),
            detection_duration_seconds: elapsed,
            rhythm: None,
            degradation: None,
        };

        if accepted.is_empty() {
            log_info!("No plausible intervals among {} peaks", peaks.len());
            result.degradation = Some(Degradation::NoPlausibleIntervals { rejected });
            result.waveform_data = waveform;
            return result;
        }

        let acceptance = accepted.len() as f32 / intervals.len() as f32;
        result.average_bpm = stages::bpm_from_intervals(&accepted);
        result.stability = stages::stability(&accepted, config.stability_cv_ceiling);
        result.confidence = stages::confidence(
            stages::peak_score(peaks.len(), window_s),
            result.stability,
            amplitude,
            acceptance,
        );

        let hrv = hrv_metrics(&accepted);
        result.rhythm = hrv.and_then(|hrv| {
            irregular_risk(&accepted, Some(&hrv), &config.risk).map(|risk| RhythmAnalysis { hrv, risk })
        });
        if result.rhythm.is_none() {
            result.degradation = Some(Degradation::TooFewIntervals { available: accepted.len() });
        }

        log_debug!(
            "Session {}: {:.1} BPM from {} peaks, {} of {} intervals kept, quality {:.2}",
            self.session_id,
            result.average_bpm,
            peaks.len(),
            accepted.len(),
            intervals.len(),
            signal_quality
        );

        result.waveform_data = waveform;
        result
    }

    fn zeroed(&self, waveform: Vec<f32>, elapsed: Seconds, degradation: Degradation) -> MeasurementResult {
        MeasurementResult::zeroed(self.session_id, self.mode, waveform, elapsed, degradation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse(bpm: f32, seconds: f64, rate: f64) -> Vec<Sample> {
        let n = (seconds * rate) as usize + 1;
        (0..n)
            .map(|i| {
                let t = i as f64 / rate;
                let v = 3.0 * libm::sinf(2.0 * core::f32::consts::PI * bpm / 60.0 * t as f32);
                Sample { timestamp: t, raw_value: 180.0, filtered_value: v }
            })
            .collect()
    }

    fn engine(mode: DetectionMode) -> CalculationEngine {
        CalculationEngine::new(DetectionConfig::default(), mode, 7)
    }

    #[test]
    fn guard_returns_zeroed_result() {
        let e = engine(DetectionMode::Standard);
        let result = e.calculate(&pulse(72.0, 1.5, 30.0), 1.5);
        assert_eq!(result.average_bpm, 0.0);
        assert_eq!(result.session_id, 7);
        assert!(matches!(
            result.degradation,
            Some(Degradation::InsufficientData { required: 61, available: 46 })
        ));
    }

    #[test]
    fn flat_window_is_degenerate() {
        let e = engine(DetectionMode::Standard);
        let samples: Vec<Sample> = (0..300)
            .map(|i| Sample { timestamp: i as f64 / 30.0, raw_value: 0.0, filtered_value: 0.0 })
            .collect();
        let result = e.calculate(&samples, 10.0);
        assert_eq!(result.degradation, Some(Degradation::DegenerateInput));
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.signal_quality, 0.0);
        assert_eq!(result.waveform_data.len(), 300);
    }

    #[test]
    fn clean_pulse_is_measured() {
        let e = engine(DetectionMode::Standard);
        let result = e.calculate(&pulse(72.0, 20.0, 30.0), 20.0);
        assert!((result.average_bpm - 72.0).abs() < 2.0, "bpm {}", result.average_bpm);
        assert!(result.stability > 0.8);
        assert!(result.rhythm.is_some());
        assert!(result.degradation.is_none());
        assert!((22..=26).contains(&result.peak_count), "peaks {}", result.peak_count);
    }

    #[test]
    fn once_trigger_fires_a_single_time() {
        let mut e = engine(DetectionMode::Standard);
        let fired = pulse(72.0, 25.0, 30.0)
            .into_iter()
            .filter_map(|s| e.process_sample(s))
            .count();
        assert_eq!(fired, 1);
        assert!(e.has_fired());
    }

    #[test]
    fn rolling_trigger_refires() {
        let config = DetectionConfig::default().with_trigger(TriggerPolicy::Rolling { every_s: 2.0 });
        let mut e = CalculationEngine::new(config, DetectionMode::Standard, 1);
        e.set_origin(0.0);
        let results: Vec<MeasurementResult> = pulse(72.0, 26.5, 30.0)
            .into_iter()
            .filter_map(|s| e.process_sample(s))
            .collect();
        // fires at 20, 22, 24, 26 s
        assert_eq!(results.len(), 4);
        assert!(results[3].detection_duration_seconds > 25.9);
        // bounded by one window plus one refire interval
        assert!(e.samples().len() <= 22 * 30 + 1);
    }

    #[test]
    fn restarted_window_needs_full_duration_again() {
        let mut e = engine(DetectionMode::Standard);
        e.set_origin(0.0);
        let mut results = Vec::new();
        for (i, s) in pulse(72.0, 35.0, 30.0).into_iter().enumerate() {
            if i == 300 {
                e.restart_window();
                assert!(e.samples().is_empty());
            }
            results.extend(e.process_sample(s));
        }
        assert_eq!(results.len(), 1);
        // 10 s discarded, so the window completes at 30 s, not 20 s
        assert!(results[0].detection_duration_seconds >= 30.0 - 1e-9);
        assert!(results[0].waveform_data.len() >= 600);
    }

    #[test]
    fn confidence_ignores_raw_brightness() {
        let e = engine(DetectionMode::Standard);
        let steady = pulse(72.0, 20.0, 30.0);
        let flickering: Vec<Sample> = steady
            .iter()
            .enumerate()
            .map(|(i, s)| Sample { raw_value: if i % 2 == 0 { 90.0 } else { 250.0 }, ..*s })
            .collect();

        let a = e.calculate(&steady, 20.0);
        let b = e.calculate(&flickering, 20.0);
        assert_eq!(a.confidence.to_bits(), b.confidence.to_bits());
        assert_eq!(a.signal_quality.to_bits(), b.signal_quality.to_bits());
    }

    #[test]
    fn stale_timestamps_are_dropped() {
        let mut e = engine(DetectionMode::Standard);
        let s = Sample { timestamp: 1.0, raw_value: 0.0, filtered_value: 0.1 };
        assert!(e.process_sample(s).is_none());
        assert!(e.process_sample(Sample { timestamp: 0.5, ..s }).is_none());
        assert_eq!(e.samples().len(), 1);
    }
}
