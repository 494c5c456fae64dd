//! Detection Configuration
//!
//! Every tunable threshold of the signal chain lives in one place:
//! [`DetectionConfig`]. Defaults come from [`crate::constants`]; the
//! values that matter most for recalibration are grouped into
//! [`FingerConfig`] (placement gating) and [`RiskCalibration`] (the
//! irregular-rhythm heuristic).
//!
//! None of the defaults are clinically validated. Channel weighting and
//! finger thresholds in particular depend on the phone, its torch and
//! its auto-exposure behaviour, and should be checked empirically per
//! device family.
//!
//! ```rust
//! use pulseguard_core::config::{DetectionConfig, DetectionMode};
//!
//! // A camera stuck at 24 fps: rescale the sample-count based defaults
//! let config = DetectionConfig::for_frame_rate(24.0);
//! config.validate()?;
//!
//! assert_eq!(config.warm_up_samples, 24);
//! assert_eq!(DetectionMode::Detailed.target_duration_s(), 60.0);
//! # Ok::<(), pulseguard_core::ConfigError>(())
//! ```

use crate::{
    constants::{filters, physiology, quality, time},
    errors::{ConfigError, ConfigResult},
    sampler::ExtractionRegion,
};

/// Measurement mode, selecting the collection window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DetectionMode {
    /// 20 second heart-rate check
    #[default]
    Standard,
    /// 60 second measurement intended for HRV
    Detailed,
}

impl DetectionMode {
    /// Collection window for this mode (seconds)
    pub fn target_duration_s(&self) -> f64 {
        match self {
            Self::Standard => time::STANDARD_DURATION_S,
            Self::Detailed => time::DETAILED_DURATION_S,
        }
    }

    /// Lowercase name used in exported records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Detailed => "detailed",
        }
    }
}

/// When the calculation engine runs its batch pipeline
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerPolicy {
    /// Fire exactly once, when the buffer first spans the target duration
    #[default]
    Once,
    /// Fire at the target duration, then again every `every_s` seconds over
    /// a trailing window of the target duration
    Rolling {
        /// Seconds between recalculations
        every_s: f64,
    },
}

/// Finger-placement gate thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FingerConfig {
    /// Minimum mean red intensity (0-255) for a covered lens
    pub min_red: f32,
    /// Maximum mean red intensity; above this the sensor is saturated
    pub max_red: f32,
    /// Minimum `r / (r + g + b)` for a covered lens
    pub min_red_ratio: f32,
    /// Consecutive covered frames before the gate opens
    pub engage_frames: u16,
    /// Consecutive uncovered frames before the gate closes
    pub release_frames: u16,
}

impl Default for FingerConfig {
    fn default() -> Self {
        Self {
            min_red: quality::FINGER_MIN_RED,
            max_red: quality::FINGER_MAX_RED,
            min_red_ratio: quality::FINGER_MIN_RED_RATIO,
            engage_frames: quality::FINGER_ENGAGE_FRAMES,
            release_frames: quality::FINGER_RELEASE_FRAMES,
        }
    }
}

/// Calibration of the irregular-rhythm heuristic
///
/// The score is a fixed linear blend of two clamped ratios. It is not a
/// trained classifier and not an AF detector; see
/// [`irregular_risk`](crate::engine::irregular_risk).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskCalibration {
    /// CV at which the CV score starts rising from 0
    pub cv_low: f32,
    /// CV at which the CV score saturates at 1
    pub cv_high: f32,
    /// RMSSD / mean RR at which its score starts rising from 0
    pub rmssd_ratio_low: f32,
    /// RMSSD / mean RR at which its score saturates at 1
    pub rmssd_ratio_high: f32,
    /// Weight of the CV score
    pub weight_cv: f32,
    /// Weight of the RMSSD ratio score
    pub weight_rmssd: f32,
    /// Score at or above which the tier is High
    pub high_threshold: f32,
    /// Score at or above which the tier is Medium
    pub medium_threshold: f32,
}

impl Default for RiskCalibration {
    fn default() -> Self {
        Self {
            cv_low: quality::CV_BAND_LOW,
            cv_high: quality::CV_BAND_HIGH,
            rmssd_ratio_low: quality::RMSSD_RATIO_BAND_LOW,
            rmssd_ratio_high: quality::RMSSD_RATIO_BAND_HIGH,
            weight_cv: quality::IRREGULAR_WEIGHT_CV,
            weight_rmssd: quality::IRREGULAR_WEIGHT_RMSSD,
            high_threshold: quality::RISK_HIGH_THRESHOLD,
            medium_threshold: quality::RISK_MEDIUM_THRESHOLD,
        }
    }
}

/// Complete configuration of one detection session
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectionConfig {
    /// Nominal frame rate (Hz); used for filter design and the batch guard
    pub sample_rate_hz: f32,

    /// Region of the frame averaged into the raw intensity
    pub region: ExtractionRegion,
    /// Pixel stride when averaging (1 = every pixel)
    pub pixel_step: usize,
    /// Finger-placement gate
    pub finger: FingerConfig,
    /// Gated samples discarded while the filters settle
    pub warm_up_samples: usize,

    /// Causal moving-average window (samples)
    pub moving_average_window: usize,
    /// Band-pass lower corner (Hz)
    pub bandpass_low_hz: f32,
    /// Band-pass upper corner (Hz)
    pub bandpass_high_hz: f32,

    /// Symmetric smoothing window before peak detection (samples)
    pub smoothing_window: usize,
    /// Detrending window (seconds)
    pub detrend_window_s: f32,
    /// Peak threshold in standard deviations of the detrended signal
    pub peak_threshold_std: f32,
    /// Minimum distance between peaks (seconds)
    pub refractory_s: f32,
    /// Shortest accepted RR interval (seconds)
    pub min_rr_s: f32,
    /// Longest accepted RR interval (seconds)
    pub max_rr_s: f32,

    /// RR coefficient of variation at which stability reaches 0
    pub stability_cv_ceiling: f32,
    /// Filtered standard deviation counted as full pulse amplitude
    pub quality_full_amplitude: f32,
    /// Irregular-rhythm heuristic calibration
    pub risk: RiskCalibration,

    /// When the engine fires
    pub trigger: TriggerPolicy,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: filters::DEFAULT_SAMPLE_RATE_HZ,
            region: ExtractionRegion::default(),
            pixel_step: 2,
            finger: FingerConfig::default(),
            warm_up_samples: warm_up_for(filters::DEFAULT_SAMPLE_RATE_HZ),
            moving_average_window: filters::MOVING_AVERAGE_WINDOW,
            bandpass_low_hz: filters::BANDPASS_LOW_HZ,
            bandpass_high_hz: filters::BANDPASS_HIGH_HZ,
            smoothing_window: filters::SMOOTHING_WINDOW,
            detrend_window_s: filters::DETREND_WINDOW_S,
            peak_threshold_std: filters::PEAK_THRESHOLD_STD,
            refractory_s: physiology::PEAK_REFRACTORY_S,
            min_rr_s: physiology::MIN_RR_INTERVAL_S,
            max_rr_s: physiology::MAX_RR_INTERVAL_S,
            stability_cv_ceiling: quality::STABILITY_CV_CEILING,
            quality_full_amplitude: quality::QUALITY_FULL_AMPLITUDE,
            risk: RiskCalibration::default(),
            trigger: TriggerPolicy::Once,
        }
    }
}

/// Warm-up sample count for a frame rate (one second's worth)
fn warm_up_for(rate_hz: f32) -> usize {
    libm::roundf(rate_hz * time::WARM_UP_SECONDS).max(1.0) as usize
}

impl DetectionConfig {
    /// Defaults rescaled for a camera delivering `fps` frames per second
    pub fn for_frame_rate(fps: f32) -> Self {
        Self {
            sample_rate_hz: fps,
            warm_up_samples: warm_up_for(fps),
            ..Self::default()
        }
    }

    /// Looser placement gate for phones with a weak torch
    pub fn low_light() -> Self {
        Self {
            finger: FingerConfig {
                min_red: 35.0,
                min_red_ratio: 0.45,
                ..FingerConfig::default()
            },
            ..Self::default()
        }
    }

    /// Builder-style trigger policy override
    pub fn with_trigger(mut self, trigger: TriggerPolicy) -> Self {
        self.trigger = trigger;
        self
    }

    /// Samples required before the batch pipeline runs (exclusive bound)
    ///
    /// Two seconds of nominal samples.
    pub fn min_batch_samples(&self) -> usize {
        (self.sample_rate_hz * 2.0) as usize
    }

    /// Check that the configuration can build a working filter chain
    pub fn validate(&self) -> ConfigResult<()> {
        let finite = [
            ("sample_rate_hz", self.sample_rate_hz),
            ("bandpass_low_hz", self.bandpass_low_hz),
            ("bandpass_high_hz", self.bandpass_high_hz),
            ("detrend_window_s", self.detrend_window_s),
            ("peak_threshold_std", self.peak_threshold_std),
            ("refractory_s", self.refractory_s),
            ("stability_cv_ceiling", self.stability_cv_ceiling),
            ("quality_full_amplitude", self.quality_full_amplitude),
        ];
        for (name, value) in finite {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue { name });
            }
        }

        if self.sample_rate_hz < filters::MIN_SAMPLE_RATE_HZ {
            return Err(ConfigError::SampleRateTooLow {
                rate_hz: self.sample_rate_hz,
                min_hz: filters::MIN_SAMPLE_RATE_HZ,
            });
        }

        let nyquist = self.sample_rate_hz / 2.0;
        if self.bandpass_low_hz >= self.bandpass_high_hz || self.bandpass_high_hz >= nyquist {
            return Err(ConfigError::InvalidPassBand {
                low_hz: self.bandpass_low_hz,
                high_hz: self.bandpass_high_hz,
                rate_hz: self.sample_rate_hz,
            });
        }

        check_window("moving_average_window", self.moving_average_window, filters::MAX_MOVING_AVERAGE_WINDOW)?;
        check_window("smoothing_window", self.smoothing_window, usize::MAX)?;
        check_window("pixel_step", self.pixel_step, usize::MAX)?;
        self.region.validate()?;

        check_range("rr_interval", self.min_rr_s, self.max_rr_s)?;
        check_range("finger_red", self.finger.min_red, self.finger.max_red)?;
        if !(0.0..=1.0).contains(&self.finger.min_red_ratio) {
            return Err(ConfigError::InvalidValue { name: "finger.min_red_ratio" });
        }
        if self.finger.engage_frames == 0 || self.finger.release_frames == 0 {
            return Err(ConfigError::InvalidValue { name: "finger hysteresis frames" });
        }

        let risk = &self.risk;
        check_range("risk.cv", risk.cv_low, risk.cv_high)?;
        check_range("risk.rmssd_ratio", risk.rmssd_ratio_low, risk.rmssd_ratio_high)?;
        check_range("risk.tiers", risk.medium_threshold, risk.high_threshold)?;

        if let TriggerPolicy::Rolling { every_s } = self.trigger {
            if !every_s.is_finite() || every_s <= 0.0 {
                return Err(ConfigError::InvalidValue { name: "trigger.every_s" });
            }
        }

        Ok(())
    }
}

fn check_window(name: &'static str, len: usize, max: usize) -> ConfigResult<()> {
    if len == 0 || len > max {
        return Err(ConfigError::InvalidWindow { name, len, max });
    }
    Ok(())
}

fn check_range(name: &'static str, low: f32, high: f32) -> ConfigResult<()> {
    if !low.is_finite() || !high.is_finite() || low >= high {
        return Err(ConfigError::InvalidRange { name, low, high });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(DetectionConfig::default().validate().is_ok());
        assert!(DetectionConfig::low_light().validate().is_ok());
    }

    #[test]
    fn warm_up_is_one_second() {
        assert_eq!(DetectionConfig::default().warm_up_samples, 30);
        assert_eq!(DetectionConfig::for_frame_rate(60.0).warm_up_samples, 60);
    }

    #[test]
    fn pass_band_above_nyquist_rejected() {
        let config = DetectionConfig {
            bandpass_high_hz: 8.0,
            ..DetectionConfig::for_frame_rate(12.0)
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPassBand { .. })));
    }

    #[test]
    fn slow_camera_rejected() {
        let config = DetectionConfig::for_frame_rate(5.0);
        assert!(matches!(config.validate(), Err(ConfigError::SampleRateTooLow { .. })));
    }

    #[test]
    fn oversized_moving_average_rejected() {
        let config = DetectionConfig {
            moving_average_window: filters::MAX_MOVING_AVERAGE_WINDOW + 1,
            ..DetectionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWindow { .. })));
    }

    #[test]
    fn inverted_risk_band_rejected() {
        let mut config = DetectionConfig::default();
        config.risk.cv_low = 0.3;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRange { name: "risk.cv", .. })));
    }

    #[test]
    fn mode_durations() {
        assert_eq!(DetectionMode::Standard.target_duration_s(), 20.0);
        assert_eq!(DetectionMode::Detailed.target_duration_s(), 60.0);
        assert_eq!(DetectionMode::default(), DetectionMode::Standard);
    }

    #[test]
    fn trigger_defaults_to_once() {
        assert_eq!(TriggerPolicy::default(), TriggerPolicy::Once);
        assert_eq!(DetectionConfig::default().trigger, TriggerPolicy::default());
    }

    #[test]
    fn guard_is_two_seconds_of_samples() {
        assert_eq!(DetectionConfig::default().min_batch_samples(), 60);
    }
}
