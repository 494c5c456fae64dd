//! Measurement results
//!
//! A [`MeasurementResult`] is the terminal output of one calculation pass.
//! Heart-rate-variability and irregular-rhythm fields are derived from the
//! same interval set, so they are bundled into a single
//! [`RhythmAnalysis`] that is either present as a whole or absent.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::{
    config::DetectionMode,
    engine::{HrvMetrics, IrregularRisk, RiskLevel},
    errors::Degradation,
    traits::Seconds,
};

/// HRV and irregular-rhythm metrics from one accepted interval set
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RhythmAnalysis {
    /// SDNN / RMSSD / mean RR
    pub hrv: HrvMetrics,
    /// Heuristic irregular-rhythm score and tier
    pub risk: IrregularRisk,
}

/// Output of one calculation pass
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasurementResult {
    /// Session that produced this result
    pub session_id: u32,
    /// Mode the session ran in
    pub mode: DetectionMode,
    /// Mean heart rate over accepted intervals, 0 if none
    pub average_bpm: f32,
    /// Beat-to-beat regularity (0-1)
    pub stability: f32,
    /// Composite confidence in `average_bpm` (0-1)
    pub confidence: f32,
    /// Contact/noise quality of the filtered signal (0-1)
    pub signal_quality: f32,
    /// Peaks found in the window
    pub peak_count: usize,
    /// RR intervals that passed the plausibility band
    pub valid_interval_count: usize,
    /// Filtered signal before smoothing, for display
    pub waveform_data: Vec<f32>,
    /// Elapsed session time when the result was produced
    pub detection_duration_seconds: Seconds,
    /// Present only with enough accepted intervals
    pub rhythm: Option<RhythmAnalysis>,
    /// Why metrics are zeroed or partial, if they are
    pub degradation: Option<Degradation>,
}

impl MeasurementResult {
    /// A result with every metric at zero
    pub fn zeroed(
        session_id: u32,
        mode: DetectionMode,
        waveform_data: Vec<f32>,
        detection_duration_seconds: Seconds,
        degradation: Degradation,
    ) -> Self {
        Self {
            session_id,
            mode,
            average_bpm: 0.0,
            stability: 0.0,
            confidence: 0.0,
            signal_quality: 0.0,
            peak_count: 0,
            valid_interval_count: 0,
            waveform_data,
            detection_duration_seconds,
            rhythm: None,
            degradation: Some(degradation),
        }
    }

    /// True if a heart rate was measured
    pub fn has_heart_rate(&self) -> bool {
        self.average_bpm > 0.0
    }

    /// SDNN in milliseconds, if HRV was derived
    pub fn hrv_sdnn_ms(&self) -> Option<f32> {
        self.rhythm.map(|r| r.hrv.sdnn_ms)
    }

    /// RMSSD in milliseconds, if HRV was derived
    pub fn hrv_rmssd_ms(&self) -> Option<f32> {
        self.rhythm.map(|r| r.hrv.rmssd_ms)
    }

    /// Heuristic irregular-rhythm probability (0-1)
    pub fn af_risk_probability(&self) -> Option<f32> {
        self.rhythm.map(|r| r.risk.af_risk_probability)
    }

    /// Risk tier of the irregular-rhythm heuristic
    pub fn irregular_risk_level(&self) -> Option<RiskLevel> {
        self.rhythm.map(|r| r.risk.level)
    }

    /// Advisory, non-diagnostic text for the risk tier
    pub fn irregular_pulse_hint(&self) -> Option<&'static str> {
        self.rhythm.map(|r| r.risk.hint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{hrv_metrics, irregular_risk};
    use crate::config::RiskCalibration;

    #[test]
    fn zeroed_has_no_rhythm() {
        let result = MeasurementResult::zeroed(
            1,
            DetectionMode::Standard,
            Vec::new(),
            20.0,
            Degradation::DegenerateInput,
        );
        assert!(!result.has_heart_rate());
        assert!(result.hrv_sdnn_ms().is_none());
        assert!(result.irregular_risk_level().is_none());
        assert!(result.irregular_pulse_hint().is_none());
    }

    #[test]
    fn rhythm_accessors_read_through() {
        let intervals = [0.7, 0.8, 0.9];
        let hrv = hrv_metrics(&intervals).unwrap();
        let risk = irregular_risk(&intervals, Some(&hrv), &RiskCalibration::default()).unwrap();

        let mut result = MeasurementResult::zeroed(
            1,
            DetectionMode::Detailed,
            Vec::new(),
            60.0,
            Degradation::DegenerateInput,
        );
        result.rhythm = Some(RhythmAnalysis { hrv, risk });

        assert_eq!(result.hrv_rmssd_ms(), Some(hrv.rmssd_ms));
        assert_eq!(result.af_risk_probability(), Some(risk.af_risk_probability));
        assert_eq!(result.irregular_risk_level(), Some(risk.level));
    }
}
