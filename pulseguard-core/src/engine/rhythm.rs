//! Irregular-rhythm heuristic
//!
//! ## What This Is
//!
//! A fixed linear blend of two dispersion ratios of the RR intervals:
//!
//! ```text
//! cv          = SDNN  / mean RR
//! rmssd_ratio = RMSSD / mean RR
//!
//! cv_score    = clamp((cv          - cv_low)    / (cv_high    - cv_low))
//! rmssd_score = clamp((rmssd_ratio - rmssd_low) / (rmssd_high - rmssd_low))
//!
//! score       = clamp(0.6 * cv_score + 0.4 * rmssd_score)
//! ```
//!
//! ## What This Is Not
//!
//! It is not a trained classifier and it does not detect atrial
//! fibrillation. Ectopic beats, motion artifacts and missed peaks all raise
//! the score. The output is a screening hint and the text attached to each
//! tier says so.

use crate::{config::RiskCalibration, dsp::clamp_unit};

use super::hrv::HrvMetrics;

/// Tier of the irregular-rhythm score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RiskLevel {
    /// Below the medium threshold
    Low,
    /// At or above the medium threshold
    Medium,
    /// At or above the high threshold
    High,
}

impl RiskLevel {
    /// Map a score to a tier; both thresholds are inclusive lower bounds
    pub fn from_score(score: f32, calibration: &RiskCalibration) -> Self {
        if score >= calibration.high_threshold {
            Self::High
        } else if score >= calibration.medium_threshold {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Fixed advisory text. Never diagnostic.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Low => "Pulse rhythm looked regular during this measurement.",
            Self::Medium => {
                "Some beat-to-beat irregularity was seen. Stay still and measure again; \
                 this is not a diagnosis."
            }
            Self::High => {
                "Pronounced pulse irregularity was seen. This is not a diagnosis; \
                 if it persists, talk to a healthcare professional."
            }
        }
    }

    /// Lowercase name used in exported records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Heuristic irregular-rhythm score and its tier
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IrregularRisk {
    /// Combined score in `[0, 1]`; a heuristic, not a calibrated probability
    pub af_risk_probability: f32,
    /// Tier of the score
    pub level: RiskLevel,
}

impl IrregularRisk {
    /// Advisory text for this tier
    pub fn hint(&self) -> &'static str {
        self.level.hint()
    }
}

/// Combined score from the two dispersion ratios
pub fn irregular_score(cv: f32, rmssd_ratio: f32, calibration: &RiskCalibration) -> f32 {
    let c = calibration;
    let cv_score = clamp_unit((cv - c.cv_low) / (c.cv_high - c.cv_low));
    let rmssd_score =
        clamp_unit((rmssd_ratio - c.rmssd_ratio_low) / (c.rmssd_ratio_high - c.rmssd_ratio_low));
    clamp_unit(c.weight_cv * cv_score + c.weight_rmssd * rmssd_score)
}

/// Score the interval set, given its HRV metrics
///
/// `None` with fewer than three intervals or without HRV.
pub fn irregular_risk(
    intervals_s: &[f32],
    hrv: Option<&HrvMetrics>,
    calibration: &RiskCalibration,
) -> Option<IrregularRisk> {
    if intervals_s.len() < crate::constants::MIN_INTERVALS_FOR_HRV {
        return None;
    }
    let hrv = hrv?;

    let (cv, rmssd_ratio) = if hrv.mean_rr_ms > 0.0 {
        (hrv.sdnn_ms / hrv.mean_rr_ms, hrv.rmssd_ms / hrv.mean_rr_ms)
    } else {
        (0.0, 0.0)
    };

    let score = irregular_score(cv, rmssd_ratio, calibration);
    Some(IrregularRisk {
        af_risk_probability: score,
        level: RiskLevel::from_score(score, calibration),
    })
}
