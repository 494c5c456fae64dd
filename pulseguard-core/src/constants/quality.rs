//! Quality, Confidence and Rhythm Scoring
//!
//! Weights and calibration bands for the scores attached to every
//! measurement. None of these values are clinically validated; they are
//! the defaults of a heuristic and are exposed through
//! [`DetectionConfig`](crate::config::DetectionConfig) for recalibration.

// ===== FINGER PLACEMENT =====

/// Minimum mean red intensity for a covered lens (0-255).
///
/// With the torch on, a fingertip transmits a bright red glow. An uncovered
/// lens in a dim room falls below this.
pub const FINGER_MIN_RED: f32 = 60.0;

/// Maximum mean red intensity for a covered lens (0-255).
///
/// Fully saturated frames carry no pulsatile component.
pub const FINGER_MAX_RED: f32 = 254.0;

/// Minimum share of red in `r / (r + g + b)` for a covered lens.
///
/// Tissue absorbs green and blue strongly; a white wall does not.
pub const FINGER_MIN_RED_RATIO: f32 = 0.5;

/// Consecutive covered frames required to open the finger gate.
pub const FINGER_ENGAGE_FRAMES: u16 = 10;

/// Consecutive uncovered frames required to close the finger gate.
pub const FINGER_RELEASE_FRAMES: u16 = 5;

// ===== STABILITY =====

/// Coefficient of variation of RR intervals at which stability reaches zero.
pub const STABILITY_CV_CEILING: f32 = 0.4;

// ===== CONFIDENCE =====

/// Weight of the peak-count term in the confidence score.
pub const CONFIDENCE_WEIGHT_PEAKS: f32 = 0.35;

/// Weight of the regularity (stability) term in the confidence score.
pub const CONFIDENCE_WEIGHT_REGULARITY: f32 = 0.35;

/// Weight of the amplitude term in the confidence score.
pub const CONFIDENCE_WEIGHT_AMPLITUDE: f32 = 0.30;

// ===== SIGNAL QUALITY =====

/// Filtered-signal standard deviation that counts as full pulse amplitude
/// (intensity units).
///
/// Poor contact shows up as a pulse buried in quantization noise well below
/// one intensity step.
pub const QUALITY_FULL_AMPLITUDE: f32 = 0.5;

/// Variance below which a sequence is treated as constant.
pub const DEGENERATE_VARIANCE: f32 = 1e-9;

// ===== IRREGULAR RHYTHM (HEURISTIC) =====

/// Lower edge of the coefficient-of-variation calibration band.
pub const CV_BAND_LOW: f32 = 0.08;

/// Upper edge of the coefficient-of-variation calibration band.
pub const CV_BAND_HIGH: f32 = 0.22;

/// Lower edge of the RMSSD / mean RR calibration band.
pub const RMSSD_RATIO_BAND_LOW: f32 = 0.12;

/// Upper edge of the RMSSD / mean RR calibration band.
pub const RMSSD_RATIO_BAND_HIGH: f32 = 0.28;

/// Weight of the CV score in the combined irregular score.
pub const IRREGULAR_WEIGHT_CV: f32 = 0.6;

/// Weight of the RMSSD ratio score in the combined irregular score.
pub const IRREGULAR_WEIGHT_RMSSD: f32 = 0.4;

/// Irregular score at or above which the risk tier is High.
pub const RISK_HIGH_THRESHOLD: f32 = 0.66;

/// Irregular score at or above which the risk tier is Medium.
pub const RISK_MEDIUM_THRESHOLD: f32 = 0.33;
