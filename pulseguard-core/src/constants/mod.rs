//! Constants for PulseGuard Core
//!
//! This module provides centralized, documented constants used throughout
//! the PulseGuard signal chain. Every numeric default that feeds
//! [`DetectionConfig`](crate::config::DetectionConfig) lives here with a note on
//! where it comes from.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Physiology**: Plausible heart rates and beat-to-beat intervals
//! - **Filters**: Camera sampling rate, filter windows and band-pass corners
//! - **Time**: Session durations and warm-up
//! - **Quality**: Score weights, calibration bands and risk tiers
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Thresholds that users may want to recalibrate belong in
//!    `DetectionConfig`; these are only its defaults
//! 3. Use descriptive names that include units

/// Physiological limits on heart rate and RR intervals.
pub mod physiology;

/// Sampling rate, filter windows and pass-band corners.
pub mod filters;

/// Session durations, warm-up and live waveform sizing.
pub mod time;

/// Quality, confidence and irregular-rhythm scoring parameters.
pub mod quality;

// Re-export commonly used constants for convenience
pub use physiology::{
    MIN_PLAUSIBLE_BPM, MAX_PLAUSIBLE_BPM,
    MIN_RR_INTERVAL_S, MAX_RR_INTERVAL_S,
    MIN_INTERVALS_FOR_HRV,
};

pub use filters::{
    DEFAULT_SAMPLE_RATE_HZ, BANDPASS_LOW_HZ, BANDPASS_HIGH_HZ,
    MOVING_AVERAGE_WINDOW, SMOOTHING_WINDOW,
};

pub use time::{
    STANDARD_DURATION_S, DETAILED_DURATION_S, WARM_UP_SECONDS,
    SECONDS_PER_MINUTE,
};

pub use quality::{
    RISK_HIGH_THRESHOLD, RISK_MEDIUM_THRESHOLD,
    CV_BAND_LOW, CV_BAND_HIGH, RMSSD_RATIO_BAND_LOW, RMSSD_RATIO_BAND_HIGH,
};
