//! Time-Related Constants
//!
//! Session durations and the warm-up period that lets the filter chain
//! settle after a finger is placed on the lens.

// ===== UNIT CONVERSIONS =====

/// Seconds per minute, for BPM conversion.
pub const SECONDS_PER_MINUTE: f32 = 60.0;

// ===== SESSION DURATIONS =====

/// Target collection time for a standard measurement (seconds).
pub const STANDARD_DURATION_S: f64 = 20.0;

/// Target collection time for a detailed measurement (seconds).
///
/// Longer windows give HRV metrics enough beats to be meaningful.
pub const DETAILED_DURATION_S: f64 = 60.0;

// ===== WARM-UP =====

/// Warm-up period after the finger gate opens (seconds).
///
/// Band-pass transients from the step in intensity when the finger covers
/// the lens take roughly one second to decay at the default corners.
pub const WARM_UP_SECONDS: f32 = 1.0;

// ===== LIVE WAVEFORM =====

/// Capacity of the live waveform ring (samples).
///
/// Five seconds at 30 fps, enough for a scrolling chart.
pub const LIVE_WAVEFORM_CAPACITY: usize = 150;
