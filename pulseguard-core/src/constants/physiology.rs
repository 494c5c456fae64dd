//! Physiological Limits
//!
//! Bounds on what a human pulse can plausibly look like. These are used to
//! reject artifacts (motion, finger pressure changes, auto-exposure jumps)
//! rather than to describe any particular population.

// ===== HEART RATE =====

/// Lowest heart rate accepted as a real beat (beats per minute).
///
/// Below this, detected "beats" are almost always baseline wander or a
/// missed peak. Matches the longest accepted RR interval.
pub const MIN_PLAUSIBLE_BPM: f32 = 30.0;

/// Highest heart rate accepted as a real beat (beats per minute).
///
/// Above this, detected "beats" are almost always noise or a dicrotic notch
/// counted as a second peak. Matches the shortest accepted RR interval.
pub const MAX_PLAUSIBLE_BPM: f32 = 240.0;

// ===== RR INTERVALS =====

/// Shortest accepted beat-to-beat interval (seconds), 240 BPM.
pub const MIN_RR_INTERVAL_S: f32 = 0.25;

/// Longest accepted beat-to-beat interval (seconds), 30 BPM.
pub const MAX_RR_INTERVAL_S: f32 = 2.0;

/// Refractory distance between two detected peaks (seconds).
///
/// Two maxima closer than this cannot both be systolic peaks. Equal to the
/// shortest accepted interval.
pub const PEAK_REFRACTORY_S: f32 = MIN_RR_INTERVAL_S;

/// Minimum number of accepted RR intervals before HRV and irregular-rhythm
/// metrics are derived.
pub const MIN_INTERVALS_FOR_HRV: usize = 3;

/// Milliseconds per second, for RR interval conversion.
pub const MS_PER_S: f32 = 1000.0;
