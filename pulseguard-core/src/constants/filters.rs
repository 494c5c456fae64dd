//! Sampling and Filter Parameters
//!
//! Defaults for the causal per-frame filter chain and the batch smoothing
//! performed at calculation time.

// ===== SAMPLING =====

/// Nominal camera frame rate (frames per second).
///
/// Phone cameras deliver 30 fps in the torch-on preview configurations used
/// for PPG. Actual rate is re-estimated from timestamps at calculation time.
pub const DEFAULT_SAMPLE_RATE_HZ: f32 = 30.0;

/// Lowest frame rate the configuration accepts.
///
/// The band-pass upper corner must stay below Nyquist, so anything under
/// ~10 fps cannot represent a 4 Hz pulse harmonic.
pub const MIN_SAMPLE_RATE_HZ: f32 = 10.0;

// ===== CAUSAL FILTER CHAIN =====

/// Moving-average window applied to raw intensities (samples).
///
/// Short on purpose: it only removes quantization and sensor noise and must
/// not smear the systolic upstroke.
pub const MOVING_AVERAGE_WINDOW: usize = 3;

/// Largest moving-average window the fixed-capacity filter can hold.
pub const MAX_MOVING_AVERAGE_WINDOW: usize = 32;

/// Band-pass lower corner (Hz), 30 BPM.
pub const BANDPASS_LOW_HZ: f32 = 0.5;

/// Band-pass upper corner (Hz), 240 BPM.
pub const BANDPASS_HIGH_HZ: f32 = 4.0;

/// Quality factor for each Butterworth biquad section (1/sqrt(2)).
pub const BUTTERWORTH_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

// ===== BATCH STAGES =====

/// Symmetric smoothing window applied before peak detection (samples).
pub const SMOOTHING_WINDOW: usize = 5;

/// Centred moving-mean window used for detrending (seconds).
///
/// Two seconds spans at least one full beat even at 30 BPM, so the local
/// mean tracks baseline drift but not the pulse itself.
pub const DETREND_WINDOW_S: f32 = 2.0;

/// Peak threshold as a multiple of the detrended signal's standard deviation.
pub const PEAK_THRESHOLD_STD: f32 = 0.5;
