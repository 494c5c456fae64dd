//! Error and Degradation Types
//!
//! ## Design Philosophy
//!
//! The measurement path itself never fails. A camera stuck on one value, a
//! finger lifted halfway through or a window full of motion artifacts all
//! still produce a [`MeasurementResult`](crate::result::MeasurementResult);
//! what changes is the metric values and the attached [`Degradation`].
//!
//! Real errors only exist at the edges:
//!
//! - [`ConfigError`]: a [`DetectionConfig`](crate::config::DetectionConfig)
//!   that cannot produce a working filter chain (band-pass corner above
//!   Nyquist, zero-length windows, inverted calibration bands).
//!
//! Like the rest of the crate, both types are `Copy`, carry only
//! `&'static str` reasons and never allocate.
//!
//! ## Degradation Categories
//!
//! ### Not enough signal
//! - `InsufficientData`: fewer samples than the calculation guard requires
//! - `DegenerateInput`: the filtered sequence has (near) zero variance
//!
//! ### Artifacts
//! - `NoPlausibleIntervals`: peaks were found but every interval between them
//!   fell outside the physiological band and was dropped
//! - `TooFewIntervals`: BPM is available but HRV and irregular-rhythm
//!   metrics need more accepted intervals
//!
//! ```rust
//! use pulseguard_core::{Degradation, MeasurementResult};
//!
//! fn describe(result: &MeasurementResult) -> &'static str {
//!     match result.degradation {
//!         None => "ok",
//!         Some(Degradation::InsufficientData { .. }) => "keep your finger on the lens a little longer",
//!         Some(Degradation::DegenerateInput) => "no pulse visible, check the torch",
//!         Some(Degradation::NoPlausibleIntervals { .. }) => "too much movement, try again",
//!         Some(Degradation::TooFewIntervals { .. }) => "heart rate only",
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for configuration checks
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors - detected before a session starts
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Sample rate too low to carry the pulse band
    #[error("Sample rate {rate_hz} Hz below minimum {min_hz} Hz")]
    SampleRateTooLow {
        /// Configured sample rate
        rate_hz: f32,
        /// Lowest supported sample rate
        min_hz: f32,
    },

    /// Band-pass corners are inverted or exceed Nyquist
    #[error("Invalid pass band [{low_hz}, {high_hz}] Hz at {rate_hz} Hz sampling")]
    InvalidPassBand {
        /// Lower corner
        low_hz: f32,
        /// Upper corner
        high_hz: f32,
        /// Configured sample rate
        rate_hz: f32,
    },

    /// A window length is zero or exceeds the filter's fixed capacity
    #[error("Invalid window length {len} for {name} (max {max})")]
    InvalidWindow {
        /// Which window
        name: &'static str,
        /// Configured length
        len: usize,
        /// Largest supported length
        max: usize,
    },

    /// A lower/upper pair is inverted or empty
    #[error("Invalid range for {name}: [{low}, {high}]")]
    InvalidRange {
        /// Which parameter pair
        name: &'static str,
        /// Configured lower bound
        low: f32,
        /// Configured upper bound
        high: f32,
    },

    /// A parameter is NaN, infinite or has the wrong sign
    #[error("Invalid value for {name}")]
    InvalidValue {
        /// Which parameter
        name: &'static str,
    },
}

/// Why a measurement carries zeroed or partial metrics
///
/// These are reported, not raised: the presentation layer decides whether to
/// show a partial result or ask the user to try again.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Degradation {
    /// Not enough samples reached the calculation engine
    InsufficientData {
        /// Samples needed to run the pipeline (exclusive lower bound + 1)
        required: usize,
        /// Samples available
        available: usize,
    },

    /// The filtered signal is flat: no pulse to measure
    DegenerateInput,

    /// Every interval between detected peaks was physiologically implausible
    NoPlausibleIntervals {
        /// Intervals dropped by the plausibility band
        rejected: usize,
    },

    /// BPM was computed but HRV needs more accepted intervals
    TooFewIntervals {
        /// Accepted intervals
        available: usize,
    },
}

impl Degradation {
    /// True when no heart rate could be derived at all
    pub fn is_fatal_to_bpm(&self) -> bool {
        !matches!(self, Self::TooFewIntervals { .. })
    }

    /// Stable snake_case identifier for exported records
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "insufficient_data",
            Self::DegenerateInput => "degenerate_input",
            Self::NoPlausibleIntervals { .. } => "no_plausible_intervals",
            Self::TooFewIntervals { .. } => "too_few_intervals",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::SampleRateTooLow { rate_hz, min_hz } =>
                defmt::write!(fmt, "Sample rate {} below {}", rate_hz, min_hz),
            Self::InvalidPassBand { low_hz, high_hz, rate_hz } =>
                defmt::write!(fmt, "Pass band [{}, {}] at {} Hz", low_hz, high_hz, rate_hz),
            Self::InvalidWindow { name, len, max } =>
                defmt::write!(fmt, "Window {} = {} (max {})", name, len, max),
            Self::InvalidRange { name, low, high } =>
                defmt::write!(fmt, "Range {} = [{}, {}]", name, low, high),
            Self::InvalidValue { name } =>
                defmt::write!(fmt, "Invalid {}", name),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Degradation {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InsufficientData { required, available } =>
                defmt::write!(fmt, "Need {} samples, have {}", required, available),
            Self::DegenerateInput =>
                defmt::write!(fmt, "Degenerate input"),
            Self::NoPlausibleIntervals { rejected } =>
                defmt::write!(fmt, "All {} intervals rejected", rejected),
            Self::TooFewIntervals { available } =>
                defmt::write!(fmt, "Only {} intervals", available),
        }
    }
}
