//! Core traits and the sample type
//!
//! These define the two seams of the crate: what a camera frame must offer
//! ([`Frame`]) and how a finished measurement leaves it ([`ResultObserver`]).
//! Keep them small - the capture layer and the UI are someone else's code.

use crate::result::MeasurementResult;

/// Monotonic time in seconds
pub type Seconds = f64;

/// One processed observation
///
/// `filtered_value` is `0.0` while the finger gate is closed or the filters
/// are warming up; those samples never reach the calculation engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// Frame timestamp, strictly increasing within a session
    pub timestamp: Seconds,
    /// Extracted red-channel intensity (0-255)
    pub raw_value: f32,
    /// Band-pass filtered intensity
    pub filtered_value: f32,
}

impl Sample {
    /// A sample that carries no filtered signal (gated or warming up)
    pub fn unfiltered(timestamp: Seconds, raw_value: f32) -> Self {
        Self {
            timestamp,
            raw_value,
            filtered_value: 0.0,
        }
    }
}

/// An RGB triple in 0-255 units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

/// Source image for one sample
///
/// Only the channel extraction step looks at pixels; the format and
/// resolution are otherwise opaque. Implementations return `None` from
/// [`rgb_at`](Frame::rgb_at) for coordinates they cannot serve, which the
/// extractor treats as missing data rather than an error.
pub trait Frame {
    /// Capture time of this frame
    fn timestamp(&self) -> Seconds;

    /// Width in pixels
    fn width(&self) -> usize;

    /// Height in pixels
    fn height(&self) -> usize;

    /// Pixel at `(x, y)`, or `None` if out of range or unreadable
    fn rgb_at(&self, x: usize, y: usize) -> Option<Rgb>;
}

/// Receives finished measurements
///
/// Called on the thread that drives the session, so implementations must
/// not block. Closures implement this directly:
///
/// ```rust
/// use pulseguard_core::{DetectionSession, MeasurementResult};
///
/// let mut last_bpm = 0.0;
/// let session = DetectionSession::new(Default::default())?
///     .with_observer(move |result: &MeasurementResult| last_bpm = result.average_bpm);
/// # Ok::<(), pulseguard_core::ConfigError>(())
/// ```
pub trait ResultObserver {
    /// Called once per completed calculation
    fn on_result(&mut self, result: &MeasurementResult);
}

impl<F> ResultObserver for F
where
    F: FnMut(&MeasurementResult),
{
    fn on_result(&mut self, result: &MeasurementResult) {
        self(result)
    }
}

/// Hands results to another thread; a disconnected receiver is ignored
#[cfg(feature = "std")]
impl ResultObserver for std::sync::mpsc::Sender<MeasurementResult> {
    fn on_result(&mut self, result: &MeasurementResult) {
        let _ = self.send(result.clone());
    }
}

/// Trait for values that can be fed to the filters
pub trait Finite {
    /// True if the value is neither NaN nor infinite
    fn is_usable(&self) -> bool;
}

impl Finite for f32 {
    fn is_usable(&self) -> bool {
        self.is_finite()
    }
}

impl Finite for f64 {
    fn is_usable(&self) -> bool {
        self.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_sample_has_zero_output() {
        let sample = Sample::unfiltered(1.5, 200.0);
        assert_eq!(sample.filtered_value, 0.0);
        assert_eq!(sample.raw_value, 200.0);
    }

    #[test]
    fn finite_checks() {
        assert!(5.0f32.is_usable());
        assert!(!f32::NAN.is_usable());
        assert!(!f64::INFINITY.is_usable());
    }
}
