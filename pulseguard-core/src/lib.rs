//! Core signal chain for PulseGuard
//!
//! Camera photoplethysmography: a fingertip over the lens with the torch on,
//! one red-channel intensity per frame, and from that a heart rate,
//! beat-to-beat variability and a heuristic irregular-rhythm score.
//!
//! Key constraints:
//! - All computation on device, no model or dataset
//! - Frame callback never blocks or allocates beyond the sample buffer
//! - Degenerate input yields zeroed metrics, never NaN
//!
//! Nothing here is a medical device. The irregular-rhythm output is a
//! screening heuristic, not an arrhythmia classifier.
//!
//! ```no_run
//! use pulseguard_core::{DetectionConfig, DetectionMode, DetectionSession, MeasurementResult};
//! use pulseguard_core::sampler::{PixelBuffer, PixelFormat};
//!
//! let mut session = DetectionSession::new(DetectionConfig::default())?
//!     .with_observer(|result: &MeasurementResult| {
//!         println!("{:.0} BPM (confidence {:.2})", result.average_bpm, result.confidence);
//!     });
//!
//! session.start_session(DetectionMode::Standard);
//!
//! # let (bytes, width, height, timestamp) = (vec![0u8; 12], 2, 2, 0.0);
//! // From the camera callback:
//! let frame = PixelBuffer::new(&bytes, width, height, PixelFormat::Rgb8, timestamp);
//! session.ingest_frame(&frame);
//! # Ok::<(), pulseguard_core::ConfigError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[macro_use]
mod macros;

pub mod buffer;
pub mod config;
pub mod constants;
pub mod dsp;
pub mod engine;
pub mod errors;
pub mod result;
pub mod sampler;
pub mod session;
pub mod traits;

// Public API
pub use config::{DetectionConfig, DetectionMode, FingerConfig, RiskCalibration, TriggerPolicy};
pub use engine::{hrv_metrics, irregular_risk, CalculationEngine, HrvMetrics, IrregularRisk, RiskLevel};
pub use errors::{ConfigError, ConfigResult, Degradation};
pub use result::{MeasurementResult, RhythmAnalysis};
pub use session::{DetectionSession, SessionPhase};
pub use traits::{Frame, ResultObserver, Rgb, Sample, Seconds};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
