//! Signal Processing Primitives
//!
//! ## Overview
//!
//! Two families of filters live here, and they are deliberately kept apart:
//!
//! - **Causal, per-sample** ([`filters`]): run on the frame-delivery path, one
//!   call per camera frame. State is held in small structs that the session
//!   owns exclusively and resets on every start, so no filter history can
//!   leak from one measurement into the next.
//! - **Batch, whole-window** ([`smoothing`], [`stats`]): pure functions over
//!   slices, used by the calculation engine. They may look both ways in time
//!   (symmetric windows), never mutate their input and have no hidden state,
//!   so calling them twice on the same data gives identical output.
//!
//! ## Filter Chain
//!
//! ```text
//! raw ──► MovingAverage(3) ──► HighPass(0.5 Hz) ──► LowPass(4 Hz) ──► filtered
//!         quantization noise    baseline / DC       camera noise
//! ```
//!
//! Both band-pass sections are second-order Butterworth biquads designed
//! from the configured sample rate. On the first input after a reset every
//! stage is primed to its steady state for that input, which removes the
//! large step transient that a ~200 intensity DC level would otherwise
//! push through the high-pass section.

pub mod filters;
pub mod smoothing;
pub mod stats;

pub use filters::{Biquad, BandPass, FilterChain, MovingAverage};
pub use smoothing::{centred_moving_mean, detrend, smooth_symmetric};
pub use stats::{clamp_unit, coefficient_of_variation, mean, std_dev, variance};
