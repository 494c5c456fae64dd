//! Frame Sampler
//!
//! ## Overview
//!
//! Turns camera frames into [`Sample`]s. Per frame:
//!
//! ```text
//! frame ──► extract_channels ──► FingerDetector ──► FilterChain ──► Sample
//!           (region mean)        (hysteresis)       (MA + band-pass)
//! ```
//!
//! ## Gating
//!
//! | Finger | Warm-up    | `filtered_value` | Forwarded |
//! |--------|------------|------------------|-----------|
//! | no     | -          | 0                | no        |
//! | yes    | in progress| 0                | no        |
//! | yes    | done       | band-pass output | yes       |
//!
//! Warm-up samples still pass through the filters so their state has
//! settled by the time output is trusted. When the finger is lost the
//! filters and the warm-up counter start over; the next placement is a
//! fresh step in intensity. [`Ingested::finger_lost`] marks that frame so
//! the caller can drop the samples it collected before the gap.
//!
//! Malformed frames are not errors. They produce `raw_value = 0`, which the
//! finger gate rejects like an uncovered lens.

pub mod extract;
pub mod finger;

pub use extract::{extract_channels, ChannelStats, ExtractionRegion, PixelBuffer, PixelFormat};
pub use finger::FingerDetector;

use crate::{
    config::DetectionConfig,
    dsp::FilterChain,
    traits::{Frame, Sample},
};

/// Where a sample ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleStatus {
    /// Finger gate closed
    NoFinger,
    /// Gated, but still inside the warm-up period
    WarmingUp,
    /// Filtered and forwarded to the calculation engine
    Valid,
}

/// Output of [`Sampler::ingest`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ingested {
    /// The emitted sample
    pub sample: Sample,
    /// Gate and warm-up state that produced it
    pub status: SampleStatus,
    /// The gate closed on this frame after having been open
    pub finger_lost: bool,
}

impl Ingested {
    /// True if the sample carries signal for the engine
    pub fn is_forwarded(&self) -> bool {
        self.status == SampleStatus::Valid
    }
}

/// Frame-to-sample reduction with finger gating and causal filtering
#[derive(Debug, Clone)]
pub struct Sampler {
    region: ExtractionRegion,
    pixel_step: usize,
    warm_up_samples: usize,
    finger: FingerDetector,
    filters: FilterChain,
    warmed: usize,
}

impl Sampler {
    /// Build a sampler from a validated configuration
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            region: config.region,
            pixel_step: config.pixel_step,
            warm_up_samples: config.warm_up_samples,
            finger: FingerDetector::new(config.finger),
            filters: FilterChain::new(config),
            warmed: 0,
        }
    }

    /// Reduce one frame to a sample
    pub fn ingest<F: Frame + ?Sized>(&mut self, frame: &F) -> Ingested {
        let timestamp = frame.timestamp();
        let stats = extract_channels(frame, self.region, self.pixel_step);
        if stats.is_empty() {
            log_debug!(
                "Unreadable {}x{} frame at {:.3}s",
                frame.width(),
                frame.height(),
                timestamp
            );
        }
        self.ingest_stats(timestamp, &stats)
    }

    /// Same as [`ingest`](Self::ingest) for channel means computed elsewhere
    pub fn ingest_stats(&mut self, timestamp: f64, stats: &ChannelStats) -> Ingested {
        let raw = stats.red;
        let was_placed = self.finger.is_placed();
        let placed = self.finger.update(stats);

        if !placed {
            if was_placed {
                log_info!("Finger lost at {:.3}s, filters reset", timestamp);
                self.filters.reset();
                self.warmed = 0;
            }
            return Ingested {
                sample: Sample::unfiltered(timestamp, raw),
                status: SampleStatus::NoFinger,
                finger_lost: was_placed,
            };
        }

        let filtered = self.filters.process(raw);

        if self.warmed < self.warm_up_samples {
            self.warmed += 1;
            if self.warmed == self.warm_up_samples {
                log_debug!("Warm-up complete at {:.3}s", timestamp);
            }
            return Ingested {
                sample: Sample::unfiltered(timestamp, raw),
                status: SampleStatus::WarmingUp,
                finger_lost: false,
            };
        }

        Ingested {
            sample: Sample {
                timestamp,
                raw_value: raw,
                filtered_value: filtered,
            },
            status: SampleStatus::Valid,
            finger_lost: false,
        }
    }

    /// Finger gate state
    pub fn finger_placed(&self) -> bool {
        self.finger.is_placed()
    }

    /// Gated samples consumed by warm-up so far
    pub fn warm_up_progress(&self) -> usize {
        self.warmed
    }

    /// Close the gate and return all filters to their initial state
    pub fn reset(&mut self) {
        self.finger.reset();
        self.filters.reset();
        self.warmed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FingerConfig;

    fn covered(red: f32) -> ChannelStats {
        ChannelStats { red, green: 20.0, blue: 15.0, pixels: 64 }
    }

    fn config() -> DetectionConfig {
        DetectionConfig {
            warm_up_samples: 4,
            finger: FingerConfig {
                engage_frames: 2,
                release_frames: 2,
                ..FingerConfig::default()
            },
            ..DetectionConfig::default()
        }
    }

    #[test]
    fn gate_then_warm_up_then_forward() {
        let mut sampler = Sampler::new(&config());
        let statuses: heapless::Vec<SampleStatus, 8> = (0..8)
            .map(|i| sampler.ingest_stats(i as f64 / 30.0, &covered(180.0)).status)
            .collect();

        assert_eq!(statuses[0], SampleStatus::NoFinger);
        // engaged on the second covered frame
        assert_eq!(statuses[1], SampleStatus::WarmingUp);
        assert_eq!(statuses[4], SampleStatus::WarmingUp);
        assert_eq!(statuses[5], SampleStatus::Valid);
    }

    #[test]
    fn ungated_and_warming_samples_are_zero() {
        let mut sampler = Sampler::new(&config());
        for i in 0..5 {
            let out = sampler.ingest_stats(i as f64, &covered(180.0 + i as f32));
            assert_eq!(out.sample.filtered_value, 0.0);
            assert!(!out.is_forwarded());
        }
    }

    #[test]
    fn finger_loss_restarts_warm_up() {
        let mut sampler = Sampler::new(&config());
        for i in 0..10 {
            sampler.ingest_stats(i as f64, &covered(180.0));
        }
        assert_eq!(sampler.warm_up_progress(), 4);

        let dark = ChannelStats::default();
        assert!(!sampler.ingest_stats(10.0, &dark).finger_lost);
        assert!(sampler.ingest_stats(11.0, &dark).finger_lost);
        assert!(!sampler.ingest_stats(11.5, &dark).finger_lost);
        assert!(!sampler.finger_placed());
        assert_eq!(sampler.warm_up_progress(), 0);

        sampler.ingest_stats(12.0, &covered(180.0));
        let out = sampler.ingest_stats(13.0, &covered(180.0));
        assert_eq!(out.status, SampleStatus::WarmingUp);
    }

    #[test]
    fn malformed_frame_is_ungated() {
        let mut sampler = Sampler::new(&config());
        let frame = PixelBuffer::new(&[], 0, 0, PixelFormat::Rgb8, 0.5);
        let out = sampler.ingest(&frame);
        assert_eq!(out.sample.raw_value, 0.0);
        assert_eq!(out.sample.timestamp, 0.5);
        assert_eq!(out.status, SampleStatus::NoFinger);
    }
}
