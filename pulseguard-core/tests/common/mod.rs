//! Common test utilities and synthetic camera data for integration tests
//!
//! This module provides:
//! - A solid-colour [`Frame`] whose red channel carries a pulse
//! - A seeded PPG frame generator (no external randomness, deterministic)
//! - Helpers to drive a [`DetectionSession`] and collect what it emits

#![allow(dead_code)]

pub mod generators;

use pulseguard_core::{
    DetectionSession, Frame, MeasurementResult, Rgb, Seconds,
};

/// Camera frame where every pixel has the same colour
#[derive(Debug, Clone, Copy)]
pub struct SolidFrame {
    pub timestamp: Seconds,
    pub rgb: Rgb,
    pub width: usize,
    pub height: usize,
}

impl Frame for SolidFrame {
    fn timestamp(&self) -> Seconds {
        self.timestamp
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn rgb_at(&self, x: usize, y: usize) -> Option<Rgb> {
        (x < self.width && y < self.height).then_some(self.rgb)
    }
}

/// Fingertip-over-torch PPG generator
///
/// Red sits around `dc_red` and pulses by `amplitude` at `bpm`; green and
/// blue stay low as they do through tissue.
pub struct PpgGenerator {
    pub rate_hz: f64,
    pub bpm: f64,
    pub dc_red: f64,
    pub amplitude: f64,
    pub noise: f64,
    seed: u32,
}

impl PpgGenerator {
    /// 72 BPM, red 180 ± 6, 30 fps, no noise
    pub fn new() -> Self {
        Self {
            rate_hz: 30.0,
            bpm: 72.0,
            dc_red: 180.0,
            amplitude: 6.0,
            noise: 0.0,
            seed: 42,
        }
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Frames covering `[start_s, start_s + seconds)`
    pub fn frames(&mut self, start_s: f64, seconds: f64) -> Vec<SolidFrame> {
        let n = (seconds * self.rate_hz).round() as usize;
        let first = (start_s * self.rate_hz).round() as usize;
        (first..first + n)
            .map(|i| {
                let t = i as f64 / self.rate_hz;
                let phase = 2.0 * std::f64::consts::PI * self.bpm / 60.0 * t;
                let red = self.dc_red + self.amplitude * phase.sin() + self.random_noise(self.noise);
                SolidFrame {
                    timestamp: t,
                    rgb: Rgb { r: red.round().clamp(0.0, 255.0) as u8, g: 22, b: 14 },
                    width: 8,
                    height: 8,
                }
            })
            .collect()
    }

    fn random_noise(&mut self, amplitude: f64) -> f64 {
        // LCG, uniform in [-amplitude, amplitude]
        self.seed = self.seed.wrapping_mul(1664525).wrapping_add(1013904223);
        let uniform = self.seed as f64 / u32::MAX as f64;
        (uniform - 0.5) * 2.0 * amplitude
    }
}

/// Black frames, as from a covered lens with the torch off
pub fn zero_frames(rate_hz: f64, seconds: f64) -> Vec<SolidFrame> {
    let n = (seconds * rate_hz).round() as usize;
    (0..n)
        .map(|i| SolidFrame {
            timestamp: i as f64 / rate_hz,
            rgb: Rgb::default(),
            width: 8,
            height: 8,
        })
        .collect()
}

/// Feed every frame; collect whatever the session emitted for polling
pub fn drive(session: &mut DetectionSession, frames: &[SolidFrame]) -> Vec<MeasurementResult> {
    let mut results = Vec::new();
    for frame in frames {
        session.ingest_frame(frame);
        if let Some(result) = session.take_result() {
            results.push(result);
        }
    }
    results
}

/// Assert every float in a result is finite
pub fn assert_all_finite(result: &MeasurementResult) {
    let scalars = [
        result.average_bpm,
        result.stability,
        result.confidence,
        result.signal_quality,
    ];
    for v in scalars {
        assert!(v.is_finite(), "non-finite metric in {result:?}");
    }
    assert!(result.detection_duration_seconds.is_finite());
    assert!(result.waveform_data.iter().all(|v| v.is_finite()));
    if let Some(rhythm) = result.rhythm {
        assert!(rhythm.hrv.sdnn_ms.is_finite());
        assert!(rhythm.hrv.rmssd_ms.is_finite());
        assert!(rhythm.risk.af_risk_probability.is_finite());
    }
}
