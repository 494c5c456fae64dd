//! Causal filters for the per-frame path
//!
//! Every filter here is a plain struct with `process(x) -> y` and `reset()`.
//! Nothing is global; a session owns one [`FilterChain`] and passes it
//! around by `&mut`.

use heapless::Deque;

use crate::{
    config::DetectionConfig,
    constants::filters::{BUTTERWORTH_Q, MAX_MOVING_AVERAGE_WINDOW},
};

/// Causal moving average over the last `window` inputs
///
/// Storage is fixed at [`MAX_MOVING_AVERAGE_WINDOW`]; the active window is
/// chosen at runtime.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    history: Deque<f32, MAX_MOVING_AVERAGE_WINDOW>,
    window: usize,
}

impl MovingAverage {
    /// Create a moving average; `window` is clamped to `1..=MAX_MOVING_AVERAGE_WINDOW`
    pub fn new(window: usize) -> Self {
        Self {
            history: Deque::new(),
            window: window.clamp(1, MAX_MOVING_AVERAGE_WINDOW),
        }
    }

    /// Active window length
    pub fn window(&self) -> usize {
        self.window
    }

    /// Fill the window with `x`, as if it had been constant forever
    pub fn prime(&mut self, x: f32) {
        self.history.clear();
        for _ in 0..self.window {
            // capacity >= window, cannot fail
            let _ = self.history.push_back(x);
        }
    }

    /// Feed one input, return the mean of the current window
    pub fn process(&mut self, x: f32) -> f32 {
        if self.history.len() >= self.window {
            self.history.pop_front();
        }
        let _ = self.history.push_back(x);

        // Re-summing at most 32 values avoids long-run drift of a running sum
        let sum: f32 = self.history.iter().sum();
        sum / self.history.len() as f32
    }

    /// Forget all history
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

/// Second-order IIR section (direct form I), normalized so `a0 = 1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    fn from_coefficients(b: [f32; 3], a: [f32; 3]) -> Self {
        let a0 = a[0];
        Self {
            b0: b[0] / a0,
            b1: b[1] / a0,
            b2: b[2] / a0,
            a1: a[1] / a0,
            a2: a[2] / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Returns `(cos w0, alpha)` for the RBJ cookbook designs
    fn prewarp(cutoff_hz: f32, sample_rate_hz: f32, q: f32) -> (f32, f32) {
        let w0 = 2.0 * core::f32::consts::PI * cutoff_hz / sample_rate_hz;
        (libm::cosf(w0), libm::sinf(w0) / (2.0 * q))
    }

    /// Low-pass section with corner `cutoff_hz`
    pub fn low_pass(cutoff_hz: f32, sample_rate_hz: f32, q: f32) -> Self {
        let (cos_w0, alpha) = Self::prewarp(cutoff_hz, sample_rate_hz, q);
        let b1 = 1.0 - cos_w0;
        Self::from_coefficients(
            [b1 / 2.0, b1, b1 / 2.0],
            [1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha],
        )
    }

    /// High-pass section with corner `cutoff_hz`
    pub fn high_pass(cutoff_hz: f32, sample_rate_hz: f32, q: f32) -> Self {
        let (cos_w0, alpha) = Self::prewarp(cutoff_hz, sample_rate_hz, q);
        let b0 = (1.0 + cos_w0) / 2.0;
        Self::from_coefficients(
            [b0, -(1.0 + cos_w0), b0],
            [1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha],
        )
    }

    /// Gain at DC
    pub fn dc_gain(&self) -> f32 {
        let den = 1.0 + self.a1 + self.a2;
        if libm::fabsf(den) < f32::EPSILON {
            return 0.0;
        }
        (self.b0 + self.b1 + self.b2) / den
    }

    /// Set the delay line to the steady state for a constant input `x`
    pub fn prime(&mut self, x: f32) {
        let y = x * self.dc_gain();
        self.x1 = x;
        self.x2 = x;
        self.y1 = y;
        self.y2 = y;
    }

    /// Feed one input
    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }

    /// Zero the delay line, keeping coefficients
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// Butterworth band-pass as a high-pass section followed by a low-pass section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPass {
    high_pass: Biquad,
    low_pass: Biquad,
}

impl BandPass {
    /// Pass band `[low_hz, high_hz]` at `sample_rate_hz`
    pub fn new(low_hz: f32, high_hz: f32, sample_rate_hz: f32) -> Self {
        Self {
            high_pass: Biquad::high_pass(low_hz, sample_rate_hz, BUTTERWORTH_Q),
            low_pass: Biquad::low_pass(high_hz, sample_rate_hz, BUTTERWORTH_Q),
        }
    }

    /// Prime both sections for a constant input `x`
    pub fn prime(&mut self, x: f32) {
        self.high_pass.prime(x);
        let hp_steady = x * self.high_pass.dc_gain();
        self.low_pass.prime(hp_steady);
    }

    /// Feed one input
    pub fn process(&mut self, x: f32) -> f32 {
        let hp = self.high_pass.process(x);
        self.low_pass.process(hp)
    }

    /// Zero both delay lines
    pub fn reset(&mut self) {
        self.high_pass.reset();
        self.low_pass.reset();
    }
}

/// Moving average followed by band-pass, primed on its first input
#[derive(Debug, Clone)]
pub struct FilterChain {
    moving_average: MovingAverage,
    band_pass: BandPass,
    primed: bool,
}

impl FilterChain {
    /// Build the chain described by `config`
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            moving_average: MovingAverage::new(config.moving_average_window),
            band_pass: BandPass::new(
                config.bandpass_low_hz,
                config.bandpass_high_hz,
                config.sample_rate_hz,
            ),
            primed: false,
        }
    }

    /// Feed one raw intensity, return the band-passed value
    pub fn process(&mut self, raw: f32) -> f32 {
        if !self.primed {
            self.moving_average.prime(raw);
            self.band_pass.prime(raw);
            self.primed = true;
        }
        let smoothed = self.moving_average.process(raw);
        self.band_pass.process(smoothed)
    }

    /// Return to the unprimed state
    pub fn reset(&mut self) {
        self.moving_average.reset();
        self.band_pass.reset();
        self.primed = false;
    }

    /// True once the chain has seen an input since the last reset
    pub fn is_primed(&self) -> bool {
        self.primed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f32, rate_hz: f32, n: usize) -> impl Iterator<Item = f32> {
        (0..n).map(move |i| {
            libm::sinf(2.0 * core::f32::consts::PI * freq_hz * i as f32 / rate_hz)
        })
    }

    fn peak_abs(values: impl Iterator<Item = f32>) -> f32 {
        values.fold(0.0f32, |acc, v| acc.max(libm::fabsf(v)))
    }

    #[test]
    fn moving_average_window() {
        let mut ma = MovingAverage::new(3);
        assert_eq!(ma.process(3.0), 3.0);
        assert_eq!(ma.process(6.0), 4.5);
        assert_eq!(ma.process(9.0), 6.0);
        // oldest (3.0) drops out
        assert_eq!(ma.process(12.0), 9.0);
    }

    #[test]
    fn moving_average_clamps_window() {
        assert_eq!(MovingAverage::new(0).window(), 1);
        assert_eq!(MovingAverage::new(1000).window(), MAX_MOVING_AVERAGE_WINDOW);
    }

    #[test]
    fn primed_moving_average_is_flat() {
        let mut ma = MovingAverage::new(5);
        ma.prime(100.0);
        assert_eq!(ma.process(100.0), 100.0);
    }

    #[test]
    fn low_pass_has_unity_dc_gain() {
        let lp = Biquad::low_pass(4.0, 30.0, BUTTERWORTH_Q);
        assert!((lp.dc_gain() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn high_pass_blocks_dc() {
        let hp = Biquad::high_pass(0.5, 30.0, BUTTERWORTH_Q);
        assert!(hp.dc_gain().abs() < 1e-5);
    }

    #[test]
    fn primed_band_pass_has_no_step_transient() {
        let mut bp = BandPass::new(0.5, 4.0, 30.0);
        bp.prime(200.0);
        for _ in 0..60 {
            assert!(bp.process(200.0).abs() < 1e-2);
        }
    }

    #[test]
    fn band_pass_keeps_pulse_band() {
        let mut bp = BandPass::new(0.5, 4.0, 30.0);
        // 1.2 Hz = 72 BPM; skip 3 s of settling
        let out: heapless::Vec<f32, 600> = sine(1.2, 30.0, 600).map(|x| bp.process(x)).collect();
        let amplitude = peak_abs(out[90..].iter().copied());
        assert!(amplitude > 0.85, "pulse band attenuated to {amplitude}");
    }

    #[test]
    fn band_pass_rejects_out_of_band() {
        let mut slow = BandPass::new(0.5, 4.0, 30.0);
        let drift: heapless::Vec<f32, 900> = sine(0.05, 30.0, 900).map(|x| slow.process(x)).collect();
        assert!(peak_abs(drift[300..].iter().copied()) < 0.1);

        let mut fast = BandPass::new(0.5, 4.0, 30.0);
        let flicker: heapless::Vec<f32, 600> = sine(12.0, 30.0, 600).map(|x| fast.process(x)).collect();
        assert!(peak_abs(flicker[90..].iter().copied()) < 0.2);
    }

    #[test]
    fn chain_reset_forgets_history() {
        let config = DetectionConfig::default();
        let mut chain = FilterChain::new(&config);
        for i in 0..100 {
            chain.process(150.0 + (i % 7) as f32);
        }
        assert!(chain.is_primed());

        chain.reset();
        assert!(!chain.is_primed());

        let mut fresh = FilterChain::new(&config);
        assert_eq!(chain.process(180.0), fresh.process(180.0));
    }
}
