//! Sample Storage
//!
//! ## Overview
//!
//! Two buffers with different jobs:
//!
//! - [`SampleBuffer`]: the append-only batch the calculation engine works on.
//!   Heap-backed, because a 60 s detailed session at 30 fps is 1800 samples
//!   and the engine needs them all at once.
//! - [`WaveformRing`]: a fixed-capacity ring of the most recent filtered
//!   values for a scrolling chart. No allocation on push.
//!
//! ## Ordering
//!
//! `SampleBuffer` only accepts strictly increasing timestamps. A frame
//! delivered twice or out of order by the capture layer would produce a zero
//! or negative RR interval further down, so it is refused here and the
//! caller logs it.
//!
//! ## Ring Layout
//!
//! ```text
//! WaveformRing<5> after 7 pushes (values 0..7):
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  5  │  6  │  2  │  3  │  4  │
//! └─────┴─────┴─────┴─────┴─────┘
//!              ↑
//!              write_pos = 2, oldest value
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::traits::{Sample, Seconds};

/// Append-only, timestamp-ordered samples for one session
#[derive(Debug, Clone, Default)]
pub struct SampleBuffer {
    samples: Vec<Sample>,
}

impl SampleBuffer {
    /// Empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty buffer with room for `capacity` samples
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Append a sample; returns `false` (and drops it) if its timestamp does
    /// not advance past the newest stored sample
    pub fn push(&mut self, sample: Sample) -> bool {
        if let Some(last) = self.samples.last() {
            if sample.timestamp <= last.timestamp {
                return false;
            }
        }
        self.samples.push(sample);
        true
    }

    /// Time from the oldest to the newest sample
    pub fn duration(&self) -> Seconds {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    /// Newest timestamp
    pub fn latest(&self) -> Option<Seconds> {
        self.samples.last().map(|s| s.timestamp)
    }

    /// All samples, oldest first
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// Samples with `timestamp >= latest - window`
    pub fn trailing(&self, window: Seconds) -> &[Sample] {
        let Some(latest) = self.latest() else {
            return &[];
        };
        let cutoff = latest - window;
        let start = self.samples.partition_point(|s| s.timestamp < cutoff);
        &self.samples[start..]
    }

    /// Drop samples older than `cutoff`
    pub fn discard_before(&mut self, cutoff: Seconds) {
        let start = self.samples.partition_point(|s| s.timestamp < cutoff);
        if start > 0 {
            self.samples.drain(..start);
        }
    }

    /// `filtered_value` of every sample, oldest first
    pub fn filtered_values(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.filtered_value).collect()
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Remove all samples, keeping the allocation
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Fixed-capacity ring of the most recent `N` values
///
/// When full, each push overwrites the oldest value.
#[derive(Debug, Clone)]
pub struct WaveformRing<const N: usize> {
    data: [f32; N],
    write_pos: usize,
    len: usize,
}

impl<const N: usize> WaveformRing<N> {
    /// Empty ring
    pub const fn new() -> Self {
        Self {
            data: [0.0; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Add a value, overwriting the oldest when full
    pub fn push(&mut self, value: f32) {
        if N == 0 {
            return;
        }
        self.data[self.write_pos] = value;
        self.write_pos = (self.write_pos + 1) % N;
        if self.len < N {
            self.len += 1;
        }
    }

    /// Stored value count
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True once `N` values have been pushed
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Most recent value
    pub fn last(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        let idx = if self.write_pos == 0 { N - 1 } else { self.write_pos - 1 };
        Some(self.data[idx])
    }

    /// Values oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        // oldest sits at write_pos once the ring has wrapped
        let start = if self.len < N { 0 } else { self.write_pos };
        (0..self.len).map(move |i| self.data[(start + i) % N])
    }

    /// Copy out oldest to newest
    pub fn to_vec(&self) -> Vec<f32> {
        self.iter().collect()
    }

    /// Forget all values
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }
}

impl<const N: usize> Default for WaveformRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
