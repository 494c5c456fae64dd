//! Finger-placement gate with hysteresis
//!
//! A single bright red frame is not proof of a finger: the torch reflecting
//! off a red surface or a half-covered lens flickers across the thresholds.
//! The gate only flips after a run of consecutive frames agrees.

use crate::config::FingerConfig;

use super::extract::ChannelStats;

/// Tracks whether a fingertip is covering the lens
#[derive(Debug, Clone)]
pub struct FingerDetector {
    config: FingerConfig,
    placed: bool,
    streak: u16,
}

impl FingerDetector {
    /// New detector, gate closed
    pub fn new(config: FingerConfig) -> Self {
        Self {
            config,
            placed: false,
            streak: 0,
        }
    }

    /// Does this single frame look like a covered lens?
    pub fn is_covered(&self, stats: &ChannelStats) -> bool {
        !stats.is_empty()
            && stats.red >= self.config.min_red
            && stats.red <= self.config.max_red
            && stats.red_ratio() >= self.config.min_red_ratio
    }

    /// Feed one frame's channel means, return the gate state after it
    pub fn update(&mut self, stats: &ChannelStats) -> bool {
        let covered = self.is_covered(stats);

        if covered == self.placed {
            // agrees with current state, any opposing run is broken
            self.streak = 0;
            return self.placed;
        }

        self.streak = self.streak.saturating_add(1);
        let needed = if self.placed {
            self.config.release_frames
        } else {
            self.config.engage_frames
        };

        if self.streak >= needed {
            self.placed = covered;
            self.streak = 0;
        }
        self.placed
    }

    /// Current gate state
    pub fn is_placed(&self) -> bool {
        self.placed
    }

    /// Close the gate and forget any partial run
    pub fn reset(&mut self) {
        self.placed = false;
        self.streak = 0;
    }
}
