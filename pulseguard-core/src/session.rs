//! Detection Session
//!
//! ## Overview
//!
//! [`DetectionSession`] ties the [`Sampler`] and the [`CalculationEngine`]
//! together and owns every piece of rolling state: filter history, the
//! finger gate, the warm-up counter, the sample buffer and the live
//! waveform. Starting a session replaces all of it, so nothing from one
//! measurement can reach the next.
//!
//! ## Lifecycle
//!
//! ```text
//!            start_session
//!   Idle ─────────────────► AwaitingFinger ◄──────────┐
//!    ▲                        │      │ gate opens     │ finger lost
//!    │ stop                   │      ▼                │
//!    │                        │   Warming ────────────┤
//!    │                        │      │ warm-up done   │
//!    │                        │      ▼                │
//!    └────────────────────────┼─ Collecting ──────────┘
//!                 no contact  │      │ target duration / finish
//!                 deadline    └────► ▼
//!                                Calculated
//! ```
//!
//! Losing the finger throws away the samples buffered so far; the next
//! window has to span the full target duration after contact returns. If
//! nothing has been emitted yet and the gate stays closed for a whole
//! target duration (from the start, or from the last loss) the session ends with a zeroed
//! [`Degradation::InsufficientData`](crate::Degradation) result instead of
//! waiting forever.
//!
//! `stop` can be called from any phase and discards everything without
//! emitting. With [`TriggerPolicy::Rolling`](crate::config::TriggerPolicy)
//! the session stays in `Collecting` and emits repeatedly.
//!
//! ## Threading
//!
//! The session is `Send` and never blocks. Drive it from the capture
//! thread; results leave through the [`ResultObserver`] on that same
//! thread, or through [`DetectionSession::take_result`] for polling.
//! Each result carries the `session_id` it was produced for, so a consumer
//! can drop results that arrive after it has moved on.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec::Vec};

use core::fmt;

use crate::{
    buffer::WaveformRing,
    config::{DetectionConfig, DetectionMode, TriggerPolicy},
    constants::time::LIVE_WAVEFORM_CAPACITY,
    engine::CalculationEngine,
    errors::ConfigResult,
    result::MeasurementResult,
    sampler::{SampleStatus, Sampler},
    traits::{Finite, Frame, ResultObserver, Sample, Seconds},
};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionPhase {
    /// No session running; frames are ignored
    Idle,
    /// Session started, finger gate closed
    AwaitingFinger,
    /// Finger placed, filters settling
    Warming,
    /// Forwarding samples to the engine
    Collecting,
    /// Result emitted; frames are ignored until the next start
    Calculated,
}

impl SessionPhase {
    /// True while frames are being consumed
    pub fn is_active(&self) -> bool {
        matches!(self, Self::AwaitingFinger | Self::Warming | Self::Collecting)
    }
}

/// One camera measurement from finger placement to result
pub struct DetectionSession {
    config: DetectionConfig,
    phase: SessionPhase,
    session_id: u32,
    sampler: Sampler,
    engine: CalculationEngine,
    waveform: WaveformRing<LIVE_WAVEFORM_CAPACITY>,
    started_at: Option<Seconds>,
    last_timestamp: Option<Seconds>,
    /// Start of the current stretch without contact, `None` while the gate is open
    no_contact_since: Option<Seconds>,
    result: Option<MeasurementResult>,
    observer: Option<Box<dyn ResultObserver + Send>>,
}

impl DetectionSession {
    /// Validate `config` and build an idle session
    pub fn new(config: DetectionConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            phase: SessionPhase::Idle,
            session_id: 0,
            sampler: Sampler::new(&config),
            engine: CalculationEngine::new(config, DetectionMode::default(), 0),
            waveform: WaveformRing::new(),
            started_at: None,
            last_timestamp: None,
            no_contact_since: None,
            result: None,
            observer: None,
        })
    }

    /// Builder-style observer registration
    pub fn with_observer(mut self, observer: impl ResultObserver + Send + 'static) -> Self {
        self.set_observer(observer);
        self
    }

    /// Replace the result observer
    pub fn set_observer(&mut self, observer: impl ResultObserver + Send + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Begin a new measurement, discarding all state from the previous one
    ///
    /// Returns the new session id.
    pub fn start_session(&mut self, mode: DetectionMode) -> u32 {
        self.session_id = self.session_id.wrapping_add(1);
        self.sampler.reset();
        self.engine = CalculationEngine::new(self.config, mode, self.session_id);
        self.waveform.clear();
        self.started_at = None;
        self.last_timestamp = None;
        self.no_contact_since = None;
        self.result = None;
        self.phase = SessionPhase::AwaitingFinger;
        log_info!("Session {} started ({:?})", self.session_id, mode);
        self.session_id
    }

    /// Feed one camera frame
    ///
    /// Returns the emitted sample, or `None` if no session is running or
    /// the frame's timestamp is unusable.
    pub fn ingest_frame<F: Frame + ?Sized>(&mut self, frame: &F) -> Option<Sample> {
        if !self.phase.is_active() {
            return None;
        }

        let timestamp = frame.timestamp();
        if !timestamp.is_usable() {
            log_warn!("Session {}: frame with non-finite timestamp ignored", self.session_id);
            return None;
        }
        if self.started_at.is_none() {
            self.started_at = Some(timestamp);
            self.engine.set_origin(timestamp);
        }
        self.last_timestamp = Some(timestamp);

        let ingested = self.sampler.ingest(frame);
        if ingested.finger_lost {
            self.engine.restart_window();
            self.no_contact_since = Some(timestamp);
        }
        self.phase = match ingested.status {
            SampleStatus::NoFinger => SessionPhase::AwaitingFinger,
            SampleStatus::WarmingUp => SessionPhase::Warming,
            SampleStatus::Valid => SessionPhase::Collecting,
        };

        if ingested.is_forwarded() {
            self.waveform.push(ingested.sample.filtered_value);
            if let Some(result) = self.engine.process_sample(ingested.sample) {
                if self.config.trigger == TriggerPolicy::Once {
                    self.phase = SessionPhase::Calculated;
                }
                self.deliver(result);
            }
        }

        if ingested.status == SampleStatus::NoFinger {
            let since = *self.no_contact_since.get_or_insert(timestamp);
            if !self.engine.has_fired() && timestamp - since >= self.engine.mode().target_duration_s() {
                log_warn!(
                    "Session {}: no finger contact for {:.1}s, ending",
                    self.session_id,
                    timestamp - since
                );
                let result = self.engine.finish(timestamp);
                self.phase = SessionPhase::Calculated;
                self.deliver(result);
            }
        } else {
            self.no_contact_since = None;
        }

        Some(ingested.sample)
    }

    /// Most recent forwarded filtered values, oldest first
    pub fn current_waveform(&self) -> Vec<f32> {
        self.waveform.to_vec()
    }

    /// Force a calculation on whatever has been collected
    ///
    /// For when an external timer ends the measurement early. The result is
    /// delivered like a triggered one and also returned. `None` if no
    /// session is running.
    pub fn finish(&mut self) -> Option<MeasurementResult> {
        if !self.phase.is_active() {
            return None;
        }
        let now = self.last_timestamp.unwrap_or(0.0);
        let result = self.engine.finish(now);
        self.phase = SessionPhase::Calculated;
        self.deliver(result.clone());
        Some(result)
    }

    /// Cancel the running session; nothing is emitted
    pub fn stop(&mut self) {
        if self.phase.is_active() {
            log_info!("Session {} cancelled", self.session_id);
        }
        self.sampler.reset();
        self.engine = CalculationEngine::new(self.config, DetectionMode::default(), self.session_id);
        self.waveform.clear();
        self.started_at = None;
        self.last_timestamp = None;
        self.no_contact_since = None;
        self.result = None;
        self.phase = SessionPhase::Idle;
    }

    /// Take the latest undelivered-to-poller result
    pub fn take_result(&mut self) -> Option<MeasurementResult> {
        self.result.take()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Id of the current (or last) session; 0 before the first start
    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    /// Finger gate state
    pub fn finger_placed(&self) -> bool {
        self.sampler.finger_placed()
    }

    /// Configuration in use
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    fn deliver(&mut self, result: MeasurementResult) {
        log_info!(
            "Session {} result: {:.1} BPM, confidence {:.2}",
            result.session_id,
            result.average_bpm,
            result.confidence
        );
        if let Some(observer) = self.observer.as_mut() {
            observer.on_result(&result);
        }
        self.result = Some(result);
    }
}

impl fmt::Debug for DetectionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionSession")
            .field("phase", &self.phase)
            .field("session_id", &self.session_id)
            .field("finger_placed", &self.sampler.finger_placed())
            .field("buffered", &self.engine.samples().len())
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}
