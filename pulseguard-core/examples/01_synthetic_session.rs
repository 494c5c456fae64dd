//! Synthetic Detection Session Example
//!
//! Drives a full [`DetectionSession`] with generated camera frames: a
//! fingertip-red image whose brightness pulses at 68 BPM, lifted off the
//! lens for a moment halfway through.
//!
//! ## What You'll Learn
//!
//! - Building a session and registering a result observer
//! - Wrapping raw camera bytes in a `PixelBuffer`
//! - Watching the session phase and the live waveform
//! - What happens when the finger is lost mid-measurement (the window
//!   starts over once contact returns)
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_synthetic_session
//! ```

use pulseguard_core::{
    sampler::{PixelBuffer, PixelFormat},
    DetectionConfig, DetectionMode, DetectionSession, MeasurementResult, SessionPhase,
};

const WIDTH: usize = 32;
const HEIGHT: usize = 24;
const FPS: f64 = 30.0;

/// BGRA frame, as an iOS capture session delivers it
fn render(t: f64, finger_on: bool) -> Vec<u8> {
    let (r, g, b) = if finger_on {
        let pulse = 6.0 * (2.0 * std::f64::consts::PI * 68.0 / 60.0 * t).sin();
        ((185.0 + pulse) as u8, 25u8, 18u8)
    } else {
        (90u8, 95u8, 100u8)
    };
    let mut data = Vec::with_capacity(WIDTH * HEIGHT * 4);
    for _ in 0..WIDTH * HEIGHT {
        data.extend_from_slice(&[b, g, r, 255]);
    }
    data
}

fn main() -> Result<(), pulseguard_core::ConfigError> {
    println!("PulseGuard Synthetic Session Example");
    println!("====================================\n");

    let mut session = DetectionSession::new(DetectionConfig::default())?.with_observer(
        |result: &MeasurementResult| {
            println!("\n>>> Result for session {}", result.session_id);
            println!("    Heart rate:     {:.1} BPM", result.average_bpm);
            println!("    Stability:      {:.2}", result.stability);
            println!("    Confidence:     {:.2}", result.confidence);
            println!("    Signal quality: {:.2}", result.signal_quality);
            println!("    Peaks:          {}", result.peak_count);
            match (result.hrv_sdnn_ms(), result.hrv_rmssd_ms()) {
                (Some(sdnn), Some(rmssd)) => println!("    HRV:            SDNN {sdnn:.1} ms, RMSSD {rmssd:.1} ms"),
                _ => println!("    HRV:            not enough intervals"),
            }
            if let Some(hint) = result.irregular_pulse_hint() {
                println!("    Rhythm:         {hint}");
            }
            if let Some(degradation) = result.degradation {
                println!("    Degradation:    {degradation:?}");
            }
        },
    );

    let id = session.start_session(DetectionMode::Standard);
    println!("Started session {id} (Standard, 20 s)\n");

    let mut last_phase = session.phase();
    for i in 0..(30.0 * FPS) as usize {
        let t = i as f64 / FPS;
        // finger lifted between 6.0 and 6.5 s; the 20 s window restarts after it
        let finger_on = !(6.0..6.5).contains(&t);
        let bytes = render(t, finger_on);
        let frame = PixelBuffer::new(&bytes, WIDTH, HEIGHT, PixelFormat::Bgra8, t);

        session.ingest_frame(&frame);

        if session.phase() != last_phase {
            println!("[{t:5.2}s] {:?} -> {:?}", last_phase, session.phase());
            last_phase = session.phase();
        }
        if i % 150 == 0 && session.phase() == SessionPhase::Collecting {
            let wave = session.current_waveform();
            let peak = wave.iter().cloned().fold(0.0f32, f32::max);
            println!("[{t:5.2}s] live waveform: {} points, max {:.2}", wave.len(), peak);
        }
        if session.phase() == SessionPhase::Calculated {
            break;
        }
    }

    Ok(())
}
