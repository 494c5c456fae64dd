//! Batch Calculation Example
//!
//! Runs the calculation engine directly on stored sample windows, without
//! a camera or a session. Useful for replaying recorded measurements and
//! for seeing how the degradation reasons surface.
//!
//! ## What You'll Learn
//!
//! - Calling `CalculationEngine::calculate` on a slice of samples
//! - How irregular beat timing moves the risk tier
//! - What a too-short or flat window returns
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_batch_calculation
//! ```

use pulseguard_core::{
    CalculationEngine, DetectionConfig, DetectionMode, MeasurementResult, Sample,
};

const RATE_HZ: f64 = 30.0;

/// One narrow pulse per beat at the given RR intervals
fn window_from_rr(rr: &[f64]) -> Vec<Sample> {
    let mut beats = vec![0.5];
    for interval in rr {
        beats.push(beats[beats.len() - 1] + interval);
    }
    let end = beats[beats.len() - 1] + 0.5;

    (0..(end * RATE_HZ) as usize)
        .map(|i| {
            let t = i as f64 / RATE_HZ;
            let v: f64 = beats.iter().map(|b| (-((t - b) / 0.08).powi(2)).exp()).sum();
            Sample { timestamp: t, raw_value: 180.0, filtered_value: (2.0 * v) as f32 }
        })
        .collect()
}

fn report(label: &str, result: &MeasurementResult) {
    println!("{label}");
    println!("  BPM {:.1}, stability {:.2}, confidence {:.2}", result.average_bpm, result.stability, result.confidence);
    println!("  {} peaks, {} accepted intervals", result.peak_count, result.valid_interval_count);
    match result.rhythm {
        Some(rhythm) => println!(
            "  SDNN {:.0} ms, RMSSD {:.0} ms, irregular score {:.2} ({:?})",
            rhythm.hrv.sdnn_ms, rhythm.hrv.rmssd_ms, rhythm.risk.af_risk_probability, rhythm.risk.level
        ),
        None => println!("  no rhythm metrics ({:?})", result.degradation),
    }
    println!();
}

fn main() {
    println!("PulseGuard Batch Calculation Example");
    println!("====================================\n");

    let engine = CalculationEngine::new(DetectionConfig::default(), DetectionMode::Detailed, 1);

    let steady: Vec<f64> = (0..40).map(|i| 0.85 + 0.02 * ((i % 4) as f64 - 1.5)).collect();
    report("Steady rhythm (~70 BPM)", &engine.calculate(&window_from_rr(&steady), 35.0));

    let chaotic: Vec<f64> = [0.55, 1.05, 0.62, 0.98, 0.7, 1.2, 0.5, 0.9]
        .iter()
        .cycle()
        .take(40)
        .copied()
        .collect();
    report("Chaotic rhythm", &engine.calculate(&window_from_rr(&chaotic), 33.0));

    report("One second of data", &engine.calculate(&window_from_rr(&[0.8]), 1.0));

    let flat: Vec<Sample> = (0..300)
        .map(|i| Sample { timestamp: i as f64 / RATE_HZ, raw_value: 0.0, filtered_value: 0.0 })
        .collect();
    report("Flat signal", &engine.calculate(&flat, 10.0));
}
