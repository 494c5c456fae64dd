//! PulseGuard Avro schemas
//!
//! Nullable fields are `["null", T]` unions with a `null` default, so a
//! reader on a newer version can still resolve records written before a
//! field existed. Categorical fields (mode, risk tier, degradation) are
//! plain strings rather than Avro enums: adding a symbol to an enum breaks
//! old readers, adding a string value does not.

use apache_avro::Schema;
use serde_json::json;

use crate::SchemaError;

/// Namespace shared by every measurement schema
pub const MEASUREMENT_NAMESPACE: &str = "dev.pulseguard.measurement.v1";

/// Measurement result schema v1.0.0
pub fn measurement_result_v1() -> Result<Schema, SchemaError> {
    let schema_json = json!({
        "namespace": MEASUREMENT_NAMESPACE,
        "type": "record",
        "name": "MeasurementResult",
        "doc": "One camera PPG heart-rate measurement",
        "fields": [
            {
                "name": "recorded_at_ms",
                "type": "long",
                "doc": "Wall-clock time of the measurement in milliseconds since epoch, 0 if unknown"
            },
            {
                "name": "session_id",
                "type": "long",
                "doc": "Session that produced the result"
            },
            {
                "name": "mode",
                "type": "string",
                "doc": "standard (20 s) or detailed (60 s)"
            },
            {
                "name": "average_bpm",
                "type": "float",
                "doc": "Mean heart rate over accepted intervals, 0 if none"
            },
            {
                "name": "stability",
                "type": "float",
                "doc": "Beat-to-beat regularity (0.0-1.0)"
            },
            {
                "name": "confidence",
                "type": "float",
                "doc": "Composite confidence in average_bpm (0.0-1.0)"
            },
            {
                "name": "signal_quality",
                "type": "float",
                "doc": "Contact and noise quality (0.0-1.0)"
            },
            {
                "name": "peak_count",
                "type": "int"
            },
            {
                "name": "valid_interval_count",
                "type": "int",
                "doc": "RR intervals inside the physiological band"
            },
            {
                "name": "detection_duration_seconds",
                "type": "double",
                "doc": "Elapsed session time when the result was produced"
            },
            {
                "name": "waveform_data",
                "type": {
                    "type": "array",
                    "items": "float"
                },
                "default": [],
                "doc": "Filtered signal over the calculation window"
            },
            {
                "name": "hrv_sdnn_ms",
                "type": ["null", "float"],
                "default": null
            },
            {
                "name": "hrv_rmssd_ms",
                "type": ["null", "float"],
                "default": null
            },
            {
                "name": "mean_rr_ms",
                "type": ["null", "float"],
                "default": null
            },
            {
                "name": "af_risk_probability",
                "type": ["null", "float"],
                "default": null,
                "doc": "Heuristic irregular-rhythm score, not a diagnosis"
            },
            {
                "name": "irregular_risk_level",
                "type": ["null", "string"],
                "default": null,
                "doc": "low, medium or high"
            },
            {
                "name": "irregular_pulse_hint",
                "type": ["null", "string"],
                "default": null
            },
            {
                "name": "degradation",
                "type": ["null", "string"],
                "default": null,
                "doc": "insufficient_data, degenerate_input, no_plausible_intervals or too_few_intervals"
            }
        ]
    });

    Schema::parse(&schema_json)
        .map_err(|e| SchemaError::ParseError(e.to_string()))
}
