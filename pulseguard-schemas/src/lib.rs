//! Persistence Records and Avro Schemas for PulseGuard Measurements
//!
//! ## Overview
//!
//! The core crate produces [`MeasurementResult`]s and stops there: storage,
//! sync and export belong to the host application. This crate gives that
//! application one stable, flat shape to store and exchange:
//!
//! - [`MeasurementRecord`]: a flat `serde` struct built from a result
//! - [`schemas::measurement_result_v1`]: its Avro schema
//! - [`encode_records`] / [`decode_records`]: Avro object container files
//! - [`to_json`]: pretty JSON for export and debugging
//! - [`validation::validate_record`]: checks for records coming back in from
//!   storage or another device
//!
//! ## Why Avro?
//!
//! 1. **Compact Binary Format**: a detailed session carries 1800 waveform
//!    points; Avro stores them as packed floats
//! 2. **Schema Evolution**: new metrics can be appended with defaults and
//!    old exports still decode
//! 3. **Self-Describing**: the container embeds the writer schema
//!
//! ## Flat Rhythm Fields
//!
//! In the core crate the HRV and irregular-rhythm metrics live in one
//! `Option<RhythmAnalysis>`. Storage formats and spreadsheets want flat
//! columns, so the record spreads them into nullable fields. The
//! all-present-or-all-absent invariant then has to be re-checked on import,
//! which is what [`validation`] does.
//!
//! ## Usage Example
//!
//! ```rust
//! use pulseguard_core::{Degradation, DetectionMode, MeasurementResult};
//! use pulseguard_schemas::{decode_records, encode_records, MeasurementRecord};
//!
//! let result = MeasurementResult::zeroed(
//!     1,
//!     DetectionMode::Standard,
//!     vec![0.0; 4],
//!     20.0,
//!     Degradation::DegenerateInput,
//! );
//! let record = MeasurementRecord::from(&result).with_recorded_at(1_700_000_000_000);
//!
//! let bytes = encode_records(std::slice::from_ref(&record))?;
//! let decoded = decode_records(&bytes[..])?;
//! assert_eq!(decoded, vec![record]);
//! # Ok::<(), pulseguard_schemas::SchemaError>(())
//! ```

use std::io::Read;

use apache_avro::{Reader, Writer};
use pulseguard_core::MeasurementResult;
use serde::{Deserialize, Serialize};

pub mod registry;
pub mod schemas;
pub mod validation;

pub use registry::{SchemaMetadata, SchemaRegistry};
pub use validation::{validate_record, ValidationReport};

/// Schema, encoding and validation errors
#[derive(Debug, thiserror_no_std::Error)]
pub enum SchemaError {
    /// Schema JSON did not parse
    #[error("Failed to parse schema: {0}")]
    ParseError(String),

    /// No schema registered under that name
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// Registration or record validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Avro encoding failed
    #[error("Failed to encode: {0}")]
    EncodeError(String),

    /// Avro decoding failed
    #[error("Failed to decode: {0}")]
    DecodeError(String),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Flat, storable form of a [`MeasurementResult`]
///
/// Field names match `measurement_result_v1`. Counts are `i32` and the
/// session id `i64` to line up with Avro's signed `int` and `long`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Wall-clock time the record was made (ms since Unix epoch), 0 if unknown
    pub recorded_at_ms: i64,
    /// Session that produced the result
    pub session_id: i64,
    /// `"standard"` or `"detailed"`
    pub mode: String,
    /// Mean heart rate, 0 if none
    pub average_bpm: f32,
    /// Beat-to-beat regularity (0-1)
    pub stability: f32,
    /// Confidence in the heart rate (0-1)
    pub confidence: f32,
    /// Contact/noise quality (0-1)
    pub signal_quality: f32,
    /// Detected peaks
    pub peak_count: i32,
    /// Accepted RR intervals
    pub valid_interval_count: i32,
    /// Elapsed session time (seconds)
    pub detection_duration_seconds: f64,
    /// Filtered waveform over the calculation window
    pub waveform_data: Vec<f32>,
    /// SDNN (ms)
    pub hrv_sdnn_ms: Option<f32>,
    /// RMSSD (ms)
    pub hrv_rmssd_ms: Option<f32>,
    /// Mean RR interval (ms)
    pub mean_rr_ms: Option<f32>,
    /// Heuristic irregular-rhythm score (0-1)
    pub af_risk_probability: Option<f32>,
    /// `"low"`, `"medium"` or `"high"`
    pub irregular_risk_level: Option<String>,
    /// Advisory text shown with the tier
    pub irregular_pulse_hint: Option<String>,
    /// Degradation code, if the metrics are zeroed or partial
    pub degradation: Option<String>,
}

impl MeasurementRecord {
    /// Stamp the wall-clock time of the measurement
    pub fn with_recorded_at(mut self, recorded_at_ms: i64) -> Self {
        self.recorded_at_ms = recorded_at_ms;
        self
    }

    /// True if the rhythm columns are filled
    pub fn has_rhythm(&self) -> bool {
        self.hrv_sdnn_ms.is_some()
    }
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

impl From<&MeasurementResult> for MeasurementRecord {
    fn from(result: &MeasurementResult) -> Self {
        let rhythm = result.rhythm;
        Self {
            recorded_at_ms: 0,
            session_id: result.session_id as i64,
            mode: result.mode.as_str().to_string(),
            average_bpm: result.average_bpm,
            stability: result.stability,
            confidence: result.confidence,
            signal_quality: result.signal_quality,
            peak_count: count(result.peak_count),
            valid_interval_count: count(result.valid_interval_count),
            detection_duration_seconds: result.detection_duration_seconds,
            waveform_data: result.waveform_data.clone(),
            hrv_sdnn_ms: rhythm.map(|r| r.hrv.sdnn_ms),
            hrv_rmssd_ms: rhythm.map(|r| r.hrv.rmssd_ms),
            mean_rr_ms: rhythm.map(|r| r.hrv.mean_rr_ms),
            af_risk_probability: rhythm.map(|r| r.risk.af_risk_probability),
            irregular_risk_level: rhythm.map(|r| r.risk.level.as_str().to_string()),
            irregular_pulse_hint: rhythm.map(|r| r.risk.hint().to_string()),
            degradation: result.degradation.map(|d| d.code().to_string()),
        }
    }
}

/// Write records into an Avro object container
pub fn encode_records(records: &[MeasurementRecord]) -> Result<Vec<u8>, SchemaError> {
    let schema = schemas::measurement_result_v1()?;
    let mut writer = Writer::new(&schema, Vec::new());
    for record in records {
        writer
            .append_ser(record)
            .map_err(|e| SchemaError::EncodeError(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| SchemaError::EncodeError(e.to_string()))
}

/// Read every record from an Avro object container
///
/// The container's writer schema is resolved against
/// `measurement_result_v1`, so files written by older compatible schemas
/// still decode.
pub fn decode_records<R: Read>(input: R) -> Result<Vec<MeasurementRecord>, SchemaError> {
    let schema = schemas::measurement_result_v1()?;
    let reader =
        Reader::with_schema(&schema, input).map_err(|e| SchemaError::DecodeError(e.to_string()))?;

    let mut records = Vec::new();
    for value in reader {
        let value = value.map_err(|e| SchemaError::DecodeError(e.to_string()))?;
        let record = apache_avro::from_value::<MeasurementRecord>(&value)
            .map_err(|e| SchemaError::DecodeError(e.to_string()))?;
        records.push(record);
    }
    log::debug!("Decoded {} measurement records", records.len());
    Ok(records)
}

/// Pretty-printed JSON for one record
pub fn to_json(record: &MeasurementRecord) -> Result<String, SchemaError> {
    serde_json::to_string_pretty(record).map_err(|e| SchemaError::JsonError(e.to_string()))
}

/// Parse a record back from JSON
pub fn from_json(json: &str) -> Result<MeasurementRecord, SchemaError> {
    serde_json::from_str(json).map_err(|e| SchemaError::JsonError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulseguard_core::{
        hrv_metrics, irregular_risk, Degradation, DetectionMode, RhythmAnalysis, RiskCalibration,
    };

    pub(crate) fn result_with_rhythm() -> MeasurementResult {
        let intervals = [0.8, 0.82, 0.79, 0.81];
        let hrv = hrv_metrics(&intervals).unwrap();
        let risk = irregular_risk(&intervals, Some(&hrv), &RiskCalibration::default()).unwrap();
        MeasurementResult {
            session_id: 4,
            mode: DetectionMode::Detailed,
            average_bpm: 74.5,
            stability: 0.93,
            confidence: 0.88,
            signal_quality: 0.71,
            peak_count: 5,
            valid_interval_count: 4,
            waveform_data: vec![0.1, -0.2, 0.4],
            detection_duration_seconds: 61.2,
            rhythm: Some(RhythmAnalysis { hrv, risk }),
            degradation: None,
        }
    }

    #[test]
    fn record_flattens_rhythm_group() {
        let record = MeasurementRecord::from(&result_with_rhythm());
        assert_eq!(record.mode, "detailed");
        assert_eq!(record.session_id, 4);
        assert!(record.has_rhythm());
        assert_eq!(record.irregular_risk_level.as_deref(), Some("low"));
        assert!(record.irregular_pulse_hint.is_some());
        assert!(record.degradation.is_none());
    }

    #[test]
    fn zeroed_result_has_null_rhythm_columns() {
        let result = MeasurementResult::zeroed(
            2,
            DetectionMode::Standard,
            Vec::new(),
            3.0,
            Degradation::InsufficientData { required: 61, available: 12 },
        );
        let record = MeasurementRecord::from(&result);
        assert!(!record.has_rhythm());
        assert!(record.mean_rr_ms.is_none());
        assert_eq!(record.degradation.as_deref(), Some("insufficient_data"));
    }

    #[test]
    fn avro_container_round_trip() {
        let records = vec![
            MeasurementRecord::from(&result_with_rhythm()).with_recorded_at(1_700_000_000_000),
            MeasurementRecord::from(&MeasurementResult::zeroed(
                5,
                DetectionMode::Standard,
                vec![0.0; 8],
                20.0,
                Degradation::DegenerateInput,
            )),
        ];
        let bytes = encode_records(&records).unwrap();
        assert_eq!(decode_records(&bytes[..]).unwrap(), records);
    }

    #[test]
    fn avro_file_on_disk() {
        use std::io::{Seek, SeekFrom, Write};

        let record = MeasurementRecord::from(&result_with_rhythm());
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(&encode_records(&[record.clone(), record.clone()]).unwrap())
            .unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let decoded = decode_records(std::io::BufReader::new(file)).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1], record);
    }

    #[test]
    fn json_round_trip() {
        let record = MeasurementRecord::from(&result_with_rhythm());
        let json = to_json(&record).unwrap();
        assert!(json.contains("\"irregular_risk_level\": \"low\""));
        assert_eq!(from_json(&json).unwrap(), record);
    }

    #[test]
    fn garbage_does_not_decode() {
        assert!(matches!(
            decode_records(&b"not an avro file"[..]),
            Err(SchemaError::DecodeError(_))
        ));
        assert!(matches!(from_json("{}"), Err(SchemaError::JsonError(_))));
    }
}
