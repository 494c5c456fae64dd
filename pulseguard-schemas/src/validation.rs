//! Record Validation
//!
//! Records re-enter the system from storage, sync and other devices, and the
//! flat layout no longer enforces what `MeasurementResult` guaranteed by
//! construction. Validation runs in two layers:
//!
//! 1. **Structure**: an Avro value must match `measurement_result_v1`
//! 2. **Semantics**: ranges, physiological limits, the all-or-nothing rhythm
//!    group and the categorical symbols
//!
//! Problems that make a record unusable are errors. A risk tier that does
//! not match its score under the default calibration is only a warning,
//! since the writer may have used a different calibration.

use apache_avro::types::Value;
use pulseguard_core::{
    constants::{MAX_PLAUSIBLE_BPM, MIN_INTERVALS_FOR_HRV, MIN_PLAUSIBLE_BPM},
    Degradation, DetectionMode, RiskCalibration, RiskLevel,
};

use crate::{schemas, MeasurementRecord, SchemaError};

const MODES: [DetectionMode; 2] = [DetectionMode::Standard, DetectionMode::Detailed];
const LEVELS: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];
const DEGRADATIONS: [Degradation; 4] = [
    Degradation::InsufficientData { required: 0, available: 0 },
    Degradation::DegenerateInput,
    Degradation::NoPlausibleIntervals { rejected: 0 },
    Degradation::TooFewIntervals { available: 0 },
];

/// Validate a raw Avro value: schema structure first, then record semantics
pub fn validate_value(value: &Value) -> Result<ValidationReport, SchemaError> {
    let schema = schemas::measurement_result_v1()?;
    if !value.validate(&schema) {
        let mut report = ValidationReport::new();
        report.add_error(ValidationIssue {
            issue_type: IssueType::TypeMismatch,
            field: None,
            message: "Value does not match measurement_result_v1".to_string(),
            severity: Severity::Error,
        });
        return Ok(report);
    }

    let record = apache_avro::from_value::<MeasurementRecord>(value)
        .map_err(|e| SchemaError::DecodeError(e.to_string()))?;
    Ok(validate_record(&record))
}

/// Check one record against the invariants of a measurement result
pub fn validate_record(record: &MeasurementRecord) -> ValidationReport {
    let mut report = ValidationReport::new();

    check_finite(record, &mut report);
    check_symbols(record, &mut report);
    check_heart_rate(record, &mut report);

    for (field, value) in [
        ("stability", record.stability),
        ("confidence", record.confidence),
        ("signal_quality", record.signal_quality),
    ] {
        check_unit_range(field, value, &mut report);
    }
    if let Some(score) = record.af_risk_probability {
        check_unit_range("af_risk_probability", score, &mut report);
    }

    check_counts(record, &mut report);
    check_rhythm_group(record, &mut report);

    if report.is_valid() {
        log::debug!("Record for session {} passed validation", record.session_id);
    } else {
        log::warn!(
            "Record for session {} failed validation with {} errors",
            record.session_id,
            report.errors.len()
        );
    }
    report
}

fn check_finite(record: &MeasurementRecord, report: &mut ValidationReport) {
    let scalars = [
        ("average_bpm", Some(record.average_bpm)),
        ("stability", Some(record.stability)),
        ("confidence", Some(record.confidence)),
        ("signal_quality", Some(record.signal_quality)),
        ("hrv_sdnn_ms", record.hrv_sdnn_ms),
        ("hrv_rmssd_ms", record.hrv_rmssd_ms),
        ("mean_rr_ms", record.mean_rr_ms),
        ("af_risk_probability", record.af_risk_probability),
    ];
    for (field, value) in scalars {
        if let Some(v) = value {
            if !v.is_finite() {
                report.add_error(non_finite(field));
            }
        }
    }
    if !record.detection_duration_seconds.is_finite() || record.detection_duration_seconds < 0.0 {
        report.add_error(non_finite("detection_duration_seconds"));
    }
    if record.waveform_data.iter().any(|v| !v.is_finite()) {
        report.add_error(non_finite("waveform_data"));
    }
}

fn non_finite(field: &str) -> ValidationIssue {
    ValidationIssue {
        issue_type: IssueType::NonFinite,
        field: Some(field.to_string()),
        message: format!("Field '{}' is not a finite value", field),
        severity: Severity::Error,
    }
}

fn unknown_symbol(field: &str, value: &str) -> ValidationIssue {
    ValidationIssue {
        issue_type: IssueType::UnknownSymbol,
        field: Some(field.to_string()),
        message: format!("Unknown {} '{}'", field, value),
        severity: Severity::Error,
    }
}

fn check_symbols(record: &MeasurementRecord, report: &mut ValidationReport) {
    if !MODES.iter().any(|m| m.as_str() == record.mode) {
        report.add_error(unknown_symbol("mode", &record.mode));
    }
    if let Some(level) = &record.irregular_risk_level {
        if !LEVELS.iter().any(|l| l.as_str() == level.as_str()) {
            report.add_error(unknown_symbol("irregular_risk_level", level));
        }
    }
    if let Some(code) = &record.degradation {
        if !DEGRADATIONS.iter().any(|d| d.code() == code.as_str()) {
            report.add_error(unknown_symbol("degradation", code));
        }
    }
}

fn check_heart_rate(record: &MeasurementRecord, report: &mut ValidationReport) {
    let bpm = record.average_bpm;
    if !bpm.is_finite() {
        return;
    }

    if bpm == 0.0 {
        if record.degradation.is_none() {
            report.add_warning(ValidationIssue {
                issue_type: IssueType::UnusualValue,
                field: Some("average_bpm".to_string()),
                message: "Zero heart rate without a degradation reason".to_string(),
                severity: Severity::Warning,
            });
        }
        return;
    }

    if !(MIN_PLAUSIBLE_BPM..=MAX_PLAUSIBLE_BPM).contains(&bpm) {
        report.add_error(ValidationIssue {
            issue_type: IssueType::PhysiologyViolation,
            field: Some("average_bpm".to_string()),
            message: format!(
                "Heart rate {} outside [{}, {}] BPM",
                bpm, MIN_PLAUSIBLE_BPM, MAX_PLAUSIBLE_BPM
            ),
            severity: Severity::Error,
        });
    }
}

fn check_unit_range(field: &str, value: f32, report: &mut ValidationReport) {
    if value.is_finite() && !(0.0..=1.0).contains(&value) {
        report.add_error(ValidationIssue {
            issue_type: IssueType::OutOfRange,
            field: Some(field.to_string()),
            message: format!("Score {} outside [0, 1]", value),
            severity: Severity::Error,
        });
    }
}

fn check_counts(record: &MeasurementRecord, report: &mut ValidationReport) {
    let mut inconsistent = |message: String| {
        report.add_error(ValidationIssue {
            issue_type: IssueType::InconsistentFields,
            field: Some("valid_interval_count".to_string()),
            message,
            severity: Severity::Error,
        });
    };

    if record.peak_count < 0 || record.valid_interval_count < 0 {
        inconsistent("Negative peak or interval count".to_string());
        return;
    }
    let max_intervals = (record.peak_count - 1).max(0);
    if record.valid_interval_count > max_intervals {
        inconsistent(format!(
            "{} accepted intervals from {} peaks",
            record.valid_interval_count, record.peak_count
        ));
    }
}

fn check_rhythm_group(record: &MeasurementRecord, report: &mut ValidationReport) {
    let present = [
        record.hrv_sdnn_ms.is_some(),
        record.hrv_rmssd_ms.is_some(),
        record.mean_rr_ms.is_some(),
        record.af_risk_probability.is_some(),
        record.irregular_risk_level.is_some(),
        record.irregular_pulse_hint.is_some(),
    ];
    let filled = present.iter().filter(|p| **p).count();

    if filled != 0 && filled != present.len() {
        report.add_error(ValidationIssue {
            issue_type: IssueType::InconsistentFields,
            field: None,
            message: format!(
                "Rhythm fields must be all present or all absent ({} of {} set)",
                filled,
                present.len()
            ),
            severity: Severity::Error,
        });
        return;
    }
    if filled == 0 {
        return;
    }

    if record.valid_interval_count < MIN_INTERVALS_FOR_HRV as i32 {
        report.add_error(ValidationIssue {
            issue_type: IssueType::InconsistentFields,
            field: Some("hrv_sdnn_ms".to_string()),
            message: format!(
                "Rhythm metrics need {} accepted intervals, record has {}",
                MIN_INTERVALS_FOR_HRV, record.valid_interval_count
            ),
            severity: Severity::Error,
        });
    }

    if let (Some(score), Some(level)) = (record.af_risk_probability, &record.irregular_risk_level) {
        let expected = RiskLevel::from_score(score, &RiskCalibration::default());
        if score.is_finite() && expected.as_str() != level.as_str() {
            report.add_warning(ValidationIssue {
                issue_type: IssueType::UnusualValue,
                field: Some("irregular_risk_level".to_string()),
                message: format!(
                    "Score {} maps to '{}' under the default calibration, record says '{}'",
                    score,
                    expected.as_str(),
                    level
                ),
                severity: Severity::Warning,
            });
        }
    }
}

/// Validation report containing all issues found
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Validation errors (must be fixed)
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (should be reviewed)
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Create new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    /// Add a warning
    pub fn add_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    /// Get total issue count
    pub fn total_issues(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    /// True if any issue of the given type was raised
    pub fn has(&self, issue_type: IssueType) -> bool {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .any(|i| i.issue_type == issue_type)
    }
}

/// Individual validation issue
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Type of issue
    pub issue_type: IssueType,

    /// Field that caused the issue (if applicable)
    pub field: Option<String>,

    /// Human-readable message
    pub message: String,

    /// Issue severity
    pub severity: Severity,
}

/// Types of validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueType {
    /// Value doesn't match the schema
    TypeMismatch,

    /// NaN or infinite number
    NonFinite,

    /// Score outside [0, 1]
    OutOfRange,

    /// Heart rate outside the physiological band
    PhysiologyViolation,

    /// Mode, tier or degradation string not recognised
    UnknownSymbol,

    /// Fields that contradict each other
    InconsistentFields,

    /// Value is unusual but not impossible
    UnusualValue,
}

/// Issue severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Should be reviewed
    Warning,

    /// Must be fixed
    Error,
}
