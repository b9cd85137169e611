//! Validation rules.
//!
//! Every function here is pure: the wall-clock instant used by temporal rules is passed in, so
//! the same artifact and instant always produce the same findings.

use bridge_types::NhsNumber;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fhir::codes::{BLOOD_PRESSURE_PANEL, DIASTOLIC, HEART_RATE, HEART_RATE_UNIT, SYSTOLIC};
use fhir::{AllergyIntolerance, Artifact, Observation, Patient, Resource};
use std::fmt;
use std::ops::RangeInclusive;

const HEART_RATE_RANGE: RangeInclusive<f64> = 0.0..=300.0;
const SYSTOLIC_RANGE: RangeInclusive<f64> = 50.0..=300.0;
const DIASTOLIC_RANGE: RangeInclusive<f64> = 40.0..=200.0;

const FINDING_SEPARATOR: &str = ", ";

/// A single rule failure, phrased for operators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding(String);

impl Finding {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Informational flag that never causes a rejection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advisory {
    HighCriticalityAllergy { allergen: Option<String> },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::HighCriticalityAllergy { allergen } => write!(
                f,
                "high criticality allergy: {}",
                allergen.as_deref().unwrap_or("unspecified allergen")
            ),
        }
    }
}

/// Outcome for one artifact.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Verdict {
    pub findings: Vec<Finding>,
    pub advisories: Vec<Advisory>,
}

impl Verdict {
    pub fn rejected(finding: Finding) -> Self {
        Self {
            findings: vec![finding],
            advisories: Vec::new(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.findings.is_empty()
    }

    /// All findings joined into one reason string.
    pub fn combined(&self) -> String {
        self.findings
            .iter()
            .map(Finding::as_str)
            .collect::<Vec<_>>()
            .join(FINDING_SEPARATOR)
    }
}

/// Rule evaluation facade.
pub struct ValidationEngine;

impl ValidationEngine {
    /// Evaluate every resource in an artifact. Findings accumulate in resource order.
    pub fn evaluate(artifact: &Artifact, now: DateTime<Utc>) -> Verdict {
        let mut verdict = Verdict::default();
        for resource in artifact.resources() {
            match resource {
                Resource::Patient(patient) => verdict.findings.extend(validate_patient(patient)),
                Resource::Observation(observation) => verdict
                    .findings
                    .extend(validate_observation(observation, now)),
                Resource::AllergyIntolerance(allergy) => {
                    verdict.findings.extend(validate_allergy(allergy));
                    verdict.advisories.extend(allergy_advisory(allergy));
                }
                Resource::Encounter(_) | Resource::Unsupported => {}
            }
        }
        verdict
    }
}

// ============================================================================
// Patient
// ============================================================================

pub fn validate_patient(patient: &Patient) -> Vec<Finding> {
    let mut findings = Vec::new();

    match patient.nhs_identifier() {
        None => findings.push(Finding::new("Missing NHS Number")),
        Some(identifier) => {
            let valid = identifier.value.as_deref().is_some_and(NhsNumber::is_valid);
            if !valid {
                findings.push(Finding::new("Invalid NHS Number Checksum"));
            }
        }
    }

    if let Some(dob) = patient.birth_date.as_deref().filter(|d| !d.is_empty()) {
        if NaiveDate::parse_from_str(dob, "%Y-%m-%d").is_err() {
            findings.push(Finding::new(format!("Invalid Date Format: {dob}")));
        }
    }

    match patient.name.first() {
        None => findings.push(Finding::new("Missing Name Record")),
        Some(name) => {
            if name.family.as_deref().unwrap_or_default().is_empty() {
                findings.push(Finding::new("Missing Family Name (Surname)"));
            }
        }
    }

    findings
}

// ============================================================================
// Observation
// ============================================================================

pub fn validate_observation(observation: &Observation, now: DateTime<Utc>) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Some(raw) = observation
        .effective_date_time
        .as_deref()
        .filter(|t| !t.is_empty())
    {
        match parse_effective(raw) {
            Some(instant) if instant > now => {
                findings.push(Finding::new(format!("Timestamp is in the future: {raw}")))
            }
            Some(_) => {}
            None => findings.push(Finding::new("Unparseable Timestamp")),
        }
    }

    if observation.has_code(HEART_RATE) {
        let quantity = observation.value_quantity.as_ref();

        let unit = quantity.and_then(|q| q.unit.as_deref());
        if unit != Some(HEART_RATE_UNIT) {
            findings.push(Finding::new(format!(
                "Invalid Unit for Heart Rate: {}",
                unit.unwrap_or("none")
            )));
        }

        match quantity.and_then(|q| q.value) {
            None => findings.push(Finding::new("Missing Heart Rate Value")),
            Some(value) if !HEART_RATE_RANGE.contains(&value) => findings.push(Finding::new(
                format!("Clinically Impossible Heart Rate: {value}"),
            )),
            Some(_) => {}
        }
    }

    if observation.has_code(BLOOD_PRESSURE_PANEL) {
        findings.extend(validate_pressure_components(observation));
    }

    findings
}

fn validate_pressure_components(observation: &Observation) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut systolic = None;
    let mut diastolic = None;

    for component in &observation.component {
        let Some(value) = component.value() else {
            if component.has_code(SYSTOLIC) {
                findings.push(Finding::new("Missing Systolic Value"));
            }
            if component.has_code(DIASTOLIC) {
                findings.push(Finding::new("Missing Diastolic Value"));
            }
            continue;
        };

        if component.has_code(SYSTOLIC) {
            systolic = Some(value);
            if !SYSTOLIC_RANGE.contains(&value) {
                findings.push(Finding::new(format!(
                    "Clinically Impossible Systolic: {value}"
                )));
            }
        }

        if component.has_code(DIASTOLIC) {
            diastolic = Some(value);
            if !DIASTOLIC_RANGE.contains(&value) {
                findings.push(Finding::new(format!(
                    "Clinically Impossible Diastolic: {value}"
                )));
            }
        }
    }

    if let (Some(sys), Some(dia)) = (systolic, diastolic) {
        if dia >= sys {
            findings.push(Finding::new(format!(
                "Pulse Pressure Error: Diastolic ({dia}) >= Systolic ({sys})"
            )));
        }
    }

    findings
}

/// Parse an effective timestamp. Offset-less values are taken as UTC; a bare date is midnight.
pub fn parse_effective(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M%z",
        "%Y-%m-%dT%H:%M%:z",
    ] {
        if let Ok(instant) = DateTime::parse_from_str(raw, format) {
            return Some(instant.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ============================================================================
// AllergyIntolerance
// ============================================================================

pub fn validate_allergy(allergy: &AllergyIntolerance) -> Vec<Finding> {
    let mut findings = Vec::new();

    if !allergy.patient.as_ref().is_some_and(|p| p.is_linked()) {
        findings.push(Finding::new("Orphaned Allergy (No Patient Link)"));
    }
    if !allergy.has_allergen_coding() {
        findings.push(Finding::new("Missing Allergen Code"));
    }

    findings
}

pub fn allergy_advisory(allergy: &AllergyIntolerance) -> Option<Advisory> {
    if allergy.criticality.as_deref() != Some("high") {
        return None;
    }

    let allergen = allergy
        .code
        .as_ref()
        .and_then(|c| c.coding.first())
        .and_then(|c| c.display.clone().or_else(|| c.code.clone()));
    Some(Advisory::HighCriticalityAllergy { allergen })
}
