//! Typed clinical records produced by the mappers.
//!
//! Records hold domain values (dates, enumerations, optional numbers). They are converted
//! into wire resources only at the assembly boundary via the `to_resource` methods, so the
//! mapping logic never touches JSON shapes.

use chrono::{DateTime, NaiveDate, Utc};
use fhir::codes::{
    ACT_CODE_SYSTEM, ALLERGY_CLINICAL_SYSTEM, ALLERGY_VERIFICATION_SYSTEM, BLOOD_PRESSURE_PANEL,
    BLOOD_PRESSURE_UNIT, DIASTOLIC, HEART_RATE, HEART_RATE_UCUM, HEART_RATE_UNIT, ICD10_SYSTEM,
    LOINC_SYSTEM, NHS_NUMBER_SYSTEM, SNOMED_SYSTEM, SYSTOLIC,
};
use fhir::{
    AllergyIntolerance, AllergyReaction, CodeableConcept, Coding, ContactPoint, Encounter,
    HumanName, Identifier, Observation, ObservationComponent, Patient, Quantity, Reference,
    Resource,
};

// ============================================================================
// Patient
// ============================================================================

/// Administrative sex, closed over the three values the bridge emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
}

impl AdministrativeGender {
    /// Map a source sex code; anything unrecognised is `Other`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "M" => Self::Male,
            "F" => Self::Female,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatientRecord {
    /// National identifier exactly as supplied; checksum checks happen at validation.
    pub identifier: String,
    pub family: String,
    pub given: Option<String>,
    pub prefix: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: AdministrativeGender,
    pub phone: Option<String>,
}

impl PatientRecord {
    pub fn to_resource(&self) -> Resource {
        let name = HumanName {
            family: Some(self.family.clone()),
            given: self.given.iter().cloned().collect(),
            prefix: self.prefix.iter().cloned().collect(),
        };

        let telecom = self
            .phone
            .iter()
            .map(|phone| ContactPoint {
                system: Some("phone".into()),
                use_type: Some("home".into()),
                value: Some(phone.clone()),
            })
            .collect();

        Resource::Patient(Patient {
            id: Some(self.identifier.clone()),
            identifier: vec![Identifier {
                system: Some(NHS_NUMBER_SYSTEM.into()),
                value: Some(self.identifier.clone()),
            }],
            name: vec![name],
            birth_date: self
                .birth_date
                .map(|date| date.format("%Y-%m-%d").to_string()),
            gender: Some(self.gender.as_str().into()),
            telecom,
        })
    }
}

// ============================================================================
// Encounter
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncounterStatus {
    InProgress,
    Finished,
    Unknown,
}

impl EncounterStatus {
    /// Map a message trigger event to an encounter status.
    pub fn from_trigger(trigger: &str) -> Self {
        match trigger {
            "A01" | "A08" => Self::InProgress,
            "A03" => Self::Finished,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Finished => "finished",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EncounterRecord {
    pub status: EncounterStatus,
    pub class_code: String,
    /// Ward, room and bed joined with `-`.
    pub location: String,
    pub subject: String,
}

impl EncounterRecord {
    pub fn class_display(&self) -> &'static str {
        match self.class_code.as_str() {
            "I" => "Inpatient",
            "E" => "Emergency",
            "O" => "Outpatient",
            _ => "Unknown",
        }
    }

    pub fn to_resource(&self) -> Resource {
        Resource::Encounter(Encounter {
            status: Some(self.status.as_str().into()),
            class: Some(Coding::new(
                ACT_CODE_SYSTEM,
                &self.class_code,
                self.class_display(),
            )),
            subject: Some(Reference::patient(&self.subject)),
            type_: vec![CodeableConcept::from_text(format!(
                "Location: {}",
                self.location
            ))],
        })
    }
}

// ============================================================================
// Observation
// ============================================================================

/// The vital signs the bridge recognises in result segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VitalSign {
    HeartRate,
    Systolic,
    Diastolic,
}

impl VitalSign {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            HEART_RATE => Some(Self::HeartRate),
            SYSTOLIC => Some(Self::Systolic),
            DIASTOLIC => Some(Self::Diastolic),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::HeartRate => HEART_RATE,
            Self::Systolic => SYSTOLIC,
            Self::Diastolic => DIASTOLIC,
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Self::HeartRate => "Heart rate",
            Self::Systolic => "Systolic",
            Self::Diastolic => "Diastolic",
        }
    }

    fn quantity(&self, value: Option<f64>) -> Quantity {
        match self {
            Self::HeartRate => Quantity {
                value,
                unit: Some(HEART_RATE_UNIT.into()),
                code: Some(HEART_RATE_UCUM.into()),
            },
            Self::Systolic | Self::Diastolic => Quantity {
                value,
                unit: Some(BLOOD_PRESSURE_UNIT.into()),
                code: None,
            },
        }
    }

    fn concept(&self) -> CodeableConcept {
        CodeableConcept::from_coding(Coding::new(LOINC_SYSTEM, self.code(), self.display()))
    }
}

/// One reading; the value is `None` when the source text was not a finite number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub sign: VitalSign,
    pub value: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ObservationValue {
    Single(Measurement),
    BloodPressurePanel {
        systolic: Measurement,
        diastolic: Measurement,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObservationRecord {
    pub subject: String,
    pub effective: Option<DateTime<Utc>>,
    pub value: ObservationValue,
}

impl ObservationRecord {
    pub fn to_resource(&self) -> Resource {
        let mut observation = Observation {
            status: Some("final".into()),
            subject: Some(Reference::patient(&self.subject)),
            effective_date_time: self.effective.map(|t| t.to_rfc3339()),
            ..Observation::default()
        };

        match &self.value {
            ObservationValue::Single(measurement) => {
                observation.code = Some(measurement.sign.concept());
                observation.value_quantity = Some(measurement.sign.quantity(measurement.value));
            }
            ObservationValue::BloodPressurePanel {
                systolic,
                diastolic,
            } => {
                observation.code = Some(CodeableConcept::from_coding(Coding::new(
                    LOINC_SYSTEM,
                    BLOOD_PRESSURE_PANEL,
                    "Blood pressure panel",
                )));
                observation.component = [systolic, diastolic]
                    .into_iter()
                    .map(|m| ObservationComponent {
                        code: Some(m.sign.concept()),
                        value_quantity: Some(m.sign.quantity(m.value)),
                    })
                    .collect();
            }
        }

        Resource::Observation(observation)
    }
}

// ============================================================================
// AllergyIntolerance
// ============================================================================

/// Two-level criticality: only a severe source code is `High`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Criticality {
    High,
    Low,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactionSeverity {
    Moderate,
    Severe,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllergyCategory {
    Medication,
    Food,
}

impl Criticality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

impl ReactionSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

impl AllergyCategory {
    pub fn from_type_code(code: &str) -> Self {
        if code == "DA" {
            Self::Medication
        } else {
            Self::Food
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medication => "medication",
            Self::Food => "food",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Allergen {
    pub code: String,
    pub display: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AllergyRecord {
    pub subject: String,
    /// `None` when the allergen field was empty.
    pub allergen: Option<Allergen>,
    pub category: AllergyCategory,
    pub criticality: Criticality,
    pub severity: ReactionSeverity,
    pub reaction: String,
}

impl AllergyRecord {
    pub fn to_resource(&self) -> Resource {
        let code = self.allergen.as_ref().map(|a| {
            CodeableConcept::from_coding(Coding::new(ICD10_SYSTEM, &a.code, &a.display))
        });

        let manifestation = CodeableConcept {
            coding: vec![Coding {
                system: Some(SNOMED_SYSTEM.into()),
                code: None,
                display: Some(self.reaction.clone()),
            }],
            text: Some(self.reaction.clone()),
        };

        Resource::AllergyIntolerance(AllergyIntolerance {
            clinical_status: Some(status_concept(ALLERGY_CLINICAL_SYSTEM, "active")),
            verification_status: Some(status_concept(ALLERGY_VERIFICATION_SYSTEM, "confirmed")),
            type_: Some("allergy".into()),
            category: vec![self.category.as_str().into()],
            criticality: Some(self.criticality.as_str().into()),
            code,
            patient: Some(Reference::patient(&self.subject)),
            reaction: vec![AllergyReaction {
                manifestation: vec![manifestation],
                severity: Some(self.severity.as_str().into()),
            }],
        })
    }
}

fn status_concept(system: &str, code: &str) -> CodeableConcept {
    CodeableConcept::from_coding(Coding {
        system: Some(system.into()),
        code: Some(code.into()),
        display: None,
    })
}
