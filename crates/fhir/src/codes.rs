//! Code systems and codes used by the bridge.

pub const LOINC_SYSTEM: &str = "http://loinc.org";
pub const NHS_NUMBER_SYSTEM: &str = "https://fhir.nhs.uk/nhs-number";
pub const ACT_CODE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";
pub const ICD10_SYSTEM: &str = "http://hl7.org/fhir/sid/icd-10";
pub const SNOMED_SYSTEM: &str = "http://snomed.info/sct";
pub const ALLERGY_CLINICAL_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/allergyintolerance-clinical";
pub const ALLERGY_VERIFICATION_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/allergyintolerance-verification";

/// Substring identifying a national identifier system on read.
pub const NHS_NUMBER_SYSTEM_MARKER: &str = "nhs-number";

pub const HEART_RATE: &str = "8867-4";
pub const HEART_RATE_UNIT: &str = "beats/minute";
pub const HEART_RATE_UCUM: &str = "/min";

pub const BLOOD_PRESSURE_PANEL: &str = "85354-9";
pub const SYSTOLIC: &str = "8480-6";
pub const DIASTOLIC: &str = "8462-4";
pub const BLOOD_PRESSURE_UNIT: &str = "mmHg";
