//! Per-message bundle assembly.
//!
//! One source message becomes one transaction bundle whose identity is the stem of the source
//! artifact name. Which records are attached depends on the message class:
//! - admission messages: patient, encounter, allergies
//! - result messages: patient, observations
//! - anything else: patient only

use crate::constants::BUNDLE_EXTENSION;
use crate::mapping::{map_allergies, map_encounter, map_observations, map_patient};
use crate::{BridgeError, BridgeResult};
use bridge_files::with_extension;
use fhir::{Bundle, BundleArtifact};
use hl7::{MessageClass, RawMessage};
use std::path::Path;

/// A bundle ready to be written, with the artifact name it should be written under.
#[derive(Clone, Debug)]
pub struct AssembledBundle {
    pub output_name: String,
    pub bundle: Bundle,
    /// Family name of the subject, for operator logs.
    pub family: String,
}

impl AssembledBundle {
    pub fn render(&self) -> BridgeResult<String> {
        Ok(BundleArtifact::render(&self.bundle)?)
    }

    pub fn resource_count(&self) -> usize {
        self.bundle.entry.len()
    }
}

/// Zero-sized facade for building bundles from parsed messages.
pub struct BundleAssembler;

impl BundleAssembler {
    /// Assemble the bundle for one message read from `source_name`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingPatient`] when the message has no patient identity segment.
    pub fn assemble(source_name: &str, message: &RawMessage) -> BridgeResult<AssembledBundle> {
        let segments = message.segments();
        let patient = map_patient(segments).ok_or(BridgeError::MissingPatient)?;
        let subject = patient.identifier.clone();

        let mut resources = vec![patient.to_resource()];
        match message.message_type().class() {
            MessageClass::Admission => {
                if let Some(encounter) =
                    map_encounter(segments, &subject, message.message_type().trigger())
                {
                    resources.push(encounter.to_resource());
                }
                resources.extend(map_allergies(segments, &subject).iter().map(|a| a.to_resource()));
            }
            MessageClass::Result => {
                resources.extend(
                    map_observations(segments, &subject)
                        .iter()
                        .map(|o| o.to_resource()),
                );
            }
            MessageClass::Other => {}
        }

        Ok(AssembledBundle {
            output_name: with_extension(source_name, BUNDLE_EXTENSION),
            bundle: Bundle::transaction(bundle_id(source_name), resources),
            family: patient.family,
        })
    }
}

/// Parse and assemble one message.
///
/// # Errors
///
/// Returns [`BridgeError::Parse`] for a malformed header and
/// [`BridgeError::MissingPatient`] when no patient segment is present.
pub fn transform_message(source_name: &str, text: &str) -> BridgeResult<AssembledBundle> {
    let message = RawMessage::parse(text)?;
    BundleAssembler::assemble(source_name, &message)
}

fn bundle_id(source_name: &str) -> String {
    Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source_name)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::codes::{BLOOD_PRESSURE_PANEL, HEART_RATE};
    use fhir::{Artifact, Resource};

    const ADMISSION: &str = "MSH|^~\\&|PAS_LEGACY|NORTH_TRUST|FHIR_RECEIVER|NHS_DATA_LAKE|20240105103000||ADT^A01|482913|P|2.3\n\
PID|1||9434765919^^^NHS||SMITH^Jane^^^^MS||19800101|F|||LS1 4AP||01632 960123\n\
PV1|1|I|CARDIO^5^2||||123^JONES^DR\n\
AL1|1|DA|Z88.0^PENICILLIN^CD|SV|Anaphylaxis\n";

    const RESULT: &str = "MSH|^~\\&|LAB|NORTH_TRUST|FHIR_RECEIVER|NHS_DATA_LAKE|20240105103000||ORU^R01|771204|P|2.3\r\
PID|1||4010232137^^^NHS||PATEL^Ravi||19751212|M\r\
OBR|1|ORD1|FIL1|VITALS|||20240105101500\r\
OBX|1|NM|8480-6^SYSTOLIC^LN||132|mmHg|||||F\r\
OBX|2|NM|8462-4^DIASTOLIC^LN||84|mmHg|||||F\r";

    fn reparse(assembled: &AssembledBundle) -> Bundle {
        let json = assembled.render().expect("render bundle");
        match BundleArtifact::parse(&json).expect("reparse bundle") {
            Artifact::Bundle(bundle) => bundle,
            Artifact::Resource(_) => panic!("expected bundle artifact"),
        }
    }

    fn count_resources(bundle: &Bundle, type_name: &str) -> usize {
        bundle
            .resources()
            .filter(|r| r.type_name() == type_name)
            .count()
    }

    fn patient_of(bundle: &Bundle) -> fhir::Patient {
        bundle
            .resources()
            .find_map(|r| match r {
                Resource::Patient(p) => Some(p.clone()),
                _ => None,
            })
            .expect("bundle has patient")
    }

    #[test]
    fn admission_round_trip_recovers_identity() {
        let assembled = transform_message("ADT_SMITH_482913.hl7", ADMISSION).expect("assemble");
        assert_eq!(assembled.output_name, "ADT_SMITH_482913.json");
        assert_eq!(assembled.family, "SMITH");

        let bundle = reparse(&assembled);
        assert_eq!(bundle.id.as_deref(), Some("ADT_SMITH_482913"));
        assert_eq!(bundle.type_.as_deref(), Some("transaction"));

        let patient = patient_of(&bundle);
        assert_eq!(
            patient.nhs_identifier().and_then(|i| i.value.as_deref()),
            Some("9434765919")
        );
        assert_eq!(patient.primary_family(), Some("SMITH"));
        assert_eq!(patient.name[0].given, vec!["Jane".to_string()]);

        assert_eq!(count_resources(&bundle, "Encounter"), 1);
        assert_eq!(count_resources(&bundle, "AllergyIntolerance"), 1);
        assert_eq!(count_resources(&bundle, "Observation"), 0);
    }

    #[test]
    fn result_round_trip_recovers_identity_and_panel() {
        let assembled = transform_message("ORU_PATEL_771204.hl7", RESULT).expect("assemble");
        let bundle = reparse(&assembled);

        let patient = patient_of(&bundle);
        assert_eq!(patient.id.as_deref(), Some("4010232137"));
        assert_eq!(patient.primary_family(), Some("PATEL"));

        let observations: Vec<_> = bundle
            .resources()
            .filter_map(|r| match r {
                Resource::Observation(o) => Some(o),
                _ => None,
            })
            .collect();
        assert_eq!(observations.len(), 1);
        assert!(observations[0].has_code(BLOOD_PRESSURE_PANEL));
        assert!(!observations[0].has_code(HEART_RATE));
        assert_eq!(observations[0].component.len(), 2);
        assert_eq!(count_resources(&bundle, "Encounter"), 0);
    }

    #[test]
    fn unclassified_message_yields_patient_only_bundle() {
        let text = ADMISSION.replace("ADT^A01", "MDM^T02");
        let assembled = transform_message("MDM_SMITH_1.hl7", &text).expect("assemble");
        assert_eq!(assembled.resource_count(), 1);
        assert_eq!(count_resources(&assembled.bundle, "Patient"), 1);
    }

    #[test]
    fn missing_patient_is_message_scoped_failure() {
        let text = "MSH|^~\\&|LAB|T|R|D|20240105||ORU^R01|1\nOBX|1|NM|8867-4^HR^LN||72|bpm";
        let err = transform_message("ORU_X_1.hl7", text).expect_err("no patient");
        assert!(matches!(err, BridgeError::MissingPatient));
        assert!(err.is_message_scoped());
    }

    #[test]
    fn malformed_header_is_message_scoped_failure() {
        let err = transform_message("BAD.hl7", "MSH|^~\\&|LAB|T|R|D|20240105||").expect_err("no type");
        assert!(matches!(err, BridgeError::Parse(_)));
        assert!(err.is_message_scoped());
    }
}
