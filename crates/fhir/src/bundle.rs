//! Bundle artifacts: the unit of exchange between transformer and quality gate.
//!
//! Responsibilities:
//! - Define the `Resource` union over the resource types the bridge understands
//! - Define `Bundle` and its entries
//! - Parse an artifact that is either a bundle or a standalone resource
//! - Render bundles as pretty-printed JSON
//!
//! Notes:
//! - Resource types outside the union parse as [`Resource::Unsupported`] and carry no rules
//! - Schema mismatches report a best-effort path via `serde_path_to_error`

use crate::{AllergyIntolerance, Encounter, FhirError, FhirResult, Observation, Patient};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const BUNDLE_RESOURCE_TYPE: &str = "Bundle";
const TRANSACTION: &str = "transaction";

/// Any resource that can appear in a bundle entry or as a standalone artifact.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Patient(Patient),
    Encounter(Encounter),
    Observation(Observation),
    AllergyIntolerance(AllergyIntolerance),
    #[serde(other)]
    Unsupported,
}

impl Resource {
    pub fn type_name(&self) -> &'static str {
        match self {
            Resource::Patient(_) => "Patient",
            Resource::Encounter(_) => "Encounter",
            Resource::Observation(_) => "Observation",
            Resource::AllergyIntolerance(_) => "AllergyIntolerance",
            Resource::Unsupported => "Unsupported",
        }
    }
}

fn bundle_resource_type() -> String {
    BUNDLE_RESOURCE_TYPE.to_owned()
}

/// An ordered collection of resources derived from one source message.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default = "bundle_resource_type")]
    pub resource_type: String,

    /// Stable identity: the stem of the source artifact name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    /// Build a transaction bundle wrapping `resources` in order.
    pub fn transaction(id: impl Into<String>, resources: Vec<Resource>) -> Self {
        Self {
            resource_type: bundle_resource_type(),
            id: Some(id.into()),
            type_: Some(TRANSACTION.to_owned()),
            entry: resources
                .into_iter()
                .map(|resource| BundleEntry {
                    resource: Some(resource),
                })
                .collect(),
        }
    }

    /// Resources of all entries that carry one, in entry order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().filter_map(|e| e.resource.as_ref())
    }

    pub fn resources_mut(&mut self) -> impl Iterator<Item = &mut Resource> {
        self.entry.iter_mut().filter_map(|e| e.resource.as_mut())
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct BundleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
}

/// Top-level content of an artifact file.
#[derive(Clone, Debug, PartialEq)]
pub enum Artifact {
    Bundle(Bundle),
    Resource(Resource),
}

impl Artifact {
    /// Every resource the artifact carries, in order.
    pub fn resources(&self) -> Vec<&Resource> {
        match self {
            Artifact::Bundle(bundle) => bundle.resources().collect(),
            Artifact::Resource(resource) => vec![resource],
        }
    }
}

/// Bundle artifact operations.
///
/// This is a zero-sized type used for namespacing artifact parse/render operations.
pub struct BundleArtifact;

impl BundleArtifact {
    /// Parse artifact JSON into a bundle or a standalone resource.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the text is not JSON,
    /// - the top-level object has no `resourceType`,
    /// - any element has an unexpected type.
    pub fn parse(json_text: &str) -> FhirResult<Artifact> {
        let value: Value = serde_json::from_str(json_text)?;

        let resource_type = value
            .get("resourceType")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| FhirError::InvalidInput("missing resourceType".into()))?;

        if resource_type == BUNDLE_RESOURCE_TYPE {
            deserialize_tracked::<Bundle>(value, &resource_type).map(Artifact::Bundle)
        } else {
            deserialize_tracked::<Resource>(value, &resource_type).map(Artifact::Resource)
        }
    }

    /// Render a bundle as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if serialisation fails.
    pub fn render(bundle: &Bundle) -> FhirResult<String> {
        serde_json::to_string_pretty(bundle)
            .map_err(|e| FhirError::Translation(format!("Failed to serialise bundle: {e}")))
    }
}

fn deserialize_tracked<T: DeserializeOwned>(value: Value, label: &str) -> FhirResult<T> {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(FhirError::Translation(format!(
                "{label} schema mismatch at {path}: {source}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::HEART_RATE;
    use crate::{CodeableConcept, Coding, Quantity, Reference};

    fn heart_rate(value: f64) -> Resource {
        Resource::Observation(Observation {
            status: Some("final".into()),
            subject: Some(Reference::patient("9434765919")),
            code: Some(CodeableConcept::from_coding(Coding::new(
                crate::codes::LOINC_SYSTEM,
                HEART_RATE,
                "Heart rate",
            ))),
            effective_date_time: Some("2024-01-05T10:30:00+00:00".into()),
            value_quantity: Some(Quantity {
                value: Some(value),
                unit: Some("beats/minute".into()),
                code: Some("/min".into()),
            }),
            component: vec![],
        })
    }

    #[test]
    fn round_trips_transaction_bundle() {
        let bundle = Bundle::transaction(
            "ORU_SMITH_482913",
            vec![
                Resource::Patient(Patient {
                    id: Some("9434765919".into()),
                    ..Patient::default()
                }),
                heart_rate(72.0),
            ],
        );

        let json = BundleArtifact::render(&bundle).expect("render bundle");
        assert!(json.contains("\"resourceType\": \"Bundle\""));
        assert!(json.contains("\"type\": \"transaction\""));
        assert!(json.contains("\"resourceType\": \"Observation\""));

        let parsed = BundleArtifact::parse(&json).expect("parse bundle");
        assert_eq!(parsed, Artifact::Bundle(bundle));
    }

    #[test]
    fn parses_standalone_resource() {
        let input = r#"{"resourceType": "Patient", "id": "9434765919"}"#;
        let artifact = BundleArtifact::parse(input).expect("parse patient");
        let resources = artifact.resources();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].type_name(), "Patient");
    }

    #[test]
    fn unknown_resource_types_are_unsupported() {
        let input = r#"{"resourceType": "Bundle", "entry": [
  {"resource": {"resourceType": "Medication", "id": "m1"}},
  {}
]}"#;
        let Artifact::Bundle(bundle) = BundleArtifact::parse(input).expect("parse bundle") else {
            panic!("expected a bundle");
        };
        assert_eq!(bundle.entry.len(), 2);
        let resources: Vec<_> = bundle.resources().collect();
        assert_eq!(resources, vec![&Resource::Unsupported]);
    }

    #[test]
    fn rejects_missing_resource_type() {
        let err = BundleArtifact::parse(r#"{"entry": []}"#).expect_err("should reject");
        assert!(matches!(err, FhirError::InvalidInput(msg) if msg.contains("resourceType")));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = BundleArtifact::parse("{not json").expect_err("should reject");
        assert!(matches!(err, FhirError::InvalidJson(_)));
    }

    #[test]
    fn reports_schema_mismatch() {
        let input = r#"{"resourceType": "Bundle", "entry": "not_an_array"}"#;
        let err = BundleArtifact::parse(input).expect_err("should reject wrong type");
        match err {
            FhirError::Translation(msg) => {
                assert!(msg.contains("Bundle schema mismatch"));
                assert!(msg.contains("entry"));
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }
}
