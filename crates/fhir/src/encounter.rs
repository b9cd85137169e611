//! FHIR-aligned Encounter wire model.

use crate::datatypes::{CodeableConcept, Coding, Reference};
use serde::{Deserialize, Serialize};

/// A visit as carried in a bundle artifact.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Encounter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<Coding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub type_: Vec<CodeableConcept>,
}
