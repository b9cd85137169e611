//! FHIR-aligned Patient wire model.

use crate::codes::NHS_NUMBER_SYSTEM_MARKER;
use crate::datatypes::{ContactPoint, HumanName, Identifier};
use serde::{Deserialize, Serialize};

/// Patient demographics as carried in a bundle artifact.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    /// Birth date, expected as `YYYY-MM-DD` but kept as text so malformed values survive parsing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
}

impl Patient {
    /// The first identifier whose system names the national identifier scheme.
    pub fn nhs_identifier(&self) -> Option<&Identifier> {
        self.identifier.iter().find(|i| {
            i.system
                .as_deref()
                .is_some_and(|s| s.contains(NHS_NUMBER_SYSTEM_MARKER))
        })
    }

    /// Family name of the first name entry, if any.
    pub fn primary_family(&self) -> Option<&str> {
        self.name.first().and_then(|n| n.family.as_deref())
    }
}
