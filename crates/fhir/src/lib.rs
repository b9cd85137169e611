//! FHIR wire support for the message bridge.
//!
//! This crate provides **wire models** for the bundle artifacts exchanged between the
//! transformer and the quality gate:
//! - JSON bundles of Patient, Encounter, Observation and AllergyIntolerance resources
//! - standalone resource artifacts
//!
//! This crate focuses on:
//! - FHIR R4 semantic alignment for the handful of elements the bridge produces
//! - serialisation/deserialisation
//! - shared code systems and codes
//!
//! Parsing is deliberately lenient: every element is optional so that damaged artifacts still
//! load and can be judged by validation rules rather than failing at the schema layer. Only
//! structurally unreadable JSON or wrongly typed values surface as [`FhirError`].

pub mod allergy;
pub mod bundle;
pub mod codes;
pub mod datatypes;
pub mod encounter;
pub mod observation;
pub mod patient;

// Re-export facades
pub use bundle::{Artifact, Bundle, BundleArtifact, BundleEntry, Resource};

// Re-export resource and datatype models
pub use allergy::{AllergyIntolerance, AllergyReaction};
pub use datatypes::{CodeableConcept, Coding, ContactPoint, HumanName, Identifier, Quantity, Reference};
pub use encounter::Encounter;
pub use observation::{Observation, ObservationComponent};
pub use patient::Patient;

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
