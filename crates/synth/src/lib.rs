//! Collaborators that exercise the bridge from outside.
//!
//! - [`feed`] writes synthetic admission and result messages into an inbound directory
//! - [`chaos`] randomly damages bundle artifacts before validation
//!
//! Neither is known to the transformer or the gate; they only produce files.

pub mod chaos;
pub mod feed;
mod pools;

pub use chaos::{run_chaos, ChaosSummary, Mutation, DEFAULT_ERROR_RATE};
pub use feed::{generate_message, run_feed, GeneratedMessage, MessageKind};

#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("artifact storage error: {0}")]
    Files(#[from] bridge_files::FilesError),
    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type SynthResult<T> = std::result::Result<T, SynthError>;
