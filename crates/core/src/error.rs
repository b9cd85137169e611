#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("message parse failed: {0}")]
    Parse(#[from] hl7::Hl7Error),
    #[error("message has no patient identity segment")]
    MissingPatient,
    #[error("message could not be read: {0}")]
    UnreadableMessage(#[source] bridge_files::FilesError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("artifact storage error: {0}")]
    Files(#[from] bridge_files::FilesError),
}

impl BridgeError {
    /// True for failures that drop a single message without aborting the batch.
    pub fn is_message_scoped(&self) -> bool {
        matches!(
            self,
            BridgeError::Parse(_) | BridgeError::MissingPatient | BridgeError::UnreadableMessage(_)
        )
    }
}

pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
