//! # Quality Gate
//!
//! Rule-based validation of bundle artifacts and the persistent rejection audit trail.
//!
//! - [`engine`]: pure per-resource rule sets returning findings and advisories
//! - [`history`]: the history model and the reconciler applying Active/Resolved transitions
//! - [`store`]: loading and saving the history store
//! - [`report`]: the HTML audit report
//! - [`gate`]: a validation run over a bundle directory

pub mod engine;
pub mod gate;
pub mod history;
pub mod report;
pub mod store;

pub use engine::{Advisory, Finding, ValidationEngine, Verdict};
pub use gate::{judge, run_gate, run_gate_at, GateConfig, GateSummary, Rejection};
pub use history::{AuditTrailReconciler, History, HistoryEntry, HistoryStatus, ReconcileReport};
pub use store::HistoryStore;

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("artifact storage error: {0}")]
    Files(#[from] bridge_files::FilesError),
    #[error("history serialization error: {0}")]
    HistorySerialization(#[from] serde_json::Error),
}

pub type GateResult<T> = std::result::Result<T, GateError>;
