//! # Bridge Core
//!
//! Message-to-record transformation for the bridge.
//!
//! This crate turns parsed pipe-delimited messages into FHIR bundle artifacts:
//! - typed clinical records ([`records`]) produced by four independent mappers ([`mapping`])
//! - per-message bundle assembly with a stable identity ([`assembler`])
//! - a batch run over a directory of source messages ([`transformer`])
//!
//! **No validation concerns**: judging bundles and keeping the rejection history belong in
//! `quality-gate`, which only ever sees the artifacts written here.

pub mod assembler;
pub mod config;
pub mod constants;
pub mod error;
pub mod mapping;
pub mod records;
pub mod transformer;

pub use assembler::{transform_message, AssembledBundle, BundleAssembler};
pub use config::PipelineConfig;
pub use error::{BridgeError, BridgeResult};
pub use transformer::{run_transformer, SkippedMessage, TransformSummary};
