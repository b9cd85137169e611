//! Artifact directory storage.
//!
//! The transformer and the quality gate communicate only through files on disk. This crate
//! owns the handful of filesystem operations both sides need:
//!
//! - listing the artifacts of one kind in a directory, in stable name order
//! - writing an artifact as a whole-file replacement (never a partial write)
//! - copying an artifact into another directory and removing stale copies
//!
//! ```text
//! data/
//! ├── hl7_inbound/   # *.hl7 source messages
//! ├── raw/           # *.json bundle artifacts
//! ├── accepted/      # bundles that passed every rule
//! ├── rejected/      # bundles with at least one finding
//! └── rejection_log.json
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use bridge_files::ArtifactDir;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let inbound = ArtifactDir::open(Path::new("data/hl7_inbound"))?;
//! for path in inbound.list("hl7")? {
//!     println!("{}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

mod artifacts;

pub use artifacts::{artifact_name, with_extension, write_replacing, ArtifactDir};

/// Errors that can occur during artifact operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Directory does not exist or is not a directory
    #[error("Invalid directory: {0}")]
    InvalidDirectory(String),

    /// Artifact name is empty or would escape its directory
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for artifact operations.
pub type FilesResult<T> = Result<T, FilesError>;
