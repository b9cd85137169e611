//! Pipeline runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into each stage. Library
//! code never reads process-wide environment variables; binaries collect the raw values and
//! hand them to the `*_from_env_value` helpers here.

use crate::constants::{
    ACCEPTED_DIR_NAME, BUNDLE_DIR_NAME, DEFAULT_BATCH_SIZE, DEFAULT_DATA_DIR, DEFAULT_REPORT_DIR,
    HISTORY_FILENAME, INBOUND_DIR_NAME, REJECTED_DIR_NAME,
};
use crate::{BridgeError, BridgeResult};
use std::path::{Path, PathBuf};

/// Pipeline configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    data_dir: PathBuf,
    report_dir: PathBuf,
    batch_size: usize,
    chaos_target_dir: Option<PathBuf>,
}

impl PipelineConfig {
    /// Create a new `PipelineConfig`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::InvalidInput` if `batch_size` is zero or a directory is empty.
    pub fn new(
        data_dir: PathBuf,
        report_dir: PathBuf,
        batch_size: usize,
        chaos_target_dir: Option<PathBuf>,
    ) -> BridgeResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(BridgeError::InvalidInput("data_dir cannot be empty".into()));
        }
        if report_dir.as_os_str().is_empty() {
            return Err(BridgeError::InvalidInput(
                "report_dir cannot be empty".into(),
            ));
        }
        if batch_size == 0 {
            return Err(BridgeError::InvalidInput(
                "batch_size must be at least 1".into(),
            ));
        }

        Ok(Self {
            data_dir,
            report_dir,
            batch_size,
            chaos_target_dir,
        })
    }

    /// Build a configuration from raw environment values (`None` when unset).
    ///
    /// # Errors
    ///
    /// Propagates [`PipelineConfig::new`] errors.
    pub fn from_env_values(
        data_dir: Option<String>,
        report_dir: Option<String>,
        batch_size: Option<String>,
        chaos_target_dir: Option<String>,
    ) -> BridgeResult<Self> {
        Self::new(
            non_blank(data_dir)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            non_blank(report_dir)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR)),
            batch_size_from_env_value(batch_size),
            non_blank(chaos_target_dir).map(PathBuf::from),
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn inbound_dir(&self) -> PathBuf {
        self.data_dir.join(INBOUND_DIR_NAME)
    }

    pub fn bundle_dir(&self) -> PathBuf {
        self.data_dir.join(BUNDLE_DIR_NAME)
    }

    pub fn accepted_dir(&self) -> PathBuf {
        self.data_dir.join(ACCEPTED_DIR_NAME)
    }

    pub fn rejected_dir(&self) -> PathBuf {
        self.data_dir.join(REJECTED_DIR_NAME)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILENAME)
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Directory the corruption injector targets; defaults to the bundle directory.
    pub fn chaos_target_dir(&self) -> PathBuf {
        self.chaos_target_dir
            .clone()
            .unwrap_or_else(|| self.bundle_dir())
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> BridgeResult<Self> {
        if batch_size == 0 {
            return Err(BridgeError::InvalidInput(
                "batch_size must be at least 1".into(),
            ));
        }
        self.batch_size = batch_size;
        Ok(self)
    }
}

/// Parse the generator batch size from an optional string value.
///
/// Unset, blank, non-numeric and zero values fall back to the default with a warning.
pub fn batch_size_from_env_value(value: Option<String>) -> usize {
    let Some(raw) = non_blank(value) else {
        return DEFAULT_BATCH_SIZE;
    };
    match raw.parse::<usize>() {
        Ok(size) if size > 0 => size,
        _ => {
            tracing::warn!("invalid BATCH_SIZE '{}', defaulting to {}", raw, DEFAULT_BATCH_SIZE);
            DEFAULT_BATCH_SIZE
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
