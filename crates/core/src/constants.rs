//! Constants used throughout the bridge core crate.
//!
//! This module contains all path and filename constants to ensure
//! consistency across the pipeline stages.

/// Default root directory for pipeline data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default directory for HTML audit reports.
pub const DEFAULT_REPORT_DIR: &str = "reports";

/// Directory name for inbound source messages.
pub const INBOUND_DIR_NAME: &str = "hl7_inbound";

/// Directory name for bundle artifacts awaiting validation.
pub const BUNDLE_DIR_NAME: &str = "raw";

/// Directory name for bundles that passed every rule.
pub const ACCEPTED_DIR_NAME: &str = "accepted";

/// Directory name for bundles with at least one finding.
pub const REJECTED_DIR_NAME: &str = "rejected";

/// Filename for the persisted rejection history.
pub const HISTORY_FILENAME: &str = "rejection_log.json";

/// Extension of source message artifacts.
pub const MESSAGE_EXTENSION: &str = "hl7";

/// Extension of bundle artifacts.
pub const BUNDLE_EXTENSION: &str = "json";

/// Number of messages the generator produces when no batch size is configured.
pub const DEFAULT_BATCH_SIZE: usize = 10;
