//! Pipe-delimited legacy message parsing.
//!
//! This crate splits message text into typed segments and positional fields. It carries no
//! clinical semantics beyond field positions: interpretation of PID, PV1, OBR, OBX and AL1
//! belongs to the mapping layer in `bridge-core`.
//!
//! Conventions:
//! - segments are separated by line breaks (`\n`, `\r\n` or bare `\r`)
//! - fields are separated by `|`; field 0 is the segment tag itself
//! - components within a field are separated by `^`
//! - any field or component beyond what the source supplied reads as an empty string

pub mod message;
pub mod segment;

pub use message::{MessageClass, MessageType, RawMessage};
pub use segment::Segment;

/// Separator between fields of a segment.
pub const FIELD_SEPARATOR: char = '|';

/// Separator between components of a field.
pub const COMPONENT_SEPARATOR: char = '^';

/// Tag of the mandatory header segment.
pub const HEADER_TAG: &str = "MSH";

/// Errors returned when a message cannot be parsed at all.
///
/// These are message-scoped: callers skip the offending message and continue the batch.
#[derive(Debug, thiserror::Error)]
pub enum Hl7Error {
    #[error("message contains no segments")]
    EmptyMessage,

    #[error("malformed header: {0}")]
    MalformedHeader(String),
}

/// Type alias for Results that can fail with an [`Hl7Error`].
pub type Hl7Result<T> = Result<T, Hl7Error>;
