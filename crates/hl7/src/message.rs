//! Whole-message parsing and header interpretation.

use crate::{Hl7Error, Hl7Result, Segment, COMPONENT_SEPARATOR, HEADER_TAG};
use std::fmt;

/// Header field holding the `category^trigger` message type.
const HEADER_MESSAGE_TYPE: usize = 8;
/// Header field holding the message control id.
const HEADER_CONTROL_ID: usize = 9;

/// Broad routing class derived from the message category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageClass {
    /// Admission/discharge/transfer events (`ADT`).
    Admission,
    /// Observation result events (`ORU`).
    Result,
    /// Any other category; still yields a patient-only bundle.
    Other,
}

/// The `category^trigger` token from the header, e.g. `ADT^A01`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageType {
    category: String,
    trigger: String,
}

impl MessageType {
    /// Parse a message type token. Returns `None` when the category is missing.
    pub fn parse(token: &str) -> Option<Self> {
        let mut parts = token.split(COMPONENT_SEPARATOR);
        let category = parts.next().unwrap_or("").trim();
        if category.is_empty() {
            return None;
        }
        let trigger = parts.next().unwrap_or("").trim();
        Some(Self {
            category: category.to_owned(),
            trigger: trigger.to_owned(),
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    pub fn class(&self) -> MessageClass {
        match self.category.as_str() {
            "ADT" => MessageClass::Admission,
            "ORU" => MessageClass::Result,
            _ => MessageClass::Other,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.trigger.is_empty() {
            f.write_str(&self.category)
        } else {
            write!(f, "{}{}{}", self.category, COMPONENT_SEPARATOR, self.trigger)
        }
    }
}

/// A parsed message: an ordered, immutable list of segments led by a header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawMessage {
    message_type: MessageType,
    control_id: String,
    segments: Vec<Segment>,
}

impl RawMessage {
    /// Parse message text into segments.
    ///
    /// Blank lines are ignored. Missing trailing fields are never an error.
    ///
    /// # Errors
    ///
    /// Returns [`Hl7Error::EmptyMessage`] when there are no segments, and
    /// [`Hl7Error::MalformedHeader`] when the first segment is not a header or its message
    /// type token is missing.
    pub fn parse(text: &str) -> Hl7Result<Self> {
        let segments: Vec<Segment> = text
            .split(['\n', '\r'])
            .filter(|line| !line.trim().is_empty())
            .map(Segment::parse)
            .collect();

        let header = segments.first().ok_or(Hl7Error::EmptyMessage)?;
        if !header.is(HEADER_TAG) {
            return Err(Hl7Error::MalformedHeader(format!(
                "expected leading {HEADER_TAG} segment, found '{}'",
                header.tag()
            )));
        }

        let message_type = MessageType::parse(header.field(HEADER_MESSAGE_TYPE)).ok_or_else(|| {
            Hl7Error::MalformedHeader(format!(
                "missing message type in field {HEADER_MESSAGE_TYPE}"
            ))
        })?;
        let control_id = header.field(HEADER_CONTROL_ID).to_owned();

        Ok(Self {
            message_type,
            control_id,
            segments,
        })
    }

    pub fn message_type(&self) -> &MessageType {
        &self.message_type
    }

    /// Message control id from the header; empty when the sender omitted it.
    pub fn control_id(&self) -> &str {
        &self.control_id
    }

    /// All segments in source order, header included.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// First segment with the given tag.
    pub fn first(&self, tag: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.is(tag))
    }

    /// Every segment with the given tag, in source order.
    pub fn all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Segment> + 'a {
        self.segments.iter().filter(move |s| s.is(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMISSION: &str = "MSH|^~\\&|PAS_LEGACY|NORTH_TRUST|FHIR_RECEIVER|NHS_DATA_LAKE|20240105103000||ADT^A01|482913|P|2.3\n\
PID|1||9434765919^^^NHS||SMITH^Jane^^^^MS||19800101|F|||LS1 4AP||01632 960123\n\
PV1|1|I|CARDIO^5^2||||123^JONES^DR\n\
AL1|1|DA|Z88.0^PENICILLIN^CD|SV|Anaphylaxis";

    #[test]
    fn parses_header_and_segments() {
        let msg = RawMessage::parse(ADMISSION).expect("should parse");
        assert_eq!(msg.message_type().category(), "ADT");
        assert_eq!(msg.message_type().trigger(), "A01");
        assert_eq!(msg.message_type().class(), MessageClass::Admission);
        assert_eq!(msg.message_type().to_string(), "ADT^A01");
        assert_eq!(msg.control_id(), "482913");
        assert_eq!(msg.segments().len(), 4);
        assert_eq!(msg.first("PV1").map(|s| s.field(2)), Some("I"));
        assert_eq!(msg.all("AL1").count(), 1);
        assert!(msg.first("OBR").is_none());
    }

    #[test]
    fn accepts_carriage_return_separators_and_blank_lines() {
        let text = ADMISSION.replace('\n', "\r\n\r\n");
        let msg = RawMessage::parse(&text).expect("should parse");
        assert_eq!(msg.segments().len(), 4);
        assert_eq!(msg.first("AL1").map(|s| s.field(5)), Some("Anaphylaxis"));
    }

    #[test]
    fn rejects_missing_message_type() {
        let text = "MSH|^~\\&|PAS_LEGACY|NORTH_TRUST|FHIR_RECEIVER|NHS_DATA_LAKE|20240105103000||\nPID|1";
        let err = RawMessage::parse(text).expect_err("should reject");
        assert!(matches!(err, Hl7Error::MalformedHeader(msg) if msg.contains("message type")));
    }

    #[test]
    fn rejects_non_header_first_segment() {
        let err = RawMessage::parse("PID|1||9434765919").expect_err("should reject");
        assert!(matches!(err, Hl7Error::MalformedHeader(msg) if msg.contains("PID")));
    }

    #[test]
    fn rejects_empty_text() {
        assert!(matches!(
            RawMessage::parse("\n \n"),
            Err(Hl7Error::EmptyMessage)
        ));
    }

    #[test]
    fn classifies_message_categories() {
        let oru = MessageType::parse("ORU^R01").expect("valid");
        assert_eq!(oru.class(), MessageClass::Result);
        let other = MessageType::parse("SIU^S12").expect("valid");
        assert_eq!(other.class(), MessageClass::Other);
        let bare = MessageType::parse("ACK").expect("valid");
        assert_eq!(bare.trigger(), "");
        assert_eq!(bare.to_string(), "ACK");
        assert!(MessageType::parse("^A01").is_none());
    }
}
