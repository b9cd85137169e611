//! Segment-to-record mappers.
//!
//! Each mapper is total over the segments it receives: missing optional segments or fields
//! yield `None` or an empty list, never an error. Coercion failures (dates, numbers) degrade to
//! `None` and are left for validation to report.

mod allergy;
mod encounter;
mod observation;
mod patient;

pub use allergy::map_allergies;
pub use encounter::map_encounter;
pub use observation::map_observations;
pub use patient::map_patient;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATE_FORMAT: &str = "%Y%m%d";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_LEN: usize = 14;

/// Parse an eight-digit `YYYYMMDD` token.
pub(crate) fn parse_date(token: &str) -> Option<NaiveDate> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(token, DATE_FORMAT).ok()
}

/// Parse the leading `YYYYMMDDHHMMSS` of a timestamp token as UTC.
pub(crate) fn parse_timestamp(token: &str) -> Option<DateTime<Utc>> {
    let head = token.trim().get(..TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(head, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse a numeric result value; non-finite values count as unparseable.
pub(crate) fn parse_number(token: &str) -> Option<f64> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Normalise a phone number: drop any extension, keep digits and a leading `+`.
pub(crate) fn clean_phone(raw: &str) -> Option<String> {
    let base = raw.split(['x', 'X']).next().unwrap_or_default();

    let mut cleaned = String::with_capacity(base.len());
    for ch in base.chars() {
        if ch.is_ascii_digit() || (ch == '+' && cleaned.is_empty()) {
            cleaned.push(ch);
        }
    }

    if cleaned.is_empty() || cleaned == "+" {
        None
    } else {
        Some(cleaned)
    }
}

/// Empty source text becomes `None`.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_cleaning_strips_punctuation_and_extension() {
        assert_eq!(
            clean_phone("(01632) 960-123 x45").as_deref(),
            Some("01632960123")
        );
        assert_eq!(clean_phone("+44 1632 960123").as_deref(), Some("+441632960123"));
        assert_eq!(clean_phone("07700+900123").as_deref(), Some("07700900123"));
        assert_eq!(clean_phone("ext only x12"), None);
        assert_eq!(clean_phone(""), None);
    }

    #[test]
    fn dates_degrade_to_none() {
        assert_eq!(parse_date("19800131"), NaiveDate::from_ymd_opt(1980, 1, 31));
        assert_eq!(parse_date("19801331"), None);
        assert_eq!(parse_date("1980-01-31"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn timestamps_use_first_fourteen_characters() {
        let parsed = parse_timestamp("20240105103000+0000").expect("timestamp");
        assert_eq!(parsed.to_rfc3339(), "2024-01-05T10:30:00+00:00");
        assert_eq!(parse_timestamp("202401051030"), None);
        assert_eq!(parse_timestamp("not a timestamp!!"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn numbers_must_be_finite() {
        assert_eq!(parse_number(" 72 "), Some(72.0));
        assert_eq!(parse_number("98.6"), Some(98.6));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("high"), None);
    }
}
