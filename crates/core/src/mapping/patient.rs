use super::{clean_phone, non_empty, parse_date};
use crate::records::{AdministrativeGender, PatientRecord};
use hl7::Segment;

const PID: &str = "PID";

// PID field positions
const IDENTIFIER: usize = 3;
const NAME: usize = 5;
const BIRTH_DATE: usize = 7;
const SEX: usize = 8;
const PHONE: usize = 13;

// Name components: family^given^middle^suffix^prefix
const FAMILY: usize = 0;
const GIVEN: usize = 1;
const PREFIX: usize = 4;

/// Map the first patient identity segment. `None` when the message has none.
pub fn map_patient(segments: &[Segment]) -> Option<PatientRecord> {
    let pid = segments.iter().find(|s| s.is(PID))?;

    Some(PatientRecord {
        identifier: pid.component(IDENTIFIER, 0).trim().to_owned(),
        family: pid.component(NAME, FAMILY).trim().to_owned(),
        given: non_empty(pid.component(NAME, GIVEN)),
        prefix: non_empty(pid.component(NAME, PREFIX)),
        birth_date: parse_date(pid.field(BIRTH_DATE)),
        gender: AdministrativeGender::from_code(pid.field(SEX).trim()),
        phone: clean_phone(pid.field(PHONE)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn segments(lines: &[&str]) -> Vec<Segment> {
        lines.iter().map(|line| Segment::parse(line)).collect()
    }

    #[test]
    fn maps_full_identity_segment() {
        let segs = segments(&[
            "MSH|^~\\&|PAS|HOSP|BRIDGE|HOSP|20240105103000||ADT^A01|MSG1|P|2.4",
            "PID|1||9434765919^^^NHS||SMITH^JANE^ANN^^MRS||19800131|F|||1 HIGH ST^^LEEDS||(0113) 496-0000 x12",
        ]);

        let patient = map_patient(&segs).expect("patient");
        assert_eq!(patient.identifier, "9434765919");
        assert_eq!(patient.family, "SMITH");
        assert_eq!(patient.given.as_deref(), Some("JANE"));
        assert_eq!(patient.prefix.as_deref(), Some("MRS"));
        assert_eq!(patient.birth_date, NaiveDate::from_ymd_opt(1980, 1, 31));
        assert_eq!(patient.gender, AdministrativeGender::Female);
        assert_eq!(patient.phone.as_deref(), Some("01134960000"));
    }

    #[test]
    fn missing_segment_yields_none() {
        let segs = segments(&["MSH|^~\\&|PAS|HOSP|BRIDGE|HOSP|20240105||ADT^A01|MSG1"]);
        assert!(map_patient(&segs).is_none());
    }

    #[test]
    fn truncated_segment_degrades_to_empty_values() {
        let segs = segments(&["PID|1||12345"]);
        let patient = map_patient(&segs).expect("patient");
        assert_eq!(patient.identifier, "12345");
        assert_eq!(patient.family, "");
        assert!(patient.given.is_none());
        assert!(patient.birth_date.is_none());
        assert_eq!(patient.gender, AdministrativeGender::Other);
        assert!(patient.phone.is_none());
    }

    #[test]
    fn unparseable_birth_date_is_kept_as_none() {
        let segs = segments(&["PID|1||9434765919||DOE^JOHN||19801345|M"]);
        let patient = map_patient(&segs).expect("patient");
        assert!(patient.birth_date.is_none());
        assert_eq!(patient.gender, AdministrativeGender::Male);
    }
}
