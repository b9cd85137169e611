use crate::records::{EncounterRecord, EncounterStatus};
use hl7::Segment;

const PV1: &str = "PV1";
const PATIENT_CLASS: usize = 2;
const LOCATION: usize = 3;
const LOCATION_SEPARATOR: &str = "-";

/// Map the first visit segment into an encounter for `subject`.
///
/// `trigger` is the trigger event of the message type (e.g. `A01`).
pub fn map_encounter(segments: &[Segment], subject: &str, trigger: &str) -> Option<EncounterRecord> {
    let pv1 = segments.iter().find(|s| s.is(PV1))?;

    Some(EncounterRecord {
        status: EncounterStatus::from_trigger(trigger),
        class_code: pv1.field(PATIENT_CLASS).trim().to_owned(),
        location: pv1.components(LOCATION).join(LOCATION_SEPARATOR),
        subject: subject.to_owned(),
    })
}
