//! Result-segment mapping with order context and blood pressure pairing.
//!
//! The scan is a single left-to-right fold. An order segment replaces the effective time for
//! every result segment after it. Heart rate results emit immediately; systolic and diastolic
//! results with a numeric value fill a two-slot holding cell (last seen wins) that becomes one
//! panel record once the scan ends, and only when both slots are filled. A heart rate whose value
//! fails coercion is still emitted with no value so the gate can report it.

use super::{parse_number, parse_timestamp};
use crate::records::{Measurement, ObservationRecord, ObservationValue, VitalSign};
use chrono::{DateTime, Utc};
use hl7::Segment;

const OBR: &str = "OBR";
const OBX: &str = "OBX";

const OBR_TIMESTAMP: usize = 7;
const OBX_IDENTIFIER: usize = 3;
const OBX_VALUE: usize = 5;

#[derive(Debug, Default)]
struct PendingPressure {
    systolic: Option<Measurement>,
    diastolic: Option<Measurement>,
}

impl PendingPressure {
    fn complete(self) -> Option<(Measurement, Measurement)> {
        Some((self.systolic?, self.diastolic?))
    }
}

#[derive(Debug, Default)]
struct ScanState {
    effective: Option<DateTime<Utc>>,
    emitted: Vec<ObservationRecord>,
    pending: PendingPressure,
}

impl ScanState {
    fn step(mut self, segment: &Segment, subject: &str) -> Self {
        if segment.is(OBR) {
            self.effective = parse_timestamp(segment.field(OBR_TIMESTAMP));
            return self;
        }
        if !segment.is(OBX) {
            return self;
        }

        let Some(sign) = VitalSign::from_code(segment.component(OBX_IDENTIFIER, 0).trim()) else {
            return self;
        };
        let measurement = Measurement {
            sign,
            value: parse_number(segment.field(OBX_VALUE)),
        };

        match sign {
            VitalSign::HeartRate => self.emitted.push(ObservationRecord {
                subject: subject.to_owned(),
                effective: self.effective,
                value: ObservationValue::Single(measurement),
            }),
            _ if measurement.value.is_none() => {}
            VitalSign::Systolic => self.pending.systolic = Some(measurement),
            VitalSign::Diastolic => self.pending.diastolic = Some(measurement),
        }
        self
    }

    fn finish(self, subject: &str) -> Vec<ObservationRecord> {
        let ScanState {
            effective,
            mut emitted,
            pending,
        } = self;

        // An incomplete pair is dropped.
        if let Some((systolic, diastolic)) = pending.complete() {
            emitted.push(ObservationRecord {
                subject: subject.to_owned(),
                effective,
                value: ObservationValue::BloodPressurePanel {
                    systolic,
                    diastolic,
                },
            });
        }
        emitted
    }
}

/// Map result segments into observation records for `subject`.
pub fn map_observations(segments: &[Segment], subject: &str) -> Vec<ObservationRecord> {
    segments
        .iter()
        .fold(ScanState::default(), |state, segment| {
            state.step(segment, subject)
        })
        .finish(subject)
}
