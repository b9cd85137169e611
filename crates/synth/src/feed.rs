//! Synthetic message feed.
//!
//! Traffic mix: 30% admissions (`ADT^A01` or `ADT^A08`, half of them with an allergy) and 70%
//! results (`ORU^R01` carrying either a heart rate or a systolic/diastolic pair).

use crate::pools::{
    pick, ALLERGENS, FEMALE_FIRST_NAMES, LAST_NAMES, MALE_FIRST_NAMES, NEUTRAL_FIRST_NAMES,
    PATIENT_CLASSES, PHONES, POSTCODES, REACTIONS, SEVERITIES, WARDS,
};
use crate::{SynthError, SynthResult};
use bridge_files::ArtifactDir;
use bridge_types::NhsNumber;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use std::fmt;
use std::path::Path;

const ADMISSION_SHARE: f64 = 0.3;
const ALLERGY_SHARE: f64 = 0.5;
const HEART_RATE_SHARE: f64 = 0.5;

const HL7_TIMESTAMP: &str = "%Y%m%d%H%M%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Admission,
    Result,
}

impl MessageKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            MessageKind::Admission => "ADT",
            MessageKind::Result => "ORU",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[derive(Clone, Debug)]
pub struct GeneratedMessage {
    pub kind: MessageKind,
    pub file_name: String,
    pub text: String,
}

/// Build one synthetic message stamped at `now`.
pub fn generate_message<R: Rng + ?Sized>(rng: &mut R, now: NaiveDateTime) -> GeneratedMessage {
    let timestamp = now.format(HL7_TIMESTAMP).to_string();
    let control_id = rng.gen_range(100_000..=999_999).to_string();
    let (pid, family) = patient_segment(rng, now.date());

    let (kind, message_type, body) = if rng.gen_bool(ADMISSION_SHARE) {
        let trigger = pick(rng, &["A01", "A08"]);
        let mut body = vec![pid, visit_segment(rng)];
        if rng.gen_bool(ALLERGY_SHARE) {
            body.push(allergy_segment(rng));
        }
        (MessageKind::Admission, format!("ADT^{trigger}"), body)
    } else {
        let mut body = vec![pid];
        body.extend(vitals_segments(rng, &timestamp));
        (MessageKind::Result, "ORU^R01".to_string(), body)
    };

    let header = format!(
        "MSH|^~\\&|PAS_LEGACY|NORTH_TRUST|FHIR_RECEIVER|NHS_DATA_LAKE|{timestamp}||{message_type}|{control_id}|P|2.3"
    );

    let mut lines = vec![header];
    lines.extend(body);

    GeneratedMessage {
        kind,
        file_name: format!("{}_{}_{}.hl7", kind.prefix(), family, control_id),
        text: lines.join("\n"),
    }
}

/// Write `batch_size` messages into `inbound_dir`. Returns the file names written.
///
/// # Errors
///
/// Returns `SynthError` if `batch_size` is zero or the directory cannot be written.
pub fn run_feed<R: Rng + ?Sized>(
    inbound_dir: &Path,
    batch_size: usize,
    rng: &mut R,
    now: NaiveDateTime,
) -> SynthResult<Vec<String>> {
    if batch_size == 0 {
        return Err(SynthError::InvalidInput(
            "batch size must be at least 1".into(),
        ));
    }

    let dir = ArtifactDir::create(inbound_dir)?;
    tracing::info!("generating {} messages into {}", batch_size, dir.path().display());

    let mut written = Vec::with_capacity(batch_size);
    for _ in 0..batch_size {
        let message = generate_message(rng, now);
        dir.write(&message.file_name, &message.text)?;
        tracing::info!("transmitted {} -> {}", message.kind, message.file_name);
        written.push(message.file_name);
    }
    Ok(written)
}

fn patient_segment<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> (String, String) {
    let nhs_number = NhsNumber::generate(rng);
    let sex = pick(rng, &["M", "F", "O"]);
    let (given, salutation) = match sex {
        "M" => (pick(rng, MALE_FIRST_NAMES), "MR"),
        "F" => (pick(rng, FEMALE_FIRST_NAMES), "MS"),
        _ => (pick(rng, NEUTRAL_FIRST_NAMES), "MX"),
    };
    let family = pick(rng, LAST_NAMES);
    let birth_date = birth_date(rng, today);

    let segment = format!(
        "PID|1||{nhs}^^^NHS||{family}^{given}^^^^{salutation}||{dob}|{sex}|||{postcode}||{phone}",
        nhs = nhs_number,
        dob = birth_date.format("%Y%m%d"),
        postcode = pick(rng, POSTCODES),
        phone = pick(rng, PHONES),
    );
    (segment, family.to_string())
}

/// A birth date for an adult aged 18 to 90.
fn birth_date<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> NaiveDate {
    let age_days = rng.gen_range(18 * 365..=90 * 365);
    today
        .checked_sub_signed(Duration::days(age_days))
        .unwrap_or_else(|| today.with_year(today.year() - 18).unwrap_or(today))
}

fn visit_segment<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "PV1|1|{class}|{ward}^{room}^{bed}||||{doctor}^{surname}^DR",
        class = pick(rng, PATIENT_CLASSES),
        ward = pick(rng, WARDS),
        room = rng.gen_range(1..=20),
        bed = rng.gen_range(1..=4),
        doctor = rng.gen_range(100..=999),
        surname = pick(rng, LAST_NAMES),
    )
}

fn vitals_segments<R: Rng + ?Sized>(rng: &mut R, timestamp: &str) -> Vec<String> {
    let order = rng.gen_range(1000..=9999);

    if rng.gen_bool(HEART_RATE_SHARE) {
        let rate = rng.gen_range(60..=100);
        vec![
            format!("OBR|1|ORD{order}|FILL{order}|8867-4^HEART RATE^LN|||{timestamp}"),
            format!("OBX|1|NM|8867-4^HEART RATE^LN||{rate}|/min||||F"),
        ]
    } else {
        let systolic = rng.gen_range(100..=160);
        let diastolic = rng.gen_range(60..=systolic - 20);
        vec![
            format!("OBR|1|ORD{order}|FILL{order}|85354-9^BP PANEL^LN|||{timestamp}"),
            format!("OBX|1|NM|8480-6^SYSTOLIC BP^LN||{systolic}|mm[Hg]||||F"),
            format!("OBX|2|NM|8462-4^DIASTOLIC BP^LN||{diastolic}|mm[Hg]||||F"),
        ]
    }
}

fn allergy_segment<R: Rng + ?Sized>(rng: &mut R) -> String {
    let (type_code, allergen) = pick(rng, ALLERGENS);
    format!(
        "AL1|1|{type_code}|{allergen}|{severity}|{reaction}",
        severity = pick(rng, SEVERITIES),
        reaction = pick(rng, REACTIONS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .expect("valid instant")
    }

    fn field<'a>(line: &'a str, index: usize) -> &'a str {
        line.split('|').nth(index).unwrap_or("")
    }

    #[test]
    fn messages_have_valid_identity_and_matching_name() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let message = generate_message(&mut rng, now());
            let lines: Vec<&str> = message.text.lines().collect();
            assert!(lines[0].starts_with("MSH|"));
            assert_eq!(field(lines[0], 6), "20250301093000");

            let pid = lines[1];
            let nhs = field(pid, 3).split('^').next().unwrap_or("");
            assert!(NhsNumber::is_valid(nhs), "generated {nhs}");

            let family = field(pid, 5).split('^').next().unwrap_or("");
            let control_id = field(lines[0], 9);
            assert_eq!(
                message.file_name,
                format!("{}_{}_{}.hl7", message.kind, family, control_id)
            );
        }
    }

    #[test]
    fn result_messages_carry_plausible_pairs() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pairs = 0;
        for _ in 0..300 {
            let message = generate_message(&mut rng, now());
            if message.kind != MessageKind::Result {
                assert!(message.text.contains("\nPV1|"));
                assert!(field(message.text.lines().next().unwrap_or(""), 8).starts_with("ADT^A0"));
                continue;
            }
            let values: Vec<i64> = message
                .text
                .lines()
                .filter(|l| l.starts_with("OBX|"))
                .filter_map(|l| field(l, 5).parse().ok())
                .collect();
            if values.len() == 2 {
                pairs += 1;
                let (systolic, diastolic) = (values[0], values[1]);
                assert!((100..=160).contains(&systolic));
                assert!(diastolic >= 60 && diastolic <= systolic - 20);
            } else {
                assert_eq!(values.len(), 1);
                assert!((60..=100).contains(&values[0]));
            }
        }
        assert!(pairs > 0);
    }

    #[test]
    fn mix_favours_results() {
        let mut rng = StdRng::seed_from_u64(99);
        let admissions = (0..1000)
            .filter(|_| generate_message(&mut rng, now()).kind == MessageKind::Admission)
            .count();
        assert!((200..400).contains(&admissions), "got {admissions}");
    }

    #[test]
    fn run_feed_writes_batch() {
        let temp = TempDir::new().expect("tempdir");
        let inbound = temp.path().join("hl7_inbound");
        let mut rng = StdRng::seed_from_u64(5);

        let written = run_feed(&inbound, 4, &mut rng, now()).expect("run feed");
        assert_eq!(written.len(), 4);
        for name in &written {
            assert!(inbound.join(name).is_file());
        }

        let err = run_feed(&inbound, 0, &mut rng, now()).expect_err("zero batch");
        assert!(matches!(err, SynthError::InvalidInput(msg) if msg.contains("batch")));
    }
}
