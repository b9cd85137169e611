//! Randomised corruption of bundle artifacts.
//!
//! Each Patient or Observation entry is hit with probability `rate`; a hit picks one mutation
//! from the resource's menu. Mutations that find nothing to change are not counted. Only
//! bundles with at least one applied mutation are rewritten.

use crate::SynthResult;
use bridge_files::{artifact_name, ArtifactDir};
use chrono::{DateTime, Duration, Utc};
use fhir::{Artifact, BundleArtifact, Observation, Patient, Quantity, Resource};
use rand::Rng;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

pub const DEFAULT_ERROR_RATE: f64 = 0.4;

/// Fails the checksum rule.
const INVALID_NHS_NUMBER: &str = "9876543210";
const IMPOSSIBLE_VALUE: f64 = 999.0;
const WRONG_UNIT: &str = "kg";
const CLOCK_SKEW_DAYS: i64 = 365;

const PATIENT_MENU: &[Mutation] = &[Mutation::InvalidNhsNumber, Mutation::MissingSurname];
const OBSERVATION_MENU: &[Mutation] = &[
    Mutation::ImpossibleValue,
    Mutation::FutureTimestamp,
    Mutation::UnitMismatch,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Mutation {
    InvalidNhsNumber,
    MissingSurname,
    ImpossibleValue,
    FutureTimestamp,
    UnitMismatch,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mutation::InvalidNhsNumber => "INVALID_NHS_NUMBER",
            Mutation::MissingSurname => "MISSING_SURNAME",
            Mutation::ImpossibleValue => "CRITICAL_VALUE_IMPOSSIBLE",
            Mutation::FutureTimestamp => "INVALID_FUTURE_DATE",
            Mutation::UnitMismatch => "UNIT_MISMATCH",
        };
        f.write_str(label)
    }
}

impl Mutation {
    /// Apply to `resource`. Returns whether anything changed.
    pub fn apply(&self, resource: &mut Resource, now: DateTime<Utc>) -> bool {
        match (self, resource) {
            (Mutation::InvalidNhsNumber, Resource::Patient(patient)) => corrupt_identifier(patient),
            (Mutation::MissingSurname, Resource::Patient(patient)) => match patient.name.first_mut() {
                Some(name) => {
                    name.family = Some(String::new());
                    true
                }
                None => false,
            },
            (Mutation::ImpossibleValue, Resource::Observation(obs)) => {
                match first_quantity(obs) {
                    Some(quantity) => {
                        quantity.value = Some(IMPOSSIBLE_VALUE);
                        true
                    }
                    None => false,
                }
            }
            (Mutation::FutureTimestamp, Resource::Observation(obs)) => {
                if obs.effective_date_time.is_none() {
                    return false;
                }
                obs.effective_date_time =
                    Some((now + Duration::days(CLOCK_SKEW_DAYS)).to_rfc3339());
                true
            }
            (Mutation::UnitMismatch, Resource::Observation(obs)) => match first_quantity(obs) {
                Some(quantity) => {
                    quantity.unit = Some(WRONG_UNIT.into());
                    quantity.code = Some(WRONG_UNIT.into());
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

fn corrupt_identifier(patient: &mut Patient) -> bool {
    let target = patient.identifier.iter_mut().find(|i| {
        i.system
            .as_deref()
            .is_some_and(|s| s.contains(fhir::codes::NHS_NUMBER_SYSTEM_MARKER))
    });
    match target {
        Some(identifier) => {
            identifier.value = Some(INVALID_NHS_NUMBER.into());
            true
        }
        None => false,
    }
}

/// The top-level quantity, else the first component quantity.
fn first_quantity(obs: &mut Observation) -> Option<&mut Quantity> {
    if obs.value_quantity.is_some() {
        return obs.value_quantity.as_mut();
    }
    obs.component
        .iter_mut()
        .find_map(|c| c.value_quantity.as_mut())
}

fn menu_for(resource: &Resource) -> &'static [Mutation] {
    match resource {
        Resource::Patient(_) => PATIENT_MENU,
        Resource::Observation(_) => OBSERVATION_MENU,
        _ => &[],
    }
}

/// Corrupt entries of one bundle in place. Returns the mutations applied.
pub fn corrupt_bundle<R: Rng + ?Sized>(
    bundle: &mut fhir::Bundle,
    rng: &mut R,
    rate: f64,
    now: DateTime<Utc>,
) -> Vec<Mutation> {
    let mut applied = Vec::new();
    for resource in bundle.resources_mut() {
        let menu = menu_for(resource);
        if menu.is_empty() || !rng.gen_bool(rate) {
            continue;
        }
        let mutation = menu[rng.gen_range(0..menu.len())];
        if mutation.apply(resource, now) {
            applied.push(mutation);
        }
    }
    applied
}

#[derive(Clone, Debug, Default)]
pub struct ChaosSummary {
    pub scanned: usize,
    /// Corrupted artifacts with the distinct mutations applied to each.
    pub infected: Vec<(String, BTreeSet<Mutation>)>,
}

/// Corrupt bundle artifacts in `target_dir`.
///
/// Artifacts that are not bundles, or cannot be parsed, are left alone.
///
/// # Errors
///
/// Returns `SynthError` if `rate` is outside `[0, 1]`, the directory cannot be listed, or a
/// corrupted bundle cannot be written back.
pub fn run_chaos<R: Rng + ?Sized>(
    target_dir: &Path,
    rng: &mut R,
    rate: f64,
    now: DateTime<Utc>,
) -> SynthResult<ChaosSummary> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(crate::SynthError::InvalidInput(format!(
            "error rate must be within [0, 1], got {rate}"
        )));
    }

    let dir = ArtifactDir::open(target_dir)?;
    let paths = dir.list("json")?;
    tracing::info!(
        "chaos targeting {} at rate {}",
        dir.path().display(),
        rate
    );

    let mut summary = ChaosSummary {
        scanned: paths.len(),
        ..ChaosSummary::default()
    };

    for path in paths {
        let name = artifact_name(&path)?.into_inner();
        let text = dir.read(&name)?;
        let mut bundle = match BundleArtifact::parse(&text) {
            Ok(Artifact::Bundle(bundle)) => bundle,
            Ok(Artifact::Resource(_)) => continue,
            Err(err) => {
                tracing::debug!("chaos skipping unreadable {}: {}", name, err);
                continue;
            }
        };

        let applied = corrupt_bundle(&mut bundle, rng, rate, now);
        if applied.is_empty() {
            continue;
        }

        dir.write(&name, &BundleArtifact::render(&bundle)?)?;
        let distinct: BTreeSet<Mutation> = applied.into_iter().collect();
        tracing::info!(
            "infected {} -> {}",
            name,
            distinct
                .iter()
                .map(Mutation::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        summary.infected.push((name, distinct));
    }

    tracing::info!(
        "chaos report: infected {} of {} files",
        summary.infected.len(),
        summary.scanned
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::NhsNumber;
    use chrono::TimeZone;
    use fhir::codes::NHS_NUMBER_SYSTEM;
    use fhir::{Bundle, HumanName, Identifier, ObservationComponent};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn patient() -> Resource {
        Resource::Patient(Patient {
            identifier: vec![Identifier {
                system: Some(NHS_NUMBER_SYSTEM.into()),
                value: Some("9434765919".into()),
            }],
            name: vec![HumanName {
                family: Some("SMITH".into()),
                ..HumanName::default()
            }],
            ..Patient::default()
        })
    }

    fn panel() -> Resource {
        Resource::Observation(Observation {
            effective_date_time: Some("2025-03-01T08:00:00+00:00".into()),
            component: vec![
                ObservationComponent {
                    code: None,
                    value_quantity: Some(Quantity {
                        value: Some(120.0),
                        unit: Some("mmHg".into()),
                        code: None,
                    }),
                },
                ObservationComponent::default(),
            ],
            ..Observation::default()
        })
    }

    #[test]
    fn identifier_mutation_breaks_checksum() {
        let mut resource = patient();
        assert!(Mutation::InvalidNhsNumber.apply(&mut resource, now()));
        let Resource::Patient(p) = resource else {
            panic!("expected patient");
        };
        let value = p.identifier[0].value.as_deref().unwrap_or("");
        assert!(!NhsNumber::is_valid(value));
    }

    #[test]
    fn value_mutation_falls_back_to_first_component() {
        let mut resource = panel();
        assert!(Mutation::ImpossibleValue.apply(&mut resource, now()));
        let Resource::Observation(obs) = resource else {
            panic!("expected observation");
        };
        assert_eq!(obs.component[0].value(), Some(999.0));
    }

    #[test]
    fn future_timestamp_is_a_year_ahead() {
        let mut resource = panel();
        assert!(Mutation::FutureTimestamp.apply(&mut resource, now()));
        let Resource::Observation(obs) = resource else {
            panic!("expected observation");
        };
        assert_eq!(
            obs.effective_date_time.as_deref(),
            Some("2026-03-01T09:00:00+00:00")
        );
    }

    #[test]
    fn mutations_skip_resources_without_a_target() {
        let mut bare = Resource::Observation(Observation::default());
        assert!(!Mutation::UnitMismatch.apply(&mut bare, now()));
        assert!(!Mutation::FutureTimestamp.apply(&mut bare, now()));

        let mut other = patient();
        assert!(!Mutation::UnitMismatch.apply(&mut other, now()));
    }

    #[test]
    fn certain_rate_corrupts_every_eligible_entry() {
        let mut bundle = Bundle::transaction("ORU_SMITH_1", vec![patient(), panel()]);
        let mut rng = StdRng::seed_from_u64(1);
        let applied = corrupt_bundle(&mut bundle, &mut rng, 1.0, now());
        assert_eq!(applied.len(), 2);

        let mut untouched = Bundle::transaction("ORU_SMITH_1", vec![patient(), panel()]);
        let applied = corrupt_bundle(&mut untouched, &mut rng, 0.0, now());
        assert!(applied.is_empty());
    }

    #[test]
    fn run_rewrites_only_corrupted_bundles() {
        let temp = TempDir::new().expect("tempdir");
        let bundle = Bundle::transaction("ORU_SMITH_1", vec![patient(), panel()]);
        let json = BundleArtifact::render(&bundle).expect("render");
        fs::write(temp.path().join("ORU_SMITH_1.json"), &json).expect("write");
        fs::write(temp.path().join("torn.json"), "{").expect("write");

        let mut rng = StdRng::seed_from_u64(2);
        let summary = run_chaos(temp.path(), &mut rng, 1.0, now()).expect("run chaos");
        assert_eq!(summary.scanned, 2);
        assert_eq!(summary.infected.len(), 1);
        assert_eq!(summary.infected[0].0, "ORU_SMITH_1.json");

        let rewritten = fs::read_to_string(temp.path().join("ORU_SMITH_1.json")).expect("read");
        assert_ne!(rewritten, json);
        assert_eq!(
            fs::read_to_string(temp.path().join("torn.json")).expect("read"),
            "{"
        );
    }

    #[test]
    fn rejects_out_of_range_rate() {
        let temp = TempDir::new().expect("tempdir");
        let mut rng = StdRng::seed_from_u64(2);
        assert!(run_chaos(temp.path(), &mut rng, 1.5, now()).is_err());
    }
}
