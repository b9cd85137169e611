//! A validation run over a directory of bundle artifacts.
//!
//! Each artifact is judged independently and copied into the accepted or rejected partition.
//! Only once every verdict is known is the history reconciled and persisted, followed by the
//! HTML report.

use crate::engine::{Finding, ValidationEngine, Verdict};
use crate::history::{AuditTrailReconciler, ReconcileReport};
use crate::report::write_report;
use crate::store::HistoryStore;
use crate::GateResult;
use bridge_files::{artifact_name, ArtifactDir};
use chrono::{DateTime, Utc};
use fhir::BundleArtifact;
use std::path::PathBuf;

const BUNDLE_EXTENSION: &str = "json";

/// Locations a validation run reads from and writes to.
#[derive(Clone, Debug)]
pub struct GateConfig {
    pub bundle_dir: PathBuf,
    pub accepted_dir: PathBuf,
    pub rejected_dir: PathBuf,
    pub history_path: PathBuf,
    pub report_dir: PathBuf,
}

/// A rejected artifact and its combined findings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub filename: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct GateSummary {
    pub accepted: Vec<String>,
    pub rejections: Vec<Rejection>,
    pub advisories: usize,
    pub reconciled: ReconcileReport,
    pub report_path: Option<PathBuf>,
}

impl GateSummary {
    pub fn scanned(&self) -> usize {
        self.accepted.len() + self.rejections.len()
    }
}

/// Run the gate using the current wall-clock time.
///
/// # Errors
///
/// Returns `GateError` when a directory cannot be prepared, an artifact cannot be routed, or
/// the history or report cannot be written. Bad artifact content never fails the run.
pub fn run_gate(config: &GateConfig) -> GateResult<GateSummary> {
    run_gate_at(config, Utc::now())
}

/// Run the gate as of `now`.
///
/// # Errors
///
/// See [`run_gate`].
pub fn run_gate_at(config: &GateConfig, now: DateTime<Utc>) -> GateResult<GateSummary> {
    let bundles = ArtifactDir::create(&config.bundle_dir)?;
    let accepted_dir = ArtifactDir::create(&config.accepted_dir)?;
    let rejected_dir = ArtifactDir::create(&config.rejected_dir)?;

    let paths = bundles.list(BUNDLE_EXTENSION)?;
    tracing::info!(
        "scanning {} artifacts in {}",
        paths.len(),
        bundles.path().display()
    );

    let mut summary = GateSummary::default();
    for path in &paths {
        let filename = artifact_name(path)?.into_inner();
        let verdict = judge(&bundles, &filename, now);

        for advisory in &verdict.advisories {
            tracing::warn!("safety flag in {}: {}", filename, advisory);
        }
        summary.advisories += verdict.advisories.len();

        if verdict.is_accepted() {
            accepted_dir.copy_in(path)?;
            rejected_dir.remove(&filename)?;
            summary.accepted.push(filename);
        } else {
            rejected_dir.copy_in(path)?;
            accepted_dir.remove(&filename)?;
            let reason = verdict.combined();
            tracing::warn!("rejected {}: {}", filename, reason);
            summary.rejections.push(Rejection { filename, reason });
        }
    }

    let store = HistoryStore::new(&config.history_path);
    let mut history = store.load();
    summary.reconciled = AuditTrailReconciler::reconcile(
        &mut history,
        summary
            .rejections
            .iter()
            .map(|r| (r.filename.as_str(), r.reason.as_str())),
        now,
    );
    for filename in &summary.reconciled.resolved {
        tracing::info!("issue resolved: {}", filename);
    }
    store.save(&history)?;
    tracing::info!(
        "audit trail updated: {} entries, {} active",
        history.len(),
        history.active_count()
    );

    summary.report_path = Some(write_report(
        &config.report_dir,
        summary.accepted.len(),
        &summary.rejections,
        now,
    )?);

    tracing::info!(
        "gate finished: {} scanned, {} accepted, {} rejected",
        summary.scanned(),
        summary.accepted.len(),
        summary.rejections.len()
    );
    Ok(summary)
}

/// Verdict for `filename` in `dir`. Unreadable content is a single finding.
pub fn judge(dir: &ArtifactDir, filename: &str, now: DateTime<Utc>) -> Verdict {
    let parsed = dir
        .read(filename)
        .map_err(|e| e.to_string())
        .and_then(|text| BundleArtifact::parse(&text).map_err(|e| e.to_string()));

    match parsed {
        Ok(artifact) => ValidationEngine::evaluate(&artifact, now),
        Err(detail) => Verdict::rejected(Finding::new(format!(
            "Corrupt bundle artifact: {detail}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryStatus;
    use chrono::{Duration, TimeZone};
    use std::fs;
    use tempfile::TempDir;

    const VALID: &str = r#"{
  "resourceType": "Bundle",
  "id": "ORU_SMITH_1",
  "type": "transaction",
  "entry": [
    {"resource": {"resourceType": "Patient", "id": "9434765919",
      "identifier": [{"system": "https://fhir.nhs.uk/nhs-number", "value": "9434765919"}],
      "name": [{"family": "SMITH", "given": ["JANE"]}], "birthDate": "1980-01-31"}},
    {"resource": {"resourceType": "Observation", "status": "final",
      "code": {"coding": [{"system": "http://loinc.org", "code": "8867-4"}]},
      "effectiveDateTime": "2024-01-05T10:30:00+00:00",
      "valueQuantity": {"value": 72.0, "unit": "beats/minute", "code": "/min"}}}
  ]
}"#;

    fn setup() -> (TempDir, GateConfig) {
        let temp = TempDir::new().expect("tempdir");
        let data = temp.path().join("data");
        let config = GateConfig {
            bundle_dir: data.join("raw"),
            accepted_dir: data.join("accepted"),
            rejected_dir: data.join("rejected"),
            history_path: data.join("rejection_log.json"),
            report_dir: temp.path().join("reports"),
        };
        fs::create_dir_all(&config.bundle_dir).expect("bundle dir");
        (temp, config)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn routes_artifacts_and_records_rejections() {
        let (_temp, config) = setup();
        fs::write(config.bundle_dir.join("ORU_SMITH_1.json"), VALID).expect("write");
        fs::write(
            config.bundle_dir.join("ORU_BAD_2.json"),
            VALID.replace("beats/minute", "kg"),
        )
        .expect("write");
        fs::write(config.bundle_dir.join("ORU_TORN_3.json"), "{\"resourceType\": \"Bun").expect("write");

        let summary = run_gate_at(&config, t0()).expect("run gate");
        assert_eq!(summary.accepted, vec!["ORU_SMITH_1.json".to_string()]);
        assert_eq!(summary.rejections.len(), 2);
        assert_eq!(summary.rejections[0].filename, "ORU_BAD_2.json");
        assert_eq!(summary.rejections[0].reason, "Invalid Unit for Heart Rate: kg");
        assert!(summary.rejections[1]
            .reason
            .starts_with("Corrupt bundle artifact:"));

        assert!(config.accepted_dir.join("ORU_SMITH_1.json").is_file());
        assert!(config.rejected_dir.join("ORU_BAD_2.json").is_file());
        assert!(config.rejected_dir.join("ORU_TORN_3.json").is_file());
        assert!(summary.report_path.as_deref().is_some_and(std::path::Path::is_file));

        let history = HistoryStore::new(&config.history_path).load();
        assert_eq!(history.len(), 2);
        assert_eq!(history.active_count(), 2);
    }

    #[test]
    fn rerun_on_accepted_only_set_is_idempotent() {
        let (_temp, config) = setup();
        fs::write(config.bundle_dir.join("ORU_SMITH_1.json"), VALID).expect("write");

        run_gate_at(&config, t0()).expect("first run");
        let first = fs::read_to_string(&config.history_path).expect("history");

        run_gate_at(&config, t0() + Duration::minutes(10)).expect("second run");
        let second = fs::read_to_string(&config.history_path).expect("history");
        assert_eq!(first, second);
        assert!(HistoryStore::new(&config.history_path).load().is_empty());
    }

    #[test]
    fn fixed_artifact_resolves_and_moves_partition() {
        let (_temp, config) = setup();
        let path = config.bundle_dir.join("ORU_SMITH_1.json");
        fs::write(&path, VALID.replace("9434765919\"}]", "9876543210\"}]")).expect("write");

        let summary = run_gate_at(&config, t0()).expect("first run");
        assert_eq!(summary.rejections[0].reason, "Invalid NHS Number Checksum");
        assert!(config.rejected_dir.join("ORU_SMITH_1.json").is_file());

        fs::write(&path, VALID).expect("fix artifact");
        let t1 = t0() + Duration::minutes(10);
        let summary = run_gate_at(&config, t1).expect("second run");
        assert_eq!(summary.reconciled.resolved, vec!["ORU_SMITH_1.json".to_string()]);
        assert!(config.accepted_dir.join("ORU_SMITH_1.json").is_file());
        assert!(!config.rejected_dir.join("ORU_SMITH_1.json").exists());

        let history = HistoryStore::new(&config.history_path).load();
        assert_eq!(history.len(), 1);
        let entry = history.get("ORU_SMITH_1.json").expect("entry");
        assert_eq!(entry.status, HistoryStatus::Resolved);
        assert_eq!(entry.timestamp, t1);

        // A third clean run neither flips nor restamps the entry.
        run_gate_at(&config, t1 + Duration::minutes(10)).expect("third run");
        let again = HistoryStore::new(&config.history_path).load();
        assert_eq!(again, history);
    }

    #[test]
    fn undecodable_artifact_is_judged_corrupt_with_its_location() {
        let (_temp, config) = setup();
        fs::write(config.bundle_dir.join("ORU_BINARY_4.json"), [0xff, 0xfe, 0x00]).expect("write");

        let bundles = ArtifactDir::open(&config.bundle_dir).expect("bundle dir");
        let verdict = judge(&bundles, "ORU_BINARY_4.json", t0());
        assert!(!verdict.is_accepted());
        let reason = verdict.combined();
        assert!(reason.starts_with("Corrupt bundle artifact: "));
        assert!(reason.contains("ORU_BINARY_4.json"));
    }

    #[test]
    fn heart_rate_without_value_is_rejected() {
        let (_temp, config) = setup();
        fs::write(
            config.bundle_dir.join("ORU_SMITH_5.json"),
            VALID.replace("\"value\": 72.0, ", ""),
        )
        .expect("write");

        let summary = run_gate_at(&config, t0()).expect("run gate");
        assert!(summary.accepted.is_empty());
        assert_eq!(summary.rejections[0].reason, "Missing Heart Rate Value");
    }

    #[test]
    fn corrupt_history_does_not_fail_the_run() {
        let (_temp, config) = setup();
        fs::write(&config.history_path, "garbage").expect("write history");
        fs::write(config.bundle_dir.join("ORU_SMITH_1.json"), VALID).expect("write");

        let summary = run_gate_at(&config, t0()).expect("run gate");
        assert_eq!(summary.accepted.len(), 1);
        assert!(config.history_path.with_file_name("rejection_log.json.corrupt").is_file());
    }
}
