//! Rejection history and its reconciliation across runs.
//!
//! Entries are keyed by artifact file name. A file rejected in a run is (re)marked Active with
//! that run's reason and time. An Active entry whose file is not rejected in a run becomes
//! Resolved once, stamped with the transition time. Resolved entries are never removed and are
//! left untouched by clean runs, so re-running over an unchanged input set is a no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Active,
    Resolved,
}

impl HistoryStatus {
    fn rank(&self) -> u8 {
        match self {
            HistoryStatus::Active => 0,
            HistoryStatus::Resolved => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub filename: String,
    pub reason: String,
    pub status: HistoryStatus,
    pub timestamp: DateTime<Utc>,
}

/// All known entries keyed by file name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    entries: BTreeMap<String, HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted entries. A later duplicate of a file name replaces an earlier one.
    pub fn from_entries(entries: impl IntoIterator<Item = HistoryEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.filename.clone(), entry))
                .collect(),
        }
    }

    pub fn get(&self, filename: &str) -> Option<&HistoryEntry> {
        self.entries.get(filename)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.status == HistoryStatus::Active)
            .count()
    }

    /// Entries in persisted order: Active first, newest first within a status, then by name.
    pub fn ordered(&self) -> Vec<&HistoryEntry> {
        let mut entries: Vec<&HistoryEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            a.status
                .rank()
                .cmp(&b.status.rank())
                .then_with(|| b.timestamp.cmp(&a.timestamp))
                .then_with(|| a.filename.cmp(&b.filename))
        });
        entries
    }
}

/// File names touched by one reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Newly created entries.
    pub created: Vec<String>,
    /// Existing entries re-marked Active (previously Active or Resolved).
    pub reactivated: Vec<String>,
    /// Entries that transitioned Active to Resolved.
    pub resolved: Vec<String>,
}

/// Merges a run's rejections into the history.
pub struct AuditTrailReconciler;

impl AuditTrailReconciler {
    /// Apply one run's rejections, given as `(file name, combined reason)` pairs.
    pub fn reconcile<'a, I>(history: &mut History, rejections: I, now: DateTime<Utc>) -> ReconcileReport
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut report = ReconcileReport::default();
        let mut rejected: BTreeMap<&str, &str> = BTreeMap::new();
        for (filename, reason) in rejections {
            rejected.insert(filename, reason);
        }

        for (&filename, &reason) in &rejected {
            let entry = HistoryEntry {
                filename: filename.to_owned(),
                reason: reason.to_owned(),
                status: HistoryStatus::Active,
                timestamp: now,
            };
            match history.entries.insert(filename.to_owned(), entry) {
                Some(_) => report.reactivated.push(filename.to_owned()),
                None => report.created.push(filename.to_owned()),
            }
        }

        for entry in history.entries.values_mut() {
            if rejected.contains_key(entry.filename.as_str()) {
                continue;
            }
            if entry.status == HistoryStatus::Active {
                entry.status = HistoryStatus::Resolved;
                entry.timestamp = now;
                report.resolved.push(entry.filename.clone());
            }
        }

        report
    }
}
