//! Persistence of the rejection history as a JSON array.

use crate::history::{History, HistoryEntry};
use crate::GateResult;
use bridge_files::write_replacing;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const CORRUPT_SUFFIX: &str = "corrupt";

/// The on-disk history store for one pipeline.
#[derive(Clone, Debug)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full history.
    ///
    /// A missing store is an empty history. An unreadable or unparseable store is also treated
    /// as empty; its content is preserved beside the store with a `.corrupt` suffix.
    pub fn load(&self) -> History {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return History::new(),
            Err(e) => {
                tracing::warn!(
                    "history store {} is unreadable, starting empty: {}",
                    self.path.display(),
                    e
                );
                self.preserve_corrupt();
                return History::new();
            }
        };

        if text.trim().is_empty() {
            return History::new();
        }

        match serde_json::from_str::<Vec<HistoryEntry>>(&text) {
            Ok(entries) => History::from_entries(entries),
            Err(e) => {
                tracing::warn!(
                    "history store {} is corrupt, starting empty: {}",
                    self.path.display(),
                    e
                );
                self.preserve_corrupt();
                History::new()
            }
        }
    }

    /// Replace the store with `history` in persisted order.
    ///
    /// # Errors
    ///
    /// Returns `GateError` if serialisation or the write fails.
    pub fn save(&self, history: &History) -> GateResult<()> {
        let json = serde_json::to_string_pretty(&history.ordered())?;
        write_replacing(&self.path, &json)?;
        Ok(())
    }

    fn corrupt_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(CORRUPT_SUFFIX);
        self.path.with_file_name(name)
    }

    fn preserve_corrupt(&self) {
        let backup = self.corrupt_path();
        if let Err(e) = fs::rename(&self.path, &backup) {
            tracing::warn!(
                "could not preserve corrupt history as {}: {}",
                backup.display(),
                e
            );
        }
    }
}
