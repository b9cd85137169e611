//! Directory-scoped artifact operations.
//!
//! An [`ArtifactDir`] is bound to one directory and only ever touches plain file names inside
//! it. Names containing path separators or parent references are rejected up front.

use crate::{FilesError, FilesResult};
use bridge_types::NonEmptyText;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A directory of artifacts of one pipeline stage.
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    root: PathBuf,
}

impl ArtifactDir {
    /// Bind to an existing directory.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidDirectory` if the path does not exist or is not a directory.
    pub fn open(root: &Path) -> FilesResult<Self> {
        if !root.exists() {
            return Err(FilesError::InvalidDirectory(format!(
                "Directory does not exist: {}",
                root.display()
            )));
        }

        if !root.is_dir() {
            return Err(FilesError::InvalidDirectory(format!(
                "Path is not a directory: {}",
                root.display()
            )));
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Bind to a directory, creating it (and parents) when missing.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if creation fails or the path exists but is not a directory.
    pub fn create(root: &Path) -> FilesResult<Self> {
        fs::create_dir_all(root).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create directory {}: {}", root.display(), e),
            ))
        })?;
        Self::open(root)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Regular files with the given extension, sorted by file name.
    ///
    /// Temporary files left by an interrupted [`write_replacing`] are skipped.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::Io` if the directory cannot be read.
    pub fn list(&self, extension: &str) -> FilesResult<Vec<PathBuf>> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file() {
                continue;
            }
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            let matches = path.extension().and_then(|e| e.to_str()) == Some(extension);
            if matches && !hidden {
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }

    /// Absolute location of `file_name` inside this directory.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidPath` for empty names or names that would escape the directory.
    pub fn join(&self, file_name: &str) -> FilesResult<PathBuf> {
        validate_file_name(file_name)?;
        Ok(self.root.join(file_name))
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.join(file_name).is_ok_and(|p| p.is_file())
    }

    /// Write `contents` to `file_name` as a whole-file replacement.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if the name is invalid or the write fails.
    pub fn write(&self, file_name: &str, contents: &str) -> FilesResult<PathBuf> {
        let target = self.join(file_name)?;
        write_replacing(&target, contents)?;
        Ok(target)
    }

    pub fn read(&self, file_name: &str) -> FilesResult<String> {
        let target = self.join(file_name)?;
        fs::read_to_string(&target).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {}: {}", target.display(), e),
            ))
        })
    }

    /// Copy an artifact from anywhere into this directory under its own file name.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if the source has no usable file name or the copy fails.
    pub fn copy_in(&self, source: &Path) -> FilesResult<PathBuf> {
        let name = artifact_name(source)?;
        let target = self.join(name.as_str())?;
        fs::copy(source, &target).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to copy {} to {}: {}",
                    source.display(),
                    target.display(),
                    e
                ),
            ))
        })?;
        Ok(target)
    }

    /// Remove `file_name` if present. Returns whether a file was removed.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if the name is invalid or removal fails for a reason other than
    /// the file being absent.
    pub fn remove(&self, file_name: &str) -> FilesResult<bool> {
        let target = self.join(file_name)?;
        match fs::remove_file(&target) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FilesError::Io(e)),
        }
    }
}

/// Replace the file at `target` with `contents`.
///
/// The content is written to a hidden sibling first and then renamed over the target, so
/// readers never observe a half-written artifact.
///
/// # Errors
///
/// Returns `FilesError` if the target has no file name, or writing or renaming fails.
pub fn write_replacing(target: &Path, contents: &str) -> FilesResult<()> {
    let name = artifact_name(target)?;
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)?;
    }

    let staging = parent.join(format!(".{name}.tmp"));
    fs::write(&staging, contents).map_err(|e| {
        FilesError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to write {}: {}", staging.display(), e),
        ))
    })?;

    if let Err(e) = fs::rename(&staging, target) {
        let _ = fs::remove_file(&staging);
        return Err(FilesError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to replace {}: {}", target.display(), e),
        )));
    }

    Ok(())
}

/// The final path component as validated text.
///
/// # Errors
///
/// Returns `FilesError::InvalidPath` when the path has no UTF-8 file name.
pub fn artifact_name(path: &Path) -> FilesResult<NonEmptyText> {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| NonEmptyText::new(n).ok())
        .ok_or_else(|| FilesError::InvalidPath(format!("No file name in {}", path.display())))
}

/// Swap the extension of a plain file name: `ADT_X_1.hl7` -> `ADT_X_1.json`.
pub fn with_extension(file_name: &str, extension: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    format!("{stem}.{extension}")
}

fn validate_file_name(file_name: &str) -> FilesResult<()> {
    let trimmed = file_name.trim();
    if trimmed.is_empty() {
        return Err(FilesError::InvalidPath("file name cannot be empty".into()));
    }
    if trimmed == "." || trimmed == ".." || trimmed.contains(['/', '\\']) {
        return Err(FilesError::InvalidPath(format!(
            "file name must not contain path components: {file_name}"
        )));
    }
    Ok(())
}
