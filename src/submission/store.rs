//! Flat-file metadata store.
//!
//! One directory per submission under the storage root, named by an opaque
//! generated ID, holding the uploaded artifacts plus `upload_info.json`.
//! No indexing and no locking: readers scan, last write wins.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::record::UploadRecord;
use crate::{Result, SpacehubError};

/// Name of the per-submission metadata file.
pub const METADATA_FILE: &str = "upload_info.json";

/// Store for submission directories and their metadata records.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    /// Storage root (canonicalized at construction).
    root: PathBuf,
}

impl MetadataStore {
    /// Create a store rooted at `root`, creating the directory if absent.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        // Canonical root makes the containment checks immune to symlinks
        // and relative-path tricks.
        let root = root.canonicalize()?;
        Ok(Self { root })
    }

    /// Storage root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generate a fresh submission ID.
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Reject IDs that could not have been generated by [`Self::new_id`].
    fn validate_id(id: &str) -> Result<()> {
        if id.is_empty()
            || !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(SpacehubError::PathViolation(id.to_string()));
        }
        Ok(())
    }

    /// Reject filenames that contain path components or control characters.
    fn validate_filename(name: &str) -> Result<()> {
        if name.is_empty()
            || name == "."
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
            || name.chars().any(|c| c.is_control())
        {
            return Err(SpacehubError::PathViolation(name.to_string()));
        }
        Ok(())
    }

    /// Path of the submission directory for `id`. Does not require existence.
    pub fn submission_dir(&self, id: &str) -> Result<PathBuf> {
        Self::validate_id(id)?;
        Ok(self.root.join(id))
    }

    /// Resolve a stored artifact path, verifying the result is still inside
    /// the storage root. Fails closed: any resolution failure is an error,
    /// never an outside-root path.
    pub fn resolve_file(&self, id: &str, filename: &str) -> Result<PathBuf> {
        Self::validate_id(id)?;
        Self::validate_filename(filename)?;

        let candidate = self.root.join(id).join(filename);
        let resolved = match candidate.canonicalize() {
            Ok(p) => p,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SpacehubError::NotFound(format!("file {filename}")))
            }
            Err(e) => return Err(e.into()),
        };

        if !resolved.starts_with(&self.root) {
            return Err(SpacehubError::PathViolation(filename.to_string()));
        }
        Ok(resolved)
    }

    /// Write an uploaded artifact with a staging-then-rename pattern: the
    /// bytes go to a temporary file in the submission directory, are synced,
    /// then renamed into place so readers never see a partial file.
    pub fn write_artifact(&self, id: &str, stored_name: &str, content: &[u8]) -> Result<()> {
        Self::validate_filename(stored_name)?;
        let dir = self.submission_dir(id)?;
        fs::create_dir_all(&dir)?;

        let tmp = dir.join(format!(".{stored_name}.tmp"));
        let mut file = File::create(&tmp)?;
        file.write_all(content)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, dir.join(stored_name))?;
        Ok(())
    }

    /// Persist the metadata record for `id`, atomically replacing any
    /// previous record. Written last in the upload sequence.
    pub fn write(&self, id: &str, record: &UploadRecord) -> Result<()> {
        let dir = self.submission_dir(id)?;
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_vec_pretty(record)?;
        let tmp = dir.join(format!(".{METADATA_FILE}.tmp"));
        let mut file = File::create(&tmp)?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, dir.join(METADATA_FILE))?;
        Ok(())
    }

    /// Read the metadata record for one submission.
    pub fn read(&self, id: &str) -> Result<UploadRecord> {
        let path = self.submission_dir(id)?.join(METADATA_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SpacehubError::NotFound(format!("submission {id}")))
            }
            Err(e) => return Err(e.into()),
        };
        let mut record: UploadRecord = serde_json::from_str(&content)?;
        if record.id.is_empty() {
            record.id = id.to_string();
        }
        Ok(record)
    }

    /// Read every parseable record under the root, in directory-enumeration
    /// order. Directories without a metadata file are skipped silently;
    /// unparsable records are skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<UploadRecord>> {
        let mut records = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().into_owned();
            match self.read(&id) {
                Ok(record) => records.push(record),
                Err(SpacehubError::NotFound(_)) => {}
                Err(e) => {
                    tracing::warn!(submission = %id, error = %e, "Skipping unreadable record");
                }
            }
        }

        Ok(records)
    }

    /// Recursively delete a submission directory.
    ///
    /// Returns `true` if it existed, `false` if there was nothing to delete.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let dir = self.submission_dir(id)?;
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Cumulative byte size of all non-metadata artifacts in one submission.
    pub fn artifact_size(&self, id: &str) -> Result<u64> {
        let dir = self.submission_dir(id)?;
        let mut total = 0;

        let entries = match fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == METADATA_FILE || name.starts_with('.') {
                continue;
            }
            let meta = entry.metadata()?;
            if meta.is_file() {
                total += meta.len();
            }
        }
        Ok(total)
    }
}
