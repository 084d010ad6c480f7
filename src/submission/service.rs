//! Submission service: validation, persistence, and queries.
//!
//! Sits between the web handlers and the [`MetadataStore`]. All user input
//! is validated here before it can influence a filesystem path.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::record::{FileSet, UploadRecord, MAX_AUTHORS};
use super::stats::StoreStats;
use super::store::MetadataStore;
use crate::config::StorageConfig;
use crate::datetime::{filename_timestamp, system_time_to_iso};
use crate::{Result, SpacehubError};

/// Maximum accepted author name length.
const MAX_AUTHOR_LENGTH: usize = 200;

/// One uploaded file as received from the transport layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-provided filename.
    pub original_name: String,
    /// Raw content.
    pub content: Vec<u8>,
}

/// Input for one new submission.
#[derive(Debug)]
pub struct NewSubmission {
    /// Author names, first is primary. Cleaned up during validation.
    pub authors: Vec<String>,
    /// Study group.
    pub group: String,
    /// Course subject.
    pub subject: String,
    /// Work title.
    pub title: Option<String>,
    /// The program artifact.
    pub program: UploadedFile,
    /// The documentation file.
    pub docx: UploadedFile,
}

/// Size and timestamps for one stored file, without reading its contents.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// Stored filename.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Creation time, ISO-8601 (absent on filesystems without birth time).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last modification time, ISO-8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

/// Service over the submission store.
#[derive(Debug, Clone)]
pub struct SubmissionService {
    store: MetadataStore,
    max_file_size: u64,
    allowed_extensions: Vec<String>,
}

impl SubmissionService {
    /// Create a service over an existing store.
    pub fn new(store: MetadataStore, max_file_size_mb: u64, allowed_extensions: Vec<String>) -> Self {
        Self {
            store,
            max_file_size: max_file_size_mb * 1024 * 1024,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// Create a service from the storage configuration.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let store = MetadataStore::new(&config.root)?;
        Ok(Self::new(
            store,
            config.max_file_size_mb,
            config.allowed_extensions.clone(),
        ))
    }

    /// Access the underlying store.
    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// Maximum accepted file size in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Validate an author display name.
    ///
    /// Author names end up in metadata only, never in paths, but they are
    /// still rejected early when they look like path fragments: such input
    /// is never legitimate here.
    fn validate_author(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(SpacehubError::Validation(
                "author name is empty".to_string(),
            ));
        }
        if name.len() > MAX_AUTHOR_LENGTH {
            return Err(SpacehubError::Validation(
                "author name is too long".to_string(),
            ));
        }
        if name.contains('/')
            || name.contains('\\')
            || name.contains("..")
            || name == "."
            || name.chars().any(|c| c.is_control())
        {
            return Err(SpacehubError::Validation(format!(
                "author name contains forbidden characters: {name}"
            )));
        }
        Ok(())
    }

    /// Check a client filename against the extension allow-list and return
    /// the lowercase extension.
    fn check_extension(&self, original_name: &str) -> Result<String> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !self.allowed_extensions.contains(&ext) {
            return Err(SpacehubError::Validation(format!(
                "only these file types are allowed: {}",
                self.allowed_extensions.join(", ")
            )));
        }
        Ok(ext)
    }

    /// Enforce the per-file size cap.
    fn check_size(&self, file: &UploadedFile) -> Result<()> {
        if file.content.len() as u64 > self.max_file_size {
            return Err(SpacehubError::Validation(format!(
                "file too large (max {}MB)",
                self.max_file_size / 1024 / 1024
            )));
        }
        Ok(())
    }

    /// Build the stored filename: `<original-basename>_<timestamp>.<ext>`.
    fn stored_filename(original_name: &str, ext: &str, ts: &str) -> String {
        let base = Path::new(original_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("file");
        // Strip anything path-like that survived file_stem on odd input
        let base: String = base
            .chars()
            .filter(|c| !matches!(c, '/' | '\\') && !c.is_control())
            .collect();
        format!("{base}_{ts}.{ext}")
    }

    /// Accept one submission: validate, persist files, write metadata last.
    ///
    /// Re-uploading under an existing primary author reuses that submission's
    /// directory and fully overwrites the metadata record. Files from earlier
    /// generations with different names stay on disk.
    pub fn upload(&self, new: NewSubmission) -> Result<UploadRecord> {
        // (a) authors
        let authors: Vec<String> = new
            .authors
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if authors.is_empty() {
            return Err(SpacehubError::Validation(
                "at least one author is required".to_string(),
            ));
        }
        if authors.len() > MAX_AUTHORS {
            return Err(SpacehubError::Validation(format!(
                "at most {MAX_AUTHORS} authors are allowed"
            )));
        }
        for author in &authors {
            Self::validate_author(author)?;
        }

        // (c) extensions, before anything touches the disk
        let program_ext = self.check_extension(&new.program.original_name)?;
        let docx_ext = self.check_extension(&new.docx.original_name)?;

        // (d) sizes
        self.check_size(&new.program)?;
        self.check_size(&new.docx)?;

        let primary = authors[0].clone();
        let id = match self.find_by_author(&primary)? {
            Some(existing) => existing.id,
            None => MetadataStore::new_id(),
        };

        let now = Utc::now();
        let ts = filename_timestamp(&now);
        let program_name = Self::stored_filename(&new.program.original_name, &program_ext, &ts);
        let docx_name = Self::stored_filename(&new.docx.original_name, &docx_ext, &ts);

        self.store.write_artifact(&id, &program_name, &new.program.content)?;
        self.store.write_artifact(&id, &docx_name, &new.docx.content)?;

        let record = UploadRecord {
            id: id.clone(),
            full_name: primary,
            authors,
            group: new.group.trim().to_string(),
            subject: new.subject.trim().to_string(),
            title: new
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            files: FileSet {
                program: Some(program_name),
                docx: Some(docx_name),
            },
        };

        // Metadata last: readers never see a record pointing at absent files.
        self.store.write(&id, &record)?;
        Ok(record)
    }

    /// All records, in directory-enumeration order. Callers sort client-side.
    pub fn list_all(&self) -> Result<Vec<UploadRecord>> {
        self.store.read_all()
    }

    /// Find the live submission for a primary author, if any.
    pub fn find_by_author(&self, author: &str) -> Result<Option<UploadRecord>> {
        Ok(self
            .store
            .read_all()?
            .into_iter()
            .find(|r| r.primary_author() == author))
    }

    fn require_by_author(&self, author: &str) -> Result<UploadRecord> {
        self.find_by_author(author)?
            .ok_or_else(|| SpacehubError::NotFound(format!("submission for {author}")))
    }

    /// Resolve the on-disk path for a download, containment-checked.
    pub fn download_path(&self, author: &str, filename: &str) -> Result<PathBuf> {
        let record = self.require_by_author(author)?;
        self.store.resolve_file(&record.id, filename)
    }

    /// Size and timestamps for one stored file.
    pub fn file_info(&self, author: &str, filename: &str) -> Result<FileInfo> {
        let path = self.download_path(author, filename)?;
        let meta = std::fs::metadata(&path)?;
        Ok(FileInfo {
            name: filename.to_string(),
            size: meta.len(),
            created: meta.created().ok().map(system_time_to_iso),
            modified: meta.modified().ok().map(system_time_to_iso),
        })
    }

    /// Delete the submission for a primary author.
    ///
    /// Returns `false` (not an error) when there is nothing to delete.
    pub fn delete_by_author(&self, author: &str) -> Result<bool> {
        match self.find_by_author(author)? {
            Some(record) => self.store.delete(&record.id),
            None => Ok(false),
        }
    }

    /// Full-scan aggregate statistics.
    pub fn compute_stats(&self) -> Result<StoreStats> {
        let records = self.store.read_all()?;
        let mut sizes = Vec::with_capacity(records.len());
        for record in &records {
            sizes.push(self.store.artifact_size(&record.id)?);
        }
        Ok(StoreStats::from_records(records, &sizes))
    }
}
