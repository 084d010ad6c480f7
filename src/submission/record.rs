//! Submission metadata records.
//!
//! One `upload_info.json` per submission directory. Records written by older
//! revisions of the site may lack the `id`, `authors`, and `title` fields and
//! may use the legacy `exe` key for the program file; those still parse.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum number of authors per submission.
pub const MAX_AUTHORS: usize = 4;

/// Logical file roles mapped to on-disk filenames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileSet {
    /// The executable/script artifact. Older records used the key `exe`.
    #[serde(default, alias = "exe", skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// The documentation file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docx: Option<String>,
}

impl FileSet {
    /// True when both required roles are populated.
    pub fn is_complete(&self) -> bool {
        self.program.is_some() && self.docx.is_some()
    }

    /// Iterate over the stored filenames.
    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.program
            .as_deref()
            .into_iter()
            .chain(self.docx.as_deref())
    }
}

/// Metadata record for one submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    /// Opaque submission ID; also the storage directory name.
    ///
    /// Absent in records written before IDs existed; the store fills it in
    /// from the directory name when reading.
    #[serde(default)]
    pub id: String,
    /// Primary author (display name). Kept for compatibility with the
    /// earliest records, which had no `authors` list.
    pub full_name: String,
    /// Ordered author list, first entry is the primary author.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    /// Study group, free text.
    #[serde(default)]
    pub group: String,
    /// Course subject, free text.
    #[serde(default)]
    pub subject: String,
    /// Work title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Upload time, ISO-8601. Set once at upload.
    pub timestamp: String,
    /// Role -> stored filename mapping.
    pub files: FileSet,
}

impl UploadRecord {
    /// The primary author: first of `authors`, falling back to `full_name`
    /// for legacy records.
    pub fn primary_author(&self) -> &str {
        self.authors
            .first()
            .map(String::as_str)
            .unwrap_or(&self.full_name)
    }

    /// All authors for display; legacy records yield just the primary.
    pub fn authors_display(&self) -> Vec<&str> {
        if self.authors.is_empty() {
            vec![self.full_name.as_str()]
        } else {
            self.authors.iter().map(String::as_str).collect()
        }
    }
}
