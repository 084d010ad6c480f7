//! Submission storage and queries.
//!
//! This module covers the whole life of a coursework submission: the
//! flat-file metadata store, upload validation and persistence, lookups and
//! downloads, and the admin-facing aggregate statistics.

pub mod record;
pub mod service;
pub mod stats;
pub mod store;

pub use record::{FileSet, UploadRecord, MAX_AUTHORS};
pub use service::{FileInfo, NewSubmission, SubmissionService, UploadedFile};
pub use stats::{StoreStats, RECENT_LIMIT};
pub use store::{MetadataStore, METADATA_FILE};
