//! Aggregate statistics over the submission store.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::record::UploadRecord;

/// Number of submissions reported in the `recent` list.
pub const RECENT_LIMIT: usize = 10;

/// Aggregate store statistics.
///
/// Computed by a full scan on every request. The store is classroom-sized,
/// so the O(n · files) walk stays cheap and needs no cache invalidation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    /// Count of submissions with a readable metadata record.
    pub total_uploads: u64,
    /// Cumulative byte size of all non-metadata files.
    pub total_size: u64,
    /// Submission count per calendar day ("YYYY-MM-DD").
    pub uploads_per_day: BTreeMap<String, u64>,
    /// The ten most recent submissions, newest first.
    pub recent: Vec<UploadRecord>,
}

impl StoreStats {
    /// Build stats from scanned records and their artifact sizes.
    pub fn from_records(records: Vec<UploadRecord>, sizes: &[u64]) -> Self {
        let total_uploads = records.len() as u64;
        let total_size = sizes.iter().sum();

        let mut uploads_per_day: BTreeMap<String, u64> = BTreeMap::new();
        for record in &records {
            if let Some(day) = crate::datetime::day_key(&record.timestamp) {
                *uploads_per_day.entry(day).or_insert(0) += 1;
            }
        }

        let mut recent = records;
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(RECENT_LIMIT);

        Self {
            total_uploads,
            total_size,
            uploads_per_day,
            recent,
        }
    }
}
