//! Conversion of a merged snapshot into the published leaderboard.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::cve::{fallback_date, parse_publish_date, CveReference, CveReferenceTable};
use crate::domain::error::{LeaderboardError, Result};
use crate::domain::leaderboard::{LeaderboardDocument, LeaderboardEntry, Metadata, ResultBuckets};
use crate::domain::snapshot::{
    is_snapshot_file, record_cve_ids, record_instruction_type, MergedSnapshot,
};
use crate::domain::submission::Bucket;
use crate::layout::DataLayout;
use crate::store::{load_reference_table, load_snapshot, write_json, Indent};

/// A converted document plus the data-quality findings behind it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Conversion {
    pub document: LeaderboardDocument,
    /// CVE IDs that got a `<year>-01-01` fallback date.
    pub missing_dates: Vec<String>,
    /// CVE IDs whose date is not a `YYYY-MM-DD` calendar date.
    pub unparsed_dates: Vec<String>,
    /// Snapshot records that could not become leaderboard entries.
    pub skipped: Vec<SkippedRecord>,
}

/// A snapshot record left out of the leaderboard.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position in the snapshot's `results`.
    pub index: usize,
    /// First field that is not a string (`cve_results`: not an object).
    pub field: &'static str,
}

/// Build the leaderboard document from `snapshot`.
///
/// CVEs are ordered by parsed publication date; IDs with equal dates keep
/// ascending ID order. Dates that do not parse are placed last.
pub fn convert_snapshot(
    snapshot: &MergedSnapshot,
    reference: &CveReferenceTable,
    today: NaiveDate,
) -> Conversion {
    let all_cves: BTreeSet<&str> = snapshot.results.iter().flat_map(record_cve_ids).collect();

    let lookup = reference.date_lookup();
    let mut missing_dates = Vec::new();
    let mut cves: Vec<CveReference> = all_cves
        .into_iter()
        .map(|id| match lookup.get(id) {
            Some(date) => CveReference::new(id, *date),
            None => {
                missing_dates.push(id.to_string());
                CveReference::new(id, fallback_date(id))
            }
        })
        .collect();
    if !missing_dates.is_empty() {
        warn!(
            count = missing_dates.len(),
            cves = ?missing_dates,
            "CVEs missing publication dates, using fallback"
        );
    }

    let unparsed_dates: Vec<String> = cves
        .iter()
        .filter(|c| parse_publish_date(&c.date).is_none())
        .map(|c| c.id.clone())
        .collect();
    if !unparsed_dates.is_empty() {
        warn!(
            count = unparsed_dates.len(),
            cves = ?unparsed_dates,
            "unparseable publication dates sorted last"
        );
    }
    sort_by_publish_date(&mut cves);

    let mut results = ResultBuckets::default();
    let mut skipped = Vec::new();
    for (index, record) in snapshot.results.iter().enumerate() {
        match LeaderboardEntry::from_record(record) {
            Ok(entry) => {
                let bucket = Bucket::for_instruction(record_instruction_type(record));
                results.get_mut(bucket).push(entry);
            }
            Err(field) => {
                warn!(index, field, "snapshot record cannot be projected, skipping");
                skipped.push(SkippedRecord { index, field });
            }
        }
    }

    Conversion {
        document: LeaderboardDocument {
            metadata: Metadata::new(today),
            cves,
            results,
            extra: Default::default(),
        },
        missing_dates,
        unparsed_dates,
        skipped,
    }
}

/// Stable sort by calendar date, unparseable dates last in string order.
pub fn sort_by_publish_date(cves: &mut [CveReference]) {
    cves.sort_by(|a, b| {
        match (parse_publish_date(&a.date), parse_publish_date(&b.date)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.date.cmp(&b.date),
        }
    });
}

/// Lexicographically last `merged_results*.json` in `data_dir`.
///
/// # Errors
///
/// - `LeaderboardError::NoSnapshotFound` when there is no candidate.
pub fn latest_snapshot(data_dir: &Path) -> Result<PathBuf> {
    let entries = match fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LeaderboardError::NoSnapshotFound(data_dir.to_path_buf()))
        }
        Err(e) => return Err(LeaderboardError::io(data_dir, e)),
    };

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LeaderboardError::io(data_dir, e))?;
        let path = entry.path();
        if path.is_file() && is_snapshot_file(&path) {
            candidates.push(path);
        }
    }
    candidates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    candidates
        .pop()
        .ok_or_else(|| LeaderboardError::NoSnapshotFound(data_dir.to_path_buf()))
}

/// Convert the snapshot at `snapshot_path` against the layout's reference
/// table and write `leaderboard.json`.
pub fn convert_to_leaderboard(
    layout: &DataLayout,
    snapshot_path: &Path,
    today: NaiveDate,
) -> Result<Conversion> {
    let snapshot = load_snapshot(snapshot_path)?;
    let reference = load_reference_table(layout)?;
    let conversion = convert_snapshot(&snapshot, &reference, today);

    let output = layout.leaderboard_path();
    write_json(&output, &conversion.document, Indent::Two)?;

    let doc = &conversion.document;
    info!(
        path = %output.display(),
        cves = doc.cves.len(),
        cve_description = doc.results.cve_description.len(),
        user_report = doc.results.user_report.len(),
        "generated leaderboard"
    );
    Ok(conversion)
}
