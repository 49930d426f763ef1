//! Versioned merged-results snapshots.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Filename prefix shared by every snapshot.
pub const SNAPSHOT_PREFIX: &str = "merged_results";

/// A submission exactly as it was read from disk.
///
/// Only the presence of the required fields is known; values keep whatever
/// shape the contributor gave them.
pub type SubmissionRecord = Map<String, Value>;

/// Concatenation of raw submissions produced by the bulk merger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedSnapshot {
    /// RFC 3339 local timestamp of the merge run.
    pub generated_at: String,
    pub total_cves: usize,
    pub total_combinations: usize,
    pub results: Vec<SubmissionRecord>,
}

/// `instruction_type` of a record when it is a string.
pub fn record_instruction_type(record: &SubmissionRecord) -> Option<&str> {
    record.get("instruction_type").and_then(Value::as_str)
}

/// Keys of the record's `cve_results`; none when it is not an object.
pub fn record_cve_ids(record: &SubmissionRecord) -> impl Iterator<Item = &str> {
    record
        .get("cve_results")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|results| results.keys().map(String::as_str))
}

/// `merged_results_v<version>.json`
pub fn snapshot_file_name(version: u32) -> String {
    format!("{SNAPSHOT_PREFIX}_v{version}.json")
}

/// Version encoded in a `merged_results_v<N>.json` path.
///
/// Returns `None` for other files and for non-numeric suffixes.
pub fn parse_snapshot_version(path: &Path) -> Option<u32> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let rest = stem.strip_prefix(SNAPSHOT_PREFIX)?;
    rest.strip_prefix("_v")?.parse().ok()
}

/// `true` for any `merged_results*.json` file, versioned or not.
pub fn is_snapshot_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with(SNAPSHOT_PREFIX) && n.ends_with(".json"))
        .unwrap_or(false)
}
