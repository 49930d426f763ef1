//! Bulk merge of a submissions directory into a versioned snapshot.
//!
//! Unlike [`crate::upsert`], this does no deduplication: every submission
//! that loads is appended to the snapshot as-is. Files that cannot be read,
//! are not valid JSON, or lack a required field are skipped and reported.
//! No other checks are made; field values are copied verbatim.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domain::error::{LeaderboardError, Result, SubmissionError};
use crate::domain::snapshot::{
    parse_snapshot_version, record_cve_ids, snapshot_file_name, MergedSnapshot, SubmissionRecord,
};
use crate::domain::submission::REQUIRED_FIELDS;
use crate::store::{write_json_new, Indent};

/// A file left out of the snapshot and why.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of a bulk merge run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BulkMergeReport {
    pub files_found: usize,
    pub loaded: usize,
    pub skipped: Vec<SkippedFile>,
    pub unique_cves: usize,
    /// Submission count per `instruction_type`; absent values count as `unknown`.
    pub by_instruction_type: BTreeMap<String, usize>,
    pub version: u32,
    pub output_path: PathBuf,
}

/// Recursively list `*.json` files under `dir` whose name does not start
/// with `.`, sorted by path.
///
/// # Errors
///
/// - `LeaderboardError::DirectoryNotFound` when `dir` does not exist.
pub fn discover_submission_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(LeaderboardError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
        if is_json && !hidden {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Load one submission for bulk merging.
///
/// Only presence of the required fields is enforced; the rule set in
/// [`crate::validation`] is not applied and values are not decoded.
///
/// # Errors
///
/// - `LeaderboardError::Io` / `LeaderboardError::Json` when the file cannot
///   be read or is not JSON.
/// - `LeaderboardError::InvalidSubmission` listing each missing field. A
///   payload that is not an object misses all of them.
pub fn load_submission_file(path: &Path) -> Result<SubmissionRecord> {
    let content = fs::read_to_string(path).map_err(|e| LeaderboardError::io(path, e))?;
    let raw: Value = serde_json::from_str(&content).map_err(|e| LeaderboardError::json(path, e))?;

    let record = match raw {
        Value::Object(record) => record,
        _ => SubmissionRecord::new(),
    };
    let missing: Vec<SubmissionError> = REQUIRED_FIELDS
        .iter()
        .filter(|&&field| !record.contains_key(field))
        .map(|&field| SubmissionError::MissingField { field })
        .collect();
    if !missing.is_empty() {
        return Err(LeaderboardError::InvalidSubmission(missing));
    }
    Ok(record)
}

/// One more than the highest `merged_results_v<N>.json` version in `dir`,
/// or 1 when there is none (or `dir` does not exist yet).
///
/// # Errors
///
/// - `LeaderboardError::VersionExhausted` when the highest version is
///   `u32::MAX`.
pub fn next_snapshot_version(dir: &Path) -> Result<u32> {
    if !dir.exists() {
        return Ok(1);
    }
    let entries = fs::read_dir(dir).map_err(|e| LeaderboardError::io(dir, e))?;
    let mut highest = None;
    for entry in entries {
        let entry = entry.map_err(|e| LeaderboardError::io(dir, e))?;
        if let Some(v) = parse_snapshot_version(&entry.path()) {
            highest = highest.max(Some(v));
        }
    }
    match highest {
        None => Ok(1),
        Some(v) => v
            .checked_add(1)
            .ok_or_else(|| LeaderboardError::VersionExhausted(dir.to_path_buf())),
    }
}

/// Assemble a snapshot from already-loaded submissions.
pub fn build_snapshot(
    results: Vec<SubmissionRecord>,
    generated_at: DateTime<Local>,
) -> MergedSnapshot {
    let unique: BTreeSet<&str> = results.iter().flat_map(record_cve_ids).collect();
    MergedSnapshot {
        generated_at: generated_at.to_rfc3339(),
        total_cves: unique.len(),
        total_combinations: results.len(),
        results,
    }
}

/// Submission counts per instruction type. Absent values count as
/// `unknown`; non-string values by their JSON text.
pub fn count_by_instruction_type(results: &[SubmissionRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in results {
        let label = match record.get("instruction_type") {
            None => "unknown".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

/// Merge every submission under `submissions_dir` into the next versioned
/// snapshot in `output_dir`.
///
/// # Errors
///
/// - `LeaderboardError::DirectoryNotFound` when `submissions_dir` is missing.
/// - `LeaderboardError::NoJsonFiles` when it contains no candidate files.
/// - `LeaderboardError::SnapshotExists` when the computed file name is taken.
pub fn merge_directory(
    submissions_dir: &Path,
    output_dir: &Path,
    now: DateTime<Local>,
) -> Result<BulkMergeReport> {
    let files = discover_submission_files(submissions_dir)?;
    if files.is_empty() {
        return Err(LeaderboardError::NoJsonFiles(submissions_dir.to_path_buf()));
    }
    info!(
        count = files.len(),
        dir = %submissions_dir.display(),
        "found submission files"
    );

    let mut results = Vec::new();
    let mut skipped = Vec::new();
    for path in &files {
        debug!(path = %path.display(), "loading submission");
        match load_submission_file(path) {
            Ok(submission) => results.push(submission),
            Err(e) => {
                let reason = skip_reason(&e);
                warn!(path = %path.display(), reason = %reason, "skipping submission");
                skipped.push(SkippedFile {
                    path: path.clone(),
                    reason,
                });
            }
        }
    }

    let by_instruction_type = count_by_instruction_type(&results);
    let snapshot = build_snapshot(results, now);

    let version = next_snapshot_version(output_dir)?;
    let output_path = output_dir.join(snapshot_file_name(version));
    write_json_new(&output_path, &snapshot, Indent::Two).map_err(|e| match e {
        LeaderboardError::Io { source, .. }
            if source.kind() == std::io::ErrorKind::AlreadyExists =>
        {
            LeaderboardError::SnapshotExists(output_path.clone())
        }
        other => other,
    })?;
    info!(
        path = %output_path.display(),
        version,
        submissions = snapshot.total_combinations,
        "wrote merged snapshot"
    );

    Ok(BulkMergeReport {
        files_found: files.len(),
        loaded: snapshot.total_combinations,
        skipped,
        unique_cves: snapshot.total_cves,
        by_instruction_type,
        version,
        output_path,
    })
}

fn skip_reason(err: &LeaderboardError) -> String {
    match err {
        LeaderboardError::InvalidSubmission(errors) => errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn version_starts_at_one() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(next_snapshot_version(dir.path()).unwrap(), 1);
        assert_eq!(
            next_snapshot_version(&dir.path().join("not-created")).unwrap(),
            1
        );
    }

    #[test]
    fn version_follows_highest_not_count() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["merged_results_v1.json", "merged_results_v3.json", "merged_results_vbad.json"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        assert_eq!(next_snapshot_version(dir.path()).unwrap(), 4);
    }

    #[test]
    fn version_at_ceiling_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(snapshot_file_name(u32::MAX)), "{}").unwrap();
        match next_snapshot_version(dir.path()) {
            Err(LeaderboardError::VersionExhausted(path)) => assert_eq!(path, dir.path()),
            other => panic!("Expected VersionExhausted, got {:?}", other),
        }
    }

    #[test]
    fn shape_problems_are_not_checked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loose.json");
        let raw = json!({
            "model": "M",
            "agent": "A",
            "modelType": "proprietary",
            "agentType": "open",
            "cve_results": { "CVE-2021-0001": { "success": true, "turns": null, "tokens": 5 } }
        });
        fs::write(&path, raw.to_string()).unwrap();
        let record = load_submission_file(&path).unwrap();
        assert_eq!(Value::Object(record), raw);
    }

    #[test]
    fn non_object_payload_misses_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, "[1, 2]").unwrap();
        match load_submission_file(&path).unwrap_err() {
            LeaderboardError::InvalidSubmission(errors) => {
                assert_eq!(errors.len(), REQUIRED_FIELDS.len())
            }
            other => panic!("Expected InvalidSubmission, got {:?}", other),
        }
    }

    #[test]
    fn missing_fields_all_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, json!({ "model": "M", "agent": "A" }).to_string()).unwrap();
        match load_submission_file(&path).unwrap_err() {
            LeaderboardError::InvalidSubmission(errors) => assert_eq!(
                errors,
                vec![
                    SubmissionError::MissingField { field: "modelType" },
                    SubmissionError::MissingField { field: "agentType" },
                    SubmissionError::MissingField { field: "cve_results" },
                ]
            ),
            other => panic!("Expected InvalidSubmission, got {:?}", other),
        }
    }

    #[test]
    fn snapshot_counts_unique_cves() {
        let records: Vec<SubmissionRecord> = [
            json!({
                "model": "A",
                "cve_results": { "CVE-2021-0001": {}, "CVE-2021-0002": {} }
            }),
            json!({
                "model": "A",
                "instruction_type": "user_report",
                "cve_results": { "CVE-2021-0002": {} }
            }),
            json!({ "model": "B", "instruction_type": null, "cve_results": "none" }),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
        let counts = count_by_instruction_type(&records);
        let snapshot = build_snapshot(records, Local::now());
        assert_eq!(snapshot.total_cves, 2);
        assert_eq!(snapshot.total_combinations, 3);
        assert_eq!(counts.get("unknown"), Some(&1));
        assert_eq!(counts.get("user_report"), Some(&1));
        assert_eq!(counts.get("null"), Some(&1));
    }
}
