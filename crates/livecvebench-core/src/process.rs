//! Single-file processing: validate a submission, then merge it into
//! `leaderboard.json`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::domain::error::{LeaderboardError, Result};
use crate::domain::submission::Submission;
use crate::layout::DataLayout;
use crate::store::{load_leaderboard, read_json, save_leaderboard};
use crate::upsert::{upsert_submission, UpsertOutcome};
use crate::validation::parse_submission;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMode {
    /// Validate only; nothing is written.
    ValidateOnly,
    /// Validate, upsert and save the leaderboard.
    Merge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    Validated(Submission),
    Merged {
        submission: Submission,
        upsert: UpsertOutcome,
        leaderboard: PathBuf,
    },
}

/// Read and validate the submission at `path`; in [`ProcessMode::Merge`]
/// also upsert it into the layout's leaderboard and save.
///
/// The leaderboard is loaded fresh for every call so a batch of files sees
/// each previous write.
///
/// # Errors
///
/// - `LeaderboardError::Io` / `LeaderboardError::Json` when the file cannot
///   be read or decoded.
/// - `LeaderboardError::InvalidSubmission` listing every validation failure.
pub fn process_submission_file(
    layout: &DataLayout,
    path: &Path,
    mode: ProcessMode,
    today: NaiveDate,
) -> Result<ProcessOutcome> {
    let raw: Value = read_json(path)?;
    let submission = parse_submission(raw)?;
    debug!(path = %path.display(), "validation passed");

    if mode == ProcessMode::ValidateOnly {
        return Ok(ProcessOutcome::Validated(submission));
    }

    let mut doc = load_leaderboard(layout, today)?;
    let upsert = upsert_submission(&mut doc, &submission);
    save_leaderboard(layout, &mut doc, today)?;

    Ok(ProcessOutcome::Merged {
        submission,
        upsert,
        leaderboard: layout.leaderboard_path(),
    })
}

/// `*.json` files directly inside the submissions directory, sorted.
///
/// # Errors
///
/// - `LeaderboardError::DirectoryNotFound` when the directory is missing.
pub fn list_submission_files(layout: &DataLayout) -> Result<Vec<PathBuf>> {
    let dir = &layout.submissions_dir;
    if !dir.is_dir() {
        return Err(LeaderboardError::DirectoryNotFound(dir.clone()));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| LeaderboardError::io(dir, e))? {
        let path = entry.map_err(|e| LeaderboardError::io(dir, e))?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
