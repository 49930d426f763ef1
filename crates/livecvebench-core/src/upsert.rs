//! Upsert of validated submissions into a leaderboard document.
//!
//! Entries are keyed by `(model, agent)` within their bucket. An incoming
//! submission overwrites results for CVE IDs it carries and leaves the rest
//! of the entry's results alone (last write wins, no timestamps).

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::leaderboard::{LeaderboardDocument, LeaderboardEntry};
use crate::domain::submission::{AccessType, Bucket, Submission};

/// Whether the upsert created a new entry or changed an existing one.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    Inserted,
    Updated,
}

/// An access-type field that changed on an existing entry.
///
/// `previous` is the stored value, which need not be `open` or `closed` in
/// a hand-edited leaderboard.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TypeChange {
    pub field: &'static str,
    pub previous: String,
    pub current: AccessType,
}

/// What a single upsert did.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub action: UpsertAction,
    pub bucket: Bucket,
    /// Position of the entry within its bucket.
    pub index: usize,
    /// Type drift on an existing entry (always empty on insert).
    pub type_changes: Vec<TypeChange>,
    /// Incoming CVE IDs missing from the document's `cves` list, sorted.
    pub unknown_cves: Vec<String>,
}

/// Merge `submission` into `doc`.
///
/// The entry lives in the bucket chosen by the submission's
/// `instruction_type`. The top-level `cves` list is never extended; IDs it
/// lacks are reported in [`UpsertOutcome::unknown_cves`].
pub fn upsert_submission(doc: &mut LeaderboardDocument, submission: &Submission) -> UpsertOutcome {
    let bucket = submission.bucket();
    let incoming = LeaderboardEntry::from(submission);
    let entries = doc.results.get_mut(bucket);
    let existing = entries
        .iter()
        .position(|e| e.is(&submission.model, &submission.agent));

    let (action, index, type_changes) = match existing {
        Some(idx) => {
            info!(
                model = %submission.model,
                agent = %submission.agent,
                bucket = bucket.as_str(),
                "updating existing entry"
            );
            let entry = &mut entries[idx];
            let type_changes = diff_types(entry, submission);
            entry.model_type = incoming.model_type;
            entry.agent_type = incoming.agent_type;
            entry.cve_results.extend(incoming.cve_results);
            (UpsertAction::Updated, idx, type_changes)
        }
        None => {
            info!(
                model = %submission.model,
                agent = %submission.agent,
                bucket = bucket.as_str(),
                "adding new entry"
            );
            entries.push(incoming);
            (UpsertAction::Inserted, entries.len() - 1, Vec::new())
        }
    };

    for change in &type_changes {
        warn!(
            model = %submission.model,
            agent = %submission.agent,
            field = change.field,
            previous = %change.previous,
            current = %change.current,
            "access type changed on existing entry"
        );
    }

    let known: BTreeSet<&str> = doc.cves.iter().map(|c| c.id.as_str()).collect();
    let unknown_cves: Vec<String> = submission
        .cve_results
        .keys()
        .filter(|id| !known.contains(id.as_str()))
        .cloned()
        .collect();
    if !unknown_cves.is_empty() {
        warn!(
            count = unknown_cves.len(),
            cves = ?unknown_cves,
            "submission references CVEs missing from the cves list"
        );
    }

    UpsertOutcome {
        action,
        bucket,
        index,
        type_changes,
        unknown_cves,
    }
}

fn diff_types(previous: &LeaderboardEntry, submission: &Submission) -> Vec<TypeChange> {
    [
        ("modelType", &previous.model_type, submission.model_type),
        ("agentType", &previous.agent_type, submission.agent_type),
    ]
    .into_iter()
    .filter(|(_, old, new)| old.as_str() != new.as_str())
    .map(|(field, old, current)| TypeChange {
        field,
        previous: old.clone(),
        current,
    })
    .collect()
}
