//! Error taxonomy for the leaderboard tooling.

use std::path::PathBuf;

/// A single structural problem found in a submission payload.
///
/// Validation never stops at the first problem; callers receive every
/// variant that applies, in check order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("{field} must be a string")]
    NotAString { field: &'static str },

    #[error("{field} must be 'open' or 'closed', got: {value}")]
    InvalidAccessType { field: &'static str, value: String },

    #[error("cve_results must be an object")]
    ResultsNotAnObject,

    #[error("cve_results cannot be empty")]
    EmptyResults,

    #[error("Invalid CVE ID format: {cve_id}")]
    InvalidCveId { cve_id: String },

    #[error("{cve_id}: result must be an object")]
    ResultNotAnObject { cve_id: String },

    #[error("{cve_id}: missing '{field}' field")]
    MissingResultField { cve_id: String, field: &'static str },

    #[error("{cve_id}: 'success' must be a boolean")]
    SuccessNotBoolean { cve_id: String },

    #[error("{cve_id}: '{field}' must be a non-negative number")]
    NegativeOrNonNumeric { cve_id: String, field: &'static str },
}

/// Errors produced by the loading, merging and conversion operations.
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to convert {what}: {source}")]
    Serde {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("no JSON files found in {}", .0.display())]
    NoJsonFiles(PathBuf),

    #[error("no merged_results file found in {}", .0.display())]
    NoSnapshotFound(PathBuf),

    #[error("snapshot already exists: {}", .0.display())]
    SnapshotExists(PathBuf),

    #[error("snapshot versions exhausted in {}", .0.display())]
    VersionExhausted(PathBuf),

    #[error("submission failed validation with {} error(s)", .0.len())]
    InvalidSubmission(Vec<SubmissionError>),
}

impl LeaderboardError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result type for leaderboard operations.
pub type Result<T> = std::result::Result<T, LeaderboardError>;
