//! Domain models for the leaderboard tooling.
//!
//! - `Submission`: one contributor record for a (model, agent) pair
//! - `LeaderboardDocument`: the published, per-pair aggregate
//! - `MergedSnapshot`: versioned concatenation of raw submissions
//! - `CveReferenceTable`: publication dates keyed by CVE ID

pub mod cve;
pub mod error;
pub mod leaderboard;
pub mod snapshot;
pub mod submission;

pub use cve::{CveReference, CveReferenceTable};
pub use error::{LeaderboardError, Result, SubmissionError};
pub use leaderboard::{LeaderboardDocument, LeaderboardEntry, Metadata, ResultBuckets};
pub use snapshot::{MergedSnapshot, SubmissionRecord};
pub use submission::{AccessType, Bucket, CveResult, CveResults, Submission};
