//! LiveCVEBench Core Library
//!
//! Validation, merging and conversion of benchmark submissions into the
//! published leaderboard. The three command-line tools are thin wrappers
//! over the operations re-exported here.

pub mod bulk;
pub mod convert;
pub mod domain;
pub mod layout;
pub mod process;
pub mod store;
pub mod telemetry;
pub mod upsert;
pub mod validation;

pub use domain::{
    AccessType, Bucket, CveReference, CveReferenceTable, CveResult, CveResults,
    LeaderboardDocument, LeaderboardEntry, LeaderboardError, MergedSnapshot, Metadata, Result,
    ResultBuckets, Submission, SubmissionError, SubmissionRecord,
};

pub use bulk::{
    build_snapshot, discover_submission_files, load_submission_file, merge_directory,
    next_snapshot_version, BulkMergeReport, SkippedFile,
};
pub use convert::{
    convert_snapshot, convert_to_leaderboard, latest_snapshot, sort_by_publish_date, Conversion,
    SkippedRecord,
};
pub use layout::DataLayout;
pub use process::{
    list_submission_files, process_submission_file, ProcessMode, ProcessOutcome,
};
pub use telemetry::init_tracing;
pub use upsert::{upsert_submission, TypeChange, UpsertAction, UpsertOutcome};
pub use validation::{parse_submission, validate_submission};
