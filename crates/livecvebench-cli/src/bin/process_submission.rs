//! Validate a submission and merge it into `leaderboard.json`.
//!
//! ```text
//! process-submission submissions/GPT-4o_OpenHands.json
//! process-submission --all
//! process-submission --validate submissions/GPT-4o_OpenHands.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Parser;
use livecvebench_cli::{parse_or_exit, today, CommonArgs};
use livecvebench_core::{
    list_submission_files, process_submission_file, DataLayout, LeaderboardError, ProcessMode,
    ProcessOutcome, UpsertAction,
};

#[derive(Parser, Debug)]
#[command(name = "process-submission")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate LiveCVEBench submissions and merge them into the leaderboard")]
struct Cli {
    /// Submission file to validate and merge
    #[arg(
        required_unless_present_any = ["all", "validate"],
        conflicts_with_all = ["all", "validate"]
    )]
    file: Option<PathBuf>,

    /// Process every submission file in the submissions directory
    #[arg(long, conflicts_with = "validate")]
    all: bool,

    /// Only validate the given file; do not merge or write
    #[arg(long, value_name = "FILE")]
    validate: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<ExitCode> {
    let cli: Cli = parse_or_exit();
    cli.common.init_logging();

    Ok(if run(&cli, today())? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Dispatch on the parsed flags. `Ok(false)` means the single file failed.
fn run(cli: &Cli, today: NaiveDate) -> Result<bool> {
    let layout = cli.common.layout();

    if cli.all {
        process_all(&layout, today);
        return Ok(true);
    }

    let (path, mode) = match (&cli.validate, &cli.file) {
        (Some(path), _) => (path, ProcessMode::ValidateOnly),
        (None, Some(path)) => (path, ProcessMode::Merge),
        (None, None) => bail!("a submission file is required unless --all is given"),
    };

    Ok(process_one(&layout, path, mode, today))
}

/// Process one file and print its report. Returns `true` on success.
fn process_one(layout: &DataLayout, path: &Path, mode: ProcessMode, today: NaiveDate) -> bool {
    println!("\nProcessing: {}", path.display());

    match process_submission_file(layout, path, mode, today) {
        Ok(outcome) => {
            println!("  ✓ Validation passed");
            if let ProcessOutcome::Merged {
                submission,
                upsert,
                leaderboard,
            } = &outcome
            {
                let verb = match upsert.action {
                    UpsertAction::Inserted => "Adding new entry",
                    UpsertAction::Updated => "Updating existing entry",
                };
                println!(
                    "  {verb}: {} + {} ({})",
                    submission.model,
                    submission.agent,
                    upsert.bucket.as_str()
                );
                for change in &upsert.type_changes {
                    println!(
                        "  ⚠ Warning: {} changed from '{}' to '{}'",
                        change.field, change.previous, change.current
                    );
                }
                if !upsert.unknown_cves.is_empty() {
                    println!(
                        "  ⚠ Warning: These CVEs are not in the CVE list: {}",
                        upsert.unknown_cves.join(", ")
                    );
                    println!("    Please add them to the 'cves' array with their dates");
                }
                println!("✓ Saved to {}", leaderboard.display());
            }
            true
        }
        Err(LeaderboardError::InvalidSubmission(errors)) => {
            println!("  ✗ Validation failed:");
            for error in &errors {
                println!("    - {error}");
            }
            false
        }
        Err(LeaderboardError::Json { path, source }) => {
            println!("  ✗ Invalid JSON in {}: {source}", path.display());
            false
        }
        Err(e) => {
            println!("  ✗ Error: {e}");
            false
        }
    }
}

fn process_all(layout: &DataLayout, today: NaiveDate) {
    let files = match list_submission_files(layout) {
        Ok(files) => files,
        Err(LeaderboardError::DirectoryNotFound(dir)) => {
            println!("Submissions directory not found: {}", dir.display());
            return;
        }
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };

    if files.is_empty() {
        println!("No submission files found");
        return;
    }

    println!("Found {} submission file(s)", files.len());

    let mut succeeded = 0;
    let mut failed = 0;
    for path in &files {
        if process_one(layout, path, ProcessMode::Merge, today) {
            succeeded += 1;
        } else {
            failed += 1;
        }
    }

    println!("\n{}", "=".repeat(40));
    println!("Results: {succeeded} succeeded, {failed} failed");
}
