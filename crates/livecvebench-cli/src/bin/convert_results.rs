//! Convert a merged-results snapshot into `leaderboard.json`.
//!
//! ```text
//! convert-results                              # latest data/merged_results*.json
//! convert-results data/merged_results_v5.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use livecvebench_cli::{parse_or_exit, today, CommonArgs};
use livecvebench_core::{convert_to_leaderboard, latest_snapshot};

#[derive(Parser, Debug)]
#[command(name = "convert-results")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build leaderboard.json from a merged_results snapshot")]
struct Cli {
    /// Snapshot to convert (default: the latest merged_results file in the data directory)
    merged_results_file: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let cli: Cli = parse_or_exit();
    cli.common.init_logging();

    let layout = cli.common.layout();
    let snapshot_path = match cli.merged_results_file {
        Some(path) => path,
        None => {
            let latest = latest_snapshot(&layout.data_dir)?;
            if let Some(name) = latest.file_name() {
                println!("Using latest: {}", name.to_string_lossy());
            }
            latest
        }
    };

    println!("Reading {}...", snapshot_path.display());
    println!("Reading {}...", layout.cve_dates_path().display());
    let conversion = convert_to_leaderboard(&layout, &snapshot_path, today())
        .with_context(|| format!("converting {}", snapshot_path.display()))?;

    if !conversion.missing_dates.is_empty() {
        println!(
            "\nWarning: {} CVEs missing dates (using fallback):",
            conversion.missing_dates.len()
        );
        for cve_id in &conversion.missing_dates {
            println!("  - {cve_id}");
        }
        println!();
    }
    if !conversion.skipped.is_empty() {
        println!(
            "Warning: {} snapshot records skipped:",
            conversion.skipped.len()
        );
        for skipped in &conversion.skipped {
            println!("  - record {}: bad '{}'", skipped.index, skipped.field);
        }
        println!();
    }
    if !conversion.unparsed_dates.is_empty() {
        println!(
            "Warning: {} CVEs have unparseable dates (sorted last):",
            conversion.unparsed_dates.len()
        );
        for cve_id in &conversion.unparsed_dates {
            println!("  - {cve_id}");
        }
        println!();
    }

    let doc = &conversion.document;
    println!("Generated {}", layout.leaderboard_path().display());
    println!("  - {} CVEs", doc.cves.len());
    println!(
        "  - CVE Description: {} entries",
        doc.results.cve_description.len()
    );
    println!("  - User Report: {} entries", doc.results.user_report.len());
    Ok(())
}
