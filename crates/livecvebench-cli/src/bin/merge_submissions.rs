//! Merge every submission file under a directory into the next
//! `merged_results_v<N>.json` snapshot.
//!
//! ```text
//! merge-submissions ../submissions
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use livecvebench_cli::{parse_or_exit, CommonArgs};
use livecvebench_core::merge_directory;

#[derive(Parser, Debug)]
#[command(name = "merge-submissions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Concatenate submission files into a versioned merged_results snapshot")]
struct Cli {
    /// Directory searched recursively for submission JSON files
    submissions_dir: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let cli: Cli = parse_or_exit();
    cli.common.init_logging();

    let layout = cli.common.layout();
    let report = merge_directory(&cli.submissions_dir, &layout.data_dir, Local::now())
        .with_context(|| format!("merging {}", cli.submissions_dir.display()))?;

    println!(
        "Found {} JSON files in {}\n",
        report.files_found,
        cli.submissions_dir.display()
    );
    for skipped in &report.skipped {
        println!("  Skipped {}: {}", skipped.path.display(), skipped.reason);
    }

    println!("\nSuccessfully loaded: {} submissions", report.loaded);
    println!("Total unique CVEs: {}", report.unique_cves);

    println!("\nBy instruction_type:");
    for (instruction_type, count) in &report.by_instruction_type {
        println!("  - {instruction_type}: {count}");
    }

    println!("\nGenerated: {}", report.output_path.display());
    println!("\nNext step: convert-results");
    Ok(())
}
