//! Shared plumbing for the LiveCVEBench command-line tools.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser};
use livecvebench_core::DataLayout;
use tracing::Level;

/// Flags every tool accepts.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Project root holding `data/` and `submissions/`
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Override the data directory (default: <root>/data)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Override the submissions directory (default: <root>/submissions)
    #[arg(long)]
    pub submissions_dir: Option<PathBuf>,
}

impl CommonArgs {
    /// Set up logging from `--verbose` / `--json`.
    pub fn init_logging(&self) {
        let level = if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        };
        livecvebench_core::init_tracing(self.json, level);
    }

    pub fn layout(&self) -> DataLayout {
        let mut layout = DataLayout::from_root(&self.root);
        if let Some(dir) = &self.data_dir {
            layout = layout.with_data_dir(dir);
        }
        if let Some(dir) = &self.submissions_dir {
            layout = layout.with_submissions_dir(dir);
        }
        layout
    }
}

/// Exit status for a failed parse: 1 for usage errors, 0 for the
/// `--help` / `--version` displays.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

/// Parse arguments, exiting with [`usage_exit_code`] on failure.
pub fn parse_or_exit<P: Parser>() -> P {
    match P::try_parse() {
        Ok(parsed) => parsed,
        Err(e) => {
            let _ = e.print();
            std::process::exit(usage_exit_code(&e));
        }
    }
}

/// Today's date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
