//! On-disk layout of the leaderboard data.
//!
//! Every operation that touches well-known files takes a [`DataLayout`]
//! explicitly; nothing is derived from the process's install location.

use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = "data";
pub const SUBMISSIONS_DIR: &str = "submissions";
pub const LEADERBOARD_FILE: &str = "leaderboard.json";
pub const CVE_DATES_FILE: &str = "cve_publish_dates.json";

/// Resolved locations of the data and submissions directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub data_dir: PathBuf,
    pub submissions_dir: PathBuf,
}

impl DataLayout {
    /// `<root>/data` and `<root>/submissions`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            data_dir: root.join(DATA_DIR),
            submissions_dir: root.join(SUBMISSIONS_DIR),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_submissions_dir(mut self, submissions_dir: impl Into<PathBuf>) -> Self {
        self.submissions_dir = submissions_dir.into();
        self
    }

    pub fn leaderboard_path(&self) -> PathBuf {
        self.data_dir.join(LEADERBOARD_FILE)
    }

    pub fn cve_dates_path(&self) -> PathBuf {
        self.data_dir.join(CVE_DATES_FILE)
    }
}
