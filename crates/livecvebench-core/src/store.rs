//! JSON file helpers shared by the three tools.
//!
//! Writes go through a temp file in the destination directory followed by a
//! rename, so readers never observe a half-written document.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::domain::cve::CveReferenceTable;
use crate::domain::error::{LeaderboardError, Result};
use crate::domain::leaderboard::LeaderboardDocument;
use crate::domain::snapshot::MergedSnapshot;
use crate::layout::DataLayout;

/// Indentation used when pretty-printing a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Two,
    Four,
}

impl Indent {
    fn as_bytes(self) -> &'static [u8] {
        match self {
            Indent::Two => b"  ",
            Indent::Four => b"    ",
        }
    }
}

/// Read and decode a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| LeaderboardError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| LeaderboardError::json(path, e))
}

/// Pretty-print `value` with the given indentation.
pub fn to_pretty_json<T: Serialize>(value: &T, indent: Indent) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|source| LeaderboardError::Serde {
            what: "document",
            source,
        })?;
    Ok(buf)
}

/// Atomically replace `path` with the pretty-printed `value`.
pub fn write_json<T: Serialize>(path: &Path, value: &T, indent: Indent) -> Result<()> {
    let bytes = to_pretty_json(value, indent)?;
    let mut tmp = temp_beside(path)?;
    tmp.write_all(&bytes)
        .map_err(|e| LeaderboardError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| LeaderboardError::io(path, e.error))?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote JSON document");
    Ok(())
}

/// Write `value` to `path`, failing if the file already exists.
///
/// An existing file surfaces as an `Io` error with kind `AlreadyExists`.
pub fn write_json_new<T: Serialize>(path: &Path, value: &T, indent: Indent) -> Result<()> {
    let bytes = to_pretty_json(value, indent)?;
    let mut tmp = temp_beside(path)?;
    tmp.write_all(&bytes)
        .map_err(|e| LeaderboardError::io(tmp.path(), e))?;
    tmp.persist_noclobber(path)
        .map_err(|e| LeaderboardError::io(path, e.error))?;
    debug!(path = %path.display(), bytes = bytes.len(), "created JSON document");
    Ok(())
}

fn temp_beside(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| LeaderboardError::io(dir, e))?;
    NamedTempFile::new_in(dir).map_err(|e| LeaderboardError::io(dir, e))
}

/// Load `leaderboard.json`, or an empty document if it does not exist yet.
pub fn load_leaderboard(layout: &DataLayout, today: NaiveDate) -> Result<LeaderboardDocument> {
    let path = layout.leaderboard_path();
    if !path.exists() {
        debug!(path = %path.display(), "no leaderboard yet, starting empty");
        return Ok(LeaderboardDocument::empty(today));
    }
    read_json(&path)
}

/// Stamp `lastUpdated` and write `leaderboard.json` with 4-space indentation.
pub fn save_leaderboard(
    layout: &DataLayout,
    doc: &mut LeaderboardDocument,
    today: NaiveDate,
) -> Result<()> {
    doc.touch(today);
    let path = layout.leaderboard_path();
    write_json(&path, doc, Indent::Four)?;
    info!(path = %path.display(), "saved leaderboard");
    Ok(())
}

/// Load `cve_publish_dates.json`.
pub fn load_reference_table(layout: &DataLayout) -> Result<CveReferenceTable> {
    read_json(&layout.cve_dates_path())
}

pub fn load_snapshot(path: &Path) -> Result<MergedSnapshot> {
    read_json(path)
}
