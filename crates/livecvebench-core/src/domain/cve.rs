//! CVE identifiers and the publication-date reference table.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static CVE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CVE-\d{4}-\d{4,}$").expect("invalid CVE_ID_RE pattern"));

/// `true` when `id` looks like `CVE-YYYY-NNNN` (four or more trailing digits).
pub fn is_valid_cve_id(id: &str) -> bool {
    CVE_ID_RE.is_match(id)
}

/// Year component of a CVE ID, i.e. the second dash-separated segment.
pub fn cve_year(id: &str) -> Option<&str> {
    id.split('-').nth(1)
}

/// Publication date to use when the reference table has no entry for `id`.
///
/// IDs without a year segment fall back to the whole ID, which keeps the
/// result deterministic and sorts them with the other unparseable dates.
pub fn fallback_date(id: &str) -> String {
    format!("{}-01-01", cve_year(id).unwrap_or(id))
}

/// Parse a reference date. Month and day may omit their leading zero.
pub fn parse_publish_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// One row of the reference table, also the shape of `cves` in the
/// leaderboard document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CveReference {
    pub id: String,
    #[serde(default)]
    pub date: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CveReference {
    pub fn new(id: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            extra: Map::new(),
        }
    }
}

/// Contents of `cve_publish_dates.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CveReferenceTable {
    pub cves: Vec<CveReference>,
}

impl CveReferenceTable {
    /// Exact-ID lookup map. Later duplicates win; empty dates are left out
    /// so those IDs take the fallback date.
    pub fn date_lookup(&self) -> HashMap<&str, &str> {
        self.cves
            .iter()
            .filter(|c| !c.date.is_empty())
            .map(|c| (c.id.as_str(), c.date.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cve_id_pattern() {
        assert!(is_valid_cve_id("CVE-2021-1111"));
        assert!(is_valid_cve_id("CVE-2024-123456"));
        assert!(!is_valid_cve_id("CVE-2021-111"));
        assert!(!is_valid_cve_id("cve-2021-1111"));
        assert!(!is_valid_cve_id("CVE-21-1111"));
        assert!(!is_valid_cve_id("CVE-2021-1111-extra"));
    }

    #[test]
    fn fallback_uses_year_segment() {
        assert_eq!(fallback_date("CVE-2019-9999"), "2019-01-01");
    }

    #[test]
    fn empty_dates_are_not_looked_up() {
        let table: CveReferenceTable = serde_json::from_value(serde_json::json!({
            "cves": [
                { "id": "CVE-2021-0001", "date": "" },
                { "id": "CVE-2021-0002" },
                { "id": "CVE-2021-0003", "date": "2021-05-05", "source": "nvd" }
            ]
        }))
        .unwrap();
        let lookup = table.date_lookup();
        assert_eq!(lookup.get("CVE-2021-0001"), None);
        assert_eq!(lookup.get("CVE-2021-0002"), None);
        assert_eq!(lookup.get("CVE-2021-0003"), Some(&"2021-05-05"));
        assert_eq!(table.cves[2].extra.get("source"), Some(&serde_json::json!("nvd")));
    }

    #[test]
    fn publish_date_accepts_unpadded_fields() {
        assert_eq!(
            parse_publish_date("2021-3-7"),
            NaiveDate::from_ymd_opt(2021, 3, 7)
        );
        assert_eq!(parse_publish_date("March 2021"), None);
    }
}
