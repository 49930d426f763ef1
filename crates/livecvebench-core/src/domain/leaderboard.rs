//! The published leaderboard document.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::cve::CveReference;
use super::snapshot::SubmissionRecord;
use super::submission::{Bucket, Submission};

/// Schema version stamped into every document.
pub const LEADERBOARD_VERSION: &str = "1.0.0";

/// One row of the leaderboard; identified by `(model, agent)`.
///
/// Result values are kept as raw JSON so fields this crate does not model
/// survive a load and save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub model: String,
    pub agent: String,
    #[serde(rename = "modelType")]
    pub model_type: String,
    #[serde(rename = "agentType")]
    pub agent_type: String,
    #[serde(default)]
    pub cve_results: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LeaderboardEntry {
    pub fn is(&self, model: &str, agent: &str) -> bool {
        self.model == model && self.agent == agent
    }

    /// Project a snapshot record onto the entry shape. `instruction_type`
    /// and other top-level fields are dropped; `cve_results` is copied as is.
    ///
    /// On failure returns the first field that is not a string (or, for
    /// `cve_results`, not an object).
    pub fn from_record(record: &SubmissionRecord) -> Result<Self, &'static str> {
        let text = |field: &'static str| {
            record
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or(field)
        };
        Ok(Self {
            model: text("model")?,
            agent: text("agent")?,
            model_type: text("modelType")?,
            agent_type: text("agentType")?,
            cve_results: record
                .get("cve_results")
                .and_then(Value::as_object)
                .cloned()
                .ok_or("cve_results")?,
            extra: Map::new(),
        })
    }
}

impl From<&Submission> for LeaderboardEntry {
    /// Project a validated submission, dropping `instruction_type` and any
    /// unknown top-level fields.
    fn from(submission: &Submission) -> Self {
        Self {
            model: submission.model.clone(),
            agent: submission.agent.clone(),
            model_type: submission.model_type.as_str().to_string(),
            agent_type: submission.agent_type.as_str().to_string(),
            cve_results: submission
                .cve_results
                .iter()
                .map(|(id, result)| (id.clone(), result.to_value()))
                .collect(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
    pub version: String,
    /// Publisher-maintained keys such as `totalCVEs`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            last_updated: format_day(today),
            version: LEADERBOARD_VERSION.to_string(),
            extra: Map::new(),
        }
    }
}

/// Leaderboard entries split by instruction type.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ResultBuckets {
    pub cve_description: Vec<LeaderboardEntry>,
    pub user_report: Vec<LeaderboardEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResultBuckets {
    pub fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<LeaderboardEntry> {
        match bucket {
            Bucket::CveDescription => &mut self.cve_description,
            Bucket::UserReport => &mut self.user_report,
        }
    }
}

/// Accepts both the partitioned object and the older flat list, which is
/// read as the CVE-description bucket.
impl<'de> Deserialize<'de> for ResultBuckets {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Partitioned {
            #[serde(default)]
            cve_description: Vec<LeaderboardEntry>,
            #[serde(default)]
            user_report: Vec<LeaderboardEntry>,
            #[serde(flatten)]
            extra: Map<String, Value>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Partitioned(Partitioned),
            Flat(Vec<LeaderboardEntry>),
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Partitioned(p) => ResultBuckets {
                cve_description: p.cve_description,
                user_report: p.user_report,
                extra: p.extra,
            },
            Shape::Flat(entries) => ResultBuckets {
                cve_description: entries,
                user_report: Vec::new(),
                extra: Map::new(),
            },
        })
    }
}

/// Contents of `leaderboard.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardDocument {
    pub metadata: Metadata,
    #[serde(default)]
    pub cves: Vec<CveReference>,
    #[serde(default)]
    pub results: ResultBuckets,
    /// Top-level keys this crate does not model, kept across a save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LeaderboardDocument {
    /// The document used when no leaderboard exists yet.
    pub fn empty(today: NaiveDate) -> Self {
        Self {
            metadata: Metadata::new(today),
            cves: Vec::new(),
            results: ResultBuckets::default(),
            extra: Map::new(),
        }
    }

    pub fn touch(&mut self, today: NaiveDate) {
        self.metadata.last_updated = format_day(today);
    }
}

/// `YYYY-MM-DD`, the format of `metadata.lastUpdated`.
pub fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
