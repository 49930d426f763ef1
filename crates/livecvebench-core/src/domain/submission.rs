//! Submission records: one model + agent's results across CVEs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Top-level fields every submission must carry.
pub const REQUIRED_FIELDS: &[&str] = &["model", "agent", "modelType", "agentType", "cve_results"];

/// `instruction_type` value that routes a submission to the user-report bucket.
pub const USER_REPORT_INSTRUCTION: &str = "user_report";

/// Whether a model or agent is openly available.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    Open,
    Closed,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::Open => "open",
            AccessType::Closed => "closed",
        }
    }

    /// Parse the wire value; anything other than `open`/`closed` is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(AccessType::Open),
            "closed" => Some(AccessType::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one agent run against one CVE.
///
/// `turns` and `tokens` keep the submitted JSON number so integer inputs
/// are written back as integers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CveResult {
    pub success: bool,
    pub turns: Number,
    pub tokens: Number,
    /// Extra per-run fields (timings, notes), carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CveResult {
    pub fn new(success: bool, turns: u64, tokens: u64) -> Self {
        Self {
            success,
            turns: Number::from(turns),
            tokens: Number::from(tokens),
            extra: Map::new(),
        }
    }

    /// The result as it is stored in a leaderboard entry.
    pub fn to_value(&self) -> Value {
        let mut obj = self.extra.clone();
        obj.insert("success".to_string(), Value::Bool(self.success));
        obj.insert("turns".to_string(), Value::Number(self.turns.clone()));
        obj.insert("tokens".to_string(), Value::Number(self.tokens.clone()));
        Value::Object(obj)
    }
}

/// Results keyed by CVE ID.
pub type CveResults = BTreeMap<String, CveResult>;

/// Leaderboard partition a submission belongs to.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    CveDescription,
    UserReport,
}

impl Bucket {
    /// `user_report` selects the user-report bucket; every other value,
    /// including an absent one, selects the CVE-description bucket.
    pub fn for_instruction(instruction_type: Option<&str>) -> Self {
        match instruction_type {
            Some(USER_REPORT_INSTRUCTION) => Bucket::UserReport,
            _ => Bucket::CveDescription,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::CveDescription => "cve_description",
            Bucket::UserReport => "user_report",
        }
    }
}

/// A contributor-supplied submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub model: String,
    pub agent: String,
    #[serde(rename = "modelType")]
    pub model_type: AccessType,
    #[serde(rename = "agentType")]
    pub agent_type: AccessType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_type: Option<String>,
    pub cve_results: CveResults,
    /// Fields outside the known schema, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Submission {
    pub fn new(
        model: impl Into<String>,
        agent: impl Into<String>,
        model_type: AccessType,
        agent_type: AccessType,
    ) -> Self {
        Self {
            model: model.into(),
            agent: agent.into(),
            model_type,
            agent_type,
            instruction_type: None,
            cve_results: CveResults::new(),
            extra: Map::new(),
        }
    }

    pub fn with_instruction_type(mut self, instruction_type: impl Into<String>) -> Self {
        self.instruction_type = Some(instruction_type.into());
        self
    }

    pub fn with_result(mut self, cve_id: impl Into<String>, result: CveResult) -> Self {
        self.cve_results.insert(cve_id.into(), result);
        self
    }

    pub fn bucket(&self) -> Bucket {
        Bucket::for_instruction(self.instruction_type.as_deref())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_counts_stay_integers() {
        let result: CveResult =
            serde_json::from_value(json!({ "success": true, "turns": 3, "tokens": 1200 })).unwrap();
        let back = serde_json::to_value(&result).unwrap();
        assert_eq!(back, json!({ "success": true, "turns": 3, "tokens": 1200 }));
    }

    #[test]
    fn result_extras_survive() {
        let raw = json!({ "success": true, "turns": 3, "tokens": 5, "duration_s": 41.5 });
        let result: CveResult = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(result.extra.get("duration_s"), Some(&json!(41.5)));
        assert_eq!(result.to_value(), raw);
        assert_eq!(serde_json::to_value(&result).unwrap(), raw);
    }

    #[test]
    fn unknown_fields_survive() {
        let raw = json!({
            "model": "GPT-4o",
            "agent": "OpenHands",
            "modelType": "closed",
            "agentType": "open",
            "cve_results": {},
            "submitted_by": "someone"
        });
        let submission: Submission = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(submission.extra.get("submitted_by"), Some(&json!("someone")));
        assert_eq!(serde_json::to_value(&submission).unwrap(), raw);
    }

    #[test]
    fn bucket_selection() {
        assert_eq!(Bucket::for_instruction(Some("user_report")), Bucket::UserReport);
        assert_eq!(
            Bucket::for_instruction(Some("cve_description")),
            Bucket::CveDescription
        );
        assert_eq!(Bucket::for_instruction(Some("other")), Bucket::CveDescription);
        assert_eq!(Bucket::for_instruction(None), Bucket::CveDescription);
    }

    #[test]
    fn access_type_rejects_other_values() {
        assert_eq!(AccessType::parse("open"), Some(AccessType::Open));
        assert_eq!(AccessType::parse("Closed"), None);
        assert!(serde_json::from_value::<AccessType>(json!("proprietary")).is_err());
    }
}
