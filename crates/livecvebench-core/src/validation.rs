//! Schema validation for raw submission payloads.
//!
//! Validation runs on untyped JSON so that malformed input produces a list
//! of findings instead of a decode failure. Checks run in this order:
//!
//! 1. All of [`REQUIRED_FIELDS`] are present. Missing fields short-circuit;
//!    nothing else is checked.
//! 2. `model`/`agent` are strings; `modelType`/`agentType` are `open` or
//!    `closed`.
//! 3. `cve_results` is a non-empty object.
//! 4. Each entry has a well-formed CVE ID and a result object carrying
//!    `success` (bool), `turns` and `tokens` (non-negative numbers).

use serde_json::Value;

use crate::domain::cve::is_valid_cve_id;
use crate::domain::error::{LeaderboardError, Result, SubmissionError};
use crate::domain::submission::{AccessType, Submission, REQUIRED_FIELDS};

/// Collect every structural problem in `raw`. An empty list means valid.
pub fn validate_submission(raw: &Value) -> Vec<SubmissionError> {
    let mut errors = Vec::new();

    let Some(obj) = raw.as_object() else {
        return REQUIRED_FIELDS
            .iter()
            .map(|&field| SubmissionError::MissingField { field })
            .collect();
    };

    for &field in REQUIRED_FIELDS {
        if !obj.contains_key(field) {
            errors.push(SubmissionError::MissingField { field });
        }
    }
    if !errors.is_empty() {
        return errors;
    }

    for field in ["model", "agent"] {
        if !obj[field].is_string() {
            errors.push(SubmissionError::NotAString { field });
        }
    }

    for field in ["modelType", "agentType"] {
        let value = &obj[field];
        if value.as_str().and_then(AccessType::parse).is_none() {
            errors.push(SubmissionError::InvalidAccessType {
                field,
                value: display_value(value),
            });
        }
    }

    let Some(cve_results) = obj["cve_results"].as_object() else {
        errors.push(SubmissionError::ResultsNotAnObject);
        return errors;
    };

    if cve_results.is_empty() {
        errors.push(SubmissionError::EmptyResults);
    }

    for (cve_id, result) in cve_results {
        if !is_valid_cve_id(cve_id) {
            errors.push(SubmissionError::InvalidCveId {
                cve_id: cve_id.clone(),
            });
            continue;
        }

        let Some(result) = result.as_object() else {
            errors.push(SubmissionError::ResultNotAnObject {
                cve_id: cve_id.clone(),
            });
            continue;
        };

        match result.get("success") {
            None => errors.push(SubmissionError::MissingResultField {
                cve_id: cve_id.clone(),
                field: "success",
            }),
            Some(v) if !v.is_boolean() => errors.push(SubmissionError::SuccessNotBoolean {
                cve_id: cve_id.clone(),
            }),
            Some(_) => {}
        }

        for field in ["turns", "tokens"] {
            match result.get(field) {
                None => errors.push(SubmissionError::MissingResultField {
                    cve_id: cve_id.clone(),
                    field,
                }),
                Some(v) if !is_non_negative_number(v) => {
                    errors.push(SubmissionError::NegativeOrNonNumeric {
                        cve_id: cve_id.clone(),
                        field,
                    })
                }
                Some(_) => {}
            }
        }
    }

    errors
}

/// Validate `raw` and convert it into a typed [`Submission`].
///
/// # Errors
///
/// - `LeaderboardError::InvalidSubmission` with every finding when
///   validation fails.
/// - `LeaderboardError::Serde` when an optional field such as
///   `instruction_type` has the wrong type.
pub fn parse_submission(raw: Value) -> Result<Submission> {
    let errors = validate_submission(&raw);
    if !errors.is_empty() {
        return Err(LeaderboardError::InvalidSubmission(errors));
    }
    serde_json::from_value(raw).map_err(|source| LeaderboardError::Serde {
        what: "validated submission",
        source,
    })
}

fn is_non_negative_number(v: &Value) -> bool {
    v.as_f64().map(|n| n >= 0.0).unwrap_or(false)
}

/// Strings print bare, everything else as compact JSON.
fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
