use std::fs;
use std::path::Path;

use chrono::Local;
use livecvebench_core::{
    discover_submission_files, merge_directory, next_snapshot_version, LeaderboardError,
    MergedSnapshot,
};
use serde_json::{json, Value};

fn write(path: &Path, value: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn submission(model: &str, instruction_type: Option<&str>, cves: &[&str]) -> Value {
    let mut results = serde_json::Map::new();
    for id in cves {
        results.insert(
            id.to_string(),
            json!({ "success": true, "turns": 1, "tokens": 10 }),
        );
    }
    let mut v = json!({
        "model": model,
        "agent": "OpenHands",
        "modelType": "closed",
        "agentType": "open",
        "cve_results": results
    });
    if let Some(t) = instruction_type {
        v["instruction_type"] = json!(t);
    }
    v
}

#[test]
fn discovery_is_recursive_and_skips_dotfiles() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("a.json"), &json!({}));
    write(&root.join("team/b.json"), &json!({}));
    write(&root.join(".hidden.json"), &json!({}));
    fs::write(root.join("README.md"), "docs").unwrap();

    let files = discover_submission_files(root).unwrap();
    let rel: Vec<String> = files
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    assert_eq!(rel, vec!["a.json", "team/b.json"]);
}

#[test]
fn merge_concatenates_without_dedup() {
    let dir = tempfile::tempdir().unwrap();
    let subs = dir.path().join("submissions");
    let data = dir.path().join("data");

    write(
        &subs.join("one.json"),
        &submission("GPT-4o", None, &["CVE-2021-1111", "CVE-2021-2222"]),
    );
    write(
        &subs.join("nested/two.json"),
        &submission("GPT-4o", Some("user_report"), &["CVE-2021-2222"]),
    );
    write(
        &subs.join("three.json"),
        &submission("Claude", Some("cve_description"), &["CVE-2022-3333"]),
    );
    fs::write(subs.join("broken.json"), "{ nope").unwrap();
    write(&subs.join("partial.json"), &json!({ "model": "X" }));

    let report = merge_directory(&subs, &data, Local::now()).unwrap();

    assert_eq!(report.files_found, 5);
    assert_eq!(report.loaded, 3);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.unique_cves, 3);
    assert_eq!(report.version, 1);
    assert_eq!(report.by_instruction_type.get("unknown"), Some(&1));
    assert_eq!(report.by_instruction_type.get("user_report"), Some(&1));
    assert_eq!(report.by_instruction_type.get("cve_description"), Some(&1));

    let partial = report
        .skipped
        .iter()
        .find(|s| s.path.ends_with("partial.json"))
        .unwrap();
    assert!(partial.reason.contains("Missing required field: agent"));

    let snapshot: MergedSnapshot =
        serde_json::from_str(&fs::read_to_string(&report.output_path).unwrap()).unwrap();
    assert_eq!(snapshot.total_combinations, 3);
    assert_eq!(snapshot.total_cves, 3);
    let gpt_rows = snapshot
        .results
        .iter()
        .filter(|s| s["model"] == "GPT-4o")
        .count();
    assert_eq!(gpt_rows, 2);
}

#[test]
fn snapshot_keeps_submission_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let subs = dir.path().join("submissions");
    let data = dir.path().join("data");
    let mut raw = submission("GPT-4o", None, &["CVE-2021-1111"]);
    raw["notes"] = json!({ "harness": "v2" });
    write(&subs.join("one.json"), &raw);

    let report = merge_directory(&subs, &data, Local::now()).unwrap();
    let written: Value =
        serde_json::from_str(&fs::read_to_string(&report.output_path).unwrap()).unwrap();
    assert_eq!(written["results"][0], raw);
}

#[test]
fn loose_values_are_loaded_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let subs = dir.path().join("submissions");
    let data = dir.path().join("data");

    let mut nulls = submission("GPT-4o", None, &["CVE-2021-1111"]);
    nulls["cve_results"]["CVE-2021-1111"]["turns"] = Value::Null;
    let mut timed = submission("Claude", None, &["CVE-2021-2222"]);
    timed["cve_results"]["CVE-2021-2222"]["duration_s"] = json!(41.5);
    write(&subs.join("a.json"), &nulls);
    write(&subs.join("b.json"), &timed);

    let report = merge_directory(&subs, &data, Local::now()).unwrap();
    assert_eq!(report.loaded, 2);
    assert!(report.skipped.is_empty());

    let written: Value =
        serde_json::from_str(&fs::read_to_string(&report.output_path).unwrap()).unwrap();
    assert_eq!(written["results"][0], nulls);
    assert_eq!(written["results"][1], timed);
}

#[test]
fn skip_reasons_name_the_problem() {
    let dir = tempfile::tempdir().unwrap();
    let subs = dir.path().join("submissions");
    write(&subs.join("good.json"), &submission("M", None, &["CVE-2021-1111"]));
    write(&subs.join("partial.json"), &json!({ "model": "M", "agent": "A" }));
    fs::write(subs.join("broken.json"), "{").unwrap();

    let report = merge_directory(&subs, &dir.path().join("data"), Local::now()).unwrap();
    let reason = |name: &str| {
        report
            .skipped
            .iter()
            .find(|s| s.path.ends_with(name))
            .map(|s| s.reason.clone())
            .unwrap()
    };
    assert!(reason("broken.json").starts_with("invalid JSON in"));
    let partial = reason("partial.json");
    assert!(!partial.contains("invalid JSON"), "{partial}");
    assert!(partial.contains("Missing required field: modelType"));
}

#[test]
fn next_version_after_gap() {
    let dir = tempfile::tempdir().unwrap();
    let subs = dir.path().join("submissions");
    let data = dir.path().join("data");
    write(&subs.join("one.json"), &submission("M", None, &["CVE-2021-1111"]));
    write(&data.join("merged_results_v1.json"), &json!({}));
    write(&data.join("merged_results_v3.json"), &json!({}));

    assert_eq!(next_snapshot_version(&data).unwrap(), 4);
    let report = merge_directory(&subs, &data, Local::now()).unwrap();
    assert_eq!(report.version, 4);
    assert!(data.join("merged_results_v4.json").is_file());
}

#[test]
fn missing_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = merge_directory(
        &dir.path().join("nowhere"),
        &dir.path().join("data"),
        Local::now(),
    )
    .unwrap_err();
    assert!(matches!(err, LeaderboardError::DirectoryNotFound(_)));
}

#[test]
fn directory_without_json_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let subs = dir.path().join("submissions");
    fs::create_dir_all(&subs).unwrap();
    fs::write(subs.join("notes.txt"), "nothing here").unwrap();
    let err = merge_directory(&subs, &dir.path().join("data"), Local::now()).unwrap_err();
    assert!(matches!(err, LeaderboardError::NoJsonFiles(_)));
}

#[test]
fn unusable_files_still_produce_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let subs = dir.path().join("submissions");
    let data = dir.path().join("data");
    fs::create_dir_all(&subs).unwrap();
    fs::write(subs.join("broken.json"), "[").unwrap();

    let report = merge_directory(&subs, &data, Local::now()).unwrap();
    assert_eq!(report.loaded, 0);
    assert_eq!(report.skipped.len(), 1);
    let snapshot: MergedSnapshot =
        serde_json::from_str(&fs::read_to_string(&report.output_path).unwrap()).unwrap();
    assert!(snapshot.results.is_empty());
}
