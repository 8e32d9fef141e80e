// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests for the reedcore CLI.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

const EMPLOYEES: &str = r#"
name = "employees"

[[columns]]
name = "id"
type = "int(4)"

[[columns]]
name = "name"
type = "char(20)"

[[columns]]
name = "cakeday"
type = "date"

[[columns]]
name = "in_assessment"
type = "bool"

[[columns]]
name = "salary"
type = "double"
"#;

const CHAIN3_QUERY: &str = r#"
database = "test"
relations = ["T0", "T1", "T2"]
joins = [["T0", "T1"], ["T1", "T2"]]
"#;

const CHAIN3_CARDINALITIES: &str = r#"
{
  "test": [
    { "relations": ["T0"], "size": 5 },
    { "relations": ["T1"], "size": 20 },
    { "relations": ["T2"], "size": 8 },
    { "relations": ["T0", "T1"], "size": 90 },
    { "relations": ["T1", "T2"], "size": 4 },
    { "relations": ["T0", "T1", "T2"], "size": 7 }
  ]
}
"#;

fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn reedcore() -> Command {
    Command::cargo_bin("reedcore").unwrap()
}

#[test]
fn test_layout_optimized_row_report() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(&dir, "employees.toml", EMPLOYEES);

    reedcore()
        .args(["layout", schema.to_str().unwrap(), "--layout", "row_optimized"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stride 320 bits"))
        .stdout(predicate::str::contains("salary"))
        .stdout(predicate::str::contains("<null bitmap>"));
}

#[test]
fn test_layout_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(&dir, "employees.toml", EMPLOYEES);

    let output = reedcore()
        .args([
            "layout",
            schema.to_str().unwrap(),
            "--layout",
            "pax4k",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["table"], "employees");
    assert_eq!(report["layout"], "pax4k");
    assert_eq!(report["stride_in_bits"], 32768);
    assert_eq!(report["num_tuples"], 111);
    assert_eq!(report["leaves"].as_array().unwrap().len(), 6);
}

#[test]
fn test_layout_rejects_unknown_factory() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(&dir, "employees.toml", EMPLOYEES);

    reedcore()
        .args(["layout", schema.to_str().unwrap(), "--layout", "row_fancy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown layout: row_fancy"));
}

#[test]
fn test_layout_rejects_bad_schema() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(&dir, "broken.toml", "name = \"t\"\n");

    reedcore()
        .args(["layout", schema.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no columns"));
}

#[test]
fn test_plan_chain3() {
    let dir = tempfile::tempdir().unwrap();
    let query = write(&dir, "query.toml", CHAIN3_QUERY);
    let cards = write(&dir, "cardinalities.json", CHAIN3_CARDINALITIES);

    reedcore()
        .args([
            "plan",
            query.to_str().unwrap(),
            cards.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("plan: (T0 ⨝ (T1 ⨝ T2))"))
        .stdout(predicate::str::contains("cost: 11"))
        .stdout(predicate::str::contains("110 {T1,T2}: cardinality 4"));
}

#[test]
fn test_plan_json() {
    let dir = tempfile::tempdir().unwrap();
    let query = write(&dir, "query.toml", CHAIN3_QUERY);
    let cards = write(&dir, "cardinalities.json", CHAIN3_CARDINALITIES);

    let output = reedcore()
        .args([
            "plan",
            query.to_str().unwrap(),
            cards.to_str().unwrap(),
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["cost"], 11);
    assert_eq!(report["cardinality"], 7);
    assert_eq!(report["plan"], "(T0 ⨝ (T1 ⨝ T2))");
    // 3 scans + 3 priced joins; the disconnected pair T0,T2 gets none.
    let entries = report["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[0]["subproblem"], "001");
    assert_eq!(entries[5]["subproblem"], "111");
}

#[test]
fn test_plan_rejects_disconnected_graph() {
    let dir = tempfile::tempdir().unwrap();
    let query = write(
        &dir,
        "query.toml",
        r#"
database = "test"
relations = ["T0", "T1"]
joins = []
"#,
    );
    let cards = write(
        &dir,
        "cardinalities.json",
        r#"{ "test": [ { "relations": ["T0"], "size": 1 }, { "relations": ["T1"], "size": 2 } ] }"#,
    );

    reedcore()
        .args(["plan", query.to_str().unwrap(), cards.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not connected"));
}

#[test]
fn test_plan_rejects_unknown_relation_in_join() {
    let dir = tempfile::tempdir().unwrap();
    let query = write(
        &dir,
        "query.toml",
        r#"
database = "test"
relations = ["T0", "T1"]
joins = [["T0", "T9"]]
"#,
    );
    let cards = write(&dir, "cardinalities.json", r#"{ "test": [] }"#);

    reedcore()
        .args(["plan", query.to_str().unwrap(), cards.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown relation: T9"));
}
