//! Integration tests for `licensight report`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn licensight(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("licensight").unwrap();
    cmd.current_dir(temp_dir.path())
        .env("HOME", temp_dir.path())
        .env_remove("LICENSIGHT_DATA_DIR")
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .arg("--as-of")
        .arg("2024-09-30");
    cmd
}

fn seeded() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    licensight(&temp_dir).arg("seed").assert().success();
    temp_dir
}

fn report_json(temp_dir: &TempDir, kind: &str) -> serde_json::Value {
    let assert = licensight(temp_dir).args(["report", kind, "--json"]).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    serde_json::from_str(&stdout).expect("Report JSON output should be valid JSON")
}

#[test]
fn test_summary_report_json() {
    let temp_dir = seeded();
    let json = report_json(&temp_dir, "summary");
    assert!(json["report_id"].as_str().unwrap().starts_with("LSR_"));
    assert_eq!(json["total_licenses"], 6);
    assert_eq!(json["period_start"], "2023-10-01");
    assert_eq!(json["period_end"], "2024-09-30");
    assert_eq!(json["recommendations"].as_array().map(Vec::len), Some(6));
}

#[test]
fn test_ap_team_report_json() {
    let temp_dir = seeded();
    let json = report_json(&temp_dir, "ap-team");
    assert!(json["report_id"].as_str().unwrap().starts_with("APR_"));
    let renewals = json["upcoming_renewals"].as_array().unwrap();
    assert_eq!(renewals.len(), 4);
    assert_eq!(renewals[0]["days_to_expiry"], 15);
}

#[test]
fn test_procurement_report_json() {
    let temp_dir = seeded();
    let json = report_json(&temp_dir, "procurement");
    assert!(json["report_id"].as_str().unwrap().starts_with("PR_"));
    assert_eq!(json["market_benchmarks"]["total_vendors"], 6);
    assert_eq!(json["market_benchmarks"]["most_expensive_vendor"], "Salesforce");
}

#[test]
fn test_executive_report_json() {
    let temp_dir = seeded();
    let json = report_json(&temp_dir, "executive");
    assert!(json["report_id"].as_str().unwrap().starts_with("EXR_"));
    assert_eq!(json["executive_summary"]["license_count"], 6);
    assert_eq!(json["executive_summary"]["total_software_spend"], 297_300.0);
    let recommendations = json["strategic_recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations[0]["action"], "negotiate_enterprise_agreements");
    assert_eq!(recommendations[1]["action"], "regular_utilization_reviews");
}

#[test]
fn test_dashboard_json() {
    let temp_dir = seeded();
    let json = report_json(&temp_dir, "dashboard");
    assert_eq!(json["total_licenses"], 6);
    assert_eq!(json["cost_trend"].as_array().map(Vec::len), Some(30));
    assert_eq!(json["utilization_distribution"].as_array().map(Vec::len), Some(5));
}

#[test]
fn test_human_reports() {
    let temp_dir = seeded();
    licensight(&temp_dir)
        .args(["report", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("License Summary Report"))
        .stdout(predicate::str::contains("Cost by vendor"));
    licensight(&temp_dir)
        .args(["report", "ap-team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Upcoming renewals (4)"));
    licensight(&temp_dir)
        .args(["report", "procurement"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Most expensive vendor: Salesforce"));
    licensight(&temp_dir)
        .args(["report", "executive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Executive Summary Report"))
        .stdout(predicate::str::contains("Strategic recommendations"));
    licensight(&temp_dir)
        .args(["report", "dashboard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("License Dashboard"))
        .stdout(predicate::str::contains("$297,300"));
}

#[test]
fn test_empty_portfolio_reports() {
    let temp_dir = TempDir::new().unwrap();
    let json = report_json(&temp_dir, "dashboard");
    assert_eq!(json["total_licenses"], 0);
    assert_eq!(json["recommendations"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_unknown_report_kind() {
    let temp_dir = TempDir::new().unwrap();
    licensight(&temp_dir)
        .args(["report", "weekly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
