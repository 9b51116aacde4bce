use std::io::Write;
use std::path::PathBuf;

use dealscope_cli::commands::{analyze, gaps};
use dealscope_core::AnalyticsSettings;
use serde_json::Value;
use tempfile::NamedTempFile;

fn write_json(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "{content}").expect("write fixture");
    file
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be JSON")
}

const OPPORTUNITIES: &str = r#"[
    {"Opportunity ID": "OPP101", "Account ID": "A1", "Account": "Acme Foods",
     "Stage": "Proposal", "Probability": "80%", "Expected Close Date": "10/06/2025",
     "Expected Value": "1.000,00"},
    {"Opportunity ID": "OPP205", "Account ID": "A1", "Account": "Acme Foods",
     "Stage": "Negotiation", "Probability": "90%", "Expected Close Date": "20/07/2025",
     "Expected Value": "2.000,00"}
]"#;

const COMMITMENTS: &str = r#"[
    {"Opportunity ID": "OPP101", "User": "Alice", "Category": "Call"},
    {"Opportunity ID": "OPP101", "User": "Bob", "Category": "Visit"}
]"#;

#[test]
fn analyze_reports_summary_over_both_inputs() {
    let opportunities = write_json(OPPORTUNITIES);
    let commitments = write_json(COMMITMENTS);

    let result = analyze::run(analyze::AnalyzeArgs {
        opportunities: Some(opportunities.path().to_path_buf()),
        commitments: Some(commitments.path().to_path_buf()),
        settings: AnalyticsSettings::default(),
        include_records: false,
    });

    assert_eq!(result.exit_code, 0, "expected successful analyze run");
    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "analyze");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["summary"]["unique_opportunities"], 2);
    assert_eq!(payload["summary"]["total_commitments"], 2);
    // OPP205 is newer than OPP101 and uncovered by both Alice and Bob.
    assert_eq!(payload["coverage_gap_count"], 2);
    assert!(payload.get("records").is_none());
}

#[test]
fn analyze_includes_records_when_requested() {
    let opportunities = write_json(OPPORTUNITIES);
    let commitments = write_json(COMMITMENTS);

    let result = analyze::run(analyze::AnalyzeArgs {
        opportunities: Some(opportunities.path().to_path_buf()),
        commitments: Some(commitments.path().to_path_buf()),
        settings: AnalyticsSettings::default(),
        include_records: true,
    });

    assert_eq!(result.exit_code, 0);
    let payload = parse_payload(&result.output);
    // OPP101 unfolds into two performer rows, OPP205 gets the sentinel row.
    assert_eq!(payload["records"].as_array().map(Vec::len), Some(3));
}

#[test]
fn analyze_fails_with_input_class_on_unreadable_file() {
    let result = analyze::run(analyze::AnalyzeArgs {
        opportunities: Some(PathBuf::from("does-not-exist.json")),
        commitments: None,
        settings: AnalyticsSettings::default(),
        include_records: false,
    });

    assert_eq!(result.exit_code, 1);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "input");
}

#[test]
fn analyze_fails_when_no_input_is_given() {
    let result = analyze::run(analyze::AnalyzeArgs {
        opportunities: None,
        commitments: None,
        settings: AnalyticsSettings::default(),
        include_records: false,
    });

    assert_eq!(result.exit_code, 2);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "no_usable_records");
}

#[test]
fn gaps_emits_the_coverage_gap_records() {
    let opportunities = write_json(OPPORTUNITIES);
    let commitments = write_json(COMMITMENTS);

    let result = gaps::run(gaps::GapsArgs {
        opportunities: Some(opportunities.path().to_path_buf()),
        commitments: Some(commitments.path().to_path_buf()),
        settings: AnalyticsSettings::default(),
    });

    assert_eq!(result.exit_code, 0, "expected successful gaps run");
    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "gaps");
    let records = payload["coverage_gaps"].as_array().expect("gap array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["opportunity_id"], "OPP205");
    assert_eq!(records[0]["anchor_id"], "OPP101");
}
