//! Integration tests for the bundled scenarios and report output

use std::path::PathBuf;
use tandem_cli::{run_scenario, ReportStatus, Scenario, ScenarioReport, TandemConfig};

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

fn run_bundled(name: &str, config: &TandemConfig) -> ScenarioReport {
    let scenario = Scenario::from_path(&scenario_path(name)).unwrap();
    run_scenario(&scenario, config)
}

#[test]
fn test_mirror_clicks_scenario_passes() {
    let report = run_bundled("mirror_clicks.json", &TandemConfig::default());
    assert!(report.is_passed(), "{report:?}");
    assert_eq!(report.scenario.as_deref(), Some("mirror_clicks"));
    assert_eq!(report.totals.captured, 2);
    assert_eq!(report.totals.dispatched, 2);
    assert_eq!(report.totals.elapsed_ms, 700);
}

#[test]
fn test_cancel_and_refresh_scenario_passes() {
    let report = run_bundled("cancel_and_refresh.json", &TandemConfig::default());
    assert!(report.is_passed(), "{report:?}");
    assert_eq!(report.totals.dispatched, 6);
}

#[test]
fn test_longer_grace_period_fails_timing_assertion() {
    let config: TandemConfig = toml::from_str("[playback]\ngrace_period_ms = 250\n").unwrap();
    let report = run_bundled("mirror_clicks.json", &config);

    assert_eq!(report.status, ReportStatus::Failed);
    assert_eq!(report.step.as_deref(), Some("assert_state"));
    assert!(report.message.unwrap().contains("Playing"));
}

#[test]
fn test_keyboard_default_mode_records_no_clicks() {
    let config: TandemConfig = toml::from_str("[capture]\npointer_mode = false\n").unwrap();
    let report = run_bundled("mirror_clicks.json", &config);

    assert_eq!(report.status, ReportStatus::Failed);
    assert_eq!(report.totals.captured, 0);
    assert!(report.message.unwrap().contains("Record has no actions"));
}

#[test]
fn test_report_written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out").join("mirror.json");

    let report = run_bundled("mirror_clicks.json", &TandemConfig::default());
    report.write_to_path(&out).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["status"], "passed");
    assert_eq!(value["scenario"], "mirror_clicks");
    assert!(value["failed_step_index"].is_null());
}
