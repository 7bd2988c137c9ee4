//! Report output model for scenario runs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Report status for a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    Failed,
}

/// Counters accumulated over the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub elapsed_ticks: u64,
    pub elapsed_ms: u64,
    pub captured: usize,
    pub dispatched: usize,
    pub missed: usize,
}

/// Machine-readable result of a scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: Option<String>,
    pub status: ReportStatus,
    pub failed_step_index: Option<usize>,
    pub step: Option<String>,
    pub message: Option<String>,
    #[serde(flatten)]
    pub totals: RunTotals,
}

impl ScenarioReport {
    pub fn passed(scenario: Option<String>, totals: RunTotals) -> Self {
        Self {
            scenario,
            status: ReportStatus::Passed,
            failed_step_index: None,
            step: None,
            message: None,
            totals,
        }
    }

    pub fn failed(
        scenario: Option<String>,
        step: &str,
        failed_step_index: usize,
        message: String,
        totals: RunTotals,
    ) -> Self {
        Self {
            scenario,
            status: ReportStatus::Failed,
            failed_step_index: Some(failed_step_index),
            step: Some(step.to_string()),
            message: Some(message),
            totals,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == ReportStatus::Passed
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        std::fs::write(path, payload)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        writer.write_all(payload.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_report_json_shape() {
        let totals = RunTotals {
            elapsed_ticks: 3,
            elapsed_ms: 30,
            ..RunTotals::default()
        };
        let report = ScenarioReport::failed(None, "assert_state", 4, "boom".into(), totals);

        let mut out = Vec::new();
        report.write_to_writer(&mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["status"], "failed");
        assert_eq!(value["failed_step_index"], 4);
        assert_eq!(value["step"], "assert_state");
        assert_eq!(value["elapsed_ms"], 30);
    }

    #[test]
    fn test_write_to_path_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");
        let report = ScenarioReport::passed(Some("demo".into()), RunTotals::default());

        report.write_to_path(&path).unwrap();
        let parsed: ScenarioReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, report);
        assert!(parsed.is_passed());
    }
}
