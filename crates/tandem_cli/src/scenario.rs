//! Scenario definition for headless recording and playback runs.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tandem_recorder::SessionState;
use tandem_surface::HeadlessElement;

/// Sequence of steps executed against a hub of headless surfaces.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// One scenario step. Surfaces are referred to by numeric id.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Register a surface. It starts loading until a `load` step.
    AddSurface {
        id: u64,
        identity: String,
        #[serde(default)]
        elements: Vec<HeadlessElement>,
        /// Loaded documents refuse instrumentation (cross-origin).
        #[serde(default)]
        inaccessible: bool,
    },
    Load {
        surface: u64,
    },
    FailLoad {
        surface: u64,
        reason: String,
    },
    SetController {
        surface: u64,
    },
    StartRecording,
    /// Publish the controller's record, optionally exporting it as JSON.
    StopRecording {
        #[serde(default)]
        export: Option<PathBuf>,
    },
    /// Simulated user click inside a surface.
    Pointer {
        surface: u64,
        x: f64,
        y: f64,
    },
    /// Simulated user key press, optionally focusing an element first.
    Key {
        surface: u64,
        key: String,
        code: String,
        #[serde(default)]
        focus: Option<String>,
    },
    ToggleMode {
        surface: u64,
    },
    Play {
        surface: u64,
        /// The request must be refused.
        #[serde(default)]
        expect_rejected: bool,
    },
    PlayAll,
    Cancel {
        surface: u64,
    },
    Refresh {
        surface: u64,
    },
    Wait {
        ms: u64,
    },
    AssertState {
        surface: u64,
        #[serde(default)]
        state: Option<ExpectedState>,
        #[serde(default)]
        pointer_mode: Option<bool>,
        #[serde(default)]
        controller: Option<bool>,
    },
    AssertDispatched {
        surface: u64,
        count: usize,
        /// Resolved target tags, in dispatch order.
        #[serde(default)]
        targets: Option<Vec<String>>,
    },
}

impl ScenarioStep {
    /// Step name as written in scenario files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddSurface { .. } => "add_surface",
            Self::Load { .. } => "load",
            Self::FailLoad { .. } => "fail_load",
            Self::SetController { .. } => "set_controller",
            Self::StartRecording => "start_recording",
            Self::StopRecording { .. } => "stop_recording",
            Self::Pointer { .. } => "pointer",
            Self::Key { .. } => "key",
            Self::ToggleMode { .. } => "toggle_mode",
            Self::Play { .. } => "play",
            Self::PlayAll => "play_all",
            Self::Cancel { .. } => "cancel",
            Self::Refresh { .. } => "refresh",
            Self::Wait { .. } => "wait",
            Self::AssertState { .. } => "assert_state",
            Self::AssertDispatched { .. } => "assert_dispatched",
        }
    }
}

/// Session state as written in scenario files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedState {
    Idle,
    Recording,
    Playing,
}

impl From<ExpectedState> for SessionState {
    fn from(state: ExpectedState) -> Self {
        match state {
            ExpectedState::Idle => SessionState::Idle,
            ExpectedState::Recording => SessionState::Recording,
            ExpectedState::Playing => SessionState::Playing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        let scenario = Scenario::from_json(
            r#"{
                "name": "smoke",
                "steps": [
                    { "type": "add_surface", "id": 1, "identity": "https://a.example",
                      "elements": [{ "tag": "BUTTON", "bounds": { "x": 0, "y": 0, "width": 10, "height": 10 } }] },
                    { "type": "start_recording" },
                    { "type": "key", "surface": 1, "key": "a", "code": "KeyA" },
                    { "type": "play", "surface": 2, "expect_rejected": true },
                    { "type": "assert_state", "surface": 1, "state": "recording" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(scenario.name.as_deref(), Some("smoke"));
        assert_eq!(scenario.steps.len(), 5);
        let names: Vec<_> = scenario.steps.iter().map(ScenarioStep::name).collect();
        assert_eq!(
            names,
            vec!["add_surface", "start_recording", "key", "play", "assert_state"]
        );
        match &scenario.steps[0] {
            ScenarioStep::AddSurface {
                elements,
                inaccessible,
                ..
            } => {
                assert_eq!(elements[0].tag, "BUTTON");
                assert!(!inaccessible);
            }
            other => panic!("unexpected step {other:?}"),
        }
        assert!(matches!(
            scenario.steps[4],
            ScenarioStep::AssertState {
                state: Some(ExpectedState::Recording),
                pointer_mode: None,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_step_rejected() {
        let err = Scenario::from_json(r#"{ "steps": [{ "type": "teleport" }] }"#);
        assert!(err.is_err());
    }
}
