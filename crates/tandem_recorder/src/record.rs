//! Recorded action model.
//!
//! An [`ActionRecord`] is built by the recorder while armed and never
//! mutated once it is finalized. Published records are shared as
//! `Arc<ActionRecord>` so any number of players can read them at once.

use serde::{Deserialize, Serialize};
use tandem_core::Millis;

/// Kind of a recorded action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Pointer,
    Key,
}

/// Pointer click captured at viewport-relative coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerPayload {
    pub x: f64,
    pub y: f64,
    /// Tag of the element under the pointer at capture time.
    pub target_tag: Option<String>,
}

/// Key press captured on the focused element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyPayload {
    /// Logical key identity.
    pub key: String,
    /// Physical key code.
    pub code: String,
    /// Tag of the focused element at capture time.
    pub target_tag: Option<String>,
}

/// Kind-specific data of a recorded action.
///
/// A pointer action cannot carry key fields and vice versa.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionPayload {
    Pointer(PointerPayload),
    Key(KeyPayload),
}

/// One captured input event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedAction {
    /// Monotonic clock reading at capture.
    pub timestamp_millis: Millis,
    pub payload: ActionPayload,
}

impl RecordedAction {
    pub fn pointer(timestamp_millis: Millis, x: f64, y: f64, target_tag: Option<String>) -> Self {
        Self {
            timestamp_millis,
            payload: ActionPayload::Pointer(PointerPayload { x, y, target_tag }),
        }
    }

    pub fn key(
        timestamp_millis: Millis,
        key: impl Into<String>,
        code: impl Into<String>,
        target_tag: Option<String>,
    ) -> Self {
        Self {
            timestamp_millis,
            payload: ActionPayload::Key(KeyPayload {
                key: key.into(),
                code: code.into(),
                target_tag,
            }),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self.payload {
            ActionPayload::Pointer(_) => ActionKind::Pointer,
            ActionPayload::Key(_) => ActionKind::Key,
        }
    }

    /// Tag of the element the action originally landed on.
    pub fn target_tag(&self) -> Option<&str> {
        match &self.payload {
            ActionPayload::Pointer(p) => p.target_tag.as_deref(),
            ActionPayload::Key(k) => k.target_tag.as_deref(),
        }
    }

    /// Delay from `start` to this action, clamped at zero.
    pub fn offset_from(&self, start: Millis) -> Millis {
        self.timestamp_millis.saturating_sub(start)
    }
}

/// One recording session: ordered actions plus session metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    started_at_millis: Millis,
    source_identity: String,
    actions: Vec<RecordedAction>,
}

impl ActionRecord {
    /// Open an empty record.
    pub fn new(started_at_millis: Millis, source_identity: impl Into<String>) -> Self {
        Self {
            started_at_millis,
            source_identity: source_identity.into(),
            actions: Vec::new(),
        }
    }

    /// Build a record from already captured actions.
    ///
    /// Actions are stably ordered by timestamp.
    pub fn from_actions(
        started_at_millis: Millis,
        source_identity: impl Into<String>,
        mut actions: Vec<RecordedAction>,
    ) -> Self {
        actions.sort_by_key(|a| a.timestamp_millis);
        Self {
            started_at_millis,
            source_identity: source_identity.into(),
            actions,
        }
    }

    pub(crate) fn push(&mut self, action: RecordedAction) {
        self.actions.push(action);
    }

    pub fn started_at_millis(&self) -> Millis {
        self.started_at_millis
    }

    /// Identity of the surface that produced the recording.
    pub fn source_identity(&self) -> &str {
        &self.source_identity
    }

    pub fn actions(&self) -> &[RecordedAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Relative offset of every action, in capture order.
    pub fn offsets(&self) -> impl Iterator<Item = Millis> + '_ {
        self.actions
            .iter()
            .map(move |a| a.offset_from(self.started_at_millis))
    }

    /// Offset of the latest action, or zero for an empty record.
    pub fn span_millis(&self) -> Millis {
        self.offsets().max().unwrap_or(0)
    }

    /// Number of actions of the given kind.
    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind() == kind).count()
    }

    /// Serialize for diagnostics output.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ActionRecord {
        ActionRecord::from_actions(
            1_000,
            "https://example.com",
            vec![
                RecordedAction::pointer(1_000, 10.0, 20.0, Some("A".into())),
                RecordedAction::key(1_500, "a", "KeyA", Some("INPUT".into())),
                RecordedAction::pointer(2_200, 30.0, 40.0, None),
            ],
        )
    }

    #[test]
    fn test_offsets_are_relative_to_start() {
        let record = sample();
        assert_eq!(record.offsets().collect::<Vec<_>>(), vec![0, 500, 1_200]);
        assert_eq!(record.span_millis(), 1_200);
    }

    #[test]
    fn test_offset_clamps_at_zero() {
        let early = RecordedAction::pointer(900, 0.0, 0.0, None);
        assert_eq!(early.offset_from(1_000), 0);
    }

    #[test]
    fn test_kind_counts() {
        let record = sample();
        assert_eq!(record.count(ActionKind::Pointer), 2);
        assert_eq!(record.count(ActionKind::Key), 1);
        assert_eq!(record.actions()[1].target_tag(), Some("INPUT"));
    }

    #[test]
    fn test_from_actions_orders_by_timestamp() {
        let record = ActionRecord::from_actions(
            0,
            "x",
            vec![
                RecordedAction::key(300, "b", "KeyB", None),
                RecordedAction::key(100, "a", "KeyA", None),
            ],
        );
        assert_eq!(record.offsets().collect::<Vec<_>>(), vec![100, 300]);
    }

    #[test]
    fn test_empty_record() {
        let record = ActionRecord::new(5, "about:blank");
        assert!(record.is_empty());
        assert_eq!(record.span_millis(), 0);
        assert_eq!(record.source_identity(), "about:blank");
    }

    #[test]
    fn test_json_export_round_trips() {
        let record = sample();
        let json = record.to_json_pretty().unwrap();
        assert!(json.contains("\"source_identity\": \"https://example.com\""));

        let parsed: ActionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_payload_json_shape() {
        let action = RecordedAction::key(7, "Enter", "Enter", None);
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["payload"]["kind"], "key");
        assert_eq!(json["payload"]["key"], "Enter");
        assert!(json["payload"].get("x").is_none());
    }
}
