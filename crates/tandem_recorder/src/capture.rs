//! Input capture.
//!
//! The [`Recorder`] turns raw surface notifications into an
//! [`ActionRecord`] while armed. It has no fallible operations: anything it
//! cannot use is dropped and the session carries on.

use crate::record::{ActionRecord, RecordedAction};
use tandem_core::{InputKind, Millis, RawInput};

/// Which kind of input a session captures and replays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputMode {
    /// Capture pointer clicks.
    #[default]
    Pointer,
    /// Capture key presses.
    Keyboard,
}

impl InputMode {
    pub fn from_pointer_flag(pointer_mode: bool) -> Self {
        if pointer_mode {
            Self::Pointer
        } else {
            Self::Keyboard
        }
    }

    pub fn is_pointer(self) -> bool {
        self == Self::Pointer
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Pointer => Self::Keyboard,
            Self::Keyboard => Self::Pointer,
        }
    }

    /// Whether input of `kind` is captured in this mode.
    pub fn accepts(self, kind: InputKind) -> bool {
        matches!(
            (self, kind),
            (Self::Pointer, InputKind::Pointer) | (Self::Keyboard, InputKind::Key)
        )
    }
}

/// Builds one action record per armed period.
#[derive(Debug, Default)]
pub struct Recorder {
    open: Option<ActionRecord>,
    /// Notifications dropped in the current armed period.
    dropped: usize,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a brand-new empty record. Any record still open is discarded.
    pub fn arm(&mut self, now: Millis, source_identity: impl Into<String>) {
        if let Some(previous) = self.open.take() {
            tracing::debug!(
                actions = previous.len(),
                "discarding unfinished record on re-arm"
            );
        }
        self.open = Some(ActionRecord::new(now, source_identity));
        self.dropped = 0;
    }

    /// Stop capturing and hand over the finished record.
    ///
    /// Returns `None` when the recorder was not armed.
    pub fn disarm(&mut self) -> Option<ActionRecord> {
        let record = self.open.take()?;
        tracing::debug!(
            actions = record.len(),
            dropped = self.dropped,
            "recorder disarmed"
        );
        Some(record)
    }

    pub fn is_armed(&self) -> bool {
        self.open.is_some()
    }

    /// Number of actions captured so far in the open record.
    pub fn captured(&self) -> usize {
        self.open.as_ref().map_or(0, ActionRecord::len)
    }

    /// Notifications ignored since the last `arm`.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Feed one raw notification. Returns whether an action was appended.
    ///
    /// `mode` is read per call, so switching modes mid-session only affects
    /// later notifications. Input of the other kind, malformed input, and
    /// input arriving while disarmed are dropped.
    pub fn on_raw_input(&mut self, input: RawInput, mode: InputMode, now: Millis) -> bool {
        let Some(record) = self.open.as_mut() else {
            return false;
        };

        if !input.is_well_formed() || !mode.accepts(input.kind()) {
            self.dropped += 1;
            tracing::trace!(?input, ?mode, "dropped raw input");
            return false;
        }

        let timestamp = now.max(record.started_at_millis());
        let action = match input {
            RawInput::Pointer { x, y, target_tag } => {
                RecordedAction::pointer(timestamp, x, y, target_tag)
            }
            RawInput::Key {
                key,
                code,
                target_tag,
            } => RecordedAction::key(timestamp, key, code, target_tag),
        };
        record.push(action);
        true
    }
}
