//! Normalized input notifications
//!
//! Surfaces translate their native click and key-down events into
//! [`RawInput`] before handing them to a recorder. Anything the recorder
//! cannot use is rejected by [`RawInput::is_well_formed`] and dropped.

use serde::{Deserialize, Serialize};

/// Which family of input a notification belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Click-like pointer input.
    Pointer,
    /// Key-down-like keyboard input.
    Key,
}

/// One input notification observed on a surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawInput {
    /// Click at viewport-relative coordinates.
    Pointer {
        x: f64,
        y: f64,
        /// Tag or role of the element under the pointer.
        #[serde(default)]
        target_tag: Option<String>,
    },
    /// Key pressed while some element had focus.
    Key {
        /// Logical key identity (for example `"a"` or `"Enter"`).
        key: String,
        /// Physical key code (for example `"KeyA"`).
        #[serde(default)]
        code: String,
        /// Tag or role of the focused element.
        #[serde(default)]
        target_tag: Option<String>,
    },
}

impl RawInput {
    /// Pointer notification without a known target.
    pub fn pointer(x: f64, y: f64) -> Self {
        Self::Pointer {
            x,
            y,
            target_tag: None,
        }
    }

    /// Key notification without a known target.
    pub fn key(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Key {
            key: key.into(),
            code: code.into(),
            target_tag: None,
        }
    }

    /// Attach the tag of the element the input landed on.
    pub fn with_target(mut self, tag: impl Into<String>) -> Self {
        match &mut self {
            Self::Pointer { target_tag, .. } | Self::Key { target_tag, .. } => {
                *target_tag = Some(tag.into());
            }
        }
        self
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Self::Pointer { .. } => InputKind::Pointer,
            Self::Key { .. } => InputKind::Key,
        }
    }

    pub fn target_tag(&self) -> Option<&str> {
        match self {
            Self::Pointer { target_tag, .. } | Self::Key { target_tag, .. } => {
                target_tag.as_deref()
            }
        }
    }

    /// Whether the notification carries enough to be replayed.
    ///
    /// Pointer input needs finite coordinates; key input needs a non-empty
    /// logical key. The physical code may be empty.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Self::Pointer { x, y, .. } => x.is_finite() && y.is_finite(),
            Self::Key { key, .. } => !key.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_target() {
        let click = RawInput::pointer(10.0, 20.0).with_target("BUTTON");
        assert_eq!(click.kind(), InputKind::Pointer);
        assert_eq!(click.target_tag(), Some("BUTTON"));

        let key = RawInput::key("a", "KeyA");
        assert_eq!(key.kind(), InputKind::Key);
        assert_eq!(key.target_tag(), None);
    }

    #[test]
    fn test_well_formedness() {
        assert!(RawInput::pointer(0.0, -4.0).is_well_formed());
        assert!(!RawInput::pointer(f64::NAN, 1.0).is_well_formed());
        assert!(!RawInput::pointer(1.0, f64::INFINITY).is_well_formed());

        assert!(RawInput::key("Enter", "").is_well_formed());
        assert!(!RawInput::key("", "KeyA").is_well_formed());
    }

    #[test]
    fn test_deserialize_tagged_input() {
        let click: RawInput =
            serde_json::from_str(r#"{"kind":"pointer","x":3.0,"y":4.0}"#).unwrap();
        assert_eq!(click, RawInput::pointer(3.0, 4.0));

        let key: RawInput =
            serde_json::from_str(r#"{"kind":"key","key":"b","target_tag":"INPUT"}"#).unwrap();
        assert_eq!(key, RawInput::key("b", "").with_target("INPUT"));
    }
}
