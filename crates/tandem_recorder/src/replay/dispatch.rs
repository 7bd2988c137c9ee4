//! Translation of recorded actions into synthetic surface input.

use crate::record::{ActionPayload, RecordedAction};
use tandem_surface::{best_effort, DispatchOutcome, Surface};

/// A synthetic input ready to be submitted to a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SyntheticInput<'a> {
    /// Click on whatever element lies under the point at dispatch time.
    Click { x: f64, y: f64 },
    /// Key press on whatever element has focus at dispatch time.
    KeyDown { key: &'a str, code: &'a str },
}

impl<'a> SyntheticInput<'a> {
    /// Synthetic equivalent of a recorded action.
    ///
    /// The original target tag is not carried over: targets are always
    /// resolved against the receiving document.
    pub fn from_action(action: &'a RecordedAction) -> Self {
        match &action.payload {
            ActionPayload::Pointer(p) => Self::Click { x: p.x, y: p.y },
            ActionPayload::Key(k) => Self::KeyDown {
                key: &k.key,
                code: &k.code,
            },
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Click { .. })
    }

    /// Submit to `target`. Adapter failures count as "no effect".
    pub fn dispatch(self, target: &mut dyn Surface) -> Option<DispatchOutcome> {
        let surface = target.id();
        match self {
            Self::Click { x, y } => best_effort(target.dispatch_pointer(x, y), surface, "click"),
            Self::KeyDown { key, code } => {
                best_effort(target.dispatch_key(key, code), surface, "keydown")
            }
        }
    }
}
