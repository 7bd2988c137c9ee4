//! Engine configuration
//!
//! Every table is optional; missing fields fall back to the documented
//! defaults (100 ms playback grace period, pointer capture).

use crate::replay::PLAYBACK_GRACE_MS;
use serde::{Deserialize, Serialize};
use tandem_core::Millis;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// Playback tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Delay after the last dispatch before playback counts as finished
    #[serde(default = "default_grace_period")]
    pub grace_period_ms: Millis,
}

fn default_grace_period() -> Millis {
    PLAYBACK_GRACE_MS
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: default_grace_period(),
        }
    }
}

/// Capture defaults for new sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CaptureConfig {
    /// Start sessions in pointer mode (`false` starts in keyboard mode)
    #[serde(default = "default_true")]
    pub pointer_mode: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { pointer_mode: true }
    }
}
