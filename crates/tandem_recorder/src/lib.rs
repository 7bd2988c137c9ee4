//! Tandem action recording and synchronized playback.
//!
//! One surface is designated controller. Input performed in it is captured
//! into an [`ActionRecord`]; once recording stops the record is published
//! and every follower surface can replay it with the original relative
//! timing.
//!
//! This crate provides:
//! - [`ActionRecord`] / [`RecordedAction`] - the captured session model
//! - [`Recorder`] - turns raw surface input into an action record while armed
//! - [`Player`] - schedules and dispatches a record against a target surface
//! - [`ControllerSession`] - per-surface `Idle`/`Recording`/`Playing` state machine
//! - [`SyncHub`] - owns the surfaces, the controller flag, and the published record
//!
//! # Example
//!
//! ```ignore
//! use tandem_recorder::{SyncConfig, SyncHub};
//!
//! let mut hub = SyncHub::new(SyncConfig::default());
//! hub.add_surface(controller_surface)?;
//! hub.add_surface(follower_surface)?;
//!
//! hub.start_recording(clock.now_millis())?;
//! // ... user interacts with the controller, pump every frame ...
//! hub.pump(clock.now_millis());
//! let record = hub.stop_recording(clock.now_millis())?;
//!
//! hub.play_all_followers(clock.now_millis());
//! ```

mod capture;
mod config;
mod error;
mod hub;
mod record;
pub mod replay;
mod session;

pub use capture::{InputMode, Recorder};
pub use config::{CaptureConfig, PlaybackConfig, SyncConfig};
pub use error::{HubError, PlaybackRejected, SessionError};
pub use hub::{PumpSummary, SyncHub};
pub use record::{
    ActionKind, ActionPayload, ActionRecord, KeyPayload, PointerPayload, RecordedAction,
};
pub use replay::{
    PlaybackProgress, PlaybackStarted, Player, SyntheticInput, PLAYBACK_GRACE_MS,
};
pub use session::{ControllerSession, Controls, PumpReport, Role, SessionState};

pub use tandem_core::{Clock, ManualClock, Millis, MonotonicClock, RawInput};
pub use tandem_surface::{Surface, SurfaceEvent, SurfaceId};
