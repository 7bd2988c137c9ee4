//! Engine error types
//!
//! Expected runtime conditions (empty record, target not ready, overlapping
//! playback, wrong state) are reported as these typed values. Nothing here
//! is fatal.

use crate::session::SessionState;
use tandem_surface::SurfaceId;
use thiserror::Error;

/// Why a playback request was refused. Nothing was scheduled.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackRejected {
    /// The record holds no actions
    #[error("Record has no actions")]
    EmptyRecord,

    /// This player is already replaying a record
    #[error("Playback already in progress")]
    AlreadyPlaying,

    /// The target document is not loaded or not accessible
    #[error("Target surface not ready")]
    TargetNotReady,
}

/// Session state machine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The operation needs an idle session
    #[error("Session is {0:?}, expected Idle")]
    NotIdle(SessionState),

    /// Stop requested while not recording
    #[error("Session is not recording")]
    NotRecording,

    /// Mode cannot change during playback
    #[error("Input mode is locked during playback")]
    ModeLocked,

    /// Playback request refused
    #[error(transparent)]
    Playback(#[from] PlaybackRejected),
}

/// Collection-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("Unknown surface: {0}")]
    UnknownSurface(SurfaceId),

    #[error("Surface already registered: {0}")]
    DuplicateSurface(SurfaceId),

    #[error("No controller surface designated")]
    NoController,

    #[error("{0} is the controller; only followers replay records")]
    NotFollower(SurfaceId),

    #[error("No controller record has been published")]
    NoRecord,

    #[error("{surface}: {source}")]
    Session {
        surface: SurfaceId,
        #[source]
        source: SessionError,
    },
}

impl HubError {
    pub(crate) fn session(surface: SurfaceId) -> impl FnOnce(SessionError) -> Self {
        move |source| Self::Session { surface, source }
    }
}
