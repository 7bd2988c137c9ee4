//! Per-surface session state machine.
//!
//! ```text
//! Idle --start_recording--> Recording --stop_recording--> Idle
//! Idle --play--> Playing --(grace elapsed | cancel | refresh)--> Idle
//! ```
//!
//! `Recording` and `Playing` exclude each other. The input mode persists
//! across transitions and is locked while playing.

use crate::capture::{InputMode, Recorder};
use crate::config::SyncConfig;
use crate::error::{PlaybackRejected, SessionError};
use crate::record::ActionRecord;
use crate::replay::{PlaybackProgress, PlaybackStarted, Player};
use std::sync::Arc;
use tandem_core::Millis;
use tandem_surface::{best_effort, InputSubscription, Surface, SurfaceEvent, SurfaceId};

/// Current activity of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
    Playing,
}

/// Role assigned by the owning collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Controller,
    Follower,
}

/// Which controls the presentation layer should enable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    /// Start/stop recording (controllers only).
    pub can_record: bool,
    /// Replay the published record (followers only).
    pub can_play: bool,
    /// Switch between pointer and keyboard capture.
    pub can_toggle_mode: bool,
}

/// Outcome of one cooperative step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Actions appended to the open record.
    pub captured: usize,
    /// Playback work performed, if a playback was active.
    pub playback: Option<PlaybackProgress>,
}

/// Recording/playback state for one surface.
#[derive(Debug)]
pub struct ControllerSession {
    surface: SurfaceId,
    state: SessionState,
    mode: InputMode,
    recorder: Recorder,
    player: Player,
    subscription: Option<InputSubscription>,
    load_error: Option<String>,
}

impl ControllerSession {
    pub fn new(surface: SurfaceId, config: &SyncConfig) -> Self {
        Self {
            surface,
            state: SessionState::Idle,
            mode: InputMode::from_pointer_flag(config.capture.pointer_mode),
            recorder: Recorder::new(),
            player: Player::new(config.playback),
            subscription: None,
            load_error: None,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn pointer_mode(&self) -> bool {
        self.mode.is_pointer()
    }

    /// Last load failure reported by the surface, cleared by a refresh or a
    /// successful load.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Whether an input subscription is currently attached.
    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// React to a lifecycle notification from the surface.
    pub fn on_surface_event(&mut self, surface: &mut dyn Surface, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Loaded => {
                self.load_error = None;
                self.subscription = best_effort(surface.attach(), self.surface, "attach");
                tracing::debug!(
                    surface = %self.surface,
                    attached = self.subscription.is_some(),
                    "surface loaded"
                );
            }
            SurfaceEvent::LoadFailed(reason) => {
                tracing::debug!(surface = %self.surface, %reason, "surface failed to load");
                self.load_error = Some(reason);
                self.teardown();
            }
            SurfaceEvent::Unloaded => self.teardown(),
        }
    }

    /// `Idle -> Recording`: open a fresh record.
    pub fn start_recording(
        &mut self,
        surface: &dyn Surface,
        now: Millis,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::NotIdle(self.state));
        }

        // Input that arrived before arming belongs to no session.
        if let Some(subscription) = &self.subscription {
            subscription.drain();
        }

        self.recorder.arm(now, surface.identity());
        self.state = SessionState::Recording;
        tracing::info!(surface = %self.surface, mode = ?self.mode, "recording started");
        Ok(())
    }

    /// `Recording -> Idle`: finalize and hand over the record.
    ///
    /// Input already delivered to the subscription is captured first.
    pub fn stop_recording(&mut self, now: Millis) -> Result<Arc<ActionRecord>, SessionError> {
        if self.state != SessionState::Recording {
            return Err(SessionError::NotRecording);
        }

        self.capture_pending(now);
        let record = self
            .recorder
            .disarm()
            .ok_or(SessionError::NotRecording)?;
        self.state = SessionState::Idle;

        tracing::info!(
            surface = %self.surface,
            actions = record.len(),
            span_ms = record.span_millis(),
            "recording finished"
        );
        Ok(Arc::new(record))
    }

    /// `Idle -> Playing`: replay `record` against this session's surface.
    pub fn play(
        &mut self,
        record: Arc<ActionRecord>,
        surface: &dyn Surface,
        now: Millis,
    ) -> Result<PlaybackStarted, SessionError> {
        match self.state {
            SessionState::Idle => {}
            SessionState::Playing => return Err(PlaybackRejected::AlreadyPlaying.into()),
            SessionState::Recording => return Err(SessionError::NotIdle(self.state)),
        }

        let started = self.player.play(record, surface, now).map_err(|rejected| {
            tracing::debug!(surface = %self.surface, %rejected, "playback rejected");
            rejected
        })?;
        self.state = SessionState::Playing;
        Ok(started)
    }

    /// Flip between pointer and keyboard capture. Returns the new pointer flag.
    ///
    /// Input already delivered is classified under the mode it arrived in.
    pub fn toggle_mode(&mut self, now: Millis) -> Result<bool, SessionError> {
        if self.state == SessionState::Playing {
            return Err(SessionError::ModeLocked);
        }
        self.capture_pending(now);
        self.mode = self.mode.toggled();
        tracing::debug!(surface = %self.surface, mode = ?self.mode, "input mode toggled");
        Ok(self.mode.is_pointer())
    }

    /// Stop an in-flight playback. Returns the number of revoked dispatches.
    pub fn cancel(&mut self) -> usize {
        if self.state != SessionState::Playing {
            return 0;
        }
        self.state = SessionState::Idle;
        self.player.cancel()
    }

    /// Reload the surface. Any playback targeting it is cancelled first.
    pub fn refresh(&mut self, surface: &mut dyn Surface) {
        if let Some(subscription) = self.subscription.take() {
            best_effort(surface.detach(subscription.id()), self.surface, "detach");
        }
        self.teardown();
        best_effort(surface.reload(), self.surface, "reload");

        // Everything queued so far describes the document torn down above.
        while let Some(event) = surface.poll_event() {
            tracing::trace!(surface = %self.surface, ?event, "discarded stale lifecycle event");
        }
        self.load_error = None;
    }

    /// Run one cooperative step: lifecycle events, captured input, due
    /// playback work.
    pub fn pump(&mut self, surface: &mut dyn Surface, now: Millis) -> PumpReport {
        while let Some(event) = surface.poll_event() {
            self.on_surface_event(surface, event);
        }

        let captured = self.capture_pending(now);

        let playback = if self.state == SessionState::Playing {
            let progress = self.player.tick(surface, now);
            if progress.finished {
                self.state = SessionState::Idle;
            }
            Some(progress)
        } else {
            None
        };

        PumpReport { captured, playback }
    }

    /// Control availability for the given role.
    pub fn controls(&self, role: Role, has_published_record: bool) -> Controls {
        let playing = self.state == SessionState::Playing;
        match role {
            Role::Controller => Controls {
                can_record: !playing,
                can_play: false,
                can_toggle_mode: !playing,
            },
            Role::Follower => Controls {
                can_record: false,
                can_play: has_published_record && self.state == SessionState::Idle,
                can_toggle_mode: !playing && has_published_record,
            },
        }
    }

    fn capture_pending(&mut self, now: Millis) -> usize {
        let Some(subscription) = &self.subscription else {
            return 0;
        };
        let mut captured = 0;
        for input in subscription.drain() {
            if self.recorder.on_raw_input(input, self.mode, now) {
                captured += 1;
            }
        }
        captured
    }

    /// The current document is gone: stop playback and forget listeners.
    fn teardown(&mut self) {
        let revoked = self.cancel();
        if revoked > 0 {
            tracing::debug!(surface = %self.surface, revoked, "playback cancelled by teardown");
        }
        self.subscription = None;
    }
}
