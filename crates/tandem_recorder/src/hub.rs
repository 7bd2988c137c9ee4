//! Owner of the surface collection and the published record.

use crate::config::SyncConfig;
use crate::error::{HubError, SessionError};
use crate::record::ActionRecord;
use crate::replay::PlaybackStarted;
use crate::session::{ControllerSession, Controls, Role, SessionState};
use indexmap::IndexMap;
use std::sync::Arc;
use tandem_core::Millis;
use tandem_surface::{Surface, SurfaceId};

/// Aggregate of one [`SyncHub::pump`] pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PumpSummary {
    /// Actions captured by the controller.
    pub captured: usize,
    /// Synthetic dispatches fired across all followers.
    pub dispatched: usize,
    /// Dispatches that found no target.
    pub missed: usize,
    /// Surfaces whose playback completed during this pass.
    pub finished: Vec<SurfaceId>,
}

struct Member<S> {
    surface: S,
    session: ControllerSession,
}

/// Surfaces in insertion order, exactly one of which (when non-empty) is
/// the controller.
pub struct SyncHub<S: Surface> {
    config: SyncConfig,
    members: IndexMap<SurfaceId, Member<S>>,
    controller: Option<SurfaceId>,
    latest: Option<Arc<ActionRecord>>,
}

impl<S: Surface> SyncHub<S> {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            members: IndexMap::new(),
            controller: None,
            latest: None,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Surface ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.members.keys().copied()
    }

    pub fn controller(&self) -> Option<SurfaceId> {
        self.controller
    }

    pub fn followers(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        let controller = self.controller;
        self.ids().filter(move |id| Some(*id) != controller)
    }

    pub fn role(&self, id: SurfaceId) -> Option<Role> {
        self.members.get(&id)?;
        Some(if self.controller == Some(id) {
            Role::Controller
        } else {
            Role::Follower
        })
    }

    pub fn session(&self, id: SurfaceId) -> Option<&ControllerSession> {
        self.members.get(&id).map(|m| &m.session)
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&S> {
        self.members.get(&id).map(|m| &m.surface)
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut S> {
        self.members.get_mut(&id).map(|m| &mut m.surface)
    }

    /// Most recently published controller record.
    pub fn latest_record(&self) -> Option<&Arc<ActionRecord>> {
        self.latest.as_ref()
    }

    /// Register a surface. The first one becomes controller.
    pub fn add_surface(&mut self, surface: S) -> Result<Role, HubError> {
        let id = surface.id();
        if self.members.contains_key(&id) {
            return Err(HubError::DuplicateSurface(id));
        }

        let session = ControllerSession::new(id, &self.config);
        self.members.insert(id, Member { surface, session });

        let role = if self.controller.is_none() {
            self.controller = Some(id);
            Role::Controller
        } else {
            Role::Follower
        };
        tracing::info!(surface = %id, ?role, "surface added");
        Ok(role)
    }

    /// Unregister a surface, cancelling anything it was doing.
    ///
    /// Removing the controller promotes the first remaining surface. The
    /// published record is discarded on any removal.
    pub fn remove_surface(&mut self, id: SurfaceId) -> Result<S, HubError> {
        let mut member = self
            .members
            .shift_remove(&id)
            .ok_or(HubError::UnknownSurface(id))?;
        member.session.cancel();

        if self.controller == Some(id) {
            self.controller = self.members.keys().next().copied();
            if let Some(promoted) = self.controller {
                tracing::info!(surface = %promoted, "controller promoted");
            }
        }
        self.latest = None;

        tracing::info!(surface = %id, remaining = self.members.len(), "surface removed");
        Ok(member.surface)
    }

    /// Move the controller flag to `id`.
    ///
    /// Refused while the current controller is recording.
    pub fn set_controller(&mut self, id: SurfaceId) -> Result<(), HubError> {
        if !self.members.contains_key(&id) {
            return Err(HubError::UnknownSurface(id));
        }
        if let Some(current) = self.controller {
            if current == id {
                return Ok(());
            }
            let state = self
                .session(current)
                .map(ControllerSession::state)
                .unwrap_or_default();
            if state == SessionState::Recording {
                tracing::warn!(surface = %current, "controller change refused while recording");
                return Err(HubError::Session {
                    surface: current,
                    source: SessionError::NotIdle(state),
                });
            }
        }

        self.controller = Some(id);
        tracing::info!(surface = %id, "controller designated");
        Ok(())
    }

    pub fn start_recording(&mut self, now: Millis) -> Result<(), HubError> {
        let id = self.controller.ok_or(HubError::NoController)?;
        let member = self.member_mut(id)?;
        member
            .session
            .start_recording(&member.surface, now)
            .map_err(HubError::session(id))
    }

    /// Finalize the controller's record and publish it for followers.
    pub fn stop_recording(&mut self, now: Millis) -> Result<Arc<ActionRecord>, HubError> {
        let id = self.controller.ok_or(HubError::NoController)?;
        let record = self
            .member_mut(id)?
            .session
            .stop_recording(now)
            .map_err(HubError::session(id))?;
        self.latest = Some(Arc::clone(&record));
        Ok(record)
    }

    /// Replay the published record on follower `id`.
    pub fn play_follower(
        &mut self,
        id: SurfaceId,
        now: Millis,
    ) -> Result<PlaybackStarted, HubError> {
        if self.controller == Some(id) {
            return Err(HubError::NotFollower(id));
        }
        let record = self.latest.clone().ok_or(HubError::NoRecord)?;
        let member = self.member_mut(id)?;
        member
            .session
            .play(record, &member.surface, now)
            .map_err(HubError::session(id))
    }

    /// Replay the published record on every follower. Each follower is
    /// started independently; one rejection does not stop the others.
    pub fn play_all_followers(
        &mut self,
        now: Millis,
    ) -> Vec<(SurfaceId, Result<PlaybackStarted, HubError>)> {
        let followers: Vec<SurfaceId> = self.followers().collect();
        followers
            .into_iter()
            .map(|id| (id, self.play_follower(id, now)))
            .collect()
    }

    pub fn toggle_mode(&mut self, id: SurfaceId, now: Millis) -> Result<bool, HubError> {
        self.member_mut(id)?
            .session
            .toggle_mode(now)
            .map_err(HubError::session(id))
    }

    /// Cancel playback on `id`. Returns the number of revoked dispatches.
    pub fn cancel(&mut self, id: SurfaceId) -> Result<usize, HubError> {
        Ok(self.member_mut(id)?.session.cancel())
    }

    pub fn refresh(&mut self, id: SurfaceId) -> Result<(), HubError> {
        let member = self.member_mut(id)?;
        member.session.refresh(&mut member.surface);
        Ok(())
    }

    pub fn controls(&self, id: SurfaceId) -> Result<Controls, HubError> {
        let role = self.role(id).ok_or(HubError::UnknownSurface(id))?;
        let session = self.session(id).ok_or(HubError::UnknownSurface(id))?;
        Ok(session.controls(role, self.latest.is_some()))
    }

    /// Drive every session one cooperative step.
    pub fn pump(&mut self, now: Millis) -> PumpSummary {
        let mut summary = PumpSummary::default();
        for (id, member) in self.members.iter_mut() {
            let report = member.session.pump(&mut member.surface, now);
            summary.captured += report.captured;
            if let Some(progress) = report.playback {
                summary.dispatched += progress.dispatched;
                summary.missed += progress.missed;
                if progress.finished {
                    summary.finished.push(*id);
                }
            }
        }
        summary
    }

    fn member_mut(&mut self, id: SurfaceId) -> Result<&mut Member<S>, HubError> {
        self.members.get_mut(&id).ok_or(HubError::UnknownSurface(id))
    }
}

impl<S: Surface> std::fmt::Debug for SyncHub<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncHub")
            .field("surfaces", &self.members.keys().collect::<Vec<_>>())
            .field("controller", &self.controller)
            .field("has_record", &self.latest.is_some())
            .finish()
    }
}
