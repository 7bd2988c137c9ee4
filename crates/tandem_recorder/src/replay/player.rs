//! Replay player for published action records.
//!
//! `play` schedules one revocable timer per action at its original offset
//! from the start of the recording, plus a completion timer one grace
//! period after the last action. The player owns its timers; `tick` fires
//! whatever is due and `cancel` revokes everything that has not fired.

use super::SyntheticInput;
use crate::config::PlaybackConfig;
use crate::error::PlaybackRejected;
use crate::record::ActionRecord;
use std::sync::Arc;
use tandem_core::{Millis, TimerQueue};
use tandem_surface::Surface;

/// Delay after the last scheduled dispatch before playback is finished.
pub const PLAYBACK_GRACE_MS: Millis = 100;

/// A scheduled unit of playback work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlaybackStep {
    /// Dispatch the action at this index of the record.
    Dispatch(usize),
    /// Grace period elapsed.
    Complete,
}

/// Accepted playback request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackStarted {
    /// Number of dispatches scheduled.
    pub scheduled: usize,
    /// Reading at which `play` was invoked.
    pub started_at: Millis,
    /// Reading at which playback returns to idle.
    pub finishes_at: Millis,
}

/// What one `tick` accomplished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackProgress {
    /// Dispatches fired during this tick.
    pub dispatched: usize,
    /// Dispatches that fired but had no effect on the target.
    pub missed: usize,
    /// Playback completed during this tick.
    pub finished: bool,
}

struct ActivePlayback {
    record: Arc<ActionRecord>,
    started_at: Millis,
    finishes_at: Millis,
    fired: usize,
}

/// Replays one record at a time against a target surface.
pub struct Player {
    config: PlaybackConfig,
    timers: TimerQueue<PlaybackStep>,
    active: Option<ActivePlayback>,
}

impl Player {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            timers: TimerQueue::new(),
            active: None,
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    /// Record currently being replayed.
    pub fn record(&self) -> Option<&Arc<ActionRecord>> {
        self.active.as_ref().map(|a| &a.record)
    }

    /// Reading at which the current playback will finish.
    pub fn finishes_at(&self) -> Option<Millis> {
        self.active.as_ref().map(|a| a.finishes_at)
    }

    /// Scheduled work not yet fired (dispatches plus the completion timer).
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Dispatches fired so far in the current playback.
    pub fn fired(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.fired)
    }

    /// Schedule every action of `record` relative to `now`.
    ///
    /// Nothing is scheduled when the request is rejected.
    pub fn play(
        &mut self,
        record: Arc<ActionRecord>,
        target: &dyn Surface,
        now: Millis,
    ) -> Result<PlaybackStarted, PlaybackRejected> {
        if record.is_empty() {
            return Err(PlaybackRejected::EmptyRecord);
        }
        if self.active.is_some() {
            return Err(PlaybackRejected::AlreadyPlaying);
        }
        if !target.is_ready() {
            return Err(PlaybackRejected::TargetNotReady);
        }

        let start = record.started_at_millis();
        for (index, action) in record.actions().iter().enumerate() {
            self.timers
                .schedule_after(now, action.offset_from(start), PlaybackStep::Dispatch(index));
        }

        let finishes_at = now
            .saturating_add(record.span_millis())
            .saturating_add(self.config.grace_period_ms);
        self.timers.schedule(finishes_at, PlaybackStep::Complete);

        let started = PlaybackStarted {
            scheduled: record.len(),
            started_at: now,
            finishes_at,
        };
        tracing::info!(
            target_surface = %target.id(),
            source = record.source_identity(),
            actions = started.scheduled,
            finishes_at,
            "playback scheduled"
        );

        self.active = Some(ActivePlayback {
            record,
            started_at: now,
            finishes_at,
            fired: 0,
        });
        Ok(started)
    }

    /// Fire everything due at `now`, in scheduling order.
    pub fn tick(&mut self, target: &mut dyn Surface, now: Millis) -> PlaybackProgress {
        let mut progress = PlaybackProgress::default();
        let Some(active) = self.active.as_mut() else {
            return progress;
        };

        while let Some((_, step)) = self.timers.pop_due(now) {
            match step {
                PlaybackStep::Dispatch(index) => {
                    let Some(action) = active.record.actions().get(index) else {
                        unreachable!("dispatch scheduled for missing action {index}");
                    };
                    progress.dispatched += 1;
                    active.fired += 1;
                    if SyntheticInput::from_action(action).dispatch(target).is_none() {
                        progress.missed += 1;
                    }
                }
                PlaybackStep::Complete => {
                    progress.finished = true;
                    break;
                }
            }
        }

        if progress.finished {
            let elapsed = now.saturating_sub(active.started_at);
            tracing::info!(
                target_surface = %target.id(),
                fired = active.fired,
                elapsed,
                "playback finished"
            );
            self.timers.cancel_all();
            self.active = None;
        }
        progress
    }

    /// Revoke every pending dispatch. Returns how many were revoked.
    ///
    /// Already fired dispatches are not undone. Safe to call while idle.
    pub fn cancel(&mut self) -> usize {
        let Some(active) = self.active.take() else {
            return 0;
        };
        // The completion timer is not a dispatch.
        let revoked = self.timers.cancel_all().saturating_sub(1);
        tracing::info!(
            fired = active.fired,
            revoked,
            "playback cancelled"
        );
        revoked
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("playing", &self.is_playing())
            .field("pending", &self.timers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordedAction;
    use tandem_surface::{ElementBounds, HeadlessSurface, SurfaceId};

    fn target() -> HeadlessSurface {
        let mut surface = HeadlessSurface::new(SurfaceId(2), "https://example.com")
            .with_element("BODY", ElementBounds::new(0.0, 0.0, 1_000.0, 1_000.0));
        surface.finish_load();
        surface
    }

    /// Actions at offsets 0, 500 and 1200 ms.
    fn create_test_record() -> Arc<ActionRecord> {
        Arc::new(ActionRecord::from_actions(
            10_000,
            "https://controller.example",
            vec![
                RecordedAction::pointer(10_000, 1.0, 1.0, None),
                RecordedAction::pointer(10_500, 2.0, 2.0, None),
                RecordedAction::pointer(11_200, 3.0, 3.0, None),
            ],
        ))
    }

    #[test]
    fn test_empty_record_is_rejected_without_state_change() {
        let mut player = Player::default();
        let surface = target();

        let result = player.play(Arc::new(ActionRecord::new(0, "x")), &surface, 0);
        assert_eq!(result, Err(PlaybackRejected::EmptyRecord));
        assert!(!player.is_playing());
        assert_eq!(player.pending(), 0);
    }

    #[test]
    fn test_target_not_ready_schedules_nothing() {
        let mut player = Player::default();
        let surface = HeadlessSurface::new(SurfaceId(2), "https://example.com");

        let result = player.play(create_test_record(), &surface, 0);
        assert_eq!(result, Err(PlaybackRejected::TargetNotReady));
        assert_eq!(player.pending(), 0);
    }

    #[test]
    fn test_schedule_preserves_relative_offsets() {
        let mut player = Player::default();
        let mut surface = target();
        let t = 50_000;

        let started = player.play(create_test_record(), &surface, t).unwrap();
        assert_eq!(started.scheduled, 3);
        assert_eq!(started.finishes_at, t + 1_300);

        assert_eq!(player.tick(&mut surface, t).dispatched, 1);
        assert_eq!(player.tick(&mut surface, t + 499).dispatched, 0);
        assert_eq!(player.tick(&mut surface, t + 500).dispatched, 1);
        assert_eq!(player.tick(&mut surface, t + 1_200).dispatched, 1);

        let progress = player.tick(&mut surface, t + 1_299);
        assert!(!progress.finished);
        assert!(player.is_playing());

        let progress = player.tick(&mut surface, t + 1_300);
        assert!(progress.finished);
        assert!(!player.is_playing());
        assert_eq!(player.pending(), 0);
        assert_eq!(surface.dispatched().len(), 3);
    }

    #[test]
    fn test_late_tick_fires_everything_in_order() {
        let mut player = Player::default();
        let mut surface = target();

        player.play(create_test_record(), &surface, 0).unwrap();
        let progress = player.tick(&mut surface, 10_000);
        assert_eq!(progress.dispatched, 3);
        assert!(progress.finished);

        let xs: Vec<_> = surface
            .dispatched()
            .iter()
            .map(|input| match input {
                tandem_core::RawInput::Pointer { x, .. } => *x,
                _ => f64::NAN,
            })
            .collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_second_play_rejected_while_active() {
        let mut player = Player::default();
        let surface = target();

        player.play(create_test_record(), &surface, 0).unwrap();
        let pending = player.pending();

        assert_eq!(
            player.play(create_test_record(), &surface, 10),
            Err(PlaybackRejected::AlreadyPlaying)
        );
        assert_eq!(player.pending(), pending);
        assert_eq!(player.finishes_at(), Some(1_300));
    }

    #[test]
    fn test_cancel_revokes_pending_dispatches() {
        let mut player = Player::default();
        let mut surface = target();

        player.play(create_test_record(), &surface, 0).unwrap();
        player.tick(&mut surface, 600);
        assert_eq!(player.fired(), 2);

        assert_eq!(player.cancel(), 1);
        assert!(!player.is_playing());

        let progress = player.tick(&mut surface, 5_000);
        assert_eq!(progress, PlaybackProgress::default());
        assert_eq!(surface.dispatched().len(), 2);
    }

    #[test]
    fn test_cancel_while_idle_is_noop() {
        let mut player = Player::default();
        assert_eq!(player.cancel(), 0);
    }

    #[test]
    fn test_negative_offsets_clamp_to_immediate() {
        let mut player = Player::default();
        let mut surface = target();
        let record = Arc::new(ActionRecord::from_actions(
            1_000,
            "x",
            vec![RecordedAction::pointer(400, 1.0, 1.0, None)],
        ));

        let started = player.play(record, &surface, 0).unwrap();
        assert_eq!(started.finishes_at, 100);
        assert_eq!(player.tick(&mut surface, 0).dispatched, 1);
    }

    #[test]
    fn test_missed_dispatch_is_counted_not_fatal() {
        let mut player = Player::default();
        let mut surface = target();
        let record = Arc::new(ActionRecord::from_actions(
            0,
            "x",
            vec![RecordedAction::pointer(0, 5_000.0, 5_000.0, None)],
        ));

        player.play(record, &surface, 0).unwrap();
        let progress = player.tick(&mut surface, 0);
        assert_eq!(progress.dispatched, 1);
        assert_eq!(progress.missed, 1);
        assert!(player.is_playing());
    }

    #[test]
    fn test_custom_grace_period() {
        let mut player = Player::new(PlaybackConfig { grace_period_ms: 0 });
        let mut surface = target();

        let started = player.play(create_test_record(), &surface, 0).unwrap();
        assert_eq!(started.finishes_at, 1_200);

        let progress = player.tick(&mut surface, 1_200);
        assert_eq!(progress.dispatched, 3);
        assert!(progress.finished);
    }
}
