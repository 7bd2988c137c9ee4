//! Scenario runner that drives a hub of headless surfaces on a manual clock.

use crate::config::TandemConfig;
use crate::report::{RunTotals, ScenarioReport};
use crate::scenario::{Scenario, ScenarioStep};
use anyhow::{bail, ensure, Context, Result};
use tandem_recorder::{Clock, ManualClock, Millis, Role, SessionState, SurfaceId, SyncHub};
use tandem_surface::HeadlessSurface;

/// Execute a scenario with a fresh hub and clock.
pub fn run_scenario(scenario: &Scenario, config: &TandemConfig) -> ScenarioReport {
    ScenarioRunner::new(config).run(scenario)
}

/// Owns the hub and the virtual clock for one run.
pub struct ScenarioRunner {
    tick_ms: Millis,
    clock: ManualClock,
    hub: SyncHub<HeadlessSurface>,
    totals: RunTotals,
}

impl ScenarioRunner {
    pub fn new(config: &TandemConfig) -> Self {
        Self {
            tick_ms: config.runner.tick_ms.max(1),
            clock: ManualClock::new(0),
            hub: SyncHub::new(config.sync()),
            totals: RunTotals::default(),
        }
    }

    pub fn hub(&self) -> &SyncHub<HeadlessSurface> {
        &self.hub
    }

    pub fn now(&self) -> Millis {
        self.clock.now_millis()
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(mut self, scenario: &Scenario) -> ScenarioReport {
        let name = scenario.name.clone();
        tracing::info!(
            scenario = name.as_deref().unwrap_or("<unnamed>"),
            steps = scenario.steps.len(),
            "running scenario"
        );

        for (index, step) in scenario.steps.iter().enumerate() {
            tracing::debug!(index, step = step.name(), now = self.now(), "scenario step");
            if let Err(err) = self.step(step) {
                let message = err.to_string();
                tracing::warn!(index, step = step.name(), %message, "scenario step failed");
                return ScenarioReport::failed(name, step.name(), index, message, self.totals);
            }
        }

        tracing::info!(
            elapsed_ms = self.totals.elapsed_ms,
            dispatched = self.totals.dispatched,
            "scenario passed"
        );
        ScenarioReport::passed(name, self.totals)
    }

    fn step(&mut self, step: &ScenarioStep) -> Result<()> {
        let now = self.now();
        match step {
            ScenarioStep::AddSurface {
                id,
                identity,
                elements,
                inaccessible,
            } => {
                let mut surface = HeadlessSurface::new(SurfaceId(*id), identity.clone());
                surface.set_elements(elements.clone());
                surface.set_accessible(!inaccessible);
                self.hub.add_surface(surface)?;
            }
            ScenarioStep::Load { surface } => self.surface_mut(*surface)?.finish_load(),
            ScenarioStep::FailLoad { surface, reason } => {
                self.surface_mut(*surface)?.fail_load(reason.clone())
            }
            ScenarioStep::SetController { surface } => {
                self.hub.set_controller(SurfaceId(*surface))?
            }
            ScenarioStep::StartRecording => self.hub.start_recording(now)?,
            ScenarioStep::StopRecording { export } => {
                // Deliver input still queued in the controller before closing.
                self.pump();
                let record = self.hub.stop_recording(now)?;
                tracing::info!(
                    actions = record.len(),
                    span_ms = record.span_millis(),
                    "record published"
                );
                if let Some(path) = export {
                    std::fs::write(path, record.to_json_pretty()?)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                }
                return Ok(());
            }
            ScenarioStep::Pointer { surface, x, y } => {
                self.surface_mut(*surface)?.user_click(*x, *y);
            }
            ScenarioStep::Key {
                surface,
                key,
                code,
                focus,
            } => {
                let target = self.surface_mut(*surface)?;
                if let Some(tag) = focus {
                    ensure!(target.focus(tag), "no element with tag {tag} to focus");
                }
                target.user_key(key, code);
            }
            ScenarioStep::ToggleMode { surface } => {
                self.hub.toggle_mode(SurfaceId(*surface), now)?;
            }
            ScenarioStep::Play {
                surface,
                expect_rejected,
            } => match self.hub.play_follower(SurfaceId(*surface), now) {
                Ok(started) if *expect_rejected => {
                    bail!(
                        "expected playback on surface#{surface} to be rejected, finishes at {}",
                        started.finishes_at
                    )
                }
                Ok(_) => {}
                Err(err) if *expect_rejected => {
                    tracing::debug!(%err, "playback rejected as expected");
                }
                Err(err) => return Err(err.into()),
            },
            ScenarioStep::PlayAll => {
                let rejected: Vec<String> = self
                    .hub
                    .play_all_followers(now)
                    .into_iter()
                    .filter_map(|(_, result)| result.err().map(|err| err.to_string()))
                    .collect();
                ensure!(rejected.is_empty(), "{}", rejected.join("; "));
            }
            ScenarioStep::Cancel { surface } => {
                self.hub.cancel(SurfaceId(*surface))?;
            }
            ScenarioStep::Refresh { surface } => self.hub.refresh(SurfaceId(*surface))?,
            ScenarioStep::Wait { ms } => {
                self.wait(*ms);
                return Ok(());
            }
            ScenarioStep::AssertState {
                surface,
                state,
                pointer_mode,
                controller,
            } => {
                let id = SurfaceId(*surface);
                let session = self
                    .hub
                    .session(id)
                    .with_context(|| format!("unknown surface {id}"))?;
                if let Some(expected) = state {
                    let expected = SessionState::from(*expected);
                    ensure!(
                        session.state() == expected,
                        "{id}: expected state {expected:?}, got {:?}",
                        session.state()
                    );
                }
                if let Some(expected) = pointer_mode {
                    ensure!(
                        session.pointer_mode() == *expected,
                        "{id}: expected pointer_mode {expected}, got {}",
                        session.pointer_mode()
                    );
                }
                if let Some(expected) = controller {
                    let is_controller = self.hub.role(id) == Some(Role::Controller);
                    ensure!(
                        is_controller == *expected,
                        "{id}: expected controller {expected}, got {is_controller}"
                    );
                }
                return Ok(());
            }
            ScenarioStep::AssertDispatched {
                surface,
                count,
                targets,
            } => {
                let id = SurfaceId(*surface);
                let dispatched = self
                    .hub
                    .surface(id)
                    .with_context(|| format!("unknown surface {id}"))?
                    .dispatched();
                ensure!(
                    dispatched.len() == *count,
                    "{id}: expected {count} dispatches, got {}",
                    dispatched.len()
                );
                if let Some(expected) = targets {
                    let actual: Vec<&str> = dispatched
                        .iter()
                        .map(|input| input.target_tag().unwrap_or_default())
                        .collect();
                    ensure!(
                        actual == *expected,
                        "{id}: expected targets {expected:?}, got {actual:?}"
                    );
                }
                return Ok(());
            }
        }

        self.pump();
        Ok(())
    }

    /// Advance the clock by `ms` in `tick_ms` steps, pumping after each.
    fn wait(&mut self, ms: Millis) {
        let mut remaining = ms;
        while remaining > 0 {
            let step = remaining.min(self.tick_ms);
            remaining -= step;
            self.clock.advance(step);
            self.totals.elapsed_ms = self.totals.elapsed_ms.saturating_add(step);
            self.totals.elapsed_ticks += 1;
            self.pump();
        }
    }

    fn pump(&mut self) {
        let summary = self.hub.pump(self.now());
        self.totals.captured += summary.captured;
        self.totals.dispatched += summary.dispatched;
        self.totals.missed += summary.missed;
        for id in summary.finished {
            tracing::debug!(surface = %id, now = self.now(), "follower playback finished");
        }
    }

    fn surface_mut(&mut self, id: u64) -> Result<&mut HeadlessSurface> {
        let id = SurfaceId(id);
        self.hub
            .surface_mut(id)
            .with_context(|| format!("unknown surface {id}"))
    }
}
