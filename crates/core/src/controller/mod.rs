use std::{ops::RangeInclusive, time::Duration};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::positive, AppConfig, AutoPlay, Element, LayoutParams, PlaybackState, Result,
    StepKind, StepTicket, Structure, StructureKind,
};

/// Structural change produced by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    Inserted(i64),
    Removed(i64),
    /// Auto-play ran out of elements and went back to idle.
    AutoStopped,
}

/// Owns the structure's values and the auto-play loop that churns them.
///
/// The controller is a plain state machine: the caller feeds it the current
/// session time through [`StructureController::poll`] and forwards the
/// returned events to the scene and audio collaborators.
#[derive(Debug)]
pub struct StructureController<R = StdRng> {
    structure: Structure,
    autoplay: AutoPlay,
    value_range: RangeInclusive<i64>,
    rng: R,
}

impl StructureController<StdRng> {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> StructureController<R> {
    pub fn with_rng(config: &AppConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let structure = Structure::with_values(
            config.structure.kind,
            config.structure.layout(),
            config.structure.initial.iter().copied(),
        );
        Ok(Self {
            structure,
            autoplay: AutoPlay::new(config.structure.speed),
            value_range: config.autoplay.value_range(),
            rng,
        })
    }

    pub fn elements(&self) -> Vec<Element> {
        self.structure.elements()
    }

    pub fn values(&self) -> Vec<i64> {
        self.structure.values()
    }

    pub fn kind(&self) -> StructureKind {
        self.structure.kind()
    }

    pub fn layout(&self) -> &LayoutParams {
        self.structure.params()
    }

    pub fn playback(&self) -> PlaybackState {
        self.autoplay.state()
    }

    pub fn is_playing(&self) -> bool {
        self.autoplay.is_running()
    }

    /// Appends `value` as the newest element.
    pub fn insert(&mut self, value: i64) -> ControllerEvent {
        self.structure.insert(value);
        tracing::debug!(value, len = self.structure.len(), "inserted");
        ControllerEvent::Inserted(value)
    }

    /// Removes from the tail of a stack or the head of any other kind.
    ///
    /// Emptying the structure while auto-play runs stops auto-play and drops
    /// its pending step, whoever triggered the removal.
    pub fn remove(&mut self) -> Result<ControllerEvent> {
        let value = self.structure.remove()?;
        tracing::debug!(value, len = self.structure.len(), "removed");
        if self.structure.is_empty() && self.autoplay.is_running() {
            self.autoplay.stop();
            tracing::debug!("auto-play stopped: structure emptied");
        }
        Ok(ControllerEvent::Removed(value))
    }

    /// Starts auto-play. An empty structure stays idle and `false` is returned.
    pub fn start_auto_play(&mut self, now: Duration) -> bool {
        if self.structure.is_empty() {
            tracing::debug!("auto-play needs at least one element");
            return false;
        }
        if !self.autoplay.is_running() {
            self.autoplay.start(now);
            tracing::debug!(interval_ms = self.playback().interval_ms, "auto-play started");
        }
        true
    }

    pub fn stop_auto_play(&mut self) {
        if self.autoplay.is_running() {
            tracing::debug!("auto-play stopped");
        }
        self.autoplay.stop();
    }

    pub fn set_kind(&mut self, kind: StructureKind) {
        self.structure.set_kind(kind);
    }

    pub fn set_layout(&mut self, params: LayoutParams) -> Result<()> {
        positive("element_size", params.element_size)?;
        positive("spacing", params.spacing)?;
        positive("ring_radius", params.ring_radius)?;
        self.structure.set_params(params);
        Ok(())
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        positive("speed", speed)?;
        self.autoplay.set_speed(speed);
        Ok(())
    }

    /// Runs every auto-play step that has come due by `now`.
    pub fn poll(&mut self, now: Duration) -> Vec<ControllerEvent> {
        let mut events = Vec::new();
        while let Some(ticket) = self.autoplay.take_due(now) {
            events.extend(self.run_step(ticket, now));
        }
        events
    }

    /// Executes a scheduled step if its ticket is still current.
    pub fn run_step(&mut self, ticket: StepTicket, now: Duration) -> Vec<ControllerEvent> {
        if !self.autoplay.is_current(&ticket) {
            tracing::trace!(?ticket, "dropping stale auto-play step");
            return Vec::new();
        }

        let mut events = Vec::new();
        match ticket.kind {
            StepKind::Remove => match self.remove() {
                Ok(event) => {
                    events.push(event);
                    if self.autoplay.is_running() {
                        self.autoplay.schedule(StepKind::Insert, now);
                    } else {
                        events.push(ControllerEvent::AutoStopped);
                    }
                }
                Err(_) => {
                    self.autoplay.stop();
                    events.push(ControllerEvent::AutoStopped);
                }
            },
            StepKind::Insert => {
                let value = self.rng.gen_range(self.value_range.clone());
                events.push(self.insert(value));
                self.autoplay.schedule(StepKind::Remove, now);
            }
        }
        events
    }
}
