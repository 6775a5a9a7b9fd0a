use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Base delay between auto-play steps at a speed multiplier of 1.
pub const BASE_STEP_INTERVAL: Duration = Duration::from_millis(2000);

/// Steps never fire closer together than this, however high the speed.
const MIN_STEP_INTERVAL: Duration = Duration::from_millis(1);

/// Monotonic session time fed into the auto-play scheduler.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackClock {
    elapsed: Duration,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    pub fn advance(&mut self, delta: Duration) -> Duration {
        self.elapsed += delta;
        self.elapsed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// Evict one element from the structure's removal end.
    Remove,
    /// Insert a freshly drawn random value.
    Insert,
}

/// Snapshot of a scheduled step.
///
/// A ticket is only honoured while its generation matches the scheduler's;
/// stopping or restarting auto-play invalidates every outstanding ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTicket {
    pub generation: u64,
    pub kind: StepKind,
    pub due: Duration,
}

/// Observable playback status for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub running: bool,
    pub interval_ms: u64,
}

/// Timer state of the auto-play loop. Holds at most one pending step.
#[derive(Debug, Clone)]
pub struct AutoPlay {
    running: bool,
    speed: f32,
    generation: u64,
    pending: Option<StepTicket>,
}

impl AutoPlay {
    pub fn new(speed: f32) -> Self {
        Self {
            running: false,
            speed,
            generation: 0,
            pending: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Changes the speed multiplier. Already scheduled steps keep their due
    /// time; the new interval applies from the next one on.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(BASE_STEP_INTERVAL.as_secs_f64() / f64::from(self.speed))
            .unwrap_or(BASE_STEP_INTERVAL)
            .max(MIN_STEP_INTERVAL)
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            running: self.running,
            interval_ms: self.interval().as_millis() as u64,
        }
    }

    pub fn pending(&self) -> Option<&StepTicket> {
        self.pending.as_ref()
    }

    /// Enters the running state with a removal due right away.
    pub fn start(&mut self, now: Duration) {
        self.generation += 1;
        self.running = true;
        self.pending = Some(StepTicket {
            generation: self.generation,
            kind: StepKind::Remove,
            due: now,
        });
    }

    /// Leaves the running state and drops any pending step.
    pub fn stop(&mut self) {
        self.generation += 1;
        self.running = false;
        self.pending = None;
    }

    /// Queues `kind` one interval after `now`, replacing any pending step.
    pub fn schedule(&mut self, kind: StepKind, now: Duration) -> Option<StepTicket> {
        if !self.running {
            return None;
        }
        let ticket = StepTicket {
            generation: self.generation,
            kind,
            due: now.saturating_add(self.interval()),
        };
        self.pending = Some(ticket);
        Some(ticket)
    }

    /// Hands out the pending step once its due time has been reached.
    pub fn take_due(&mut self, now: Duration) -> Option<StepTicket> {
        match self.pending {
            Some(ticket) if ticket.due <= now => self.pending.take(),
            _ => None,
        }
    }

    pub fn is_current(&self, ticket: &StepTicket) -> bool {
        self.running && ticket.generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_scales_with_speed() {
        assert_eq!(AutoPlay::new(1.0).interval(), Duration::from_millis(2000));
        assert_eq!(AutoPlay::new(4.0).interval(), Duration::from_millis(500));
        assert_eq!(AutoPlay::new(0.5).interval(), Duration::from_millis(4000));
    }

    #[test]
    fn huge_speeds_keep_a_minimum_interval() {
        assert_eq!(AutoPlay::new(1.0e9).interval(), MIN_STEP_INTERVAL);
    }

    #[test]
    fn start_schedules_an_immediate_removal() {
        let mut autoplay = AutoPlay::new(1.0);
        autoplay.start(Duration::from_secs(3));

        let ticket = autoplay.take_due(Duration::from_secs(3)).unwrap();
        assert_eq!(ticket.kind, StepKind::Remove);
        assert!(autoplay.is_current(&ticket));
        assert!(autoplay.pending().is_none());
    }

    #[test]
    fn steps_are_not_handed_out_early() {
        let mut autoplay = AutoPlay::new(2.0);
        autoplay.start(Duration::ZERO);
        autoplay.take_due(Duration::ZERO).unwrap();
        autoplay.schedule(StepKind::Insert, Duration::ZERO).unwrap();

        assert!(autoplay.take_due(Duration::from_millis(999)).is_none());
        let ticket = autoplay.take_due(Duration::from_millis(1000)).unwrap();
        assert_eq!(ticket.kind, StepKind::Insert);
    }

    #[test]
    fn stopping_invalidates_outstanding_tickets() {
        let mut autoplay = AutoPlay::new(1.0);
        autoplay.start(Duration::ZERO);
        let ticket = autoplay.schedule(StepKind::Insert, Duration::ZERO).unwrap();

        autoplay.stop();
        assert!(!autoplay.is_current(&ticket));
        assert!(autoplay.pending().is_none());

        autoplay.start(Duration::ZERO);
        assert!(!autoplay.is_current(&ticket));
    }

    #[test]
    fn nothing_is_scheduled_while_idle() {
        let mut autoplay = AutoPlay::new(1.0);
        assert!(autoplay.schedule(StepKind::Remove, Duration::ZERO).is_none());
    }

    #[test]
    fn clock_accumulates_deltas() {
        let mut clock = PlaybackClock::new();
        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.advance(Duration::from_millis(16)), Duration::from_millis(32));
        clock.reset();
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }
}
