use std::{
    collections::VecDeque,
    f32::consts::TAU,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{DataVisError, Result, Tone};

const DEFAULT_SAMPLE_RATE: u32 = 48_000;
const HISTORY_CAPACITY: usize = 32;
const ATTACK_SECONDS: f32 = 0.005;
const RELEASE_SECONDS: f32 = 0.05;

/// Audio backend reached by the visualiser. Calls are fire-and-forget from
/// the caller's point of view; errors are reported but never retried.
pub trait TonePlayer {
    fn play_tone(&mut self, tone: &Tone) -> Result<()>;

    /// Releases backend resources. Called once on teardown.
    fn shutdown(&mut self) {}
}

/// Tone that has been rendered by [`SineSynth`].
#[derive(Debug, Clone)]
pub struct PlayedTone {
    pub tone: Tone,
    pub samples: Vec<f32>,
}

/// Small monophonic synthesiser that renders each tone as an enveloped sine
/// wave and keeps the most recent renders for inspection.
#[derive(Debug)]
pub struct SineSynth {
    sample_rate: u32,
    gain: f32,
    history: Arc<Mutex<VecDeque<PlayedTone>>>,
}

impl Default for SineSynth {
    fn default() -> Self {
        Self::new()
    }
}

impl SineSynth {
    /// Creates a synthesiser using the default 48 kHz sample rate.
    pub fn new() -> Self {
        Self::with_sample_rate(DEFAULT_SAMPLE_RATE)
    }

    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            gain: 0.5,
            history: Arc::new(Mutex::new(VecDeque::with_capacity(HISTORY_CAPACITY))),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns a handle that can read rendered tones after the synth has been
    /// moved into a context.
    pub fn history(&self) -> ToneHistory {
        ToneHistory {
            shared: self.history.clone(),
        }
    }

    fn render(&self, tone: &Tone) -> Result<Vec<f32>> {
        if self.sample_rate == 0 {
            return Err(DataVisError::Audio("sample rate must be non-zero".into()));
        }
        if !tone.frequency_hz.is_finite() || tone.frequency_hz <= 0.0 {
            return Err(DataVisError::Audio(format!(
                "unplayable frequency {} Hz",
                tone.frequency_hz
            )));
        }

        let rate = self.sample_rate as f32;
        let len = (tone.duration.as_secs_f32() * rate).round() as usize;
        let attack = (ATTACK_SECONDS * rate).max(1.0);
        let release = (RELEASE_SECONDS * rate).max(1.0);

        Ok((0..len)
            .map(|index| {
                let t = index as f32 / rate;
                let remaining = (len - index) as f32;
                let envelope = (index as f32 / attack).min(1.0) * (remaining / release).min(1.0);
                self.gain * envelope * (TAU * tone.frequency_hz * t).sin()
            })
            .collect())
    }

    fn lock_history(&self) -> Result<MutexGuard<'_, VecDeque<PlayedTone>>> {
        self.history
            .lock()
            .map_err(|_| DataVisError::Audio("tone history has been poisoned".into()))
    }
}

impl TonePlayer for SineSynth {
    fn play_tone(&mut self, tone: &Tone) -> Result<()> {
        let samples = self.render(tone)?;
        tracing::debug!(note = %tone.note, hz = tone.frequency_hz, samples = samples.len(), "tone rendered");

        let mut history = self.lock_history()?;
        if history.len() == HISTORY_CAPACITY {
            history.pop_front();
        }
        history.push_back(PlayedTone {
            tone: tone.clone(),
            samples,
        });
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Ok(mut history) = self.lock_history() {
            history.clear();
        }
    }
}

/// Shared, read-only view over the tones rendered by a [`SineSynth`].
#[derive(Clone)]
pub struct ToneHistory {
    shared: Arc<Mutex<VecDeque<PlayedTone>>>,
}

impl ToneHistory {
    /// Note names of the rendered tones, oldest first.
    pub fn notes(&self) -> Result<Vec<String>> {
        let history = self.lock()?;
        Ok(history.iter().map(|played| played.tone.note.clone()).collect())
    }

    pub fn latest(&self) -> Result<Option<PlayedTone>> {
        let history = self.lock()?;
        Ok(history.back().cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<PlayedTone>>> {
        self.shared
            .lock()
            .map_err(|_| DataVisError::Audio("tone history has been poisoned".into()))
    }
}

impl std::fmt::Debug for ToneHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneHistory").finish()
    }
}
