use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{DataVisError, Result};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const A4_HZ: f64 = 440.0;
const A4_MIDI: f64 = 69.0;

/// Describes how element values are routed to pitches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneMapping {
    /// Hertz added per unit of value.
    pub hz_per_unit: f32,
    /// Frequency of a zero value.
    pub offset_hz: f32,
    /// How long each tone sounds, in milliseconds.
    pub duration_ms: u64,
}

impl Default for ToneMapping {
    fn default() -> Self {
        // An eighth note at 120 bpm.
        Self {
            hz_per_unit: 50.0,
            offset_hz: 200.0,
            duration_ms: 250,
        }
    }
}

/// Concrete tone request handed to a [`crate::TonePlayer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub value: i64,
    pub frequency_hz: f32,
    pub note: String,
    pub duration: Duration,
}

impl ToneMapping {
    pub fn frequency(&self, value: i64) -> f32 {
        value as f32 * self.hz_per_unit + self.offset_hz
    }

    /// Maps `value` to a tone snapped to the nearest equal-tempered note.
    pub fn tone_for(&self, value: i64) -> Result<Tone> {
        let raw = self.frequency(value);
        let midi = midi_number(raw)?;
        Ok(Tone {
            value,
            frequency_hz: midi_frequency(midi),
            note: note_name(midi),
            duration: Duration::from_millis(self.duration_ms),
        })
    }
}

fn midi_number(frequency_hz: f32) -> Result<i32> {
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return Err(DataVisError::Audio(format!(
            "cannot convert {frequency_hz} Hz to a note"
        )));
    }
    let midi = (A4_MIDI + 12.0 * (f64::from(frequency_hz) / A4_HZ).log2()).round();
    Ok(midi as i32)
}

fn midi_frequency(midi: i32) -> f32 {
    (A4_HZ * 2f64.powf((f64::from(midi) - A4_MIDI) / 12.0)) as f32
}

/// Scientific pitch name such as `A4` or `C#5`.
fn note_name(midi: i32) -> String {
    let name = NOTE_NAMES[midi.rem_euclid(12) as usize];
    let octave = midi.div_euclid(12) - 1;
    format!("{name}{octave}")
}
