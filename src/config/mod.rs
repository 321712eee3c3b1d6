// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tempo, time-signature, and quantization configuration.
//!
//! A single [`Timing`] value holds the process-wide transport settings:
//! beats per bar, beat type, grid resolution in ticks, base tempo, and a
//! non-destructive tempo multiplier. It is owned by the sequencer and
//! mutated only between plays or via tap-tempo / tempo nudge commands.

use serde::{Deserialize, Serialize};

/// Lower bound of the non-destructive tempo multiplier.
pub const MIN_BPM_MULTIPLIER: f64 = 0.1;
/// Upper bound of the non-destructive tempo multiplier.
pub const MAX_BPM_MULTIPLIER: f64 = 3.0;

/// Tempo and time-signature settings for the transport timeline.
///
/// There is no attempt to keep a true tempo map; the defaults are
/// march time, 4/4 at 120 BPM.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Timing {
    /// Time signature numerator
    #[serde(default = "default_beats_per_bar")]
    pub beats_per_bar: u32,
    /// Time signature denominator (4 = quarter note gets the beat)
    #[serde(default = "default_beat_type")]
    pub beat_type: u32,
    /// Grid resolution: ticks per beat
    #[serde(default = "default_ticks_per_beat")]
    pub ticks_per_beat: u32,
    /// Base tempo in BPM
    #[serde(default = "default_tempo")]
    pub beats_per_minute: f64,
    /// Non-destructive multiplier applied on top of the base tempo
    #[serde(default = "default_multiplier")]
    pub bpm_multiplier: f64,
}

fn default_beats_per_bar() -> u32 {
    4
}
fn default_beat_type() -> u32 {
    4
}
fn default_ticks_per_beat() -> u32 {
    480
}
fn default_tempo() -> f64 {
    120.0
}
fn default_multiplier() -> f64 {
    1.0
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            beats_per_bar: default_beats_per_bar(),
            beat_type: default_beat_type(),
            ticks_per_beat: default_ticks_per_beat(),
            beats_per_minute: default_tempo(),
            bpm_multiplier: default_multiplier(),
        }
    }
}

impl Timing {
    /// Effective tempo: base BPM scaled by the clamped multiplier
    pub fn effective_bpm(&self) -> f64 {
        self.beats_per_minute * self.bpm_multiplier.clamp(MIN_BPM_MULTIPLIER, MAX_BPM_MULTIPLIER)
    }

    /// Ticks per bar at the current time signature
    pub fn ticks_per_bar(&self) -> u64 {
        self.beats_per_bar as u64 * self.ticks_per_beat as u64
    }

    /// Ticks per quarter note, regardless of which note gets the beat.
    ///
    /// The MIDI clock runs at 24 pulses per quarter note independent of
    /// the time signature, so the transport needs this even in x/8 time.
    pub fn ticks_per_quarter(&self) -> f64 {
        self.ticks_per_beat as f64 * self.beat_type as f64 / 4.0
    }

    /// Nudge the tempo multiplier by a delta, clamped to [0.1, 3.0]
    pub fn adjust_multiplier(&mut self, delta: f64) {
        self.bpm_multiplier =
            (self.bpm_multiplier + delta).clamp(MIN_BPM_MULTIPLIER, MAX_BPM_MULTIPLIER);
    }

    /// Set the base tempo
    pub fn set_bpm(&mut self, bpm: f64) {
        self.beats_per_minute = bpm;
    }
}

/// Quantization settings for note capture.
///
/// Resolutions are expressed directly as grid subdivisions per beat;
/// zero means free timing. Note-offs played after a note-on get their
/// own, usually finer, resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuantizeSettings {
    /// Master switch; when false, notes keep their raw timing
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Subdivisions per beat for note-on events (0 = free timing)
    #[serde(default = "default_resolution")]
    pub resolution: u32,
    /// Subdivisions per beat for note-off events (0 = free timing)
    #[serde(default = "default_resolution")]
    pub resolution_off: u32,
}

fn default_enabled() -> bool {
    true
}
fn default_resolution() -> u32 {
    4
}

impl Default for QuantizeSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            resolution: default_resolution(),
            resolution_off: default_resolution(),
        }
    }
}

impl QuantizeSettings {
    /// Resolution in force for note-on capture
    pub fn effective_resolution(&self) -> u32 {
        if self.enabled {
            self.resolution
        } else {
            0
        }
    }

    /// Resolution in force for note-off capture
    pub fn effective_resolution_off(&self) -> u32 {
        if self.enabled {
            self.resolution_off
        } else {
            0
        }
    }
}
