// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The note event, the atomic unit of a song.

use serde::{Deserialize, Serialize};

/// Event kind of a stored note.
///
/// Only note-ons and note-offs live in the song; the MIDI channel is
/// deliberately not stored and is derived from the instrument at
/// emission time. The derived ordering (on before off) is the tie-break
/// for notes sharing a quantized position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NoteStatus {
    /// Note On
    #[serde(rename = "note_on")]
    NoteOn,
    /// Note Off
    #[serde(rename = "note_off")]
    NoteOff,
}

/// A timed note event.
///
/// Carries both the real position recorded at capture time and the
/// quantized position derived by the quantization engine. The quantized
/// fields are the single source of truth for ordering, playback timing,
/// and bar-region addressing; the real fields survive for real-time
/// export and re-quantization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Instrument index 0-7; 0 is the drum instrument
    pub instrument: u8,
    /// Note on or note off
    pub status: NoteStatus,
    /// MIDI key number (0-127)
    pub key: u8,
    /// MIDI velocity (0-127)
    pub velocity: u8,
    /// Display tag, round-tripped through persistence only
    pub color: u8,
    /// Real bar at capture time
    pub bar: u16,
    /// Real beat within the bar at capture time
    pub beat: u16,
    /// Real tick within the bar at capture time (not reset per beat)
    pub tick: u32,
    /// Quantized bar
    pub qbar: u16,
    /// Quantized beat within the bar
    pub qbeat: u16,
    /// Quantized tick within the bar
    pub qtick: u32,
    /// Set when a just-recorded note was already emitted at capture
    /// time; the playback window covering that position skips it once.
    /// Transient, never persisted.
    #[serde(skip)]
    pub played: bool,
}

impl Note {
    /// Composite sort key: quantized position, note-on before note-off
    pub fn sort_key(&self) -> (u16, u32, NoteStatus) {
        (self.qbar, self.qtick, self.status)
    }

    /// Absolute real position in ticks since bar 0
    pub fn real_ticks(&self, ticks_per_bar: u64) -> u64 {
        self.bar as u64 * ticks_per_bar + self.tick as u64
    }

    /// Absolute quantized position in ticks since bar 0
    pub fn quantized_ticks(&self, ticks_per_bar: u64) -> u64 {
        self.qbar as u64 * ticks_per_bar + self.qtick as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_at(qbar: u16, qtick: u32, status: NoteStatus) -> Note {
        Note {
            instrument: 0,
            status,
            key: 60,
            velocity: 100,
            color: 0,
            bar: qbar,
            beat: 0,
            tick: qtick,
            qbar,
            qbeat: 0,
            qtick,
            played: false,
        }
    }

    #[test]
    fn test_sort_key_orders_on_before_off() {
        let on = note_at(2, 480, NoteStatus::NoteOn);
        let off = note_at(2, 480, NoteStatus::NoteOff);
        assert!(on.sort_key() < off.sort_key());
    }

    #[test]
    fn test_absolute_tick_positions() {
        let note = note_at(3, 100, NoteStatus::NoteOn);
        assert_eq!(note.quantized_ticks(1920), 3 * 1920 + 100);
        assert_eq!(note.real_ticks(1920), 3 * 1920 + 100);
    }
}
