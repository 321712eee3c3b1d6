// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Delta-time event export.
//!
//! Flattens the song into a delta-encoded event list, the form a
//! standard-MIDI-file writer or an external renderer consumes. Emitting
//! the actual SMF byte layout is a caller concern.

use tracing::warn;

use crate::config::Timing;
use crate::midi::instrument_channel;
use crate::song::{NoteStatus, SongStore};

/// Which timeline the export follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOrder {
    /// Quantized positions, the store's native order
    Quantized,
    /// Real capture positions, preserving the performance feel
    RealTime,
}

/// One exported event, timed relative to its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaEvent {
    /// Ticks since the previous event (0 for the first)
    pub delta_ticks: u64,
    /// MIDI channel derived from the note's instrument
    pub channel: u8,
    pub key: u8,
    pub velocity: u8,
    /// True for note-on, false for note-off
    pub note_on: bool,
}

/// Flatten the song into delta-timed events.
///
/// Events come out in the store's order. On the quantized timeline
/// deltas are non-negative by the store's sort invariant; on the real
/// timeline a note quantized ahead of a neighbor's capture position can
/// produce a negative raw delta, which is clamped to zero and logged.
pub fn delta_events(song: &SongStore, timing: &Timing, order: ExportOrder) -> Vec<DeltaEvent> {
    let ticks_per_bar = timing.ticks_per_bar();
    let mut events = Vec::with_capacity(song.len());
    let mut previous: u64 = 0;

    for note in song.notes() {
        let at = match order {
            ExportOrder::Quantized => note.quantized_ticks(ticks_per_bar),
            ExportOrder::RealTime => note.real_ticks(ticks_per_bar),
        };
        let delta_ticks = match at.checked_sub(previous) {
            Some(delta) => delta,
            None => {
                warn!(at, previous, "negative export delta clamped to zero");
                0
            }
        };
        previous = previous.max(at);

        events.push(DeltaEvent {
            delta_ticks,
            channel: instrument_channel(note.instrument),
            key: note.key,
            velocity: note.velocity,
            note_on: note.status == NoteStatus::NoteOn,
        });
    }

    events
}
