// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Click-track note table.
//!
//! A small fixed table of drum notes generated once from the current
//! tempo and time signature, read through the same range-query interface
//! as the song and wrapped over its own short loop.

use super::note::{Note, NoteStatus};
use super::store::SongStore;
use crate::config::Timing;

/// Slots in the metronome table: enough for on/off pairs on up to four
/// beats across the two-bar loop.
pub const METRONOME_CAPACITY: usize = 16;

/// Length of the metronome loop in bars.
pub const METRONOME_BARS: u16 = 2;

/// Accented click key (GM high woodblock)
const CLICK_ACCENT_KEY: u8 = 76;
/// Regular click key (GM low woodblock)
const CLICK_KEY: u8 = 77;

/// The generated click track.
#[derive(Debug, Clone)]
pub struct Metronome {
    store: SongStore,
}

impl Metronome {
    /// Generate the table from the current timing.
    ///
    /// One accented click on the downbeat of bar 0, regular clicks on
    /// every other beat of both bars, each click paired with a note-off
    /// half a beat later. At most four beats per bar fit the table.
    pub fn generate(timing: &Timing) -> Self {
        let mut store = SongStore::with_capacity(METRONOME_CAPACITY);
        let tpb = timing.ticks_per_beat;
        let beats = timing.beats_per_bar.min(4) as u16;

        for bar in 0..METRONOME_BARS {
            for beat in 0..beats {
                let accent = bar == 0 && beat == 0;
                let key = if accent { CLICK_ACCENT_KEY } else { CLICK_KEY };
                let velocity = if accent { 127 } else { 100 };
                let tick = beat as u32 * tpb;

                store.insert(click(bar, beat, tick, key, velocity, NoteStatus::NoteOn));
                store.insert(click(
                    bar,
                    beat,
                    tick + tpb / 2,
                    key,
                    0,
                    NoteStatus::NoteOff,
                ));
            }
        }

        Self { store }
    }

    /// Clicks within `[(b1, t1), (b2, t2))`, bar arguments taken modulo
    /// the metronome's loop length.
    ///
    /// A window that wraps across the loop boundary splits into two
    /// sub-ranges; the iterator chains them without allocating.
    pub fn range(&self, b1: u16, t1: u32, b2: u16, t2: u32) -> impl Iterator<Item = &Note> {
        let m1 = b1 % METRONOME_BARS;
        let m2 = b2 % METRONOME_BARS;

        let (first, second) = if m1 < m2 || (m1 == m2 && t1 <= t2 && b1 == b2) {
            (self.store.range(m1, t1, m2, t2), &[][..])
        } else {
            // wrapped window: tail of the loop, then its head
            (
                self.store.range(m1, t1, METRONOME_BARS, 0),
                self.store.range(0, 0, m2, t2),
            )
        };
        first.iter().chain(second.iter())
    }

    /// Number of clicks in the table
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

fn click(bar: u16, beat: u16, tick: u32, key: u8, velocity: u8, status: NoteStatus) -> Note {
    Note {
        instrument: 0,
        status,
        key,
        velocity,
        color: 0,
        bar,
        beat,
        tick,
        qbar: bar,
        qbeat: beat,
        qtick: tick,
        played: false,
    }
}
