// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Bar-region edit engine.
//!
//! Copy, cut, paste, insert, and remove operate per instrument on a
//! half-open bar range `[b1, b2)` of absolute bar indices (already
//! resolved from page/bar pad coordinates by the caller). The engine
//! assumes a stopped transport and a completed selection; the sequencer
//! rejects edit commands while playing or mid-selection.
//!
//! Everything here is a valid no-op when the range or buffer holds no
//! matching notes; nothing is an error.

use crate::song::{Note, SongStore};
use crate::TOTAL_BARS;

/// Practical bound on the number of notes the copy buffer holds.
pub const COPY_CAPACITY: usize = 1_000;

/// Secondary note buffer used by copy/cut/paste.
///
/// Same shape as the song store; bars are always rebased so the first
/// copied bar is bar 0.
#[derive(Debug, Clone)]
pub struct CopyBuffer {
    store: SongStore,
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self {
            store: SongStore::with_capacity(COPY_CAPACITY),
        }
    }
}

impl CopyBuffer {
    /// Create an empty copy buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of notes held
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the buffer holds no notes
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The rebased notes, in sorted order
    pub fn notes(&self) -> &[Note] {
        self.store.notes()
    }

    /// Highest rebased bar in the buffer, 0 when empty
    pub fn last_bar(&self) -> u16 {
        self.store.notes().iter().map(|n| n.qbar).max().unwrap_or(0)
    }

    /// Drop all held notes
    pub fn clear(&mut self) {
        self.store.clear();
    }

    fn push(&mut self, note: Note) -> bool {
        self.store.insert(note)
    }
}

/// Transpose direction for [`BarEditor::transpose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// One semitone up
    Up,
    /// One semitone down
    Down,
}

/// The bar-region edit operations.
///
/// Owns a scratch buffer so that insert/remove-bars, which are built on
/// cut and paste, leave the user-visible copy buffer untouched.
#[derive(Debug, Clone, Default)]
pub struct BarEditor {
    scratch: CopyBuffer,
}

impl BarEditor {
    /// Create an editor with an empty scratch buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `[b1, b2)` for one instrument into the buffer.
    ///
    /// Matches are rebased so the first copied bar is bar 0; the song
    /// is not mutated.
    pub fn copy(
        &self,
        song: &SongStore,
        buffer: &mut CopyBuffer,
        b1: u16,
        b2: u16,
        instrument: u8,
    ) {
        buffer.clear();
        for note in song.range(b1, 0, b2, 0) {
            if note.instrument != instrument {
                continue;
            }
            let mut rebased = *note;
            rebased.qbar -= b1;
            rebased.bar = rebased.bar.saturating_sub(b1);
            buffer.push(rebased);
        }
    }

    /// Copy `[b1, b2)` into the buffer, then delete it from the song.
    pub fn cut(
        &self,
        song: &mut SongStore,
        buffer: &mut CopyBuffer,
        b1: u16,
        b2: u16,
        instrument: u8,
    ) {
        self.copy(song, buffer, b1, b2, instrument);
        self.delete(song, b1, b2, instrument);
    }

    /// Delete `[b1, b2)` for one instrument, compacting the song.
    pub fn delete(&self, song: &mut SongStore, b1: u16, b2: u16, instrument: u8) {
        song.retain(|n| n.instrument != instrument || n.qbar < b1 || n.qbar >= b2);
    }

    /// Paste the buffer into the song starting at `b1`.
    ///
    /// Unless overdubbing, the destination region is deleted first so a
    /// paste never silently merges with pre-existing content. Buffer
    /// notes land with their bars shifted by `b1` and their instrument
    /// reassigned to the destination instrument. Empty buffer: no-op.
    pub fn paste(
        &self,
        song: &mut SongStore,
        buffer: &CopyBuffer,
        b1: u16,
        instrument: u8,
        overdub: bool,
    ) {
        if buffer.is_empty() {
            return;
        }
        if !overdub {
            self.delete(song, b1, b1 + buffer.last_bar() + 1, instrument);
        }
        for note in buffer.notes() {
            let mut placed = *note;
            placed.qbar += b1;
            placed.bar += b1;
            placed.instrument = instrument;
            song.insert(placed);
        }
    }

    /// Shift everything at or after `b1` forward to `b2`, vacating
    /// `[b1, b2)` for the instrument.
    pub fn insert_bars(&mut self, song: &mut SongStore, b1: u16, b2: u16, instrument: u8) {
        let mut scratch = std::mem::take(&mut self.scratch);
        self.cut(song, &mut scratch, b1, TOTAL_BARS, instrument);
        self.paste(song, &scratch, b2, instrument, true);
        scratch.clear();
        self.scratch = scratch;
    }

    /// Delete `[b1, b2)` outright and close the gap by shifting
    /// everything from `b2` onward back to `b1`.
    pub fn remove_bars(&mut self, song: &mut SongStore, b1: u16, b2: u16, instrument: u8) {
        self.delete(song, b1, b2, instrument);
        let mut scratch = std::mem::take(&mut self.scratch);
        self.cut(song, &mut scratch, b2, TOTAL_BARS, instrument);
        self.paste(song, &scratch, b1, instrument, true);
        scratch.clear();
        self.scratch = scratch;
    }

    /// Move every key of the instrument one semitone, saturating at the
    /// ends of the MIDI key range.
    pub fn transpose(&self, song: &mut SongStore, instrument: u8, direction: Direction) {
        for note in song.notes_mut() {
            if note.instrument != instrument {
                continue;
            }
            note.key = match direction {
                Direction::Up => note.key.saturating_add(1).min(127),
                Direction::Down => note.key.saturating_sub(1),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::NoteStatus;

    fn note(instrument: u8, qbar: u16, qtick: u32, key: u8, status: NoteStatus) -> Note {
        Note {
            instrument,
            status,
            key,
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

    fn song_with(notes: &[Note]) -> SongStore {
        let mut song = SongStore::new();
        for n in notes {
            song.insert(*n);
        }
        song
    }

    #[test]
    fn test_copy_rebases_to_bar_zero() {
        let song = song_with(&[
            note(2, 5, 100, 60, NoteStatus::NoteOn),
            note(2, 6, 50, 62, NoteStatus::NoteOn),
            note(3, 5, 0, 40, NoteStatus::NoteOn), // other instrument
        ]);
        let editor = BarEditor::new();
        let mut buffer = CopyBuffer::new();

        editor.copy(&song, &mut buffer, 5, 7, 2);

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.notes()[0].qbar, 0);
        assert_eq!(buffer.notes()[1].qbar, 1);
        assert_eq!(buffer.last_bar(), 1);
        // song untouched
        assert_eq!(song.len(), 3);
    }

    #[test]
    fn test_cut_then_paste_restores_region() {
        let original = [
            note(1, 2, 0, 60, NoteStatus::NoteOn),
            note(1, 2, 479, 60, NoteStatus::NoteOff),
            note(1, 3, 240, 64, NoteStatus::NoteOn),
        ];
        let mut song = song_with(&original);
        let editor = BarEditor::new();
        let mut buffer = CopyBuffer::new();

        editor.cut(&mut song, &mut buffer, 2, 4, 1);
        assert!(song.is_empty());
        assert_eq!(buffer.len(), 3);

        editor.paste(&mut song, &buffer, 2, 1, false);
        assert_eq!(song.len(), original.len());
        for (restored, expected) in song.notes().iter().zip(original.iter()) {
            assert_eq!(restored, expected);
        }
    }

    #[test]
    fn test_paste_clears_destination_unless_overdub() {
        let mut song = song_with(&[
            note(0, 1, 0, 36, NoteStatus::NoteOn),
            note(0, 8, 0, 38, NoteStatus::NoteOn),
        ]);
        let editor = BarEditor::new();
        let mut buffer = CopyBuffer::new();
        editor.copy(&song, &mut buffer, 8, 9, 0);

        // plain paste over bar 1 replaces the existing note
        editor.paste(&mut song, &buffer, 1, 0, false);
        let keys: Vec<u8> = song
            .range(1, 0, 2, 0)
            .iter()
            .map(|n| n.key)
            .collect();
        assert_eq!(keys, vec![38]);

        // overdub merges instead
        editor.paste(&mut song, &buffer, 1, 0, true);
        assert_eq!(song.range(1, 0, 2, 0).len(), 2);
    }

    #[test]
    fn test_paste_reassigns_instrument() {
        let mut song = song_with(&[note(4, 0, 0, 60, NoteStatus::NoteOn)]);
        let editor = BarEditor::new();
        let mut buffer = CopyBuffer::new();

        editor.copy(&song, &mut buffer, 0, 1, 4);
        editor.paste(&mut song, &buffer, 10, 6, false);

        let pasted = song.range(10, 0, 11, 0);
        assert_eq!(pasted.len(), 1);
        assert_eq!(pasted[0].instrument, 6);
    }

    #[test]
    fn test_paste_empty_buffer_is_noop() {
        let mut song = song_with(&[note(0, 1, 0, 60, NoteStatus::NoteOn)]);
        let editor = BarEditor::new();
        let buffer = CopyBuffer::new();

        editor.paste(&mut song, &buffer, 1, 0, false);
        assert_eq!(song.len(), 1);
    }

    #[test]
    fn test_insert_bars_shifts_forward() {
        let mut song = song_with(&[note(2, 5, 100, 60, NoteStatus::NoteOn)]);
        let mut editor = BarEditor::new();

        editor.insert_bars(&mut song, 5, 7, 2);

        assert_eq!(song.len(), 1);
        assert_eq!(song.notes()[0].qbar, 7);
        assert!(song.range(5, 0, 7, 0).is_empty());
    }

    #[test]
    fn test_insert_bars_preserves_copy_buffer() {
        let mut song = song_with(&[note(2, 5, 100, 60, NoteStatus::NoteOn)]);
        let mut editor = BarEditor::new();
        let mut buffer = CopyBuffer::new();
        editor.copy(&song, &mut buffer, 5, 6, 2);

        editor.insert_bars(&mut song, 5, 7, 2);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_remove_bars_closes_gap() {
        let mut song = song_with(&[
            note(1, 2, 0, 60, NoteStatus::NoteOn),
            note(1, 6, 120, 64, NoteStatus::NoteOn),
        ]);
        let mut editor = BarEditor::new();

        // removing [2, 4) drops the bar-2 note and pulls bar 6 to bar 4
        editor.remove_bars(&mut song, 2, 4, 1);

        assert_eq!(song.len(), 1);
        assert_eq!(song.notes()[0].qbar, 4);
        assert_eq!(song.notes()[0].qtick, 120);
    }

    #[test]
    fn test_edits_scoped_to_instrument() {
        let mut song = song_with(&[
            note(0, 3, 0, 36, NoteStatus::NoteOn),
            note(5, 3, 0, 60, NoteStatus::NoteOn),
        ]);
        let mut editor = BarEditor::new();

        editor.remove_bars(&mut song, 3, 4, 5);

        // instrument 0 untouched, instrument 5 removed
        assert_eq!(song.len(), 1);
        assert_eq!(song.notes()[0].instrument, 0);
    }

    #[test]
    fn test_transpose_saturates() {
        let mut song = song_with(&[
            note(1, 0, 0, 126, NoteStatus::NoteOn),
            note(1, 0, 100, 1, NoteStatus::NoteOn),
        ]);
        let editor = BarEditor::new();

        for _ in 0..200 {
            editor.transpose(&mut song, 1, Direction::Up);
        }
        assert!(song.notes().iter().all(|n| n.key == 127));

        for _ in 0..200 {
            editor.transpose(&mut song, 1, Direction::Down);
        }
        assert!(song.notes().iter().all(|n| n.key == 0));
    }

    #[test]
    fn test_empty_range_edits_are_noops() {
        let mut song = song_with(&[note(1, 2, 0, 60, NoteStatus::NoteOn)]);
        let mut editor = BarEditor::new();
        let mut buffer = CopyBuffer::new();

        editor.copy(&song, &mut buffer, 30, 40, 1);
        assert!(buffer.is_empty());

        editor.cut(&mut song, &mut buffer, 30, 40, 1);
        editor.remove_bars(&mut song, 30, 40, 7);
        assert_eq!(song.len(), 1);
    }
}
