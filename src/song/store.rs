// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Capacity-bounded, always-sorted note storage.
//!
//! The store keeps its notes ordered by `(qbar, qtick)` with note-ons
//! preceding note-offs at equal positions. The invariant is maintained
//! incrementally on every insertion, never by a batch sort, so the
//! playback path can binary-search it once per callback.

use tracing::warn;

use super::note::Note;

/// Practical bound on the number of notes in a song.
pub const SONG_CAPACITY: usize = 10_000;

/// An always-sorted sequence of note events.
///
/// Backing storage is pre-sized at construction; the steady-state
/// callback path never allocates.
#[derive(Debug, Clone)]
pub struct SongStore {
    notes: Vec<Note>,
    capacity: usize,
}

impl Default for SongStore {
    fn default() -> Self {
        Self::with_capacity(SONG_CAPACITY)
    }
}

impl SongStore {
    /// Create an empty store with the default capacity
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store bounded at `capacity` notes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            notes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of notes currently stored
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether the store holds no notes
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Maximum number of notes the store accepts
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All notes in sorted order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Remove every note
    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// Insert a note at its sorted position.
    ///
    /// The insertion point is the first index not strictly less than the
    /// incoming `(qbar, qtick, status)` key, so equal notes land before
    /// their duplicates. Returns false (and stores nothing) when the
    /// store is at capacity; a live performance must never stall on a
    /// full buffer.
    pub fn insert(&mut self, note: Note) -> bool {
        if self.notes.len() >= self.capacity {
            warn!(len = self.notes.len(), "song store full, note dropped");
            return false;
        }
        let key = note.sort_key();
        let index = self.notes.partition_point(|n| n.sort_key() < key);
        self.notes.insert(index, note);
        true
    }

    /// First index at or after the composite position `(bar, tick)`.
    ///
    /// This is the bound shared by both ends of [`range`](Self::range):
    /// a note is at-or-after when `qbar > bar`, or `qbar == bar` and
    /// `qtick >= tick`.
    fn first_at_or_after(&self, bar: u16, tick: u32) -> usize {
        self.notes
            .partition_point(|n| n.qbar < bar || (n.qbar == bar && n.qtick < tick))
    }

    /// Notes within the half-open interval `[(b1, t1), (b2, t2))`.
    ///
    /// An empty intersection yields an empty slice, never an error. This
    /// is the query the playback callback issues once per block with the
    /// previous and current transport positions.
    pub fn range(&self, b1: u16, t1: u32, b2: u16, t2: u32) -> &[Note] {
        let start = self.first_at_or_after(b1, t1);
        let end = self.first_at_or_after(b2, t2);
        if start >= end {
            &[]
        } else {
            &self.notes[start..end]
        }
    }

    /// Mutable variant of [`range`](Self::range), used by the playback
    /// path to clear per-note emission flags as it scans.
    pub(crate) fn range_mut(&mut self, b1: u16, t1: u32, b2: u16, t2: u32) -> &mut [Note] {
        let start = self.first_at_or_after(b1, t1);
        let end = self.first_at_or_after(b2, t2).max(start);
        &mut self.notes[start..end]
    }

    /// Keep only notes satisfying the predicate, compacting in place.
    ///
    /// Single-pass index-based compaction; there is no intermediate
    /// marked state observable between calls.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Note) -> bool,
    {
        self.notes.retain(f);
    }

    /// Mutable access for in-place edits that preserve the sort key
    /// (transpose touches keys, never positions).
    pub(crate) fn notes_mut(&mut self) -> &mut [Note] {
        &mut self.notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::note::NoteStatus;

    fn note(instrument: u8, qbar: u16, qtick: u32, status: NoteStatus) -> Note {
        Note {
            instrument,
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
    fn test_insertion_keeps_sorted_order() {
        let mut store = SongStore::new();
        store.insert(note(0, 2, 100, NoteStatus::NoteOn));
        store.insert(note(0, 1, 50, NoteStatus::NoteOn));
        store.insert(note(0, 2, 50, NoteStatus::NoteOn));

        let positions: Vec<(u16, u32)> = store.notes().iter().map(|n| (n.qbar, n.qtick)).collect();
        assert_eq!(positions, vec![(1, 50), (2, 50), (2, 100)]);
    }

    #[test]
    fn test_note_on_sorts_before_note_off_at_equal_position() {
        let mut store = SongStore::new();
        store.insert(note(0, 4, 960, NoteStatus::NoteOff));
        store.insert(note(1, 4, 960, NoteStatus::NoteOn));

        assert_eq!(store.notes()[0].status, NoteStatus::NoteOn);
        assert_eq!(store.notes()[1].status, NoteStatus::NoteOff);
    }

    #[test]
    fn test_capacity_bound_is_silent_noop() {
        let mut store = SongStore::with_capacity(2);
        assert!(store.insert(note(0, 0, 0, NoteStatus::NoteOn)));
        assert!(store.insert(note(0, 1, 0, NoteStatus::NoteOn)));
        assert!(!store.insert(note(0, 2, 0, NoteStatus::NoteOn)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_range_end_is_exclusive() {
        let mut store = SongStore::new();
        store.insert(note(0, 4, 960, NoteStatus::NoteOn));

        assert!(store.range(4, 0, 4, 960).is_empty());
        assert_eq!(store.range(4, 0, 4, 961).len(), 1);
    }

    #[test]
    fn test_range_spans_bars() {
        let mut store = SongStore::new();
        store.insert(note(0, 3, 960, NoteStatus::NoteOn));
        store.insert(note(0, 4, 0, NoteStatus::NoteOn));
        store.insert(note(0, 4, 960, NoteStatus::NoteOn));
        store.insert(note(0, 6, 1440, NoteStatus::NoteOn));

        // start bound is inclusive, end bound exclusive
        assert_eq!(store.range(3, 960, 4, 960).len(), 2);
        // whole song
        assert_eq!(store.range(0, 0, 7, 0).len(), 4);
        // nothing before the first bar
        assert!(store.range(1, 0, 1, 480).is_empty());
        // nothing after the last bar
        assert!(store.range(7, 0, 7, 480).is_empty());
    }

    #[test]
    fn test_range_on_empty_store() {
        let store = SongStore::new();
        assert!(store.range(0, 0, 512, 0).is_empty());
    }

    #[test]
    fn test_retain_compacts() {
        let mut store = SongStore::new();
        store.insert(note(0, 1, 0, NoteStatus::NoteOn));
        store.insert(note(1, 1, 10, NoteStatus::NoteOn));
        store.insert(note(0, 2, 0, NoteStatus::NoteOn));

        store.retain(|n| n.instrument != 0);
        assert_eq!(store.len(), 1);
        assert_eq!(store.notes()[0].instrument, 1);
    }
}
