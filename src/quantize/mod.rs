// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Quantization engine.
//!
//! Maps raw transport ticks onto a musical grid, either absolutely or
//! relative to the most recent same-instrument event already in the
//! song. Pure functions; the only state consulted is the store passed in
//! for the anchor scan.

use crate::config::{QuantizeSettings, Timing};
use crate::song::{Note, NoteStatus, SongStore};

/// Snap a tick to the nearest point on a grid of `resolution`
/// subdivisions per beat.
///
/// Resolution 0 means free timing and returns the input unchanged. Ties
/// exactly half a step from both neighbors round up to the next grid
/// point. Idempotent: an already-quantized value maps to itself.
pub fn quantize(tick: u64, resolution: u32, ticks_per_beat: u32) -> u64 {
    if resolution == 0 {
        return tick;
    }
    let step = (ticks_per_beat / resolution) as u64;
    if step == 0 {
        return tick;
    }
    (tick + step / 2) / step * step
}

/// Quantize a freshly captured note against the song's recent history.
///
/// Scans the store backward for the most recent event with the same
/// instrument (and, for a note-off, the same key) to use as a time
/// anchor. When one exists, the raw tick difference from the anchor's
/// quantized position is quantized and added back to the anchor;
/// otherwise the absolute position is quantized directly.
///
/// A note-off's quantized offset is clamped to at least one grid step
/// and then pulled back by one tick, so a note-off never lands exactly
/// on a beat or bar boundary and bar-region edits cannot split a
/// sustained note across a bar edge.
///
/// The second return value is true when the quantized timestamp is at or
/// before the raw capture time; the caller must then emit the MIDI event
/// immediately, because playback has already passed that grid point.
pub fn quantize_relative(
    mut note: Note,
    settings: &QuantizeSettings,
    store: &SongStore,
    timing: &Timing,
) -> (Note, bool) {
    let resolution = match note.status {
        NoteStatus::NoteOn => settings.effective_resolution(),
        NoteStatus::NoteOff => settings.effective_resolution_off(),
    };
    let tpb = timing.ticks_per_beat;
    let ticks_per_bar = timing.ticks_per_bar();
    let raw = note.real_ticks(ticks_per_bar);

    let anchor = store
        .notes()
        .iter()
        .rev()
        .find(|n| {
            n.instrument == note.instrument
                && (note.status == NoteStatus::NoteOn || n.key == note.key)
        })
        .map(|n| n.quantized_ticks(ticks_per_bar));

    let quantized = match anchor {
        Some(anchor_ticks) => {
            let offset = quantize(raw.saturating_sub(anchor_ticks), resolution, tpb);
            if note.status == NoteStatus::NoteOff && resolution != 0 {
                // keep the note-off strictly inside its grid cell
                let step = (tpb / resolution) as u64;
                anchor_ticks + offset.max(step) - 1
            } else {
                anchor_ticks + offset
            }
        }
        None => quantize(raw, resolution, tpb),
    };

    note.qbar = (quantized / ticks_per_bar) as u16;
    note.qtick = (quantized % ticks_per_bar) as u32;
    note.qbeat = (note.qtick / tpb) as u16;

    (note, quantized <= raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(
        instrument: u8,
        bar: u16,
        tick: u32,
        key: u8,
        status: NoteStatus,
    ) -> Note {
        Note {
            instrument,
            status,
            key,
            velocity: 100,
            color: 0,
            bar,
            beat: 0,
            tick,
            qbar: 0,
            qbeat: 0,
            qtick: 0,
            played: false,
        }
    }

    #[test]
    fn test_quantize_rounds_to_nearest() {
        // ticks_per_beat = 480, resolution 4: step 120, half 60
        assert_eq!(quantize(100, 4, 480), 120);
        assert_eq!(quantize(50, 4, 480), 0);
    }

    #[test]
    fn test_quantize_tie_rounds_up() {
        assert_eq!(quantize(60, 4, 480), 120);
    }

    #[test]
    fn test_quantize_zero_resolution_is_free_timing() {
        assert_eq!(quantize(137, 0, 480), 137);
    }

    #[test]
    fn test_quantize_is_idempotent() {
        for tick in [0u64, 17, 60, 100, 479, 480, 961] {
            for resolution in [1u32, 2, 4, 8] {
                let once = quantize(tick, resolution, 480);
                assert_eq!(quantize(once, resolution, 480), once);
            }
        }
    }

    #[test]
    fn test_absolute_quantization_without_anchor() {
        let store = SongStore::new();
        let timing = Timing::default();
        let settings = QuantizeSettings::default();

        let raw = captured(1, 2, 100, 60, NoteStatus::NoteOn);
        let (note, emit_now) = quantize_relative(raw, &settings, &store, &timing);

        assert_eq!(note.qbar, 2);
        assert_eq!(note.qtick, 120);
        assert_eq!(note.qbeat, 0);
        // quantized past the capture point: playback emits it later
        assert!(!emit_now);
    }

    #[test]
    fn test_quantized_into_past_requests_immediate_emit() {
        let store = SongStore::new();
        let timing = Timing::default();
        let settings = QuantizeSettings::default();

        let raw = captured(1, 2, 50, 60, NoteStatus::NoteOn);
        let (note, emit_now) = quantize_relative(raw, &settings, &store, &timing);

        assert_eq!(note.qtick, 0);
        assert!(emit_now);
    }

    #[test]
    fn test_relative_quantization_uses_anchor_offset() {
        let mut store = SongStore::new();
        let timing = Timing::default();
        let settings = QuantizeSettings::default();

        // anchor: note-on already quantized to (bar 1, tick 480)
        let (anchor, _) = quantize_relative(
            captured(3, 1, 490, 62, NoteStatus::NoteOn),
            &settings,
            &store,
            &timing,
        );
        assert_eq!((anchor.qbar, anchor.qtick), (1, 480));
        store.insert(anchor);

        // raw capture 230 ticks after the anchor's quantized position;
        // the offset snaps to 240, not the absolute tick
        let raw = captured(3, 1, 710, 64, NoteStatus::NoteOn);
        let (note, _) = quantize_relative(raw, &settings, &store, &timing);
        assert_eq!((note.qbar, note.qtick), (1, 720));
    }

    #[test]
    fn test_note_off_never_lands_on_grid_boundary() {
        let mut store = SongStore::new();
        let timing = Timing::default();
        let settings = QuantizeSettings::default();

        let (on, _) = quantize_relative(
            captured(2, 1, 479, 60, NoteStatus::NoteOn),
            &settings,
            &store,
            &timing,
        );
        store.insert(on);

        // released only 30 ticks later: offset clamps to one full step,
        // then pulls back one tick
        let (off, _) = quantize_relative(
            captured(2, 1, 510, 60, NoteStatus::NoteOff),
            &settings,
            &store,
            &timing,
        );
        assert_eq!(off.qbar, 1);
        assert_eq!(off.qtick, 480 + 120 - 1);
    }

    #[test]
    fn test_note_off_at_bar_edge_stays_inside_bar() {
        let mut store = SongStore::new();
        let timing = Timing::default();
        let settings = QuantizeSettings {
            enabled: true,
            resolution: 1,
            resolution_off: 1,
        };

        // note-on on the last beat of bar 0
        let (on, _) = quantize_relative(
            captured(1, 0, 1440, 60, NoteStatus::NoteOn),
            &settings,
            &store,
            &timing,
        );
        store.insert(on);

        // released right at the bar edge: quantizing would land on bar 1
        // tick 0, the decrement keeps it at the last tick of bar 0
        let (off, _) = quantize_relative(
            captured(1, 0, 1900, 60, NoteStatus::NoteOff),
            &settings,
            &store,
            &timing,
        );
        assert_eq!(off.qbar, 0);
        assert_eq!(off.qtick, 1919);
    }

    #[test]
    fn test_note_off_anchor_matches_key() {
        let mut store = SongStore::new();
        let timing = Timing::default();
        let settings = QuantizeSettings::default();

        let (on_a, _) = quantize_relative(
            captured(1, 0, 0, 60, NoteStatus::NoteOn),
            &settings,
            &store,
            &timing,
        );
        store.insert(on_a);
        let (on_b, _) = quantize_relative(
            captured(1, 0, 240, 64, NoteStatus::NoteOn),
            &settings,
            &store,
            &timing,
        );
        store.insert(on_b);

        // the off for key 60 anchors on its own note-on, not the later one
        let (off, _) = quantize_relative(
            captured(1, 0, 300, 60, NoteStatus::NoteOff),
            &settings,
            &store,
            &timing,
        );
        // offset from anchor 0 is 300 -> 360 with resolution 4... snapped
        // relative to the key-60 anchor at tick 0
        assert_eq!(off.qtick, (quantize(300, 4, 480) - 1) as u32);
    }

    #[test]
    fn test_free_timing_passes_capture_through() {
        let store = SongStore::new();
        let timing = Timing::default();
        let settings = QuantizeSettings {
            enabled: false,
            ..Default::default()
        };

        let raw = captured(5, 3, 777, 61, NoteStatus::NoteOn);
        let (note, emit_now) = quantize_relative(raw, &settings, &store, &timing);
        assert_eq!((note.qbar, note.qtick), (3, 777));
        assert!(emit_now);
    }
}
