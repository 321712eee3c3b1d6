// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Logical control commands.
//!
//! The control-surface decoder (out of scope here) turns raw pad and key
//! events into these commands; the core never interprets pad coordinates
//! or LED colors. Commands are consumed by the sequencer at the top of a
//! callback, which keeps every mutation of shared state on the one
//! logical real-time thread.

pub use crate::edit::Direction;
use crate::song::NoteStatus;

/// A command delivered to the sequencer.
///
/// Edit commands operate on the current bar selection and instrument
/// held by the sequencer; the decoder completes the selection gesture
/// before issuing them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// A note played on the MIDI keyboard
    RecordNote {
        status: NoteStatus,
        key: u8,
        velocity: u8,
    },
    /// A completed bar-range selection, inclusive absolute bar indices
    SelectBarRange { from: u16, to: u16 },
    /// Switch the active instrument
    SelectInstrument { instrument: u8 },
    /// Copy the selection into the copy buffer
    Copy,
    /// Copy the selection, then delete it from the song
    Cut,
    /// Paste the copy buffer at the start of the selection
    Paste { overdub: bool },
    /// Shift bars forward, vacating the selection
    InsertBars,
    /// Delete the selection and close the gap
    RemoveBars,
    /// Transpose one instrument a semitone up or down
    Transpose { instrument: u8, direction: Direction },
    /// Start playing from a bar
    Play { start_bar: u16 },
    /// Stop playback
    Stop,
    /// Toggle recording of incoming keyboard notes
    ToggleRecord,
    /// Toggle the click track
    ToggleMetronome,
    /// Toggle quantized capture
    ToggleQuantize,
    /// Toggle fixed-velocity capture
    ToggleFixedVelocity,
    /// Mute or unmute one instrument
    ToggleMute { instrument: u8 },
    /// A tap of the tempo pad, timestamped in frames
    TapTempo { frame_time: u64 },
    /// Nudge the tempo multiplier
    AdjustTempoMultiplier { delta: f64 },
}
