// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! GRIDSEQ - a loop/bar-based MIDI step sequencer core.
//!
//! A grid controller and a MIDI keyboard drive recording, quantized
//! playback, and bar-level editing of an 8-instrument song, synchronized
//! to a transport clock derived from a host audio engine's periodic
//! callback. This crate is the symbolic core: note storage, quantization,
//! transport math, bar-region editing, and the bounded event buffers the
//! callback drains into the host's MIDI ports.
//!
//! Hardware pad decoding, LED color mapping, port plumbing, and the byte
//! layout of save files and standard MIDI files are the host integration's
//! job; the core operates purely on note events and integer time.
//!
//! Everything here runs on one logical thread: the host invokes
//! [`sequencer::Sequencer::process_block`] once per audio block from its
//! real-time callback, and any control-surface or disk path that touches
//! the same state must be staged onto that thread as a
//! [`control::Command`].

pub mod buffers;
pub mod config;
pub mod control;
pub mod edit;
pub mod export;
pub mod midi;
pub mod persist;
pub mod quantize;
pub mod sequencer;
pub mod song;
pub mod transport;

/// Number of instruments in a song; instrument 0 is the drum instrument.
pub const NUM_INSTRUMENTS: usize = 8;

/// Bars shown per controller page.
pub const BARS_PER_PAGE: u16 = 64;

/// Number of controller pages.
pub const NUM_PAGES: u16 = 8;

/// Total addressable bars: 8 pages of 64 bars. The transport wraps here.
pub const TOTAL_BARS: u16 = BARS_PER_PAGE * NUM_PAGES;

pub use buffers::{EventBuffer, OutboundBuffers};
pub use config::{QuantizeSettings, Timing};
pub use control::{Command, Direction};
pub use edit::{BarEditor, CopyBuffer};
pub use export::{delta_events, DeltaEvent, ExportOrder};
pub use midi::MidiMessage;
pub use persist::{LoadedSong, PersistError, SongDocument};
pub use sequencer::Sequencer;
pub use song::{Metronome, Note, NoteStatus, SongStore};
pub use transport::{Position, TapTempo, Transport};
