// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The per-callback sequencer.
//!
//! Owns every piece of process-wide state - song, copy buffer, timing,
//! transport, outbound buffers - and exposes the three entry points the
//! host integration calls from its real-time thread, in this order per
//! audio block:
//!
//! 1. [`Sequencer::note_input`] for each inbound keyboard event
//! 2. [`Sequencer::handle_command`] for each decoded controller command
//! 3. [`Sequencer::process_block`] with the block's frame count
//!
//! after which the host drains [`Sequencer::buffers`] channel by channel
//! into its outbound ports. Inbound events are processed before the
//! transport advance drains due events, so a live-played note and a
//! simultaneously due recorded note keep their source-stream order.
//!
//! Nothing in here allocates in the steady state: the stores and buffers
//! are pre-sized at construction.

use tracing::{debug, warn};

use crate::buffers::OutboundBuffers;
use crate::config::{QuantizeSettings, Timing};
use crate::control::Command;
use crate::edit::{BarEditor, CopyBuffer};
use crate::midi::{instrument_channel, messages, MidiMessage};
use crate::persist::{PersistError, SongDocument};
use crate::quantize::quantize_relative;
use crate::song::{Metronome, Note, NoteStatus, SongStore};
use crate::transport::{Position, TapTempo, Transport};
use crate::{NUM_INSTRUMENTS, TOTAL_BARS};

/// Default General MIDI programs for the 8 instruments: drums, piano,
/// electric piano, organ, fingered bass, clean guitar, strings, brass.
const DEFAULT_PROGRAMS: [u8; NUM_INSTRUMENTS] = [0, 0, 2, 16, 33, 27, 48, 61];

/// Default channel volume.
const DEFAULT_VOLUME: u8 = 100;

/// Velocity used when fixed-velocity capture is on.
const FIXED_VELOCITY: u8 = 100;

/// The sequencer core.
pub struct Sequencer {
    timing: Timing,
    quantize: QuantizeSettings,
    song: SongStore,
    copy: CopyBuffer,
    editor: BarEditor,
    metronome: Metronome,
    transport: Transport,
    tap: TapTempo,
    /// Outbound channel buffers, drained by the host every callback
    pub buffers: OutboundBuffers,
    frame_rate: u32,
    recording: bool,
    metronome_on: bool,
    fixed_velocity: bool,
    current_instrument: u8,
    /// Completed bar selection, inclusive absolute indices
    selection: Option<(u16, u16)>,
    muted: [bool; NUM_INSTRUMENTS],
    programs: [u8; NUM_INSTRUMENTS],
    volumes: [u8; NUM_INSTRUMENTS],
    prev_position: Position,
}

impl Sequencer {
    /// Create a sequencer for a host running at `frame_rate`.
    ///
    /// The instrument program changes and channel volumes are staged
    /// immediately so the first drain configures the synthesizer.
    pub fn new(frame_rate: u32) -> Self {
        let timing = Timing::default();
        let mut sequencer = Self {
            metronome: Metronome::generate(&timing),
            timing,
            quantize: QuantizeSettings::default(),
            song: SongStore::new(),
            copy: CopyBuffer::new(),
            editor: BarEditor::new(),
            transport: Transport::new(),
            tap: TapTempo::new(),
            buffers: OutboundBuffers::new(),
            frame_rate,
            recording: false,
            metronome_on: false,
            fixed_velocity: false,
            current_instrument: 0,
            selection: None,
            muted: [false; NUM_INSTRUMENTS],
            programs: DEFAULT_PROGRAMS,
            volumes: [DEFAULT_VOLUME; NUM_INSTRUMENTS],
            prev_position: Position::default(),
        };
        sequencer.stage_programs();
        sequencer
    }

    /// The song store
    pub fn song(&self) -> &SongStore {
        &self.song
    }

    /// The copy buffer
    pub fn copy_buffer(&self) -> &CopyBuffer {
        &self.copy
    }

    /// The timing configuration
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// The quantization settings
    pub fn quantize_settings(&self) -> &QuantizeSettings {
        &self.quantize
    }

    /// The transport
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Whether keyboard input is being recorded
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// The active instrument
    pub fn current_instrument(&self) -> u8 {
        self.current_instrument
    }

    /// The completed bar selection, if any
    pub fn selection(&self) -> Option<(u16, u16)> {
        self.selection
    }

    /// Handle one inbound keyboard note.
    ///
    /// The note is always echoed to the keyboard channel. When recording
    /// while playing, it is quantized against the song's recent history
    /// and inserted; a note quantized at or before its capture time is
    /// emitted immediately, one quantized into the future plays when the
    /// transport reaches its grid point. Outside of recording it plays
    /// straight.
    pub fn note_input(&mut self, status: NoteStatus, key: u8, velocity: u8) {
        let velocity = match status {
            NoteStatus::NoteOn if self.fixed_velocity => FIXED_VELOCITY,
            _ => velocity,
        };
        let channel = instrument_channel(self.current_instrument);
        let message = match status {
            NoteStatus::NoteOn => MidiMessage::note_on(channel, key, velocity),
            NoteStatus::NoteOff => MidiMessage::note_off(channel, key, velocity),
        };
        self.buffers.keyboard.push(message);

        if self.recording && self.transport.is_playing() {
            let position = self.transport.position();
            let captured = Note {
                instrument: self.current_instrument,
                status,
                key,
                velocity,
                color: 0,
                bar: position.bar,
                beat: position.beat,
                tick: position.tick,
                qbar: 0,
                qbeat: 0,
                qtick: 0,
                played: false,
            };
            let (mut note, emit_now) =
                quantize_relative(captured, &self.quantize, &self.song, &self.timing);
            if emit_now {
                self.buffers.instrument.push(message);
                // quantized exactly onto the capture position: the next
                // playback window starts there inclusively and would
                // trigger the note a second time
                if note.qbar == note.bar && note.qtick == note.tick {
                    note.played = true;
                }
            }
            self.song.insert(note);
        } else {
            self.buffers.instrument.push(message);
        }
    }

    /// Apply one decoded controller command.
    ///
    /// Bar edits are rejected while the transport is rolling; the edit
    /// engine assumes a stopped, fully-selected context.
    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::RecordNote {
                status,
                key,
                velocity,
            } => self.note_input(status, key, velocity),
            Command::SelectBarRange { from, to } => {
                let low = from.min(to).min(TOTAL_BARS - 1);
                let high = from.max(to).min(TOTAL_BARS - 1);
                self.selection = Some((low, high));
            }
            Command::SelectInstrument { instrument } => {
                self.current_instrument = instrument % NUM_INSTRUMENTS as u8;
            }
            Command::Copy => {
                if let Some((b1, b2)) = self.editable_selection("copy") {
                    self.editor
                        .copy(&self.song, &mut self.copy, b1, b2, self.current_instrument);
                }
            }
            Command::Cut => {
                if let Some((b1, b2)) = self.editable_selection("cut") {
                    self.editor.cut(
                        &mut self.song,
                        &mut self.copy,
                        b1,
                        b2,
                        self.current_instrument,
                    );
                }
            }
            Command::Paste { overdub } => {
                if let Some((b1, _)) = self.editable_selection("paste") {
                    self.editor.paste(
                        &mut self.song,
                        &self.copy,
                        b1,
                        self.current_instrument,
                        overdub,
                    );
                }
            }
            Command::InsertBars => {
                if let Some((b1, b2)) = self.editable_selection("insert bars") {
                    self.editor
                        .insert_bars(&mut self.song, b1, b2, self.current_instrument);
                }
            }
            Command::RemoveBars => {
                if let Some((b1, b2)) = self.editable_selection("remove bars") {
                    self.editor
                        .remove_bars(&mut self.song, b1, b2, self.current_instrument);
                }
            }
            Command::Transpose {
                instrument,
                direction,
            } => {
                if self.transport.is_playing() {
                    warn!("transpose rejected while playing");
                } else {
                    self.editor.transpose(&mut self.song, instrument, direction);
                }
            }
            Command::Play { start_bar } => self.start_play(start_bar),
            Command::Stop => self.stop_play(),
            Command::ToggleRecord => self.recording = !self.recording,
            Command::ToggleMetronome => self.metronome_on = !self.metronome_on,
            Command::ToggleQuantize => self.quantize.enabled = !self.quantize.enabled,
            Command::ToggleFixedVelocity => self.fixed_velocity = !self.fixed_velocity,
            Command::ToggleMute { instrument } => {
                let index = instrument as usize % NUM_INSTRUMENTS;
                self.muted[index] = !self.muted[index];
            }
            Command::TapTempo { frame_time } => {
                if let Some(bpm) = self.tap.tap(frame_time, self.frame_rate) {
                    debug!(bpm, "tap tempo");
                    self.timing.set_bpm(bpm);
                }
            }
            Command::AdjustTempoMultiplier { delta } => self.timing.adjust_multiplier(delta),
        }
    }

    /// Advance one audio block.
    ///
    /// Advances the transport by the elapsed frame count, stages a MIDI
    /// clock tick when the 24-PPQN phase crosses a boundary, and while
    /// playing range-queries the song and metronome for due events and
    /// pushes them to the outbound instrument buffer.
    pub fn process_block(&mut self, elapsed_frames: u32) {
        let was = self.prev_position;
        let was_playing = self.transport.is_playing();
        let (position, pulse) =
            self.transport.advance(elapsed_frames, &self.timing, self.frame_rate);

        if pulse {
            self.buffers
                .clock
                .push(MidiMessage::realtime(messages::TIMING_CLOCK));
            self.buffers
                .keyboard_clock
                .push(MidiMessage::realtime(messages::TIMING_CLOCK));
        }

        if was_playing {
            if position.bar >= was.bar {
                self.emit_due(was.bar, was.tick, position.bar, position.tick);
            } else {
                // wrapped past the last addressable bar
                self.emit_due(was.bar, was.tick, TOTAL_BARS, 0);
                self.emit_due(0, 0, position.bar, position.tick);
            }
            self.prev_position = position;
        }
    }

    /// Emit song and metronome events due in `[(b1, t1), (b2, t2))`.
    ///
    /// A note flagged as already played at capture time is skipped once
    /// and unflagged, so it still sounds on later loop passes.
    fn emit_due(&mut self, b1: u16, t1: u32, b2: u16, t2: u32) {
        for note in self.song.range_mut(b1, t1, b2, t2) {
            if note.played {
                note.played = false;
                continue;
            }
            if self.muted[note.instrument as usize % NUM_INSTRUMENTS] {
                continue;
            }
            let channel = instrument_channel(note.instrument);
            let message = match note.status {
                NoteStatus::NoteOn => MidiMessage::note_on(channel, note.key, note.velocity),
                NoteStatus::NoteOff => MidiMessage::note_off(channel, note.key, note.velocity),
            };
            self.buffers.instrument.push(message);
        }

        if self.metronome_on {
            for click in self.metronome.range(b1, t1, b2, t2) {
                let message = match click.status {
                    NoteStatus::NoteOn => MidiMessage::note_on(9, click.key, click.velocity),
                    NoteStatus::NoteOff => MidiMessage::note_off(9, click.key, click.velocity),
                };
                self.buffers.instrument.push(message);
            }
        }
    }

    fn start_play(&mut self, start_bar: u16) {
        // tempo or signature may have changed since the last play
        self.metronome = Metronome::generate(&self.timing);
        // stale flags from an interrupted recording must not swallow a
        // note on this pass
        for note in self.song.notes_mut() {
            note.played = false;
        }
        self.transport.reset(start_bar);
        self.prev_position = self.transport.position();
        self.buffers
            .clock
            .push(MidiMessage::realtime(messages::START));
        self.buffers
            .keyboard_clock
            .push(MidiMessage::realtime(messages::START));
    }

    fn stop_play(&mut self) {
        self.transport.stop();
        self.buffers
            .clock
            .push(MidiMessage::realtime(messages::STOP));
        self.buffers
            .keyboard_clock
            .push(MidiMessage::realtime(messages::STOP));
        // silence anything still sounding
        for instrument in 0..NUM_INSTRUMENTS as u8 {
            self.buffers.instrument.push(MidiMessage::control_change(
                instrument_channel(instrument),
                messages::CC_ALL_NOTES_OFF,
                0,
            ));
        }
    }

    /// The current selection when an edit is allowed, as a half-open
    /// `[b1, b2)` pair; logs and yields nothing while playing.
    fn editable_selection(&self, operation: &str) -> Option<(u16, u16)> {
        if self.transport.is_playing() {
            warn!(operation, "bar edit rejected while playing");
            return None;
        }
        let (low, high) = self.selection?;
        Some((low, high + 1))
    }

    fn stage_programs(&mut self) {
        for instrument in 0..NUM_INSTRUMENTS as u8 {
            let channel = instrument_channel(instrument);
            // the drum channel keeps its kit; no program change
            if channel != 9 {
                self.buffers.instrument.push(MidiMessage::program_change(
                    channel,
                    self.programs[instrument as usize],
                ));
            }
            self.buffers.instrument.push(MidiMessage::control_change(
                channel,
                messages::CC_VOLUME,
                self.volumes[instrument as usize],
            ));
        }
    }

    /// Snapshot the sequencer into a persistence document.
    pub fn to_document(&self) -> SongDocument {
        SongDocument::encode(
            &self.song,
            &self.timing,
            &self.quantize,
            &self.programs,
            &self.volumes,
        )
    }

    /// Replace the song and settings from a persistence document.
    ///
    /// Nothing is touched unless decoding succeeds, so a failed load
    /// leaves any previously loaded song intact.
    pub fn load_document(&mut self, document: &SongDocument) -> Result<(), PersistError> {
        let loaded = document.decode()?;
        debug!(notes = loaded.song.len(), "song loaded");
        self.song = loaded.song;
        self.timing = loaded.timing;
        self.quantize = loaded.quantize;
        self.programs = loaded.programs;
        self.volumes = loaded.volumes;
        self.metronome = Metronome::generate(&self.timing);
        self.selection = None;
        self.stage_programs();
        Ok(())
    }
}
