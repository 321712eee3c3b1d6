// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song persistence.
//!
//! A [`SongDocument`] is the flat, serde-friendly snapshot of everything
//! a song file holds: instrument programs and volumes, the timing and
//! quantizer configuration, and the full note list with both real and
//! quantized positions. Decoding validates before anything is applied,
//! so a malformed file never clobbers the song in memory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{QuantizeSettings, Timing};
use crate::song::{Note, NoteStatus, SongStore};
use crate::NUM_INSTRUMENTS;

/// Why a song document failed to decode.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The text was not a valid song document
    #[error("failed to parse song document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The declared note count disagrees with the note list
    #[error("song length mismatch: declared {declared}, found {actual}")]
    LengthMismatch { declared: usize, actual: usize },
}

/// One stored note, in file layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub instrument: u8,
    pub status: NoteStatus,
    pub key: u8,
    pub velocity: u8,
    pub color: u8,
    pub bar: u16,
    pub beat: u16,
    pub tick: u32,
    pub qbar: u16,
    pub qbeat: u16,
    pub qtick: u32,
}

impl From<&Note> for NoteRecord {
    fn from(note: &Note) -> Self {
        Self {
            instrument: note.instrument,
            status: note.status,
            key: note.key,
            velocity: note.velocity,
            color: note.color,
            bar: note.bar,
            beat: note.beat,
            tick: note.tick,
            qbar: note.qbar,
            qbeat: note.qbeat,
            qtick: note.qtick,
        }
    }
}

impl From<&NoteRecord> for Note {
    fn from(record: &NoteRecord) -> Self {
        Self {
            instrument: record.instrument,
            status: record.status,
            key: record.key,
            velocity: record.velocity,
            color: record.color,
            bar: record.bar,
            beat: record.beat,
            tick: record.tick,
            qbar: record.qbar,
            qbeat: record.qbeat,
            qtick: record.qtick,
            played: false,
        }
    }
}

/// The serialized song file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongDocument {
    /// General MIDI program per instrument
    pub instruments: [u8; NUM_INSTRUMENTS],
    /// Channel volume per instrument
    pub volumes: [u8; NUM_INSTRUMENTS],
    pub beats_per_bar: u32,
    pub beat_type: u32,
    pub ticks_per_beat: u32,
    pub beats_per_minute: f64,
    pub bpm_multiplier: f64,
    /// Quantizer settings at save time
    pub quantizer: QuantizeSettings,
    /// Declared note count, checked against `notes` on decode
    pub song_length: usize,
    pub notes: Vec<NoteRecord>,
}

/// A successfully decoded song, ready to install into the sequencer.
#[derive(Debug, Clone)]
pub struct LoadedSong {
    pub song: SongStore,
    pub timing: Timing,
    pub quantize: QuantizeSettings,
    pub programs: [u8; NUM_INSTRUMENTS],
    pub volumes: [u8; NUM_INSTRUMENTS],
}

impl SongDocument {
    /// Snapshot the live state into a document.
    pub fn encode(
        song: &SongStore,
        timing: &Timing,
        quantize: &QuantizeSettings,
        programs: &[u8; NUM_INSTRUMENTS],
        volumes: &[u8; NUM_INSTRUMENTS],
    ) -> Self {
        Self {
            instruments: *programs,
            volumes: *volumes,
            beats_per_bar: timing.beats_per_bar,
            beat_type: timing.beat_type,
            ticks_per_beat: timing.ticks_per_beat,
            beats_per_minute: timing.beats_per_minute,
            bpm_multiplier: timing.bpm_multiplier,
            quantizer: *quantize,
            song_length: song.len(),
            notes: song.notes().iter().map(NoteRecord::from).collect(),
        }
    }

    /// Validate the document and rebuild the live state.
    ///
    /// Fails when the declared length disagrees with the note list. The
    /// rebuilt store is re-sorted through ordered insertion, so a file
    /// with shuffled notes still yields a valid store.
    pub fn decode(&self) -> Result<LoadedSong, PersistError> {
        if self.song_length != self.notes.len() {
            return Err(PersistError::LengthMismatch {
                declared: self.song_length,
                actual: self.notes.len(),
            });
        }

        let mut song = SongStore::new();
        for record in &self.notes {
            song.insert(Note::from(record));
        }

        Ok(LoadedSong {
            song,
            timing: Timing {
                beats_per_bar: self.beats_per_bar,
                beat_type: self.beat_type,
                ticks_per_beat: self.ticks_per_beat,
                beats_per_minute: self.beats_per_minute,
                bpm_multiplier: self.bpm_multiplier,
            },
            quantize: self.quantizer,
            programs: self.instruments,
            volumes: self.volumes,
        })
    }

    /// Parse a document from JSON text
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the document to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a song document from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read song file: {:?}", path.as_ref()))?;
        let document = Self::from_json(&contents)
            .with_context(|| format!("Failed to parse song file: {:?}", path.as_ref()))?;
        debug!(notes = document.notes.len(), "song file read");
        Ok(document)
    }

    /// Save the document to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = self
            .to_json()
            .context("Failed to serialize song document")?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write song file: {:?}", path.as_ref()))?;
        debug!(notes = self.notes.len(), "song file written");
        Ok(())
    }
}
