// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song storage: notes, the sorted store, and the metronome table.
//!
//! This module provides:
//! - The note event type with real and quantized positions
//! - The capacity-bounded, always-sorted song store
//! - The generated click-track table

pub mod metronome;
pub mod note;
pub mod store;

pub use metronome::{Metronome, METRONOME_BARS, METRONOME_CAPACITY};
pub use note::{Note, NoteStatus};
pub use store::{SongStore, SONG_CAPACITY};
