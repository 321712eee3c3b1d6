// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI message values and channel/pad mappings.
//!
//! The core never owns a MIDI port; it produces raw 1-3 byte messages
//! that the host integration writes to its outbound ports. This module
//! holds the status-byte constants, the fixed instrument-to-channel map,
//! and the pad/bar coordinate conversions for the 8x8 grid controller.

/// MIDI message constants
pub mod messages {
    // Channel Voice Messages (upper nibble, lower nibble is channel 0-15)
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;

    // System Real-Time Messages
    pub const TIMING_CLOCK: u8 = 0xF8;
    pub const START: u8 = 0xFA;
    pub const CONTINUE: u8 = 0xFB;
    pub const STOP: u8 = 0xFC;

    // Control Change numbers
    pub const CC_VOLUME: u8 = 0x07;
    pub const CC_ALL_NOTES_OFF: u8 = 123;
}

/// A raw outbound MIDI message, 1 to 3 bytes.
///
/// Program changes are 2 bytes, single-byte system real-time messages are
/// 1 byte, all other channel messages are 3 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiMessage {
    len: u8,
    bytes: [u8; 3],
}

impl MidiMessage {
    /// Create a Note On message
    pub fn note_on(channel: u8, key: u8, velocity: u8) -> Self {
        Self {
            len: 3,
            bytes: [messages::NOTE_ON | (channel & 0x0F), key & 0x7F, velocity & 0x7F],
        }
    }

    /// Create a Note Off message
    pub fn note_off(channel: u8, key: u8, velocity: u8) -> Self {
        Self {
            len: 3,
            bytes: [messages::NOTE_OFF | (channel & 0x0F), key & 0x7F, velocity & 0x7F],
        }
    }

    /// Create a Control Change message
    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self {
            len: 3,
            bytes: [
                messages::CONTROL_CHANGE | (channel & 0x0F),
                controller & 0x7F,
                value & 0x7F,
            ],
        }
    }

    /// Create a 2-byte Program Change message
    pub fn program_change(channel: u8, program: u8) -> Self {
        Self {
            len: 2,
            bytes: [messages::PROGRAM_CHANGE | (channel & 0x0F), program & 0x7F, 0],
        }
    }

    /// Create a single-byte system real-time message (clock, start, stop)
    pub fn realtime(status: u8) -> Self {
        Self {
            len: 1,
            bytes: [status, 0, 0],
        }
    }

    /// The raw bytes to hand to the host's MIDI port
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Status byte of the message
    pub fn status(&self) -> u8 {
        self.bytes[0]
    }
}

/// Map an instrument index to its MIDI channel.
///
/// Instrument 0 is the drum instrument and lands on channel 9 per the
/// General MIDI convention; the rest map to channels 0-6.
pub fn instrument_channel(instrument: u8) -> u8 {
    const CHANNELS: [u8; 8] = [9, 0, 1, 2, 3, 4, 5, 6];
    CHANNELS[(instrument as usize) % CHANNELS.len()]
}

/// Convert a grid pad number (0x00-0x77, row-nibble/column-nibble) to a
/// bar index within the page (0-63).
pub fn pad_to_bar(pad: u8) -> u8 {
    ((pad & 0xF0) >> 4) * 8 + (pad & 0x0F)
}

/// Convert a bar index within the page (0-63) back to a grid pad number.
pub fn bar_to_pad(bar: u8) -> u8 {
    ((bar >> 3) << 4) + (bar & 0x07)
}

/// Split an absolute bar index into its (page, bar-within-page) pair.
pub fn page_of(bar: u16) -> (u16, u16) {
    (bar / crate::BARS_PER_PAGE, bar % crate::BARS_PER_PAGE)
}

/// Rebuild an absolute bar index from a (page, bar-within-page) pair.
pub fn absolute_bar(page: u16, bar_in_page: u16) -> u16 {
    page * crate::BARS_PER_PAGE + bar_in_page
}
