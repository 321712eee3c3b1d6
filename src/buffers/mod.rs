// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Bounded real-time event buffers.
//!
//! Fixed-capacity FIFOs that stage outbound MIDI bytes produced during a
//! callback before handoff to the host engine. Each outbound channel
//! gets its own buffer, and every buffer is drained completely once per
//! callback, so overflow indicates a caller bug rather than a condition
//! to recover from: a full buffer wraps to the head and overwrites the
//! oldest entry instead of failing.

use tracing::warn;

use crate::midi::MidiMessage;

/// Practical bound on queued events per channel per callback.
pub const BUFFER_CAPACITY: usize = 100;

/// A fixed-capacity FIFO of outbound MIDI messages.
#[derive(Debug, Clone)]
pub struct EventBuffer {
    slots: Vec<MidiMessage>,
    capacity: usize,
    // next slot to overwrite once full
    wrap: usize,
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::with_capacity(BUFFER_CAPACITY)
    }
}

impl EventBuffer {
    /// Create an empty buffer with the default capacity
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer bounded at `capacity` events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            wrap: 0,
        }
    }

    /// Queued event count
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append an event; a full buffer overwrites from the head.
    pub fn push(&mut self, event: MidiMessage) {
        if self.slots.len() < self.capacity {
            self.slots.push(event);
        } else {
            warn!(capacity = self.capacity, "event buffer overflow, overwriting oldest entry");
            self.slots[self.wrap] = event;
            self.wrap = (self.wrap + 1) % self.capacity;
        }
    }

    /// Remove and return every queued event in FIFO order.
    pub fn drain_all(&mut self) -> impl Iterator<Item = MidiMessage> + '_ {
        self.wrap = 0;
        self.slots.drain(..)
    }
}

/// One event buffer per outbound channel.
///
/// The channels mirror the host's outbound ports: instrument MIDI to the
/// synth, keyboard echo, controller LEDs, external MIDI clock, and the
/// clock feed to the keyboard (sent only while playing).
#[derive(Debug, Clone, Default)]
pub struct OutboundBuffers {
    /// Instrument notes to the synthesizer
    pub instrument: EventBuffer,
    /// Echo back to the MIDI keyboard
    pub keyboard: EventBuffer,
    /// Controller LED messages
    pub led: EventBuffer,
    /// MIDI clock to the external system
    pub clock: EventBuffer,
    /// MIDI clock to the keyboard, play mode only
    pub keyboard_clock: EventBuffer,
}

impl OutboundBuffers {
    /// Create the full set of empty channel buffers
    pub fn new() -> Self {
        Self::default()
    }

    /// Total events queued across every channel
    pub fn queued(&self) -> usize {
        self.instrument.len()
            + self.keyboard.len()
            + self.led.len()
            + self.clock.len()
            + self.keyboard_clock.len()
    }
}
