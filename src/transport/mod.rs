// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport and Bar-Beat-Tick engine.
//!
//! Advances a musical position each host callback from an elapsed frame
//! count, the tempo configuration, and the frame rate, and derives the
//! standard 24-PPQN MIDI clock phase. The transport knows nothing about
//! the song; the sequencer queries the store with the positions this
//! module produces.

use crate::config::Timing;
use crate::TOTAL_BARS;

/// Pulses Per Quarter Note - MIDI standard is 24
pub const PPQN: u32 = 24;

/// Tap intervals implying a tempo below this are discarded as a stale
/// first tap rather than a measurement.
pub const MIN_TAP_BPM: f64 = 40.0;

/// A Bar-Beat-Tick position.
///
/// `tick` counts from the start of the bar (it is not reset per beat);
/// `beat` is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Bar index in [0, 512)
    pub bar: u16,
    /// Beat within the bar
    pub beat: u16,
    /// Tick within the bar
    pub tick: u32,
}

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Playing,
}

/// The transport clock.
///
/// Two states, stopped and playing. While playing, a running tick
/// accumulator grows by `frames * ticks_per_beat * bpm / (rate * 60)`
/// per callback and the BBT position and clock phase are derived from
/// it. The bar index wraps modulo 512 relative to the starting bar.
#[derive(Debug, Clone)]
pub struct Transport {
    state: TransportState,
    start_bar: u16,
    tick_accum: f64,
    position: Position,
    clock_phase: u64,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport {
    /// Create a stopped transport at bar 0
    pub fn new() -> Self {
        Self {
            state: TransportState::Stopped,
            start_bar: 0,
            tick_accum: 0.0,
            position: Position::default(),
            clock_phase: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Whether the transport is rolling
    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    /// Current position
    pub fn position(&self) -> Position {
        self.position
    }

    /// Start playing from the given bar.
    ///
    /// Position becomes `(start_bar, 0, 0)` and the clock phase counter
    /// resets; the first `advance` after a reset reports no pulse.
    pub fn reset(&mut self, start_bar: u16) {
        self.state = TransportState::Playing;
        self.start_bar = start_bar % TOTAL_BARS;
        self.tick_accum = 0.0;
        self.clock_phase = 0;
        self.position = Position {
            bar: self.start_bar,
            beat: 0,
            tick: 0,
        };
    }

    /// Stop the transport.
    ///
    /// Callers must follow up with an all-notes-off / MIDI Stop control
    /// sequence on their outbound channels; that emission is outside
    /// this engine's contract.
    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
    }

    /// Advance by an elapsed frame count.
    ///
    /// Returns the new position and whether a MIDI clock pulse fires in
    /// this block. The pulse flag is edge-triggered: it is true exactly
    /// when the 24-PPQN phase counter crossed an integer boundary since
    /// the previous call, not once per callback.
    pub fn advance(
        &mut self,
        elapsed_frames: u32,
        timing: &Timing,
        frame_rate: u32,
    ) -> (Position, bool) {
        if self.state == TransportState::Stopped {
            return (self.position, false);
        }

        self.tick_accum += elapsed_frames as f64 * timing.ticks_per_beat as f64
            * timing.effective_bpm()
            / (frame_rate as f64 * 60.0);

        let ticks_per_bar = timing.ticks_per_bar();
        let total = self.tick_accum as u64;
        let tick = total % ticks_per_bar;
        let bar = (self.start_bar as u64 + total / ticks_per_bar) % TOTAL_BARS as u64;

        self.position = Position {
            bar: bar as u16,
            beat: (tick / timing.ticks_per_beat as u64) as u16,
            tick: tick as u32,
        };

        // clock phase counts quarter notes regardless of time signature
        let phase = (self.tick_accum / timing.ticks_per_quarter() * PPQN as f64) as u64;
        let pulse = phase != self.clock_phase;
        self.clock_phase = phase;

        (self.position, pulse)
    }
}

/// Tap tempo calculator.
///
/// Two consecutive taps' frame timestamps yield a tempo; an interval too
/// long to be a plausible tap pair (below 40 BPM) is treated as a fresh
/// first tap and does not produce a measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct TapTempo {
    last_tap: Option<u64>,
}

impl TapTempo {
    /// Create a tap tempo calculator with no pending tap
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tap at the given frame timestamp.
    ///
    /// Returns the measured BPM once two close-enough taps have been
    /// seen.
    pub fn tap(&mut self, frame_time: u64, sample_rate: u32) -> Option<f64> {
        let previous = self.last_tap.replace(frame_time);
        let interval = frame_time.checked_sub(previous?)?;
        if interval == 0 {
            return None;
        }
        let bpm = sample_rate as f64 * 60.0 / interval as f64;
        if bpm < MIN_TAP_BPM {
            return None;
        }
        Some(bpm)
    }

    /// Forget any pending tap
    pub fn reset(&mut self) {
        self.last_tap = None;
    }
}
