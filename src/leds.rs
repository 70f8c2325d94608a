//! LED feedback protocol
//!
//! Outbound messages are packed as `status + (note << 8) + (value << 16)`.
//! The APC Key 25 MK2 reads the Note On channel as brightness for steady pads
//! and as speed for pulsing pads; the velocity selects the colour.

use std::ops::RangeInclusive;
use tracing::debug;

/// Steady-on base status (Note On, channel 0)
pub const LED_ON_BASE: u32 = 0x90;
/// Pulse base status (steady base + 6)
pub const PULSE_BASE: u32 = LED_ON_BASE + 6;

pub const MAX_BRIGHTNESS: u8 = 6;
pub const MAX_PULSE_SPEED: u8 = 9;

/// Grid pad range accepted by the colour operations
pub const GRID: RangeInclusive<u8> = 0..=40;
/// Buttons under the grid
pub const UNDER_GRID: RangeInclusive<u8> = 64..=71;
/// Buttons right of the grid
pub const RIGHT_SIDE: RangeInclusive<u8> = 82..=86;

/// Beat indicator pad and its colour
pub const BEAT_PAD: u8 = 7;
pub const BEAT_COLOR: u8 = 50;

/// Mono button codes
const MONO_SOLID: u8 = 1;
const MONO_BLINK: u8 = 2;

/// Outbound MIDI primitive
pub trait MidiSink {
    /// Write one packed 3-byte message
    fn send_raw(&mut self, message: u32);
}

/// Buffers messages; handy for tests and batching
impl MidiSink for Vec<u32> {
    fn send_raw(&mut self, message: u32) {
        self.push(message);
    }
}

/// Result of an LED operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedOutcome {
    Sent,
    /// Target or parameter outside the accepted zone; nothing was sent
    OutOfRange,
    /// Beat indicator already showed this state
    Unchanged,
}

pub struct LedDriver<S> {
    sink: S,
    prev_beat: u8,
}

impl<S: MidiSink> LedDriver<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, prev_beat: 0 }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Steady colour on a grid pad; brightness 0 (dim) to 6 (bright)
    pub fn led_on(&mut self, pad: u8, color: u8, brightness: u8) -> LedOutcome {
        if !GRID.contains(&pad) || brightness > MAX_BRIGHTNESS || color > 0x7F {
            debug!(pad, color, brightness, "led_on: invalid target");
            return LedOutcome::OutOfRange;
        }
        self.send(LED_ON_BASE + brightness as u32, pad, color);
        LedOutcome::Sent
    }

    /// Turn off a pad or button
    pub fn led_off(&mut self, pad: u8) -> LedOutcome {
        let valid = GRID.contains(&pad) || (64..72).contains(&pad) || (82..87).contains(&pad);
        if !valid {
            debug!(pad, "led_off: invalid target");
            return LedOutcome::OutOfRange;
        }
        self.send(LED_ON_BASE, pad, 0);
        LedOutcome::Sent
    }

    /// Pulsing colour on a grid pad; speed 0 = off, 1 fastest, 9 slowest
    pub fn led_pulse(&mut self, pad: u8, color: u8, speed: u8) -> LedOutcome {
        if !GRID.contains(&pad) || speed > MAX_PULSE_SPEED || color > 0x7F {
            debug!(pad, color, speed, "led_pulse: invalid target");
            return LedOutcome::OutOfRange;
        }
        self.send(PULSE_BASE + speed as u32, pad, color);
        LedOutcome::Sent
    }

    /// Single-colour state for the under-grid and right-side buttons
    pub fn set_led_mono(&mut self, note: u8, blink: bool) -> LedOutcome {
        if !(UNDER_GRID.contains(&note) || RIGHT_SIDE.contains(&note)) {
            debug!(note, "set_led_mono: not a mono button");
            return LedOutcome::OutOfRange;
        }
        let code = if blink { MONO_BLINK } else { MONO_SOLID };
        self.send(LED_ON_BASE, note, code);
        LedOutcome::Sent
    }

    /// Zero-colour send with no range check
    pub fn set_led_off(&mut self, note: u8) {
        self.send(LED_ON_BASE, note, 0);
    }

    pub fn kill_right_side_lights(&mut self) {
        for note in 82..87 {
            self.led_off(note);
        }
    }

    pub fn kill_grid_lights(&mut self) {
        for pad in 0..40 {
            self.led_off(pad);
        }
    }

    pub fn kill_under_lights(&mut self) {
        for note in 64..72 {
            self.led_off(note);
        }
    }

    pub fn kill_all_lights(&mut self) {
        self.kill_right_side_lights();
        self.kill_grid_lights();
        self.kill_under_lights();
    }

    /// Edge-triggered beat light on pad 7
    ///
    /// Only the transitions from 0 to non-zero and back to 0 touch the LED.
    pub fn on_update_beat_indicator(&mut self, value: u8) -> LedOutcome {
        if value == self.prev_beat {
            return LedOutcome::Unchanged;
        }
        let was_off = self.prev_beat == 0;
        self.prev_beat = value;

        if was_off {
            self.led_on(BEAT_PAD, BEAT_COLOR, MAX_BRIGHTNESS)
        } else if value == 0 {
            self.led_off(BEAT_PAD)
        } else {
            LedOutcome::Unchanged
        }
    }

    fn send(&mut self, status: u32, note: u8, value: u8) {
        self.sink
            .send_raw(status + ((note as u32) << 8) + ((value as u32) << 16));
    }
}
