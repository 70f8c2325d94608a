//! MIDI event record and helpers
//!
//! Every inbound message is validated into a fixed-shape [`MidiEvent`] before
//! it reaches the router.

use crate::error::DriverError;
use std::fmt;

/// Status nibble for Note Off
pub const NOTE_OFF: u8 = 0x80;
/// Status nibble for Note On
pub const NOTE_ON: u8 = 0x90;
/// Status nibble for Control Change
pub const CONTROL_CHANGE: u8 = 0xB0;
/// Status nibble for Channel Pressure
pub const CHANNEL_PRESSURE: u8 = 0xD0;

/// Message classification used by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    NoteOn,
    NoteOff,
    ControlChange,
    ChannelPressure,
    Other,
}

/// Decoded inbound event
///
/// `status` holds the message type nibble (e.g. `0x90`), `channel` the
/// channel (0-15). `system` mirrors the host's "system" performance flag and
/// lets an event bypass the channel-0 restriction. `handled` is the mutable
/// consumed flag set by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiEvent {
    pub channel: u8,
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
    pub system: bool,
    pub handled: bool,
}

impl MidiEvent {
    /// Build an event from already-split fields, rejecting out-of-range values
    pub fn try_new(channel: u8, status: u8, data1: u8, data2: u8) -> Result<Self, DriverError> {
        if channel > 0x0F {
            return Err(DriverError::MalformedEvent(format!("channel {} out of range", channel)));
        }
        if !(0x80..0xF0).contains(&status) || status & 0x0F != 0 {
            return Err(DriverError::MalformedEvent(format!(
                "status {:#04X} is not a channel message type",
                status
            )));
        }
        if data1 > 0x7F || data2 > 0x7F {
            return Err(DriverError::MalformedEvent(format!(
                "data bytes {} {} exceed 7 bits",
                data1, data2
            )));
        }

        Ok(Self {
            channel,
            status,
            data1,
            data2,
            system: false,
            handled: false,
        })
    }

    /// Parse raw bytes from the wire
    ///
    /// Only 3-byte channel messages are accepted. Note On with velocity 0 is
    /// reported as Note Off.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DriverError> {
        if data.len() < 3 {
            return Err(DriverError::MalformedEvent(format!(
                "expected 3 bytes, got {} ({})",
                data.len(),
                format_hex(data)
            )));
        }

        let mut status = data[0] & 0xF0;
        let channel = data[0] & 0x0F;
        if status == NOTE_ON && data[2] == 0 {
            status = NOTE_OFF;
        }

        Self::try_new(channel, status, data[1], data[2])
    }

    /// Mark the event as carrying the host's system flag
    pub fn with_system(mut self, system: bool) -> Self {
        self.system = system;
        self
    }

    pub fn kind(&self) -> MessageKind {
        match self.status {
            NOTE_ON => MessageKind::NoteOn,
            NOTE_OFF => MessageKind::NoteOff,
            CONTROL_CHANGE => MessageKind::ControlChange,
            CHANNEL_PRESSURE => MessageKind::ChannelPressure,
            _ => MessageKind::Other,
        }
    }

    /// Encode back to wire bytes (used for passthrough forwarding)
    ///
    /// Knob levels run up to 128, so data bytes saturate at 127.
    pub fn encode(&self) -> [u8; 3] {
        [
            self.status | (self.channel & 0x0F),
            self.data1.min(0x7F),
            self.data2.min(0x7F),
        ]
    }
}

impl fmt::Display for MidiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind() {
            MessageKind::NoteOn => "NoteOn",
            MessageKind::NoteOff => "NoteOff",
            MessageKind::ControlChange => "CC",
            MessageKind::ChannelPressure => "ChannelPressure",
            MessageKind::Other => "Other",
        };
        write!(
            f,
            "{} ch:{} d1:{} d2:{}{}",
            name,
            self.channel + 1,
            self.data1,
            self.data2,
            if self.system { " [sys]" } else { "" }
        )
    }
}

/// Split an encoded outbound message into its three wire bytes
///
/// Outbound LED messages are packed as `status + (data1 << 8) + (data2 << 16)`.
pub fn unpack(message: u32) -> [u8; 3] {
    [
        (message & 0xFF) as u8,
        ((message >> 8) & 0xFF) as u8,
        ((message >> 16) & 0xFF) as u8,
    ]
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
