//! Host session collaborator
//!
//! The DAW is a black box. The router only talks to it through [`Host`]:
//! transport commands, live-block queries, and a few descriptive lookups used
//! for diagnostics.

use anyhow::Result;

pub mod console;

pub use console::ConsoleHost;

/// Seek speed passed to `fast_forward` / `rewind`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekSpeed {
    Stop = 0,
    Active = 2,
}

/// Live-block status code meaning "recording / triggered"
pub const LIVE_STATUS_TRIGGERED: u8 = 7;

/// Host session surface consumed by the router
///
/// Commands may fail (e.g. a bridge lost its connection); queries may not.
pub trait Host {
    fn is_playing(&self) -> bool;

    fn start(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    fn record(&mut self) -> Result<()>;

    /// Toggle between song and pattern loop mode
    fn set_loop_mode(&mut self) -> Result<()>;

    fn fast_forward(&mut self, speed: SeekSpeed) -> Result<()>;

    fn rewind(&mut self, speed: SeekSpeed) -> Result<()>;

    /// Clip-launch status of a playlist cell; 0 means idle
    fn live_block_status(&self, row: u8, col: u8, layer: u8) -> u8;

    /// Diagnostics only
    fn track_name(&self, _track: u8) -> Option<String> {
        None
    }

    /// Diagnostics only
    fn pattern_number(&self) -> Option<u32> {
        None
    }

    /// Diagnostics only
    fn pattern_name(&self, _pattern: u32) -> Option<String> {
        None
    }

    /// Diagnostics only
    fn pattern_length(&self, _pattern: u32) -> Option<u32> {
        None
    }
}
