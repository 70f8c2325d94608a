//! Console host - logs every transport command
//!
//! Stands in for a DAW bridge so the surface can be exercised against real
//! hardware without a session attached.

use super::{Host, SeekSpeed};
use anyhow::Result;
use tracing::{debug, info};

/// ConsoleHost keeps a minimal transport model and logs each command
///
/// The playlist is empty, so every live block reports idle.
#[derive(Debug, Default)]
pub struct ConsoleHost {
    name: String,
    playing: bool,
    recording: bool,
    pattern_loop: bool,
    seek: Option<(&'static str, SeekSpeed)>,
    /// Song position in half beats since the last start
    half_beats: u64,
    /// Number of commands received, for debugging
    command_count: u64,
}

impl ConsoleHost {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn pattern_loop(&self) -> bool {
        self.pattern_loop
    }

    /// Active seek direction and speed, if any
    pub fn seeking(&self) -> Option<(&'static str, SeekSpeed)> {
        self.seek
    }

    pub fn command_count(&self) -> u64 {
        self.command_count
    }

    /// Advance the beat clock by half a beat
    ///
    /// Returns the beat indicator value: 1 on the first beat of a bar, 2 on
    /// other beats, 0 between beats and while stopped.
    pub fn beat_tick(&mut self) -> u8 {
        if !self.playing {
            return 0;
        }
        let pos = self.half_beats;
        self.half_beats += 1;
        match pos {
            p if p % 2 == 1 => 0,
            p if (p / 2) % 4 == 0 => 1,
            _ => 2,
        }
    }

    fn log(&mut self, command: &str, detail: impl std::fmt::Display) {
        self.command_count += 1;
        info!(
            "🎛️  [{}] Host '{}' → {} {} [cmd #{}]",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            self.name,
            command,
            detail,
            self.command_count
        );
        if let Some((direction, speed)) = self.seeking() {
            debug!("Host '{}' seeking: {} at {:?}", self.name, direction, speed);
        }
    }
}

impl Host for ConsoleHost {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn start(&mut self) -> Result<()> {
        self.playing = true;
        self.half_beats = 0;
        self.log("start", "");
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.playing = false;
        self.recording = false;
        self.log("stop", "");
        Ok(())
    }

    fn record(&mut self) -> Result<()> {
        self.recording = !self.recording;
        let state = if self.recording { "(armed)" } else { "(disarmed)" };
        self.log("record", state);
        Ok(())
    }

    fn set_loop_mode(&mut self) -> Result<()> {
        self.pattern_loop = !self.pattern_loop;
        let mode = if self.pattern_loop { "(pattern)" } else { "(song)" };
        self.log("set_loop_mode", mode);
        Ok(())
    }

    fn fast_forward(&mut self, speed: SeekSpeed) -> Result<()> {
        self.seek = (speed != SeekSpeed::Stop).then_some(("fast_forward", speed));
        self.log("fast_forward", speed as u8);
        Ok(())
    }

    fn rewind(&mut self, speed: SeekSpeed) -> Result<()> {
        self.seek = (speed != SeekSpeed::Stop).then_some(("rewind", speed));
        self.log("rewind", speed as u8);
        Ok(())
    }

    fn live_block_status(&self, row: u8, col: u8, layer: u8) -> u8 {
        debug!(row, col, layer, "ConsoleHost live block query");
        0
    }
}
