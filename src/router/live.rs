//! Performance grid view
//!
//! Repaints the 5×8 pad window from the host's live-block status. Nothing is
//! kept between refreshes, so a missed notification heals on the next one.

use super::Router;
use crate::host::{Host, LIVE_STATUS_TRIGGERED};
use crate::leds::{MidiSink, MAX_BRIGHTNESS};
use tracing::debug;

/// Colour used for live blocks
pub const LIVE_BLOCK_COLOR: u8 = 30;
const IDLE_BRIGHTNESS: u8 = 1;

const FIRST_ROW: u8 = 1;
const LAST_ROW: u8 = 5;
const COLUMNS: u8 = 8;

// Playlist rows 1..=5 top to bottom; row 0 is reserved
const CELL_PADS: [[u8; COLUMNS as usize]; LAST_ROW as usize] = [
    [32, 33, 34, 35, 36, 37, 38, 39],
    [24, 25, 26, 27, 28, 29, 30, 31],
    [16, 17, 18, 19, 20, 21, 22, 23],
    [8, 9, 10, 11, 12, 13, 14, 15],
    [0, 1, 2, 3, 4, 5, 6, 7],
];

/// Pad showing playlist cell (`row`, `col`), or None outside the window
pub fn mapped_pad(row: u8, col: u8) -> Option<u8> {
    if !(FIRST_ROW..=LAST_ROW).contains(&row) || col >= COLUMNS {
        return None;
    }
    Some(CELL_PADS[(row - FIRST_ROW) as usize][col as usize])
}

impl<H: Host, S: MidiSink> Router<H, S> {
    /// Full repaint of the performance window
    pub fn refresh_live_grid(&mut self) {
        self.log_session_diagnostics();

        for row in FIRST_ROW..=LAST_ROW {
            for col in 0..COLUMNS {
                let Some(pad) = mapped_pad(row, col) else {
                    continue;
                };
                match self.host.live_block_status(row, col, 0) {
                    0 => {
                        self.leds.led_off(pad);
                    }
                    LIVE_STATUS_TRIGGERED => {
                        self.leds.led_on(pad, LIVE_BLOCK_COLOR, MAX_BRIGHTNESS);
                    }
                    status => {
                        debug!("{}.{} live status {} → pad {}", row, col, status, pad);
                        self.leds.led_on(pad, LIVE_BLOCK_COLOR, IDLE_BRIGHTNESS);
                    }
                }
            }
        }
    }

    fn log_session_diagnostics(&self) {
        if let Some(num) = self.host.pattern_number() {
            debug!(
                "Selected pattern {}: name={:?} length={:?}",
                num,
                self.host.pattern_name(num),
                self.host.pattern_length(num)
            );
        }
        if let Some(name) = self.host.track_name(1) {
            debug!("Track 1: {}", name);
        }
    }
}
