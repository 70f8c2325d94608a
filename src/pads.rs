//! Pad grid remapping
//!
//! The hardware numbers its 5×8 grid row-major starting from the bottom row.
//! The router works in logical codes numbered from the top row down.
//!
//! ```text
//! physical          logical
//! 32 .. 39          00 .. 07
//! 24 .. 31          08 .. 15
//! 16 .. 23          16 .. 23
//! 08 .. 15          24 .. 31
//! 00 .. 07          32 .. 39
//! ```

/// Number of grid pads
pub const PAD_COUNT: u8 = 40;
/// Pads per grid row
pub const ROW_WIDTH: u8 = 8;
const ROWS: u8 = PAD_COUNT / ROW_WIDTH;

/// Map a physical pad code to its logical code
///
/// Codes outside the grid pass through untouched since buttons share the
/// same channel.
pub fn remap(physical: u8) -> u8 {
    flip_rows(physical)
}

/// Map a logical pad code back to the physical code
pub fn remap_inverse(logical: u8) -> u8 {
    flip_rows(logical)
}

/// Whether a code addresses the pad grid
pub fn is_grid_pad(code: u8) -> bool {
    code < PAD_COUNT
}

// Row flip is its own inverse
fn flip_rows(code: u8) -> u8 {
    if !is_grid_pad(code) {
        return code;
    }
    let row = code / ROW_WIDTH;
    let col = code % ROW_WIDTH;
    (ROWS - 1 - row) * ROW_WIDTH + col
}
