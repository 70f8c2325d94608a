//! Relative encoder tracking
//!
//! The knobs send relative ticks (1 = down, 127 = up). The tracker keeps an
//! absolute value per knob so the host sees a level instead of a tick.

use crate::error::DriverError;
use std::ops::RangeInclusive;

/// Knob ids modelled by the tracker
pub const KNOB_IDS: RangeInclusive<u8> = 47..=55;
/// Inclusive value bounds
pub const KNOB_MIN: u8 = 1;
pub const KNOB_MAX: u8 = 128;

/// Tick value meaning "one step down"
pub const TICK_DOWN: u8 = 1;
/// Tick value meaning "one step up"
pub const TICK_UP: u8 = 127;

const KNOB_COUNT: usize = 9;

#[derive(Debug, Clone)]
pub struct KnobTracker {
    values: [u8; KNOB_COUNT],
}

impl Default for KnobTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl KnobTracker {
    pub fn new() -> Self {
        Self {
            values: [KNOB_MIN; KNOB_COUNT],
        }
    }

    /// Whether `id` is a tracked knob; callers filter with this before `adjust`
    pub fn tracks(id: u8) -> bool {
        KNOB_IDS.contains(&id)
    }

    /// Current value of a knob
    pub fn value(&self, id: u8) -> Result<u8, DriverError> {
        Ok(self.values[Self::slot(id)?])
    }

    /// Apply one tick and return the new absolute value
    ///
    /// Values clamp to [`KNOB_MIN`, `KNOB_MAX`]; unknown tick values leave the
    /// knob untouched.
    pub fn adjust(&mut self, id: u8, tick: u8) -> Result<u8, DriverError> {
        let slot = Self::slot(id)?;
        let current = self.values[slot];
        let next = match tick {
            TICK_DOWN => current.saturating_sub(1).max(KNOB_MIN),
            TICK_UP => current.saturating_add(1).min(KNOB_MAX),
            _ => current,
        };
        self.values[slot] = next;
        Ok(next)
    }

    fn slot(id: u8) -> Result<usize, DriverError> {
        if Self::tracks(id) {
            Ok((id - KNOB_IDS.start()) as usize)
        } else {
            Err(DriverError::InvalidKnob(id))
        }
    }
}
