//! Error types for the surface router

/// Errors raised at the callback boundary
///
/// Out-of-range LED targets and unbound buttons are not errors; see
/// [`crate::leds::LedOutcome`] and the router's unhandled path.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Knob id outside the tracked hardware range
    #[error("knob {0} is not a tracked knob (expected 47-55)")]
    InvalidKnob(u8),

    /// Raw bytes that do not form a 3-byte channel message
    #[error("malformed MIDI event: {0}")]
    MalformedEvent(String),

    /// A host transport command failed
    #[error("host command failed: {0}")]
    Host(#[from] anyhow::Error),
}
