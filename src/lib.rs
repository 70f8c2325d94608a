//! APCKey GW - control-surface gateway for the Akai APC Key 25 MK2
//!
//! Routes pad, knob and button input through a mode state machine into host
//! transport commands, and drives the controller LEDs from session state.

pub mod apc;
pub mod config;
pub mod error;
pub mod host;
pub mod knobs;
pub mod leds;
pub mod midi;
pub mod pads;
pub mod router;

pub use error::DriverError;
pub use host::{ConsoleHost, Host, SeekSpeed};
pub use leds::{LedDriver, LedOutcome, MidiSink};
pub use midi::MidiEvent;
pub use router::{ControllerMode, Router, SurfaceState};
