//! Router module - input routing and mode state machine
//!
//! The Router owns everything the surface needs between callbacks:
//! - Controller mode and shift latch
//! - Knob positions
//! - LED driver (and through it the outbound MIDI sink)
//! - The host session collaborator
//!
//! Callbacks are expected one at a time; each runs to completion before the
//! next is delivered, so no state here is shared or locked.

pub mod actions;
mod dispatch;
mod live;

pub use actions::{actions_for, ActionContext, ActionFamily, Binding, Operation, SHIFT_BUTTON};
pub use live::{mapped_pad, LIVE_BLOCK_COLOR};

#[cfg(test)]
mod tests;

use crate::error::DriverError;
use crate::host::Host;
use crate::knobs::KnobTracker;
use crate::leds::{LedDriver, LedOutcome, MidiSink};
use crate::midi::{MessageKind, MidiEvent};
use tracing::{debug, info, trace};

/// Operating context of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerMode {
    #[default]
    User,
    Transport,
    Mixer,
    Browser,
    Pattern,
    Playlist,
}

impl ControllerMode {
    pub const ALL: [ControllerMode; 6] = [
        ControllerMode::User,
        ControllerMode::Transport,
        ControllerMode::Mixer,
        ControllerMode::Browser,
        ControllerMode::Pattern,
        ControllerMode::Playlist,
    ];
}

/// Mode plus the orthogonal shift latch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceState {
    pub mode: ControllerMode,
    pub shift: bool,
}

/// Surface router bound to one host session and one outbound sink
pub struct Router<H, S> {
    pub(crate) host: H,
    pub(crate) leds: LedDriver<S>,
    pub(crate) knobs: KnobTracker,
    pub(crate) state: SurfaceState,
}

impl<H: Host, S: MidiSink> Router<H, S> {
    pub fn new(host: H, sink: S) -> Self {
        Self {
            host,
            leds: LedDriver::new(sink),
            knobs: KnobTracker::new(),
            state: SurfaceState::default(),
        }
    }

    pub fn mode(&self) -> ControllerMode {
        self.state.mode
    }

    pub fn shift_held(&self) -> bool {
        self.state.shift
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn leds(&self) -> &LedDriver<S> {
        &self.leds
    }

    pub fn leds_mut(&mut self) -> &mut LedDriver<S> {
        &mut self.leds
    }

    pub fn knobs(&self) -> &KnobTracker {
        &self.knobs
    }

    pub(crate) fn action_context(&mut self) -> ActionContext<'_, H, S> {
        ActionContext {
            mode: &mut self.state.mode,
            host: &mut self.host,
            leds: &mut self.leds,
        }
    }

    /// Startup: force Transport mode as if its button had been pressed
    pub fn on_init(&mut self) {
        info!("Surface init, entering transport mode");
        self.action_context()
            .change_mode(ControllerMode::Transport, actions::STARTUP_MODE_BUTTON);
    }

    /// Shutdown: leave the controller dark
    pub fn on_deinit(&mut self) {
        info!("Surface deinit, clearing LEDs");
        self.leds.kill_all_lights();
    }

    /// Raw input, before classification
    ///
    /// Knob ticks are turned into absolute levels here so every later consumer
    /// sees a value rather than a direction.
    pub fn on_midi_in(&mut self, event: &mut MidiEvent) -> Result<(), DriverError> {
        if event.kind() == MessageKind::ControlChange && KnobTracker::tracks(event.data1) {
            let value = self.knobs.adjust(event.data1, event.data2)?;
            trace!(knob = event.data1, tick = event.data2, value, "knob adjusted");
            event.data2 = value;
        }
        Ok(())
    }

    /// Host beat tick
    pub fn on_update_beat_indicator(&mut self, value: u8) -> LedOutcome {
        self.leds.on_update_beat_indicator(value)
    }

    /// Host reports the live/performance grid changed
    pub fn on_update_live_mode(&mut self, value: u32) {
        debug!("Live mode changed ({})", value);
        self.refresh_live_grid();
    }

    pub fn on_idle(&mut self) {}

    pub fn on_channel_pressure(&mut self, event: &MidiEvent) {
        trace!("OnChannelPressure: {}", event);
    }

    pub fn on_control_change(&mut self, event: &MidiEvent) {
        trace!("OnControlChange: {}", event);
    }

    pub fn on_sysex(&mut self, data: &[u8]) {
        trace!("OnSysEx: {}", crate::midi::format_hex(data));
    }

    pub fn on_note_on(&mut self, event: &MidiEvent) {
        trace!("OnNoteOn: {}", event);
    }

    pub fn on_note_off(&mut self, event: &MidiEvent) {
        trace!("OnNoteOff: {}", event);
    }

    pub fn on_midi_out_msg(&mut self, event: &MidiEvent) {
        trace!("OnMidiOutMsg: {}", event);
    }
}
