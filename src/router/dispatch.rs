//! Note event classification and dispatch

use super::actions::{actions_for, ActionFamily, Binding, SHIFT_BUTTON};
use super::{ControllerMode, Router};
use crate::error::DriverError;
use crate::host::Host;
use crate::leds::MidiSink;
use crate::midi::{MessageKind, MidiEvent};
use crate::pads;
use tracing::{debug, trace};

impl<H: Host, S: MidiSink> Router<H, S> {
    /// Classified MIDI message
    ///
    /// Events on channels other than 0 are left alone unless they carry the
    /// system flag (keybed notes). Everything else has its grid pad remapped,
    /// then walks the button's action list and sets `event.handled`.
    pub fn on_midi_msg(&mut self, event: &mut MidiEvent) -> Result<(), DriverError> {
        // Skipped events reach the host untouched
        if event.channel != 0 && !event.system {
            trace!("Ignoring {} on channel {}", event, event.channel);
            return Ok(());
        }

        event.data1 = pads::remap(event.data1);

        debug!(
            "Key/Note {} value {} [mode {:?}, shift {}]",
            event.data1, event.data2, self.state.mode, self.state.shift
        );

        let kind = event.kind();
        let code = event.data1;

        for &binding in actions_for(code) {
            if binding == Binding::Unbound
                && code != SHIFT_BUTTON
                && self.state.mode != ControllerMode::User
            {
                event.handled = true;
                continue;
            }

            match kind {
                MessageKind::NoteOff => {
                    event.handled = true;
                    if code == SHIFT_BUTTON {
                        self.state.shift = false;
                    } else if binding.family() == Some(ActionFamily::Release) && !self.state.shift
                    {
                        self.run(binding, code)?;
                    }
                }
                MessageKind::NoteOn => {
                    event.handled = true;
                    if code == SHIFT_BUTTON {
                        self.state.shift = true;
                        debug!("Shift latched");
                    }

                    let shift = self.state.shift;
                    let mode = self.state.mode;
                    match binding.family() {
                        Some(ActionFamily::Shift) if shift => self.run(binding, code)?,
                        Some(ActionFamily::Global) if !shift => self.run(binding, code)?,
                        Some(ActionFamily::Transport)
                            if mode == ControllerMode::Transport && !shift =>
                        {
                            self.run(binding, code)?
                        }
                        Some(ActionFamily::Mixer) if mode == ControllerMode::Mixer && !shift => {
                            self.run(binding, code)?
                        }
                        _ if mode == ControllerMode::User && code != SHIFT_BUTTON => {
                            // Let the host's default note handling take it
                            event.handled = false;
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn run(&mut self, binding: Binding, note: u8) -> Result<(), DriverError> {
        match binding {
            Binding::Action(op) => self.action_context().invoke(op, note),
            Binding::Unbound => Ok(()),
        }
    }
}
