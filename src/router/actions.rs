//! Action families and the note → action table

use super::ControllerMode;
use crate::error::DriverError;
use crate::host::{Host, SeekSpeed};
use crate::leds::{LedDriver, MidiSink};
use tracing::info;

/// Shift button code
pub const SHIFT_BUTTON: u8 = 98;

/// Button the startup call pretends was pressed to enter Transport mode
pub const STARTUP_MODE_BUTTON: u8 = 82;

/// Gate under which an operation may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFamily {
    /// Independent of mode, shift off
    Global,
    /// Transport mode, shift off
    Transport,
    /// Shift held
    Shift,
    /// Note Off, shift off
    Release,
    /// Mixer mode, shift off. No operations are bound yet.
    Mixer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    TogglePlay,
    ToggleRecord,
    ToggleLoopMode,
    PressFastForward,
    PressRewind,
    ReleaseFastForward,
    ReleaseRewind,
    SetMode(ControllerMode),
}

impl Operation {
    pub fn family(self) -> ActionFamily {
        match self {
            Operation::TogglePlay | Operation::ToggleRecord => ActionFamily::Global,
            Operation::ToggleLoopMode | Operation::PressFastForward | Operation::PressRewind => {
                ActionFamily::Transport
            }
            Operation::ReleaseFastForward | Operation::ReleaseRewind => ActionFamily::Release,
            Operation::SetMode(_) => ActionFamily::Shift,
        }
    }
}

/// One entry of a button's action list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Sentinel for buttons absent from the table
    Unbound,
    Action(Operation),
}

impl Binding {
    pub fn family(self) -> Option<ActionFamily> {
        match self {
            Binding::Unbound => None,
            Binding::Action(op) => Some(op.family()),
        }
    }
}

const UNBOUND: &[Binding] = &[Binding::Unbound];

/// Ordered action list for a logical button code
pub fn actions_for(code: u8) -> &'static [Binding] {
    use ControllerMode::*;
    use Operation::*;

    match code {
        // Play/Pause
        91 => &[Binding::Action(TogglePlay)],
        // Record
        93 => &[Binding::Action(ToggleRecord)],
        // Clip Stop
        82 => &[Binding::Action(SetMode(Transport))],
        // Solo
        83 => &[Binding::Action(SetMode(Mixer))],
        84 => &[Binding::Action(SetMode(Browser))],
        85 => &[Binding::Action(SetMode(Pattern))],
        86 => &[
            Binding::Action(SetMode(Playlist)),
            Binding::Action(ToggleLoopMode),
        ],
        81 => &[Binding::Action(SetMode(User))],
        66 => &[Binding::Action(PressRewind), Binding::Action(ReleaseRewind)],
        67 => &[
            Binding::Action(PressFastForward),
            Binding::Action(ReleaseFastForward),
        ],
        _ => UNBOUND,
    }
}

/// Mutable state handed to every operation
pub struct ActionContext<'a, H, S> {
    pub mode: &'a mut ControllerMode,
    pub host: &'a mut H,
    pub leds: &'a mut LedDriver<S>,
}

impl<H: Host, S: MidiSink> ActionContext<'_, H, S> {
    /// Run `op` for the button `note`
    pub fn invoke(&mut self, op: Operation, note: u8) -> Result<(), DriverError> {
        match op {
            Operation::TogglePlay => {
                if self.host.is_playing() {
                    self.host.stop()?;
                    info!("Stopping playback");
                } else {
                    self.host.start()?;
                    info!("Starting playback");
                }
            }
            Operation::ToggleRecord => {
                // Only arm recording while stopped
                if !self.host.is_playing() {
                    self.host.record()?;
                    info!("Toggle recording");
                }
            }
            Operation::ToggleLoopMode => {
                if !self.host.is_playing() {
                    self.host.set_loop_mode()?;
                    info!("Song/Pattern mode toggled");
                }
            }
            Operation::PressFastForward => {
                self.host.fast_forward(SeekSpeed::Active)?;
                self.leds.set_led_mono(note, false);
                info!("Fast forward on");
            }
            Operation::PressRewind => {
                self.host.rewind(SeekSpeed::Active)?;
                self.leds.set_led_mono(note, false);
                info!("Rewind on");
            }
            Operation::ReleaseFastForward => {
                if *self.mode == ControllerMode::Transport {
                    self.host.fast_forward(SeekSpeed::Stop)?;
                    self.leds.led_off(note);
                    info!("Fast forward off");
                }
            }
            Operation::ReleaseRewind => {
                if *self.mode == ControllerMode::Transport {
                    self.host.rewind(SeekSpeed::Stop)?;
                    self.leds.led_off(note);
                    info!("Rewind off");
                }
            }
            Operation::SetMode(target) => self.change_mode(target, note),
        }
        Ok(())
    }

    /// Clear every LED, switch mode, light the triggering button
    ///
    /// Per-mode LED state is not restored.
    pub fn change_mode(&mut self, target: ControllerMode, note: u8) {
        info!("Controller mode: {:?} → {:?}", *self.mode, target);
        self.leds.kill_all_lights();
        *self.mode = target;
        self.leds.set_led_mono(note, false);
    }
}
