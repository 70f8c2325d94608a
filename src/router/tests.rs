//! Tests for Router module

use super::*;
use crate::host::{Host, SeekSpeed};
use crate::midi::{MidiEvent, NOTE_OFF, NOTE_ON};
use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// Host command as seen by the recording double
#[derive(Debug, Clone, PartialEq, Eq)]
enum HostCall {
    Start,
    Stop,
    Record,
    SetLoopMode,
    FastForward(SeekSpeed),
    Rewind(SeekSpeed),
}

#[derive(Default)]
struct RecordingHost {
    playing: bool,
    calls: Vec<HostCall>,
    live: HashMap<(u8, u8), u8>,
    fail_commands: bool,
}

impl RecordingHost {
    fn push(&mut self, call: HostCall) -> Result<()> {
        if self.fail_commands {
            return Err(anyhow!("bridge offline"));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl Host for RecordingHost {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn start(&mut self) -> Result<()> {
        self.playing = true;
        self.push(HostCall::Start)
    }

    fn stop(&mut self) -> Result<()> {
        self.playing = false;
        self.push(HostCall::Stop)
    }

    fn record(&mut self) -> Result<()> {
        self.push(HostCall::Record)
    }

    fn set_loop_mode(&mut self) -> Result<()> {
        self.push(HostCall::SetLoopMode)
    }

    fn fast_forward(&mut self, speed: SeekSpeed) -> Result<()> {
        self.push(HostCall::FastForward(speed))
    }

    fn rewind(&mut self, speed: SeekSpeed) -> Result<()> {
        self.push(HostCall::Rewind(speed))
    }

    fn live_block_status(&self, row: u8, col: u8, _layer: u8) -> u8 {
        self.live.get(&(row, col)).copied().unwrap_or(0)
    }
}

type TestRouter = Router<RecordingHost, Vec<u32>>;

fn make_router() -> TestRouter {
    let mut router = Router::new(RecordingHost::default(), Vec::new());
    router.on_init();
    router.leds_mut().sink_mut().clear();
    router
}

fn note_on(code: u8) -> MidiEvent {
    MidiEvent::try_new(0, NOTE_ON, code, 127).unwrap()
}

fn note_off(code: u8) -> MidiEvent {
    MidiEvent::try_new(0, NOTE_OFF, code, 0).unwrap()
}

fn press(router: &mut TestRouter, code: u8) -> MidiEvent {
    let mut event = note_on(code);
    router.on_midi_msg(&mut event).unwrap();
    event
}

fn release(router: &mut TestRouter, code: u8) -> MidiEvent {
    let mut event = note_off(code);
    router.on_midi_msg(&mut event).unwrap();
    event
}

fn sent(router: &TestRouter) -> &[u32] {
    router.leds().sink()
}

fn led(note: u32, value: u32) -> u32 {
    0x90 + (note << 8) + (value << 16)
}

fn kill_all_sequence() -> Vec<u32> {
    (82..87)
        .chain(0..40)
        .chain(64..72)
        .map(|note| led(note, 0))
        .collect()
}

#[test]
fn test_startup_enters_transport_mode() {
    let mut router = Router::new(RecordingHost::default(), Vec::<u32>::new());
    assert_eq!(router.mode(), ControllerMode::User);

    router.on_init();

    assert_eq!(router.mode(), ControllerMode::Transport);
    assert!(!router.shift_held());
    assert!(router.host().calls.is_empty());

    let mut expected = kill_all_sequence();
    expected.push(led(82, 1));
    assert_eq!(sent(&router), expected.as_slice());
}

#[test]
fn test_shift_combo_sets_pattern_mode() {
    let mut router = make_router();

    press(&mut router, SHIFT_BUTTON);
    assert!(router.shift_held());

    let event = press(&mut router, 85);
    assert!(event.handled);
    assert_eq!(router.mode(), ControllerMode::Pattern);

    let mut expected = kill_all_sequence();
    expected.push(led(85, 1));
    assert_eq!(sent(&router), expected.as_slice());

    release(&mut router, SHIFT_BUTTON);
    assert!(!router.shift_held());
}

#[test]
fn test_mode_buttons_without_shift_do_nothing() {
    let mut router = make_router();

    let event = press(&mut router, 83);

    assert!(event.handled);
    assert_eq!(router.mode(), ControllerMode::Transport);
    assert!(sent(&router).is_empty());
}

#[test]
fn test_mode_change_is_idempotent_on_leds() {
    let mut once = make_router();
    press(&mut once, SHIFT_BUTTON);
    press(&mut once, 83);
    let single = sent(&once).to_vec();

    let mut twice = make_router();
    press(&mut twice, SHIFT_BUTTON);
    press(&mut twice, 83);
    twice.leds_mut().sink_mut().clear();
    press(&mut twice, 83);

    assert_eq!(twice.mode(), ControllerMode::Mixer);
    assert_eq!(sent(&twice), single.as_slice());
}

#[test]
fn test_rewind_press_and_release() {
    let mut router = make_router();

    press(&mut router, 66);
    let event = release(&mut router, 66);

    assert!(event.handled);
    assert_eq!(
        router.host().calls,
        vec![
            HostCall::Rewind(SeekSpeed::Active),
            HostCall::Rewind(SeekSpeed::Stop)
        ]
    );
    assert_eq!(sent(&router), &[led(66, 1), led(66, 0)]);
}

#[test]
fn test_fast_forward_press_and_release() {
    let mut router = make_router();

    press(&mut router, 67);
    release(&mut router, 67);

    assert_eq!(
        router.host().calls,
        vec![
            HostCall::FastForward(SeekSpeed::Active),
            HostCall::FastForward(SeekSpeed::Stop)
        ]
    );
    assert_eq!(sent(&router).last(), Some(&led(67, 0)));
}

#[test]
fn test_release_ignored_while_shift_held() {
    let mut router = make_router();

    press(&mut router, 66);
    press(&mut router, SHIFT_BUTTON);
    release(&mut router, 66);

    assert_eq!(router.host().calls, vec![HostCall::Rewind(SeekSpeed::Active)]);
}

#[test]
fn test_release_ignored_outside_transport_mode() {
    let mut router = make_router();
    press(&mut router, SHIFT_BUTTON);
    press(&mut router, 84);
    release(&mut router, SHIFT_BUTTON);
    assert_eq!(router.mode(), ControllerMode::Browser);

    press(&mut router, 66);
    release(&mut router, 66);

    assert!(router.host().calls.is_empty());
}

#[test]
fn test_toggle_play() {
    let mut router = make_router();

    press(&mut router, 91);
    assert!(router.host().is_playing());

    press(&mut router, 91);
    assert!(!router.host().is_playing());

    assert_eq!(router.host().calls, vec![HostCall::Start, HostCall::Stop]);
}

#[test]
fn test_global_actions_work_in_every_mode() {
    let mut router = make_router();
    press(&mut router, SHIFT_BUTTON);
    press(&mut router, 81);
    release(&mut router, SHIFT_BUTTON);
    assert_eq!(router.mode(), ControllerMode::User);

    let event = press(&mut router, 91);

    assert!(event.handled);
    assert_eq!(router.host().calls, vec![HostCall::Start]);
}

#[test]
fn test_record_only_while_stopped() {
    let mut router = make_router();

    press(&mut router, 93);
    router.host_mut().playing = true;
    press(&mut router, 93);

    assert_eq!(router.host().calls, vec![HostCall::Record]);
}

#[test]
fn test_playlist_button_double_dispatch() {
    let mut router = make_router();

    // Transport mode, shift off: only the loop toggle fires
    press(&mut router, 86);
    assert_eq!(router.host().calls, vec![HostCall::SetLoopMode]);
    assert_eq!(router.mode(), ControllerMode::Transport);

    // Shift held: only the mode setter fires
    press(&mut router, SHIFT_BUTTON);
    press(&mut router, 86);
    assert_eq!(router.mode(), ControllerMode::Playlist);
    assert_eq!(router.host().calls, vec![HostCall::SetLoopMode]);
}

#[test]
fn test_loop_toggle_skipped_while_playing() {
    let mut router = make_router();
    router.host_mut().playing = true;

    press(&mut router, 86);

    assert!(router.host().calls.is_empty());
}

#[test]
fn test_user_mode_leaves_unbound_pads_to_host() {
    let mut router = make_router();
    press(&mut router, SHIFT_BUTTON);
    press(&mut router, 81);
    release(&mut router, SHIFT_BUTTON);
    assert_eq!(router.mode(), ControllerMode::User);

    let mut event = note_on(12);
    router.on_midi_msg(&mut event).unwrap();

    assert!(!event.handled);
    assert_eq!(event.data1, crate::pads::remap(12));
}

#[test]
fn test_unbound_pads_swallowed_outside_user_mode() {
    let mut router = make_router();

    let on = press(&mut router, 12);
    let off = release(&mut router, 12);

    assert!(on.handled);
    assert!(off.handled);
    assert!(router.host().calls.is_empty());
}

#[test]
fn test_shift_button_handled_in_user_mode() {
    let mut router = make_router();
    press(&mut router, SHIFT_BUTTON);
    press(&mut router, 81);

    let event = press(&mut router, SHIFT_BUTTON);

    assert!(event.handled);
    assert!(router.shift_held());
}

#[test]
fn test_other_channels_ignored() {
    let mut router = make_router();

    let mut event = MidiEvent::try_new(1, NOTE_ON, 91, 100).unwrap();
    router.on_midi_msg(&mut event).unwrap();

    assert!(!event.handled);
    assert!(router.host().calls.is_empty());
}

#[test]
fn test_keybed_note_left_unchanged() {
    let mut router = make_router();

    let mut event = MidiEvent::try_new(1, NOTE_ON, 36, 100).unwrap();
    let wire = event.encode();
    router.on_midi_in(&mut event).unwrap();
    router.on_midi_msg(&mut event).unwrap();

    assert_eq!(event.data1, 36);
    assert!(!event.handled);
    assert_eq!(event.encode(), wire);
    assert!(sent(&router).is_empty());
}

#[test]
fn test_grid_pads_remapped_on_surface_channel() {
    let mut router = make_router();

    let mut event = MidiEvent::try_new(1, NOTE_ON, 36, 100)
        .unwrap()
        .with_system(true);
    router.on_midi_msg(&mut event).unwrap();
    assert_eq!(event.data1, 4);

    let mut event = note_on(36);
    router.on_midi_msg(&mut event).unwrap();
    assert_eq!(event.data1, 4);
}

#[test]
fn test_system_flag_overrides_channel_filter() {
    let mut router = make_router();

    let mut event = MidiEvent::try_new(1, NOTE_ON, 91, 100)
        .unwrap()
        .with_system(true);
    router.on_midi_msg(&mut event).unwrap();

    assert!(event.handled);
    assert_eq!(router.host().calls, vec![HostCall::Start]);
}

#[test]
fn test_host_failure_propagates() {
    let mut router = make_router();
    router.host_mut().fail_commands = true;

    let mut event = note_on(91);
    let err = router.on_midi_msg(&mut event).unwrap_err();

    assert!(matches!(err, DriverError::Host(_)));
}

#[test]
fn test_knob_ticks_become_levels() {
    let mut router = make_router();

    let mut up = MidiEvent::try_new(0, crate::midi::CONTROL_CHANGE, 48, 127).unwrap();
    router.on_midi_in(&mut up).unwrap();
    assert_eq!(up.data2, 2);

    let mut down = MidiEvent::try_new(0, crate::midi::CONTROL_CHANGE, 48, 1).unwrap();
    router.on_midi_in(&mut down).unwrap();
    assert_eq!(down.data2, 1);

    let mut floor = MidiEvent::try_new(0, crate::midi::CONTROL_CHANGE, 48, 1).unwrap();
    router.on_midi_in(&mut floor).unwrap();
    assert_eq!(floor.data2, 1);
    assert_eq!(router.knobs().value(48).unwrap(), 1);
}

#[test]
fn test_non_knob_input_untouched() {
    let mut router = make_router();

    let mut cc = MidiEvent::try_new(0, crate::midi::CONTROL_CHANGE, 7, 127).unwrap();
    router.on_midi_in(&mut cc).unwrap();
    assert_eq!(cc.data2, 127);

    let mut note = MidiEvent::try_new(0, NOTE_ON, 50, 127).unwrap();
    router.on_midi_in(&mut note).unwrap();
    assert_eq!(note.data2, 127);
}

#[test]
fn test_live_grid_refresh() {
    let mut router = make_router();
    router.host_mut().live.insert((1, 0), 7);
    router.host_mut().live.insert((1, 1), 3);

    router.on_update_live_mode(0);

    let pad_a = mapped_pad(1, 0).unwrap() as u32;
    let pad_b = mapped_pad(1, 1).unwrap() as u32;
    let msgs = sent(&router);
    assert_eq!(msgs.len(), 40);
    assert_eq!(msgs[0], (0x90 + 6) + (pad_a << 8) + (30 << 16));
    assert_eq!(msgs[1], (0x90 + 1) + (pad_b << 8) + (30 << 16));
    assert_eq!(msgs[2], led(mapped_pad(1, 2).unwrap() as u32, 0));
}

#[test]
fn test_live_grid_idle_cell_turns_off() {
    let mut router = make_router();

    router.on_update_live_mode(0);

    let pad = mapped_pad(1, 0).unwrap() as u32;
    assert_eq!(sent(&router)[0], led(pad, 0));
    assert!(sent(&router).iter().all(|m| m >> 16 == 0));
}

#[test]
fn test_live_grid_is_idempotent() {
    let mut router = make_router();
    router.host_mut().live.insert((3, 4), 7);

    router.on_update_live_mode(0);
    let first = sent(&router).to_vec();
    router.leds_mut().sink_mut().clear();
    router.on_update_live_mode(1);

    assert_eq!(sent(&router), first.as_slice());
}

#[test]
fn test_beat_indicator_through_router() {
    let mut router = make_router();

    assert_eq!(router.on_update_beat_indicator(1), LedOutcome::Sent);
    assert_eq!(router.on_update_beat_indicator(1), LedOutcome::Unchanged);
    assert_eq!(sent(&router).len(), 1);
}

#[test]
fn test_deinit_kills_lights() {
    let mut router = make_router();

    router.on_deinit();

    assert_eq!(sent(&router), kill_all_sequence().as_slice());
}
