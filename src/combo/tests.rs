use super::{
    arbiter::{ArbiterOutput, ComboArbiter},
    types::{ArbiterAction, ComboId, RejectReason},
};
use crate::{
    config::active_config,
    gesture::Sticks,
    pulse::ControlFrame,
    types::{ChannelId, Controller, Mode, CHANNEL_COUNT},
};

const NEUTRAL: u16 = 1_500;
const LOW: u16 = 1_000;
const HIGH: u16 = 2_000;
const FRAME_MS: u64 = 20;

struct Rig {
    arbiter: ComboArbiter,
    now_ms: u64,
    widths: [u16; CHANNEL_COUNT],
}

impl Rig {
    fn new() -> Self {
        let mut rig = Self {
            arbiter: ComboArbiter::new(active_config()),
            now_ms: 1_000,
            widths: [LOW; CHANNEL_COUNT],
        };
        for controller in [Controller::A, Controller::B] {
            rig.set(controller, 1, NEUTRAL);
            rig.set(controller, 2, NEUTRAL);
        }
        // Seeds toggle levels and arms the momentary buttons.
        let _ = rig.step();
        rig
    }

    fn set(&mut self, controller: Controller, number: u8, width: u16) {
        self.widths[ChannelId::new(controller, number).index()] = width;
    }

    fn step_after(&mut self, advance_ms: u64) -> ArbiterOutput {
        self.now_ms += advance_ms;
        let mut frame = ControlFrame::empty(self.now_ms);
        for (index, width) in self.widths.iter().enumerate() {
            if let Some(channel) = ChannelId::from_index(index) {
                frame = frame.with_width(channel, *width);
            }
        }
        let sticks = Sticks::classify(&frame, &active_config().input);
        self.arbiter.tick(&frame, &sticks)
    }

    fn step(&mut self) -> ArbiterOutput {
        self.step_after(FRAME_MS)
    }

    /// Holds stick `stick` in a direction given as (vertical, horizontal) widths.
    fn hold(&mut self, stick: Controller, vertical: u16, horizontal: u16) {
        self.set(stick, 2, vertical);
        self.set(stick, 1, horizontal);
    }

    fn release_sticks(&mut self) {
        self.hold(Controller::A, NEUTRAL, NEUTRAL);
        self.hold(Controller::B, NEUTRAL, NEUTRAL);
    }

    fn flip(&mut self, controller: Controller, number: u8) -> ArbiterOutput {
        let index = ChannelId::new(controller, number).index();
        self.widths[index] = if self.widths[index] > 1_700 { LOW } else { HIGH };
        self.step()
    }

    fn switch_mode(&mut self, mode: Mode) {
        let number = match mode {
            Mode::Manual => 3,
            Mode::Automated => 4,
            Mode::Hybrid => 5,
            Mode::Carpet => 6,
        };
        self.hold(Controller::B, LOW, NEUTRAL);
        if number == 6 {
            self.set(Controller::A, 6, HIGH);
            let _ = self.step();
            self.set(Controller::A, 6, LOW);
            let _ = self.step_after(100);
        } else {
            let _ = self.flip(Controller::A, number);
        }
        self.release_sticks();
        let _ = self.step();
        assert_eq!(self.arbiter.mode(), mode);
    }
}

fn accepted(output: &ArbiterOutput) -> Option<u8> {
    output.actions.iter().find_map(|action| match action {
        ArbiterAction::ComboAccepted { id, .. } => Some(id.as_u8()),
        _ => None,
    })
}

fn rejected(output: &ArbiterOutput) -> Option<u8> {
    output.actions.iter().find_map(|action| match action {
        ArbiterAction::ComboRejected { id, .. } => Some(id.as_u8()),
        _ => None,
    })
}

#[test]
fn down_gesture_with_toggle_on_base_one_selects_manual() {
    let mut rig = Rig::new();
    rig.hold(Controller::B, LOW, NEUTRAL);

    let to_automated = rig.flip(Controller::A, 4);
    assert_eq!(to_automated.detection.map(|d| d.id.as_u8()), Some(2));
    assert_eq!(rig.arbiter.mode(), Mode::Automated);
    assert_eq!(rig.arbiter.current_combo(), ComboId::IDLE);

    let to_manual = rig.flip(Controller::A, 3);
    assert_eq!(to_manual.detection.map(|d| d.id.as_u8()), Some(1));
    assert_eq!(to_manual.actions.mode_change(), Some(Mode::Manual));
    assert_eq!(rig.arbiter.mode(), Mode::Manual);
    assert_eq!(rig.arbiter.current_combo(), ComboId::IDLE);
}

#[test]
fn edge_without_gesture_is_ignored() {
    let mut rig = Rig::new();
    let output = rig.flip(Controller::A, 4);
    assert!(output.detection.is_none());
    assert!(output.actions.is_empty());
    assert_eq!(rig.arbiter.mode(), Mode::Manual);
}

#[test]
fn toggle_fires_on_press_and_release() {
    let mut rig = Rig::new();
    rig.hold(Controller::B, HIGH, NEUTRAL);

    let press = rig.flip(Controller::A, 5);
    assert_eq!(accepted(&press), Some(7));
    let press_action = press.actions.iter().find_map(|action| match action {
        ArbiterAction::ComboAccepted { action, .. } => *action,
        _ => None,
    });
    assert_eq!(press_action.map(|a| a.label), Some("Full Awake"));

    let release = rig.flip(Controller::A, 5);
    assert_eq!(release.detection.map(|d| d.id.as_u8()), Some(7));
    assert_eq!(release.trace.reject_reason, RejectReason::Repeated);
    assert_eq!(rig.arbiter.current_combo().as_u8(), 7);
}

#[test]
fn action_combo_expires_after_reset_delay() {
    let mut rig = Rig::new();
    rig.hold(Controller::B, HIGH, NEUTRAL);
    let _ = rig.flip(Controller::A, 5);
    rig.release_sticks();
    let accepted_at = rig.now_ms;

    let before = rig.step_after(accepted_at + 999 - rig.now_ms);
    assert!(before.actions.is_empty());
    assert_eq!(rig.arbiter.current_combo().as_u8(), 7);

    let after = rig.step_after(1);
    assert!(after
        .actions
        .iter()
        .any(|action| matches!(action, ArbiterAction::ComboExpired { .. })));
    assert_eq!(rig.arbiter.current_combo(), ComboId::IDLE);
}

#[test]
fn same_combo_fires_again_after_expiry() {
    let mut rig = Rig::new();
    rig.hold(Controller::B, HIGH, NEUTRAL);
    let _ = rig.flip(Controller::A, 5);
    let _ = rig.step_after(1_000);
    assert_eq!(rig.arbiter.current_combo(), ComboId::IDLE);

    let again = rig.flip(Controller::A, 5);
    assert_eq!(accepted(&again), Some(7));
}

#[test]
fn manual_rejects_ids_above_ceiling_and_clears_active_combo() {
    let mut rig = Rig::new();
    rig.hold(Controller::B, HIGH, NEUTRAL);
    let _ = rig.flip(Controller::A, 5);
    assert_eq!(rig.arbiter.current_combo().as_u8(), 7);

    rig.hold(Controller::A, LOW, NEUTRAL);
    let output = rig.flip(Controller::B, 3);
    assert_eq!(rejected(&output), Some(17));
    assert_eq!(output.trace.reject_reason, RejectReason::NotWhitelisted);
    assert_eq!(rig.arbiter.current_combo(), ComboId::IDLE);
}

#[test]
fn whitelist_ceiling_follows_the_active_mode_state() {
    let mut rig = Rig::new();
    rig.hold(Controller::A, LOW, NEUTRAL);
    let manual = rig.flip(Controller::B, 3);
    assert_eq!(rejected(&manual), Some(17));
    assert_eq!(manual.trace.mode, Mode::Manual);

    rig.release_sticks();
    let _ = rig.step();
    rig.switch_mode(Mode::Automated);
    rig.hold(Controller::A, LOW, NEUTRAL);
    let automated = rig.flip(Controller::B, 3);
    assert_eq!(accepted(&automated), Some(17));
    assert_eq!(automated.trace.mode, Mode::Automated);

    rig.release_sticks();
    let _ = rig.step();
    rig.switch_mode(Mode::Carpet);
    assert_eq!(rig.arbiter.current_combo(), ComboId::IDLE);
    rig.hold(Controller::A, LOW, NEUTRAL);
    let carpet = rig.flip(Controller::B, 3);
    assert_eq!(rejected(&carpet), Some(17));
    assert_eq!(carpet.trace.mode, Mode::Carpet);
}

#[test]
fn hybrid_accepts_up_to_sixteen() {
    let mut rig = Rig::new();
    rig.switch_mode(Mode::Hybrid);

    rig.hold(Controller::B, NEUTRAL, HIGH);
    let right = rig.flip(Controller::A, 3);
    assert_eq!(accepted(&right), Some(13));

    rig.release_sticks();
    rig.hold(Controller::A, LOW, NEUTRAL);
    let high_id = rig.flip(Controller::B, 3);
    assert_eq!(rejected(&high_id), Some(17));
}

#[test]
fn automated_accepts_every_action_id() {
    let mut rig = Rig::new();
    rig.switch_mode(Mode::Automated);

    rig.hold(Controller::A, NEUTRAL, HIGH);
    rig.set(Controller::B, 6, HIGH);
    let output = rig.step();
    assert_eq!(accepted(&output), Some(32));
}

#[test]
fn mode_id_resets_combo_even_without_mode_change() {
    let mut rig = Rig::new();
    rig.hold(Controller::B, HIGH, NEUTRAL);
    let _ = rig.flip(Controller::A, 5);
    assert_eq!(rig.arbiter.current_combo().as_u8(), 7);

    rig.hold(Controller::B, LOW, NEUTRAL);
    let output = rig.flip(Controller::A, 3);
    assert_eq!(output.detection.map(|d| d.id.as_u8()), Some(1));
    assert_eq!(output.actions.mode_change(), None);
    assert_eq!(rig.arbiter.mode(), Mode::Manual);
    assert_eq!(rig.arbiter.current_combo(), ComboId::IDLE);
}

#[test]
fn momentary_held_for_200ms_triggers_once() {
    let mut rig = Rig::new();
    rig.switch_mode(Mode::Automated);
    rig.hold(Controller::A, LOW, NEUTRAL);
    rig.set(Controller::B, 6, HIGH);

    let mut detections = 0;
    for _ in 0..10 {
        let output = rig.step();
        if output.detection.is_some() {
            detections += 1;
        }
    }
    assert_eq!(detections, 1);
    assert_eq!(rig.arbiter.current_combo().as_u8(), 20);
}

#[test]
fn momentary_bounce_inside_debounce_window_does_not_refire() {
    let mut rig = Rig::new();
    rig.switch_mode(Mode::Automated);
    rig.hold(Controller::A, LOW, NEUTRAL);

    rig.set(Controller::B, 6, HIGH);
    assert!(rig.step().detection.is_some());

    rig.set(Controller::B, 6, LOW);
    let _ = rig.step_after(20);
    rig.set(Controller::B, 6, HIGH);
    assert!(rig.step_after(20).detection.is_none());

    rig.set(Controller::B, 6, LOW);
    let _ = rig.step_after(40);
    rig.set(Controller::B, 6, HIGH);
    assert!(rig.step_after(20).detection.is_some());
}

#[test]
fn first_button_in_scan_order_wins_a_pass() {
    let mut rig = Rig::new();
    rig.switch_mode(Mode::Automated);
    rig.hold(Controller::A, LOW, NEUTRAL);
    rig.hold(Controller::B, HIGH, NEUTRAL);

    rig.set(Controller::A, 5, HIGH);
    rig.set(Controller::B, 3, HIGH);
    let output = rig.step();
    assert_eq!(output.detection.map(|d| d.id.as_u8()), Some(7));

    // The losing edge was consumed, not deferred.
    let next = rig.step();
    assert!(next.detection.is_none());
}

#[test]
fn invalid_pulse_does_not_reset_toggle_state() {
    let mut rig = Rig::new();
    rig.hold(Controller::B, HIGH, NEUTRAL);

    rig.set(Controller::A, 5, 0);
    assert!(rig.step().detection.is_none());
    rig.set(Controller::A, 5, LOW);
    assert!(rig.step().detection.is_none());
    rig.set(Controller::A, 5, 2_500);
    assert!(rig.step().detection.is_none());
    rig.set(Controller::A, 5, HIGH);
    assert_eq!(rig.step().detection.map(|d| d.id.as_u8()), Some(7));
}

#[test]
fn diagonal_gesture_resolves_to_down_before_right() {
    let mut rig = Rig::new();
    rig.switch_mode(Mode::Automated);
    rig.hold(Controller::B, LOW, HIGH);
    let output = rig.flip(Controller::A, 3);
    assert_eq!(output.detection.map(|d| d.id.as_u8()), Some(1));
}

#[test]
fn trace_tracks_mode_and_combo() {
    let mut rig = Rig::new();
    rig.hold(Controller::B, HIGH, NEUTRAL);
    let output = rig.flip(Controller::A, 5);
    assert_eq!(output.trace.mode, Mode::Manual);
    assert_eq!(output.trace.combo.as_u8(), 7);
    assert_eq!(output.trace.detected.as_u8(), 7);
    assert_eq!(output.trace.now_ms, rig.now_ms);
}
