use crate::{
    config::InputConfig,
    gesture::{classify_button, is_valid_pulse, ButtonLevel, Sticks},
    pulse::ControlFrame,
    types::{ChannelId, Controller, Direction},
};

use super::types::ComboId;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ButtonKind {
    Toggle,
    Momentary,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ButtonSpec {
    pub channel: ChannelId,
    pub base: u8,
    pub kind: ButtonKind,
}

impl ButtonSpec {
    const fn new(controller: Controller, number: u8, base: u8, kind: ButtonKind) -> Self {
        Self {
            channel: ChannelId::new(controller, number),
            base,
            kind,
        }
    }

    /// A button is combined with the gesture on the other controller's stick.
    pub const fn gesture_source(self) -> Controller {
        self.channel.controller.other()
    }
}

/// Scan order; the first button to fire in a pass wins.
pub const COMBO_BUTTONS: [ButtonSpec; 8] = [
    ButtonSpec::new(Controller::A, 3, 1, ButtonKind::Toggle),
    ButtonSpec::new(Controller::A, 4, 2, ButtonKind::Toggle),
    ButtonSpec::new(Controller::A, 5, 3, ButtonKind::Toggle),
    ButtonSpec::new(Controller::A, 6, 4, ButtonKind::Momentary),
    ButtonSpec::new(Controller::B, 3, 17, ButtonKind::Toggle),
    ButtonSpec::new(Controller::B, 4, 18, ButtonKind::Toggle),
    ButtonSpec::new(Controller::B, 5, 19, ButtonKind::Toggle),
    ButtonSpec::new(Controller::B, 6, 20, ButtonKind::Momentary),
];

#[derive(Clone, Copy, Debug, Default)]
pub struct ToggleDetector {
    level: Option<ButtonLevel>,
}

impl ToggleDetector {
    /// True on any HIGH/LOW change. The first valid reading only seeds the level and
    /// invalid readings leave it untouched.
    pub fn update(&mut self, width_us: u16, cfg: &InputConfig) -> bool {
        let Some(level) = classify_button(width_us, cfg) else {
            return false;
        };
        let changed = self.level.is_some_and(|previous| previous != level);
        self.level = Some(level);
        changed
    }

    pub fn level(&self) -> Option<ButtonLevel> {
        self.level
    }
}

/// Fires once per press. Re-arms after the signal drops below the low threshold and the
/// debounce window since the last fire has passed.
#[derive(Clone, Copy, Debug, Default)]
pub struct MomentaryDetector {
    armed: bool,
    last_fire_ms: Option<u64>,
}

impl MomentaryDetector {
    pub fn update(&mut self, width_us: u16, now_ms: u64, cfg: &InputConfig) -> bool {
        if !is_valid_pulse(width_us, cfg) {
            return false;
        }
        if self.armed {
            if width_us >= cfg.momentary_high_us {
                self.armed = false;
                self.last_fire_ms = Some(now_ms);
                return true;
            }
            return false;
        }
        let settled = self
            .last_fire_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= cfg.momentary_debounce_ms);
        if width_us < cfg.momentary_low_us && settled {
            self.armed = true;
        }
        false
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

#[derive(Clone, Copy, Debug)]
enum ButtonDetector {
    Toggle(ToggleDetector),
    Momentary(MomentaryDetector),
}

impl ButtonDetector {
    const fn for_kind(kind: ButtonKind) -> Self {
        match kind {
            ButtonKind::Toggle => Self::Toggle(ToggleDetector { level: None }),
            ButtonKind::Momentary => Self::Momentary(MomentaryDetector {
                armed: false,
                last_fire_ms: None,
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Detection {
    pub id: ComboId,
    pub button: ButtonSpec,
    pub direction: Direction,
}

/// Edge detectors for the eight combo buttons.
#[derive(Clone, Debug)]
pub struct ComboDetectors {
    detectors: [ButtonDetector; COMBO_BUTTONS.len()],
}

impl Default for ComboDetectors {
    fn default() -> Self {
        Self::new()
    }
}

impl ComboDetectors {
    pub fn new() -> Self {
        Self {
            detectors: COMBO_BUTTONS.map(|button| ButtonDetector::for_kind(button.kind)),
        }
    }

    /// Updates every button and returns the first edge that coincides with a stick gesture.
    /// Later edges in the same pass still update their detector state.
    pub fn scan(
        &mut self,
        frame: &ControlFrame,
        sticks: &Sticks,
        cfg: &InputConfig,
    ) -> Option<Detection> {
        let mut first = None;
        for (button, detector) in COMBO_BUTTONS.iter().zip(self.detectors.iter_mut()) {
            let width = frame.width(button.channel);
            let edge = match detector {
                ButtonDetector::Toggle(toggle) => toggle.update(width, cfg),
                ButtonDetector::Momentary(momentary) => {
                    momentary.update(width, frame.now_ms, cfg)
                }
            };
            if !edge || first.is_some() {
                continue;
            }
            let Some(direction) = sticks.of(button.gesture_source()).primary() else {
                continue;
            };
            first = ComboId::new(button.base + direction.combo_offset()).map(|id| Detection {
                id,
                button: *button,
                direction,
            });
        }
        first
    }
}
