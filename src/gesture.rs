use crate::{
    config::InputConfig,
    pulse::ControlFrame,
    types::{ChannelId, Controller, Direction},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ButtonLevel {
    Low,
    High,
}

pub fn is_valid_pulse(width_us: u16, cfg: &InputConfig) -> bool {
    width_us >= cfg.valid_min_us && width_us <= cfg.valid_max_us
}

/// Button level with a single threshold. `None` for missing or out-of-range pulses.
pub fn classify_button(width_us: u16, cfg: &InputConfig) -> Option<ButtonLevel> {
    if !is_valid_pulse(width_us, cfg) {
        return None;
    }
    if width_us > cfg.toggle_threshold_us {
        Some(ButtonLevel::High)
    } else {
        Some(ButtonLevel::Low)
    }
}

/// Button level with a dead band between release and threshold; inside it the previous
/// level is kept.
pub fn classify_button_hysteresis(
    width_us: u16,
    previous: Option<ButtonLevel>,
    cfg: &InputConfig,
) -> Option<ButtonLevel> {
    if !is_valid_pulse(width_us, cfg) {
        return None;
    }
    if width_us > cfg.toggle_threshold_us {
        Some(ButtonLevel::High)
    } else if width_us < cfg.toggle_release_us {
        Some(ButtonLevel::Low)
    } else {
        previous
    }
}

pub fn classify_vertical(width_us: u16, cfg: &InputConfig) -> Option<Direction> {
    if !is_valid_pulse(width_us, cfg) {
        return None;
    }
    if width_us <= cfg.stick_low_max_us {
        Some(Direction::Down)
    } else if width_us >= cfg.stick_high_min_us && width_us <= cfg.stick_up_max_us {
        Some(Direction::Up)
    } else {
        None
    }
}

pub fn classify_horizontal(width_us: u16, cfg: &InputConfig) -> Option<Direction> {
    if !is_valid_pulse(width_us, cfg) {
        return None;
    }
    if width_us <= cfg.stick_low_max_us {
        Some(Direction::Left)
    } else if width_us >= cfg.stick_high_min_us {
        Some(Direction::Right)
    } else {
        None
    }
}

/// Directions currently held on one stick. Axes are independent, so a diagonal sets two flags.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StickGesture {
    bits: u8,
}

impl StickGesture {
    pub const NONE: Self = Self { bits: 0 };

    pub fn classify(vertical_us: u16, horizontal_us: u16, cfg: &InputConfig) -> Self {
        let mut gesture = Self::NONE;
        if let Some(direction) = classify_vertical(vertical_us, cfg) {
            gesture = gesture.with(direction);
        }
        if let Some(direction) = classify_horizontal(horizontal_us, cfg) {
            gesture = gesture.with(direction);
        }
        gesture
    }

    pub const fn with(self, direction: Direction) -> Self {
        Self {
            bits: self.bits | (1 << direction.index()),
        }
    }

    pub const fn is_held(self, direction: Direction) -> bool {
        self.bits & (1 << direction.index()) != 0
    }

    pub const fn any(self) -> bool {
        self.bits != 0
    }

    /// Highest-priority held direction (down, up, left, right).
    pub fn primary(self) -> Option<Direction> {
        Direction::PRIORITY
            .into_iter()
            .find(|direction| self.is_held(*direction))
    }
}

/// Both sticks classified once per frame; shared by combo detection and the kill switch.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Sticks {
    pub a: StickGesture,
    pub b: StickGesture,
}

impl Sticks {
    pub fn classify(frame: &ControlFrame, cfg: &InputConfig) -> Self {
        let stick = |controller| {
            StickGesture::classify(
                frame.width(ChannelId::vertical(controller)),
                frame.width(ChannelId::horizontal(controller)),
                cfg,
            )
        };
        Self {
            a: stick(Controller::A),
            b: stick(Controller::B),
        }
    }

    pub const fn of(&self, controller: Controller) -> StickGesture {
        match controller {
            Controller::A => self.a,
            Controller::B => self.b,
        }
    }
}

/// Set of (controller, direction) gestures. Bit `controller * 4 + direction`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GestureSet(u8);

impl GestureSet {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn with(self, controller: Controller, direction: Direction) -> Self {
        Self(self.0 | Self::bit(controller, direction))
    }

    pub const fn contains(self, controller: Controller, direction: Direction) -> bool {
        self.0 & Self::bit(controller, direction) != 0
    }

    /// True when any held direction on either stick is in the set.
    pub fn matches(self, sticks: &Sticks) -> bool {
        [Controller::A, Controller::B].into_iter().any(|controller| {
            let stick = sticks.of(controller);
            Direction::PRIORITY
                .into_iter()
                .any(|direction| stick.is_held(direction) && self.contains(controller, direction))
        })
    }

    const fn bit(controller: Controller, direction: Direction) -> u8 {
        1 << (controller.index() as u8 * 4 + direction.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::active_config;

    fn input() -> &'static InputConfig {
        &active_config().input
    }

    #[test]
    fn vertical_bands_partition_the_valid_range() {
        let cfg = input();
        for width in (cfg.valid_min_us..=cfg.valid_max_us).step_by(5) {
            let expected = if width <= 1300 {
                Some(Direction::Down)
            } else if (1700..=2100).contains(&width) {
                Some(Direction::Up)
            } else {
                None
            };
            assert_eq!(classify_vertical(width, cfg), expected, "width {width}");
        }
    }

    #[test]
    fn horizontal_bands_partition_the_valid_range() {
        let cfg = input();
        for width in (cfg.valid_min_us..=cfg.valid_max_us).step_by(5) {
            let expected = if width <= 1300 {
                Some(Direction::Left)
            } else if width >= 1700 {
                Some(Direction::Right)
            } else {
                None
            };
            assert_eq!(classify_horizontal(width, cfg), expected, "width {width}");
        }
    }

    #[test]
    fn out_of_range_pulses_classify_as_nothing() {
        let cfg = input();
        for width in [0, 1, 899, 2201, 3000, u16::MAX] {
            assert_eq!(classify_vertical(width, cfg), None);
            assert_eq!(classify_horizontal(width, cfg), None);
            assert_eq!(classify_button(width, cfg), None);
            assert_eq!(
                classify_button_hysteresis(width, Some(ButtonLevel::High), cfg),
                None
            );
        }
    }

    #[test]
    fn button_threshold_has_no_dead_band() {
        let cfg = input();
        assert_eq!(classify_button(1700, cfg), Some(ButtonLevel::Low));
        assert_eq!(classify_button(1701, cfg), Some(ButtonLevel::High));
        assert_eq!(classify_button(900, cfg), Some(ButtonLevel::Low));
    }

    #[test]
    fn hysteresis_keeps_previous_level_inside_dead_band() {
        let cfg = input();
        assert_eq!(
            classify_button_hysteresis(1500, Some(ButtonLevel::High), cfg),
            Some(ButtonLevel::High)
        );
        assert_eq!(
            classify_button_hysteresis(1500, Some(ButtonLevel::Low), cfg),
            Some(ButtonLevel::Low)
        );
        assert_eq!(classify_button_hysteresis(1500, None, cfg), None);
        assert_eq!(
            classify_button_hysteresis(1200, Some(ButtonLevel::High), cfg),
            Some(ButtonLevel::Low)
        );
    }

    #[test]
    fn diagonal_resolves_by_priority() {
        let cfg = input();
        let down_right = StickGesture::classify(1000, 2000, cfg);
        assert!(down_right.is_held(Direction::Down));
        assert!(down_right.is_held(Direction::Right));
        assert_eq!(down_right.primary(), Some(Direction::Down));

        let up_left = StickGesture::classify(1900, 1000, cfg);
        assert_eq!(up_left.primary(), Some(Direction::Up));

        let left_only = StickGesture::classify(1500, 1000, cfg);
        assert_eq!(left_only.primary(), Some(Direction::Left));

        assert_eq!(StickGesture::classify(1500, 1500, cfg).primary(), None);
        assert!(!StickGesture::classify(0, 0, cfg).any());
    }

    #[test]
    fn gesture_set_matches_held_directions_only() {
        let set = GestureSet::EMPTY
            .with(Controller::B, Direction::Down)
            .with(Controller::B, Direction::Up);
        assert_eq!(set.bits(), 0b0011_0000);

        let b_down = Sticks {
            a: StickGesture::NONE,
            b: StickGesture::NONE.with(Direction::Down),
        };
        let a_down = Sticks {
            a: StickGesture::NONE.with(Direction::Down),
            b: StickGesture::NONE,
        };
        assert!(set.matches(&b_down));
        assert!(!set.matches(&a_down));
        assert!(!GestureSet::EMPTY.matches(&b_down));
    }
}
