/// Exclusive top-level operating state. Discriminants double as the mode-select combo ids.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
#[repr(u8)]
pub enum Mode {
    #[default]
    Manual = 1,
    Automated = 2,
    Hybrid = 3,
    Carpet = 4,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Manual, Mode::Automated, Mode::Hybrid, Mode::Carpet];

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Manual),
            2 => Some(Self::Automated),
            3 => Some(Self::Hybrid),
            4 => Some(Self::Carpet),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automated => "automated",
            Self::Hybrid => "hybrid",
            Self::Carpet => "carpet",
        }
    }
}

/// One of the two hand-held transmitters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Controller {
    A = 0,
    B = 1,
}

impl Controller {
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
        }
    }
}

/// Stick directions in gesture priority order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Direction {
    Down = 0,
    Up = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    pub const PRIORITY: [Direction; 4] = [
        Direction::Down,
        Direction::Up,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Offset added to a button's base id when this direction is held.
    pub const fn combo_offset(self) -> u8 {
        self.index() * 4
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum MotorAxis {
    Drive = 0,
    Turn = 1,
    Dome = 2,
}

impl MotorAxis {
    pub const ALL: [MotorAxis; 3] = [MotorAxis::Drive, MotorAxis::Turn, MotorAxis::Dome];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Drive => "drive",
            Self::Turn => "turn",
            Self::Dome => "dome",
        }
    }
}

pub const CHANNELS_PER_CONTROLLER: usize = 6;
pub const CHANNEL_COUNT: usize = CHANNELS_PER_CONTROLLER * 2;

/// Receiver channel. Channel 1 is the horizontal stick axis, channel 2 the vertical one,
/// channels 3-5 are toggle buttons and channel 6 is the momentary button.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChannelId {
    pub controller: Controller,
    /// 1-based channel number on the controller.
    pub number: u8,
}

impl ChannelId {
    pub const fn new(controller: Controller, number: u8) -> Self {
        Self { controller, number }
    }

    pub const fn horizontal(controller: Controller) -> Self {
        Self::new(controller, 1)
    }

    pub const fn vertical(controller: Controller) -> Self {
        Self::new(controller, 2)
    }

    pub const fn index(self) -> usize {
        self.controller.index() * CHANNELS_PER_CONTROLLER + (self.number as usize - 1)
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        if index >= CHANNEL_COUNT {
            return None;
        }
        let controller = if index < CHANNELS_PER_CONTROLLER {
            Controller::A
        } else {
            Controller::B
        };
        Some(Self::new(
            controller,
            (index % CHANNELS_PER_CONTROLLER) as u8 + 1,
        ))
    }
}
