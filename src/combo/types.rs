use crate::{config::ComboAction, types::Mode};

/// Combo id in `0..=32`. 0 means no active combo, 1-4 select a mode, 5-32 are actions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct ComboId(u8);

impl ComboId {
    pub const IDLE: Self = Self(0);
    pub const MAX: u8 = 32;

    pub const fn new(raw: u8) -> Option<Self> {
        if raw > Self::MAX {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }

    pub const fn is_idle(self) -> bool {
        self.0 == 0
    }

    pub const fn mode(self) -> Option<Mode> {
        Mode::from_u8(self.0)
    }

    pub const fn is_action(self) -> bool {
        self.0 > 4
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArbiterAction {
    ModeChanged {
        from: Mode,
        to: Mode,
    },
    ComboAccepted {
        id: ComboId,
        action: Option<&'static ComboAction>,
    },
    ComboRejected {
        id: ComboId,
        reason: RejectReason,
    },
    ComboExpired {
        id: ComboId,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ActionBuffer {
    len: usize,
    slots: [Option<ArbiterAction>; Self::MAX],
}

impl ActionBuffer {
    pub const MAX: usize = 4;

    pub const fn new() -> Self {
        Self {
            len: 0,
            slots: [None; Self::MAX],
        }
    }

    pub fn push(&mut self, action: ArbiterAction) {
        if self.len >= Self::MAX {
            return;
        }
        self.slots[self.len] = Some(action);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArbiterAction> {
        self.slots[..self.len].iter().filter_map(Option::as_ref)
    }

    pub fn mode_change(&self) -> Option<Mode> {
        self.iter().find_map(|action| match action {
            ArbiterAction::ModeChanged { to, .. } => Some(*to),
            _ => None,
        })
    }
}

impl Default for ActionBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(u8)]
pub enum RejectReason {
    #[default]
    None = 0,
    /// The id is above the current mode's whitelist ceiling.
    NotWhitelisted = 1,
    /// The id is already the active combo.
    Repeated = 2,
}

impl RejectReason {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::NotWhitelisted => "not-whitelisted",
            Self::Repeated => "repeated",
        }
    }
}
