//! Button-triggered and ambient sound playback.

use heapless::Vec;

use crate::{
    combo::detect::{ButtonKind, MomentaryDetector},
    config::{AmbientSoundConfig, InputConfig, SoundBankConfig, TrackRange},
    entropy::Entropy,
    gesture::{classify_button_hysteresis, ButtonLevel},
    pulse::ControlFrame,
    types::{ChannelId, Controller},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum SoundBank {
    Happy = 0,
    Sad = 1,
    Talking = 2,
    Yelling = 3,
    Classic = 4,
    Dance = 5,
    Singing = 6,
    Lines = 7,
}

impl SoundBank {
    /// Categories the ambient player picks from.
    pub const AMBIENT: [SoundBank; 3] = [SoundBank::Happy, SoundBank::Sad, SoundBank::Talking];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Talking => "talking",
            Self::Yelling => "yelling",
            Self::Classic => "classic",
            Self::Dance => "dance",
            Self::Singing => "singing",
            Self::Lines => "lines",
        }
    }

    pub const fn tracks(self, banks: &SoundBankConfig) -> TrackRange {
        match self {
            Self::Happy => banks.happy,
            Self::Sad => banks.sad,
            Self::Talking => banks.talking,
            Self::Yelling => banks.yelling,
            Self::Classic => banks.classic,
            Self::Dance => banks.dance,
            Self::Singing => banks.singing,
            Self::Lines => banks.lines,
        }
    }

    fn pick(self, banks: &SoundBankConfig, entropy: &mut impl Entropy) -> SoundTrigger {
        let range = self.tracks(banks);
        let track =
            entropy.range_inclusive(u32::from(range.first), u32::from(range.last)) as u16;
        SoundTrigger { bank: self, track }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SoundTrigger {
    pub bank: SoundBank,
    pub track: u16,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SoundButton {
    pub channel: ChannelId,
    pub bank: SoundBank,
    pub kind: ButtonKind,
}

impl SoundButton {
    const fn new(controller: Controller, number: u8, bank: SoundBank, kind: ButtonKind) -> Self {
        Self {
            channel: ChannelId::new(controller, number),
            bank,
            kind,
        }
    }
}

pub const SOUND_BUTTONS: [SoundButton; 8] = [
    SoundButton::new(Controller::A, 3, SoundBank::Happy, ButtonKind::Toggle),
    SoundButton::new(Controller::A, 4, SoundBank::Sad, ButtonKind::Toggle),
    SoundButton::new(Controller::A, 5, SoundBank::Talking, ButtonKind::Toggle),
    SoundButton::new(Controller::A, 6, SoundBank::Yelling, ButtonKind::Momentary),
    SoundButton::new(Controller::B, 3, SoundBank::Classic, ButtonKind::Toggle),
    SoundButton::new(Controller::B, 4, SoundBank::Dance, ButtonKind::Toggle),
    SoundButton::new(Controller::B, 5, SoundBank::Singing, ButtonKind::Toggle),
    SoundButton::new(Controller::B, 6, SoundBank::Lines, ButtonKind::Momentary),
];

#[derive(Clone, Copy, Debug)]
enum ButtonState {
    Toggle(Option<ButtonLevel>),
    Momentary(MomentaryDetector),
}

impl ButtonState {
    fn fresh(kind: ButtonKind) -> Self {
        match kind {
            ButtonKind::Toggle => Self::Toggle(None),
            ButtonKind::Momentary => Self::Momentary(MomentaryDetector::default()),
        }
    }

    fn update(&mut self, width_us: u16, now_ms: u64, cfg: &InputConfig) -> bool {
        match self {
            Self::Toggle(level) => {
                let Some(next) = classify_button_hysteresis(width_us, *level, cfg) else {
                    return false;
                };
                let changed = level.is_some_and(|previous| previous != next);
                *level = Some(next);
                changed
            }
            Self::Momentary(detector) => detector.update(width_us, now_ms, cfg),
        }
    }
}

/// Plays a random track from a button's bank on every toggle edge or momentary press.
#[derive(Clone, Debug)]
pub struct Soundboard {
    buttons: [ButtonState; SOUND_BUTTONS.len()],
}

impl Default for Soundboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Soundboard {
    pub fn new() -> Self {
        Self {
            buttons: SOUND_BUTTONS.map(|button| ButtonState::fresh(button.kind)),
        }
    }

    /// Forgets every edge state; the next valid reading of each toggle only seeds it again.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn update(
        &mut self,
        frame: &ControlFrame,
        input: &InputConfig,
        banks: &SoundBankConfig,
        entropy: &mut impl Entropy,
    ) -> Vec<SoundTrigger, 8> {
        let mut triggers = Vec::new();
        for (button, state) in SOUND_BUTTONS.iter().zip(self.buttons.iter_mut()) {
            if state.update(frame.width(button.channel), frame.now_ms, input) {
                let trigger = button.bank.pick(banks, entropy);
                log::debug!("sound: {} track={}", trigger.bank.label(), trigger.track);
                let _ = triggers.push(trigger);
            }
        }
        triggers
    }
}

/// Random chatter at random intervals once the mode's entry delay has passed.
#[derive(Clone, Copy, Debug)]
pub struct AmbientSound {
    config: AmbientSoundConfig,
    next_at_ms: u64,
}

impl AmbientSound {
    pub fn new(config: AmbientSoundConfig, entry_delay_ms: u64, now_ms: u64) -> Self {
        Self {
            config,
            next_at_ms: now_ms + entry_delay_ms,
        }
    }

    pub fn next_at_ms(&self) -> u64 {
        self.next_at_ms
    }

    /// An overdue track waits while `blocked` and plays as soon as it clears.
    pub fn tick(
        &mut self,
        now_ms: u64,
        blocked: bool,
        banks: &SoundBankConfig,
        entropy: &mut impl Entropy,
    ) -> Option<SoundTrigger> {
        if blocked || now_ms < self.next_at_ms {
            return None;
        }
        let category = entropy.range_inclusive(0, SoundBank::AMBIENT.len() as u32 - 1) as usize;
        let trigger = SoundBank::AMBIENT[category].pick(banks, entropy);
        let interval =
            entropy.range_inclusive(self.config.min_interval_ms, self.config.max_interval_ms);
        self.next_at_ms = now_ms + u64::from(interval);
        Some(trigger)
    }
}
