use core::sync::atomic::{AtomicU32, Ordering};

use crate::{combo::ComboId, sequencer::SequencerPhase, types::Mode};

/// Control state published once per frame for tasks outside the control loop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DroidSnapshot {
    pub mode: Mode,
    pub combo: ComboId,
    pub killed: bool,
    pub audio_suppressed: bool,
    pub dome_phase: Option<SequencerPhase>,
}

impl Default for DroidSnapshot {
    fn default() -> Self {
        Self::default_const()
    }
}

impl DroidSnapshot {
    pub const fn default_const() -> Self {
        Self {
            mode: Mode::Manual,
            combo: ComboId::IDLE,
            killed: false,
            audio_suppressed: false,
            dome_phase: None,
        }
    }

    const MODE_SHIFT: u32 = 0;
    const COMBO_SHIFT: u32 = 3;
    const KILLED_SHIFT: u32 = 9;
    const SUPPRESSED_SHIFT: u32 = 10;
    const DOME_SHIFT: u32 = 11;

    /// Dome phase is stored +1 so that 0 means no automation.
    const fn dome_bits(phase: Option<SequencerPhase>) -> u32 {
        match phase {
            Some(phase) => phase.as_u8() as u32 + 1,
            None => 0,
        }
    }

    pub const fn packed(self) -> u32 {
        ((self.mode.as_u8() as u32) << Self::MODE_SHIFT)
            | ((self.combo.as_u8() as u32) << Self::COMBO_SHIFT)
            | ((self.killed as u32) << Self::KILLED_SHIFT)
            | ((self.audio_suppressed as u32) << Self::SUPPRESSED_SHIFT)
            | (Self::dome_bits(self.dome_phase) << Self::DOME_SHIFT)
    }

    pub fn from_packed(raw: u32) -> Self {
        let mode = Mode::from_u8(((raw >> Self::MODE_SHIFT) & 0b111) as u8).unwrap_or_default();
        let combo =
            ComboId::new(((raw >> Self::COMBO_SHIFT) & 0b11_1111) as u8).unwrap_or(ComboId::IDLE);
        let dome_phase = match (raw >> Self::DOME_SHIFT) & 0b111 {
            1 => Some(SequencerPhase::Warmup),
            2 => Some(SequencerPhase::Idle),
            3 => Some(SequencerPhase::Moving),
            4 => Some(SequencerPhase::Suspended),
            _ => None,
        };
        Self {
            mode,
            combo,
            killed: (raw >> Self::KILLED_SHIFT) & 1 == 1,
            audio_suppressed: (raw >> Self::SUPPRESSED_SHIFT) & 1 == 1,
            dome_phase,
        }
    }
}

static DROID_SNAPSHOT: AtomicU32 = AtomicU32::new(DroidSnapshot::default_const().packed());

pub fn publish_droid_snapshot(snapshot: DroidSnapshot) {
    DROID_SNAPSHOT.store(snapshot.packed(), Ordering::Relaxed);
}

pub fn read_droid_snapshot() -> DroidSnapshot {
    DroidSnapshot::from_packed(DROID_SNAPSHOT.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_preserves_every_field() {
        let snapshot = DroidSnapshot {
            mode: Mode::Carpet,
            combo: ComboId::new(32).expect("valid id"),
            killed: true,
            audio_suppressed: true,
            dome_phase: Some(SequencerPhase::Suspended),
        };
        assert_eq!(DroidSnapshot::from_packed(snapshot.packed()), snapshot);
    }

    #[test]
    fn default_unpacks_to_manual_idle() {
        let snapshot = DroidSnapshot::from_packed(DroidSnapshot::default().packed());
        assert_eq!(snapshot.mode, Mode::Manual);
        assert!(snapshot.combo.is_idle());
        assert_eq!(snapshot.dome_phase, None);
    }

    #[test]
    fn garbage_bits_fall_back_to_defaults() {
        let snapshot = DroidSnapshot::from_packed(0b111 | (0b11_1111 << 3) | (0b111 << 11));
        assert_eq!(snapshot.mode, Mode::Manual);
        assert!(snapshot.combo.is_idle());
        assert_eq!(snapshot.dome_phase, None);
    }
}
