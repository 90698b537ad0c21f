use core::fmt;

use heapless::Vec;

use crate::{
    combo::{ComboId, RejectReason},
    sequencer::MoveKind,
    soundboard::SoundBank,
    telemetry,
    types::Mode,
};

/// One human-readable diagnostic line, produced by the control step and rendered by the
/// firmware's diagnostics task.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DiagEvent {
    ModeChanged {
        from: Mode,
        to: Mode,
    },
    ComboAccepted {
        id: ComboId,
        mode: Mode,
        label: Option<&'static str>,
    },
    ComboRejected {
        id: ComboId,
        mode: Mode,
        reason: RejectReason,
    },
    ComboExpired {
        id: ComboId,
    },
    AudioSuppressed(bool),
    KillEngaged {
        mode: Mode,
    },
    KillReleased {
        mode: Mode,
    },
    DomeSequence {
        speed_percent: u8,
    },
    DomeMove {
        kind: MoveKind,
        direction: i8,
        speed_percent: u8,
        angle_deg: f32,
        duration_ms: u32,
    },
    DomeStopped {
        completed: bool,
    },
    SoundPlayed {
        bank: SoundBank,
        track: u16,
    },
}

impl fmt::Display for DiagEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ModeChanged { from, to } => {
                write!(f, "mode: {} -> {}", from.label(), to.label())
            }
            Self::ComboAccepted { id, mode, label } => {
                write!(f, "combo: accepted id={} mode={}", id.as_u8(), mode.label())?;
                if let Some(label) = label {
                    write!(f, " action=\"{label}\"")?;
                }
                Ok(())
            }
            Self::ComboRejected { id, mode, reason } => write!(
                f,
                "combo: rejected id={} mode={} reason={}",
                id.as_u8(),
                mode.label(),
                reason.label()
            ),
            Self::ComboExpired { id } => write!(f, "combo: expired id={}", id.as_u8()),
            Self::AudioSuppressed(true) => f.write_str("audio: suppressed"),
            Self::AudioSuppressed(false) => f.write_str("audio: enabled"),
            Self::KillEngaged { mode } => write!(f, "kill: engaged mode={}", mode.label()),
            Self::KillReleased { mode } => write!(f, "kill: released mode={}", mode.label()),
            Self::DomeSequence { speed_percent } => {
                write!(f, "dome: sequence speed={speed_percent}")
            }
            Self::DomeMove {
                kind,
                direction,
                speed_percent,
                angle_deg,
                duration_ms,
            } => write!(
                f,
                "dome: {} {} speed={} angle={:.2} ms={}",
                kind.label(),
                if direction > 0 { "right" } else { "left" },
                speed_percent,
                angle_deg,
                duration_ms
            ),
            Self::DomeStopped { completed: true } => f.write_str("dome: move complete"),
            Self::DomeStopped { completed: false } => f.write_str("dome: move aborted"),
            Self::SoundPlayed { bank, track } => {
                write!(f, "sound: {} track={}", bank.label(), track)
            }
        }
    }
}

pub const DIAG_CAPACITY: usize = 16;

/// Per-step diagnostics. Overflow drops the newest event and counts it.
#[derive(Clone, Debug, Default)]
pub struct DiagBuffer {
    events: Vec<DiagEvent, DIAG_CAPACITY>,
}

impl DiagBuffer {
    pub fn push(&mut self, event: DiagEvent) {
        if self.events.push(event).is_err() {
            telemetry::record_diag_dropped();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
