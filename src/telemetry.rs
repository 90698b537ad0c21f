use core::sync::atomic::{AtomicU32, Ordering};

use crate::{combo::RejectReason, sequencer::MoveKind};

static COMBOS_ACCEPTED: AtomicU32 = AtomicU32::new(0);
static COMBOS_REJECTED_WHITELIST: AtomicU32 = AtomicU32::new(0);
static COMBOS_REJECTED_REPEATED: AtomicU32 = AtomicU32::new(0);
static COMBOS_EXPIRED: AtomicU32 = AtomicU32::new(0);
static MODE_SWITCHES: AtomicU32 = AtomicU32::new(0);
static KILL_ACTIVATIONS: AtomicU32 = AtomicU32::new(0);
static DOME_FREE_ROAM_MOVES: AtomicU32 = AtomicU32::new(0);
static DOME_CORRECTIVE_MOVES: AtomicU32 = AtomicU32::new(0);
static DOME_ABORTED_MOVES: AtomicU32 = AtomicU32::new(0);
static SOUNDS_TRIGGERED: AtomicU32 = AtomicU32::new(0);
static DIAG_DROPPED: AtomicU32 = AtomicU32::new(0);
static UART_WRITE_FAILURES: AtomicU32 = AtomicU32::new(0);
static FRAME_OVERRUNS: AtomicU32 = AtomicU32::new(0);
static FRAME_STEP_US_MAX: AtomicU32 = AtomicU32::new(0);

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Snapshot {
    pub combos_accepted: u32,
    pub combos_rejected_whitelist: u32,
    pub combos_rejected_repeated: u32,
    pub combos_expired: u32,
    pub mode_switches: u32,
    pub kill_activations: u32,
    pub dome_free_roam_moves: u32,
    pub dome_corrective_moves: u32,
    pub dome_aborted_moves: u32,
    pub sounds_triggered: u32,
    pub diag_dropped: u32,
    pub uart_write_failures: u32,
    pub frame_overruns: u32,
    pub frame_step_us_max: u32,
}

pub fn record_combo_accepted() {
    COMBOS_ACCEPTED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_combo_rejected(reason: RejectReason) {
    match reason {
        RejectReason::NotWhitelisted => COMBOS_REJECTED_WHITELIST.fetch_add(1, Ordering::Relaxed),
        RejectReason::Repeated => COMBOS_REJECTED_REPEATED.fetch_add(1, Ordering::Relaxed),
        RejectReason::None => return,
    };
}

pub fn record_combo_expired() {
    COMBOS_EXPIRED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_mode_switch() {
    MODE_SWITCHES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_kill_activation() {
    KILL_ACTIVATIONS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_dome_move(kind: MoveKind) {
    match kind {
        MoveKind::FreeRoam => DOME_FREE_ROAM_MOVES.fetch_add(1, Ordering::Relaxed),
        MoveKind::Corrective => DOME_CORRECTIVE_MOVES.fetch_add(1, Ordering::Relaxed),
    };
}

pub fn record_dome_abort() {
    DOME_ABORTED_MOVES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_sound_triggered() {
    SOUNDS_TRIGGERED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_diag_dropped() {
    DIAG_DROPPED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_uart_write_failure() {
    UART_WRITE_FAILURES.fetch_add(1, Ordering::Relaxed);
}

/// Duration of one control step; a step longer than the frame interval is an overrun.
pub fn record_frame_step(step_us: u32, frame_interval_us: u32) {
    if step_us > frame_interval_us {
        FRAME_OVERRUNS.fetch_add(1, Ordering::Relaxed);
    }
    update_max_u32(&FRAME_STEP_US_MAX, step_us);
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        combos_accepted: COMBOS_ACCEPTED.load(Ordering::Relaxed),
        combos_rejected_whitelist: COMBOS_REJECTED_WHITELIST.load(Ordering::Relaxed),
        combos_rejected_repeated: COMBOS_REJECTED_REPEATED.load(Ordering::Relaxed),
        combos_expired: COMBOS_EXPIRED.load(Ordering::Relaxed),
        mode_switches: MODE_SWITCHES.load(Ordering::Relaxed),
        kill_activations: KILL_ACTIVATIONS.load(Ordering::Relaxed),
        dome_free_roam_moves: DOME_FREE_ROAM_MOVES.load(Ordering::Relaxed),
        dome_corrective_moves: DOME_CORRECTIVE_MOVES.load(Ordering::Relaxed),
        dome_aborted_moves: DOME_ABORTED_MOVES.load(Ordering::Relaxed),
        sounds_triggered: SOUNDS_TRIGGERED.load(Ordering::Relaxed),
        diag_dropped: DIAG_DROPPED.load(Ordering::Relaxed),
        uart_write_failures: UART_WRITE_FAILURES.load(Ordering::Relaxed),
        frame_overruns: FRAME_OVERRUNS.load(Ordering::Relaxed),
        frame_step_us_max: FRAME_STEP_US_MAX.load(Ordering::Relaxed),
    }
}

fn update_max_u32(max_counter: &AtomicU32, value: u32) {
    let mut current = max_counter.load(Ordering::Relaxed);
    while value > current {
        match max_counter.compare_exchange_weak(
            current,
            value,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return,
            Err(next) => current = next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Counters are process-wide and tests run in parallel, so only lower bounds hold.

    #[test]
    fn rejections_are_split_by_reason() {
        let before = snapshot();
        record_combo_rejected(RejectReason::NotWhitelisted);
        record_combo_rejected(RejectReason::Repeated);
        record_combo_rejected(RejectReason::None);
        let after = snapshot();
        assert!(after.combos_rejected_whitelist > before.combos_rejected_whitelist);
        assert!(after.combos_rejected_repeated > before.combos_rejected_repeated);
    }

    #[test]
    fn frame_step_tracks_max_and_overruns() {
        record_frame_step(40_000, 20_000);
        let after = snapshot();
        assert!(after.frame_step_us_max >= 40_000);
        assert!(after.frame_overruns >= 1);
    }

    #[test]
    fn max_only_grows() {
        let counter = AtomicU32::new(10);
        update_max_u32(&counter, 5);
        assert_eq!(counter.load(Ordering::Relaxed), 10);
        update_max_u32(&counter, 12);
        assert_eq!(counter.load(Ordering::Relaxed), 12);
    }
}
