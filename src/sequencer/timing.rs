use libm::powf;

use crate::config::DomeTimingConfig;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum MoveKind {
    FreeRoam = 0,
    Corrective = 1,
}

impl MoveKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FreeRoam => "free-roam",
            Self::Corrective => "corrective",
        }
    }
}

/// Milliseconds of motor time per degree of dome travel at `speed_percent`.
///
/// Slower speeds take superlinearly longer (`curve_exponent > 1`). The left/right bias
/// applies to free-roam moves only.
pub fn ms_per_degree(
    speed_percent: u8,
    kind: MoveKind,
    direction: i8,
    timing: &DomeTimingConfig,
) -> f32 {
    let speed = f32::from(speed_percent.max(1));
    let scale = powf(timing.reference_speed_percent / speed, timing.curve_exponent);
    let rate = timing.base_ms_per_degree * scale;
    match kind {
        MoveKind::Corrective => rate,
        MoveKind::FreeRoam if direction > 0 => rate * timing.right_bias,
        MoveKind::FreeRoam if direction < 0 => rate * timing.left_bias,
        MoveKind::FreeRoam => rate,
    }
}

/// Whole-millisecond duration for `angle_deg` and the angle that duration actually covers.
pub fn plan_duration(angle_deg: f32, rate_ms_per_degree: f32) -> (u32, f32) {
    if angle_deg <= 0.0 || rate_ms_per_degree <= 0.0 {
        return (0, 0.0);
    }
    let duration_ms = (angle_deg * rate_ms_per_degree) as u32;
    (duration_ms, duration_ms as f32 / rate_ms_per_degree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::active_config;

    fn timing() -> &'static DomeTimingConfig {
        &active_config().dome_timing
    }

    #[test]
    fn reference_speed_uses_calibrated_rate() {
        let rate = ms_per_degree(30, MoveKind::Corrective, 1, timing());
        assert!((rate - 1_700.0 / 90.0).abs() < 1e-3, "rate {rate}");
    }

    #[test]
    fn slower_speed_is_superlinearly_slower() {
        let fast = ms_per_degree(30, MoveKind::Corrective, 1, timing());
        let slow = ms_per_degree(15, MoveKind::Corrective, 1, timing());
        assert!(slow > 2.0 * fast);
    }

    #[test]
    fn bias_applies_to_free_roam_only() {
        let neutral = ms_per_degree(30, MoveKind::Corrective, 1, timing());
        let right = ms_per_degree(30, MoveKind::FreeRoam, 1, timing());
        let left = ms_per_degree(30, MoveKind::FreeRoam, -1, timing());
        assert!((right - neutral * 1.06).abs() < 1e-3);
        assert!((left - neutral * 0.96).abs() < 1e-3);
        assert_eq!(
            ms_per_degree(30, MoveKind::Corrective, -1, timing()),
            neutral
        );
    }

    #[test]
    fn duration_truncates_and_reports_covered_angle() {
        let (duration, actual) = plan_duration(10.0, 18.5);
        assert_eq!(duration, 185);
        assert!((actual - 10.0).abs() < 1e-4);

        let (duration, actual) = plan_duration(0.03, 18.5);
        assert_eq!(duration, 0);
        assert_eq!(actual, 0.0);

        assert_eq!(plan_duration(-3.0, 18.5), (0, 0.0));
    }
}
