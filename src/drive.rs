//! Stick-to-speed shaping for the drive, turn and manual dome axes.
//!
//! One shaper serves every mode; the per-mode `DriveProfile` selects the curve, limits and
//! whether the turn axis tapers off after release. All values are signed percent.

use libm::{powf, truncf};

use crate::{
    config::{DriveProfile, InputConfig},
    gesture::is_valid_pulse,
    pulse::ControlFrame,
    types::{ChannelId, Controller},
};

/// Forward/back on controller A's vertical axis.
pub const DRIVE_CHANNEL: ChannelId = ChannelId::vertical(Controller::A);
/// Left/right on controller A's horizontal axis.
pub const TURN_CHANNEL: ChannelId = ChannelId::horizontal(Controller::A);
/// Manual dome on controller B's horizontal axis.
pub const DOME_CHANNEL: ChannelId = ChannelId::horizontal(Controller::B);

const MIN_TAPER_STEP: i32 = 5;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DriveOutput {
    pub drive: i8,
    pub turn: i8,
    /// `None` when the profile leaves the dome to automation.
    pub dome: Option<i8>,
}

/// Arduino-style integer range map.
fn map_range(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Maps a pulse width to -100..=100 around the stick center.
pub fn map_stick(width_us: u16, input: &InputConfig) -> i8 {
    let center = i32::from(input.stick_center_us);
    let span = i32::from(input.stick_span_us.max(1));
    let width = i32::from(width_us).clamp(center - span, center + span);
    map_range(width, center - span, center + span, -100, 100) as i8
}

/// `sign * (|value| / 100)^expo * limit`.
pub fn apply_expo(value: i8, expo: f32, limit: u8) -> i8 {
    let normalized = f32::from(value.unsigned_abs().min(100)) / 100.0;
    let curved = truncf(powf(normalized, expo) * f32::from(limit.min(100))) as i8;
    if value >= 0 {
        curved
    } else {
        -curved
    }
}

/// One step of decay toward zero; larger values fall faster, from 5 up to `fall_rate`.
pub fn taper_toward_zero(value: i8, limit: u8, fall_rate: u8) -> i8 {
    let magnitude = i32::from(value.unsigned_abs());
    let limit = i32::from(limit.max(1));
    let step = map_range(
        magnitude.min(limit),
        0,
        limit,
        MIN_TAPER_STEP,
        i32::from(fall_rate).max(MIN_TAPER_STEP),
    );
    let remaining = (magnitude - step).max(0) as i8;
    if value >= 0 {
        remaining
    } else {
        -remaining
    }
}

/// Dome stick position with separate left and right gains, before any curve.
pub fn dome_input(width_us: u16, profile: &DriveProfile, input: &InputConfig) -> i8 {
    let center = i32::from(input.stick_center_us);
    let span = i32::from(input.stick_span_us.max(1));
    let width = i32::from(width_us).clamp(center - span, center + span);
    let raw = if width >= center {
        map_range(width, center, center + span, 0, 100) as f32 * profile.dome_right_gain
    } else {
        map_range(width, center - span, center, -100, 0) as f32 * profile.dome_left_gain
    };
    raw.clamp(-100.0, 100.0) as i8
}

/// Curved manual dome command, limited to the profile's dome speed.
pub fn manual_dome(width_us: u16, profile: &DriveProfile, input: &InputConfig) -> i8 {
    apply_expo(
        dome_input(width_us, profile, input),
        profile.expo,
        profile.dome_speed_limit,
    )
}

/// Manual dome with fine-control boost and flick hold.
///
/// A push that is not part of an active flick is scaled by `fine_control_multiplier`; a
/// command of at least `flick_threshold` starts (or extends) a flick. Returning the stick to
/// the dead zone within `flick_min_duration_ms` of the last strong command keeps the dome
/// turning at the last speed, capped at `max_flick_speed`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DomeFlick {
    flick_at_ms: Option<u64>,
    last: i8,
}

impl DomeFlick {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.flick_at_ms.is_some()
    }

    pub fn step(&mut self, now_ms: u64, input: i8, profile: &DriveProfile) -> i8 {
        let speed = if input.unsigned_abs() <= profile.dome_dead_zone {
            match self.flick_at_ms {
                Some(at_ms)
                    if now_ms.saturating_sub(at_ms) < u64::from(profile.flick_min_duration_ms) =>
                {
                    let cap = profile.max_flick_speed.min(100) as i8;
                    self.last.clamp(-cap, cap)
                }
                _ => {
                    self.flick_at_ms = None;
                    0
                }
            }
        } else {
            let curved = apply_expo(input, profile.expo, profile.dome_speed_limit);
            let command = if self.is_active() {
                curved
            } else {
                (f32::from(curved) * profile.fine_control_multiplier).clamp(-100.0, 100.0) as i8
            };
            if command.unsigned_abs() >= profile.flick_threshold {
                self.flick_at_ms = Some(now_ms);
            }
            command
        };
        self.last = speed;
        speed
    }
}

pub struct DriveShaper {
    profile: DriveProfile,
    last_turn: i8,
    dome: DomeFlick,
}

impl DriveShaper {
    pub fn new(profile: DriveProfile) -> Self {
        Self {
            profile,
            last_turn: 0,
            dome: DomeFlick::default(),
        }
    }

    pub fn profile(&self) -> &DriveProfile {
        &self.profile
    }

    pub fn reset(&mut self) {
        self.last_turn = 0;
        self.dome.reset();
    }

    /// Stick position for `channel`, or `None` when the pulse is invalid or older than the
    /// profile's stale timeout.
    fn fresh_stick(&self, frame: &ControlFrame, channel: ChannelId, input: &InputConfig) -> Option<i8> {
        let sample = frame.sample(channel);
        let fresh = sample.age_ms(frame.now_ms) <= self.profile.stale_timeout_ms;
        (is_valid_pulse(sample.width_us, input) && fresh).then(|| map_stick(sample.width_us, input))
    }

    pub fn shape(&mut self, frame: &ControlFrame, input: &InputConfig) -> DriveOutput {
        let profile = self.profile;
        let dead_zone = |value: i8| {
            if value.unsigned_abs() <= profile.dead_zone {
                0
            } else {
                value
            }
        };

        let drive_in = self.fresh_stick(frame, DRIVE_CHANNEL, input);
        let turn_in = self.fresh_stick(frame, TURN_CHANNEL, input);

        let mapped_drive = drive_in.map_or(0, dead_zone);
        let mut mapped_turn = turn_in.map_or(0, dead_zone);
        if mapped_drive.unsigned_abs() > profile.high_drive_threshold {
            let clamp = profile.high_drive_turn_limit.min(100) as i8;
            mapped_turn = mapped_turn.clamp(-clamp, clamp);
        }

        let drive = apply_expo(mapped_drive, profile.expo, profile.speed_limit);
        let curved_turn = apply_expo(mapped_turn, profile.expo, profile.speed_limit);

        self.last_turn = if turn_in.is_none() {
            0
        } else if mapped_turn != 0 {
            curved_turn
        } else if profile.taper_fall_rate > 0 {
            taper_toward_zero(self.last_turn, profile.speed_limit, profile.taper_fall_rate)
        } else {
            0
        };

        let dome = profile.manual_dome.then(|| {
            let sample = frame.sample(DOME_CHANNEL);
            let fresh = sample.age_ms(frame.now_ms) <= profile.stale_timeout_ms;
            if is_valid_pulse(sample.width_us, input) && fresh {
                let stick = dome_input(sample.width_us, &profile, input);
                self.dome.step(frame.now_ms, stick, &profile)
            } else {
                self.dome.reset();
                0
            }
        });

        DriveOutput {
            drive,
            turn: self.last_turn,
            dome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::active_config, types::Mode};

    fn input() -> &'static InputConfig {
        &active_config().input
    }

    fn profile(mode: Mode) -> DriveProfile {
        active_config()
            .modes
            .profile(mode)
            .drive
            .expect("mode has a drive profile")
    }

    fn frame(drive: u16, turn: u16, dome: u16) -> ControlFrame {
        ControlFrame::empty(5_000)
            .with_width(DRIVE_CHANNEL, drive)
            .with_width(TURN_CHANNEL, turn)
            .with_width(DOME_CHANNEL, dome)
    }

    #[test]
    fn stick_maps_to_signed_percent() {
        assert_eq!(map_stick(1_500, input()), 0);
        assert_eq!(map_stick(2_000, input()), 100);
        assert_eq!(map_stick(1_000, input()), -100);
        assert_eq!(map_stick(1_750, input()), 50);
        assert_eq!(map_stick(2_150, input()), 100);
    }

    #[test]
    fn expo_keeps_sign_and_limit() {
        assert_eq!(apply_expo(100, 1.3, 40), 40);
        assert_eq!(apply_expo(-100, 1.3, 40), -40);
        assert_eq!(apply_expo(50, 1.0, 20), 10);
        assert_eq!(apply_expo(50, 1.3, 40), 16);
        assert_eq!(apply_expo(0, 2.0, 100), 0);
    }

    #[test]
    fn taper_steps_scale_with_magnitude() {
        assert_eq!(taper_toward_zero(80, 100, 20), 63);
        assert_eq!(taper_toward_zero(-80, 100, 20), -63);
        assert_eq!(taper_toward_zero(3, 100, 20), 0);
        assert_eq!(taper_toward_zero(0, 100, 20), 0);
    }

    #[test]
    fn manual_profile_scales_full_stick_to_limit() {
        let mut shaper = DriveShaper::new(profile(Mode::Manual));
        let output = shaper.shape(&frame(2_000, 1_000, 1_500), input());
        assert_eq!(output.drive, 20);
        // Full drive is past the high-drive threshold, so turn is held to 79%.
        assert_eq!(output.turn, -15);
        assert_eq!(output.dome, Some(0));
    }

    #[test]
    fn hybrid_clamps_turn_under_high_drive() {
        let mut shaper = DriveShaper::new(profile(Mode::Hybrid));
        let output = shaper.shape(&frame(2_000, 2_000, 1_500), input());
        assert_eq!(output.drive, 20);
        assert_eq!(output.turn, 6);
        assert_eq!(output.dome, None);

        let output = shaper.shape(&frame(1_500, 2_000, 1_500), input());
        assert_eq!(output.turn, 20);
    }

    #[test]
    fn stale_channels_are_zeroed() {
        let mut shaper = DriveShaper::new(profile(Mode::Carpet));
        let mut stale = frame(2_000, 2_000, 2_000);
        stale.now_ms += 51;
        assert_eq!(
            shaper.shape(&stale, input()),
            DriveOutput {
                drive: 0,
                turn: 0,
                dome: Some(0)
            }
        );
    }

    #[test]
    fn invalid_pulse_never_drives() {
        let mut shaper = DriveShaper::new(profile(Mode::Carpet));
        let output = shaper.shape(&frame(0, 2_500, 0), input());
        assert_eq!(output.drive, 0);
        assert_eq!(output.turn, 0);
        assert_eq!(output.dome, Some(0));
    }

    fn flick_profile() -> DriveProfile {
        DriveProfile {
            expo: 1.0,
            dome_speed_limit: 100,
            dome_dead_zone: 0,
            fine_control_multiplier: 2.0,
            flick_min_duration_ms: 40,
            flick_threshold: 5,
            max_flick_speed: 20,
            ..profile(Mode::Manual)
        }
    }

    #[test]
    fn fine_control_boosts_the_first_push_only() {
        let profile = flick_profile();
        let mut dome = DomeFlick::default();
        assert_eq!(dome.step(0, 25, &profile), 50);
        assert!(dome.is_active());
        assert_eq!(dome.step(20, 25, &profile), 25);
    }

    #[test]
    fn inputs_below_flick_threshold_stay_boosted() {
        let profile = DriveProfile {
            flick_threshold: 60,
            ..flick_profile()
        };
        let mut dome = DomeFlick::default();
        assert_eq!(dome.step(0, 25, &profile), 50);
        assert!(!dome.is_active());
        assert_eq!(dome.step(20, 25, &profile), 50);
    }

    #[test]
    fn quick_release_holds_a_capped_flick_then_stops() {
        let profile = flick_profile();
        let mut dome = DomeFlick::default();
        let _ = dome.step(0, 25, &profile);
        assert_eq!(dome.step(20, -50, &profile), -50);
        assert_eq!(dome.step(40, 0, &profile), -20);
        assert_eq!(dome.step(59, 0, &profile), -20);
        assert_eq!(dome.step(60, 0, &profile), 0);
        assert!(!dome.is_active());
    }

    #[test]
    fn dome_dead_zone_zeroes_small_inputs() {
        let profile = DriveProfile {
            dome_dead_zone: 10,
            ..flick_profile()
        };
        let mut dome = DomeFlick::default();
        assert_eq!(dome.step(0, 8, &profile), 0);
        assert_eq!(dome.step(20, -25, &profile), -50);
    }

    #[test]
    fn stale_dome_input_cancels_the_flick() {
        let profile = DriveProfile {
            flick_min_duration_ms: 200,
            ..flick_profile()
        };
        let mut shaper = DriveShaper::new(profile);
        assert_eq!(shaper.shape(&frame(1_500, 1_500, 1_750), input()).dome, Some(100));

        let mut stale = frame(1_500, 1_500, 1_500);
        stale.now_ms += 51;
        assert_eq!(shaper.shape(&stale, input()).dome, Some(0));

        let centered = ControlFrame::empty(5_060)
            .with_width(DRIVE_CHANNEL, 1_500)
            .with_width(TURN_CHANNEL, 1_500)
            .with_width(DOME_CHANNEL, 1_500);
        assert_eq!(shaper.shape(&centered, input()).dome, Some(0));
    }

    #[test]
    fn dome_gains_apply_per_side() {
        let base = profile(Mode::Manual);
        let boosted = DriveProfile {
            dome_left_gain: 0.5,
            dome_right_gain: 1.0,
            ..base
        };
        assert_eq!(manual_dome(2_000, &boosted, input()), 100);
        assert_eq!(manual_dome(1_000, &boosted, input()), -50);
    }
}
