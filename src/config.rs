use crate::{gesture::GestureSet, types::Mode};

#[derive(Clone, Copy, Debug)]
pub struct InputConfig {
    pub valid_min_us: u16,
    pub valid_max_us: u16,
    pub toggle_threshold_us: u16,
    pub toggle_release_us: u16,
    pub momentary_high_us: u16,
    pub momentary_low_us: u16,
    pub momentary_debounce_ms: u64,
    pub stick_low_max_us: u16,
    pub stick_high_min_us: u16,
    pub stick_up_max_us: u16,
    pub stick_center_us: u16,
    pub stick_span_us: u16,
    pub frame_interval_ms: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct ComboConfig {
    pub reset_delay_ms: u64,
}

/// Open-loop dome timing model, calibrated at `reference_speed_percent`.
#[derive(Clone, Copy, Debug)]
pub struct DomeTimingConfig {
    pub base_ms_per_degree: f32,
    pub reference_speed_percent: f32,
    pub curve_exponent: f32,
    pub right_bias: f32,
    pub left_bias: f32,
    pub center_tolerance_deg: f32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AudioEffect {
    None,
    Suppress,
    Enable,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ComboAction {
    pub id: u8,
    pub label: &'static str,
    pub script: Option<&'static str>,
    pub audio: AudioEffect,
}

#[derive(Clone, Copy, Debug)]
pub struct DriveProfile {
    pub expo: f32,
    pub speed_limit: u8,
    pub dead_zone: u8,
    pub high_drive_threshold: u8,
    pub high_drive_turn_limit: u8,
    /// 0 disables the turn taper.
    pub taper_fall_rate: u8,
    pub stale_timeout_ms: u32,
    pub manual_dome: bool,
    pub dome_speed_limit: u8,
    pub dome_left_gain: f32,
    pub dome_right_gain: f32,
    pub dome_dead_zone: u8,
    /// Scales dome commands that are not part of an active flick.
    pub fine_control_multiplier: f32,
    /// A flick released to center within this window keeps turning, capped at `max_flick_speed`.
    pub flick_min_duration_ms: u32,
    /// Smallest dome command that starts a flick.
    pub flick_threshold: u8,
    pub max_flick_speed: u8,
}

#[derive(Clone, Copy, Debug)]
pub struct DomeAutomationConfig {
    pub min_angle_deg: u16,
    pub max_angle_deg: u16,
    pub min_speed_percent: u8,
    pub max_speed_percent: u8,
    pub min_delay_ms: u32,
    pub max_delay_ms: u32,
    pub moves_before_center: u8,
}

#[derive(Clone, Copy, Debug)]
pub struct AmbientSoundConfig {
    pub min_interval_ms: u32,
    pub max_interval_ms: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct ModeProfile {
    pub max_action_combo: u8,
    /// Gestures that force every motion output to zero.
    pub kill: GestureSet,
    /// Gestures that mute the soundboard and ambient sound.
    pub audio_kill: GestureSet,
    pub entry_delay_ms: u64,
    pub drive: Option<DriveProfile>,
    pub dome: Option<DomeAutomationConfig>,
    pub ambient: Option<AmbientSoundConfig>,
}

#[derive(Clone, Copy, Debug)]
pub struct ModeTable {
    pub manual: ModeProfile,
    pub automated: ModeProfile,
    pub hybrid: ModeProfile,
    pub carpet: ModeProfile,
}

impl ModeTable {
    pub fn profile(&self, mode: Mode) -> &ModeProfile {
        match mode {
            Mode::Manual => &self.manual,
            Mode::Automated => &self.automated,
            Mode::Hybrid => &self.hybrid,
            Mode::Carpet => &self.carpet,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TrackRange {
    pub first: u16,
    pub last: u16,
}

#[derive(Clone, Copy, Debug)]
pub struct SoundBankConfig {
    pub happy: TrackRange,
    pub sad: TrackRange,
    pub talking: TrackRange,
    pub yelling: TrackRange,
    pub classic: TrackRange,
    pub dance: TrackRange,
    pub singing: TrackRange,
    pub lines: TrackRange,
}

#[derive(Clone, Copy, Debug)]
pub struct HardwareConfig {
    pub drive_address: u8,
    pub dome_address: u8,
    pub motor_baud: u32,
    pub audio_baud: u32,
    pub script_baud: u32,
    pub actuator_refresh_ms: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct DroidConfig {
    pub input: InputConfig,
    pub combo: ComboConfig,
    pub dome_timing: DomeTimingConfig,
    pub combo_actions: &'static [ComboAction],
    pub modes: ModeTable,
    pub sound_banks: SoundBankConfig,
    pub hardware: HardwareConfig,
}

impl DroidConfig {
    pub fn combo_action(&self, id: u8) -> Option<&'static ComboAction> {
        self.combo_actions.iter().find(|action| action.id == id)
    }
}

include!(concat!(env!("OUT_DIR"), "/droid_config.rs"));

pub fn active_config() -> &'static DroidConfig {
    &DROID_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_profiles_match_mode_capabilities() {
        let modes = &active_config().modes;
        assert!(modes.manual.drive.is_some() && modes.manual.dome.is_none());
        assert!(modes.automated.drive.is_none() && modes.automated.dome.is_some());
        assert!(modes.hybrid.drive.is_some() && modes.hybrid.dome.is_some());
        assert!(modes.carpet.drive.is_some() && modes.carpet.ambient.is_none());
    }

    #[test]
    fn whitelist_ceilings_follow_modes() {
        let modes = &active_config().modes;
        assert_eq!(modes.profile(Mode::Manual).max_action_combo, 8);
        assert_eq!(modes.profile(Mode::Carpet).max_action_combo, 8);
        assert_eq!(modes.profile(Mode::Hybrid).max_action_combo, 16);
        assert_eq!(modes.profile(Mode::Automated).max_action_combo, 32);
    }

    #[test]
    fn combo_actions_are_looked_up_by_id() {
        let cfg = active_config();
        let awake = cfg.combo_action(5).expect("action 5");
        assert_eq!(awake.script, Some(":SE03\r"));
        assert_eq!(awake.audio, AudioEffect::Suppress);
        assert!(cfg.combo_action(4).is_none());
    }
}
