use crate::{config::DroidConfig, gesture::Sticks, types::Mode};

/// Whether the current mode's kill gesture is held. Pure; evaluated on the same
/// classified sticks as combo detection.
pub fn kill_switch_active(mode: Mode, sticks: &Sticks, config: &DroidConfig) -> bool {
    config.modes.profile(mode).kill.matches(sticks)
}

/// Whether the current mode's sound-muting gesture is held. Differs from the motion kill
/// only where a stick axis doubles as a manual control.
pub fn audio_kill_active(mode: Mode, sticks: &Sticks, config: &DroidConfig) -> bool {
    config.modes.profile(mode).audio_kill.matches(sticks)
}
