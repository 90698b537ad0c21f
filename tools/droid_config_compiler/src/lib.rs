use std::{collections::BTreeSet, fmt, fmt::Write as _, fs, path::Path};

use serde::Deserialize;

#[derive(Debug)]
pub enum ConfigCompilerError {
    Io(String),
    Parse(String),
    Validation(String),
}

impl fmt::Display for ConfigCompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "io error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigCompilerError {}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DroidFile {
    pub input: InputSection,
    pub combo: ComboSection,
    pub dome_timing: DomeTimingSection,
    #[serde(default)]
    pub combo_actions: Vec<ComboActionEntry>,
    pub modes: ModesSection,
    pub sound_banks: SoundBanksSection,
    pub hardware: HardwareSection,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputSection {
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

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComboSection {
    pub reset_delay_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomeTimingSection {
    pub calibration_angle_deg: f32,
    pub calibration_duration_ms: f32,
    pub reference_speed_percent: f32,
    pub curve_exponent: f32,
    pub right_bias: f32,
    pub left_bias: f32,
    pub center_tolerance_deg: f32,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AudioEffectEntry {
    None,
    Suppress,
    Enable,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComboActionEntry {
    pub id: u8,
    pub label: String,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default = "default_audio_effect")]
    pub audio: AudioEffectEntry,
}

fn default_audio_effect() -> AudioEffectEntry {
    AudioEffectEntry::None
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModesSection {
    pub manual: ModeSection,
    pub automated: ModeSection,
    pub hybrid: ModeSection,
    pub carpet: ModeSection,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeSection {
    pub max_action_combo: u8,
    #[serde(default)]
    pub kill: Vec<String>,
    /// Gestures that mute the soundboard; the motion kill list when absent.
    #[serde(default)]
    pub audio_kill: Option<Vec<String>>,
    #[serde(default)]
    pub entry_delay_ms: u64,
    #[serde(default)]
    pub drive: Option<DriveSection>,
    #[serde(default)]
    pub dome: Option<DomeAutomationSection>,
    #[serde(default)]
    pub ambient: Option<AmbientSection>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriveSection {
    pub expo: f32,
    pub speed_limit: u8,
    pub dead_zone: u8,
    pub high_drive_threshold: u8,
    pub high_drive_turn_limit: u8,
    #[serde(default)]
    pub taper_fall_rate: u8,
    pub stale_timeout_ms: u32,
    pub manual_dome: bool,
    pub dome_speed_limit: u8,
    pub dome_left_gain: f32,
    pub dome_right_gain: f32,
    #[serde(default)]
    pub dome_dead_zone: u8,
    #[serde(default = "default_fine_control_multiplier")]
    pub fine_control_multiplier: f32,
    #[serde(default)]
    pub flick_min_duration_ms: u32,
    #[serde(default)]
    pub flick_threshold: u8,
    #[serde(default)]
    pub max_flick_speed: u8,
}

fn default_fine_control_multiplier() -> f32 {
    1.0
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomeAutomationSection {
    pub min_angle_deg: u16,
    pub max_angle_deg: u16,
    pub min_speed_percent: u8,
    pub max_speed_percent: u8,
    pub min_delay_ms: u32,
    pub max_delay_ms: u32,
    pub moves_before_center: u8,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmbientSection {
    pub min_interval_ms: u32,
    pub max_interval_ms: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoundBanksSection {
    pub happy: [u16; 2],
    pub sad: [u16; 2],
    pub talking: [u16; 2],
    pub yelling: [u16; 2],
    pub classic: [u16; 2],
    pub dance: [u16; 2],
    pub singing: [u16; 2],
    pub lines: [u16; 2],
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HardwareSection {
    pub drive_address: u8,
    pub dome_address: u8,
    pub motor_baud: u32,
    pub audio_baud: u32,
    pub script_baud: u32,
    pub actuator_refresh_ms: u64,
}

const MODE_SELECT_MAX: u8 = 4;
const COMBO_MAX: u8 = 32;

pub fn parse_droid_file(path: &Path) -> Result<DroidFile, ConfigCompilerError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ConfigCompilerError::Io(format!("{}: {e}", path.display())))?;
    parse_droid_str(&raw)
}

pub fn parse_droid_str(raw: &str) -> Result<DroidFile, ConfigCompilerError> {
    toml::from_str(raw).map_err(|e| ConfigCompilerError::Parse(e.to_string()))
}

/// Resolves `"a.down"`-style names into the bit layout used by `GestureSet`:
/// controller index times four plus the direction index (down, up, left, right).
pub fn kill_gesture_bit(name: &str) -> Option<u8> {
    let (controller, direction) = name.split_once('.')?;
    let controller = match controller {
        "a" => 0,
        "b" => 1,
        _ => return None,
    };
    let direction = match direction {
        "down" => 0,
        "up" => 1,
        "left" => 2,
        "right" => 3,
        _ => return None,
    };
    Some(controller * 4 + direction)
}

pub fn validate_config(file: &DroidFile) -> Result<(), ConfigCompilerError> {
    validate_input(&file.input)?;

    if file.combo.reset_delay_ms == 0 {
        return Err(validation("combo.reset_delay_ms must be > 0"));
    }

    validate_dome_timing(&file.dome_timing)?;
    validate_actions(&file.combo_actions)?;

    for (name, mode) in mode_sections(&file.modes) {
        validate_mode(name, mode, &file.dome_timing)?;
    }

    let banks = &file.sound_banks;
    for (name, range) in [
        ("happy", banks.happy),
        ("sad", banks.sad),
        ("talking", banks.talking),
        ("yelling", banks.yelling),
        ("classic", banks.classic),
        ("dance", banks.dance),
        ("singing", banks.singing),
        ("lines", banks.lines),
    ] {
        if range[0] == 0 || range[0] > range[1] {
            return Err(validation(&format!(
                "sound_banks.{name} must be a non-empty range of track numbers starting at >= 1"
            )));
        }
        if range[1] > 255 {
            return Err(validation(&format!(
                "sound_banks.{name} tracks must fit the MP3 Trigger range 1..=255"
            )));
        }
    }

    let hw = &file.hardware;
    if hw.drive_address < 128 || hw.dome_address < 128 {
        return Err(validation(
            "hardware.drive_address and hardware.dome_address must be packet serial addresses >= 128",
        ));
    }
    if hw.drive_address == hw.dome_address {
        return Err(validation(
            "hardware.drive_address and hardware.dome_address must differ",
        ));
    }
    if hw.motor_baud == 0 || hw.audio_baud == 0 || hw.script_baud == 0 {
        return Err(validation("hardware baud rates must be > 0"));
    }
    if hw.actuator_refresh_ms == 0 {
        return Err(validation("hardware.actuator_refresh_ms must be > 0"));
    }

    Ok(())
}

fn validate_input(input: &InputSection) -> Result<(), ConfigCompilerError> {
    if input.valid_min_us == 0 || input.valid_min_us >= input.valid_max_us {
        return Err(validation(
            "input.valid_min_us must be > 0 and < input.valid_max_us",
        ));
    }
    let in_range = |v: u16| v > input.valid_min_us && v < input.valid_max_us;
    for (name, value) in [
        ("toggle_threshold_us", input.toggle_threshold_us),
        ("toggle_release_us", input.toggle_release_us),
        ("momentary_high_us", input.momentary_high_us),
        ("momentary_low_us", input.momentary_low_us),
        ("stick_low_max_us", input.stick_low_max_us),
        ("stick_high_min_us", input.stick_high_min_us),
        ("stick_center_us", input.stick_center_us),
    ] {
        if !in_range(value) {
            return Err(validation(&format!(
                "input.{name} must lie strictly inside the valid pulse range"
            )));
        }
    }
    if input.toggle_release_us >= input.toggle_threshold_us {
        return Err(validation(
            "input.toggle_release_us must be < input.toggle_threshold_us",
        ));
    }
    if input.momentary_low_us >= input.momentary_high_us {
        return Err(validation(
            "input.momentary_low_us must be < input.momentary_high_us",
        ));
    }
    if input.stick_low_max_us >= input.stick_high_min_us {
        return Err(validation(
            "input.stick_low_max_us must be < input.stick_high_min_us",
        ));
    }
    if input.stick_up_max_us < input.stick_high_min_us || input.stick_up_max_us > input.valid_max_us
    {
        return Err(validation(
            "input.stick_up_max_us must be >= input.stick_high_min_us and <= input.valid_max_us",
        ));
    }
    if input.stick_span_us == 0 {
        return Err(validation("input.stick_span_us must be > 0"));
    }
    if input.frame_interval_ms < 5 || input.frame_interval_ms > 20 {
        return Err(validation(
            "input.frame_interval_ms must be within 5..=20 (50-200 Hz)",
        ));
    }
    Ok(())
}

fn validate_dome_timing(timing: &DomeTimingSection) -> Result<(), ConfigCompilerError> {
    if timing.calibration_angle_deg <= 0.0 || timing.calibration_duration_ms <= 0.0 {
        return Err(validation(
            "dome_timing calibration angle and duration must be positive",
        ));
    }
    if timing.reference_speed_percent <= 0.0 {
        return Err(validation("dome_timing.reference_speed_percent must be > 0"));
    }
    if timing.curve_exponent <= 1.0 {
        return Err(validation("dome_timing.curve_exponent must be > 1"));
    }
    if timing.right_bias <= 0.0 || timing.left_bias <= 0.0 {
        return Err(validation("dome_timing biases must be positive"));
    }
    if timing.center_tolerance_deg <= 0.0 {
        return Err(validation("dome_timing.center_tolerance_deg must be > 0"));
    }
    Ok(())
}

fn validate_actions(actions: &[ComboActionEntry]) -> Result<(), ConfigCompilerError> {
    let mut seen = BTreeSet::new();
    for action in actions {
        if action.id <= MODE_SELECT_MAX || action.id > COMBO_MAX {
            return Err(validation(&format!(
                "combo_actions id {} must be within 5..=32",
                action.id
            )));
        }
        if !seen.insert(action.id) {
            return Err(validation(&format!(
                "combo_actions id {} is defined twice",
                action.id
            )));
        }
        if action.label.is_empty() {
            return Err(validation(&format!(
                "combo_actions id {} needs a label",
                action.id
            )));
        }
    }
    Ok(())
}

fn validate_mode(
    name: &str,
    mode: &ModeSection,
    timing: &DomeTimingSection,
) -> Result<(), ConfigCompilerError> {
    if mode.max_action_combo < MODE_SELECT_MAX || mode.max_action_combo > COMBO_MAX {
        return Err(validation(&format!(
            "modes.{name}.max_action_combo must be within 4..=32"
        )));
    }
    for (field, gestures) in [("kill", Some(&mode.kill)), ("audio_kill", mode.audio_kill.as_ref())] {
        for gesture in gestures.into_iter().flatten() {
            if kill_gesture_bit(gesture).is_none() {
                return Err(validation(&format!(
                    "modes.{name}.{field} has unknown gesture `{gesture}`"
                )));
            }
        }
    }

    if let Some(drive) = &mode.drive {
        if drive.expo <= 0.0 {
            return Err(validation(&format!("modes.{name}.drive.expo must be > 0")));
        }
        if drive.speed_limit == 0 || drive.speed_limit > 100 {
            return Err(validation(&format!(
                "modes.{name}.drive.speed_limit must be within 1..=100"
            )));
        }
        if drive.dome_speed_limit > 100 || drive.high_drive_turn_limit > 100 {
            return Err(validation(&format!(
                "modes.{name}.drive percentages must be <= 100"
            )));
        }
        if drive.stale_timeout_ms == 0 {
            return Err(validation(&format!(
                "modes.{name}.drive.stale_timeout_ms must be > 0"
            )));
        }
        if drive.dome_left_gain < 0.0 || drive.dome_right_gain < 0.0 {
            return Err(validation(&format!(
                "modes.{name}.drive dome gains must not be negative"
            )));
        }
        if drive.fine_control_multiplier < 1.0 {
            return Err(validation(&format!(
                "modes.{name}.drive.fine_control_multiplier must be >= 1"
            )));
        }
        if drive.dome_dead_zone > 100 || drive.flick_threshold > 100 {
            return Err(validation(&format!(
                "modes.{name}.drive dome thresholds must be <= 100"
            )));
        }
        if drive.max_flick_speed > drive.dome_speed_limit {
            return Err(validation(&format!(
                "modes.{name}.drive.max_flick_speed must be <= dome_speed_limit"
            )));
        }
    }

    if let Some(dome) = &mode.dome {
        if dome.min_angle_deg == 0 || dome.min_angle_deg > dome.max_angle_deg {
            return Err(validation(&format!(
                "modes.{name}.dome.min_angle_deg must be > 0 and <= max_angle_deg"
            )));
        }
        if dome.min_speed_percent == 0
            || dome.min_speed_percent > dome.max_speed_percent
            || dome.max_speed_percent > 100
        {
            return Err(validation(&format!(
                "modes.{name}.dome speed range must satisfy 0 < min <= max <= 100"
            )));
        }
        if dome.min_delay_ms > dome.max_delay_ms {
            return Err(validation(&format!(
                "modes.{name}.dome.min_delay_ms must be <= max_delay_ms"
            )));
        }
        if dome.moves_before_center == 0 {
            return Err(validation(&format!(
                "modes.{name}.dome.moves_before_center must be > 0"
            )));
        }
        // Truncating a corrective move to whole milliseconds must stay inside the tolerance.
        let fastest = ms_per_degree(timing, f32::from(dome.max_speed_percent));
        if fastest * timing.center_tolerance_deg < 1.0 {
            return Err(validation(&format!(
                "modes.{name}.dome.max_speed_percent is too fast for dome_timing.center_tolerance_deg"
            )));
        }
    }

    if let Some(ambient) = &mode.ambient {
        if ambient.min_interval_ms == 0 || ambient.min_interval_ms > ambient.max_interval_ms {
            return Err(validation(&format!(
                "modes.{name}.ambient interval must satisfy 0 < min <= max"
            )));
        }
    }

    Ok(())
}

fn ms_per_degree(timing: &DomeTimingSection, speed: f32) -> f32 {
    let base = timing.calibration_duration_ms / timing.calibration_angle_deg;
    base * (timing.reference_speed_percent / speed).powf(timing.curve_exponent)
}

fn mode_sections(modes: &ModesSection) -> [(&'static str, &ModeSection); 4] {
    [
        ("manual", &modes.manual),
        ("automated", &modes.automated),
        ("hybrid", &modes.hybrid),
        ("carpet", &modes.carpet),
    ]
}

pub fn render_generated_config(file: &DroidFile) -> String {
    let mut out = String::new();
    let input = &file.input;
    let timing = &file.dome_timing;
    let base_ms_per_degree = timing.calibration_duration_ms / timing.calibration_angle_deg;

    out.push_str("// @generated by droid_config_compiler. Do not edit by hand.\n");
    out.push_str("pub static DROID_CONFIG: DroidConfig = DroidConfig {\n");

    out.push_str("    input: InputConfig {\n");
    for (name, value) in [
        ("valid_min_us", input.valid_min_us),
        ("valid_max_us", input.valid_max_us),
        ("toggle_threshold_us", input.toggle_threshold_us),
        ("toggle_release_us", input.toggle_release_us),
        ("momentary_high_us", input.momentary_high_us),
        ("momentary_low_us", input.momentary_low_us),
    ] {
        let _ = writeln!(out, "        {name}: {value},");
    }
    let _ = writeln!(
        out,
        "        momentary_debounce_ms: {},",
        input.momentary_debounce_ms
    );
    for (name, value) in [
        ("stick_low_max_us", input.stick_low_max_us),
        ("stick_high_min_us", input.stick_high_min_us),
        ("stick_up_max_us", input.stick_up_max_us),
        ("stick_center_us", input.stick_center_us),
        ("stick_span_us", input.stick_span_us),
    ] {
        let _ = writeln!(out, "        {name}: {value},");
    }
    let _ = writeln!(out, "        frame_interval_ms: {},", input.frame_interval_ms);
    out.push_str("    },\n");

    let _ = writeln!(
        out,
        "    combo: ComboConfig {{\n        reset_delay_ms: {},\n    }},",
        file.combo.reset_delay_ms
    );

    out.push_str("    dome_timing: DomeTimingConfig {\n");
    let _ = writeln!(out, "        base_ms_per_degree: {base_ms_per_degree:?},");
    let _ = writeln!(
        out,
        "        reference_speed_percent: {:?},",
        timing.reference_speed_percent
    );
    let _ = writeln!(out, "        curve_exponent: {:?},", timing.curve_exponent);
    let _ = writeln!(out, "        right_bias: {:?},", timing.right_bias);
    let _ = writeln!(out, "        left_bias: {:?},", timing.left_bias);
    let _ = writeln!(
        out,
        "        center_tolerance_deg: {:?},",
        timing.center_tolerance_deg
    );
    out.push_str("    },\n");

    let mut actions = file.combo_actions.clone();
    actions.sort_by_key(|action| action.id);
    out.push_str("    combo_actions: &[\n");
    for action in &actions {
        let script = match &action.script {
            Some(script) => format!("Some({script:?})"),
            None => "None".to_string(),
        };
        let audio = match action.audio {
            AudioEffectEntry::None => "AudioEffect::None",
            AudioEffectEntry::Suppress => "AudioEffect::Suppress",
            AudioEffectEntry::Enable => "AudioEffect::Enable",
        };
        let _ = writeln!(
            out,
            "        ComboAction {{\n            id: {},\n            label: {:?},\n            script: {script},\n            audio: {audio},\n        }},",
            action.id, action.label
        );
    }
    out.push_str("    ],\n");

    out.push_str("    modes: ModeTable {\n");
    for (name, mode) in mode_sections(&file.modes) {
        render_mode(&mut out, name, mode);
    }
    out.push_str("    },\n");

    let banks = &file.sound_banks;
    out.push_str("    sound_banks: SoundBankConfig {\n");
    for (name, range) in [
        ("happy", banks.happy),
        ("sad", banks.sad),
        ("talking", banks.talking),
        ("yelling", banks.yelling),
        ("classic", banks.classic),
        ("dance", banks.dance),
        ("singing", banks.singing),
        ("lines", banks.lines),
    ] {
        let _ = writeln!(
            out,
            "        {name}: TrackRange {{ first: {}, last: {} }},",
            range[0], range[1]
        );
    }
    out.push_str("    },\n");

    let hw = &file.hardware;
    out.push_str("    hardware: HardwareConfig {\n");
    let _ = writeln!(out, "        drive_address: {},", hw.drive_address);
    let _ = writeln!(out, "        dome_address: {},", hw.dome_address);
    let _ = writeln!(out, "        motor_baud: {},", hw.motor_baud);
    let _ = writeln!(out, "        audio_baud: {},", hw.audio_baud);
    let _ = writeln!(out, "        script_baud: {},", hw.script_baud);
    let _ = writeln!(
        out,
        "        actuator_refresh_ms: {},",
        hw.actuator_refresh_ms
    );
    out.push_str("    },\n");

    out.push_str("};\n");
    out
}

fn gesture_bits(gestures: &[String]) -> u8 {
    gestures
        .iter()
        .filter_map(|gesture| kill_gesture_bit(gesture))
        .fold(0u8, |bits, bit| bits | (1 << bit))
}

fn render_mode(out: &mut String, name: &str, mode: &ModeSection) {
    let kill_bits = gesture_bits(&mode.kill);
    let audio_kill_bits = mode
        .audio_kill
        .as_deref()
        .map_or(kill_bits, gesture_bits);

    let _ = writeln!(out, "        {name}: ModeProfile {{");
    let _ = writeln!(
        out,
        "            max_action_combo: {},",
        mode.max_action_combo
    );
    let _ = writeln!(
        out,
        "            kill: GestureSet::from_bits({kill_bits:#010b}),"
    );
    let _ = writeln!(
        out,
        "            audio_kill: GestureSet::from_bits({audio_kill_bits:#010b}),"
    );
    let _ = writeln!(out, "            entry_delay_ms: {},", mode.entry_delay_ms);

    match &mode.drive {
        Some(drive) => {
            out.push_str("            drive: Some(DriveProfile {\n");
            let _ = writeln!(out, "                expo: {:?},", drive.expo);
            for (field, value) in [
                ("speed_limit", drive.speed_limit),
                ("dead_zone", drive.dead_zone),
                ("high_drive_threshold", drive.high_drive_threshold),
                ("high_drive_turn_limit", drive.high_drive_turn_limit),
                ("taper_fall_rate", drive.taper_fall_rate),
            ] {
                let _ = writeln!(out, "                {field}: {value},");
            }
            let _ = writeln!(
                out,
                "                stale_timeout_ms: {},",
                drive.stale_timeout_ms
            );
            let _ = writeln!(out, "                manual_dome: {},", drive.manual_dome);
            let _ = writeln!(
                out,
                "                dome_speed_limit: {},",
                drive.dome_speed_limit
            );
            let _ = writeln!(
                out,
                "                dome_left_gain: {:?},",
                drive.dome_left_gain
            );
            let _ = writeln!(
                out,
                "                dome_right_gain: {:?},",
                drive.dome_right_gain
            );
            let _ = writeln!(out, "                dome_dead_zone: {},", drive.dome_dead_zone);
            let _ = writeln!(
                out,
                "                fine_control_multiplier: {:?},",
                drive.fine_control_multiplier
            );
            let _ = writeln!(
                out,
                "                flick_min_duration_ms: {},",
                drive.flick_min_duration_ms
            );
            let _ = writeln!(out, "                flick_threshold: {},", drive.flick_threshold);
            let _ = writeln!(out, "                max_flick_speed: {},", drive.max_flick_speed);
            out.push_str("            }),\n");
        }
        None => out.push_str("            drive: None,\n"),
    }

    match &mode.dome {
        Some(dome) => {
            out.push_str("            dome: Some(DomeAutomationConfig {\n");
            let _ = writeln!(out, "                min_angle_deg: {},", dome.min_angle_deg);
            let _ = writeln!(out, "                max_angle_deg: {},", dome.max_angle_deg);
            let _ = writeln!(
                out,
                "                min_speed_percent: {},",
                dome.min_speed_percent
            );
            let _ = writeln!(
                out,
                "                max_speed_percent: {},",
                dome.max_speed_percent
            );
            let _ = writeln!(out, "                min_delay_ms: {},", dome.min_delay_ms);
            let _ = writeln!(out, "                max_delay_ms: {},", dome.max_delay_ms);
            let _ = writeln!(
                out,
                "                moves_before_center: {},",
                dome.moves_before_center
            );
            out.push_str("            }),\n");
        }
        None => out.push_str("            dome: None,\n"),
    }

    match &mode.ambient {
        Some(ambient) => {
            let _ = writeln!(
                out,
                "            ambient: Some(AmbientSoundConfig {{\n                min_interval_ms: {},\n                max_interval_ms: {},\n            }}),",
                ambient.min_interval_ms, ambient.max_interval_ms
            );
        }
        None => out.push_str("            ambient: None,\n"),
    }

    out.push_str("        },\n");
}

pub fn generate_from_path(path: &Path) -> Result<String, ConfigCompilerError> {
    let file = parse_droid_file(path)?;
    validate_config(&file)?;
    Ok(render_generated_config(&file))
}

fn validation(msg: &str) -> ConfigCompilerError {
    ConfigCompilerError::Validation(msg.to_string())
}
