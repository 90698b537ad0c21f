//! Byte encodings for the serial peripherals: Sabertooth/SyRen packetized serial and the
//! SparkFun MP3 Trigger. MarcDuino scripts go out as raw ASCII and need no encoding.

use crate::types::MotorAxis;

/// Autobaud byte the motor controllers expect once after power-up.
pub const SABERTOOTH_SYNC: u8 = 0xAA;

pub const SABERTOOTH_PACKET_LEN: usize = 4;

const MAX_WIRE_POWER: u16 = 127;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum SabertoothCommand {
    Motor1Forward = 0,
    Motor1Backward = 1,
    DriveForward = 8,
    DriveBackward = 9,
    TurnRight = 10,
    TurnLeft = 11,
}

impl SabertoothCommand {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Command for `axis` in the direction of `percent`. Drive and turn use mixed mode on the
    /// drive controller; the dome is motor 1 of its own SyRen.
    pub const fn for_axis(axis: MotorAxis, percent: i8) -> Self {
        let reverse = percent < 0;
        match (axis, reverse) {
            (MotorAxis::Drive, false) => Self::DriveForward,
            (MotorAxis::Drive, true) => Self::DriveBackward,
            (MotorAxis::Turn, false) => Self::TurnRight,
            (MotorAxis::Turn, true) => Self::TurnLeft,
            (MotorAxis::Dome, false) => Self::Motor1Forward,
            (MotorAxis::Dome, true) => Self::Motor1Backward,
        }
    }
}

/// Scales a percent magnitude to the 0..=127 wire range.
pub fn wire_power(percent: i8) -> u8 {
    let magnitude = u16::from(percent.unsigned_abs().min(100));
    (magnitude * MAX_WIRE_POWER / 100) as u8
}

pub fn sabertooth_checksum(address: u8, command: u8, value: u8) -> u8 {
    address.wrapping_add(command).wrapping_add(value) & 0x7F
}

/// Address, command, value, checksum.
pub fn encode_sabertooth(address: u8, axis: MotorAxis, percent: i8) -> [u8; SABERTOOTH_PACKET_LEN] {
    let command = SabertoothCommand::for_axis(axis, percent).as_u8();
    let value = wire_power(percent);
    [
        address,
        command,
        value,
        sabertooth_checksum(address, command, value),
    ]
}

/// `'t'` followed by the track number as one byte. `None` for tracks the board cannot address.
pub fn encode_mp3_trigger(track: u16) -> Option<[u8; 2]> {
    let track = u8::try_from(track).ok().filter(|track| *track > 0)?;
    Some([b't', track])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_forward_drive_packet() {
        assert_eq!(encode_sabertooth(128, MotorAxis::Drive, 100), [128, 8, 127, 7]);
    }

    #[test]
    fn reverse_selects_backward_commands() {
        assert_eq!(encode_sabertooth(128, MotorAxis::Drive, -50)[1], 9);
        assert_eq!(encode_sabertooth(128, MotorAxis::Turn, -50)[1], 11);
        assert_eq!(encode_sabertooth(128, MotorAxis::Turn, 50)[1], 10);
        assert_eq!(encode_sabertooth(129, MotorAxis::Dome, -30)[1], 1);
    }

    #[test]
    fn dome_stop_packet_is_forward_zero() {
        let packet = encode_sabertooth(129, MotorAxis::Dome, 0);
        assert_eq!(packet, [129, 0, 0, 1]);
    }

    #[test]
    fn checksum_is_seven_bits() {
        let packet = encode_sabertooth(129, MotorAxis::Turn, -100);
        // 129 + 11 + 127 overflows a byte; only the low seven bits are sent.
        assert_eq!(packet[3], ((129u16 + 11 + 127) & 0x7F) as u8);
        assert_eq!(packet[3], 11);
        assert_eq!(sabertooth_checksum(200, 200, 200), (600u16 & 0x7F) as u8);
    }

    #[test]
    fn wire_power_scales_and_saturates() {
        assert_eq!(wire_power(0), 0);
        assert_eq!(wire_power(30), 38);
        assert_eq!(wire_power(-100), 127);
        assert_eq!(wire_power(i8::MIN), 127);
    }

    #[test]
    fn mp3_trigger_bytes() {
        assert_eq!(encode_mp3_trigger(61), Some([b't', 61]));
        assert_eq!(encode_mp3_trigger(0), None);
        assert_eq!(encode_mp3_trigger(300), None);
    }
}
