use esp_hal::{uart::Uart, Blocking};

use crate::{
    codec::{encode_mp3_trigger, encode_sabertooth, SABERTOOTH_SYNC},
    config::HardwareConfig,
    gateway::{ActuatorGateway, AudioGateway, ScriptGateway},
    telemetry,
    types::MotorAxis,
};

pub(crate) type SerialUart = Uart<'static, Blocking>;

fn uart_write_all(uart: &mut SerialUart, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        match uart.write(bytes) {
            Ok(0) | Err(_) => {
                telemetry::record_uart_write_failure();
                return;
            }
            Ok(written) => bytes = &bytes[written..],
        }
    }
}

/// Sabertooth 2x32 (drive and turn, mixed mode) and SyRen (dome) sharing one TX line.
pub(crate) struct MotorSerial {
    uart: SerialUart,
    drive_address: u8,
    dome_address: u8,
}

impl MotorSerial {
    /// Sends the autobaud byte so the controllers lock onto the line rate.
    pub(crate) fn new(mut uart: SerialUart, hardware: &HardwareConfig) -> Self {
        uart_write_all(&mut uart, &[SABERTOOTH_SYNC]);
        Self {
            uart,
            drive_address: hardware.drive_address,
            dome_address: hardware.dome_address,
        }
    }
}

impl ActuatorGateway for MotorSerial {
    fn set_speed(&mut self, axis: MotorAxis, percent: i8) {
        let address = match axis {
            MotorAxis::Dome => self.dome_address,
            MotorAxis::Drive | MotorAxis::Turn => self.drive_address,
        };
        let packet = encode_sabertooth(address, axis, percent);
        uart_write_all(&mut self.uart, &packet);
    }
}

pub(crate) struct Mp3TriggerSerial {
    uart: SerialUart,
    suppressed: bool,
}

impl Mp3TriggerSerial {
    pub(crate) fn new(uart: SerialUart) -> Self {
        Self {
            uart,
            suppressed: false,
        }
    }
}

impl AudioGateway for Mp3TriggerSerial {
    fn trigger(&mut self, track: u16) {
        let Some(command) = encode_mp3_trigger(track) else {
            log::warn!("sound: track {} out of range", track);
            return;
        };
        uart_write_all(&mut self.uart, &command);
    }

    fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }
}

pub(crate) struct MarcDuinoSerial {
    uart: SerialUart,
}

impl MarcDuinoSerial {
    pub(crate) fn new(uart: SerialUart) -> Self {
        Self { uart }
    }
}

impl ScriptGateway for MarcDuinoSerial {
    fn send_script(&mut self, script: &str) {
        uart_write_all(&mut self.uart, script.as_bytes());
    }
}
