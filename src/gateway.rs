//! Output seams of the control core. The firmware implements them over UARTs; tests record
//! the calls.

use crate::types::MotorAxis;

/// Signed speed per motor axis, in percent (-100..=100). Fire-and-forget.
pub trait ActuatorGateway {
    fn set_speed(&mut self, axis: MotorAxis, percent: i8);
}

pub trait AudioGateway {
    fn trigger(&mut self, track: u16);
    fn is_suppressed(&self) -> bool;
    fn set_suppressed(&mut self, suppressed: bool);
}

/// Raw command strings for the dome light and panel controller.
pub trait ScriptGateway {
    fn send_script(&mut self, script: &str);
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;

    #[derive(Default)]
    pub(crate) struct RecordingActuator {
        pub writes: Vec<(MotorAxis, i8)>,
        pub last: [i8; 3],
    }

    impl RecordingActuator {
        pub(crate) fn speed(&self, axis: MotorAxis) -> i8 {
            self.last[axis.index()]
        }

        pub(crate) fn writes_for(&self, axis: MotorAxis) -> Vec<i8> {
            self.writes
                .iter()
                .filter(|(written, _)| *written == axis)
                .map(|(_, percent)| *percent)
                .collect()
        }
    }

    impl ActuatorGateway for RecordingActuator {
        fn set_speed(&mut self, axis: MotorAxis, percent: i8) {
            self.writes.push((axis, percent));
            self.last[axis.index()] = percent;
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingAudio {
        pub tracks: Vec<u16>,
        pub suppressed: bool,
    }

    impl AudioGateway for RecordingAudio {
        fn trigger(&mut self, track: u16) {
            self.tracks.push(track);
        }

        fn is_suppressed(&self) -> bool {
            self.suppressed
        }

        fn set_suppressed(&mut self, suppressed: bool) {
            self.suppressed = suppressed;
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingScripts {
        pub scripts: Vec<String>,
    }

    impl ScriptGateway for RecordingScripts {
        fn send_script(&mut self, script: &str) {
            self.scripts.push(script.into());
        }
    }
}
