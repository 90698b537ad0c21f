use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embassy_time::{Duration, Ticker};
use esp_hal::rng::Rng;

use super::{
    uart::{MarcDuinoSerial, MotorSerial, Mp3TriggerSerial},
    uptime_ms, uptime_us,
};
use crate::{
    config::active_config,
    control::{ControlLoop, DiagEvent},
    entropy::Entropy,
    pulse::PULSE_BANK,
    telemetry,
};

const DIAG_EVENT_QUEUE: usize = 32;
const TELEMETRY_INTERVAL_SECONDS: u64 = 30;

static DIAG_EVENTS: Channel<CriticalSectionRawMutex, DiagEvent, DIAG_EVENT_QUEUE> = Channel::new();

pub(crate) struct HardwareEntropy {
    rng: Rng,
}

impl HardwareEntropy {
    pub(crate) fn new(rng: Rng) -> Self {
        Self { rng }
    }
}

impl Entropy for HardwareEntropy {
    fn next_u32(&mut self) -> u32 {
        self.rng.random()
    }
}

/// Everything the control task owns for its lifetime.
pub(crate) struct ControlContext {
    pub(crate) motors: MotorSerial,
    pub(crate) audio: Mp3TriggerSerial,
    pub(crate) scripts: MarcDuinoSerial,
    pub(crate) entropy: HardwareEntropy,
}

#[embassy_executor::task]
pub(crate) async fn control_task(mut context: ControlContext) {
    let config = active_config();
    let frame_interval_us = (config.input.frame_interval_ms * 1_000).min(u32::MAX as u64) as u32;
    let mut control = ControlLoop::new(config, uptime_ms());
    let mut ticker = Ticker::every(Duration::from_millis(config.input.frame_interval_ms));
    log::info!("control: started mode={}", control.mode().label());

    loop {
        ticker.next().await;
        let started_us = uptime_us();
        let frame = PULSE_BANK.frame(uptime_ms());
        let report = control.step(
            &frame,
            &mut context.motors,
            &mut context.audio,
            &mut context.scripts,
            &mut context.entropy,
        );
        let step_us = uptime_us()
            .saturating_sub(started_us)
            .min(u32::MAX as u64) as u32;
        telemetry::record_frame_step(step_us, frame_interval_us);

        for event in report.diag.iter() {
            if DIAG_EVENTS.try_send(*event).is_err() {
                telemetry::record_diag_dropped();
            }
        }
    }
}

#[embassy_executor::task]
pub(crate) async fn diagnostics_task() {
    loop {
        let event = DIAG_EVENTS.receive().await;
        esp_println::println!("{}", event);
    }
}

#[embassy_executor::task]
pub(crate) async fn telemetry_task() {
    let mut ticker = Ticker::every(Duration::from_secs(TELEMETRY_INTERVAL_SECONDS));

    loop {
        ticker.next().await;
        let counters = telemetry::snapshot();
        esp_println::println!(
            "telemetry: combos accepted={} rejected={}/{} expired={} modes={} kills={} dome free={} corrective={} aborted={} sounds={} diag_dropped={} uart_fail={} overruns={} step_max_us={}",
            counters.combos_accepted,
            counters.combos_rejected_whitelist,
            counters.combos_rejected_repeated,
            counters.combos_expired,
            counters.mode_switches,
            counters.kill_activations,
            counters.dome_free_roam_moves,
            counters.dome_corrective_moves,
            counters.dome_aborted_moves,
            counters.sounds_triggered,
            counters.diag_dropped,
            counters.uart_write_failures,
            counters.frame_overruns,
            counters.frame_step_us_max
        );
    }
}
