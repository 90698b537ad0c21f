//! ESP32-S3 glue: pulse capture interrupts, UART gateways and the embassy tasks that drive
//! [`ControlLoop`](crate::control::ControlLoop) at the configured frame rate.

mod bootstrap;
mod pulse_isr;
mod tasks;
mod uart;

pub use bootstrap::run;

/// Milliseconds since boot on the same clock the pulse interrupt stamps edges with.
pub(crate) fn uptime_ms() -> u64 {
    esp_hal::time::Instant::now()
        .duration_since_epoch()
        .as_millis()
}

pub(crate) fn uptime_us() -> u64 {
    esp_hal::time::Instant::now()
        .duration_since_epoch()
        .as_micros()
}
