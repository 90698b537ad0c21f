use esp_hal::{
    gpio::{Input, InputConfig, Io},
    rng::Rng,
    timer::timg::TimerGroup,
    uart::{Config as UartConfig, Uart},
};

use super::{
    pulse_isr,
    tasks::{self, ControlContext, HardwareEntropy},
    uart::{MarcDuinoSerial, MotorSerial, Mp3TriggerSerial},
};
use crate::config::active_config;

pub fn run() -> ! {
    esp_println::logger::init_logger(log::LevelFilter::Info);

    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let hardware = &active_config().hardware;

    let marcduino = Uart::new(
        peripherals.UART0,
        UartConfig::default().with_baudrate(hardware.script_baud),
    )
    .expect("failed to init UART0")
    .with_rx(peripherals.GPIO44)
    .with_tx(peripherals.GPIO43);

    let mp3_trigger = Uart::new(
        peripherals.UART1,
        UartConfig::default().with_baudrate(hardware.audio_baud),
    )
    .expect("failed to init UART1")
    .with_tx(peripherals.GPIO17);

    let sabertooth = Uart::new(
        peripherals.UART2,
        UartConfig::default().with_baudrate(hardware.motor_baud),
    )
    .expect("failed to init UART2")
    .with_tx(peripherals.GPIO18);

    let pulse_config = InputConfig::default();
    let pulse_inputs = [
        Input::new(peripherals.GPIO4, pulse_config),
        Input::new(peripherals.GPIO5, pulse_config),
        Input::new(peripherals.GPIO6, pulse_config),
        Input::new(peripherals.GPIO7, pulse_config),
        Input::new(peripherals.GPIO15, pulse_config),
        Input::new(peripherals.GPIO16, pulse_config),
        Input::new(peripherals.GPIO8, pulse_config),
        Input::new(peripherals.GPIO9, pulse_config),
        Input::new(peripherals.GPIO10, pulse_config),
        Input::new(peripherals.GPIO11, pulse_config),
        Input::new(peripherals.GPIO12, pulse_config),
        Input::new(peripherals.GPIO13, pulse_config),
    ];
    let mut io = Io::new(peripherals.IO_MUX);
    pulse_isr::install(&mut io, pulse_inputs);

    let context = ControlContext {
        motors: MotorSerial::new(sabertooth, hardware),
        audio: Mp3TriggerSerial::new(mp3_trigger),
        scripts: MarcDuinoSerial::new(marcduino),
        entropy: HardwareEntropy::new(Rng::new()),
    };

    let mut executor = esp_rtos::embassy::Executor::new();
    let executor = unsafe { make_static(&mut executor) };
    executor.run(move |spawner| {
        spawner.must_spawn(tasks::control_task(context));
        spawner.must_spawn(tasks::diagnostics_task());
        spawner.must_spawn(tasks::telemetry_task());
    });
}

unsafe fn make_static<T>(value: &mut T) -> &'static mut T {
    unsafe { core::mem::transmute(value) }
}
