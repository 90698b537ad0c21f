use core::cell::RefCell;

use critical_section::Mutex;
use esp_hal::{
    gpio::{Event, Input, Io},
    handler,
};

use crate::{
    pulse::PULSE_BANK,
    types::{ChannelId, CHANNEL_COUNT},
};

/// Receiver inputs in `ChannelId::index` order.
pub(crate) type PulseInputs = [Input<'static>; CHANNEL_COUNT];

static PULSE_INPUTS: Mutex<RefCell<Option<PulseInputs>>> = Mutex::new(RefCell::new(None));

pub(crate) fn install(io: &mut Io<'_>, mut inputs: PulseInputs) {
    io.set_interrupt_handler(pulse_edge_handler);
    critical_section::with(|cs| {
        for input in inputs.iter_mut() {
            input.listen(Event::AnyEdge);
        }
        PULSE_INPUTS.borrow_ref_mut(cs).replace(inputs);
    });
}

#[handler]
fn pulse_edge_handler() {
    let now_us = super::uptime_us();
    critical_section::with(|cs| {
        let mut inputs = PULSE_INPUTS.borrow_ref_mut(cs);
        let Some(inputs) = inputs.as_mut() else {
            return;
        };
        for (index, input) in inputs.iter_mut().enumerate() {
            if !input.is_interrupt_set() {
                continue;
            }
            input.clear_interrupt();
            if let Some(channel) = ChannelId::from_index(index) {
                PULSE_BANK.slot(channel).edge(input.is_high(), now_us);
            }
        }
    });
}
