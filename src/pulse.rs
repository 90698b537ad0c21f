//! Latest-value pulse width capture shared between edge interrupts and the control loop.
//!
//! Each slot is written only from its pin's edge handler and read by the control loop.
//! Values are independent atomics, so a reader may pair a fresh width with the previous
//! timestamp for one frame; the next frame sees both.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::types::{ChannelId, Controller, CHANNEL_COUNT};

/// Most recent complete high pulse on one channel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChannelSample {
    pub channel: ChannelId,
    /// 0 until the first complete pulse arrives.
    pub width_us: u16,
    /// Millisecond timestamp of the falling edge that published `width_us`.
    pub at_ms: u32,
}

impl ChannelSample {
    pub const fn empty(channel: ChannelId) -> Self {
        Self {
            channel,
            width_us: 0,
            at_ms: 0,
        }
    }

    pub fn age_ms(&self, now_ms: u64) -> u32 {
        (now_ms as u32).wrapping_sub(self.at_ms)
    }
}

pub struct PulseSlot {
    rise_us: AtomicU32,
    armed: AtomicBool,
    width_us: AtomicU32,
    stamp_ms: AtomicU32,
}

impl PulseSlot {
    pub const fn new() -> Self {
        Self {
            rise_us: AtomicU32::new(0),
            armed: AtomicBool::new(false),
            width_us: AtomicU32::new(0),
            stamp_ms: AtomicU32::new(0),
        }
    }

    pub fn rising_edge(&self, now_us: u64) {
        self.rise_us.store(now_us as u32, Ordering::Relaxed);
        self.armed.store(true, Ordering::Release);
    }

    /// Publishes the pulse width if a rising edge was seen first; a lone falling edge is ignored.
    pub fn falling_edge(&self, now_us: u64) {
        if !self.armed.swap(false, Ordering::Acquire) {
            return;
        }
        let rise = self.rise_us.load(Ordering::Relaxed);
        let width = (now_us as u32).wrapping_sub(rise).min(u32::from(u16::MAX));
        self.width_us.store(width, Ordering::Relaxed);
        self.stamp_ms.store((now_us / 1_000) as u32, Ordering::Relaxed);
    }

    pub fn edge(&self, level_high: bool, now_us: u64) {
        if level_high {
            self.rising_edge(now_us);
        } else {
            self.falling_edge(now_us);
        }
    }

    pub fn sample(&self, channel: ChannelId) -> ChannelSample {
        ChannelSample {
            channel,
            width_us: self.width_us.load(Ordering::Relaxed) as u16,
            at_ms: self.stamp_ms.load(Ordering::Relaxed),
        }
    }
}

impl Default for PulseSlot {
    fn default() -> Self {
        Self::new()
    }
}

pub struct PulseBank {
    slots: [PulseSlot; CHANNEL_COUNT],
}

impl PulseBank {
    pub const fn new() -> Self {
        Self {
            slots: [const { PulseSlot::new() }; CHANNEL_COUNT],
        }
    }

    pub fn slot(&self, channel: ChannelId) -> &PulseSlot {
        &self.slots[channel.index()]
    }

    pub fn frame(&self, now_ms: u64) -> ControlFrame {
        let mut frame = ControlFrame::empty(now_ms);
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(channel) = ChannelId::from_index(index) {
                frame.samples[index] = slot.sample(channel);
            }
        }
        frame
    }
}

impl Default for PulseBank {
    fn default() -> Self {
        Self::new()
    }
}

pub static PULSE_BANK: PulseBank = PulseBank::new();

/// One control iteration's view of every channel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ControlFrame {
    pub now_ms: u64,
    pub samples: [ChannelSample; CHANNEL_COUNT],
}

impl ControlFrame {
    pub fn empty(now_ms: u64) -> Self {
        let mut samples = [ChannelSample::empty(ChannelId::horizontal(Controller::A)); CHANNEL_COUNT];
        for (index, sample) in samples.iter_mut().enumerate() {
            if let Some(channel) = ChannelId::from_index(index) {
                *sample = ChannelSample::empty(channel);
            }
        }
        Self { now_ms, samples }
    }

    pub fn sample(&self, channel: ChannelId) -> ChannelSample {
        self.samples[channel.index()]
    }

    pub fn width(&self, channel: ChannelId) -> u16 {
        self.samples[channel.index()].width_us
    }

    /// Sets a channel as if a pulse had just been published at `now_ms`.
    pub fn with_width(mut self, channel: ChannelId, width_us: u16) -> Self {
        self.samples[channel.index()] = ChannelSample {
            channel,
            width_us,
            at_ms: self.now_ms as u32,
        };
        self
    }
}
