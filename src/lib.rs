#![cfg_attr(not(test), no_std)]

pub mod codec;
pub mod combo;
pub mod config;
pub mod control;
pub mod drive;
pub mod entropy;
pub mod gateway;
pub mod gesture;
pub mod pulse;
pub mod sequencer;
pub mod snapshot;
pub mod soundboard;
pub mod telemetry;
pub mod types;

#[cfg(feature = "esp-hal-runtime")]
pub mod firmware;
