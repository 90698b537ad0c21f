//! Combo and mode arbitration.
//!
//! A button edge coinciding with a gesture on the other controller's stick yields a combo id.
//! Ids 1-4 select the operating mode; higher ids trigger actions that the current mode's
//! whitelist allows and expire after the reset delay.

pub mod arbiter;
pub mod detect;
pub mod kill;
pub mod trace;
pub mod types;

pub use arbiter::{ArbiterOutput, ComboArbiter};
pub use kill::{audio_kill_active, kill_switch_active};
pub use trace::ArbiterTrace;
pub use types::{ActionBuffer, ArbiterAction, ComboId, RejectReason};

#[cfg(test)]
mod tests;
