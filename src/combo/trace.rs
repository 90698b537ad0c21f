use crate::types::Mode;

use super::types::{ComboId, RejectReason};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ArbiterTrace {
    pub now_ms: u64,
    pub mode: Mode,
    pub combo: ComboId,
    /// Id produced by detection this pass, `IDLE` when nothing fired.
    pub detected: ComboId,
    pub reject_reason: RejectReason,
}
