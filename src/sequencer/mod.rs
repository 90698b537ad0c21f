//! Autonomous dome motion for modes with dome automation.

pub mod machine;
pub mod timing;

pub use machine::{
    DomeSequencer, MotionCommand, SequencerAction, SequencerOutput, SequencerPhase,
    SequencerTrace,
};
pub use timing::{ms_per_degree, plan_duration, MoveKind};
