use heapless::Vec;
use libm::fabsf;
use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::{
    config::{DomeAutomationConfig, DomeTimingConfig},
    entropy::Entropy,
};

use super::timing::{ms_per_degree, plan_duration, MoveKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
#[repr(u8)]
pub enum SequencerPhase {
    /// Waiting out the entry delay after a mode change or kill release.
    #[default]
    Warmup = 0,
    Idle = 1,
    Moving = 2,
    Suspended = 3,
}

impl SequencerPhase {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionCommand {
    pub kind: MoveKind,
    /// +1 turns right, -1 turns left.
    pub direction: i8,
    pub speed_percent: u8,
    pub angle_deg: f32,
    pub duration_ms: u32,
    pub issued_at_ms: u64,
}

impl MotionCommand {
    pub fn signed_speed(&self) -> i8 {
        self.direction * self.speed_percent.min(100) as i8
    }

    fn ends_at_ms(&self) -> u64 {
        self.issued_at_ms + u64::from(self.duration_ms)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SequencerAction {
    SequenceStarted { speed_percent: u8 },
    Start(MotionCommand),
    Stop { completed: bool },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SequencerTrace {
    pub now_ms: u64,
    pub phase: SequencerPhase,
    pub offset_deg: f32,
    pub moves_since_center: u8,
    pub sequence_speed: u8,
}

#[derive(Clone, Debug, Default)]
pub struct SequencerOutput {
    pub actions: Vec<SequencerAction, 4>,
    pub trace: SequencerTrace,
}

/// Random parameters for the next move, drawn before dispatch so the state machine stays
/// deterministic.
#[derive(Clone, Copy, Debug, PartialEq)]
struct MoveDraw {
    speed_percent: u8,
    direction: i8,
    angle_deg: f32,
    delay_ms: u32,
}

impl MoveDraw {
    fn sample(automation: &DomeAutomationConfig, entropy: &mut impl Entropy) -> Self {
        let speed_percent = entropy.range_inclusive(
            u32::from(automation.min_speed_percent),
            u32::from(automation.max_speed_percent),
        ) as u8;
        let direction = if entropy.coin() { 1 } else { -1 };
        let angle_deg = entropy.range_inclusive(
            u32::from(automation.min_angle_deg),
            u32::from(automation.max_angle_deg),
        ) as f32;
        let delay_ms = entropy.range_inclusive(automation.min_delay_ms, automation.max_delay_ms);
        Self {
            speed_percent,
            direction,
            angle_deg,
            delay_ms,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum SequencerEvent {
    Tick { now_ms: u64, draw: Option<MoveDraw> },
    Kill { now_ms: u64 },
    Release { now_ms: u64, delay_ms: u32 },
}

#[derive(Default)]
struct DispatchContext {
    actions: Vec<SequencerAction, 4>,
}

impl DispatchContext {
    fn push(&mut self, action: SequencerAction) {
        let _ = self.actions.push(action);
    }
}

/// Open-loop autonomous dome motion: bounded sequences of free-roam moves, each sequence
/// closed by a corrective move back toward center.
pub struct DomeSequencer {
    machine: statig::blocking::StateMachine<SequencerHsm>,
    killed: bool,
}

impl DomeSequencer {
    pub fn new(
        automation: DomeAutomationConfig,
        timing: DomeTimingConfig,
        entry_delay_ms: u64,
        now_ms: u64,
    ) -> Self {
        Self {
            machine: SequencerHsm::new(automation, timing, entry_delay_ms, now_ms).state_machine(),
            killed: false,
        }
    }

    /// Advances one control frame. `killed` is the current kill-switch level. A rising edge
    /// suspends the sequencer; the falling edge resumes it in idle with a fresh move delay.
    pub fn tick(
        &mut self,
        now_ms: u64,
        killed: bool,
        entropy: &mut impl Entropy,
    ) -> SequencerOutput {
        let event = match (self.killed, killed) {
            (false, true) => SequencerEvent::Kill { now_ms },
            (true, false) => {
                let automation = &self.machine.inner().automation;
                let delay_ms =
                    entropy.range_inclusive(automation.min_delay_ms, automation.max_delay_ms);
                SequencerEvent::Release { now_ms, delay_ms }
            }
            _ => {
                let inner = self.machine.inner();
                let draw = inner
                    .move_due(now_ms)
                    .then(|| MoveDraw::sample(&inner.automation, entropy));
                SequencerEvent::Tick { now_ms, draw }
            }
        };
        self.killed = killed;

        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        SequencerOutput {
            actions: context.actions,
            trace: self.machine.inner().trace(now_ms),
        }
    }

    pub fn phase(&self) -> SequencerPhase {
        self.machine.inner().phase
    }

    pub fn offset_deg(&self) -> f32 {
        self.machine.inner().offset_deg
    }

    pub fn moves_since_center(&self) -> u8 {
        self.machine.inner().moves_since_center
    }

    /// Signed dome speed of the command in flight, 0 when idle.
    pub fn dome_speed(&self) -> i8 {
        self.machine
            .inner()
            .current
            .as_ref()
            .map_or(0, MotionCommand::signed_speed)
    }
}

struct SequencerHsm {
    automation: DomeAutomationConfig,
    timing: DomeTimingConfig,
    phase: SequencerPhase,
    resume_at_ms: u64,
    next_move_at_ms: u64,
    offset_deg: f32,
    moves_since_center: u8,
    sequence_speed: Option<u8>,
    current: Option<MotionCommand>,
}

impl SequencerHsm {
    fn new(
        automation: DomeAutomationConfig,
        timing: DomeTimingConfig,
        entry_delay_ms: u64,
        now_ms: u64,
    ) -> Self {
        Self {
            automation,
            timing,
            phase: SequencerPhase::Warmup,
            resume_at_ms: now_ms + entry_delay_ms,
            next_move_at_ms: 0,
            offset_deg: 0.0,
            moves_since_center: 0,
            sequence_speed: None,
            current: None,
        }
    }

    fn move_due(&self, now_ms: u64) -> bool {
        self.phase == SequencerPhase::Idle && now_ms >= self.next_move_at_ms
    }

    fn trace(&self, now_ms: u64) -> SequencerTrace {
        SequencerTrace {
            now_ms,
            phase: self.phase,
            offset_deg: self.offset_deg,
            moves_since_center: self.moves_since_center,
            sequence_speed: self.sequence_speed.unwrap_or(0),
        }
    }

    fn wants_correction(&self) -> bool {
        let drifted = fabsf(self.offset_deg) > self.timing.center_tolerance_deg;
        self.moves_since_center >= self.automation.moves_before_center
            || (self.moves_since_center == 0 && drifted)
    }

    /// Plans and issues the next move. Returns false when the planned duration rounds to
    /// zero and nothing was sent.
    fn start_move(&mut self, context: &mut DispatchContext, now_ms: u64, draw: MoveDraw) -> bool {
        let speed_percent = match self.sequence_speed {
            Some(speed) => speed,
            None => {
                self.sequence_speed = Some(draw.speed_percent);
                context.push(SequencerAction::SequenceStarted {
                    speed_percent: draw.speed_percent,
                });
                draw.speed_percent
            }
        };

        let (kind, direction, angle_deg) = if self.wants_correction() {
            let direction = if self.offset_deg >= 0.0 { -1 } else { 1 };
            (MoveKind::Corrective, direction, fabsf(self.offset_deg))
        } else {
            (MoveKind::FreeRoam, draw.direction, draw.angle_deg)
        };

        let rate = ms_per_degree(speed_percent, kind, direction, &self.timing);
        let (duration_ms, actual_deg) = plan_duration(angle_deg, rate);
        self.offset_deg += f32::from(direction) * actual_deg;
        self.next_move_at_ms = now_ms + u64::from(draw.delay_ms);

        match kind {
            MoveKind::Corrective => {
                self.moves_since_center = 0;
                self.sequence_speed = None;
            }
            MoveKind::FreeRoam => self.moves_since_center += 1,
        }

        if duration_ms == 0 {
            return false;
        }

        let command = MotionCommand {
            kind,
            direction,
            speed_percent,
            angle_deg: actual_deg,
            duration_ms,
            issued_at_ms: now_ms,
        };
        log::debug!(
            "dome: {} dir={} speed={} angle={} ms={}",
            kind.label(),
            direction,
            speed_percent,
            actual_deg,
            duration_ms
        );
        self.current = Some(command);
        context.push(SequencerAction::Start(command));
        true
    }

    /// Stops any move in flight and removes its unexecuted part from the offset.
    fn abort(&mut self, context: &mut DispatchContext, now_ms: u64) {
        if let Some(command) = self.current.take() {
            let remaining_ms = command.ends_at_ms().saturating_sub(now_ms);
            if command.duration_ms > 0 && remaining_ms > 0 {
                let unexecuted =
                    command.angle_deg * remaining_ms as f32 / command.duration_ms as f32;
                self.offset_deg -= f32::from(command.direction) * unexecuted;
            }
            context.push(SequencerAction::Stop { completed: false });
        }
        self.moves_since_center = 0;
        self.sequence_speed = None;
        self.phase = SequencerPhase::Suspended;
    }
}

#[state_machine(initial = "State::warmup()")]
impl SequencerHsm {
    #[state(superstate = "active")]
    fn warmup(
        &mut self,
        context: &mut DispatchContext,
        event: &SequencerEvent,
    ) -> Outcome<State> {
        let _ = context;
        match *event {
            SequencerEvent::Tick { now_ms, .. } => {
                if now_ms < self.resume_at_ms {
                    return Handled;
                }
                self.phase = SequencerPhase::Idle;
                self.next_move_at_ms = now_ms;
                Transition(State::idle())
            }
            _ => Super,
        }
    }

    #[state(superstate = "active")]
    fn idle(&mut self, context: &mut DispatchContext, event: &SequencerEvent) -> Outcome<State> {
        match *event {
            SequencerEvent::Tick {
                now_ms,
                draw: Some(draw),
            } => {
                if self.start_move(context, now_ms, draw) {
                    self.phase = SequencerPhase::Moving;
                    return Transition(State::moving());
                }
                Handled
            }
            SequencerEvent::Tick { draw: None, .. } => Handled,
            _ => Super,
        }
    }

    #[state(superstate = "active")]
    fn moving(
        &mut self,
        context: &mut DispatchContext,
        event: &SequencerEvent,
    ) -> Outcome<State> {
        match *event {
            SequencerEvent::Tick { now_ms, .. } => {
                let done = self
                    .current
                    .is_none_or(|command| now_ms >= command.ends_at_ms());
                if !done {
                    return Handled;
                }
                self.current = None;
                self.phase = SequencerPhase::Idle;
                context.push(SequencerAction::Stop { completed: true });
                Transition(State::idle())
            }
            _ => Super,
        }
    }

    #[state]
    fn suspended(
        &mut self,
        context: &mut DispatchContext,
        event: &SequencerEvent,
    ) -> Outcome<State> {
        let _ = context;
        match *event {
            SequencerEvent::Release { now_ms, delay_ms } => {
                self.phase = SequencerPhase::Idle;
                self.next_move_at_ms = now_ms + u64::from(delay_ms);
                log::debug!("dome: resume in {}ms", delay_ms);
                Transition(State::idle())
            }
            _ => Handled,
        }
    }

    #[superstate]
    fn active(&mut self, context: &mut DispatchContext, event: &SequencerEvent) -> Outcome<State> {
        match *event {
            SequencerEvent::Kill { now_ms } => {
                self.abort(context, now_ms);
                Transition(State::suspended())
            }
            _ => Handled,
        }
    }
}
