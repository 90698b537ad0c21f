use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::{
    config::{active_config, DroidConfig},
    gesture::Sticks,
    pulse::ControlFrame,
    types::Mode,
};

use super::{
    detect::{ComboDetectors, Detection},
    trace::ArbiterTrace,
    types::{ActionBuffer, ArbiterAction, ComboId, RejectReason},
};

#[derive(Clone, Copy, Debug)]
enum ArbiterEvent {
    Pass {
        now_ms: u64,
        detected: Option<ComboId>,
    },
}

#[derive(Default)]
struct DispatchContext {
    actions: ActionBuffer,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ArbiterOutput {
    pub actions: ActionBuffer,
    pub detection: Option<Detection>,
    pub trace: ArbiterTrace,
}

/// Combo detection plus the mode/combo state machine.
pub struct ComboArbiter {
    config: &'static DroidConfig,
    detectors: ComboDetectors,
    machine: statig::blocking::StateMachine<ArbiterHsm>,
}

impl Default for ComboArbiter {
    fn default() -> Self {
        Self::new(active_config())
    }
}

impl ComboArbiter {
    pub fn new(config: &'static DroidConfig) -> Self {
        Self {
            config,
            detectors: ComboDetectors::new(),
            machine: ArbiterHsm::new(config).state_machine(),
        }
    }

    pub fn tick(&mut self, frame: &ControlFrame, sticks: &Sticks) -> ArbiterOutput {
        let detection = self.detectors.scan(frame, sticks, &self.config.input);
        let event = ArbiterEvent::Pass {
            now_ms: frame.now_ms,
            detected: detection.map(|detection| detection.id),
        };
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        ArbiterOutput {
            actions: context.actions,
            detection,
            trace: self.machine.inner().last_trace,
        }
    }

    pub fn mode(&self) -> Mode {
        match self.machine.state() {
            State::Manual {} => Mode::Manual,
            State::Automated {} => Mode::Automated,
            State::Hybrid {} => Mode::Hybrid,
            State::Carpet {} => Mode::Carpet,
        }
    }

    pub fn current_combo(&self) -> ComboId {
        self.machine.inner().combo
    }
}

struct ArbiterHsm {
    config: &'static DroidConfig,
    combo: ComboId,
    combo_at_ms: u64,
    last_trace: ArbiterTrace,
}

impl ArbiterHsm {
    fn new(config: &'static DroidConfig) -> Self {
        Self {
            config,
            combo: ComboId::IDLE,
            combo_at_ms: 0,
            last_trace: ArbiterTrace::default(),
        }
    }

    fn state_for(mode: Mode) -> State {
        match mode {
            Mode::Manual => State::manual(),
            Mode::Automated => State::automated(),
            Mode::Hybrid => State::hybrid(),
            Mode::Carpet => State::carpet(),
        }
    }

    /// One detection pass while `mode` is active. Mode selectors are handled here; action
    /// combos are checked against `mode`'s whitelist, then expiry runs in the superstate.
    fn pass(
        &mut self,
        context: &mut DispatchContext,
        event: &ArbiterEvent,
        mode: Mode,
    ) -> Outcome<State> {
        let ArbiterEvent::Pass { now_ms, detected } = *event;
        self.last_trace = ArbiterTrace {
            now_ms,
            mode,
            combo: self.combo,
            detected: detected.unwrap_or(ComboId::IDLE),
            reject_reason: RejectReason::None,
        };
        let Some(id) = detected else {
            return Super;
        };
        if let Some(target) = id.mode() {
            return self.select_mode(context, mode, target);
        }
        if id.is_action() {
            self.consider_action(context, mode, id, now_ms);
        }
        Super
    }

    fn consider_action(
        &mut self,
        context: &mut DispatchContext,
        mode: Mode,
        id: ComboId,
        now_ms: u64,
    ) {
        if id == self.combo {
            self.last_trace.reject_reason = RejectReason::Repeated;
            return;
        }

        let ceiling = self.config.modes.profile(mode).max_action_combo;
        if id.as_u8() > ceiling {
            self.combo = ComboId::IDLE;
            self.last_trace.reject_reason = RejectReason::NotWhitelisted;
            context.actions.push(ArbiterAction::ComboRejected {
                id,
                reason: RejectReason::NotWhitelisted,
            });
            log::debug!("combo: rejected id={} mode={}", id.as_u8(), mode.label());
            return;
        }

        self.combo = id;
        self.combo_at_ms = now_ms;
        context.actions.push(ArbiterAction::ComboAccepted {
            id,
            action: self.config.combo_action(id.as_u8()),
        });
        log::debug!("combo: accepted id={} mode={}", id.as_u8(), mode.label());
    }

    fn select_mode(
        &mut self,
        context: &mut DispatchContext,
        from: Mode,
        to: Mode,
    ) -> Outcome<State> {
        self.combo = ComboId::IDLE;
        self.last_trace.combo = self.combo;
        if to == from {
            return Handled;
        }
        self.last_trace.mode = to;
        context.actions.push(ArbiterAction::ModeChanged { from, to });
        log::debug!("mode: {} -> {}", from.label(), to.label());
        Transition(Self::state_for(to))
    }

    fn expire(&mut self, context: &mut DispatchContext, now_ms: u64) {
        if self.combo.is_action()
            && now_ms.saturating_sub(self.combo_at_ms) >= self.config.combo.reset_delay_ms
        {
            context
                .actions
                .push(ArbiterAction::ComboExpired { id: self.combo });
            self.combo = ComboId::IDLE;
        }
        self.last_trace.combo = self.combo;
    }
}

#[state_machine(initial = "State::manual()")]
impl ArbiterHsm {
    #[state(superstate = "operating")]
    fn manual(&mut self, context: &mut DispatchContext, event: &ArbiterEvent) -> Outcome<State> {
        self.pass(context, event, Mode::Manual)
    }

    #[state(superstate = "operating")]
    fn automated(
        &mut self,
        context: &mut DispatchContext,
        event: &ArbiterEvent,
    ) -> Outcome<State> {
        self.pass(context, event, Mode::Automated)
    }

    #[state(superstate = "operating")]
    fn hybrid(&mut self, context: &mut DispatchContext, event: &ArbiterEvent) -> Outcome<State> {
        self.pass(context, event, Mode::Hybrid)
    }

    #[state(superstate = "operating")]
    fn carpet(&mut self, context: &mut DispatchContext, event: &ArbiterEvent) -> Outcome<State> {
        self.pass(context, event, Mode::Carpet)
    }

    #[superstate]
    fn operating(
        &mut self,
        context: &mut DispatchContext,
        event: &ArbiterEvent,
    ) -> Outcome<State> {
        let ArbiterEvent::Pass { now_ms, .. } = *event;
        self.expire(context, now_ms);
        Handled
    }
}
