//! One fixed-rate control iteration: sample, arbitrate, gate, shape, actuate.
//!
//! The loop owns every subsystem's state and talks to hardware only through the gateway
//! traits, so a step is a function of (state, frame) to (state, effects).

pub mod diag;

use crate::{
    combo::{audio_kill_active, kill_switch_active, ArbiterAction, ComboArbiter, RejectReason},
    config::{AudioEffect, DroidConfig},
    drive::{DriveOutput, DriveShaper},
    entropy::Entropy,
    gateway::{ActuatorGateway, AudioGateway, ScriptGateway},
    gesture::Sticks,
    pulse::ControlFrame,
    sequencer::{DomeSequencer, SequencerAction},
    snapshot::{publish_droid_snapshot, DroidSnapshot},
    soundboard::{AmbientSound, SoundTrigger, Soundboard},
    telemetry,
    types::{Mode, MotorAxis},
};

pub use diag::{DiagBuffer, DiagEvent, DIAG_CAPACITY};

/// Subsystems owned by the active mode; rebuilt on every mode entry.
struct ModeRuntime {
    shaper: Option<DriveShaper>,
    sequencer: Option<DomeSequencer>,
    ambient: Option<AmbientSound>,
}

impl ModeRuntime {
    fn enter(config: &DroidConfig, mode: Mode, now_ms: u64) -> Self {
        let profile = config.modes.profile(mode);
        Self {
            shaper: profile.drive.map(DriveShaper::new),
            sequencer: profile.dome.map(|automation| {
                DomeSequencer::new(automation, config.dome_timing, profile.entry_delay_ms, now_ms)
            }),
            ambient: profile
                .ambient
                .map(|ambient| AmbientSound::new(ambient, profile.entry_delay_ms, now_ms)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StepReport {
    /// Speeds decided this step, indexed by `MotorAxis::index`.
    pub outputs: [i8; 3],
    pub snapshot: DroidSnapshot,
    pub diag: DiagBuffer,
}

impl StepReport {
    pub fn output(&self, axis: MotorAxis) -> i8 {
        self.outputs[axis.index()]
    }
}

pub struct ControlLoop {
    config: &'static DroidConfig,
    arbiter: ComboArbiter,
    runtime: ModeRuntime,
    soundboard: Soundboard,
    killed: bool,
    written: [Option<i8>; 3],
    last_refresh_ms: u64,
}

impl ControlLoop {
    pub fn new(config: &'static DroidConfig, now_ms: u64) -> Self {
        let arbiter = ComboArbiter::new(config);
        let runtime = ModeRuntime::enter(config, arbiter.mode(), now_ms);
        Self {
            config,
            arbiter,
            runtime,
            soundboard: Soundboard::new(),
            killed: false,
            written: [None; 3],
            last_refresh_ms: now_ms,
        }
    }

    pub fn mode(&self) -> Mode {
        self.arbiter.mode()
    }

    pub fn killed(&self) -> bool {
        self.killed
    }

    pub fn step(
        &mut self,
        frame: &ControlFrame,
        actuator: &mut impl ActuatorGateway,
        audio: &mut impl AudioGateway,
        scripts: &mut impl ScriptGateway,
        entropy: &mut impl Entropy,
    ) -> StepReport {
        let now_ms = frame.now_ms;
        let mut diag = DiagBuffer::default();
        let sticks = Sticks::classify(frame, &self.config.input);

        self.arbitrate(frame, &sticks, audio, scripts, &mut diag);

        let mode = self.arbiter.mode();
        let killed = kill_switch_active(mode, &sticks, self.config);
        if killed != self.killed {
            if killed {
                telemetry::record_kill_activation();
                diag.push(DiagEvent::KillEngaged { mode });
            } else {
                diag.push(DiagEvent::KillReleased { mode });
            }
            self.killed = killed;
        }

        let shaped = self
            .runtime
            .shaper
            .as_mut()
            .map(|shaper| shaper.shape(frame, &self.config.input))
            .unwrap_or_default();

        let dome = match self.runtime.sequencer.as_mut() {
            Some(sequencer) => {
                let output = sequencer.tick(now_ms, killed, entropy);
                for action in output.actions.iter() {
                    record_sequencer_action(action, &mut diag);
                }
                sequencer.dome_speed()
            }
            None => shaped.dome.unwrap_or(0),
        };

        let outputs = if killed {
            if let Some(shaper) = self.runtime.shaper.as_mut() {
                shaper.reset();
            }
            [0; 3]
        } else {
            let DriveOutput { drive, turn, .. } = shaped;
            [drive, turn, dome]
        };
        self.write_outputs(now_ms, outputs, actuator);

        let muted = audio_kill_active(mode, &sticks, self.config);
        self.play_sounds(frame, muted, audio, entropy, &mut diag);

        let snapshot = DroidSnapshot {
            mode,
            combo: self.arbiter.current_combo(),
            killed,
            audio_suppressed: audio.is_suppressed(),
            dome_phase: self.runtime.sequencer.as_ref().map(DomeSequencer::phase),
        };
        publish_droid_snapshot(snapshot);

        StepReport {
            outputs,
            snapshot,
            diag,
        }
    }

    fn arbitrate(
        &mut self,
        frame: &ControlFrame,
        sticks: &Sticks,
        audio: &mut impl AudioGateway,
        scripts: &mut impl ScriptGateway,
        diag: &mut DiagBuffer,
    ) {
        let output = self.arbiter.tick(frame, sticks);
        if output.trace.reject_reason == RejectReason::Repeated {
            telemetry::record_combo_rejected(RejectReason::Repeated);
        }

        for action in output.actions.iter() {
            match *action {
                ArbiterAction::ModeChanged { from, to } => {
                    telemetry::record_mode_switch();
                    diag.push(DiagEvent::ModeChanged { from, to });
                    self.runtime = ModeRuntime::enter(self.config, to, frame.now_ms);
                }
                ArbiterAction::ComboAccepted { id, action } => {
                    telemetry::record_combo_accepted();
                    diag.push(DiagEvent::ComboAccepted {
                        id,
                        mode: self.arbiter.mode(),
                        label: action.map(|action| action.label),
                    });
                    let Some(action) = action else {
                        continue;
                    };
                    if let Some(script) = action.script {
                        scripts.send_script(script);
                    }
                    let suppress = match action.audio {
                        AudioEffect::Suppress => Some(true),
                        AudioEffect::Enable => Some(false),
                        AudioEffect::None => None,
                    };
                    if let Some(suppress) = suppress {
                        if suppress != audio.is_suppressed() {
                            audio.set_suppressed(suppress);
                            diag.push(DiagEvent::AudioSuppressed(suppress));
                        }
                    }
                }
                ArbiterAction::ComboRejected { id, reason } => {
                    telemetry::record_combo_rejected(reason);
                    diag.push(DiagEvent::ComboRejected {
                        id,
                        mode: self.arbiter.mode(),
                        reason,
                    });
                }
                ArbiterAction::ComboExpired { id } => {
                    telemetry::record_combo_expired();
                    diag.push(DiagEvent::ComboExpired { id });
                }
            }
        }
    }

    /// Writes axes that changed, and every axis once per refresh interval.
    fn write_outputs(&mut self, now_ms: u64, outputs: [i8; 3], actuator: &mut impl ActuatorGateway) {
        let refresh = now_ms.saturating_sub(self.last_refresh_ms)
            >= self.config.hardware.actuator_refresh_ms;
        if refresh {
            self.last_refresh_ms = now_ms;
        }
        for axis in MotorAxis::ALL {
            let value = outputs[axis.index()];
            let slot = &mut self.written[axis.index()];
            if refresh || *slot != Some(value) {
                actuator.set_speed(axis, value);
                *slot = Some(value);
            }
        }
    }

    fn play_sounds(
        &mut self,
        frame: &ControlFrame,
        muted: bool,
        audio: &mut impl AudioGateway,
        entropy: &mut impl Entropy,
        diag: &mut DiagBuffer,
    ) {
        let config = self.config;
        let blocked = muted || audio.is_suppressed();

        if blocked {
            self.soundboard.reset();
        } else {
            let triggers =
                self.soundboard
                    .update(frame, &config.input, &config.sound_banks, entropy);
            for trigger in triggers {
                play(trigger, audio, diag);
            }
        }

        if let Some(ambient) = self.runtime.ambient.as_mut() {
            if let Some(trigger) = ambient.tick(frame.now_ms, blocked, &config.sound_banks, entropy)
            {
                play(trigger, audio, diag);
            }
        }
    }
}

fn play(trigger: SoundTrigger, audio: &mut impl AudioGateway, diag: &mut DiagBuffer) {
    audio.trigger(trigger.track);
    telemetry::record_sound_triggered();
    diag.push(DiagEvent::SoundPlayed {
        bank: trigger.bank,
        track: trigger.track,
    });
}

fn record_sequencer_action(action: &SequencerAction, diag: &mut DiagBuffer) {
    match *action {
        SequencerAction::SequenceStarted { speed_percent } => {
            diag.push(DiagEvent::DomeSequence { speed_percent });
        }
        SequencerAction::Start(command) => {
            telemetry::record_dome_move(command.kind);
            diag.push(DiagEvent::DomeMove {
                kind: command.kind,
                direction: command.direction,
                speed_percent: command.speed_percent,
                angle_deg: command.angle_deg,
                duration_ms: command.duration_ms,
            });
        }
        SequencerAction::Stop { completed } => {
            if !completed {
                telemetry::record_dome_abort();
            }
            diag.push(DiagEvent::DomeStopped { completed });
        }
    }
}
