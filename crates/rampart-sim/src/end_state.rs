//! End-of-encounter gate and restart input handling.
//!
//! `EndStateController` owns the encounter's `EndState`. Its transition is
//! one-shot: the first trigger decides the outcome and every later trigger is
//! a no-op, so callers can do their end-of-encounter work exactly when
//! `trigger` returns `Some`.
//!
//! Restart input is measured on unscaled time so slow motion or a frozen time
//! scale cannot stall or speed up the gate.

use rampart_core::config::RestartConfig;
use rampart_core::enums::EndState;

/// Why the encounter is ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndTrigger {
    ObjectiveDestroyed,
    AllWavesCleared,
}

impl EndTrigger {
    pub fn outcome(self) -> EndState {
        match self {
            EndTrigger::ObjectiveDestroyed => EndState::Defeat,
            EndTrigger::AllWavesCleared => EndState::Victory,
        }
    }
}

/// Grace period, debounce window and optional hold-to-confirm for restart input.
#[derive(Debug, Clone)]
pub struct RestartGate {
    config: RestartConfig,
    armed_at: Option<f64>,
    last_accepted: Option<f64>,
    held_secs: f64,
}

impl RestartGate {
    pub fn new(config: RestartConfig) -> Self {
        Self {
            config,
            armed_at: None,
            last_accepted: None,
            held_secs: 0.0,
        }
    }

    /// Start accepting input (after the grace period) from `now`.
    pub fn arm(&mut self, now: f64) {
        if self.armed_at.is_none() {
            self.armed_at = Some(now);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Whether input at `now` is past the grace period and debounce window.
    pub fn is_open(&self, now: f64) -> bool {
        let Some(armed_at) = self.armed_at else {
            return false;
        };
        if now - armed_at < self.config.grace_secs {
            return false;
        }
        self.last_accepted
            .is_none_or(|last| now - last >= self.config.debounce_secs)
    }

    /// An edge-triggered press. Ignored when hold-to-confirm is required.
    pub fn press(&mut self, now: f64) -> bool {
        if self.config.hold_to_confirm || !self.is_open(now) {
            return false;
        }
        self.last_accepted = Some(now);
        true
    }

    /// Accumulate hold time while `held`; releasing resets the accumulator.
    /// Accepts once the hold reaches the configured duration.
    pub fn hold(&mut self, held: bool, dt_unscaled: f64, now: f64) -> bool {
        if !self.config.hold_to_confirm {
            return false;
        }
        if !held {
            self.held_secs = 0.0;
            return false;
        }
        if !self.is_open(now) {
            return false;
        }
        self.held_secs += dt_unscaled;
        if self.held_secs < self.config.hold_secs {
            return false;
        }
        self.held_secs = 0.0;
        self.last_accepted = Some(now);
        true
    }

    /// Fraction of the required hold completed, for progress display.
    pub fn hold_progress(&self) -> f64 {
        if self.config.hold_secs <= 0.0 {
            return 0.0;
        }
        (self.held_secs / self.config.hold_secs).clamp(0.0, 1.0)
    }
}

/// Owns the encounter outcome and the restart latch.
#[derive(Debug, Clone)]
pub struct EndStateController {
    state: EndState,
    gate: RestartGate,
    restart_triggered: bool,
}

impl EndStateController {
    pub fn new(config: RestartConfig) -> Self {
        Self {
            state: EndState::Running,
            gate: RestartGate::new(config),
            restart_triggered: false,
        }
    }

    pub fn state(&self) -> EndState {
        self.state
    }

    /// Enter the terminal state for `trigger`. Returns the outcome only for the
    /// first trigger; every later call returns `None`.
    pub fn trigger(&mut self, trigger: EndTrigger, now_unscaled: f64) -> Option<EndState> {
        if self.state.is_terminal() {
            return None;
        }
        self.state = trigger.outcome();
        self.gate.arm(now_unscaled);
        Some(self.state)
    }

    /// Allow restarting an encounter that was aborted without an outcome.
    pub fn abort(&mut self, now_unscaled: f64) {
        self.gate.arm(now_unscaled);
    }

    pub fn restart_available(&self, now_unscaled: f64) -> bool {
        !self.restart_triggered && self.gate.is_open(now_unscaled)
    }

    pub fn hold_progress(&self) -> f64 {
        self.gate.hold_progress()
    }

    /// Feed a restart press. Returns `true` exactly once per encounter.
    pub fn restart_press(&mut self, now_unscaled: f64) -> bool {
        if self.restart_triggered || !self.gate.press(now_unscaled) {
            return false;
        }
        self.restart_triggered = true;
        true
    }

    /// Feed the held state of the restart button for one tick.
    pub fn restart_hold(&mut self, held: bool, dt_unscaled: f64, now_unscaled: f64) -> bool {
        if self.restart_triggered || !self.gate.hold(held, dt_unscaled, now_unscaled) {
            return false;
        }
        self.restart_triggered = true;
        true
    }
}
