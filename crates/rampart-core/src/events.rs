//! Events emitted by the simulation for audio, VFX and UI feedback.
//!
//! The core never renders anything; it only reports what happened.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::{DeathCause, EndState};

/// Everything observable that happened during one tick, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A wave began (1-based index).
    WaveStarted {
        wave: u32,
        total_waves: u32,
        target: u32,
    },
    /// An enemy entered the world.
    EnemySpawned {
        entity_id: u64,
        variant: String,
        position: DVec3,
    },
    /// An enemy died. Emitted exactly once per enemy.
    EnemyDied { entity_id: u64, cause: DeathCause },
    /// The objective lost health.
    ObjectiveDamaged { amount: f64, remaining_hp: f64 },
    /// The objective's health reached zero.
    ObjectiveDestroyed,
    /// The weapon fired.
    ShotFired {
        start: DVec3,
        end: DVec3,
        blocked: bool,
        hits: u32,
    },
    /// Every enemy of the wave has died.
    WaveCleared { wave: u32, total_waves: u32 },
    /// The encounter reached its terminal state.
    EncounterEnded { outcome: EndState },
    /// The wave scheduler aborted.
    SchedulerFaulted { message: String },
    /// The restart gate accepted an input; the encounter will reload.
    RestartRequested,
}
