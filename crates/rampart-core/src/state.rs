//! Encounter snapshot: the read-only state exposed to the presentation layer
//! after every tick.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::{EndState, GamePhase, WavePhase};
use crate::events::GameEvent;
use crate::types::SimTime;

/// Complete visible state produced after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncounterSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub end_state: EndState,
    pub status: EncounterStatus,
    pub waves: WaveProgressView,
    pub objective: ObjectiveView,
    pub enemies: Vec<EnemyView>,
    pub last_shot: Option<ShotView>,
    /// Whether a restart input would currently be considered.
    pub restart_available: bool,
    /// Fraction of a hold-to-confirm restart completed, 0.0 to 1.0.
    pub restart_hold_progress: f64,
    pub events: Vec<GameEvent>,
}

/// Status line for UI binding. The core never formats text itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EncounterStatus {
    #[default]
    Preparing,
    WaveInProgress,
    WaveCleared,
    Victory,
    Stopped { reason: String },
    Faulted { message: String },
}

/// Wave progress counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveProgressView {
    pub phase: WavePhase,
    /// 1-based index of the current wave (0 before the first wave).
    pub current_wave: u32,
    pub total_waves: u32,
    /// Waves after the current one.
    pub remaining_waves: u32,
    pub alive: u32,
    pub spawned: u32,
    pub target: u32,
}

/// Defended objective status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveView {
    pub position: DVec3,
    pub hp: f64,
    pub max_hp: f64,
    pub dead: bool,
}

/// A live enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub entity_id: u64,
    pub variant: String,
    pub position: DVec3,
    pub forward: DVec3,
    pub hp: f64,
    pub max_hp: f64,
}

/// Beam endpoints of the most recent shot, for line/impact rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotView {
    pub start: DVec3,
    pub end: DVec3,
    pub blocked: bool,
    pub hits: u32,
    pub tick: u64,
}
