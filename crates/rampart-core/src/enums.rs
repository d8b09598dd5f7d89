//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Semantic label a room scan attaches to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceLabel {
    Floor,
    Ceiling,
    WallFace,
    Table,
    Couch,
    Other,
}

impl SurfaceLabel {
    pub const ALL: &'static [SurfaceLabel] = &[
        SurfaceLabel::Floor,
        SurfaceLabel::Ceiling,
        SurfaceLabel::WallFace,
        SurfaceLabel::Table,
        SurfaceLabel::Couch,
        SurfaceLabel::Other,
    ];

    pub fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Which way a sampled surface must face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceOrientation {
    /// Horizontal, normal pointing up (floors, table tops).
    #[default]
    FacingUp,
    /// Vertical, normal pointing into the room (walls).
    Vertical,
    /// Horizontal, normal pointing down (ceilings).
    FacingDown,
}

/// Terminal outcome of an encounter.
///
/// Transitions are one-shot: `Running` moves to exactly one of the other two
/// and never changes again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndState {
    #[default]
    Running,
    Victory,
    Defeat,
}

impl EndState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, EndState::Running)
    }
}

/// Wave scheduler state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Built but not yet started.
    #[default]
    Preparing,
    /// Waiting out the wave's pre-delay.
    PreDelay,
    /// Issuing spawns for the current wave.
    Spawning,
    /// All spawns issued, waiting for the wave to be cleared.
    Draining,
    /// Waiting out the wave's post-delay.
    PostDelay,
    /// Every wave cleared.
    Victory,
    /// Halted externally (objective destroyed).
    Stopped,
    /// Halted by a liveness or configuration fault.
    Faulted,
}

impl WavePhase {
    /// Whether the scheduler will never progress again.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            WavePhase::Victory | WavePhase::Stopped | WavePhase::Faulted
        )
    }
}

/// Kind of entity carrying a health lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Objective,
    Enemy,
}

/// Why an entity died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Health reached zero through damage.
    Damage,
    /// An enemy reached the objective and expended itself.
    ContactWithObjective,
    /// Lifetime ran out.
    LifetimeExpired,
    /// Removed by a cleanup sweep.
    Cleanup,
}

/// Top-level encounter phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Built, waiting for the start command.
    #[default]
    Briefing,
    Active,
    Paused,
    /// End state reached; only restart input is processed.
    Ended,
}
