//! Player commands sent from the input layer to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Encounter control ---
    /// Start the encounter (leave the briefing phase).
    StartEncounter,
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
    /// Set time scale (1.0 = normal, 0.0 = frozen). Clamped to [0, 4].
    SetTimeScale { scale: f64 },

    // --- Weapon ---
    /// Pull the trigger with the muzzle at `origin` pointing along `direction`.
    Fire { origin: DVec3, direction: DVec3 },

    // --- Restart ---
    /// Edge-triggered restart press.
    RestartPressed,
    /// Level-triggered restart button state; persists until changed.
    RestartHeld { held: bool },
}
