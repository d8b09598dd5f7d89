//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components. The health lifecycle is the
//! exception and lives in the simulation crate.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// World transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: DVec3,
    pub orientation: DQuat,
}

/// Marks the defended objective.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Objective;

/// Enemy behavior parameters, copied from its variant at spawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub variant: String,
    pub move_speed: f64,
    pub contact_damage: f64,
    /// Simulation time at which the enemy was spawned.
    pub spawned_at_secs: f64,
}

/// Remaining seconds until the entity expires on its own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lifetime {
    pub remaining_secs: f64,
}

/// Which queries a collider answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionLayer {
    /// Stops the weapon beam (the objective, obstacles).
    Blocking,
    /// Can be damaged by the weapon (enemies).
    Damageable,
}

/// Collider geometry, centered on the entity's transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Sphere { radius: f64 },
    /// Axis-aligned box.
    Box { half_extents: DVec3 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: ColliderShape,
    pub layer: CollisionLayer,
}
