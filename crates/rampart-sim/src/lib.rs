//! Encounter simulation for RAMPART.
//!
//! Owns the hecs ECS world, runs the wave scheduler and per-tick systems at a
//! fixed tick rate, resolves weapon fire, and produces `EncounterSnapshot`s
//! for the presentation layer. Completely headless.

pub mod collision;
pub mod combat;
pub mod end_state;
pub mod engine;
pub mod lifecycle;
pub mod placement;
pub mod scenario;
pub mod systems;
pub mod wake;
pub mod world_setup;

pub use engine::{EncounterBuilder, EncounterEngine};
pub use rampart_core as core;

#[cfg(test)]
mod tests;
