//! ECS systems that operate on the encounter world each tick.
//!
//! Systems are pure functions over `&mut World`. They never dispatch deaths
//! themselves: any death they cause is returned as a `DeathRecord` for the
//! engine to route.

pub mod cleanup;
pub mod contact;
pub mod lifetime;
pub mod movement;
pub mod snapshot;
pub mod wave_scheduler;
