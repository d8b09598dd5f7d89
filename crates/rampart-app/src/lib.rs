//! RAMPART headless runner.
//!
//! Wires a scanned room and an encounter engine together, drives the engine
//! at 30Hz on its own thread, and lets an automatic gunner play it.

pub mod game_loop;
pub mod gunner;
pub mod setup;
pub mod state;

pub use rampart_core as core;
