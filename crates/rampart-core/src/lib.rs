//! Core types and definitions for the RAMPART encounter simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry and time types, commands, configuration, presentation
//! snapshots, events, errors and constants.
//! It has no dependency on the ECS or any runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;
