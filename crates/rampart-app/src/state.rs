//! State shared between the game loop thread and its owner.

use serde::Serialize;

use rampart_core::commands::PlayerCommand;
use rampart_core::enums::EndState;
use rampart_core::events::GameEvent;

/// Commands sent from the front end to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the encounter engine.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Totals over every encounter a loop ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    /// Encounters that reached an end state or aborted.
    pub encounters: u32,
    pub victories: u32,
    pub defeats: u32,
    pub faults: u32,
    pub enemies_spawned: u32,
    pub enemies_killed: u32,
    pub shots: u32,
    pub shots_blocked: u32,
}

impl RunSummary {
    /// Fold one tick's events into the totals.
    pub fn record(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::EnemySpawned { .. } => self.enemies_spawned += 1,
                GameEvent::EnemyDied { .. } => self.enemies_killed += 1,
                GameEvent::ShotFired { blocked, .. } => {
                    self.shots += 1;
                    if *blocked {
                        self.shots_blocked += 1;
                    }
                }
                GameEvent::EncounterEnded { outcome } => {
                    self.encounters += 1;
                    match outcome {
                        EndState::Victory => self.victories += 1,
                        EndState::Defeat => self.defeats += 1,
                        EndState::Running => {}
                    }
                }
                GameEvent::SchedulerFaulted { .. } => {
                    self.encounters += 1;
                    self.faults += 1;
                }
                _ => {}
            }
        }
    }
}
