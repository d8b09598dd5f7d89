//! Automatic gunner: a stand-in player that shoots the nearest enemy and
//! restarts finished encounters.

use glam::DVec3;

use rampart_core::commands::PlayerCommand;
use rampart_core::enums::GamePhase;
use rampart_core::state::EncounterSnapshot;

/// Scripted player standing at a fixed point in the room.
#[derive(Debug, Clone)]
pub struct AutoGunner {
    /// Muzzle position.
    pub position: DVec3,
    /// Ticks between trigger pulls (1 = every tick).
    pub fire_every: u32,
    /// Restarts still allowed.
    pub restarts: u32,
    ticks_since_shot: u32,
}

impl AutoGunner {
    pub fn new(position: DVec3, fire_every: u32, restarts: u32) -> Self {
        Self {
            position,
            fire_every: fire_every.max(1),
            restarts,
            ticks_since_shot: 0,
        }
    }

    /// Decide this tick's input from the latest snapshot.
    pub fn commands(&mut self, snapshot: &EncounterSnapshot) -> Vec<PlayerCommand> {
        match snapshot.phase {
            GamePhase::Briefing => vec![PlayerCommand::StartEncounter],
            GamePhase::Active => {
                self.ticks_since_shot += 1;
                if self.ticks_since_shot < self.fire_every {
                    return Vec::new();
                }
                match self.nearest_enemy(snapshot) {
                    Some(target) => {
                        self.ticks_since_shot = 0;
                        vec![PlayerCommand::Fire {
                            origin: self.position,
                            direction: target - self.position,
                        }]
                    }
                    None => Vec::new(),
                }
            }
            GamePhase::Ended if snapshot.restart_available && self.restarts > 0 => {
                self.restarts -= 1;
                vec![PlayerCommand::RestartPressed]
            }
            GamePhase::Ended | GamePhase::Paused => Vec::new(),
        }
    }

    fn nearest_enemy(&self, snapshot: &EncounterSnapshot) -> Option<DVec3> {
        snapshot
            .enemies
            .iter()
            .map(|e| e.position)
            .min_by(|a, b| {
                a.distance_squared(self.position)
                    .total_cmp(&b.distance_squared(self.position))
            })
    }
}
