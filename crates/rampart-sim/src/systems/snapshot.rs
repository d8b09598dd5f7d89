//! Snapshot system: reads the world and builds an `EncounterSnapshot`.
//!
//! This system is read-only; it never modifies the world.

use hecs::{Entity, World};

use rampart_core::components::{Enemy, Transform};
use rampart_core::enums::{EndState, GamePhase};
use rampart_core::events::GameEvent;
use rampart_core::state::{
    EncounterSnapshot, EncounterStatus, EnemyView, ObjectiveView, ShotView, WaveProgressView,
};
use rampart_core::types::SimTime;

use crate::lifecycle::Health;

/// Everything outside the world that goes into a snapshot.
pub struct SnapshotContext {
    pub time: SimTime,
    pub phase: GamePhase,
    pub end_state: EndState,
    pub status: EncounterStatus,
    pub waves: WaveProgressView,
    pub last_shot: Option<ShotView>,
    pub restart_available: bool,
    pub restart_hold_progress: f64,
    pub events: Vec<GameEvent>,
}

/// Build a complete snapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    objective: Option<Entity>,
    context: SnapshotContext,
) -> EncounterSnapshot {
    EncounterSnapshot {
        time: context.time,
        phase: context.phase,
        end_state: context.end_state,
        status: context.status,
        waves: context.waves,
        objective: objective
            .map(|entity| build_objective(world, entity))
            .unwrap_or_default(),
        enemies: build_enemies(world),
        last_shot: context.last_shot,
        restart_available: context.restart_available,
        restart_hold_progress: context.restart_hold_progress,
        events: context.events,
    }
}

fn build_objective(world: &World, entity: Entity) -> ObjectiveView {
    let position = world
        .get::<&Transform>(entity)
        .map(|t| t.position)
        .unwrap_or_default();
    match world.get::<&Health>(entity) {
        Ok(health) => ObjectiveView {
            position,
            hp: health.current(),
            max_hp: health.max(),
            dead: health.is_dead(),
        },
        Err(_) => ObjectiveView {
            position,
            ..Default::default()
        },
    }
}

/// Living enemies, ordered by entity id for stable output.
fn build_enemies(world: &World) -> Vec<EnemyView> {
    let mut enemies: Vec<(u64, EnemyView)> = world
        .query::<(&Enemy, &Transform, &Health)>()
        .iter()
        .filter(|(_, (_, _, health))| !health.is_dead())
        .map(|(entity, (enemy, transform, health))| {
            let id = entity.to_bits().get();
            (
                id,
                EnemyView {
                    entity_id: id,
                    variant: enemy.variant.clone(),
                    position: transform.position,
                    forward: transform.orientation * glam::DVec3::NEG_Z,
                    hp: health.current(),
                    max_hp: health.max(),
                },
            )
        })
        .collect();
    enemies.sort_by_key(|(id, _)| *id);
    enemies.into_iter().map(|(_, view)| view).collect()
}
