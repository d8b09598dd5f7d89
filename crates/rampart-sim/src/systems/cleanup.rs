//! Cleanup system: despawns enemies whose death has already been dispatched.

use hecs::{Entity, World};

use rampart_core::components::Enemy;

use crate::lifecycle::Health;

/// Remove dead enemies from the world. The objective stays so its final state
/// remains visible. Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, (_enemy, health)) in world.query_mut::<(&Enemy, &Health)>() {
        if health.is_dead() {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
