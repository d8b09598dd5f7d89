//! Enemy movement: walk horizontally toward the objective.

use glam::DVec3;
use hecs::World;

use rampart_core::components::{Enemy, Transform};
use rampart_core::constants::ENEMY_STOP_DISTANCE;
use rampart_core::types::yaw_facing;

use crate::lifecycle::Health;

/// Move every living enemy toward `target` by `speed * dt`, keeping its height.
/// Enemies within `ENEMY_STOP_DISTANCE` stay put.
pub fn run(world: &mut World, target: DVec3, dt: f64) {
    for (_entity, (enemy, transform, health)) in
        world.query_mut::<(&Enemy, &mut Transform, &Health)>()
    {
        if health.is_dead() {
            continue;
        }
        let to_target = DVec3::new(
            target.x - transform.position.x,
            0.0,
            target.z - transform.position.z,
        );
        let distance = to_target.length();
        if distance <= ENEMY_STOP_DISTANCE {
            continue;
        }
        let direction = to_target / distance;
        let step = (enemy.move_speed * dt).min(distance - ENEMY_STOP_DISTANCE);
        transform.position += direction * step;
        transform.orientation = yaw_facing(direction);
    }
}
