//! Entity spawn factories for the encounter world.

use hecs::{Entity, EntityBuilder, World};

use rampart_core::components::{
    Collider, ColliderShape, CollisionLayer, Enemy, Lifetime, Objective, Transform,
};
use rampart_core::config::{EnemyVariant, ObjectiveConfig};
use rampart_core::types::SpawnPose;

use crate::lifecycle::Health;

/// Spawn the defended objective. Its box collider blocks the weapon beam.
pub fn spawn_objective(world: &mut World, config: &ObjectiveConfig, pose: SpawnPose) -> Entity {
    world.spawn((
        Objective,
        Transform {
            position: pose.position,
            orientation: pose.orientation,
        },
        Health::new(config.max_hp),
        Collider {
            shape: ColliderShape::Box {
                half_extents: config.half_extents,
            },
            layer: CollisionLayer::Blocking,
        },
    ))
}

/// Spawn one enemy of `variant` at `pose`.
pub fn spawn_enemy(world: &mut World, variant: &EnemyVariant, pose: SpawnPose, now: f64) -> Entity {
    let mut builder = EntityBuilder::new();
    builder.add(Enemy {
        variant: variant.name.clone(),
        move_speed: variant.move_speed,
        contact_damage: variant.contact_damage,
        spawned_at_secs: now,
    });
    builder.add(Transform {
        position: pose.position,
        orientation: pose.orientation,
    });
    builder.add(Health::new(variant.max_hp));
    builder.add(Collider {
        shape: ColliderShape::Sphere {
            radius: variant.radius,
        },
        layer: CollisionLayer::Damageable,
    });
    if variant.lifetime_secs > 0.0 {
        builder.add(Lifetime {
            remaining_secs: variant.lifetime_secs,
        });
    }
    world.spawn(builder.build())
}
