//! Objective contact: enemies that reach the objective damage it and die.
//!
//! Contact is tested on the horizontal plane, sphere footprint against box
//! footprint, so enemies walking on the floor still reach an objective
//! standing on a table.

use glam::{DVec2, DVec3};
use hecs::{Entity, World};

use rampart_core::components::{Collider, ColliderShape, Enemy, Transform};
use rampart_core::enums::{DeathCause, EntityKind};
use rampart_core::events::GameEvent;

use crate::lifecycle::{DamageOutcome, Damageable, DeathRecord, Health};

/// Resolve contacts between living enemies and the objective.
///
/// Deaths are returned in the order they happened: each contacting enemy,
/// then the objective if that contact destroyed it. Contacts stop at the
/// objective's death; enemies still touching it are left for teardown.
pub fn run(
    world: &mut World,
    objective: Entity,
    events: &mut Vec<GameEvent>,
) -> Vec<DeathRecord> {
    let mut deaths = Vec::new();

    let Some((center, half_extents)) = objective_footprint(world, objective) else {
        return deaths;
    };

    let mut touching: Vec<(Entity, f64)> = Vec::new();
    {
        let mut query = world.query::<(&Enemy, &Transform, &Collider, &Health)>();
        for (entity, (enemy, transform, collider, health)) in query.iter() {
            if health.is_dead() {
                continue;
            }
            let radius = match collider.shape {
                ColliderShape::Sphere { radius } => radius,
                ColliderShape::Box { half_extents } => half_extents.x.max(half_extents.z),
            };
            let position = DVec2::new(transform.position.x, transform.position.z);
            let closest = position.clamp(center - half_extents, center + half_extents);
            if closest.distance(position) <= radius {
                touching.push((entity, enemy.contact_damage));
            }
        }
    }
    touching.sort_by_key(|(entity, _)| entity.to_bits());

    for (entity, damage) in touching {
        if let Ok(mut health) = world.get::<&mut Health>(entity) {
            if let Some(notice) = health.force_death(DeathCause::ContactWithObjective, false) {
                deaths.push(DeathRecord {
                    entity,
                    kind: EntityKind::Enemy,
                    notice,
                });
            }
        }

        let Ok(mut health) = world.get::<&mut Health>(objective) else {
            continue;
        };
        match health.apply_damage(damage) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Damaged { remaining } => {
                events.push(GameEvent::ObjectiveDamaged {
                    amount: damage,
                    remaining_hp: remaining,
                });
            }
            DamageOutcome::Killed(notice) => {
                events.push(GameEvent::ObjectiveDamaged {
                    amount: damage,
                    remaining_hp: 0.0,
                });
                deaths.push(DeathRecord {
                    entity: objective,
                    kind: EntityKind::Objective,
                    notice,
                });
                break;
            }
        }
    }

    deaths
}

fn objective_footprint(world: &World, objective: Entity) -> Option<(DVec2, DVec2)> {
    let transform = world.get::<&Transform>(objective).ok()?;
    let collider = world.get::<&Collider>(objective).ok()?;
    let half: DVec3 = match collider.shape {
        ColliderShape::Box { half_extents } => half_extents,
        ColliderShape::Sphere { radius } => DVec3::splat(radius),
    };
    Some((
        DVec2::new(transform.position.x, transform.position.z),
        DVec2::new(half.x, half.z),
    ))
}
