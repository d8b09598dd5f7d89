//! Lifetime expiry: enemies with a finite lifetime die on their own.

use hecs::World;

use rampart_core::components::Lifetime;
use rampart_core::enums::{DeathCause, EntityKind};

use crate::lifecycle::{DeathRecord, Health};

/// Count down every `Lifetime` by `dt` and expire the ones that run out.
pub fn run(world: &mut World, dt: f64) -> Vec<DeathRecord> {
    let mut deaths = Vec::new();
    for (entity, (lifetime, health)) in world.query_mut::<(&mut Lifetime, &mut Health)>() {
        if health.is_dead() {
            continue;
        }
        lifetime.remaining_secs -= dt;
        if lifetime.remaining_secs > 0.0 {
            continue;
        }
        if let Some(notice) = health.force_death(DeathCause::LifetimeExpired, false) {
            deaths.push(DeathRecord {
                entity,
                kind: EntityKind::Enemy,
                notice,
            });
        }
    }
    deaths.sort_by_key(|d| d.entity.to_bits());
    deaths
}
