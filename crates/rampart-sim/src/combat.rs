//! Hitscan weapon resolution.
//!
//! A shot is a sphere sweep that starts slightly behind the muzzle, plus a
//! point-blank overlap test at the muzzle itself so targets touching the
//! barrel are not missed. Blocking geometry (the objective, obstacles) stops
//! the beam: only targets strictly nearer than the first blocker are hit.
//!
//! `plan_shot` is pure and works against any `SpatialQuery`; `fire` plans
//! against the live world and applies damage.

use glam::DVec3;
use hecs::{Entity, World};

use rampart_core::components::CollisionLayer;
use rampart_core::config::WeaponConfig;
use rampart_core::constants::{WEAPON_MIN_QUERY_RADIUS, WEAPON_MUZZLE_CHECK_RADIUS};

use crate::collision::{ColliderSet, SpatialQuery};
use crate::lifecycle::{DamageOutcome, Damageable, DeathNotice, Health};

/// One trigger pull.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub origin: DVec3,
    /// Unit direction.
    pub direction: DVec3,
    pub max_range: f64,
    pub beam_radius: f64,
    pub origin_backoff: f64,
    pub near_field_radius: f64,
    pub piercing: bool,
    pub damage: f64,
}

impl Shot {
    /// `None` if `direction` has no length.
    pub fn new(origin: DVec3, direction: DVec3, weapon: &WeaponConfig) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self {
            origin,
            direction,
            max_range: weapon.max_range,
            beam_radius: weapon.beam_radius.max(WEAPON_MIN_QUERY_RADIUS),
            origin_backoff: weapon.origin_backoff.max(0.0),
            near_field_radius: weapon.near_field_radius.max(WEAPON_MIN_QUERY_RADIUS),
            piercing: weapon.piercing,
            damage: weapon.damage,
        })
    }

    /// Where the sweep starts.
    pub fn cast_origin(&self) -> DVec3 {
        self.origin - self.direction * self.origin_backoff
    }

    /// Sweep length from `cast_origin`.
    pub fn cast_distance(&self) -> f64 {
        self.max_range + self.origin_backoff
    }
}

/// A damageable entity the beam reaches, ordered by `distance` from the cast origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub entity: Entity,
    pub distance: f64,
    pub point: DVec3,
}

/// Everything a shot will do, computed before any damage is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotPlan {
    /// Targets to damage, nearest first, each at most once.
    pub targets: Vec<Target>,
    /// Whether blocking geometry lies within range.
    pub blocked: bool,
    /// Distance to the first blocker from the cast origin; infinite when unblocked.
    pub block_distance: f64,
    /// End of the visible beam.
    pub impact_point: DVec3,
}

/// Compute the targets and beam endpoint of `shot`.
pub fn plan_shot<Q: SpatialQuery + ?Sized>(query: &Q, shot: &Shot) -> ShotPlan {
    let cast_origin = shot.cast_origin();
    let cast_distance = shot.cast_distance();

    // Muzzle inside blocking geometry: nothing can be hit.
    let blocker = if query.check_sphere(
        CollisionLayer::Blocking,
        shot.origin,
        WEAPON_MUZZLE_CHECK_RADIUS,
    ) {
        Some((0.0, shot.origin))
    } else {
        query
            .sphere_cast(
                CollisionLayer::Blocking,
                cast_origin,
                shot.direction,
                shot.beam_radius,
                cast_distance,
            )
            .map(|hit| (hit.distance, hit.point))
    };
    let block_distance = blocker.map_or(f64::INFINITY, |(distance, _)| distance);

    let mut targets: Vec<Target> = Vec::new();

    for overlap in
        query.overlap_sphere(CollisionLayer::Damageable, shot.origin, shot.near_field_radius)
    {
        let along = (overlap.closest_point - cast_origin).dot(shot.direction);
        if along < 0.0 || along >= block_distance {
            continue;
        }
        targets.push(Target {
            entity: overlap.entity,
            distance: along,
            point: overlap.closest_point,
        });
    }

    for hit in query.sphere_cast_all(
        CollisionLayer::Damageable,
        cast_origin,
        shot.direction,
        shot.beam_radius,
        cast_distance,
    ) {
        if hit.distance >= block_distance {
            continue;
        }
        targets.push(Target {
            entity: hit.entity,
            distance: hit.distance,
            point: hit.point,
        });
    }

    targets.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.entity.to_bits().cmp(&b.entity.to_bits()))
    });
    let mut seen: Vec<Entity> = Vec::with_capacity(targets.len());
    targets.retain(|t| {
        if seen.contains(&t.entity) {
            false
        } else {
            seen.push(t.entity);
            true
        }
    });
    if !shot.piercing {
        targets.truncate(1);
    }

    let impact_point = match (targets.first(), blocker) {
        (Some(first), _) => first.point,
        (None, Some((_, point))) => point,
        (None, None) => shot.origin + shot.direction * shot.max_range,
    };

    ShotPlan {
        targets,
        blocked: blocker.is_some(),
        block_distance,
        impact_point,
    }
}

/// Outcome of a resolved shot.
#[derive(Debug)]
pub struct FireResult {
    /// Entities that took damage, nearest first.
    pub hit_entities: Vec<Entity>,
    /// Entities killed by this shot, with their death notices.
    pub kills: Vec<(Entity, DeathNotice)>,
    pub blocked: bool,
    pub start: DVec3,
    pub impact_point: DVec3,
}

/// Resolve `shot` against the world and apply its damage.
pub fn fire(world: &mut World, shot: &Shot) -> FireResult {
    let colliders = ColliderSet::from_world(world);
    let plan = plan_shot(&colliders, shot);

    let mut hit_entities = Vec::with_capacity(plan.targets.len());
    let mut kills = Vec::new();
    for target in &plan.targets {
        let Ok(mut health) = world.get::<&mut Health>(target.entity) else {
            continue;
        };
        match health.apply_damage(shot.damage) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Damaged { .. } => hit_entities.push(target.entity),
            DamageOutcome::Killed(notice) => {
                hit_entities.push(target.entity);
                kills.push((target.entity, notice));
            }
        }
    }

    tracing::trace!(
        hits = hit_entities.len(),
        kills = kills.len(),
        blocked = plan.blocked,
        "shot resolved"
    );

    FireResult {
        hit_entities,
        kills,
        blocked: plan.blocked,
        start: shot.origin,
        impact_point: plan.impact_point,
    }
}
