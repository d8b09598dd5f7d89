//! Sphere sweeps and overlaps against the colliders in the world.
//!
//! Weapon fire only needs a handful of queries, so colliders are gathered into
//! a flat `ColliderSet` each time a shot is resolved. All sweeps take a unit
//! direction; distances are measured along it from the sweep origin.

use glam::DVec3;
use hecs::{Entity, World};

use rampart_core::components::{Collider, ColliderShape, CollisionLayer, Transform};

use crate::lifecycle::Health;

/// A sweep that touched a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    pub entity: Entity,
    /// Distance travelled along the sweep. 0 when the sweep started inside.
    pub distance: f64,
    /// Contact point on the collider surface.
    pub point: DVec3,
}

/// A collider overlapping a query sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub entity: Entity,
    /// Point on the collider closest to the query center.
    pub closest_point: DVec3,
}

/// Physics queries used by weapon fire.
pub trait SpatialQuery {
    /// Whether anything on `layer` overlaps the sphere.
    fn check_sphere(&self, layer: CollisionLayer, center: DVec3, radius: f64) -> bool;

    /// Every collider on `layer` overlapping the sphere.
    fn overlap_sphere(&self, layer: CollisionLayer, center: DVec3, radius: f64) -> Vec<Overlap>;

    /// Every collider on `layer` touched by the swept sphere, in no particular order.
    fn sphere_cast_all(
        &self,
        layer: CollisionLayer,
        origin: DVec3,
        direction: DVec3,
        radius: f64,
        max_distance: f64,
    ) -> Vec<SweepHit>;

    /// The nearest collider on `layer` touched by the swept sphere.
    fn sphere_cast(
        &self,
        layer: CollisionLayer,
        origin: DVec3,
        direction: DVec3,
        radius: f64,
        max_distance: f64,
    ) -> Option<SweepHit> {
        self.sphere_cast_all(layer, origin, direction, radius, max_distance)
            .into_iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[derive(Debug, Clone, Copy)]
struct PlacedCollider {
    entity: Entity,
    position: DVec3,
    collider: Collider,
}

/// Snapshot of the colliders of every living entity.
#[derive(Debug, Default)]
pub struct ColliderSet {
    colliders: Vec<PlacedCollider>,
}

impl ColliderSet {
    /// Gather colliders from the world, skipping entities that are already dead.
    pub fn from_world(world: &World) -> Self {
        let mut colliders = Vec::new();
        let mut query = world.query::<(&Transform, &Collider, Option<&Health>)>();
        for (entity, (transform, collider, health)) in query.iter() {
            if health.is_some_and(|h| h.is_dead()) {
                continue;
            }
            colliders.push(PlacedCollider {
                entity,
                position: transform.position,
                collider: *collider,
            });
        }
        Self { colliders }
    }

    pub fn push(&mut self, entity: Entity, position: DVec3, collider: Collider) {
        self.colliders.push(PlacedCollider {
            entity,
            position,
            collider,
        });
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    fn on_layer(&self, layer: CollisionLayer) -> impl Iterator<Item = &PlacedCollider> {
        self.colliders
            .iter()
            .filter(move |c| c.collider.layer == layer)
    }
}

impl SpatialQuery for ColliderSet {
    fn check_sphere(&self, layer: CollisionLayer, center: DVec3, radius: f64) -> bool {
        self.on_layer(layer)
            .any(|c| closest_point(c, center).distance(center) <= radius)
    }

    fn overlap_sphere(&self, layer: CollisionLayer, center: DVec3, radius: f64) -> Vec<Overlap> {
        self.on_layer(layer)
            .filter_map(|c| {
                let closest = closest_point(c, center);
                (closest.distance(center) <= radius).then_some(Overlap {
                    entity: c.entity,
                    closest_point: closest,
                })
            })
            .collect()
    }

    fn sphere_cast_all(
        &self,
        layer: CollisionLayer,
        origin: DVec3,
        direction: DVec3,
        radius: f64,
        max_distance: f64,
    ) -> Vec<SweepHit> {
        let direction = direction.normalize_or_zero();
        if direction == DVec3::ZERO {
            return Vec::new();
        }
        self.on_layer(layer)
            .filter_map(|c| {
                let (distance, point) = match c.collider.shape {
                    ColliderShape::Sphere { radius: r } => {
                        sweep_sphere(origin, direction, radius, c.position, r)?
                    }
                    ColliderShape::Box { half_extents } => {
                        sweep_box(origin, direction, radius, c.position, half_extents)?
                    }
                };
                (distance <= max_distance).then_some(SweepHit {
                    entity: c.entity,
                    distance,
                    point,
                })
            })
            .collect()
    }
}

/// Point on the collider closest to `p` (or `p` itself when inside).
fn closest_point(c: &PlacedCollider, p: DVec3) -> DVec3 {
    match c.collider.shape {
        ColliderShape::Sphere { radius } => {
            let offset = p - c.position;
            if offset.length() <= radius {
                p
            } else {
                c.position + offset.normalize() * radius
            }
        }
        ColliderShape::Box { half_extents } => {
            p.clamp(c.position - half_extents, c.position + half_extents)
        }
    }
}

/// Sphere of radius `sweep_radius` moving along `dir` against a sphere at
/// `center`. Returns (distance, contact point).
fn sweep_sphere(
    origin: DVec3,
    dir: DVec3,
    sweep_radius: f64,
    center: DVec3,
    radius: f64,
) -> Option<(f64, DVec3)> {
    let combined = sweep_radius + radius;
    let m = origin - center;
    let c = m.length_squared() - combined * combined;
    if c <= 0.0 {
        return Some((0.0, origin));
    }
    let b = m.dot(dir);
    if b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    let swept_center = origin + dir * t;
    let normal = (swept_center - center) / combined;
    Some((t, center + normal * radius))
}

/// Sphere sweep against an axis-aligned box, using the box inflated by the
/// sweep radius (slab test). Corners are treated as square.
fn sweep_box(
    origin: DVec3,
    dir: DVec3,
    sweep_radius: f64,
    center: DVec3,
    half_extents: DVec3,
) -> Option<(f64, DVec3)> {
    let min = center - half_extents;
    let max = center + half_extents;
    let inflated_min = min - DVec3::splat(sweep_radius);
    let inflated_max = max + DVec3::splat(sweep_radius);

    let mut t_enter = f64::NEG_INFINITY;
    let mut t_exit = f64::INFINITY;
    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() < 1e-12 {
            if o < inflated_min[axis] || o > inflated_max[axis] {
                return None;
            }
            continue;
        }
        let t1 = (inflated_min[axis] - o) / d;
        let t2 = (inflated_max[axis] - o) / d;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
    }
    if t_exit < t_enter.max(0.0) {
        return None;
    }
    if t_enter <= 0.0 {
        return Some((0.0, origin));
    }
    let point = (origin + dir * t_enter).clamp(min, max);
    Some((t_enter, point))
}
