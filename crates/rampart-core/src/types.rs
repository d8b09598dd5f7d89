//! Fundamental geometric and simulation types.
//!
//! World space is right-handed with +Y up, meters throughout.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::enums::SurfaceLabel;

/// World up axis.
pub const UP: DVec3 = DVec3::Y;

/// Simulation time tracking.
///
/// `elapsed_secs` follows the time scale; `unscaled_secs` always advances by
/// the real tick duration and is what input debouncing is measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds (scaled).
    pub elapsed_secs: f64,
    /// Elapsed real time in seconds (unscaled).
    pub unscaled_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` real seconds. Returns the scaled delta.
    pub fn advance(&mut self, dt: f64, time_scale: f64) -> f64 {
        let scaled = dt * time_scale.max(0.0);
        self.tick += 1;
        self.elapsed_secs += scaled;
        self.unscaled_secs += dt;
        scaled
    }
}

/// A set of surface labels, used to filter which scanned surfaces may be sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<SurfaceLabel>", into = "Vec<SurfaceLabel>")]
pub struct LabelFilter {
    bits: u32,
}

impl LabelFilter {
    /// Filter accepting exactly the given labels.
    pub fn included(labels: &[SurfaceLabel]) -> Self {
        Self {
            bits: labels.iter().fold(0, |acc, label| acc | label.bit()),
        }
    }

    /// Filter accepting every label.
    pub fn any() -> Self {
        Self::included(SurfaceLabel::ALL)
    }

    pub fn contains(&self, label: SurfaceLabel) -> bool {
        self.bits & label.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// The labels accepted by this filter, in declaration order.
    pub fn labels(&self) -> Vec<SurfaceLabel> {
        SurfaceLabel::ALL
            .iter()
            .copied()
            .filter(|label| self.contains(*label))
            .collect()
    }
}

impl From<Vec<SurfaceLabel>> for LabelFilter {
    fn from(labels: Vec<SurfaceLabel>) -> Self {
        Self::included(&labels)
    }
}

impl From<LabelFilter> for Vec<SurfaceLabel> {
    fn from(filter: LabelFilter) -> Self {
        filter.labels()
    }
}

/// One random point on a scanned surface, as returned by a surface provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSample {
    pub point: DVec3,
    /// Unit normal pointing out of the surface into the room.
    pub normal: DVec3,
    /// Distance from `point` to the nearest edge of its surface (meters).
    pub edge_distance: f64,
    pub label: SurfaceLabel,
}

/// An accepted spawn transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPose {
    pub position: DVec3,
    pub orientation: DQuat,
}

impl SpawnPose {
    pub fn new(position: DVec3, orientation: DQuat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Forward direction (local -Z rotated into world space).
    pub fn forward(&self) -> DVec3 {
        self.orientation * DVec3::NEG_Z
    }
}

/// Rotation about the up axis that makes local -Z point along `direction`'s
/// horizontal component. Falls back to identity for (near) vertical input.
pub fn yaw_facing(direction: DVec3) -> DQuat {
    let flat = DVec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() < 1e-10 {
        return DQuat::IDENTITY;
    }
    let flat = flat.normalize();
    // -Z rotated by yaw θ about +Y is (-sin θ, 0, -cos θ).
    let yaw = (-flat.x).atan2(-flat.z);
    DQuat::from_rotation_y(yaw)
}

/// Horizontal (XZ-plane) distance between two points.
pub fn horizontal_distance(a: DVec3, b: DVec3) -> f64 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    (dx * dx + dz * dz).sqrt()
}
