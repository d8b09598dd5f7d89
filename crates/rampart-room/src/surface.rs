//! Labeled rectangular surfaces.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use rampart_core::enums::{SurfaceLabel, SurfaceOrientation};
use rampart_core::types::UP;

/// Normal Y component beyond which a surface counts as horizontal.
const HORIZONTAL_NORMAL_Y: f64 = 0.9;

/// Normal Y magnitude below which a surface counts as vertical.
const VERTICAL_NORMAL_Y: f64 = 0.1;

/// A flat rectangle in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfacePlane {
    pub label: SurfaceLabel,
    pub center: DVec3,
    /// Unit normal pointing into the room.
    pub normal: DVec3,
    /// Unit in-plane axis along which `half_width` is measured.
    pub tangent: DVec3,
    pub half_width: f64,
    pub half_height: f64,
}

impl SurfacePlane {
    /// A horizontal rectangle spanning X (`half_x`) and Z (`half_z`).
    pub fn horizontal(
        label: SurfaceLabel,
        center: DVec3,
        half_x: f64,
        half_z: f64,
        facing_up: bool,
    ) -> Self {
        Self {
            label,
            center,
            normal: if facing_up { UP } else { -UP },
            tangent: DVec3::X,
            half_width: half_x,
            half_height: half_z,
        }
    }

    /// A vertical wall whose normal points along `inward` (flattened).
    pub fn wall(center: DVec3, inward: DVec3, half_width: f64, half_height: f64) -> Self {
        let normal = DVec3::new(inward.x, 0.0, inward.z).normalize_or_zero();
        Self {
            label: SurfaceLabel::WallFace,
            center,
            normal,
            tangent: UP.cross(normal).normalize_or_zero(),
            half_width,
            half_height,
        }
    }

    /// Second in-plane axis, along which `half_height` is measured.
    pub fn bitangent(&self) -> DVec3 {
        self.normal.cross(self.tangent)
    }

    pub fn area(&self) -> f64 {
        4.0 * self.half_width * self.half_height
    }

    /// Orientation class implied by the normal, if any.
    pub fn orientation(&self) -> Option<SurfaceOrientation> {
        if self.normal.y >= HORIZONTAL_NORMAL_Y {
            Some(SurfaceOrientation::FacingUp)
        } else if self.normal.y <= -HORIZONTAL_NORMAL_Y {
            Some(SurfaceOrientation::FacingDown)
        } else if self.normal.y.abs() <= VERTICAL_NORMAL_Y {
            Some(SurfaceOrientation::Vertical)
        } else {
            None
        }
    }

    /// World point at in-plane coordinates `(u, v)` from the center.
    pub fn point_at(&self, u: f64, v: f64) -> DVec3 {
        self.center + self.tangent * u + self.bitangent() * v
    }

    /// Distance from in-plane coordinates `(u, v)` to the nearest edge.
    /// Negative outside the rectangle.
    pub fn edge_distance(&self, u: f64, v: f64) -> f64 {
        (self.half_width - u.abs()).min(self.half_height - v.abs())
    }
}

/// Serializable list of surfaces making up a room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomLayout {
    pub surfaces: Vec<SurfacePlane>,
}

impl RoomLayout {
    /// Box room centered on the origin: floor at y = 0, ceiling at `height`,
    /// four inward-facing walls.
    pub fn rectangular(width: f64, depth: f64, height: f64) -> Self {
        let hw = width / 2.0;
        let hd = depth / 2.0;
        let hh = height / 2.0;
        Self {
            surfaces: vec![
                SurfacePlane::horizontal(SurfaceLabel::Floor, DVec3::ZERO, hw, hd, true),
                SurfacePlane::horizontal(
                    SurfaceLabel::Ceiling,
                    DVec3::new(0.0, height, 0.0),
                    hw,
                    hd,
                    false,
                ),
                SurfacePlane::wall(DVec3::new(0.0, hh, -hd), DVec3::Z, hw, hh),
                SurfacePlane::wall(DVec3::new(0.0, hh, hd), DVec3::NEG_Z, hw, hh),
                SurfacePlane::wall(DVec3::new(-hw, hh, 0.0), DVec3::X, hd, hh),
                SurfacePlane::wall(DVec3::new(hw, hh, 0.0), DVec3::NEG_X, hd, hh),
            ],
        }
    }

    /// Add an upward-facing table top.
    pub fn with_table(mut self, top_center: DVec3, half_x: f64, half_z: f64) -> Self {
        self.surfaces.push(SurfacePlane::horizontal(
            SurfaceLabel::Table,
            top_center,
            half_x,
            half_z,
            true,
        ));
        self
    }
}
