//! Random surface sampling over a room layout.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rampart_core::enums::SurfaceOrientation;
use rampart_core::types::{LabelFilter, SurfaceSample};

use crate::surface::{RoomLayout, SurfacePlane};

/// A scanned room with its own seeded sampler.
pub struct Room {
    layout: RoomLayout,
    rng: ChaCha8Rng,
}

impl Room {
    pub fn new(layout: RoomLayout, seed: u64) -> Self {
        Self {
            layout,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn layout(&self) -> &RoomLayout {
        &self.layout
    }

    pub fn surfaces(&self) -> &[SurfacePlane] {
        &self.layout.surfaces
    }

    /// Draw one random point on a surface matching `orientation` and `labels`.
    ///
    /// A surface is chosen with probability proportional to its area, then a
    /// point uniformly inside it. The draw comes back `None` when nothing
    /// matches or when the point lands within `min_edge_distance` of an edge;
    /// callers are expected to retry. Degenerate surfaces (zero, negative or
    /// non-finite extents) never match.
    pub fn sample(
        &mut self,
        orientation: SurfaceOrientation,
        labels: LabelFilter,
        min_edge_distance: f64,
    ) -> Option<SurfaceSample> {
        let candidates: Vec<&SurfacePlane> = self
            .layout
            .surfaces
            .iter()
            .filter(|s| s.orientation() == Some(orientation) && labels.contains(s.label))
            .filter(|s| is_sampleable(s))
            .collect();

        let total_area: f64 = candidates.iter().map(|s| s.area()).sum();
        if candidates.is_empty() || !(total_area > 0.0 && total_area.is_finite()) {
            return None;
        }

        let mut pick = self.rng.gen_range(0.0..total_area);
        let mut chosen = candidates[candidates.len() - 1];
        for surface in &candidates {
            if pick < surface.area() {
                chosen = surface;
                break;
            }
            pick -= surface.area();
        }

        let u = self.rng.gen_range(-chosen.half_width..=chosen.half_width);
        let v = self.rng.gen_range(-chosen.half_height..=chosen.half_height);
        let edge_distance = chosen.edge_distance(u, v);
        if edge_distance <= min_edge_distance {
            return None;
        }

        Some(SurfaceSample {
            point: chosen.point_at(u, v),
            normal: chosen.normal,
            edge_distance,
            label: chosen.label,
        })
    }
}

fn is_sampleable(surface: &SurfacePlane) -> bool {
    let extent_ok = |e: f64| e > 0.0 && e.is_finite();
    extent_ok(surface.half_width) && extent_ok(surface.half_height)
}
