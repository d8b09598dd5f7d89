//! Spawn placement: turning random surface samples into accepted poses.
//!
//! The surface provider is probabilistic, so every resolver here draws a
//! bounded number of samples and either returns a pose or a
//! `PlacementFailure`. Failure is an ordinary value, not an error condition;
//! callers decide whether to retry later.

use glam::{DQuat, DVec3};
use rand::Rng;
use thiserror::Error;

use rampart_core::config::{ObjectivePlacementConfig, SpawnerConfig};
use rampart_core::constants::{PLACEMENT_MIN_UP_NORMAL, SPAWN_MIN_PUSH_OUT};
use rampart_core::enums::{SurfaceLabel, SurfaceOrientation};
use rampart_core::types::{
    horizontal_distance, yaw_facing, LabelFilter, SpawnPose, SurfaceSample, UP,
};
use rampart_room::Room;

/// Source of random points on scanned surfaces.
pub trait SurfaceProvider {
    /// Draw one sample, or `None` if this draw produced nothing usable.
    fn sample(
        &mut self,
        orientation: SurfaceOrientation,
        labels: LabelFilter,
        min_edge_distance: f64,
    ) -> Option<SurfaceSample>;
}

impl SurfaceProvider for Room {
    fn sample(
        &mut self,
        orientation: SurfaceOrientation,
        labels: LabelFilter,
        min_edge_distance: f64,
    ) -> Option<SurfaceSample> {
        Room::sample(self, orientation, labels, min_edge_distance)
    }
}

/// No acceptable sample was found within the attempt budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no valid placement after {attempts} attempts")]
pub struct PlacementFailure {
    pub attempts: u32,
}

/// Constraints for one enemy spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    pub orientation: SurfaceOrientation,
    pub labels: LabelFilter,
    pub min_edge_distance: f64,
    /// Minimum cosine between the sample normal and the orientation's direction.
    pub min_alignment_dot: f64,
    /// Distance the pose is pushed off the surface along its normal.
    pub push_out: f64,
    pub max_attempts: u32,
}

impl PlacementRequest {
    pub fn from_spawner(config: &SpawnerConfig) -> Self {
        Self {
            orientation: config.orientation,
            labels: config.labels,
            min_edge_distance: config.min_edge_distance,
            min_alignment_dot: config.min_alignment_dot,
            push_out: config.normal_offset.abs().max(SPAWN_MIN_PUSH_OUT),
            max_attempts: config.attempts_per_spawn.max(1),
        }
    }

    /// Whether a sample satisfies every constraint of this request.
    pub fn accepts(&self, sample: &SurfaceSample) -> bool {
        self.labels.contains(sample.label)
            && sample.edge_distance > self.min_edge_distance
            && normal_alignment(self.orientation, sample.normal) >= self.min_alignment_dot
    }
}

/// How well `normal` matches the direction implied by `orientation`, as a
/// cosine. Vertical surfaces are scored by how horizontal the normal is.
pub fn normal_alignment(orientation: SurfaceOrientation, normal: DVec3) -> f64 {
    let normal = normal.normalize_or_zero();
    match orientation {
        SurfaceOrientation::FacingUp => normal.dot(UP),
        SurfaceOrientation::FacingDown => -normal.dot(UP),
        SurfaceOrientation::Vertical => (normal.x * normal.x + normal.z * normal.z).sqrt(),
    }
}

/// Resolves placement requests against a surface provider.
pub struct SpawnPlacementResolver;

impl SpawnPlacementResolver {
    /// Draw up to `request.max_attempts` samples and return the first
    /// acceptable one as a pose pushed off its surface.
    ///
    /// Horizontal surfaces get a random yaw; walls get a pose facing out of
    /// the wall into the room.
    pub fn resolve<P, R>(
        provider: &mut P,
        rng: &mut R,
        request: &PlacementRequest,
    ) -> Result<SpawnPose, PlacementFailure>
    where
        P: SurfaceProvider + ?Sized,
        R: Rng + ?Sized,
    {
        let attempts = request.max_attempts.max(1);
        for _ in 0..attempts {
            let Some(sample) =
                provider.sample(request.orientation, request.labels, request.min_edge_distance)
            else {
                continue;
            };
            if !request.accepts(&sample) {
                continue;
            }

            let normal = sample.normal.normalize_or_zero();
            let position = sample.point + normal * request.push_out;
            let orientation = match request.orientation {
                SurfaceOrientation::Vertical => yaw_facing(normal),
                SurfaceOrientation::FacingUp | SurfaceOrientation::FacingDown => {
                    DQuat::from_rotation_y(rng.gen_range(0.0..std::f64::consts::TAU))
                }
            };
            return Ok(SpawnPose::new(position, orientation));
        }
        Err(PlacementFailure { attempts })
    }

    /// Best-of-N search: draw `attempts` samples, keep those `score` accepts,
    /// and return the one with the lowest score.
    pub fn resolve_scored<P, F>(
        provider: &mut P,
        orientation: SurfaceOrientation,
        labels: LabelFilter,
        min_edge_distance: f64,
        attempts: u32,
        mut score: F,
    ) -> Result<SurfaceSample, PlacementFailure>
    where
        P: SurfaceProvider + ?Sized,
        F: FnMut(&SurfaceSample) -> Option<f64>,
    {
        let attempts = attempts.max(1);
        let mut best: Option<(f64, SurfaceSample)> = None;
        for _ in 0..attempts {
            let Some(sample) = provider.sample(orientation, labels, min_edge_distance) else {
                continue;
            };
            let Some(value) = score(&sample) else {
                continue;
            };
            if best.as_ref().is_none_or(|(b, _)| value < *b) {
                best = Some((value, sample));
            }
        }
        best.map(|(_, sample)| sample)
            .ok_or(PlacementFailure { attempts })
    }
}

/// Score a candidate objective position in front of the viewer; lower is
/// better, `None` rejects it.
pub fn viewer_score(config: &ObjectivePlacementConfig, sample: &SurfaceSample) -> Option<f64> {
    if sample.normal.y < PLACEMENT_MIN_UP_NORMAL {
        return None;
    }
    let viewer = config.viewer_position;
    if viewer.y - sample.point.y > config.max_below_viewer {
        return None;
    }
    let to = sample.point - viewer;
    let dist = to.length();
    if dist > config.max_distance_from_viewer {
        return None;
    }
    let horizontal = horizontal_distance(viewer, sample.point);
    if horizontal < config.min_horizontal_distance {
        return None;
    }

    let forward = flat_forward(config.viewer_forward);
    let flat_to = DVec3::new(to.x, 0.0, to.z).normalize_or_zero();
    let dot = flat_to.dot(forward);
    if dot < config.min_forward_dot {
        return None;
    }

    Some(
        (horizontal - config.desired_horizontal_distance).abs() * 1.2
            + (1.0 - dot) * 0.8
            + dist * 0.05,
    )
}

fn flat_forward(forward: DVec3) -> DVec3 {
    let flat = DVec3::new(forward.x, 0.0, forward.z);
    if flat.length_squared() < 1e-10 {
        forward.normalize_or_zero()
    } else {
        flat.normalize()
    }
}

/// Place the objective on the best surface in front of the viewer, falling
/// back to the floor if configured. The pose faces the viewer.
pub fn place_objective<P>(
    provider: &mut P,
    config: &ObjectivePlacementConfig,
    bottom_offset: f64,
) -> Result<SpawnPose, PlacementFailure>
where
    P: SurfaceProvider + ?Sized,
{
    let search = |provider: &mut P, labels: LabelFilter| {
        SpawnPlacementResolver::resolve_scored(
            provider,
            SurfaceOrientation::FacingUp,
            labels,
            config.min_edge_distance,
            config.attempts,
            |sample| viewer_score(config, sample),
        )
    };

    let sample = match search(&mut *provider, config.labels) {
        Ok(sample) => sample,
        Err(failure) if config.fallback_to_floor => {
            tracing::debug!(attempts = failure.attempts, "falling back to floor placement");
            search(&mut *provider, LabelFilter::included(&[SurfaceLabel::Floor]))?
        }
        Err(failure) => return Err(failure),
    };

    let normal = sample.normal.normalize_or_zero();
    let position = sample.point + normal * (config.surface_offset.max(0.001) + bottom_offset);
    let orientation = yaw_facing(config.viewer_position - position);
    Ok(SpawnPose::new(position, orientation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rampart_room::RoomLayout;

    /// Provider that replays a fixed list of draws, then returns nothing.
    struct Scripted {
        draws: Vec<Option<SurfaceSample>>,
        calls: u32,
    }

    impl SurfaceProvider for Scripted {
        fn sample(
            &mut self,
            _orientation: SurfaceOrientation,
            _labels: LabelFilter,
            _min_edge_distance: f64,
        ) -> Option<SurfaceSample> {
            let draw = self.draws.get(self.calls as usize).copied().flatten();
            self.calls += 1;
            draw
        }
    }

    fn floor_sample(point: DVec3, edge: f64) -> SurfaceSample {
        SurfaceSample {
            point,
            normal: UP,
            edge_distance: edge,
            label: SurfaceLabel::Floor,
        }
    }

    fn floor_request() -> PlacementRequest {
        PlacementRequest::from_spawner(&SpawnerConfig::default())
    }

    #[test]
    fn push_out_has_a_floor() {
        let config = SpawnerConfig {
            normal_offset: -0.002,
            ..Default::default()
        };
        let request = PlacementRequest::from_spawner(&config);
        assert_eq!(request.push_out, SPAWN_MIN_PUSH_OUT);

        let config = SpawnerConfig {
            normal_offset: -0.05,
            ..Default::default()
        };
        assert_eq!(PlacementRequest::from_spawner(&config).push_out, 0.05);
    }

    #[test]
    fn resolve_skips_empty_draws() {
        let mut provider = Scripted {
            draws: vec![None, None, Some(floor_sample(DVec3::new(1.0, 0.0, 0.5), 0.6))],
            calls: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let pose = SpawnPlacementResolver::resolve(&mut provider, &mut rng, &floor_request())
            .expect("third draw is valid");
        assert_eq!(provider.calls, 3);
        assert!((pose.position - DVec3::new(1.0, 0.04, 0.5)).length() < 1e-12);
    }

    #[test]
    fn resolve_rejects_near_edge_and_misaligned() {
        let tilted = SurfaceSample {
            normal: DVec3::new(0.6, 0.8, 0.0),
            ..floor_sample(DVec3::ZERO, 1.0)
        };
        let mut provider = Scripted {
            draws: vec![Some(floor_sample(DVec3::ZERO, 0.1)), Some(tilted)],
            calls: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = SpawnPlacementResolver::resolve(&mut provider, &mut rng, &floor_request());
        assert_eq!(result, Err(PlacementFailure { attempts: 24 }));
        assert_eq!(provider.calls, 24);
    }

    #[test]
    fn edge_distance_must_exceed_minimum() {
        let request = floor_request();
        let on_limit = floor_sample(DVec3::ZERO, request.min_edge_distance);
        assert!(!request.accepts(&on_limit));
        let inside = floor_sample(DVec3::ZERO, request.min_edge_distance + 1e-6);
        assert!(request.accepts(&inside));
    }

    #[test]
    fn resolve_fails_without_surfaces() {
        let mut room = Room::new(RoomLayout::default(), 3);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let result = SpawnPlacementResolver::resolve(&mut room, &mut rng, &floor_request());
        assert!(result.is_err());
    }

    #[test]
    fn wall_spawns_face_into_the_room() {
        let mut room = Room::new(RoomLayout::rectangular(4.0, 4.0, 2.5), 11);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let request = PlacementRequest {
            orientation: SurfaceOrientation::Vertical,
            labels: LabelFilter::included(&[SurfaceLabel::WallFace]),
            min_edge_distance: 0.2,
            min_alignment_dot: 0.9,
            push_out: 0.04,
            max_attempts: 24,
        };
        for _ in 0..20 {
            let pose = SpawnPlacementResolver::resolve(&mut room, &mut rng, &request)
                .expect("walls are large");
            // Pushed inside the room, facing toward its center.
            assert!(pose.position.x.abs() < 2.0 && pose.position.z.abs() < 2.0);
            let toward_center = DVec3::new(-pose.position.x, 0.0, -pose.position.z).normalize();
            assert!(pose.forward().dot(toward_center) > 0.0);
        }
    }

    #[test]
    fn scored_picks_lowest() {
        let mut provider = Scripted {
            draws: vec![
                Some(floor_sample(DVec3::new(3.0, 0.0, 0.0), 1.0)),
                Some(floor_sample(DVec3::new(1.0, 0.0, 0.0), 1.0)),
                Some(floor_sample(DVec3::new(2.0, 0.0, 0.0), 1.0)),
            ],
            calls: 0,
        };
        let best = SpawnPlacementResolver::resolve_scored(
            &mut provider,
            SurfaceOrientation::FacingUp,
            LabelFilter::any(),
            0.0,
            3,
            |s| Some(s.point.x),
        )
        .expect("all accepted");
        assert_eq!(best.point.x, 1.0);
    }

    #[test]
    fn viewer_score_rejects_behind_and_far() {
        let config = ObjectivePlacementConfig::default();
        let table = |point: DVec3| SurfaceSample {
            label: SurfaceLabel::Table,
            ..floor_sample(point, 0.3)
        };
        // In front at the desired distance.
        assert!(viewer_score(&config, &table(DVec3::new(0.0, 0.75, -0.6))).is_some());
        // Behind the viewer.
        assert!(viewer_score(&config, &table(DVec3::new(0.0, 0.75, 0.6))).is_none());
        // Too far away.
        assert!(viewer_score(&config, &table(DVec3::new(0.0, 0.75, -1.5))).is_none());
        // Too far below (floor).
        assert!(viewer_score(&config, &table(DVec3::new(0.0, 0.0, -0.6))).is_none());
        // Directly underneath.
        assert!(viewer_score(&config, &table(DVec3::new(0.0, 0.75, -0.1))).is_none());
    }

    #[test]
    fn objective_lands_on_table_facing_viewer() {
        let layout = RoomLayout::rectangular(4.0, 4.0, 2.5)
            .with_table(DVec3::new(0.0, 0.75, -0.6), 0.4, 0.3);
        let mut room = Room::new(layout, 5);
        let config = ObjectivePlacementConfig::default();
        let pose = place_objective(&mut room, &config, 0.25).expect("table in front");
        assert!((pose.position.y - (0.75 + 0.01 + 0.25)).abs() < 1e-9);
        let to_viewer = (config.viewer_position - pose.position) * DVec3::new(1.0, 0.0, 1.0);
        assert!(pose.forward().dot(to_viewer.normalize()) > 0.99);
    }

    #[test]
    fn objective_placement_fails_without_table() {
        let mut room = Room::new(RoomLayout::rectangular(4.0, 4.0, 2.5), 5);
        let config = ObjectivePlacementConfig {
            attempts: 50,
            ..Default::default()
        };
        assert_eq!(
            place_objective(&mut room, &config, 0.25),
            Err(PlacementFailure { attempts: 50 })
        );
    }

    #[test]
    fn objective_falls_back_to_floor() {
        let mut room = Room::new(RoomLayout::rectangular(4.0, 4.0, 2.5), 5);
        let config = ObjectivePlacementConfig {
            fallback_to_floor: true,
            max_below_viewer: 2.0,
            ..Default::default()
        };
        let pose = place_objective(&mut room, &config, 0.0).expect("floor in front");
        assert!(pose.position.y.abs() < 0.05);
        assert!(pose.position.z < 0.0);
    }
}
