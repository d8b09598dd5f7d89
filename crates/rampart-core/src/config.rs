//! Encounter configuration.
//!
//! Loaded from JSON; every field has a default so a config file only needs
//! to name what it overrides. `validate()` runs before an encounter is built
//! so that inconsistent configuration fails at initialization, never during
//! the first wave.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{SurfaceLabel, SurfaceOrientation};
use crate::error::ConfigError;
use crate::types::LabelFilter;

/// Everything needed to build one encounter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// RNG seed. Same seed and same commands produce the same encounter.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
    pub objective: ObjectiveConfig,
    /// Spawnable enemy kinds.
    pub variants: Vec<EnemyVariant>,
    /// Variants used by waves that do not list their own.
    pub default_variants: Vec<String>,
    pub waves: WaveSource,
    pub spawner: SpawnerConfig,
    pub weapon: WeaponConfig,
    pub restart: RestartConfig,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            objective: ObjectiveConfig::default(),
            variants: vec![EnemyVariant::default()],
            default_variants: vec![EnemyVariant::default().name],
            waves: WaveSource::default(),
            spawner: SpawnerConfig::default(),
            weapon: WeaponConfig::default(),
            restart: RestartConfig::default(),
        }
    }
}

/// The defended objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveConfig {
    pub max_hp: f64,
    /// Position used when no placement search is configured.
    pub position: DVec3,
    /// Box collider half extents; the box blocks the weapon beam.
    pub half_extents: DVec3,
    /// Optional search for a surface in front of a viewer.
    pub placement: Option<ObjectivePlacementConfig>,
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        Self {
            max_hp: OBJECTIVE_MAX_HP,
            position: DVec3::ZERO,
            half_extents: DVec3::from_array(OBJECTIVE_HALF_EXTENTS),
            placement: None,
        }
    }
}

/// Best-of-N objective placement in front of a viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectivePlacementConfig {
    pub viewer_position: DVec3,
    pub viewer_forward: DVec3,
    pub labels: LabelFilter,
    /// Retry on the floor when no preferred surface qualifies.
    pub fallback_to_floor: bool,
    pub min_edge_distance: f64,
    pub surface_offset: f64,
    pub max_distance_from_viewer: f64,
    pub min_forward_dot: f64,
    pub attempts: u32,
    pub desired_horizontal_distance: f64,
    pub min_horizontal_distance: f64,
    /// Surfaces more than this far below the viewer are rejected.
    pub max_below_viewer: f64,
}

impl Default for ObjectivePlacementConfig {
    fn default() -> Self {
        Self {
            viewer_position: DVec3::new(0.0, 1.2, 0.0),
            viewer_forward: DVec3::NEG_Z,
            labels: LabelFilter::included(&[SurfaceLabel::Table]),
            fallback_to_floor: false,
            min_edge_distance: PLACEMENT_MIN_EDGE_DISTANCE,
            surface_offset: PLACEMENT_SURFACE_OFFSET,
            max_distance_from_viewer: PLACEMENT_MAX_DISTANCE,
            min_forward_dot: PLACEMENT_MIN_FORWARD_DOT,
            attempts: PLACEMENT_ATTEMPTS,
            desired_horizontal_distance: PLACEMENT_DESIRED_HORIZONTAL_DISTANCE,
            min_horizontal_distance: PLACEMENT_MIN_HORIZONTAL_DISTANCE,
            max_below_viewer: PLACEMENT_MAX_BELOW_VIEWER,
        }
    }
}

/// One spawnable enemy kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyVariant {
    pub name: String,
    pub max_hp: f64,
    /// Walk speed toward the objective (m/s).
    pub move_speed: f64,
    /// Damage dealt to the objective on contact.
    pub contact_damage: f64,
    /// Sphere collider radius.
    pub radius: f64,
    /// Seconds until the enemy expires on its own; 0 disables expiry.
    pub lifetime_secs: f64,
}

impl Default for EnemyVariant {
    fn default() -> Self {
        Self {
            name: "ghost".to_string(),
            max_hp: ENEMY_MAX_HP,
            move_speed: ENEMY_MOVE_SPEED,
            contact_damage: ENEMY_CONTACT_DAMAGE,
            radius: ENEMY_RADIUS,
            lifetime_secs: 0.0,
        }
    }
}

/// One wave's pacing and composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveSpec {
    pub enemy_count: u32,
    /// Seconds between spawn attempts; 0 means every tick.
    pub spawn_interval: f64,
    pub max_concurrent: u32,
    pub pre_delay: f64,
    pub post_delay: f64,
    /// Variant names, one chosen uniformly per spawn. Empty inherits the
    /// config's `default_variants`.
    pub enemy_variants: Vec<String>,
}

impl Default for WaveSpec {
    fn default() -> Self {
        Self {
            enemy_count: 10,
            spawn_interval: 0.8,
            max_concurrent: 8,
            pre_delay: 3.0,
            post_delay: 2.0,
            enemy_variants: Vec::new(),
        }
    }
}

/// Where the wave list comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum WaveSource {
    /// An ordered list given verbatim.
    Explicit { waves: Vec<WaveSpec> },
    /// Derived from a linear difficulty formula.
    Auto(AutoWaveFormula),
}

impl Default for WaveSource {
    fn default() -> Self {
        WaveSource::Auto(AutoWaveFormula::default())
    }
}

/// Linear wave formula, wave index `i` starting at 0:
///
/// - `enemy_count(i) = base_enemies + enemies_increase_per_wave * i`
/// - `spawn_interval(i) = max(min_spawn_interval, base_spawn_interval - spawn_interval_decrease_per_wave * i)`
/// - `max_concurrent(i) = max(1, base_max_concurrent + max_concurrent_increase_per_wave * i)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoWaveFormula {
    pub wave_count: u32,
    pub base_enemies: u32,
    pub enemies_increase_per_wave: u32,
    pub base_spawn_interval: f64,
    pub spawn_interval_decrease_per_wave: f64,
    pub min_spawn_interval: f64,
    pub base_max_concurrent: u32,
    pub max_concurrent_increase_per_wave: u32,
    pub pre_delay: f64,
    pub post_delay: f64,
}

impl Default for AutoWaveFormula {
    fn default() -> Self {
        Self {
            wave_count: AUTO_WAVE_COUNT,
            base_enemies: AUTO_BASE_ENEMIES,
            enemies_increase_per_wave: AUTO_ENEMIES_PER_WAVE,
            base_spawn_interval: AUTO_BASE_SPAWN_INTERVAL,
            spawn_interval_decrease_per_wave: AUTO_SPAWN_INTERVAL_DECREASE,
            min_spawn_interval: AUTO_MIN_SPAWN_INTERVAL,
            base_max_concurrent: AUTO_BASE_MAX_CONCURRENT,
            max_concurrent_increase_per_wave: AUTO_MAX_CONCURRENT_INCREASE,
            pre_delay: AUTO_PRE_WAVE_DELAY,
            post_delay: AUTO_POST_WAVE_DELAY,
        }
    }
}

/// Enemy spawn placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub labels: LabelFilter,
    pub orientation: SurfaceOrientation,
    pub min_edge_distance: f64,
    /// Push-out along the surface normal; never less than `SPAWN_MIN_PUSH_OUT`.
    pub normal_offset: f64,
    /// Minimum dot between a sample's normal and the required direction.
    pub min_alignment_dot: f64,
    pub attempts_per_spawn: u32,
    pub max_consecutive_failures: u32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            labels: LabelFilter::included(&[SurfaceLabel::Floor]),
            orientation: SurfaceOrientation::FacingUp,
            min_edge_distance: SPAWN_MIN_EDGE_DISTANCE,
            normal_offset: SPAWN_NORMAL_OFFSET,
            min_alignment_dot: SPAWN_MIN_ALIGNMENT_DOT,
            attempts_per_spawn: SPAWN_ATTEMPTS_PER_REQUEST,
            max_consecutive_failures: MAX_CONSECUTIVE_SPAWN_FAILURES,
        }
    }
}

/// Hitscan weapon parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub max_range: f64,
    pub beam_radius: f64,
    pub origin_backoff: f64,
    pub near_field_radius: f64,
    /// Whether one shot may damage every target along its path.
    pub piercing: bool,
    pub damage: f64,
    /// Minimum seconds between shots; 0 disables the cooldown.
    pub cooldown_secs: f64,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            max_range: WEAPON_MAX_RANGE,
            beam_radius: WEAPON_BEAM_RADIUS,
            origin_backoff: WEAPON_ORIGIN_BACKOFF,
            near_field_radius: WEAPON_NEAR_FIELD_RADIUS,
            piercing: true,
            damage: WEAPON_DAMAGE,
            cooldown_secs: 0.0,
        }
    }
}

/// Restart input gating after the encounter ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    pub grace_secs: f64,
    pub debounce_secs: f64,
    /// Require the restart button to be held instead of pressed.
    pub hold_to_confirm: bool,
    pub hold_secs: f64,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            grace_secs: RESTART_GRACE_SECS,
            debounce_secs: RESTART_DEBOUNCE_SECS,
            hold_to_confirm: false,
            hold_secs: RESTART_HOLD_SECS,
        }
    }
}

impl EncounterConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EncounterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a variant by name.
    pub fn variant(&self, name: &str) -> Option<&EnemyVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Check every invariant the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("time_scale", self.time_scale)?;
        positive("objective.max_hp", self.objective.max_hp)?;

        for (i, variant) in self.variants.iter().enumerate() {
            if self.variants[..i].iter().any(|v| v.name == variant.name) {
                return Err(ConfigError::DuplicateVariant(variant.name.clone()));
            }
            positive("variants.max_hp", variant.max_hp)?;
            positive("variants.radius", variant.radius)?;
            non_negative("variants.move_speed", variant.move_speed)?;
            non_negative("variants.contact_damage", variant.contact_damage)?;
            non_negative("variants.lifetime_secs", variant.lifetime_secs)?;
        }

        match &self.waves {
            WaveSource::Explicit { waves } => {
                if waves.is_empty() {
                    return Err(ConfigError::NoWaves);
                }
                for (index, wave) in waves.iter().enumerate() {
                    self.validate_wave(index, wave)?;
                }
            }
            WaveSource::Auto(formula) => {
                if formula.wave_count == 0 {
                    return Err(ConfigError::NoWaves);
                }
                non_negative("waves.base_spawn_interval", formula.base_spawn_interval)?;
                non_negative("waves.min_spawn_interval", formula.min_spawn_interval)?;
                non_negative("waves.pre_delay", formula.pre_delay)?;
                non_negative("waves.post_delay", formula.post_delay)?;
                self.check_variant_names(0, &self.default_variants)?;
            }
        }

        let spawner = &self.spawner;
        if spawner.labels.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "spawner.labels",
                reason: "at least one surface label is required".to_string(),
            });
        }
        non_negative("spawner.min_edge_distance", spawner.min_edge_distance)?;
        at_least_one("spawner.attempts_per_spawn", spawner.attempts_per_spawn)?;
        at_least_one(
            "spawner.max_consecutive_failures",
            spawner.max_consecutive_failures,
        )?;

        positive("weapon.max_range", self.weapon.max_range)?;
        non_negative("weapon.beam_radius", self.weapon.beam_radius)?;
        non_negative("weapon.origin_backoff", self.weapon.origin_backoff)?;
        non_negative("weapon.near_field_radius", self.weapon.near_field_radius)?;
        non_negative("weapon.damage", self.weapon.damage)?;
        non_negative("weapon.cooldown_secs", self.weapon.cooldown_secs)?;

        non_negative("restart.grace_secs", self.restart.grace_secs)?;
        non_negative("restart.debounce_secs", self.restart.debounce_secs)?;
        non_negative("restart.hold_secs", self.restart.hold_secs)?;

        if let Some(placement) = &self.objective.placement {
            at_least_one("objective.placement.attempts", placement.attempts)?;
            if placement.labels.is_empty() && !placement.fallback_to_floor {
                return Err(ConfigError::InvalidValue {
                    field: "objective.placement.labels",
                    reason: "no labels and no floor fallback".to_string(),
                });
            }
        }

        Ok(())
    }

    fn validate_wave(&self, index: usize, wave: &WaveSpec) -> Result<(), ConfigError> {
        non_negative("waves.spawn_interval", wave.spawn_interval)?;
        non_negative("waves.pre_delay", wave.pre_delay)?;
        non_negative("waves.post_delay", wave.post_delay)?;
        if wave.enemy_count > 0 {
            at_least_one("waves.max_concurrent", wave.max_concurrent)?;
        }
        let names = if wave.enemy_variants.is_empty() {
            &self.default_variants
        } else {
            &wave.enemy_variants
        };
        self.check_variant_names(index, names)
    }

    fn check_variant_names(&self, index: usize, names: &[String]) -> Result<(), ConfigError> {
        if names.is_empty() {
            return Err(ConfigError::EmptyVariantSet { index });
        }
        match names.iter().find(|name| self.variant(name).is_none()) {
            Some(name) => Err(ConfigError::UnknownVariant {
                index,
                name: name.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected a finite value >= 0, got {value}"),
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected a finite value > 0, got {value}"),
        })
    }
}

fn at_least_one(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: "expected at least 1".to_string(),
        })
    }
}
