//! Wave list construction: explicit lists or the linear auto formula.
//!
//! The scheduler only ever sees fully resolved waves: every wave carries its
//! own non-empty variant list.

use rampart_core::config::{AutoWaveFormula, EncounterConfig, WaveSource, WaveSpec};
use rampart_core::error::ConfigError;

/// Build the resolved wave list for an encounter.
pub fn build_waves(config: &EncounterConfig) -> Result<Vec<WaveSpec>, ConfigError> {
    let waves = match &config.waves {
        WaveSource::Explicit { waves } => waves.clone(),
        WaveSource::Auto(formula) => auto_waves(formula)?,
    };
    if waves.is_empty() {
        return Err(ConfigError::NoWaves);
    }

    waves
        .into_iter()
        .enumerate()
        .map(|(index, mut wave)| {
            if wave.enemy_variants.is_empty() {
                wave.enemy_variants = config.default_variants.clone();
            }
            if wave.enemy_count > 0 && wave.enemy_variants.is_empty() {
                return Err(ConfigError::EmptyVariantSet { index });
            }
            if let Some(name) = wave
                .enemy_variants
                .iter()
                .find(|name| config.variant(name).is_none())
            {
                return Err(ConfigError::UnknownVariant {
                    index,
                    name: name.clone(),
                });
            }
            Ok(wave)
        })
        .collect()
}

/// Expand the auto formula; variants are filled in from the defaults.
pub fn auto_waves(formula: &AutoWaveFormula) -> Result<Vec<WaveSpec>, ConfigError> {
    (0..formula.wave_count)
        .map(|i| {
            Ok(WaveSpec {
                enemy_count: linear(
                    "waves.base_enemies",
                    formula.base_enemies,
                    formula.enemies_increase_per_wave,
                    i,
                )?,
                spawn_interval: (formula.base_spawn_interval
                    - formula.spawn_interval_decrease_per_wave * f64::from(i))
                .max(formula.min_spawn_interval),
                max_concurrent: linear(
                    "waves.base_max_concurrent",
                    formula.base_max_concurrent,
                    formula.max_concurrent_increase_per_wave,
                    i,
                )?
                .max(1),
                pre_delay: formula.pre_delay,
                post_delay: formula.post_delay,
                enemy_variants: Vec::new(),
            })
        })
        .collect()
}

/// `base + increase * wave`, rejected if it leaves `u32`.
fn linear(field: &'static str, base: u32, increase: u32, wave: u32) -> Result<u32, ConfigError> {
    increase
        .checked_mul(wave)
        .and_then(|step| base.checked_add(step))
        .ok_or_else(|| ConfigError::InvalidValue {
            field,
            reason: format!("wave {wave} overflows ({base} + {increase} * {wave})"),
        })
}

/// Total enemies across all waves, saturating at `u32::MAX`.
pub fn total_enemies(waves: &[WaveSpec]) -> u32 {
    waves
        .iter()
        .fold(0u32, |total, w| total.saturating_add(w.enemy_count))
}
