//! Health and death for anything that can be destroyed.
//!
//! Death is a one-way transition: the first transition hands out exactly one
//! `DeathNotice`, and nothing after it (further damage, forced deaths) can
//! produce another.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use rampart_core::enums::{DeathCause, EntityKind};

/// Hit points of a destructible entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    current: f64,
    max: f64,
    dead: bool,
}

/// Proof that an entity just died. Produced once per entity and not cloneable,
/// so a death cannot be reported twice.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a death notice must be routed to its observers"]
pub struct DeathNotice {
    pub cause: DeathCause,
}

/// Result of applying damage.
#[derive(Debug, PartialEq)]
pub enum DamageOutcome {
    /// Nothing changed: the amount was zero or the target was already dead.
    Ignored,
    Damaged { remaining: f64 },
    Killed(DeathNotice),
}

/// Something the weapon or an enemy can hurt.
pub trait Damageable {
    fn apply_damage(&mut self, amount: f64) -> DamageOutcome;
}

impl Health {
    pub fn new(max: f64) -> Self {
        debug_assert!(max > 0.0, "max health must be positive");
        Self {
            current: max,
            max,
            dead: false,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Kill the entity regardless of its health.
    ///
    /// Returns `None` if it was already dead, or if the encounter is tearing
    /// down: teardown deaths are silent.
    pub fn force_death(&mut self, cause: DeathCause, tearing_down: bool) -> Option<DeathNotice> {
        if self.dead {
            return None;
        }
        self.dead = true;
        self.current = 0.0;
        if tearing_down {
            None
        } else {
            Some(DeathNotice { cause })
        }
    }
}

impl Damageable for Health {
    fn apply_damage(&mut self, amount: f64) -> DamageOutcome {
        // NaN and negative amounts both clamp to zero.
        let amount = amount.max(0.0);
        if self.dead || amount == 0.0 {
            return DamageOutcome::Ignored;
        }
        self.current = (self.current - amount).max(0.0);
        debug_assert!(self.current <= self.max);
        if self.current <= 0.0 {
            self.dead = true;
            DamageOutcome::Killed(DeathNotice {
                cause: DeathCause::Damage,
            })
        } else {
            DamageOutcome::Damaged {
                remaining: self.current,
            }
        }
    }
}

/// A death attributed to an entity, queued for dispatch by the engine.
#[derive(Debug)]
pub struct DeathRecord {
    pub entity: Entity,
    pub kind: EntityKind,
    pub notice: DeathNotice,
}
