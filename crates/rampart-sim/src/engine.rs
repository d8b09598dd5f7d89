//! Encounter engine: the core of the simulation.
//!
//! `EncounterEngine` owns the hecs world, processes player commands, runs the
//! wave scheduler and per-tick systems, routes every death to its observers,
//! and produces `EncounterSnapshot`s. Completely headless, so whole
//! encounters can be tested deterministically.

use std::collections::VecDeque;

use glam::DQuat;
use hecs::{Entity, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rampart_core::commands::PlayerCommand;
use rampart_core::components::{Enemy, Transform};
use rampart_core::config::{EncounterConfig, WaveSpec};
use rampart_core::constants::{DT, MAX_TIME_SCALE};
use rampart_core::enums::{DeathCause, EndState, EntityKind, GamePhase, WavePhase};
use rampart_core::error::EncounterError;
use rampart_core::events::GameEvent;
use rampart_core::state::{EncounterSnapshot, EncounterStatus, ShotView};
use rampart_core::types::{SimTime, SpawnPose};

use crate::combat::{self, Shot};
use crate::end_state::{EndStateController, EndTrigger};
use crate::lifecycle::{DeathRecord, Health};
use crate::placement::{self, PlacementRequest, SpawnPlacementResolver, SurfaceProvider};
use crate::scenario;
use crate::systems;
use crate::systems::snapshot::SnapshotContext;
use crate::systems::wave_scheduler::{
    SchedulerFault, SchedulerTick, SpawnFailure, SpawnIssuer, WaveScheduler,
};
use crate::world_setup;

/// Collects the collaborators an encounter needs and validates them up front.
pub struct EncounterBuilder {
    config: EncounterConfig,
    surfaces: Option<Box<dyn SurfaceProvider + Send>>,
}

impl EncounterBuilder {
    pub fn new(config: EncounterConfig) -> Self {
        Self {
            config,
            surfaces: None,
        }
    }

    /// The scanned environment enemies spawn on.
    pub fn surface_provider(mut self, provider: impl SurfaceProvider + Send + 'static) -> Self {
        self.surfaces = Some(Box::new(provider));
        self
    }

    /// Validate the configuration, place the objective and build the engine.
    pub fn build(self) -> Result<EncounterEngine, EncounterError> {
        let result = self.try_build();
        if let Err(err) = &result {
            tracing::error!(%err, "encounter initialization failed");
        }
        result
    }

    fn try_build(self) -> Result<EncounterEngine, EncounterError> {
        self.config.validate()?;
        let waves = scenario::build_waves(&self.config)?;
        let mut surfaces = self
            .surfaces
            .ok_or(EncounterError::MissingCollaborator("surface provider"))?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let (world, objective) = populate_world(&self.config, surfaces.as_mut())?;
        let scheduler = WaveScheduler::new(
            waves.clone(),
            self.config.spawner.max_consecutive_failures,
            rng.gen(),
        );
        let spawn_request = PlacementRequest::from_spawner(&self.config.spawner);

        tracing::info!(
            seed = self.config.seed,
            waves = waves.len(),
            enemies = scenario::total_enemies(&waves),
            "encounter ready"
        );

        Ok(EncounterEngine {
            end_state: EndStateController::new(self.config.restart.clone()),
            time_scale: self.config.time_scale.clamp(0.0, MAX_TIME_SCALE),
            config: self.config,
            waves,
            spawn_request,
            surfaces,
            world,
            time: SimTime::default(),
            phase: GamePhase::default(),
            rng,
            objective,
            scheduler,
            tearing_down: false,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            last_shot: None,
            last_fire_secs: None,
            restart_held: false,
            restart_pending: false,
            reload_error: None,
        })
    }
}

/// The encounter engine. Owns the ECS world and all encounter state.
pub struct EncounterEngine {
    config: EncounterConfig,
    waves: Vec<WaveSpec>,
    spawn_request: PlacementRequest,
    surfaces: Box<dyn SurfaceProvider + Send>,
    world: World,
    time: SimTime,
    phase: GamePhase,
    time_scale: f64,
    rng: ChaCha8Rng,
    objective: Entity,
    scheduler: WaveScheduler,
    end_state: EndStateController,
    /// Set once the end state is entered; deaths after this are silent.
    tearing_down: bool,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<GameEvent>,
    last_shot: Option<ShotView>,
    last_fire_secs: Option<f64>,
    restart_held: bool,
    restart_pending: bool,
    reload_error: Option<String>,
}

impl EncounterEngine {
    /// Build an encounter on `surfaces`. See `EncounterBuilder`.
    pub fn new(
        config: EncounterConfig,
        surfaces: impl SurfaceProvider + Send + 'static,
    ) -> Result<Self, EncounterError> {
        EncounterBuilder::new(config)
            .surface_provider(surfaces)
            .build()
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the encounter by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> EncounterSnapshot {
        self.process_commands();

        match self.phase {
            GamePhase::Active => {
                let dt = self.time.advance(DT, self.time_scale);
                self.run_systems(dt);
            }
            GamePhase::Ended => {
                self.time.advance(DT, self.time_scale);
                if self
                    .end_state
                    .restart_hold(self.restart_held, DT, self.time.unscaled_secs)
                {
                    self.request_restart();
                }
            }
            GamePhase::Briefing | GamePhase::Paused => {}
        }

        let snapshot = self.snapshot();
        if self.restart_pending {
            self.restart_pending = false;
            self.reload();
        }
        snapshot
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn end_state(&self) -> EndState {
        self.end_state.state()
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    pub fn objective(&self) -> Entity {
        self.objective
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Apply damage to the objective directly (for tests).
    #[cfg(test)]
    pub fn damage_objective(&mut self, amount: f64) {
        use crate::lifecycle::{DamageOutcome, Damageable};

        let outcome = match self.world.get::<&mut Health>(self.objective) {
            Ok(mut health) => health.apply_damage(amount),
            Err(_) => return,
        };
        if let DamageOutcome::Killed(notice) = outcome {
            self.dispatch_deaths(vec![DeathRecord {
                entity: self.objective,
                kind: EntityKind::Objective,
                notice,
            }]);
        }
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartEncounter => {
                if self.phase == GamePhase::Briefing {
                    self.scheduler.start();
                    self.phase = GamePhase::Active;
                    tracing::info!("encounter started");
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
            PlayerCommand::SetTimeScale { scale } => {
                if !scale.is_nan() {
                    self.time_scale = scale.clamp(0.0, MAX_TIME_SCALE);
                }
            }
            PlayerCommand::Fire { origin, direction } => self.fire(origin, direction),
            PlayerCommand::RestartPressed => {
                if self.phase == GamePhase::Ended
                    && self.end_state.restart_press(self.time.unscaled_secs)
                {
                    self.request_restart();
                }
            }
            PlayerCommand::RestartHeld { held } => {
                self.restart_held = held;
            }
        }
    }

    /// Resolve one trigger pull. The weapon only works while the encounter is
    /// active and off cooldown.
    fn fire(&mut self, origin: glam::DVec3, direction: glam::DVec3) {
        if self.phase != GamePhase::Active {
            return;
        }
        let now = self.time.elapsed_secs;
        if let Some(last) = self.last_fire_secs {
            if now - last < self.config.weapon.cooldown_secs {
                return;
            }
        }
        let Some(shot) = Shot::new(origin, direction, &self.config.weapon) else {
            tracing::debug!("ignoring shot with zero direction");
            return;
        };
        self.last_fire_secs = Some(now);

        let result = combat::fire(&mut self.world, &shot);
        let hits = result.hit_entities.len() as u32;
        tracing::debug!(
            hits,
            kills = result.kills.len(),
            blocked = result.blocked,
            "shot fired"
        );
        self.events.push(GameEvent::ShotFired {
            start: result.start,
            end: result.impact_point,
            blocked: result.blocked,
            hits,
        });
        self.last_shot = Some(ShotView {
            start: result.start,
            end: result.impact_point,
            blocked: result.blocked,
            hits,
            tick: self.time.tick,
        });

        let deaths = result
            .kills
            .into_iter()
            .map(|(entity, notice)| DeathRecord {
                entity,
                kind: EntityKind::Enemy,
                notice,
            })
            .collect();
        self.dispatch_deaths(deaths);
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        // 1. Wave scheduling (spawns)
        let mut spawn_events = Vec::new();
        let outcome = {
            let mut issuer = WorldSpawner {
                world: &mut self.world,
                surfaces: self.surfaces.as_mut(),
                rng: &mut self.rng,
                config: &self.config,
                request: &self.spawn_request,
                now: self.time.elapsed_secs,
                events: &mut spawn_events,
            };
            self.scheduler.run(&self.time, &mut issuer, &mut self.events)
        };
        self.events.extend(spawn_events);
        match outcome {
            Ok(SchedulerTick::Continue) => {}
            Ok(SchedulerTick::Victory) => self.enter_end_state(EndTrigger::AllWavesCleared),
            Err(fault) => self.abort(fault),
        }

        if self.phase == GamePhase::Active {
            // 2. Lifetime expiry
            let deaths = systems::lifetime::run(&mut self.world, dt);
            self.dispatch_deaths(deaths);
        }
        if self.phase == GamePhase::Active {
            // 3. Movement toward the objective
            let target = self
                .world
                .get::<&Transform>(self.objective)
                .map(|t| t.position)
                .ok();
            if let Some(target) = target {
                systems::movement::run(&mut self.world, target, dt);
            }
            // 4. Objective contact
            let deaths = systems::contact::run(&mut self.world, self.objective, &mut self.events);
            self.dispatch_deaths(deaths);
        }
        // 5. Cleanup
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
    }

    /// Deliver each death to its observers, in order. Every record comes from
    /// a consumed `DeathNotice`, so each death is delivered exactly once.
    /// Enemy deaths arriving after teardown has begun are dropped.
    fn dispatch_deaths(&mut self, deaths: Vec<DeathRecord>) {
        for DeathRecord {
            entity,
            kind,
            notice,
        } in deaths
        {
            match kind {
                EntityKind::Enemy if self.tearing_down => {
                    tracing::trace!(entity_id = entity.to_bits().get(), "death after teardown");
                }
                EntityKind::Enemy => {
                    let entity_id = entity.to_bits().get();
                    self.events.push(GameEvent::EnemyDied {
                        entity_id,
                        cause: notice.cause,
                    });
                    let tracked = self.scheduler.on_enemy_died(entity);
                    tracing::debug!(entity_id, cause = ?notice.cause, tracked, "enemy died");
                }
                EntityKind::Objective => {
                    self.events.push(GameEvent::ObjectiveDestroyed);
                    tracing::info!(tick = self.time.tick, "objective destroyed");
                    self.enter_end_state(EndTrigger::ObjectiveDestroyed);
                }
            }
        }
    }

    /// Perform the end-of-encounter work once, for the winning trigger only.
    fn enter_end_state(&mut self, trigger: EndTrigger) {
        let Some(outcome) = self.end_state.trigger(trigger, self.time.unscaled_secs) else {
            return;
        };
        self.teardown();
        self.phase = GamePhase::Ended;
        self.events.push(GameEvent::EncounterEnded { outcome });
        match outcome {
            EndState::Victory => tracing::info!(tick = self.time.tick, "victory"),
            _ => tracing::info!(tick = self.time.tick, "defeat"),
        }
    }

    /// Abort the run after a liveness failure. The outcome stays undecided but
    /// the player may restart.
    fn abort(&mut self, fault: SchedulerFault) {
        tracing::error!(%fault, "encounter aborted");
        self.events.push(GameEvent::SchedulerFaulted {
            message: fault.to_string(),
        });
        self.teardown();
        self.end_state.abort(self.time.unscaled_secs);
        self.phase = GamePhase::Ended;
    }

    /// Stop the scheduler and silently remove every enemy.
    fn teardown(&mut self) {
        self.tearing_down = true;
        let tracked = self.scheduler.stop();
        tracing::debug!(remaining = tracked.len(), "tearing down encounter");
        for (_entity, (_enemy, health)) in self.world.query_mut::<(&Enemy, &mut Health)>() {
            let _silent = health.force_death(DeathCause::Cleanup, self.tearing_down);
        }
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
    }

    fn request_restart(&mut self) {
        tracing::info!(tick = self.time.tick, "restart requested");
        self.events.push(GameEvent::RestartRequested);
        self.restart_pending = true;
    }

    /// Rebuild a fresh encounter from the same configuration and start it.
    fn reload(&mut self) {
        match populate_world(&self.config, self.surfaces.as_mut()) {
            Ok((world, objective)) => {
                self.world = world;
                self.objective = objective;
            }
            Err(err) => {
                tracing::error!(%err, "restart failed");
                self.reload_error = Some(err.to_string());
                return;
            }
        }
        self.scheduler = WaveScheduler::new(
            self.waves.clone(),
            self.config.spawner.max_consecutive_failures,
            self.rng.gen(),
        );
        self.scheduler.start();
        self.end_state = EndStateController::new(self.config.restart.clone());
        self.time = SimTime::default();
        self.phase = GamePhase::Active;
        self.tearing_down = false;
        self.events.clear();
        self.last_shot = None;
        self.last_fire_secs = None;
        self.restart_held = false;
        self.reload_error = None;
        tracing::info!("encounter restarted");
    }

    fn status(&self) -> EncounterStatus {
        if let Some(message) = &self.reload_error {
            return EncounterStatus::Faulted {
                message: message.clone(),
            };
        }
        if let Some(fault) = self.scheduler.fault() {
            return EncounterStatus::Faulted {
                message: fault.to_string(),
            };
        }
        match self.end_state.state() {
            EndState::Victory => return EncounterStatus::Victory,
            EndState::Defeat => {
                return EncounterStatus::Stopped {
                    reason: "objective destroyed".to_string(),
                }
            }
            EndState::Running => {}
        }
        match self.scheduler.phase() {
            WavePhase::Preparing => EncounterStatus::Preparing,
            WavePhase::PreDelay | WavePhase::Spawning | WavePhase::Draining => {
                EncounterStatus::WaveInProgress
            }
            WavePhase::PostDelay => EncounterStatus::WaveCleared,
            WavePhase::Victory => EncounterStatus::Victory,
            WavePhase::Stopped => EncounterStatus::Stopped {
                reason: "stopped".to_string(),
            },
            WavePhase::Faulted => EncounterStatus::Faulted {
                message: "wave scheduler faulted".to_string(),
            },
        }
    }

    fn snapshot(&mut self) -> EncounterSnapshot {
        let context = SnapshotContext {
            time: self.time,
            phase: self.phase,
            end_state: self.end_state.state(),
            status: self.status(),
            waves: self.scheduler.progress(),
            last_shot: self.last_shot,
            restart_available: self.phase == GamePhase::Ended
                && self.end_state.restart_available(self.time.unscaled_secs),
            restart_hold_progress: self.end_state.hold_progress(),
            events: std::mem::take(&mut self.events),
        };
        systems::snapshot::build_snapshot(&self.world, Some(self.objective), context)
    }
}

/// Fresh world containing only the objective, placed per config.
fn populate_world(
    config: &EncounterConfig,
    surfaces: &mut dyn SurfaceProvider,
) -> Result<(World, Entity), EncounterError> {
    let pose = match &config.objective.placement {
        Some(placement) => {
            placement::place_objective(surfaces, placement, config.objective.half_extents.y)
                .map_err(|failure| EncounterError::ObjectivePlacement {
                    attempts: failure.attempts,
                })?
        }
        None => SpawnPose::new(config.objective.position, DQuat::IDENTITY),
    };
    let mut world = World::new();
    let objective = world_setup::spawn_objective(&mut world, &config.objective, pose);
    tracing::debug!(position = ?pose.position, "objective placed");
    Ok((world, objective))
}

/// Spawns scheduler-requested enemies into the world.
struct WorldSpawner<'a> {
    world: &'a mut World,
    surfaces: &'a mut dyn SurfaceProvider,
    rng: &'a mut ChaCha8Rng,
    config: &'a EncounterConfig,
    request: &'a PlacementRequest,
    now: f64,
    events: &'a mut Vec<GameEvent>,
}

impl SpawnIssuer for WorldSpawner<'_> {
    fn spawn(&mut self, variant: &str) -> Result<Entity, SpawnFailure> {
        let Some(spec) = self.config.variant(variant) else {
            return Err(SpawnFailure::Rejected(variant.to_string()));
        };
        let pose =
            SpawnPlacementResolver::resolve(&mut *self.surfaces, &mut *self.rng, self.request)?;
        let entity = world_setup::spawn_enemy(self.world, spec, pose, self.now);
        let entity_id = entity.to_bits().get();
        tracing::debug!(entity_id, variant, position = ?pose.position, "enemy spawned");
        self.events.push(GameEvent::EnemySpawned {
            entity_id,
            variant: variant.to_string(),
            position: pose.position,
        });
        Ok(entity)
    }
}
