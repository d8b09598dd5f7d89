//! Wave scheduler: paces enemy spawns wave by wave and decides victory.
//!
//! Per wave the scheduler walks `PreDelay → Spawning → Draining → PostDelay`;
//! after the last wave's post-delay it reaches `Victory`. `Stopped` and
//! `Faulted` can be entered from anywhere. All waiting is expressed as
//! entries in a `WakeList`, so stopping is just clearing the list.
//!
//! Spawning itself is delegated to a `SpawnIssuer` so the scheduler never
//! touches placement or the world directly.

use hecs::Entity;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use rampart_core::config::WaveSpec;
use rampart_core::enums::WavePhase;
use rampart_core::events::GameEvent;
use rampart_core::state::WaveProgressView;
use rampart_core::types::SimTime;

use crate::placement::PlacementFailure;
use crate::wake::WakeList;

/// Instantiates enemies on the scheduler's behalf.
pub trait SpawnIssuer {
    /// Place and spawn one enemy of `variant`, returning its entity.
    fn spawn(&mut self, variant: &str) -> Result<Entity, SpawnFailure>;
}

/// A single spawn request that produced no enemy. Retried on the next attempt.
#[derive(Debug, Error)]
pub enum SpawnFailure {
    #[error(transparent)]
    Placement(#[from] PlacementFailure),

    #[error("spawn issuer cannot instantiate variant '{0}'")]
    Rejected(String),
}

/// The run was aborted and will never progress again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerFault {
    /// The room cannot fit the wave.
    #[error("wave {wave}: {failures} consecutive spawn failures")]
    SpawnCeiling { wave: u32, failures: u32 },

    #[error("wave {wave} has no enemy variants to choose from")]
    EmptyVariantSet { wave: u32 },
}

/// What a scheduler tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerTick {
    Continue,
    /// The last wave finished on this tick.
    Victory,
}

/// Bookkeeping for the wave currently running.
#[derive(Debug, Default)]
struct WaveRunState {
    spawned: u32,
    alive: Vec<Entity>,
    consecutive_failures: u32,
}

/// Runs an ordered list of waves.
#[derive(Debug)]
pub struct WaveScheduler {
    waves: Vec<WaveSpec>,
    max_consecutive_failures: u32,
    rng: ChaCha8Rng,
    phase: WavePhase,
    started: bool,
    wave_index: usize,
    run: WaveRunState,
    wakes: WakeList,
    fault: Option<SchedulerFault>,
}

impl WaveScheduler {
    pub fn new(waves: Vec<WaveSpec>, max_consecutive_failures: u32, seed: u64) -> Self {
        Self {
            waves,
            max_consecutive_failures: max_consecutive_failures.max(1),
            rng: ChaCha8Rng::seed_from_u64(seed),
            phase: WavePhase::Preparing,
            started: false,
            wave_index: 0,
            run: WaveRunState::default(),
            wakes: WakeList::default(),
            fault: None,
        }
    }

    /// Begin the first wave on the next `run`.
    pub fn start(&mut self) {
        self.started = true;
    }

    /// Advance the state machine to `time`, spawning through `spawner`.
    ///
    /// Returns the fault on the tick the run aborts; afterwards the scheduler
    /// is inert and returns `Continue`.
    pub fn run<S: SpawnIssuer + ?Sized>(
        &mut self,
        time: &SimTime,
        spawner: &mut S,
        events: &mut Vec<GameEvent>,
    ) -> Result<SchedulerTick, SchedulerFault> {
        if !self.started || self.phase.is_final() {
            return Ok(SchedulerTick::Continue);
        }
        if self.phase == WavePhase::Preparing {
            if let Some(tick) = self.begin_wave(0, time, spawner, events)? {
                return Ok(tick);
            }
        }

        loop {
            match self.phase {
                WavePhase::Preparing
                | WavePhase::Victory
                | WavePhase::Stopped
                | WavePhase::Faulted => return Ok(SchedulerTick::Continue),
                WavePhase::PreDelay => {
                    if self.wakes.pop_due(time).is_none() {
                        return Ok(SchedulerTick::Continue);
                    }
                    self.phase = WavePhase::Spawning;
                    self.spawn_step(time, spawner)?;
                }
                WavePhase::Spawning => {
                    if self.wakes.pop_due(time).is_none() {
                        return Ok(SchedulerTick::Continue);
                    }
                    self.spawn_step(time, spawner)?;
                }
                WavePhase::Draining => {
                    if !self.run.alive.is_empty() {
                        return Ok(SchedulerTick::Continue);
                    }
                    let wave = self.current_wave();
                    let total_waves = self.total_waves();
                    events.push(GameEvent::WaveCleared { wave, total_waves });
                    tracing::info!(wave, total_waves, "wave cleared");

                    let post_delay = self.waves[self.wave_index].post_delay;
                    if post_delay > 0.0 {
                        self.wakes.schedule(time, post_delay);
                        self.phase = WavePhase::PostDelay;
                    } else if let Some(tick) = self.finish_wave(time, spawner, events)? {
                        return Ok(tick);
                    }
                }
                WavePhase::PostDelay => {
                    if self.wakes.pop_due(time).is_none() {
                        return Ok(SchedulerTick::Continue);
                    }
                    if let Some(tick) = self.finish_wave(time, spawner, events)? {
                        return Ok(tick);
                    }
                }
            }
        }
    }

    /// Record the death of a spawned enemy. Returns `false` for entities the
    /// current wave is not tracking (already removed, or never spawned by it).
    pub fn on_enemy_died(&mut self, entity: Entity) -> bool {
        match self.run.alive.iter().position(|e| *e == entity) {
            Some(index) => {
                self.run.alive.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Cancel everything. Returns the enemies still alive so the caller can
    /// despawn them. No-op once the scheduler has finished.
    pub fn stop(&mut self) -> Vec<Entity> {
        if self.phase.is_final() {
            return Vec::new();
        }
        self.phase = WavePhase::Stopped;
        self.wakes.clear();
        tracing::info!(wave = self.current_wave(), "wave scheduler stopped");
        std::mem::take(&mut self.run.alive)
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn fault(&self) -> Option<&SchedulerFault> {
        self.fault.as_ref()
    }

    pub fn waves(&self) -> &[WaveSpec] {
        &self.waves
    }

    pub fn alive(&self) -> &[Entity] {
        &self.run.alive
    }

    pub fn alive_count(&self) -> u32 {
        self.run.alive.len() as u32
    }

    pub fn spawned_count(&self) -> u32 {
        self.run.spawned
    }

    /// 1-based index of the current wave, 0 before the first wave.
    pub fn current_wave(&self) -> u32 {
        if self.phase == WavePhase::Preparing {
            0
        } else {
            self.wave_index as u32 + 1
        }
    }

    pub fn total_waves(&self) -> u32 {
        self.waves.len() as u32
    }

    pub fn progress(&self) -> WaveProgressView {
        let current_wave = self.current_wave();
        let target = if current_wave == 0 {
            0
        } else {
            self.waves
                .get(self.wave_index)
                .map_or(0, |w| w.enemy_count)
        };
        WaveProgressView {
            phase: self.phase,
            current_wave,
            total_waves: self.total_waves(),
            remaining_waves: self.total_waves().saturating_sub(current_wave),
            alive: self.alive_count(),
            spawned: self.run.spawned,
            target,
        }
    }

    fn begin_wave<S: SpawnIssuer + ?Sized>(
        &mut self,
        index: usize,
        time: &SimTime,
        spawner: &mut S,
        events: &mut Vec<GameEvent>,
    ) -> Result<Option<SchedulerTick>, SchedulerFault> {
        let Some(wave) = self.waves.get(index) else {
            return Ok(Some(self.declare_victory()));
        };
        let (target, pre_delay) = (wave.enemy_count, wave.pre_delay);
        debug_assert!(self.run.alive.is_empty(), "previous wave still has live enemies");

        self.wave_index = index;
        self.run = WaveRunState::default();
        self.wakes.clear();

        let wave = self.current_wave();
        let total_waves = self.total_waves();
        events.push(GameEvent::WaveStarted {
            wave,
            total_waves,
            target,
        });
        tracing::info!(wave, total_waves, target, "wave started");

        if pre_delay > 0.0 {
            self.phase = WavePhase::PreDelay;
            self.wakes.schedule(time, pre_delay);
        } else {
            self.phase = WavePhase::Spawning;
            self.spawn_step(time, spawner)?;
        }
        Ok(None)
    }

    fn finish_wave<S: SpawnIssuer + ?Sized>(
        &mut self,
        time: &SimTime,
        spawner: &mut S,
        events: &mut Vec<GameEvent>,
    ) -> Result<Option<SchedulerTick>, SchedulerFault> {
        if self.wave_index + 1 < self.waves.len() {
            self.begin_wave(self.wave_index + 1, time, spawner, events)
        } else {
            Ok(Some(self.declare_victory()))
        }
    }

    fn declare_victory(&mut self) -> SchedulerTick {
        self.phase = WavePhase::Victory;
        self.wakes.clear();
        tracing::info!(waves = self.total_waves(), "all waves cleared");
        SchedulerTick::Victory
    }

    /// One iteration of the spawning loop: attempt a spawn if below the
    /// concurrency cap, then wait one interval.
    fn spawn_step<S: SpawnIssuer + ?Sized>(
        &mut self,
        time: &SimTime,
        spawner: &mut S,
    ) -> Result<(), SchedulerFault> {
        let wave_number = self.current_wave();
        let wave = &self.waves[self.wave_index];
        if self.run.spawned >= wave.enemy_count {
            self.phase = WavePhase::Draining;
            return Ok(());
        }
        let interval = wave.spawn_interval;

        if (self.run.alive.len() as u32) < wave.max_concurrent {
            let Some(variant) = wave.enemy_variants.choose(&mut self.rng) else {
                return Err(self.abort(SchedulerFault::EmptyVariantSet { wave: wave_number }));
            };
            match spawner.spawn(variant) {
                Ok(entity) => {
                    self.run.spawned += 1;
                    self.run.alive.push(entity);
                    self.run.consecutive_failures = 0;
                }
                Err(failure) => {
                    self.run.consecutive_failures += 1;
                    tracing::trace!(
                        wave = wave_number,
                        failures = self.run.consecutive_failures,
                        %failure,
                        "spawn attempt failed"
                    );
                    if self.run.consecutive_failures >= self.max_consecutive_failures {
                        return Err(self.abort(SchedulerFault::SpawnCeiling {
                            wave: wave_number,
                            failures: self.run.consecutive_failures,
                        }));
                    }
                }
            }
        }

        self.wakes.schedule(time, interval);
        Ok(())
    }

    fn abort(&mut self, fault: SchedulerFault) -> SchedulerFault {
        tracing::error!(%fault, "wave scheduler aborted");
        self.phase = WavePhase::Faulted;
        self.wakes.clear();
        self.fault = Some(fault.clone());
        fault
    }
}
