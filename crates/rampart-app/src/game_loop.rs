//! Game loop thread: runs the encounter engine at 30Hz and publishes snapshots.
//!
//! The engine is moved into the thread. Commands arrive via an `mpsc`
//! channel; the latest snapshot is kept in shared state for polling.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rampart_core::constants::TICK_RATE;
use rampart_core::state::EncounterSnapshot;
use rampart_sim::EncounterEngine;

use crate::gunner::AutoGunner;
use crate::setup::AppError;
use crate::state::{GameLoopCommand, RunSummary};

/// Nominal duration of one tick at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// How long and how fast the loop runs.
#[derive(Debug, Clone, Copy)]
pub struct LoopSettings {
    /// Sleep between ticks to run at wall-clock speed.
    pub realtime: bool,
    /// Stop after this many ticks.
    pub max_ticks: u64,
    /// Stop once this many encounters have finished.
    pub max_encounters: u32,
}

/// A running game loop.
pub struct GameLoop {
    pub commands: mpsc::Sender<GameLoopCommand>,
    pub latest_snapshot: Arc<Mutex<Option<EncounterSnapshot>>>,
    handle: JoinHandle<RunSummary>,
}

impl GameLoop {
    /// Wait for the loop to finish and return its totals.
    pub fn join(self) -> RunSummary {
        match self.handle.join() {
            Ok(summary) => summary,
            Err(_) => {
                tracing::error!("game loop thread panicked");
                RunSummary::default()
            }
        }
    }
}

/// Spawn the game loop in a new thread.
pub fn spawn_game_loop(
    engine: EncounterEngine,
    gunner: Option<AutoGunner>,
    settings: LoopSettings,
) -> Result<GameLoop, AppError> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();
    let latest_snapshot = Arc::new(Mutex::new(None));
    let shared = Arc::clone(&latest_snapshot);

    let handle = std::thread::Builder::new()
        .name("rampart-game-loop".into())
        .spawn(move || run_game_loop(engine, gunner, settings, cmd_rx, &shared))
        .map_err(AppError::Thread)?;

    Ok(GameLoop {
        commands: cmd_tx,
        latest_snapshot,
        handle,
    })
}

/// The game loop. Runs until a limit is hit, a Shutdown command arrives or the
/// channel disconnects.
pub fn run_game_loop(
    mut engine: EncounterEngine,
    mut gunner: Option<AutoGunner>,
    settings: LoopSettings,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<EncounterSnapshot>>,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let mut next_tick_time = Instant::now();

    while summary.ticks < settings.max_ticks {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => engine.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) => return summary,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return summary,
            }
        }

        // 2. Advance one tick
        let snapshot = engine.tick();
        summary.ticks += 1;
        summary.record(&snapshot.events);
        if summary.ticks % u64::from(TICK_RATE * 10) == 0 {
            tracing::info!(
                tick = snapshot.time.tick,
                wave = snapshot.waves.current_wave,
                alive = snapshot.waves.alive,
                objective_hp = snapshot.objective.hp,
                "progress"
            );
        }

        // 3. Let the scripted player react
        if let Some(gunner) = gunner.as_mut() {
            engine.queue_commands(gunner.commands(&snapshot));
        }

        // 4. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        if summary.encounters >= settings.max_encounters {
            tracing::info!(encounters = summary.encounters, "encounter limit reached");
            return summary;
        }

        // 5. Sleep until next tick, adjusting for time_scale
        if settings.realtime {
            let time_scale = engine.time_scale();
            let effective_tick_duration = if time_scale > 0.001 {
                TICK_DURATION.div_f64(time_scale)
            } else {
                TICK_DURATION
            };

            next_tick_time += effective_tick_duration;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > effective_tick_duration * 2 {
                // Too far behind; reset instead of catching up
                next_tick_time = now;
            }
        }
    }
    tracing::info!(ticks = summary.ticks, "tick limit reached");
    summary
}
