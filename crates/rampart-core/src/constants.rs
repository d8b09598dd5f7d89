//! Simulation constants and tuning defaults.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Maximum time scale accepted from `SetTimeScale`.
pub const MAX_TIME_SCALE: f64 = 4.0;

// --- Objective ---

/// Default objective hit points.
pub const OBJECTIVE_MAX_HP: f64 = 100.0;

/// Default objective collider half extents (meters).
pub const OBJECTIVE_HALF_EXTENTS: [f64; 3] = [0.1, 0.25, 0.1];

// --- Enemies ---

/// Default enemy hit points.
pub const ENEMY_MAX_HP: f64 = 3.0;

/// Default enemy walk speed (m/s).
pub const ENEMY_MOVE_SPEED: f64 = 0.25;

/// Default damage an enemy deals when it reaches the objective.
pub const ENEMY_CONTACT_DAMAGE: f64 = 10.0;

/// Default enemy collider radius (meters).
pub const ENEMY_RADIUS: f64 = 0.1;

/// Enemies closer than this (horizontally) to the objective stop moving.
pub const ENEMY_STOP_DISTANCE: f64 = 0.02;

// --- Spawning ---

/// Surface samples drawn per spawn request before giving up.
pub const SPAWN_ATTEMPTS_PER_REQUEST: u32 = 24;

/// Minimum distance from a surface edge for enemy spawns (meters).
pub const SPAWN_MIN_EDGE_DISTANCE: f64 = 0.3;

/// Distance a spawn is pushed off its surface along the normal (meters).
pub const SPAWN_NORMAL_OFFSET: f64 = 0.04;

/// Lower bound on the push-out distance regardless of configuration.
pub const SPAWN_MIN_PUSH_OUT: f64 = 0.01;

/// Default cosine tolerance for surface normal alignment.
pub const SPAWN_MIN_ALIGNMENT_DOT: f64 = 0.9;

/// Consecutive failed spawn requests before a wave run is aborted.
pub const MAX_CONSECUTIVE_SPAWN_FAILURES: u32 = 50;

// --- Auto-generated waves ---

pub const AUTO_WAVE_COUNT: u32 = 3;
pub const AUTO_BASE_ENEMIES: u32 = 5;
pub const AUTO_ENEMIES_PER_WAVE: u32 = 3;
pub const AUTO_BASE_SPAWN_INTERVAL: f64 = 1.0;
pub const AUTO_SPAWN_INTERVAL_DECREASE: f64 = 0.08;
pub const AUTO_MIN_SPAWN_INTERVAL: f64 = 0.25;
pub const AUTO_BASE_MAX_CONCURRENT: u32 = 2;
pub const AUTO_MAX_CONCURRENT_INCREASE: u32 = 1;
pub const AUTO_PRE_WAVE_DELAY: f64 = 2.0;
pub const AUTO_POST_WAVE_DELAY: f64 = 1.0;

// --- Weapon ---

/// Beam length (meters).
pub const WEAPON_MAX_RANGE: f64 = 5.0;

/// Beam radius for swept hit tests (meters).
pub const WEAPON_BEAM_RADIUS: f64 = 0.03;

/// How far behind the muzzle the sweep starts (meters).
pub const WEAPON_ORIGIN_BACKOFF: f64 = 0.02;

/// Radius of the point-blank overlap test at the muzzle (meters).
pub const WEAPON_NEAR_FIELD_RADIUS: f64 = 0.05;

/// Radius of the overlap test deciding whether the muzzle is inside blocking geometry.
pub const WEAPON_MUZZLE_CHECK_RADIUS: f64 = 0.005;

/// Smallest radius any sweep or overlap is performed with.
pub const WEAPON_MIN_QUERY_RADIUS: f64 = 0.0001;

/// Damage per shot.
pub const WEAPON_DAMAGE: f64 = 1.0;

// --- Restart gate ---

/// Delay after the end state is entered before restart input is considered.
pub const RESTART_GRACE_SECS: f64 = 0.75;

/// Minimum spacing between accepted restart inputs.
pub const RESTART_DEBOUNCE_SECS: f64 = 0.5;

/// Hold duration required when hold-to-confirm is enabled.
pub const RESTART_HOLD_SECS: f64 = 1.0;

// --- Objective placement ---

pub const PLACEMENT_ATTEMPTS: u32 = 800;
pub const PLACEMENT_MIN_EDGE_DISTANCE: f64 = 0.1;
pub const PLACEMENT_SURFACE_OFFSET: f64 = 0.01;
pub const PLACEMENT_MAX_DISTANCE: f64 = 1.4;
pub const PLACEMENT_MIN_FORWARD_DOT: f64 = 0.7;
pub const PLACEMENT_DESIRED_HORIZONTAL_DISTANCE: f64 = 0.6;
pub const PLACEMENT_MIN_HORIZONTAL_DISTANCE: f64 = 0.25;
pub const PLACEMENT_MAX_BELOW_VIEWER: f64 = 0.85;

/// Minimum normal Y for a sample to count as an upward-facing placement surface.
pub const PLACEMENT_MIN_UP_NORMAL: f64 = 0.6;
