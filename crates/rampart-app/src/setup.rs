//! Encounter construction from command-line inputs.

use std::path::Path;

use glam::DVec3;
use thiserror::Error;

use rampart_core::config::EncounterConfig;
use rampart_core::error::{ConfigError, EncounterError};
use rampart_room::{Room, RoomLayout};
use rampart_sim::{EncounterBuilder, EncounterEngine};

/// Anything that stops the runner before the first tick.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Encounter(#[from] EncounterError),

    #[error("invalid room {field}: {value} (must be a positive finite number of meters)")]
    InvalidRoom { field: &'static str, value: f64 },

    #[error("failed to start game loop thread: {0}")]
    Thread(std::io::Error),
}

/// Dimensions of the synthetic room the encounter is played in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomSpec {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    /// Add a table in front of the viewer.
    pub table: bool,
}

impl Default for RoomSpec {
    fn default() -> Self {
        Self {
            width: 4.0,
            depth: 4.0,
            height: 2.5,
            table: false,
        }
    }
}

impl RoomSpec {
    /// Reject dimensions no room can have.
    pub fn validate(&self) -> Result<(), AppError> {
        for (field, value) in [
            ("width", self.width),
            ("depth", self.depth),
            ("height", self.height),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(AppError::InvalidRoom { field, value });
            }
        }
        Ok(())
    }

    pub fn layout(&self) -> RoomLayout {
        let layout = RoomLayout::rectangular(self.width, self.depth, self.height);
        if self.table {
            layout.with_table(DVec3::new(0.0, 0.75, -0.6), 0.4, 0.3)
        } else {
            layout
        }
    }
}

/// Read the encounter config from `path`, or use the defaults.
pub fn load_config(path: Option<&Path>) -> Result<EncounterConfig, AppError> {
    let Some(path) = path else {
        return Ok(EncounterConfig::default());
    };
    let json = std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(EncounterConfig::from_json(&json)?)
}

/// Build the engine for `config` inside the room described by `room`.
pub fn build_engine(
    config: EncounterConfig,
    room: &RoomSpec,
) -> Result<EncounterEngine, AppError> {
    room.validate()?;
    let seed = config.seed;
    let engine = EncounterBuilder::new(config)
        .surface_provider(Room::new(room.layout(), seed))
        .build()?;
    Ok(engine)
}
