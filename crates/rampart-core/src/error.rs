//! Error types for configuration and encounter setup.

use thiserror::Error;

/// Configuration could not be parsed or is inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file is not valid JSON for `EncounterConfig`.
    #[error("failed to parse encounter config: {0}")]
    Parse(#[from] serde_json::Error),

    /// No waves would be run.
    #[error("wave list is empty")]
    NoWaves,

    /// A wave has no variants of its own and no defaults exist.
    #[error("wave {index} has no enemy variants and no default variants are configured")]
    EmptyVariantSet {
        /// 0-based wave index.
        index: usize,
    },

    /// A wave names a variant that is not defined.
    #[error("wave {index} references unknown enemy variant '{name}'")]
    UnknownVariant {
        /// 0-based wave index.
        index: usize,
        /// The unresolved name.
        name: String,
    },

    /// Two variants share a name.
    #[error("duplicate enemy variant '{0}'")]
    DuplicateVariant(String),

    /// A numeric field is out of range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// The encounter could not be initialized.
#[derive(Debug, Error)]
pub enum EncounterError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required external reference was not supplied.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// The objective could not be placed on any accepted surface.
    #[error("objective placement found no valid surface after {attempts} samples")]
    ObjectivePlacement {
        /// Samples drawn per label set.
        attempts: u32,
    },
}
