/// Error types.
///
/// The simulation core only ever fails on checkpoint operations, and those
/// failures are recoverable: state is left untouched and the session shows
/// a notice. Settings and layout errors belong to the host shell.

use std::path::PathBuf;

use thiserror::Error;

/// Rejected checkpoint operation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointError {
    /// The list already holds the configured maximum.
    #[error("maximum checkpoints reached ({max})")]
    CapacityExceeded {
        /// Capacity in effect when the create was attempted.
        max: usize,
    },

    /// Respawn requested with no checkpoint set.
    #[error("no checkpoint available")]
    NoCheckpoint,
}

/// Failure reading or writing the profile store.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("profile store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("profile store is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize profiles: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown profile: {0}")]
    UnknownProfile(String),
}

/// Failure loading a layout file.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("could not read layout {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("layout is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("layout variant {found} does not match the configured {expected}")]
    VariantMismatch {
        expected: &'static str,
        found: &'static str,
    },
}
